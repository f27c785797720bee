//! ワークシート読み込み
//!
//! calamineでブックを開き、シート全体と結合セル情報をメモリに載せる。
//! 行・列はすべて1始まり。

pub mod header;

pub use header::{
    detect_header, map_columns, ColumnMapping, DetectedHeader, HeaderColumn, SchemeField,
    FIELD_PATTERNS,
};

use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xlsx, XlsxError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 読み込み済みワークシート
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    range: Range<Data>,
    merges: Vec<Dimensions>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, range: Range<Data>, merges: Vec<Dimensions>) -> Self {
        Self {
            name: name.into(),
            range,
            merges,
        }
    }

    /// 文字列の二次元配列から作成（1行目がシートの1行目）
    pub fn from_rows(name: impl Into<String>, rows: &[Vec<&str>]) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Self::new(name, Range::empty(), Vec::new());
        }

        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width as u32 - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    range.set_value((r as u32, c as u32), Data::String(value.to_string()));
                }
            }
        }
        Self::new(name, range, Vec::new())
    }

    /// 結合セル領域を追加（1始まり、両端を含む）
    pub fn with_merge(mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Self {
        self.merges.push(Dimensions {
            start: (first_row - 1, first_col - 1),
            end: (last_row - 1, last_col - 1),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 最終行番号（空シートは0）
    pub fn row_count(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// 最終列番号（空シートは0）
    pub fn column_count(&self) -> u32 {
        self.range.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    /// セルの表示テキストを読む
    ///
    /// 結合セルの一部なら結合元（左上）セルの値を返す。
    /// リッチテキストはcalamineが各ランを連結した文字列として返す。
    /// 解決できない場合は空文字列。
    pub fn read_cell(&self, row: u32, col: u32) -> String {
        if row == 0 || col == 0 {
            return String::new();
        }
        let position = self.merge_anchor(row - 1, col - 1);
        self.range
            .get_value(position)
            .map(cell_text)
            .unwrap_or_default()
    }

    fn merge_anchor(&self, row: u32, col: u32) -> (u32, u32) {
        self.merges
            .iter()
            .find(|m| row >= m.start.0 && row <= m.end.0 && col >= m.start.1 && col <= m.end.1)
            .map(|m| m.start)
            .unwrap_or((row, col))
    }
}

/// セル値を文字列化
fn cell_text(value: &Data) -> String {
    match value {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

/// 開いたExcelブック
pub struct SchemeWorkbook {
    inner: Xlsx<BufReader<File>>,
    merges_loaded: bool,
}

impl SchemeWorkbook {
    pub fn open(path: &Path) -> std::result::Result<Self, XlsxError> {
        let mut inner: Xlsx<_> = open_workbook(path)?;
        // 結合セル情報が読めなくても値の読み込みは続ける
        let merges_loaded = match inner.load_merged_regions() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("結合セル情報の読み込みに失敗: {} ({})", e, path.display());
                false
            }
        };
        Ok(Self { inner, merges_loaded })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    /// シートを丸ごと読み込む
    pub fn worksheet(&mut self, name: &str) -> std::result::Result<Worksheet, XlsxError> {
        let range = self.inner.worksheet_range(name)?;
        let merges = if self.merges_loaded {
            self.inner
                .merged_regions_by_sheet(name)
                .into_iter()
                .map(|(_, _, dims)| dims.clone())
                .collect()
        } else {
            Vec::new()
        };
        Ok(Worksheet::new(name, range, merges))
    }
}
