//! ヘッダー行検出と列マッピング
//!
//! - ヘッダー行: 非空セル3つ以上 + 用語辞書の語を含む最初の行
//! - 列マッピング: フィールドごとのパターン表による部分一致（最初の一致を採用）

use super::Worksheet;
use marking_scheme_common::normalize;
use std::collections::BTreeMap;

/// ヘッダー行の探索範囲
const HEADER_SCAN_ROWS: u32 = 20;
/// 用語条件なしで再探索する範囲
const FALLBACK_SCAN_ROWS: u32 = 10;
const MIN_HEADER_CELLS: usize = 3;

/// ヘッダー行に現れる用語
const HEADER_VOCABULARY: &[&str] = &[
    "criterion",
    "descriptor",
    "excellent",
    "good",
    "pass",
    "code",
    "aspect",
];

/// 列マッピング対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemeField {
    Code,
    CriterionName,
    Excellent,
    Good,
    Pass,
    BelowPass,
    Category,
}

impl std::fmt::Display for SchemeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemeField::Code => write!(f, "code"),
            SchemeField::CriterionName => write!(f, "criterionName"),
            SchemeField::Excellent => write!(f, "excellent"),
            SchemeField::Good => write!(f, "good"),
            SchemeField::Pass => write!(f, "pass"),
            SchemeField::BelowPass => write!(f, "belowPass"),
            SchemeField::Category => write!(f, "category"),
        }
    }
}

/// フィールドごとのヘッダー文言パターン（順序が優先度）
pub const FIELD_PATTERNS: &[(SchemeField, &[&str])] = &[
    (SchemeField::Code, &["code", "id", "ref", "no", "number", "aspect"]),
    (
        SchemeField::CriterionName,
        &["criterion", "criteria", "descriptor", "description", "aspect", "sub-aspect"],
    ),
    (
        SchemeField::Excellent,
        &["excellent", "exceeds", "outstanding", "score 3", "level 3"],
    ),
    (
        SchemeField::Good,
        &["good", "meets", "proficient", "score 2", "level 2"],
    ),
    (
        SchemeField::Pass,
        &["pass", "satisfactory", "acceptable", "score 1", "level 1"],
    ),
    (
        SchemeField::BelowPass,
        &["below pass", "below", "fail", "unsatisfactory", "score 0", "level 0"],
    ),
    (
        SchemeField::Category,
        &["category", "section", "sub-criterion", "subcriterion", "module"],
    ),
];

/// ヘッダー列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    pub name: String,
    /// 1始まりの列番号
    pub index: u32,
}

/// 検出したヘッダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedHeader {
    /// 1始まりの行番号
    pub row: u32,
    pub columns: Vec<HeaderColumn>,
}

impl DetectedHeader {
    /// 診断用にヘッダー名を連結
    pub fn column_names(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// フィールド → 列番号（そのシートでのみ有効）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<SchemeField, u32>,
}

impl ColumnMapping {
    pub fn get(&self, field: SchemeField) -> Option<u32> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: SchemeField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn insert(&mut self, field: SchemeField, column: u32) {
        self.columns.insert(field, column);
    }
}

/// 行の非空セルを列として集める
fn row_columns(sheet: &Worksheet, row: u32) -> Vec<HeaderColumn> {
    (1..=sheet.column_count())
        .filter_map(|col| {
            let name = normalize(&sheet.read_cell(row, col));
            if name.is_empty() {
                None
            } else {
                Some(HeaderColumn { name, index: col })
            }
        })
        .collect()
}

fn has_vocabulary(columns: &[HeaderColumn]) -> bool {
    columns.iter().any(|c| {
        let lower = c.name.to_lowercase();
        HEADER_VOCABULARY.iter().any(|term| lower.contains(term))
    })
}

/// ヘッダー行を検出する
///
/// 1. 先頭20行から「非空セル3つ以上かつ用語を含む」最初の行
/// 2. 見つからなければ先頭10行から「非空セル3つ以上」の最初の行
/// 3. それでもなければ None（構造エラー）
pub fn detect_header(sheet: &Worksheet) -> Option<DetectedHeader> {
    let rows = sheet.row_count();

    for row in 1..=rows.min(HEADER_SCAN_ROWS) {
        let columns = row_columns(sheet, row);
        if columns.len() >= MIN_HEADER_CELLS && has_vocabulary(&columns) {
            return Some(DetectedHeader { row, columns });
        }
    }

    for row in 1..=rows.min(FALLBACK_SCAN_ROWS) {
        let columns = row_columns(sheet, row);
        if columns.len() >= MIN_HEADER_CELLS {
            tracing::debug!("用語なしでヘッダー行を採用: {}行目 ({})", row, sheet.name());
            return Some(DetectedHeader { row, columns });
        }
    }

    None
}

/// ヘッダー列をフィールドへ対応付ける
///
/// フィールドごとに独立して判定するため、同じ列が複数フィールドに一致し得る。
pub fn map_columns(
    columns: &[HeaderColumn],
    field_patterns: &[(SchemeField, &[&str])],
) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for (field, patterns) in field_patterns {
        let found = columns.iter().find(|column| {
            let lower = column.name.to_lowercase();
            patterns.iter().any(|p| lower.contains(p))
        });
        if let Some(column) = found {
            mapping.insert(*field, column.index);
        }
    }

    mapping
}
