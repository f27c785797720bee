//! マーキングスキームのパーサー
//!
//! - tabular: 表形式（ヘッダー検出あり）
//! - judgement: CISエクスポートのジャッジメント形式（固定列）
//!
//! どちらも構造エラーは戻り値の `errors` で返し、ファイル単位でスキップできるようにする。

pub mod judgement;
pub mod tabular;

pub use judgement::{JudgementParseResult, JudgementStats, JUDGEMENT_SHEET};

use crate::error::{ImportError, Result, StructuralError};
use crate::sheet::SchemeWorkbook;
use marking_scheme_common::{extract_skill_name_from_filename, RawDescriptor};
use serde::Serialize;
use std::path::Path;

/// 1ファイルの解析結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult<T> {
    pub descriptors: Vec<T>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl<T> Default for ParseResult<T> {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> ParseResult<T> {
    /// 構造エラーで中断した結果
    pub fn failed(error: StructuralError) -> Self {
        Self {
            errors: vec![error.to_string()],
            ..Self::default()
        }
    }
}

/// 入力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeFormat {
    Tabular,
    Judgement,
    /// シート名から判定
    #[default]
    Auto,
}

impl std::str::FromStr for SchemeFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tabular" | "table" => Ok(SchemeFormat::Tabular),
            "judgement" | "judgment" | "cis" => Ok(SchemeFormat::Judgement),
            "auto" => Ok(SchemeFormat::Auto),
            _ => Err(format!("Unknown format: {}. Use tabular, judgement, or auto", s)),
        }
    }
}

impl std::fmt::Display for SchemeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemeFormat::Tabular => write!(f, "tabular"),
            SchemeFormat::Judgement => write!(f, "judgement"),
            SchemeFormat::Auto => write!(f, "auto"),
        }
    }
}

/// 形式を問わない解析結果（検証に渡す形に揃えたもの）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeParse {
    /// 実際に使った形式
    pub format: SchemeFormat,
    pub skill_name: String,
    #[serde(flatten)]
    pub result: ParseResult<RawDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<JudgementStats>,
}

/// ファイルを指定形式で解析する
pub fn parse_scheme(path: &Path, format: SchemeFormat) -> Result<SchemeParse> {
    let format = match format {
        SchemeFormat::Auto => detect_format(path)?,
        other => other,
    };
    let skill_name = skill_name_for(path);

    let parsed = match format {
        SchemeFormat::Judgement => {
            let result = judgement::parse(path)?;
            SchemeParse {
                format,
                skill_name,
                result: ParseResult {
                    descriptors: result.descriptors.into_iter().map(RawDescriptor::from).collect(),
                    errors: result.errors,
                    warnings: result.warnings,
                },
                stats: Some(result.stats),
            }
        }
        _ => SchemeParse {
            format: SchemeFormat::Tabular,
            skill_name,
            result: tabular::parse(path)?,
            stats: None,
        },
    };

    for error in &parsed.result.errors {
        tracing::warn!("構造エラー: {} ({})", error, path.display());
    }

    Ok(parsed)
}

/// ジャッジメント用シートがあればジャッジメント形式とみなす
///
/// 開けないブックは表形式として扱い、構造エラーは表形式パーサー側で報告する。
pub fn detect_format(path: &Path) -> Result<SchemeFormat> {
    ensure_exists(path)?;
    let format = match SchemeWorkbook::open(path) {
        Ok(workbook) if workbook.sheet_names().iter().any(|n| n == JUDGEMENT_SHEET) => {
            SchemeFormat::Judgement
        }
        _ => SchemeFormat::Tabular,
    };
    tracing::debug!("形式判定: {} ({})", format, path.display());
    Ok(format)
}

/// パスのファイル名からスキル名を得る
pub fn skill_name_for(path: &Path) -> String {
    path.file_name()
        .map(|n| extract_skill_name_from_filename(&n.to_string_lossy()))
        .unwrap_or_default()
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

/// 複数フィールドの警告を順序を保って重複排除する
pub(crate) fn merge_warnings<I>(groups: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut merged: Vec<String> = Vec::new();
    for warning in groups.into_iter().flatten() {
        if !merged.contains(&warning) {
            merged.push(warning);
        }
    }
    merged
}
