//! ディスクリプタ検証
//!
//! 構造エラー（レコード単位で致命的）と品質警告（登録は妨げない）を判定し、
//! 保存可能なレコードを組み立てる。

use crate::types::{RawDescriptor, ValidatedDescriptor};
use serde::Serialize;

/// 既定のソースタグ
pub const DEFAULT_SOURCE_TAG: &str = "marking_scheme_import";

const MIN_CRITERION_CHARS: usize = 2;
const MEANINGFUL_CRITERION_CHARS: usize = 5;
const MAX_CRITERION_CHARS: usize = 500;
const MAX_LEVEL_CHARS: usize = 2000;

/// 1レコードの検証結果
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub data: Option<ValidatedDescriptor>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// 不正レコード
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRecord {
    pub record: RawDescriptor,
    pub errors: Vec<String>,
}

/// 警告付きレコード
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWarnings {
    pub record: RawDescriptor,
    pub warnings: Vec<String>,
}

/// 一括検証結果
#[derive(Debug, Clone, Default)]
pub struct BatchValidation {
    pub valid: Vec<ValidatedDescriptor>,
    pub invalid: Vec<InvalidRecord>,
    pub warnings: Vec<RecordWarnings>,
}

/// 検証器
#[derive(Debug, Clone)]
pub struct Validator {
    source: String,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_TAG)
    }
}

impl Validator {
    /// 取込バッチのソースタグを指定して作成
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// 1レコードを検証する
    pub fn validate(&self, record: &RawDescriptor) -> ValidationOutcome {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let code = record.code.trim();
        let criterion = record.criterion_name.trim();
        let skill_name = record.skill_name.trim();
        let criterion_chars = criterion.chars().count();
        let no_levels = record.score_texts().iter().all(|(_, text)| text.trim().is_empty());

        if code.is_empty() {
            errors.push("Missing code".to_string());
        }
        if criterion_chars < MIN_CRITERION_CHARS {
            errors.push("Criterion name is missing or too short".to_string());
        }
        if skill_name.is_empty() {
            errors.push("Missing skill name".to_string());
        }
        if criterion_chars < MEANINGFUL_CRITERION_CHARS && no_levels {
            errors.push("No meaningful content (short criterion name and no performance levels)".to_string());
        }

        if no_levels {
            warnings.push("No performance levels defined".to_string());
        }
        if criterion_chars > MAX_CRITERION_CHARS {
            warnings.push(format!(
                "Criterion name exceeds {} characters ({})",
                MAX_CRITERION_CHARS, criterion_chars
            ));
        }
        for (field, text) in record.score_texts() {
            let chars = text.chars().count();
            if chars > MAX_LEVEL_CHARS {
                warnings.push(format!(
                    "{} text exceeds {} characters ({})",
                    field, MAX_LEVEL_CHARS, chars
                ));
            }
        }

        if !errors.is_empty() {
            return ValidationOutcome {
                valid: false,
                data: None,
                errors,
                warnings,
            };
        }

        let data = ValidatedDescriptor {
            code: code.to_string(),
            criterion_name: criterion.to_string(),
            excellent: non_empty(&record.excellent),
            good: non_empty(&record.good),
            pass: non_empty(&record.pass),
            below_pass: non_empty(&record.below_pass),
            category: record.category.as_deref().and_then(non_empty),
            skill_name: skill_name.to_string(),
            sector: None,
            source: self.source.clone(),
            version: 1,
            tags: Vec::new(),
        };

        ValidationOutcome {
            valid: true,
            data: Some(data),
            errors,
            warnings,
        }
    }

    /// 複数レコードを有効・無効に振り分ける（レコード間の依存なし）
    pub fn validate_batch(&self, records: &[RawDescriptor]) -> BatchValidation {
        let mut batch = BatchValidation::default();

        for record in records {
            let outcome = self.validate(record);
            if !outcome.warnings.is_empty() {
                batch.warnings.push(RecordWarnings {
                    record: record.clone(),
                    warnings: outcome.warnings,
                });
            }
            match outcome.data {
                Some(data) => batch.valid.push(data),
                None => batch.invalid.push(InvalidRecord {
                    record: record.clone(),
                    errors: outcome.errors,
                }),
            }
        }

        batch
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
