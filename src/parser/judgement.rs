//! ジャッジメント形式（CISエクスポート）のパーサー
//!
//! 「基準行 + 4レベル行」のブロック構造を固定列で読む。
//!
//! | 列 | 内容 |
//! |----|------|
//! | A | サブ基準ID（例: `A1`） |
//! | B | サブ基準名 |
//! | D | アスペクト種別（`M`=計測, `J`=ジャッジメント） |
//! | E | アスペクト説明 |
//! | F | スコア（0〜3） |
//! | G | レベル説明 |

use super::{merge_warnings, skill_name_for, ParseResult};
use crate::error::{Result, StructuralError};
use crate::sheet::{SchemeWorkbook, Worksheet};
use marking_scheme_common::{detect_encoding_issues, normalize, JudgementDescriptor};
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// 対象シート名
pub const JUDGEMENT_SHEET: &str = "CIS Marking Scheme Import";

const COL_SUBCRITERION_ID: u32 = 1;
const COL_SUBCRITERION_NAME: u32 = 2;
const COL_ASPECT_TYPE: u32 = 4;
const COL_ASPECT_DESCRIPTION: u32 = 5;
const COL_SCORE: u32 = 6;
const COL_LEVEL_DESCRIPTION: u32 = 7;

/// ジャッジメント行に続くレベル行の数
const LEVEL_WINDOW: u32 = 4;
const MIN_CRITERION_CHARS: usize = 3;

/// 解析統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgementStats {
    pub total_rows: u32,
    pub judgement_criteria: u32,
    pub measurement_criteria: u32,
}

/// ジャッジメント形式の解析結果
#[derive(Debug, Clone, Default)]
pub struct JudgementParseResult {
    pub descriptors: Vec<JudgementDescriptor>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: JudgementStats,
}

impl From<ParseResult<JudgementDescriptor>> for JudgementParseResult {
    fn from(result: ParseResult<JudgementDescriptor>) -> Self {
        Self {
            descriptors: result.descriptors,
            errors: result.errors,
            warnings: result.warnings,
            stats: JudgementStats::default(),
        }
    }
}

/// 行をまたいで引き継ぐ状態（1回の解析内でのみ有効）
#[derive(Debug, Default)]
struct JudgementState {
    current_criterion_id: Option<String>,
    current_category: String,
    judgement_counter: u32,
    measurement_counter: u32,
}

impl JudgementState {
    fn next_code(&self) -> String {
        match &self.current_criterion_id {
            Some(id) => format!("{}-{}", id, self.judgement_counter),
            None => format!("J{}", self.judgement_counter),
        }
    }
}

/// ファイルを解析する
pub fn parse(path: &Path) -> Result<JudgementParseResult> {
    super::ensure_exists(path)?;
    let skill_name = skill_name_for(path);

    let mut workbook = match SchemeWorkbook::open(path) {
        Ok(wb) => wb,
        Err(e) => {
            return Ok(ParseResult::failed(StructuralError::Unreadable(e.to_string())).into())
        }
    };

    if !workbook.sheet_names().iter().any(|n| n == JUDGEMENT_SHEET) {
        return Ok(
            ParseResult::failed(StructuralError::MissingWorksheet(JUDGEMENT_SHEET.to_string()))
                .into(),
        );
    }

    match workbook.worksheet(JUDGEMENT_SHEET) {
        Ok(sheet) => Ok(parse_sheet(&sheet, &skill_name)),
        Err(e) => Ok(ParseResult::failed(StructuralError::Unreadable(e.to_string())).into()),
    }
}

/// 読み込み済みシートを解析する
pub fn parse_sheet(sheet: &Worksheet, skill_name: &str) -> JudgementParseResult {
    lazy_static::lazy_static! {
        static ref CRITERION_ID: Regex = Regex::new(r"^[A-Z]\d+$").unwrap();
    }

    let mut result = JudgementParseResult::default();
    let mut state = JudgementState::default();
    let total_rows = sheet.row_count();

    let mut row = 1;
    while row <= total_rows {
        let id = sheet.read_cell(row, COL_SUBCRITERION_ID).trim().to_string();
        if CRITERION_ID.is_match(&id) {
            let name = normalize(&sheet.read_cell(row, COL_SUBCRITERION_NAME));
            if !name.is_empty() {
                state.current_category = name;
            }
            state.current_criterion_id = Some(id);
            row += 1;
            continue;
        }

        let aspect_type = sheet.read_cell(row, COL_ASPECT_TYPE).trim().to_uppercase();
        match aspect_type.as_str() {
            "M" => {
                state.measurement_counter += 1;
                row += 1;
            }
            "J" => {
                state.judgement_counter += 1;
                let raw_criterion = sheet.read_cell(row, COL_ASPECT_DESCRIPTION);
                let criterion_name = normalize(&raw_criterion);
                if criterion_name.chars().count() < MIN_CRITERION_CHARS {
                    row += 1;
                    continue;
                }

                let (levels, raw_levels) = read_level_window(sheet, row);
                let [level0, level1, level2, level3] = levels;
                let mut descriptor = JudgementDescriptor {
                    code: state.next_code(),
                    criterion_name,
                    category: state.current_category.clone(),
                    level0,
                    level1,
                    level2,
                    level3,
                    skill_name: skill_name.to_string(),
                    warnings: Vec::new(),
                };
                let found = descriptor.level_count();

                if found == 0 {
                    result.warnings.push(format!(
                        "No level descriptions found for \"{}\" at row {}",
                        descriptor.criterion_name, row
                    ));
                } else {
                    descriptor.warnings = merge_warnings(
                        std::iter::once(raw_criterion.as_str())
                            .chain(raw_levels.iter().map(String::as_str))
                            .map(detect_encoding_issues),
                    );
                    if found < LEVEL_WINDOW as usize {
                        descriptor.warnings.push(format!("Only {}/4 levels found", found));
                    }
                    result.descriptors.push(descriptor);
                }

                // 見つかったレベル数にかかわらずブロック分進める
                row += 1 + LEVEL_WINDOW;
            }
            _ => {
                row += 1;
            }
        }
    }

    result.stats = JudgementStats {
        total_rows,
        judgement_criteria: state.judgement_counter,
        measurement_criteria: state.measurement_counter,
    };

    if result.descriptors.is_empty() {
        result
            .warnings
            .push(format!("No descriptors extracted from worksheet \"{}\"", sheet.name()));
    }

    result
}

/// ジャッジメント行の直後4行からレベル説明を読む
///
/// 戻り値は (正規化済みレベル0〜3, 元テキスト)。
fn read_level_window(sheet: &Worksheet, judgement_row: u32) -> ([String; 4], Vec<String>) {
    let mut levels: [String; 4] = Default::default();
    let mut raw_levels = Vec::new();

    for row in (judgement_row + 1)..=(judgement_row + LEVEL_WINDOW) {
        let Some(score) = parse_score(&sheet.read_cell(row, COL_SCORE)) else {
            continue;
        };
        let raw = sheet.read_cell(row, COL_LEVEL_DESCRIPTION);
        let text = normalize(&raw);
        if text.is_empty() {
            continue;
        }
        levels[score] = text;
        raw_levels.push(raw);
    }

    (levels, raw_levels)
}

/// スコアセルを0〜3の整数として読む
///
/// 文字列セルの `"2.0"` も数値セルと同じく2とみなす。
fn parse_score(text: &str) -> Option<usize> {
    let value: f64 = text.trim().parse().ok()?;
    if value.fract() != 0.0 || !(0.0..=3.0).contains(&value) {
        return None;
    }
    Some(value as usize)
}
