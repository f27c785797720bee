//! 表形式マーキングスキームのパーサー
//!
//! 1行=1基準、4段階のスコア列を持つレイアウトを対象とする。
//! ヘッダー行と列はファイルごとにヒューリスティックに検出する。

use super::{merge_warnings, skill_name_for, ParseResult};
use crate::error::{Result, StructuralError};
use crate::sheet::{detect_header, map_columns, SchemeField, SchemeWorkbook, Worksheet, FIELD_PATTERNS};
use marking_scheme_common::{detect_encoding_issues, normalize, RawDescriptor};
use std::path::Path;

/// 優先して選ぶシート名
const PREFERRED_SHEETS: &[&str] = &["Marking Scheme", "MS"];
/// シート名に含まれていれば選ぶ語
const SHEET_KEYWORDS: &[&str] = &["mark", "criteria"];
/// カテゴリとして採用する最大文字数（未満）
const MAX_CATEGORY_CHARS: usize = 100;
const MIN_CRITERION_CHARS: usize = 2;
const MEANINGFUL_CRITERION_CHARS: usize = 5;

/// 対象シートを選ぶ
pub fn select_sheet(names: &[String]) -> Option<&str> {
    if let Some(name) = names
        .iter()
        .find(|n| PREFERRED_SHEETS.contains(&n.as_str()))
    {
        return Some(name);
    }

    if let Some(name) = names.iter().find(|n| {
        let lower = n.to_lowercase();
        SHEET_KEYWORDS.iter().any(|k| lower.contains(k))
    }) {
        return Some(name);
    }

    names.first().map(|n| n.as_str())
}

/// ファイルを解析する
///
/// ファイルが存在しない場合のみ `Err`。ブックが開けない等の構造エラーは
/// 結果の `errors` に入る。
pub fn parse(path: &Path) -> Result<ParseResult<RawDescriptor>> {
    super::ensure_exists(path)?;
    let skill_name = skill_name_for(path);

    let mut workbook = match SchemeWorkbook::open(path) {
        Ok(wb) => wb,
        Err(e) => return Ok(ParseResult::failed(StructuralError::Unreadable(e.to_string()))),
    };

    let names = workbook.sheet_names();
    let Some(sheet_name) = select_sheet(&names).map(str::to_string) else {
        return Ok(ParseResult::failed(StructuralError::NoWorksheet));
    };

    let sheet = match workbook.worksheet(&sheet_name) {
        Ok(sheet) => sheet,
        Err(e) => return Ok(ParseResult::failed(StructuralError::Unreadable(e.to_string()))),
    };

    Ok(parse_sheet(&sheet, &skill_name))
}

/// 行をまたいで引き継ぐ状態（1回の解析内でのみ有効）
#[derive(Debug, Default)]
struct TabularState {
    /// 結合セルのカテゴリは先頭行にしか値がないため、次の値が出るまで引き継ぐ
    current_category: Option<String>,
}

/// 読み込み済みシートを解析する
pub fn parse_sheet(sheet: &Worksheet, skill_name: &str) -> ParseResult<RawDescriptor> {
    let Some(header) = detect_header(sheet) else {
        return ParseResult::failed(StructuralError::NoHeader(sheet.name().to_string()));
    };

    let mapping = map_columns(&header.columns, FIELD_PATTERNS);
    tracing::debug!(
        "ヘッダー検出: {}行目 ({}列) {:?} - {}",
        header.row,
        header.columns.len(),
        mapping,
        sheet.name()
    );

    if !mapping.contains(SchemeField::CriterionName) && !mapping.contains(SchemeField::Code) {
        return ParseResult::failed(StructuralError::MissingColumns(header.column_names()));
    }

    let mut result = ParseResult::default();
    let mut state = TabularState::default();

    let raw = |row: u32, field: SchemeField| -> String {
        mapping
            .get(field)
            .map(|col| sheet.read_cell(row, col))
            .unwrap_or_default()
    };

    for row in (header.row + 1)..=sheet.row_count() {
        if mapping.contains(SchemeField::Category) {
            let category = normalize(&raw(row, SchemeField::Category));
            if !category.is_empty() && category.chars().count() < MAX_CATEGORY_CHARS {
                state.current_category = Some(category);
            }
        }

        let raw_code = raw(row, SchemeField::Code);
        let raw_criterion = if mapping.contains(SchemeField::CriterionName) {
            raw(row, SchemeField::CriterionName)
        } else {
            raw_code.clone()
        };

        let criterion_name = normalize(&raw_criterion);
        let criterion_chars = criterion_name.chars().count();
        if criterion_chars < MIN_CRITERION_CHARS {
            continue;
        }

        let code_text = normalize(&raw_code);
        let raw_scores = [
            raw(row, SchemeField::Excellent),
            raw(row, SchemeField::Good),
            raw(row, SchemeField::Pass),
            raw(row, SchemeField::BelowPass),
        ];
        let scores = raw_scores.clone().map(|s| normalize(&s));

        let no_scores = scores.iter().all(|s| s.is_empty());
        if code_text.is_empty() && no_scores && criterion_chars < MEANINGFUL_CRITERION_CHARS {
            tracing::debug!("内容のない行をスキップ: {}行目", row);
            continue;
        }

        let warnings = merge_warnings(
            std::iter::once(raw_criterion.as_str())
                .chain(raw_scores.iter().map(String::as_str))
                .map(detect_encoding_issues),
        );

        let code = if code_text.is_empty() {
            format!("R{}", row)
        } else {
            code_text
        };
        let [excellent, good, pass, below_pass] = scores;

        result.descriptors.push(RawDescriptor {
            code,
            criterion_name,
            excellent,
            good,
            pass,
            below_pass,
            category: state.current_category.clone(),
            skill_name: skill_name.to_string(),
            warnings,
        });
    }

    if result.descriptors.is_empty() {
        result
            .warnings
            .push(format!("No descriptors extracted from worksheet \"{}\"", sheet.name()));
    }

    result
}
