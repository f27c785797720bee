//! 試験用Excelファイルの生成
//!
//! rust_xlsxwriterで実際の.xlsxを書き出し、calamine経由で読み戻す。

#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

/// 表形式のスキーム
///
/// Safetyカテゴリは3〜4行目の結合セル。
pub fn write_tabular(dir: &Path, file_name: &str) -> Result<PathBuf, XlsxError> {
    let path = dir.join(file_name);
    let mut workbook = Workbook::new();

    let cover = workbook.add_worksheet();
    cover.set_name("Cover")?;
    cover.write_string(0, 0, "WorldSkills National Competition")?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Marking Scheme")?;
    sheet.write_string(0, 0, "Welding Marking Scheme")?;

    let header = ["Category", "Code", "Criterion", "Excellent", "Good", "Pass", "Below Pass"];
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(1, col as u16, *name)?;
    }

    sheet.merge_range(2, 0, 3, 0, "Safety", &Format::new())?;
    write_row(
        sheet,
        2,
        &["A1", "Wears PPE correctly", "Always, unprompted", "Mostly", "When reminded", "Rarely"],
    )?;
    write_row(sheet, 3, &["A2", "Tool handling safety", "No unsafe handling observed", "", "", ""])?;

    sheet.write_string(4, 0, "Quality")?;
    write_row(
        sheet,
        4,
        &["B1", "Weld bead consistency", "Uniform throughout", "Minor variation", "Visible variation", "Inconsistent"],
    )?;

    // 基準名が短すぎる行
    write_row(sheet, 5, &["", "x", "", "", "", ""])?;
    // コード・スコアなしの短い注記
    write_row(sheet, 6, &["", "Note", "", "", "", ""])?;
    // コードなしでも十分な基準名があれば合成コードで残る
    write_row(sheet, 7, &["", "Overall presentation", "", "", "", ""])?;

    workbook.save(&path)?;
    Ok(path)
}

/// B列以降（コード・基準名・4段階スコア）を書く
fn write_row(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    values: &[&str],
) -> Result<(), XlsxError> {
    for (i, value) in values.iter().enumerate() {
        if !value.is_empty() {
            sheet.write_string(row, i as u16 + 1, *value)?;
        }
    }
    Ok(())
}

/// ジャッジメント形式のスキーム
pub fn write_judgement(dir: &Path, file_name: &str) -> Result<PathBuf, XlsxError> {
    let path = dir.join(file_name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("CIS Marking Scheme Import")?;

    // 行は0始まり（シート上の1行目 = 0）
    sheet.write_string(0, 0, "A1")?;
    sheet.write_string(0, 1, "Presentation")?;
    sheet.write_string(1, 3, "J")?;
    sheet.write_string(1, 4, "Plate appeal")?;
    write_levels(sheet, 2, &["Unappealing", "Plain", "Attractive", "Stunning"])?;

    sheet.write_string(6, 3, "M")?;
    sheet.write_string(6, 4, "Portion weight within tolerance")?;

    sheet.write_string(7, 0, "B1")?;
    sheet.write_string(7, 1, "Technique")?;
    sheet.write_string(8, 3, "J")?;
    sheet.write_string(8, 4, "Knife skills")?;
    write_levels(sheet, 9, &["Unsafe", "Basic", "Competent", "Precise"])?;

    workbook.save(&path)?;
    Ok(path)
}

/// スコア0〜3のレベル行を4行書く（スコアは数値セル）
fn write_levels(
    sheet: &mut rust_xlsxwriter::Worksheet,
    first_row: u32,
    levels: &[&str; 4],
) -> Result<(), XlsxError> {
    for (score, text) in levels.iter().enumerate() {
        let row = first_row + score as u32;
        sheet.write_number(row, 5, score as f64)?;
        sheet.write_string(row, 6, *text)?;
    }
    Ok(())
}

/// ヘッダー行のないシート
pub fn write_headerless(dir: &Path, file_name: &str) -> Result<PathBuf, XlsxError> {
    let path = dir.join(file_name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Marking Scheme")?;
    sheet.write_string(0, 0, "Only")?;
    sheet.write_string(1, 0, "single")?;
    sheet.write_string(2, 1, "cells")?;
    workbook.save(&path)?;
    Ok(path)
}

/// 拡張子だけ.xlsxの壊れたファイル
pub fn write_corrupt(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, "this is not a zip archive").unwrap();
    path
}
