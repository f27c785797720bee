//! 実ファイルの解析テスト
//!
//! rust_xlsxwriterで生成した.xlsxをcalamineで読み戻して解析する

mod fixtures;

use marking_scheme_import::parser::{self, judgement, tabular, SchemeFormat};
use tempfile::tempdir;

// =============================================
// 表形式
// =============================================

#[test]
fn test_tabular_file_with_merged_category() {
    let dir = tempdir().unwrap();
    let path = fixtures::write_tabular(dir.path(), "01_Welding_marking_scheme.xlsx").unwrap();

    let result = tabular::parse(&path).unwrap();
    assert!(result.errors.is_empty(), "構造エラー: {:?}", result.errors);

    let codes: Vec<_> = result.descriptors.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["A1", "A2", "B1", "R8"]);

    let a1 = &result.descriptors[0];
    assert_eq!(a1.criterion_name, "Wears PPE correctly");
    assert_eq!(a1.excellent, "Always, unprompted");
    assert_eq!(a1.below_pass, "Rarely");
    assert_eq!(a1.skill_name, "Welding");

    // 結合セルの2行目も同じカテゴリ
    assert_eq!(result.descriptors[0].category.as_deref(), Some("Safety"));
    assert_eq!(result.descriptors[1].category.as_deref(), Some("Safety"));
    assert_eq!(result.descriptors[2].category.as_deref(), Some("Quality"));
    // 空のカテゴリセルは直前の値を引き継ぐ
    assert_eq!(result.descriptors[3].category.as_deref(), Some("Quality"));
    assert!(result.descriptors[3].excellent.is_empty());
}

#[test]
fn test_headerless_sheet_is_structural_error() {
    let dir = tempdir().unwrap();
    let path = fixtures::write_headerless(dir.path(), "03_Plumbing_marking_scheme.xlsx").unwrap();

    let result = tabular::parse(&path).unwrap();
    assert!(result.descriptors.is_empty());
    assert_eq!(
        result.errors,
        vec!["No header row detected in worksheet \"Marking Scheme\"".to_string()]
    );
}

#[test]
fn test_corrupt_file_is_structural_error() {
    let dir = tempdir().unwrap();
    let path = fixtures::write_corrupt(dir.path(), "04_Broken_marking_scheme.xlsx");

    let result = tabular::parse(&path).unwrap();
    assert!(result.descriptors.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Failed to open workbook"));
}

// =============================================
// ジャッジメント形式
// =============================================

#[test]
fn test_judgement_file() {
    let dir = tempdir().unwrap();
    let path = fixtures::write_judgement(dir.path(), "02_Cooking_marking_scheme.xlsx").unwrap();

    let result = judgement::parse(&path).unwrap();
    assert!(result.errors.is_empty(), "構造エラー: {:?}", result.errors);
    assert_eq!(result.descriptors.len(), 2);

    let first = &result.descriptors[0];
    assert_eq!(first.code, "A1-1");
    assert_eq!(first.category, "Presentation");
    assert_eq!(first.criterion_name, "Plate appeal");
    assert_eq!(first.level0, "Unappealing");
    assert_eq!(first.level3, "Stunning");
    assert_eq!(first.skill_name, "Cooking");

    // カウンタはサブ基準をまたいで続く
    let second = &result.descriptors[1];
    assert_eq!(second.code, "B1-2");
    assert_eq!(second.category, "Technique");
    assert_eq!(second.level2, "Competent");

    assert_eq!(result.stats.judgement_criteria, 2);
    assert_eq!(result.stats.measurement_criteria, 1);
    assert_eq!(result.stats.total_rows, 13);
}

#[test]
fn test_judgement_sheet_missing() {
    let dir = tempdir().unwrap();
    let path = fixtures::write_tabular(dir.path(), "01_Welding_marking_scheme.xlsx").unwrap();

    let result = judgement::parse(&path).unwrap();
    assert!(result.descriptors.is_empty());
    assert_eq!(
        result.errors,
        vec!["Required worksheet \"CIS Marking Scheme Import\" not found".to_string()]
    );
}

// =============================================
// 形式判定
// =============================================

#[test]
fn test_auto_detect_format() {
    let dir = tempdir().unwrap();
    let tab = fixtures::write_tabular(dir.path(), "01_Welding_marking_scheme.xlsx").unwrap();
    let jud = fixtures::write_judgement(dir.path(), "02_Cooking_marking_scheme.xlsx").unwrap();

    assert_eq!(parser::detect_format(&tab).unwrap(), SchemeFormat::Tabular);
    assert_eq!(parser::detect_format(&jud).unwrap(), SchemeFormat::Judgement);

    let parsed = parser::parse_scheme(&jud, SchemeFormat::Auto).unwrap();
    assert_eq!(parsed.format, SchemeFormat::Judgement);
    assert_eq!(parsed.skill_name, "Cooking");
    // レベル3がexcellent、レベル0がbelowPass
    let first = &parsed.result.descriptors[0];
    assert_eq!(first.excellent, "Stunning");
    assert_eq!(first.below_pass, "Unappealing");
    assert_eq!(first.category.as_deref(), Some("Presentation"));
    assert!(parsed.stats.is_some());
}

#[test]
fn test_parse_result_json() {
    let dir = tempdir().unwrap();
    let path = fixtures::write_judgement(dir.path(), "02_Cooking_marking_scheme.xlsx").unwrap();

    let parsed = parser::parse_scheme(&path, SchemeFormat::Auto).unwrap();
    let json = serde_json::to_value(&parsed).unwrap();

    assert_eq!(json["format"], "judgement");
    assert_eq!(json["skillName"], "Cooking");
    assert_eq!(json["descriptors"][0]["code"], "A1-1");
    assert_eq!(json["descriptors"][0]["belowPass"], "Unappealing");
    assert_eq!(json["stats"]["judgementCriteria"], 2);
    assert!(json["errors"].as_array().unwrap().is_empty());
}
