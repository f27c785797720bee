//! セルテキストの正規化
//!
//! - Unicode正規化（NFC）
//! - スマートクォート・箇条書き記号・ダッシュ・特殊空白の統一
//! - 制御文字除去、改行・空白の整理
//! - 文字化け（mojibake）等のエンコーディング異常検出
//! - ファイル名からのスキル名抽出

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// この長さを超えて空白を一切含まない文字列は破損を疑う
const LONG_UNBROKEN_LIMIT: usize = 500;

const SINGLE_QUOTES: &[char] = &['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{2032}', '\u{2039}', '\u{203A}'];
const DOUBLE_QUOTES: &[char] = &['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{2033}', '\u{00AB}', '\u{00BB}'];

const BULLETS: &[char] = &[
    '\u{2022}', // •
    '\u{2023}', // ‣
    '\u{2043}', // ⁃
    '\u{2219}', // ∙
    '\u{25AA}', // ▪
    '\u{25AB}', // ▫
    '\u{25A0}', // ■
    '\u{25A1}', // □
    '\u{25CF}', // ●
    '\u{25CB}', // ○
    '\u{25E6}', // ◦
    '\u{25B6}', // ▶
    '\u{25BA}', // ►
    '\u{27A2}', // ➢
    '\u{F0B7}', // Wingdings由来の箇条書き
];

const DASHES: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}',
    '\u{2212}', '\u{FE58}', '\u{FE63}', '\u{FF0D}',
];

/// 通常の空白に置き換える特殊空白
fn is_exotic_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// 幅ゼロ文字（削除する）
fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{FEFF}')
}

fn map_char(c: char) -> Option<char> {
    if SINGLE_QUOTES.contains(&c) {
        Some('\'')
    } else if DOUBLE_QUOTES.contains(&c) {
        Some('"')
    } else if BULLETS.contains(&c) || DASHES.contains(&c) {
        Some('-')
    } else if is_exotic_space(c) {
        Some(' ')
    } else if is_zero_width(c) {
        None
    } else if c.is_control() && !matches!(c, '\n' | '\t' | '\r') {
        None
    } else {
        Some(c)
    }
}

/// テキストを正規化する
///
/// 冪等（`normalize(&normalize(x)) == normalize(x)`）で、失敗しない。
///
/// # Examples
/// ```
/// use marking_scheme_common::normalize;
///
/// let text = normalize("Good \u{2018}quality\u{2019} \u{2022} item");
/// assert_eq!(text, "Good 'quality' - item");
/// ```
pub fn normalize(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t]+").unwrap();
        static ref BLANK_LINES: Regex = Regex::new(r"\n(?:[ ]*\n){2,}").unwrap();
    }

    if text.is_empty() {
        return String::new();
    }

    let composed: String = text.nfc().collect();
    let mapped: String = composed.chars().filter_map(map_char).collect();
    let unified = mapped.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = HORIZONTAL_WS.replace_all(&unified, " ");
    let capped = BLANK_LINES.replace_all(&collapsed, "\n\n");

    // 制御文字除去で結合文字が隣接する場合があるため再合成する
    capped.trim().nfc().collect()
}

/// エンコーディング異常の可能性を検出する（警告のみ、処理は止めない）
pub fn detect_encoding_issues(text: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        // UTF-8のアクセント付きラテン文字をCP1252/Latin-1で読んだ痕跡
        static ref LATIN_MOJIBAKE: Regex = Regex::new(
            "[ÃÂ][\u{00A0}-\u{00BF}€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ]"
        ).unwrap();
        // スマートクォート・ダッシュの化け（â€™, â€œ, â€“ など）
        static ref PUNCT_MOJIBAKE: Regex = Regex::new("â€[™œ˜“”¦¢\u{009C}\u{009D}\u{0090}-\u{0094}]?").unwrap();
    }

    let mut warnings = Vec::new();
    if text.is_empty() {
        return warnings;
    }

    if LATIN_MOJIBAKE.is_match(text) {
        warnings.push("Possible mojibake: accented characters decoded with the wrong encoding".to_string());
    }
    if PUNCT_MOJIBAKE.is_match(text) {
        warnings.push("Possible mojibake: smart quotes or dashes decoded with the wrong encoding".to_string());
    }
    if text.contains('\u{FFFD}') {
        warnings.push("Contains Unicode replacement character (U+FFFD)".to_string());
    }
    if text.chars().any(|c| c.is_control() && !matches!(c, '\n' | '\t' | '\r')) {
        warnings.push("Contains raw control characters".to_string());
    }
    if text.chars().any(is_private_use) {
        warnings.push("Contains Private Use Area characters".to_string());
    }
    if text.chars().count() > LONG_UNBROKEN_LIMIT && !text.chars().any(char::is_whitespace) {
        warnings.push(format!(
            "Text longer than {} characters without whitespace (possible encoding corruption)",
            LONG_UNBROKEN_LIMIT
        ));
    }

    warnings
}

fn is_private_use(c: char) -> bool {
    matches!(
        c,
        '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{FFFFD}' | '\u{100000}'..='\u{10FFFD}'
    )
}

/// ファイル名からスキル名を抽出する
///
/// `{番号}_{Skill_Name}_marking_scheme{任意}.xlsx` の命名規則を前提とする。
///
/// # Examples
/// ```
/// use marking_scheme_common::extract_skill_name_from_filename;
///
/// let name = extract_skill_name_from_filename("01_Industrial_Mechanics_marking_scheme (f).xlsx");
/// assert_eq!(name, "Industrial Mechanics");
/// ```
pub fn extract_skill_name_from_filename(file_name: &str) -> String {
    lazy_static::lazy_static! {
        static ref EXTENSION: Regex = Regex::new(r"(?i)\.xlsx$").unwrap();
        static ref ORDINAL_PREFIX: Regex = Regex::new(r"^[\d_\-.\s]+").unwrap();
        static ref SCHEME_SUFFIX: Regex = Regex::new(r"(?i)_marking_scheme.*$").unwrap();
        static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    }

    let name = EXTENSION.replace(file_name, "");
    let name = ORDINAL_PREFIX.replace(&name, "");
    let name = SCHEME_SUFFIX.replace(&name, "");
    let name = name.replace('_', " ");
    WHITESPACE.replace_all(&name, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // normalize テスト
    // =============================================

    #[test]
    fn test_normalize_quotes_and_bullets() {
        assert_eq!(
            normalize("Good \u{2018}quality\u{2019} \u{2022} item"),
            "Good 'quality' - item"
        );
        assert_eq!(normalize("\u{201C}quoted\u{201D}"), "\"quoted\"");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t  "), "");
    }

    #[test]
    fn test_normalize_nfc() {
        // e + 結合アキュート → é
        assert_eq!(normalize("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_normalize_spaces_and_dashes() {
        assert_eq!(normalize("a\u{00A0}\u{2003}b"), "a b");
        assert_eq!(normalize("10\u{2013}20 \u{2014} range"), "10-20 - range");
        assert_eq!(normalize("zero\u{200B}width"), "zerowidth");
    }

    #[test]
    fn test_normalize_control_and_line_endings() {
        assert_eq!(normalize("line1\r\nline2\rline3"), "line1\nline2\nline3");
        assert_eq!(normalize("bell\u{0007}ed"), "belled");
        assert_eq!(normalize("tab\tseparated"), "tab separated");
    }

    #[test]
    fn test_normalize_blank_lines_capped() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n  \n \nb"), "a\n\nb");
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "",
            "already canonical",
            "Good \u{2018}quality\u{2019} \u{2022} item",
            "  lots   of\t\tspace \r\n\r\n\r\n\r\nend  ",
            "e\u{0007}\u{0301}",
            "\u{FEFF}bom \u{00A0} nbsp \u{2212} minus",
            "a\n \n \n \nb",
            "\u{201E}low\u{201C} \u{25CF} dot \u{2010} hyphen",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "冪等でない: {:?}", sample);
        }
    }

    // =============================================
    // detect_encoding_issues テスト
    // =============================================

    #[test]
    fn test_detect_plain_ascii() {
        assert!(detect_encoding_issues("Plain ASCII text, nothing to see").is_empty());
        assert!(detect_encoding_issues("").is_empty());
    }

    #[test]
    fn test_detect_replacement_character() {
        let warnings = detect_encoding_issues("broken \u{FFFD} text");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("replacement character"));
    }

    #[test]
    fn test_detect_latin_mojibake() {
        let warnings = detect_encoding_issues("CafÃ© rÃ©sumÃ©");
        assert!(warnings.iter().any(|w| w.contains("accented characters")));
    }

    #[test]
    fn test_detect_punctuation_mojibake() {
        let warnings = detect_encoding_issues("Donâ€™t do that â€“ ever");
        assert!(warnings.iter().any(|w| w.contains("smart quotes")));
    }

    #[test]
    fn test_detect_control_and_private_use() {
        let warnings = detect_encoding_issues("ctrl\u{0002} and \u{E000}");
        assert!(warnings.iter().any(|w| w.contains("control characters")));
        assert!(warnings.iter().any(|w| w.contains("Private Use Area")));
    }

    #[test]
    fn test_detect_long_unbroken() {
        let long = "x".repeat(501);
        let warnings = detect_encoding_issues(&long);
        assert!(warnings.iter().any(|w| w.contains("without whitespace")));

        let exactly = "x".repeat(500);
        assert!(detect_encoding_issues(&exactly).is_empty());
    }

    #[test]
    fn test_detect_multiple() {
        let warnings = detect_encoding_issues("\u{FFFD}\u{0001}\u{F000}");
        assert_eq!(warnings.len(), 3);
    }

    // =============================================
    // extract_skill_name_from_filename テスト
    // =============================================

    #[test]
    fn test_extract_skill_name() {
        assert_eq!(
            extract_skill_name_from_filename("01_Industrial_Mechanics_marking_scheme (f).xlsx"),
            "Industrial Mechanics"
        );
        assert_eq!(
            extract_skill_name_from_filename("17_Web_Technologies_Marking_Scheme.XLSX"),
            "Web Technologies"
        );
        assert_eq!(
            extract_skill_name_from_filename("Cooking_marking_scheme_v2_final.xlsx"),
            "Cooking"
        );
    }

    #[test]
    fn test_extract_skill_name_without_suffix() {
        assert_eq!(extract_skill_name_from_filename("05 - Welding.xlsx"), "Welding");
        assert_eq!(extract_skill_name_from_filename("Bakery__Pastry.xlsx"), "Bakery Pastry");
    }
}
