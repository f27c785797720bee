//! ディスクリプタの型定義
//!
//! パイプライン各段で受け渡される型:
//! - RawDescriptor: 表形式パーサーの出力
//! - JudgementDescriptor: ジャッジメント形式パーサーの出力
//! - ValidatedDescriptor: 検証済み・保存可能なレコード

use serde::{Deserialize, Serialize};

/// 表形式（1行=1基準、4段階スコア列）から抽出したディスクリプタ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDescriptor {
    pub code: String,
    pub criterion_name: String,
    pub excellent: String,
    pub good: String,
    pub pass: String,
    pub below_pass: String,
    pub category: Option<String>,
    pub skill_name: String,
    pub warnings: Vec<String>,
}

impl RawDescriptor {
    /// 4段階のスコアテキスト（上位から）
    pub fn score_texts(&self) -> [(&'static str, &str); 4] {
        [
            ("excellent", self.excellent.as_str()),
            ("good", self.good.as_str()),
            ("pass", self.pass.as_str()),
            ("belowPass", self.below_pass.as_str()),
        ]
    }
}

/// ジャッジメントブロック（基準行+4レベル行）から抽出したディスクリプタ
///
/// `level0` が最低、`level3` が最高。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JudgementDescriptor {
    pub code: String,
    pub criterion_name: String,
    pub category: String,
    pub level0: String,
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub skill_name: String,
    pub warnings: Vec<String>,
}

impl JudgementDescriptor {
    /// 記録済みレベル数
    pub fn level_count(&self) -> usize {
        [&self.level0, &self.level1, &self.level2, &self.level3]
            .iter()
            .filter(|l| !l.is_empty())
            .count()
    }
}

/// レベル3→excellent、レベル0→belowPass の対応で検証用の形に揃える
impl From<JudgementDescriptor> for RawDescriptor {
    fn from(j: JudgementDescriptor) -> Self {
        RawDescriptor {
            code: j.code,
            criterion_name: j.criterion_name,
            excellent: j.level3,
            good: j.level2,
            pass: j.level1,
            below_pass: j.level0,
            category: if j.category.is_empty() { None } else { Some(j.category) },
            skill_name: j.skill_name,
            warnings: j.warnings,
        }
    }
}

/// 保存可能なレコード
///
/// 保存先では (`skill_name`, `code`) が一意キー。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDescriptor {
    pub code: String,
    pub criterion_name: String,
    pub excellent: Option<String>,
    pub good: Option<String>,
    pub pass: Option<String>,
    pub below_pass: Option<String>,
    pub category: Option<String>,
    pub skill_name: String,
    /// 後段で付与（取込時は常にNone）
    pub sector: Option<String>,
    pub source: String,
    pub version: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ValidatedDescriptor {
    /// 一意キー
    pub fn key(&self) -> (&str, &str) {
        (self.skill_name.as_str(), self.code.as_str())
    }
}
