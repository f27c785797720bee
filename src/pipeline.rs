//! 複数ファイルの取込パイプライン
//!
//! 解析 → 検証 → 一括登録 を順に行い、ファイル単位の要約と登録結果をまとめて返す。

use crate::error::{ImportError, Result};
use crate::importer::{import_descriptors, ImportOptions, ImportResult};
use crate::parser::{parse_scheme, JudgementStats, SchemeFormat};
use crate::store::DescriptorStore;
use marking_scheme_common::{InvalidRecord, RawDescriptor, Validator, DEFAULT_SOURCE_TAG};
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// パイプラインのオプション
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub format: SchemeFormat,
    pub import: ImportOptions,
    /// 登録レコードに付与するソースタグ
    pub source_tag: String,
    /// 検証までで止め、保存先には書き込まない
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            format: SchemeFormat::Auto,
            import: ImportOptions::default(),
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            dry_run: false,
        }
    }
}

/// 1ファイルの解析要約
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub path: PathBuf,
    pub format: SchemeFormat,
    pub skill_name: String,
    pub descriptor_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<JudgementStats>,
}

impl FileSummary {
    /// 構造エラーで取込対象外になったか
    pub fn skipped(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// パイプライン全体の結果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub files: Vec<FileSummary>,
    pub candidate_count: usize,
    pub valid_count: usize,
    pub invalid: Vec<InvalidRecord>,
    /// 品質警告が付いたレコード数
    pub warning_count: usize,
    /// ドライラン時はNone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportResult>,
}

impl PipelineReport {
    pub fn skipped_files(&self) -> usize {
        self.files.iter().filter(|f| f.skipped()).count()
    }
}

/// ファイル群を解析・検証し、有効なレコードを登録する
///
/// 構造エラーのあるファイルはレポートに残して取込対象から外す。
/// ファイルが存在しない場合や保存先の障害はエラーで返す。
pub fn run_pipeline<S>(
    files: &[PathBuf],
    options: &PipelineOptions,
    store: &mut S,
    cancel: &CancellationToken,
) -> Result<PipelineReport>
where
    S: DescriptorStore + ?Sized,
{
    let mut report = PipelineReport::default();
    let mut candidates: Vec<RawDescriptor> = Vec::new();

    for (i, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("解析を中断: {}/{} ファイル完了", i, files.len());
            return Err(ImportError::Cancelled { completed_batches: 0 });
        }

        let parsed = parse_scheme(path, options.format)?;
        let summary = FileSummary {
            path: path.clone(),
            format: parsed.format,
            skill_name: parsed.skill_name.clone(),
            descriptor_count: parsed.result.descriptors.len(),
            errors: parsed.result.errors,
            warnings: parsed.result.warnings,
            stats: parsed.stats,
        };

        if summary.skipped() {
            warn!("スキップ: {} ({})", path.display(), summary.errors.join("; "));
        } else {
            info!(
                "解析: {} [{}] {}件",
                path.display(),
                summary.format,
                summary.descriptor_count
            );
            candidates.extend(parsed.result.descriptors);
        }
        report.files.push(summary);
    }

    let validator = Validator::new(options.source_tag.clone());
    let validation = validator.validate_batch(&candidates);
    debug!(
        "検証: 有効 {}件, 無効 {}件, 警告 {}件",
        validation.valid.len(),
        validation.invalid.len(),
        validation.warnings.len()
    );

    report.candidate_count = candidates.len();
    report.valid_count = validation.valid.len();
    report.warning_count = validation.warnings.len();
    report.invalid = validation.invalid;

    if options.dry_run {
        info!("ドライラン: {}件は登録しません", report.valid_count);
        return Ok(report);
    }

    report.import = Some(import_descriptors(
        store,
        &validation.valid,
        &options.import,
        cancel,
    )?);

    Ok(report)
}
