//! ディスクリプタ一括登録
//!
//! 検証済みレコードを固定サイズのバッチに分割し、保存先へ順番に登録する。
//! バッチは並列化しない（エラーの帰属、重複件数、所要時間の報告を決定的に保つため）。

use crate::error::{ImportError, Result};
use crate::store::DescriptorStore;
use marking_scheme_common::ValidatedDescriptor;
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 既定のバッチサイズ
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 登録オプション
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// バッチ失敗時に次のバッチへ進む
    pub continue_on_error: bool,
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// バッチ単位の結果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// 1始まり
    pub batch_number: usize,
    pub record_count: usize,
    pub success: bool,
    pub inserted_count: usize,
    pub duplicate_count: usize,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// 登録全体の結果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// 入力件数（どこまで処理したかに関係なく常に入力件数）
    pub total_processed: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub duplicate_count: usize,
    pub batches: Vec<BatchResult>,
    pub duration_ms: u64,
}

/// ディスクリプタを一括登録する
///
/// # Arguments
/// * `store` - 保存先
/// * `records` - 検証済みレコード（入力順に登録）
/// * `options` - バッチサイズ・エラー時の継続可否
/// * `cancel` - 各バッチの前に確認する中断トークン
///
/// # Returns
/// * `Ok(ImportResult)` - 全バッチ処理済み（失敗バッチを含み得る）
/// * `Err(BatchFailed)` - `continue_on_error = false` でバッチが失敗した
/// * `Err(Cancelled)` - 中断された
///
/// どちらのエラーでも、それまでに登録済みのバッチは取り消さない。
pub fn import_descriptors<S>(
    store: &mut S,
    records: &[ValidatedDescriptor],
    options: &ImportOptions,
    cancel: &CancellationToken,
) -> Result<ImportResult>
where
    S: DescriptorStore + ?Sized,
{
    let started = Instant::now();
    let batch_size = options.batch_size.max(1);
    let total_batches = records.len().div_ceil(batch_size);

    let mut result = ImportResult {
        total_processed: records.len(),
        ..Default::default()
    };

    for (index, chunk) in records.chunks(batch_size).enumerate() {
        let batch_number = index + 1;
        if cancel.is_cancelled() {
            warn!("登録を中断: {}/{} バッチ完了", index, total_batches);
            return Err(ImportError::Cancelled {
                completed_batches: index,
            });
        }

        let batch_started = Instant::now();
        let outcome = store.insert_skip_duplicates(chunk);
        let duration_ms = batch_started.elapsed().as_millis() as u64;

        match outcome {
            Ok(inserted) => {
                let duplicates = chunk.len().saturating_sub(inserted);
                info!(
                    "バッチ {}/{}: {}件中 {}件登録, 重複 {}件 ({} ms)",
                    batch_number,
                    total_batches,
                    chunk.len(),
                    inserted,
                    duplicates,
                    duration_ms
                );
                result.success_count += inserted;
                result.duplicate_count += duplicates;
                result.batches.push(BatchResult {
                    batch_number,
                    record_count: chunk.len(),
                    success: true,
                    inserted_count: inserted,
                    duplicate_count: duplicates,
                    error: None,
                    duration_ms,
                });
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    "バッチ {}/{} 失敗 ({}件): {}",
                    batch_number,
                    total_batches,
                    chunk.len(),
                    message
                );
                if !options.continue_on_error {
                    return Err(ImportError::BatchFailed {
                        batch: batch_number,
                        message,
                    });
                }
                result.failed_count += chunk.len();
                result.batches.push(BatchResult {
                    batch_number,
                    record_count: chunk.len(),
                    success: false,
                    inserted_count: 0,
                    duplicate_count: 0,
                    error: Some(message),
                    duration_ms,
                });
            }
        }
    }

    result.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        "登録完了: 対象 {}件, 登録 {}件, 重複 {}件, 失敗 {}件 ({} ms)",
        result.total_processed,
        result.success_count,
        result.duplicate_count,
        result.failed_count,
        result.duration_ms
    );

    Ok(result)
}

/// 件数を取得する
pub fn count_descriptors<S>(store: &S, source: Option<&str>) -> Result<u64>
where
    S: DescriptorStore + ?Sized,
{
    store.count(source)
}

/// ソースタグ指定で削除する（再取込・取り消し用）
pub fn delete_descriptors_by_source<S>(store: &mut S, source: &str) -> Result<u64>
where
    S: DescriptorStore + ?Sized,
{
    let deleted = store.delete_by_source(source)?;
    info!("ソース \"{}\" のディスクリプタを {}件削除", source, deleted);
    Ok(deleted)
}
