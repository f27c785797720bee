use thiserror::Error;

/// 取込処理のエラー（設定・インフラ障害、中断）
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("データベースエラー: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("保存先エラー: {0}")]
    Storage(String),

    #[error("バッチ {batch} の登録に失敗: {message}")]
    BatchFailed { batch: usize, message: String },

    #[error("処理が中断されました（完了バッチ数: {completed_batches}）")]
    Cancelled { completed_batches: usize },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// ファイル単位の構造エラー
///
/// 例外としては扱わず、パース結果の `errors` に文字列で格納される。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Failed to open workbook: {0}")]
    Unreadable(String),

    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    #[error("Required worksheet \"{0}\" not found")]
    MissingWorksheet(String),

    #[error("No header row detected in worksheet \"{0}\"")]
    NoHeader(String),

    #[error("Could not identify criterion or code columns (detected headers: {0})")]
    MissingColumns(String),
}
