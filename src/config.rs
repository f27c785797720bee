use crate::error::{ImportError, Result};
use crate::importer::DEFAULT_BATCH_SIZE;
use marking_scheme_common::DEFAULT_SOURCE_TAG;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データベースパスを上書きする環境変数
pub const DATABASE_ENV: &str = "MARKING_SCHEME_DB";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 未設定時は ~/.local/share/marking-scheme/descriptors.db
    pub database_path: Option<PathBuf>,
    pub batch_size: usize,
    pub continue_on_error: bool,
    pub source_tag: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            batch_size: DEFAULT_BATCH_SIZE,
            continue_on_error: true,
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ImportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("marking-scheme").join("config.json"))
    }

    /// 実際に使うデータベースパス
    pub fn database_path(&self) -> Result<PathBuf> {
        // 環境変数を優先
        if let Ok(path) = std::env::var(DATABASE_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| ImportError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data_dir.join("marking-scheme").join("descriptors.db"))
    }

    pub fn set_database(&mut self, path: PathBuf) -> Result<()> {
        self.database_path = Some(path);
        self.save()
    }
}
