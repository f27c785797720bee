use crate::error::{ImportError, Result};
use marking_scheme_common::extract_skill_name_from_filename;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct SchemeFile {
    pub path: PathBuf,
    pub file_name: String,
    pub skill_name: String,
}

impl SchemeFile {
    fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let skill_name = extract_skill_name_from_filename(&file_name);
        Self {
            path: path.to_path_buf(),
            file_name,
            skill_name,
        }
    }
}

/// Excelのロックファイル（`~$`で始まる）は対象外
fn is_scheme_file(path: &Path) -> bool {
    let is_xlsx = path
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    let is_lock = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with("~$"))
        .unwrap_or(false);
    is_xlsx && !is_lock
}

pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<SchemeFile>> {
    if !folder.is_dir() {
        return Err(ImportError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<SchemeFile> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_scheme_file(e.path()))
        .map(|e| SchemeFile::from_path(e.path()))
        .collect();

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

/// ファイル・フォルダ指定を取込対象ファイルに展開する
///
/// 明示指定のファイルは拡張子を問わずそのまま対象にする。
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<SchemeFile>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(scan_folder(input, recursive)?);
        } else if input.is_file() {
            files.push(SchemeFile::from_path(input));
        } else {
            return Err(ImportError::FileNotFound(input.display().to_string()));
        }
    }

    Ok(files)
}
