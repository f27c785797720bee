//! ディスクリプタの保存先
//!
//! 取込処理が必要とする操作は3つだけ:
//! - 一意キー（skill_name, code）違反を黙ってスキップする一括登録
//! - ソースタグで絞り込める件数取得
//! - ソースタグ指定の一括削除

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use marking_scheme_common::ValidatedDescriptor;
use std::path::Path;

pub trait DescriptorStore {
    /// 一括登録し、実際に書き込んだ件数を返す
    ///
    /// 1回の呼び出しは原子的（全件登録か、エラーで何も登録しない）。
    fn insert_skip_duplicates(&mut self, records: &[ValidatedDescriptor]) -> Result<usize>;

    /// 件数（ソースタグ指定時はそのタグのみ）
    fn count(&self, source: Option<&str>) -> Result<u64>;

    /// ソースタグ指定で削除し、削除件数を返す
    fn delete_by_source(&mut self, source: &str) -> Result<u64>;
}

/// 取込先を開く
///
/// ドライランではデータベースに触れず（ファイルも作らず）メモリ上の保存先を返す。
pub fn open_for_import(database: &Path, dry_run: bool) -> Result<Box<dyn DescriptorStore + Send>> {
    if dry_run {
        Ok(Box::new(MemoryStore::new()))
    } else {
        Ok(Box::new(SqliteStore::open(database)?))
    }
}
