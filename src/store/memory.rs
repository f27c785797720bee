use super::DescriptorStore;
use crate::error::{ImportError, Result};
use marking_scheme_common::ValidatedDescriptor;
use std::collections::HashSet;

/// メモリ上の保存先
///
/// SQLite版と同じ一意キーでスキップする。ドライランと試験で使う。
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<ValidatedDescriptor>,
    keys: HashSet<(String, String)>,
    insert_calls: usize,
    failing_calls: HashSet<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// n回目（1始まり）の一括登録を失敗させる
    pub fn fail_on_insert_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// 一括登録の呼び出し回数
    pub fn insert_calls(&self) -> usize {
        self.insert_calls
    }
}

impl DescriptorStore for MemoryStore {
    fn insert_skip_duplicates(&mut self, records: &[ValidatedDescriptor]) -> Result<usize> {
        self.insert_calls += 1;
        if self.failing_calls.contains(&self.insert_calls) {
            return Err(ImportError::Storage(format!(
                "insert call {} rejected",
                self.insert_calls
            )));
        }

        let mut inserted = 0;
        for record in records {
            if self.keys.insert(owned_key(record)) {
                self.records.push(record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn count(&self, source: Option<&str>) -> Result<u64> {
        let count = self
            .records
            .iter()
            .filter(|r| source.map_or(true, |s| r.source == s))
            .count();
        Ok(count as u64)
    }

    fn delete_by_source(&mut self, source: &str) -> Result<u64> {
        let before = self.records.len();
        self.records.retain(|r| r.source != source);
        self.keys = self.records.iter().map(owned_key).collect();
        Ok((before - self.records.len()) as u64)
    }
}

fn owned_key(record: &ValidatedDescriptor) -> (String, String) {
    let (skill_name, code) = record.key();
    (skill_name.to_string(), code.to_string())
}
