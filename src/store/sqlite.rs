use super::DescriptorStore;
use crate::error::Result;
use marking_scheme_common::ValidatedDescriptor;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS descriptors (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    code           TEXT NOT NULL,
    criterion_name TEXT NOT NULL,
    excellent      TEXT,
    good           TEXT,
    pass           TEXT,
    below_pass     TEXT,
    category       TEXT,
    skill_name     TEXT NOT NULL,
    sector         TEXT,
    source         TEXT NOT NULL,
    version        INTEGER NOT NULL DEFAULT 1,
    tags           TEXT NOT NULL DEFAULT '[]',
    created_at     TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (skill_name, code)
);
CREATE INDEX IF NOT EXISTS idx_descriptors_source ON descriptors (source);
";

/// SQLiteの保存先
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// 一意キーで1件取得
    pub fn find(&self, skill_name: &str, code: &str) -> Result<Option<ValidatedDescriptor>> {
        let row = self
            .conn
            .query_row(
                "SELECT code, criterion_name, excellent, good, pass, below_pass, category,
                        skill_name, sector, source, version, tags
                 FROM descriptors WHERE skill_name = ?1 AND code = ?2",
                params![skill_name, code],
                |r| {
                    Ok((
                        ValidatedDescriptor {
                            code: r.get(0)?,
                            criterion_name: r.get(1)?,
                            excellent: r.get(2)?,
                            good: r.get(3)?,
                            pass: r.get(4)?,
                            below_pass: r.get(5)?,
                            category: r.get(6)?,
                            skill_name: r.get(7)?,
                            sector: r.get(8)?,
                            source: r.get(9)?,
                            version: r.get(10)?,
                            tags: Vec::new(),
                        },
                        r.get::<_, String>(11)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((mut descriptor, tags_json)) => {
                descriptor.tags = serde_json::from_str(&tags_json)?;
                Ok(Some(descriptor))
            }
            None => Ok(None),
        }
    }
}

impl DescriptorStore for SqliteStore {
    fn insert_skip_duplicates(&mut self, records: &[ValidatedDescriptor]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            // 一意キー違反のみスキップし、それ以外の制約違反はエラーにする
            let mut stmt = tx.prepare(
                "INSERT INTO descriptors (code, criterion_name, excellent, good, pass, below_pass,
                                          category, skill_name, sector, source, version, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT (skill_name, code) DO NOTHING",
            )?;
            for r in records {
                let tags = serde_json::to_string(&r.tags)?;
                inserted += stmt.execute(params![
                    r.code,
                    r.criterion_name,
                    r.excellent,
                    r.good,
                    r.pass,
                    r.below_pass,
                    r.category,
                    r.skill_name,
                    r.sector,
                    r.source,
                    r.version,
                    tags,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn count(&self, source: Option<&str>) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM descriptors WHERE ?1 IS NULL OR source = ?1",
            params![source],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }

    fn delete_by_source(&mut self, source: &str) -> Result<u64> {
        let deleted = self
            .conn
            .execute("DELETE FROM descriptors WHERE source = ?1", params![source])?;
        Ok(deleted as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(skill: &str, code: &str, source: &str) -> ValidatedDescriptor {
        ValidatedDescriptor {
            code: code.to_string(),
            criterion_name: format!("Criterion {}", code),
            excellent: Some("Excellent work".to_string()),
            good: None,
            pass: None,
            below_pass: None,
            category: None,
            skill_name: skill.to_string(),
            sector: None,
            source: source.to_string(),
            version: 1,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_insert_skips_duplicates() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let records = vec![descriptor("Welding", "A1", "s"), descriptor("Welding", "A2", "s")];

        assert_eq!(store.insert_skip_duplicates(&records).unwrap(), 2);
        assert_eq!(store.insert_skip_duplicates(&records).unwrap(), 0);
        assert_eq!(store.count(None).unwrap(), 2);
    }

    #[test]
    fn test_same_code_different_skill_is_not_duplicate() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let records = vec![descriptor("Welding", "A1", "s"), descriptor("Cooking", "A1", "s")];
        assert_eq!(store.insert_skip_duplicates(&records).unwrap(), 2);
    }

    #[test]
    fn test_duplicates_within_one_call() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let records = vec![descriptor("Welding", "A1", "s"), descriptor("Welding", "A1", "s")];
        assert_eq!(store.insert_skip_duplicates(&records).unwrap(), 1);
    }

    #[test]
    fn test_count_and_delete_by_source() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_skip_duplicates(&[
                descriptor("Welding", "A1", "first"),
                descriptor("Welding", "A2", "first"),
                descriptor("Welding", "A3", "second"),
            ])
            .unwrap();

        assert_eq!(store.count(Some("first")).unwrap(), 2);
        assert_eq!(store.count(Some("second")).unwrap(), 1);
        assert_eq!(store.delete_by_source("first").unwrap(), 2);
        assert_eq!(store.count(None).unwrap(), 1);
        assert_eq!(store.delete_by_source("missing").unwrap(), 0);
    }

    #[test]
    fn test_find_roundtrip_nulls() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut record = descriptor("Welding", "A1", "s");
        record.tags = vec!["reviewed".to_string()];
        store.insert_skip_duplicates(&[record.clone()]).unwrap();

        let found = store.find("Welding", "A1").unwrap().expect("登録済みのはず");
        assert_eq!(found, record);
        assert!(store.find("Welding", "Z9").unwrap().is_none());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("descriptors.db");
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count(None).unwrap(), 0);
        assert!(path.exists());
    }
}
