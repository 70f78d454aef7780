use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb — a pure-Rust
/// embedded key-value database.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(|e| KVError::Storage(e.to_string()))?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
        })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(KVError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn incr(&self, key: &str, start: i64) -> Result<i64, KVError> {
        // redb serializes write transactions, so the read-modify-write
        // below cannot interleave with another incr on the same store.
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        let next = {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;

            let current = match table.get(key) {
                Ok(Some(val)) => parse_counter(val.value()).unwrap_or_else(|| {
                    tracing::warn!("counter {} unreadable, resetting to {}", key, start);
                    start
                }),
                Ok(None) => start,
                Err(e) => return Err(KVError::Storage(e.to_string())),
            };

            let next = current + 1;
            let encoded = next.to_string();
            table
                .insert(key, encoded.as_bytes())
                .map_err(|e| KVError::Storage(e.to_string()))?;
            next
        };

        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        Ok(next)
    }
}

/// Decode a counter record: decimal digits, UTF-8.
fn parse_counter(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (RedbStore, tempfile::NamedTempFile) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = RedbStore::open(tmp.path()).unwrap();
        (store, tmp)
    }

    #[test]
    fn test_set_get_delete() {
        let (store, _tmp) = open_store();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("a", b"hello").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"hello".to_vec()));

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_incr_starts_above_floor() {
        let (store, _tmp) = open_store();

        assert_eq!(store.incr("counter", 100).unwrap(), 101);
        assert_eq!(store.incr("counter", 100).unwrap(), 102);
        assert_eq!(store.incr("counter", 100).unwrap(), 103);
    }

    #[test]
    fn test_incr_survives_reopen() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        {
            let store = RedbStore::open(tmp.path()).unwrap();
            assert_eq!(store.incr("counter", 0).unwrap(), 1);
            assert_eq!(store.incr("counter", 0).unwrap(), 2);
        }
        let store = RedbStore::open(tmp.path()).unwrap();
        assert_eq!(store.incr("counter", 0).unwrap(), 3);
    }

    #[test]
    fn test_incr_resets_corrupt_record() {
        let (store, _tmp) = open_store();

        store.set("counter", b"not-a-number").unwrap();
        assert_eq!(store.incr("counter", 500).unwrap(), 501);
    }

    #[test]
    fn test_incr_concurrent_distinct() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = std::sync::Arc::new(RedbStore::open(tmp.path()).unwrap());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                let mut seen = Vec::new();
                for _ in 0..25 {
                    seen.push(store.incr("counter", 0).unwrap());
                }
                seen
            }));
        }

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8 * 25);
    }
}
