//! Redb-based persistent key-value store.

use std::fmt::Display;
use std::path::Path;

use ::redb::{
    Database, ReadOnlyTable, ReadableTable, TableDefinition, TableError, WriteTransaction,
};

use crate::{KVError, KVResult, KVStore};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn storage(e: impl Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// A persistent key-value store backed by a single redb file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a redb store at the given path.
    ///
    /// Missing parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> KVResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| KVError::Open(format!("{}: {e}", parent.display())))?;
        }
        let db = Database::create(path)
            .map_err(|e| KVError::Open(format!("{}: {e}", path.display())))?;

        // Readers expect the table to exist.
        let tx = db.begin_write().map_err(storage)?;
        tx.open_table(TABLE).map_err(storage)?;
        tx.commit().map_err(storage)?;

        Ok(Self { db })
    }

    /// Open an existing store without creating or writing anything.
    ///
    /// Fails when the file does not exist. A store that was never written
    /// reads as empty.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> KVResult<Self> {
        let path = path.as_ref();
        let db = Database::open(path)
            .map_err(|e| KVError::Open(format!("{}: {e}", path.display())))?;
        Ok(Self { db })
    }

    fn read_table(&self) -> KVResult<Option<ReadOnlyTable<&'static str, &'static [u8]>>> {
        let tx = self.db.begin_read().map_err(storage)?;
        match tx.open_table(TABLE) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(storage(e)),
        }
    }

    fn write<F>(&self, f: F) -> KVResult<()>
    where
        F: FnOnce(&WriteTransaction) -> KVResult<()>,
    {
        let tx = self.db.begin_write().map_err(storage)?;
        f(&tx)?;
        tx.commit().map_err(storage)
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        let Some(table) = self.read_table()? else {
            return Ok(None);
        };
        Ok(table.get(key).map_err(storage)?.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> KVResult<()> {
        self.write(|tx| {
            let mut table = tx.open_table(TABLE).map_err(storage)?;
            table.insert(key, value).map_err(storage)?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        self.write(|tx| {
            let mut table = tx.open_table(TABLE).map_err(storage)?;
            table.remove(key).map_err(storage)?;
            Ok(())
        })
    }

    fn scan(&self, prefix: &str) -> KVResult<Vec<(String, Vec<u8>)>> {
        let Some(table) = self.read_table()? else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for item in table.range(prefix..).map_err(storage)? {
            let (key, value) = item.map_err(storage)?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_string(), value.value().to_vec()));
        }
        Ok(results)
    }

    fn replace_prefix(&self, prefix: &str, entries: &[(&str, &[u8])]) -> KVResult<()> {
        self.write(|tx| {
            let mut table = tx.open_table(TABLE).map_err(storage)?;

            let mut stale = Vec::new();
            for item in table.range(prefix..).map_err(storage)? {
                let (key, _) = item.map_err(storage)?;
                let key = key.value();
                if !key.starts_with(prefix) {
                    break;
                }
                stale.push(key.to_string());
            }
            for key in &stale {
                table.remove(key.as_str()).map_err(storage)?;
            }
            for (key, value) in entries {
                table.insert(*key, *value).map_err(storage)?;
            }
            Ok(())
        })
    }
}
