//! # redb-backed Durable Store
//!
//! A disk-backed key/value store using the redb embedded database.
//!
//! Stands in for browser local storage when the engine runs outside a
//! browser:
//! - one `kv` table of string keys to string values
//! - one ACID transaction per write, so a committed write survives a crash
//! - copy-on-write B-trees, no separate WAL to manage

use super::DurableStore;
use crate::FlightpathError;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;

/// Table for values: storage key -> serialized value
const KV: TableDefinition<&str, &str> = TableDefinition::new("kv");

fn io_error(e: impl std::fmt::Display) -> FlightpathError {
    FlightpathError::IoError(e.to_string())
}

/// A disk-backed durable store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FlightpathError> {
        let db = Database::create(path.as_ref()).map_err(io_error)?;

        // Initialize the table so read transactions never see it missing
        {
            let write_txn = db.begin_write().map_err(io_error)?;
            let _ = write_txn.open_table(KV).map_err(io_error)?;
            write_txn.commit().map_err(io_error)?;
        }

        Ok(Self { db })
    }
}

impl DurableStore for RedbStore {
    fn read(&self, key: &str) -> Result<Option<String>, FlightpathError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let table = read_txn.open_table(KV).map_err(io_error)?;
        let value = table
            .get(key)
            .map_err(io_error)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), FlightpathError> {
        let write_txn = self.db.begin_write().map_err(io_error)?;
        {
            let mut table = write_txn.open_table(KV).map_err(io_error)?;
            table.insert(key, value).map_err(io_error)?;
        }
        write_txn.commit().map_err(io_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), FlightpathError> {
        let write_txn = self.db.begin_write().map_err(io_error)?;
        {
            let mut table = write_txn.open_table(KV).map_err(io_error)?;
            table.remove(key).map_err(io_error)?;
        }
        write_txn.commit().map_err(io_error)?;
        Ok(())
    }
}
