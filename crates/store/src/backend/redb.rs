//! Redb backend for the credential store.
//!
//! One table maps `username -> bincode(UserRecord)`. Redb runs at most one
//! write transaction at a time, so doing the read-check-write of
//! [`charge`](crate::CredentialStore::charge) and the exists-check of
//! [`insert`](crate::CredentialStore::insert) inside a write transaction
//! makes both atomic without any extra locking.
//!
//! # Configuration Example
//! ```yaml
//! store:
//!   backend: "redb"
//!   path: "/data/simdoc.redb"
//! ```

use std::path::Path;
use std::sync::Arc;

use ::redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::{ChargeOutcome, CredentialStore, StoreError, UserRecord};

const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("simdoc_users");

/// Persistent credential store on a single redb file.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a database at `path` and make sure the users table exists.
    ///
    /// ```no_run
    /// use store::RedbStore;
    ///
    /// let store = RedbStore::open("/tmp/simdoc.redb").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            // Opening creates the table on first use.
            let _table = write_txn
                .open_table(USERS_TABLE)
                .map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl CredentialStore for RedbStore {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn
            .open_table(USERS_TABLE)
            .map_err(StoreError::backend)?;

        match table.get(username).map_err(StoreError::backend)? {
            Some(value) => Ok(Some(UserRecord::decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, record: UserRecord) -> Result<(), StoreError> {
        let bytes = record.encode()?;
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn
                .open_table(USERS_TABLE)
                .map_err(StoreError::backend)?;
            let exists = table
                .get(record.username.as_str())
                .map_err(StoreError::backend)?
                .is_some();
            if exists {
                drop(table);
                write_txn.abort().map_err(StoreError::backend)?;
                return Err(StoreError::UserAlreadyExists(record.username));
            }
            table
                .insert(record.username.as_str(), bytes.as_slice())
                .map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn charge(&self, username: &str) -> Result<ChargeOutcome, StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        let outcome = {
            let mut table = write_txn
                .open_table(USERS_TABLE)
                .map_err(StoreError::backend)?;
            let current = table
                .get(username)
                .map_err(StoreError::backend)?
                .map(|guard| guard.value().to_vec());

            match current {
                None => ChargeOutcome::UnknownUser,
                Some(bytes) => {
                    let mut record = UserRecord::decode(&bytes)?;
                    if record.tokens == 0 {
                        ChargeOutcome::Insufficient
                    } else {
                        record.tokens -= 1;
                        let encoded = record.encode()?;
                        table
                            .insert(username, encoded.as_slice())
                            .map_err(StoreError::backend)?;
                        ChargeOutcome::Charged {
                            remaining: record.tokens,
                        }
                    }
                }
            }
        };

        match outcome {
            ChargeOutcome::Charged { .. } => write_txn.commit().map_err(StoreError::backend)?,
            _ => write_txn.abort().map_err(StoreError::backend)?,
        }
        Ok(outcome)
    }

    fn user_count(&self) -> Result<usize, StoreError> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn
            .open_table(USERS_TABLE)
            .map_err(StoreError::backend)?;
        let len = table.len().map_err(StoreError::backend)?;
        usize::try_from(len).map_err(StoreError::backend)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        write_txn
            .delete_table(USERS_TABLE)
            .map_err(StoreError::backend)?;
        {
            let _table = write_txn
                .open_table(USERS_TABLE)
                .map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        tracing::info!("credential store cleared");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}
