use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::{StoreError, UserRecord};

/// Result of a conditional token decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// One token was taken; `remaining` is the persisted balance afterwards.
    Charged { remaining: u64 },
    /// The balance was already zero. Nothing was written.
    Insufficient,
    /// No record exists for the username.
    UnknownUser,
}

/// Storage for user records.
///
/// Implementations decide how records are persisted but must honour two
/// atomicity rules:
///
/// - [`insert`](Self::insert) is insert-if-absent. Two racing inserts for one
///   username produce exactly one success.
/// - [`charge`](Self::charge) runs read, zero check and decrement as a single
///   step per username.
pub trait CredentialStore: Send + Sync {
    /// Fetch a record by username.
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Store a new record. Fails with [`StoreError::UserAlreadyExists`] if taken.
    fn insert(&self, record: UserRecord) -> Result<(), StoreError>;
    /// Decrement the balance by one if it is above zero.
    fn charge(&self, username: &str) -> Result<ChargeOutcome, StoreError>;
    /// Number of stored records.
    fn user_count(&self) -> Result<usize, StoreError>;
    /// Drop every record.
    fn clear(&self) -> Result<(), StoreError>;
    /// Short label for logs and readiness output.
    fn backend_name(&self) -> &'static str;
}

/// Configuration for selecting and building a store backend.
///
/// ```
/// use store::BackendConfig;
///
/// let config = BackendConfig::in_memory();
/// let config = BackendConfig::redb("/data/simdoc.redb");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Redb database file at `path`. Requires the `backend-redb` feature.
    Redb { path: String },
    /// Process-local map. Records vanish on exit.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Open the configured backend.
    pub fn build(&self) -> Result<Arc<dyn CredentialStore>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Arc::new(RedbStore::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::Unavailable(
                        "redb backend disabled at compile time".into(),
                    ))
                }
            }
        }
    }
}

/// In-memory store backed by a sharded `DashMap`.
///
/// `charge` holds the shard write lock for the username across the whole
/// read-check-write, which is what makes it atomic.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<String, UserRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryStore {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }

    fn insert(&self, record: UserRecord) -> Result<(), StoreError> {
        match self.users.entry(record.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UserAlreadyExists(record.username)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn charge(&self, username: &str) -> Result<ChargeOutcome, StoreError> {
        let Some(mut entry) = self.users.get_mut(username) else {
            return Ok(ChargeOutcome::UnknownUser);
        };
        let record = entry.value_mut();
        if record.tokens == 0 {
            return Ok(ChargeOutcome::Insufficient);
        }
        record.tokens -= 1;
        Ok(ChargeOutcome::Charged {
            remaining: record.tokens,
        })
    }

    fn user_count(&self) -> Result<usize, StoreError> {
        Ok(self.users.len())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.users.clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbStore;

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn seeded(tokens: u64) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert(UserRecord::new("alice", "$argon2id$stub", tokens))
            .unwrap();
        store
    }

    #[test]
    fn insert_rejects_duplicate_username() {
        let store = seeded(10);
        let err = store
            .insert(UserRecord::new("alice", "$argon2id$other", 10))
            .unwrap_err();
        assert_eq!(err, StoreError::UserAlreadyExists("alice".into()));
        // Original record untouched.
        assert_eq!(store.get("alice").unwrap().unwrap().password_hash, "$argon2id$stub");
    }

    #[test]
    fn charge_decrements_until_zero() {
        let store = seeded(2);
        assert_eq!(store.charge("alice").unwrap(), ChargeOutcome::Charged { remaining: 1 });
        assert_eq!(store.charge("alice").unwrap(), ChargeOutcome::Charged { remaining: 0 });
        assert_eq!(store.charge("alice").unwrap(), ChargeOutcome::Insufficient);
        assert_eq!(store.get("alice").unwrap().unwrap().tokens, 0);
    }

    #[test]
    fn charge_unknown_user() {
        let store = InMemoryStore::new();
        assert_eq!(store.charge("ghost").unwrap(), ChargeOutcome::UnknownUser);
    }

    #[test]
    fn concurrent_charges_never_overspend() {
        let store = Arc::new(seeded(5));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.charge("alice").unwrap())
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let charged = outcomes
            .iter()
            .filter(|o| matches!(o, ChargeOutcome::Charged { .. }))
            .count();
        assert_eq!(charged, 5);
        assert_eq!(store.get("alice").unwrap().unwrap().tokens, 0);
    }

    #[test]
    fn clear_drops_everything() {
        let store = seeded(1);
        assert_eq!(store.user_count().unwrap(), 1);
        store.clear().unwrap();
        assert_eq!(store.user_count().unwrap(), 0);
        assert!(store.get("alice").unwrap().is_none());
    }

    #[test]
    fn default_config_builds_in_memory() {
        let store = BackendConfig::default().build().unwrap();
        assert_eq!(store.backend_name(), "in_memory");
    }
}
