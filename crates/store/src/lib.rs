//! simdoc credential store
//!
//! Owns the user records the authorization gate reads and charges against.
//! Every record carries a username (unique key), a PHC-format password hash
//! and a token balance.
//!
//! Backends implement [`CredentialStore`]. Two ship here:
//!
//! - **In-memory** - a `DashMap`, good for tests and throwaway deployments.
//! - **Redb** - pure Rust embedded database, records survive restarts.
//!
//! The one operation with a real contract is [`CredentialStore::charge`]: it
//! is a conditional decrement. Backends must run the read, the zero check and
//! the write as one unit per username so two concurrent charges against a
//! balance of 1 can never both succeed.
//!
//! ```
//! use store::{BackendConfig, ChargeOutcome, UserRecord};
//!
//! let store = BackendConfig::in_memory().build().unwrap();
//! store
//!     .insert(UserRecord::new("alice", "$argon2id$...", 1))
//!     .unwrap();
//!
//! assert_eq!(store.charge("alice").unwrap(), ChargeOutcome::Charged { remaining: 0 });
//! assert_eq!(store.charge("alice").unwrap(), ChargeOutcome::Insufficient);
//! ```

mod backend;
mod error;
mod record;

pub use backend::{BackendConfig, ChargeOutcome, CredentialStore, InMemoryStore};
#[cfg(feature = "backend-redb")]
pub use backend::RedbStore;
pub use error::StoreError;
pub use record::UserRecord;
