use std::fmt;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// A registered user as persisted by a [`CredentialStore`](crate::CredentialStore).
///
/// `password_hash` is a PHC string (`$argon2id$v=19$...`). It is only ever
/// checked through a password verifier and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub tokens: u64,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, tokens: u64) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            tokens,
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(StoreError::codec)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        let (record, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(StoreError::codec)?;
        Ok(record)
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("tokens", &self.tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_preserves_fields() {
        let record = UserRecord::new("alice", "$argon2id$v=19$stub", 10);
        let bytes = record.encode().unwrap();
        assert_eq!(UserRecord::decode(&bytes).unwrap(), record);
    }

    #[test]
    fn decode_garbage_is_codec_error() {
        let err = UserRecord::decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn debug_redacts_hash() {
        let record = UserRecord::new("bob", "$argon2id$v=19$secret-material", 3);
        let dbg = format!("{record:?}");
        assert!(dbg.contains("bob"));
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains("secret-material"));
    }
}
