use thiserror::Error;

/// Errors surfaced by credential store backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Insert refused because the username is already taken.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    /// The backend itself failed (IO, transaction, poisoned state).
    #[error("backend error: {0}")]
    Backend(String),
    /// A stored record could not be encoded or decoded.
    #[error("record codec error: {0}")]
    Codec(String),
    /// Backend selected in config is not compiled in.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn codec<E: std::fmt::Display>(err: E) -> Self {
        Self::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_username() {
        let err = StoreError::UserAlreadyExists("alice".into());
        assert_eq!(err.to_string(), "user already exists: alice");
    }

    #[test]
    fn backend_helper_wraps_display() {
        let io = std::io::Error::other("disk gone");
        let err = StoreError::backend(io);
        assert!(matches!(err, StoreError::Backend(ref msg) if msg == "disk gone"));
    }
}
