use store::StoreError;
use thiserror::Error;

/// Numeric result codes carried in every response body under `Status Code`.
///
/// These values are a stable wire contract.
pub mod status {
    pub const OK: u16 = 200;
    pub const MISSING_FIELD: u16 = 301;
    pub const WRONG_TYPE: u16 = 302;
    pub const USER_EXISTS: u16 = 303;
    pub const UNKNOWN_USER: u16 = 310;
    pub const BAD_PASSWORD: u16 = 311;
    pub const INSUFFICIENT_TOKENS: u16 = 330;
    pub const INTERNAL: u16 = 500;
}

/// Failures produced by the authorization gate and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{0}` must be a string")]
    WrongType(String),

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("unknown user")]
    UnknownUser,

    #[error("incorrect password")]
    BadPassword,

    #[error("not enough tokens")]
    InsufficientTokens,

    #[error("credential store failure: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing failure: {0}")]
    Hashing(String),
}

impl AuthError {
    /// Wire code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingField(_) => status::MISSING_FIELD,
            AuthError::WrongType(_) => status::WRONG_TYPE,
            AuthError::UserAlreadyExists => status::USER_EXISTS,
            AuthError::UnknownUser => status::UNKNOWN_USER,
            AuthError::BadPassword => status::BAD_PASSWORD,
            AuthError::InsufficientTokens => status::INSUFFICIENT_TOKENS,
            AuthError::Store(_) | AuthError::Hashing(_) => status::INTERNAL,
        }
    }
}
