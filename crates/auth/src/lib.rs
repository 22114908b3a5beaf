//! simdoc authorization gate
//!
//! Everything between a raw JSON request and a paid operation:
//!
//! - [`schema`]: typed request shapes (`Credentials`, `Documents`) with
//!   missing-field / wrong-type detection.
//! - [`password`]: Argon2id hashing with per-user random salts.
//! - [`gate`]: registration and the validate → authenticate → charge
//!   sequence every paid request goes through.
//!
//! Failures are [`AuthError`] values carrying the numeric wire code from
//! [`status`].

pub mod error;
pub mod gate;
pub mod password;
pub mod schema;

pub use error::{status, AuthError};
pub use gate::{AuthorizationGate, Authorized, Registration, DEFAULT_INITIAL_TOKENS};
pub use password::{PasswordConfig, PasswordVerifier};
pub use schema::{
    validate_credentials_shape, validate_payload_shape, Credentials, Documents,
};
