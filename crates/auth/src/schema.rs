//! Typed request schema.
//!
//! Raw JSON is inspected exactly once, here. Everything past this module
//! works with [`Credentials`] and [`Documents`].

use std::fmt;

use serde_json::Value;

use crate::AuthError;

pub const CREDENTIAL_FIELDS: [&str; 2] = ["username", "password"];
pub const DOCUMENT_FIELDS: [&str; 2] = ["doc1", "doc2"];

/// Check that every field in `required` is present and a JSON string.
///
/// Presence is checked for all fields before any type is checked, so a
/// payload with one missing and one mistyped field reports the missing one.
/// A non-object payload has no fields. `null` counts as present.
pub fn validate_payload_shape<'a>(
    payload: &'a Value,
    required: &[&str],
) -> Result<Vec<&'a str>, AuthError> {
    let object = payload.as_object();

    if let Some(missing) = required
        .iter()
        .find(|field| !object.is_some_and(|o| o.contains_key(**field)))
    {
        return Err(AuthError::MissingField((*missing).to_string()));
    }

    required
        .iter()
        .map(|field| match object.and_then(|o| o.get(*field)) {
            Some(Value::String(s)) => Ok(s.as_str()),
            _ => Err(AuthError::WrongType((*field).to_string())),
        })
        .collect()
}

fn string_pair<'a>(
    payload: &'a Value,
    fields: &[&str; 2],
) -> Result<(&'a str, &'a str), AuthError> {
    let values = validate_payload_shape(payload, fields)?;
    let [first, second] = values[..] else {
        return Err(AuthError::MissingField(fields[0].to_string()));
    };
    Ok((first, second))
}

/// Username and password as submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Require `username` and `password`, both strings.
pub fn validate_credentials_shape(payload: &Value) -> Result<Credentials, AuthError> {
    let (username, password) = string_pair(payload, &CREDENTIAL_FIELDS)?;
    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// The two texts a comparison runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documents {
    pub doc1: String,
    pub doc2: String,
}

impl Documents {
    /// Require `doc1` and `doc2`, both strings.
    pub fn from_payload(payload: &Value) -> Result<Self, AuthError> {
        let (doc1, doc2) = string_pair(payload, &DOCUMENT_FIELDS)?;
        Ok(Self {
            doc1: doc1.to_string(),
            doc2: doc2.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_ok() {
        let creds =
            validate_credentials_shape(&json!({"username": "alice", "password": "secret"}))
                .unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn missing_username_or_password() {
        for payload in [
            json!({"password": "x"}),
            json!({"username": "alice"}),
            json!({}),
        ] {
            let err = validate_credentials_shape(&payload).unwrap_err();
            assert_eq!(err.status_code(), 301, "{payload}");
        }
    }

    #[test]
    fn non_object_payload_is_missing_fields() {
        for payload in [Value::Null, json!([1, 2]), json!("alice"), json!(3)] {
            let err = validate_credentials_shape(&payload).unwrap_err();
            assert!(matches!(err, AuthError::MissingField(ref f) if f == "username"));
        }
    }

    #[test]
    fn wrong_types() {
        for payload in [
            json!({"username": 1, "password": "x"}),
            json!({"username": "alice", "password": ["x"]}),
            json!({"username": null, "password": "x"}),
            json!({"username": "alice", "password": {"p": 1}}),
        ] {
            let err = validate_credentials_shape(&payload).unwrap_err();
            assert_eq!(err.status_code(), 302, "{payload}");
        }
    }

    #[test]
    fn missing_wins_over_wrong_type() {
        let err = validate_credentials_shape(&json!({"username": 7})).unwrap_err();
        assert!(matches!(err, AuthError::MissingField(ref f) if f == "password"));
    }

    #[test]
    fn documents_shape() {
        let docs = Documents::from_payload(&json!({"doc1": "cat", "doc2": "dog", "extra": 1}))
            .unwrap();
        assert_eq!(docs.doc1, "cat");
        assert_eq!(docs.doc2, "dog");

        let err = Documents::from_payload(&json!({"doc1": "cat"})).unwrap_err();
        assert!(matches!(err, AuthError::MissingField(ref f) if f == "doc2"));

        let err = Documents::from_payload(&json!({"doc1": "cat", "doc2": 2})).unwrap_err();
        assert!(matches!(err, AuthError::WrongType(ref f) if f == "doc2"));
    }

    #[test]
    fn generic_shape_preserves_order() {
        let payload = json!({"b": "2", "a": "1"});
        assert_eq!(validate_payload_shape(&payload, &["a", "b"]).unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
