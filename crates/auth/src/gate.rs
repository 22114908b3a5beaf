//! The authorization gate.
//!
//! Every paid request runs the same fixed sequence, stopping at the first
//! failure:
//!
//! 1. credential shape (`username`, `password` are strings)
//! 2. authentication (user exists, password verifies)
//! 3. operation payload shape
//! 4. token charge (conditional decrement in the store)
//!
//! Only after step 4 succeeds does the caller run the paid operation. A
//! request rejected at steps 1-3 never touches the balance.

use std::sync::Arc;

use serde_json::Value;
use store::{ChargeOutcome, CredentialStore, StoreError, UserRecord};

use crate::schema::{validate_credentials_shape, Credentials};
use crate::{AuthError, PasswordVerifier};

/// Tokens granted to a freshly registered user unless configured otherwise.
pub const DEFAULT_INITIAL_TOKENS: u64 = 10;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub tokens: u64,
}

/// A paid request that cleared the gate. One token has already been taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized<T> {
    pub username: String,
    /// Balance after the charge.
    pub tokens_remaining: u64,
    /// The typed operation payload.
    pub payload: T,
}

/// Validates, authenticates and meters requests against a credential store.
pub struct AuthorizationGate {
    store: Arc<dyn CredentialStore>,
    verifier: PasswordVerifier,
    initial_tokens: u64,
}

impl AuthorizationGate {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: PasswordVerifier,
        initial_tokens: u64,
    ) -> Self {
        Self {
            store,
            verifier,
            initial_tokens,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn initial_tokens(&self) -> u64 {
        self.initial_tokens
    }

    /// Create a user with the initial token grant. Free of charge.
    pub fn register(&self, payload: &Value) -> Result<Registration, AuthError> {
        let creds = validate_credentials_shape(payload)?;

        // Skip the hash work for names that are obviously taken. The insert
        // below is still the authority when two registrations race.
        if self.store.get(&creds.username)?.is_some() {
            tracing::debug!(username = %creds.username, "registration rejected: user exists");
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = self.verifier.hash(&creds.password)?;
        let record = UserRecord::new(creds.username.clone(), password_hash, self.initial_tokens);
        match self.store.insert(record) {
            Ok(()) => {}
            Err(StoreError::UserAlreadyExists(_)) => {
                tracing::debug!(username = %creds.username, "registration lost insert race");
                return Err(AuthError::UserAlreadyExists);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            username = %creds.username,
            tokens = self.initial_tokens,
            "user registered"
        );
        Ok(Registration {
            username: creds.username,
            tokens: self.initial_tokens,
        })
    }

    /// Look the user up and verify the password. Read-only.
    pub fn authenticate(&self, creds: &Credentials) -> Result<UserRecord, AuthError> {
        let Some(record) = self.store.get(&creds.username)? else {
            tracing::debug!(username = %creds.username, "authentication failed: unknown user");
            return Err(AuthError::UnknownUser);
        };

        if !self.verifier.verify(&creds.password, &record.password_hash)? {
            tracing::debug!(username = %creds.username, "authentication failed: bad password");
            return Err(AuthError::BadPassword);
        }

        Ok(record)
    }

    /// Take one token. Fails without writing anything when the balance is zero.
    pub fn charge_token(&self, username: &str) -> Result<u64, AuthError> {
        match self.store.charge(username)? {
            ChargeOutcome::Charged { remaining } => {
                tracing::debug!(username, remaining, "token charged");
                Ok(remaining)
            }
            ChargeOutcome::Insufficient => {
                tracing::debug!(username, "charge refused: no tokens left");
                Err(AuthError::InsufficientTokens)
            }
            ChargeOutcome::UnknownUser => Err(AuthError::UnknownUser),
        }
    }

    /// Run the full gate for a paid operation.
    ///
    /// `parse` turns the raw payload into the operation's typed input; it runs
    /// after authentication and before the charge.
    pub fn authorize_paid<T, F>(
        &self,
        payload: &Value,
        parse: F,
    ) -> Result<Authorized<T>, AuthError>
    where
        F: FnOnce(&Value) -> Result<T, AuthError>,
    {
        let creds = validate_credentials_shape(payload)?;
        let record = self.authenticate(&creds)?;
        let typed = parse(payload)?;
        let tokens_remaining = self.charge_token(&record.username)?;

        Ok(Authorized {
            username: record.username,
            tokens_remaining,
            payload: typed,
        })
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("store", &self.store.backend_name())
            .field("initial_tokens", &self.initial_tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Documents;
    use crate::PasswordConfig;
    use serde_json::json;
    use std::thread;
    use store::InMemoryStore;

    fn gate_with(initial_tokens: u64) -> AuthorizationGate {
        let verifier = PasswordVerifier::new(&PasswordConfig {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        AuthorizationGate::new(Arc::new(InMemoryStore::new()), verifier, initial_tokens)
    }

    fn balance(gate: &AuthorizationGate, username: &str) -> u64 {
        gate.store().get(username).unwrap().unwrap().tokens
    }

    fn compare_payload(password: &str) -> Value {
        json!({"username": "alice", "password": password, "doc1": "cat", "doc2": "dog"})
    }

    #[test]
    fn register_grants_initial_tokens() {
        let gate = gate_with(DEFAULT_INITIAL_TOKENS);
        let reg = gate
            .register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();
        assert_eq!(reg.tokens, 10);
        assert_eq!(balance(&gate, "alice"), 10);
    }

    #[test]
    fn register_twice_is_rejected() {
        let gate = gate_with(10);
        let payload = json!({"username": "alice", "password": "secret"});
        gate.register(&payload).unwrap();
        let err = gate.register(&payload).unwrap_err();
        assert_eq!(err.status_code(), 303);
    }

    #[test]
    fn register_bad_shape_stores_nothing() {
        let gate = gate_with(10);
        let err = gate.register(&json!({"username": "alice"})).unwrap_err();
        assert_eq!(err.status_code(), 301);
        let err = gate
            .register(&json!({"username": "alice", "password": 42}))
            .unwrap_err();
        assert_eq!(err.status_code(), 302);
        assert_eq!(gate.store().user_count().unwrap(), 0);
    }

    #[test]
    fn concurrent_registration_single_winner() {
        let gate = Arc::new(gate_with(10));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    gate.register(&json!({"username": "alice", "password": "secret"}))
                        .is_ok()
                })
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(gate.store().user_count().unwrap(), 1);
    }

    #[test]
    fn authenticate_checks_password() {
        let gate = gate_with(10);
        gate.register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();

        let ok = Credentials {
            username: "alice".into(),
            password: "secret".into(),
        };
        assert_eq!(gate.authenticate(&ok).unwrap().username, "alice");

        let wrong = Credentials {
            password: "SECRET".into(),
            ..ok.clone()
        };
        assert!(matches!(gate.authenticate(&wrong), Err(AuthError::BadPassword)));

        let ghost = Credentials {
            username: "bob".into(),
            ..ok
        };
        assert!(matches!(gate.authenticate(&ghost), Err(AuthError::UnknownUser)));
    }

    #[test]
    fn paid_request_charges_exactly_one() {
        let gate = gate_with(10);
        gate.register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();

        let auth = gate
            .authorize_paid(&compare_payload("secret"), Documents::from_payload)
            .unwrap();
        assert_eq!(auth.tokens_remaining, 9);
        assert_eq!(auth.payload.doc1, "cat");
        assert_eq!(balance(&gate, "alice"), 9);
    }

    #[test]
    fn failed_checks_never_charge() {
        let gate = gate_with(10);
        gate.register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();

        let cases = [
            (json!({"password": "secret", "doc1": "a", "doc2": "b"}), 301),
            (json!({"username": "alice", "password": 1, "doc1": "a", "doc2": "b"}), 302),
            (json!({"username": "bob", "password": "secret", "doc1": "a", "doc2": "b"}), 310),
            (compare_payload("wrong"), 311),
            (json!({"username": "alice", "password": "secret", "doc1": "a"}), 301),
            (json!({"username": "alice", "password": "secret", "doc1": "a", "doc2": false}), 302),
        ];
        for (payload, code) in cases {
            let err = gate
                .authorize_paid(&payload, Documents::from_payload)
                .unwrap_err();
            assert_eq!(err.status_code(), code, "{payload}");
        }
        assert_eq!(balance(&gate, "alice"), 10);
    }

    #[test]
    fn auth_failure_precedes_payload_check() {
        let gate = gate_with(10);
        gate.register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();
        // Bad password and missing docs: authentication reports first.
        let err = gate
            .authorize_paid(
                &json!({"username": "alice", "password": "nope"}),
                Documents::from_payload,
            )
            .unwrap_err();
        assert_eq!(err.status_code(), 311);
    }

    #[test]
    fn exhausted_balance_is_refused() {
        let gate = gate_with(1);
        gate.register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();

        gate.authorize_paid(&compare_payload("secret"), Documents::from_payload)
            .unwrap();
        let err = gate
            .authorize_paid(&compare_payload("secret"), Documents::from_payload)
            .unwrap_err();
        assert_eq!(err.status_code(), 330);
        assert_eq!(balance(&gate, "alice"), 0);
    }

    #[test]
    fn parser_not_called_when_auth_fails() {
        let gate = gate_with(10);
        let mut called = false;
        let _ = gate.authorize_paid(&compare_payload("secret"), |_| {
            called = true;
            Ok(())
        });
        assert!(!called);
    }

    #[test]
    fn concurrent_paid_requests_with_one_token() {
        let gate = Arc::new(gate_with(1));
        gate.register(&json!({"username": "alice", "password": "secret"}))
            .unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    gate.authorize_paid(&compare_payload("secret"), Documents::from_payload)
                        .map(|a| a.tokens_remaining)
                        .map_err(|e| e.status_code())
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| **r == Ok(0)).count(), 1);
        assert_eq!(results.iter().filter(|r| **r == Err(330)).count(), 1);
        assert_eq!(balance(&gate, "alice"), 0);
    }
}
