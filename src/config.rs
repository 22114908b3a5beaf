//! YAML configuration for the simdoc service.
//!
//! Describes every collaborator the [`ComparisonService`](crate::ComparisonService)
//! needs, so a deployment can be rebuilt from one file.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! initial_tokens: 10
//!
//! store:
//!   backend: "redb"
//!   path: "/data/simdoc.redb"
//!   reset_on_start: false
//!
//! password:
//!   memory_kib: 19456
//!   iterations: 2
//!   parallelism: 1
//!
//! similarity:
//!   shingle_size: 2
//!   embedding_dim: 1024
//!   char_ngram: 3
//! ```
//!
//! Every section is optional; omitted keys take their defaults.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use auth::{
    AuthError, AuthorizationGate, PasswordConfig, PasswordVerifier, DEFAULT_INITIAL_TOKENS,
};
use serde::{Deserialize, Serialize};
use similarity::{ProviderSet, SimilarityConfig, SimilarityError};
use store::{BackendConfig, CredentialStore, StoreError};
use thiserror::Error;

use crate::ComparisonService;

/// Errors that can occur when loading configuration or building the service from it.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("credential store: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing: {0}")]
    Password(#[from] AuthError),

    #[error("similarity: {0}")]
    Similarity(#[from] SimilarityError),
}

/// Which credential store backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    #[default]
    InMemory,
    Redb,
}

/// Credential store section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackendKind,
    /// Database file; required for `redb`.
    pub path: Option<String>,
    /// Drop every user record when the service starts.
    pub reset_on_start: bool,
}

impl StoreConfig {
    pub fn backend_config(&self) -> Result<BackendConfig, ConfigLoadError> {
        match self.backend {
            StoreBackendKind::InMemory => Ok(BackendConfig::in_memory()),
            StoreBackendKind::Redb => match self.path.as_deref() {
                Some(path) if !path.trim().is_empty() => Ok(BackendConfig::redb(path)),
                _ => Err(ConfigLoadError::Validation(
                    "store.path is required for the redb backend".into(),
                )),
            },
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimdocConfig {
    /// Tokens granted at registration.
    pub initial_tokens: u64,
    pub store: StoreConfig,
    pub password: PasswordConfig,
    pub similarity: SimilarityConfig,
}

impl Default for SimdocConfig {
    fn default() -> Self {
        Self {
            initial_tokens: DEFAULT_INITIAL_TOKENS,
            store: StoreConfig::default(),
            password: PasswordConfig::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl SimdocConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SimdocConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.store.backend_config()?;
        self.similarity.validate()?;
        if self.password.iterations == 0 {
            return Err(ConfigLoadError::Validation(
                "password.iterations must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Open the store and construct the gate and providers.
    pub fn build_service(&self) -> Result<ComparisonService, ConfigLoadError> {
        self.validate()?;

        let store: Arc<dyn CredentialStore> = self.store.backend_config()?.build()?;
        if self.store.reset_on_start {
            tracing::warn!(
                backend = store.backend_name(),
                "store.reset_on_start set, dropping all user records"
            );
            store.clear()?;
        }

        let verifier = PasswordVerifier::new(&self.password)?;
        let providers = ProviderSet::from_config(&self.similarity)?;
        let gate = AuthorizationGate::new(store, verifier, self.initial_tokens);

        tracing::info!(
            backend = gate.store().backend_name(),
            initial_tokens = self.initial_tokens,
            ?providers,
            "comparison service ready"
        );
        Ok(ComparisonService::new(gate, providers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = SimdocConfig::default();
        assert_eq!(cfg.initial_tokens, 10);
        assert_eq!(cfg.store.backend, StoreBackendKind::InMemory);
        assert!(!cfg.store.reset_on_start);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml() {
        let cfg = SimdocConfig::from_yaml_str(
            r#"
initial_tokens: 3
similarity:
  shingle_size: 3
"#,
        )
        .unwrap();
        assert_eq!(cfg.initial_tokens, 3);
        assert_eq!(cfg.similarity.shingle_size, 3);
        assert_eq!(cfg.similarity.embedding_dim, 1024);
        assert_eq!(cfg.password, PasswordConfig::default());
    }

    #[test]
    fn redb_requires_path() {
        let err = SimdocConfig::from_yaml_str("store:\n  backend: redb\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn invalid_similarity_rejected() {
        let err = SimdocConfig::from_yaml_str("similarity:\n  shingle_size: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Similarity(_)));
    }

    #[test]
    fn malformed_yaml_rejected() {
        let err = SimdocConfig::from_yaml_str("store: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_tokens: 25").unwrap();
        let cfg = SimdocConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.initial_tokens, 25);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = SimdocConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }

    #[cfg(feature = "redb")]
    #[test]
    fn reset_on_start_clears_redb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.redb");
        let mut cfg = SimdocConfig {
            store: StoreConfig {
                backend: StoreBackendKind::Redb,
                path: Some(path.to_string_lossy().into_owned()),
                reset_on_start: false,
            },
            password: PasswordConfig {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            },
            ..Default::default()
        };

        {
            let svc = cfg.build_service().unwrap();
            svc.register(&serde_json::json!({"username": "alice", "password": "pw"}))
                .unwrap();
        }
        {
            let svc = cfg.build_service().unwrap();
            assert_eq!(svc.gate().store().user_count().unwrap(), 1);
        }
        cfg.store.reset_on_start = true;
        let svc = cfg.build_service().unwrap();
        assert_eq!(svc.gate().store().user_count().unwrap(), 0);
    }
}
