//! simdoc server - HTTP API for metered document similarity
//!
//! Exposes the [`simdoc::ComparisonService`] over JSON endpoints. Every
//! response body carries a human-readable `Message` and a numeric
//! `Status Code` (200, 301, 302, 303, 310, 311, 330 or 500).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /register` - create a user with the initial token grant
//! - `POST /compare_s` - fast comparison, costs one token
//! - `POST /compare_l` - accurate comparison, costs one token
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (credential store)
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
