use crate::config::ServerConfig;
use crate::error::ServerResult;
use metrics_exporter_prometheus::PrometheusHandle;
use simdoc::ComparisonService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Gate, store and similarity providers (shared across requests)
    pub service: Arc<ComparisonService>,

    /// Prometheus render handle, present when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build the service described by `config.service` and wrap it in state.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let service = config.service.build_service()?;
        Ok(Self::with_service(config, Arc::new(service)))
    }

    /// Wrap an already constructed service.
    pub fn with_service(config: ServerConfig, service: Arc<ComparisonService>) -> Self {
        Self {
            config: Arc::new(config),
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
