//! Application state for the PM2.5 API.

use std::sync::Arc;

use grid_index::{GridDataService, GridIndexError};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::error::{ApiError, ApiResult};

/// Shared application state.
pub struct AppState {
    /// Index over the grid files, built once at startup.
    pub service: Arc<GridDataService>,

    /// Renders the `/metrics` payload; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: GridDataService, prometheus: Option<PrometheusHandle>) -> Self {
        Self {
            service: Arc::new(service),
            prometheus,
        }
    }

    /// Run file-streaming work on the blocking pool.
    pub async fn blocking<T, F>(&self, work: F) -> ApiResult<T>
    where
        F: FnOnce(&GridDataService) -> Result<T, GridIndexError> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || work(&service))
            .await
            .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
