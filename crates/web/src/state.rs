//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::WebConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds only immutable data: the configuration
/// and an unauthenticated API client whose connection pool every per-request
/// client shares.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api.base_url, config.api.timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get the anonymous API client (login and registration only).
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}
