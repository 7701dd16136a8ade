//! Configuration types for run sheet sessions.
//!
//! All types implement [`serde::Deserialize`] and fill in defaults for any
//! missing field, so an empty file is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ServiceConfig`] - Where and how the layout reader is called.
//! - [`StoreConfig`] - Where the current document is persisted.
//! - [`DiagramConfig`] - Stage diagram gesture tuning.
//!
//! # Example
//!
//! ```
//! # use runsheet::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.service().model(), "gemini-2.5-flash");
//! assert_eq!(config.diagram().double_click().as_millis(), 300);
//! ```

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout reader section.
    #[serde(default)]
    service: ServiceConfig,

    /// Persistence section.
    #[serde(default)]
    store: StoreConfig,

    /// Stage diagram section.
    #[serde(default)]
    diagram: DiagramConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(service: ServiceConfig, store: StoreConfig, diagram: DiagramConfig) -> Self {
        Self {
            service,
            store,
            diagram,
        }
    }

    /// Returns the layout reader configuration.
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// Returns the persistence configuration.
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    /// Returns the stage diagram configuration.
    pub fn diagram(&self) -> &DiagramConfig {
        &self.diagram
    }

    /// Returns this configuration with the store directory replaced.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = Some(path.into());
        self
    }
}

/// Layout reader settings.
///
/// The API key itself is never part of the configuration; only the name of
/// the environment variable holding it is.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    endpoint: String,
    model: String,
    api_key_env: String,
    timeout_secs: u64,
}

impl ServiceConfig {
    /// Creates a new [`ServiceConfig`].
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the generative language API.
    /// * `model` - Model name the request is sent to.
    /// * `api_key_env` - Environment variable the API key is read from.
    /// * `timeout_secs` - Request timeout in seconds.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
            timeout_secs,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(
            "https://generativelanguage.googleapis.com/v1beta",
            "gemini-2.5-flash",
            "API_KEY",
            120,
        )
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the document blob. The front end picks a platform
    /// default when unset.
    #[serde(default)]
    path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Stage diagram settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    double_click_ms: u64,
}

impl DiagramConfig {
    pub fn new(double_click_ms: u64) -> Self {
        Self { double_click_ms }
    }

    /// Returns the double-click threshold of the gesture machine.
    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self::new(300)
    }
}
