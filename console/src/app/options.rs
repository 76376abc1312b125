//! Application configuration options

use std::time::Duration;

use openapi_client::models::JobRequest;

use crate::config::settings::Settings;
use crate::http::retry::RetryPolicy;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Backend API base URL
    pub backend_base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Retry policy for every backend call
    pub retry: RetryPolicy,

    /// Panel server configuration
    pub server: ServerOptions,

    /// Form values used when a field is not given
    pub job_defaults: JobRequest,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AppOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            backend_base_url: settings.backend.base_url.clone(),
            request_timeout: Duration::from_secs(settings.backend.timeout_secs),
            retry: settings.retry.to_policy(),
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            job_defaults: settings.job_defaults.clone(),
        }
    }
}

/// Panel server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
