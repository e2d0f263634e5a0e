use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::client::CzdsClientBuilder;

/// ================================
/// Client configuration file
/// ================================
#[derive(Deserialize, Clone, Default)]
pub struct ServiceConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    pub accounts_api_base_url: Option<String>,
    pub czds_api_base_url: Option<String>,
    /// applies to each HTTP request including body download
    pub http_timeout_ms: Option<u64>,
    pub logging: Option<LoggingConfig>,
}

impl ServiceConfig {
    /// Copies the configured endpoints and timeout onto a client builder.
    pub fn apply(&self, mut builder: CzdsClientBuilder) -> CzdsClientBuilder {
        if let Some(url) = &self.accounts_api_base_url {
            builder = builder.accounts_api_base_url(url);
        }
        if let Some(url) = &self.czds_api_base_url {
            builder = builder.czds_api_base_url(url);
        }
        if let Some(ms) = self.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        builder
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("accounts_api_base_url", &self.accounts_api_base_url)
            .field("czds_api_base_url", &self.czds_api_base_url)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("logging", &self.logging)
            .finish()
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
