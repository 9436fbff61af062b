//! Configuration management for DocRelay services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - The well-known upstream variables (SUPABASE_URL, SUPABASE_SERVICE_KEY,
//!   OPENAI_API_KEY, PIPEDREAM_URL)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values
//!
//! Upstream endpoints and credentials are not validated here. An empty value
//! fails at call time against the service that needs it.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Well-known environment variables for the upstream services
pub const SEARCH_URL_VAR: &str = "SUPABASE_URL";
pub const SEARCH_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";
pub const SUMMARIZER_KEY_VAR: &str = "OPENAI_API_KEY";
pub const TELEMETRY_URL_VAR: &str = "PIPEDREAM_URL";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search store (RPC endpoint) configuration
    #[serde(default)]
    pub search_store: SearchStoreConfig,

    /// Chat-completion service configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Telemetry sink configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchStoreConfig {
    /// Base URL of the search store, e.g. https://xyz.supabase.co
    #[serde(default)]
    pub url: String,

    /// Service credential, sent both as `apikey` and as a bearer token
    #[serde(default)]
    pub service_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerConfig {
    /// API key for the chat-completion service
    #[serde(default)]
    pub api_key: String,

    /// API base URL; `/chat/completions` is appended
    #[serde(default = "default_summarizer_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Webhook URL receiving usage and error events
    #[serde(default)]
    pub url: String,

    /// Timeout for a single telemetry post in milliseconds
    #[serde(default = "default_telemetry_timeout")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info", "docrelay_gateway=debug")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Prometheus exporter port (0 to disable)
    #[serde(default)]
    pub metrics_port: u16,

    /// Service name attached to startup logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_summarizer_base() -> String { "https://api.openai.com/v1".to_string() }
fn default_summarizer_model() -> String { "gpt-4.1-mini".to_string() }
fn default_max_tokens() -> u32 { 250 }
fn default_temperature() -> f32 { 0.2 }
fn default_telemetry_timeout() -> u64 { 2000 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "docrelay".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_summarizer_base(),
            model: default_summarizer_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: default_telemetry_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: 0,
            service_name: default_service_name(),
        }
    }
}

impl TelemetryConfig {
    /// Get the telemetry timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            // Well-known upstream variables win over everything else
            .set_override_option("search_store.url", std::env::var(SEARCH_URL_VAR).ok())?
            .set_override_option("search_store.service_key", std::env::var(SEARCH_KEY_VAR).ok())?
            .set_override_option("summarizer.api_key", std::env::var(SUMMARIZER_KEY_VAR).ok())?
            .set_override_option("telemetry.url", std::env::var(TELEMETRY_URL_VAR).ok())?

            .build()?;

        config.try_deserialize()
    }

    /// Names of upstream settings that are currently empty
    pub fn missing_upstream_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.search_store.url.is_empty() {
            missing.push(SEARCH_URL_VAR);
        }
        if self.search_store.service_key.is_empty() {
            missing.push(SEARCH_KEY_VAR);
        }
        if self.summarizer.api_key.is_empty() {
            missing.push(SUMMARIZER_KEY_VAR);
        }
        if self.telemetry.url.is_empty() {
            missing.push(TELEMETRY_URL_VAR);
        }
        missing
    }
}
