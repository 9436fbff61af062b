//! DocRelay Common Library
//!
//! Shared code for the DocRelay gateway:
//! - Configuration management
//! - Error types and handling
//! - Metrics and observability
//! - Upstream clients (search store, summarizer, telemetry sink)

pub mod config;
pub mod errors;
pub mod metrics;
pub mod search;
pub mod summarize;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use search::{DocumentSearch, Documents, SearchStoreClient};
pub use summarize::{ChatSummarizer, Summarizer};
pub use telemetry::{TelemetryEvent, TelemetryLogger};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
