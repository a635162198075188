//! AllDebrid Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other workspace crates:
//! - Application configuration (API key, endpoint overrides, polling policy)
//! - A single error enum covering transport, remote and resolver failures
//! - Structured logging with tracing
//! - Platform directory helpers
//! - Common constants

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{AdError, AdResult};
pub use logging::init_logging;
pub use platform::Platform;
