//! Teamline Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other Teamline crates:
//! - Application configuration (database, logging, inbox behaviour)
//! - Global error types covering all error categories
//! - Structured logging with tracing
//! - Platform data-directory resolution
//! - Pure inbox utilities: pagination arithmetic and rich-text sanitization

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod paging;
pub mod platform;
pub mod sanitize;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{TlError, TlResult};
pub use logging::init_logging;
pub use paging::{PageResult, PageWindow};
pub use platform::Platform;
pub use sanitize::sanitize;
