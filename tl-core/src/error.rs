//! Global error types for the Teamline inbox subsystem.
//!
//! All error categories across the workspace are unified into a single
//! `TlError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using TlError.
pub type TlResult<T> = Result<T, TlError>;

/// Unified error type covering all error categories in Teamline.
#[derive(Error, Debug)]
pub enum TlError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Database errors --
    /// SQLite database error. Storage is treated as unavailable and the
    /// operation is propagated as fatal.
    #[error("database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Database integrity check failed.
    #[error("database integrity check failed: {0}")]
    IntegrityCheck(String),

    // -- Input errors --
    /// Invalid input rejected before persistence, with field detail.
    #[error("validation failed for {field}: {reason}")]
    Validation {
        /// Name of the offending input field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    // -- Lookup errors --
    /// The user id did not resolve against the user directory.
    #[error("user not found: {0}")]
    UserNotFound(i64),

    /// Message not found.
    #[error("message not found: {0}")]
    MessageNotFound(i64),

    /// Notification not found.
    #[error("notification not found: {0}")]
    NotificationNotFound(i64),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service failed to initialize.
    #[error("service init error: {0}")]
    ServiceInit(String),

    /// A service operation failed.
    #[error("service error: {0}")]
    Service(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TlError {
    /// Helper for building a `Validation` error.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        TlError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error means storage itself is unavailable.
    ///
    /// Callers use this to distinguish a fatal storage outage from a
    /// per-item failure that can be reported and tolerated.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            TlError::Database(_) | TlError::Pool(_) | TlError::IntegrityCheck(_)
        )
    }
}

impl From<serde_json::Error> for TlError {
    fn from(e: serde_json::Error) -> Self {
        TlError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for TlError {
    fn from(e: toml::de::Error) -> Self {
        TlError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_carries_field() {
        let err = TlError::validation("content", "content is required");
        assert_eq!(
            err.to_string(),
            "validation failed for content: content is required"
        );
    }

    #[test]
    fn test_storage_unavailable_classification() {
        assert!(TlError::Pool("pool exhausted".into()).is_storage_unavailable());
        assert!(TlError::Database("disk I/O error".into()).is_storage_unavailable());
        assert!(!TlError::UserNotFound(9).is_storage_unavailable());
        assert!(!TlError::validation("q", "empty").is_storage_unavailable());
    }

    #[test]
    fn test_tl_error_display() {
        let err = TlError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }
}
