//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "Teamline";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;

/// Default inbox page size.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Hard upper bound on inbox page size, regardless of configuration.
pub const MAX_PER_PAGE: i64 = 100;

/// Maximum number of results returned by a message search.
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Inline formatting tags that survive sanitization.
///
/// Everything else is escaped to its literal text representation.
pub const ALLOWED_INLINE_TAGS: &[&str] = &["b", "i", "em", "strong", "u", "br"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_tags_are_lowercase() {
        for tag in ALLOWED_INLINE_TAGS {
            assert_eq!(*tag, tag.to_lowercase());
        }
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(DEFAULT_PER_PAGE <= MAX_PER_PAGE);
        assert!(DEFAULT_PER_PAGE >= 1);
    }
}
