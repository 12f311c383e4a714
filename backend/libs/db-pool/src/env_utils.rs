//! Environment variable parsing helpers
//!
//! Missing or unparsable values fall back to the supplied default so that
//! configuration loading never panics.

use std::str::FromStr;

/// Parse an environment variable with a default fallback
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, `None` if missing or invalid
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
