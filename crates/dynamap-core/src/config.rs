//! Adapter configuration.

use std::env;

/// Tunables for the CRUD facade.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Page size applied to scans and paginated reads when the caller does
    /// not pass a limit (default: 1000).
    pub default_page_limit: i32,
    /// Create missing tables on first use for schemas flagged `autoCreate`
    /// (default: true).
    pub auto_create: bool,
}

impl AdapterConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            default_page_limit: env::var("DYNAMAP_DEFAULT_PAGE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            auto_create: env_bool("DYNAMAP_AUTO_CREATE", true),
        }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 1000,
            auto_create: true,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
