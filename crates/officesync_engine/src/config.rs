//! Configuration for the sync engine.

use officesync_model::Tier;
use std::time::Duration;

/// Default settle window of the position tier.
pub const DEFAULT_POSITION_WINDOW: Duration = Duration::from_millis(2000);

/// Default settle window of the normal tier.
pub const DEFAULT_NORMAL_WINDOW: Duration = Duration::from_millis(500);

/// Environment variable holding the backend base URL.
pub const ENV_URL: &str = "OFFICESYNC_URL";

/// Environment variable holding the backend API key.
pub const ENV_API_KEY: &str = "OFFICESYNC_API_KEY";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Whether a backend is configured. When false every entry point is a
    /// no-op and the application runs on in-memory state alone.
    pub enabled: bool,
    /// Settle window of the position tier.
    pub position_window: Duration,
    /// Settle window of the normal tier.
    pub normal_window: Duration,
}

impl SyncConfig {
    /// Creates an enabled configuration with the default windows.
    pub fn new() -> Self {
        Self {
            enabled: true,
            position_window: DEFAULT_POSITION_WINDOW,
            normal_window: DEFAULT_NORMAL_WINDOW,
        }
    }

    /// Creates a configuration with sync turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Sets the position tier window.
    pub fn with_position_window(mut self, window: Duration) -> Self {
        self.position_window = window;
        self
    }

    /// Sets the normal tier window.
    pub fn with_normal_window(mut self, window: Duration) -> Self {
        self.normal_window = window;
        self
    }

    /// Returns the settle window of a tier.
    pub fn settle_window(&self, tier: Tier) -> Duration {
        match tier {
            Tier::Position => self.position_window,
            Tier::Normal => self.normal_window,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection settings for the hosted REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// Project URL, e.g. `https://abc.example.co`.
    pub base_url: String,
    /// Anonymous API key, sent as `apikey` and bearer token.
    pub api_key: String,
    /// Path prefix of the table endpoints.
    pub schema_path: String,
}

impl RestConfig {
    /// Creates a REST configuration.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            schema_path: "/rest/v1".to_string(),
        }
    }

    /// Sets the table endpoint prefix.
    pub fn with_schema_path(mut self, path: impl Into<String>) -> Self {
        self.schema_path = path.into();
        self
    }

    /// Reads [`ENV_URL`] and [`ENV_API_KEY`]. Returns `None` unless both
    /// are set and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let url = lookup(ENV_URL).filter(|v| !v.trim().is_empty())?;
        let key = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty())?;
        Some(Self::new(url.trim(), key.trim()))
    }

    /// Returns the endpoint URL of a table.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, self.schema_path, table)
    }
}
