use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Interval of the expired-entry sweep in seconds, 0 disables (default: 60)
    pub cache_sweep_seconds: u64,
    /// Path to SQLite database file (default: "salespulse.db")
    pub sqlite_path: String,
    /// Directory holding trained models (default: "models")
    pub models_dir: String,
    /// Window for coalescing change signals in milliseconds (default: 250)
    pub change_debounce_ms: u64,
    /// Training deadline in seconds, 0 means none (default: 0)
    pub training_timeout_seconds: u64,
    /// Outbound queue capacity per connected observer (default: 64)
    pub observer_buffer: usize,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_SWEEP_SECONDS` - Expiry sweep interval (default: 60)
    /// - `SQLITE_PATH` - SQLite database path (default: "salespulse.db")
    /// - `MODELS_DIR` - Model store directory (default: "models")
    /// - `CHANGE_DEBOUNCE_MS` - Change signal coalescing window (default: 250)
    /// - `TRAINING_TIMEOUT_SECONDS` - Training deadline (default: 0, none)
    /// - `OBSERVER_BUFFER` - Per-observer queue capacity (default: 64)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: parse_env("CACHE_TTL_SECONDS", 300),
            cache_max_entries: parse_env("CACHE_MAX_ENTRIES", 10_000),
            cache_sweep_seconds: parse_env("CACHE_SWEEP_SECONDS", 60),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "salespulse.db".to_string()),
            models_dir: env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
            change_debounce_ms: parse_env("CHANGE_DEBOUNCE_MS", 250),
            training_timeout_seconds: parse_env("TRAINING_TIMEOUT_SECONDS", 0),
            observer_buffer: parse_env("OBSERVER_BUFFER", 64),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Sweep interval, `None` when sweeping is disabled.
    pub fn cache_sweep_interval(&self) -> Option<Duration> {
        (self.cache_sweep_seconds > 0).then(|| Duration::from_secs(self.cache_sweep_seconds))
    }

    pub fn change_debounce(&self) -> Duration {
        Duration::from_millis(self.change_debounce_ms)
    }

    /// Training deadline, `None` when unbounded.
    pub fn training_timeout(&self) -> Option<Duration> {
        (self.training_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.training_timeout_seconds))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
