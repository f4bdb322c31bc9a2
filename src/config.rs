// ⚙️ Application configuration
// Defaults, overridden by BUDGET_* environment variables; the CLI layers
// its own flags on top.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_FILE: &str = "family-budget.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LATENCY_MS: u64 = 1000;
pub const DEFAULT_LOG_FILTER: &str = "family_budget=info,budget_server=info,tower_http=info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` keeps everything in memory for the life of the process.
    pub db_path: Option<PathBuf>,
    pub bind_addr: String,
    /// Artificial delay in front of login, assistant and scan analysis.
    pub simulated_latency: Duration,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: Some(PathBuf::from(DEFAULT_DB_FILE)),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            simulated_latency: Duration::from_millis(DEFAULT_LATENCY_MS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source (tests pass a map).
    ///
    /// `BUDGET_DB=:memory:` selects the in-memory store. An unparsable
    /// latency keeps the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(db) = lookup("BUDGET_DB") {
            config.db_path = if db == ":memory:" {
                None
            } else {
                Some(PathBuf::from(db))
            };
        }
        if let Some(bind) = lookup("BUDGET_BIND") {
            config.bind_addr = bind;
        }
        if let Some(ms) = lookup("BUDGET_LATENCY_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.simulated_latency = Duration::from_millis(ms);
        }
        if let Some(filter) = lookup("BUDGET_LOG") {
            config.log_filter = filter;
        }
        if let Some(file) = lookup("BUDGET_LOG_FILE") {
            config.log_file = Some(PathBuf::from(file));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.simulated_latency, Duration::from_millis(1000));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BUDGET_DB", ":memory:"),
            ("BUDGET_BIND", "127.0.0.1:8080"),
            ("BUDGET_LATENCY_MS", "0"),
            ("BUDGET_LOG_FILE", "/tmp/budget.log"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert!(config.db_path.is_none());
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.simulated_latency, Duration::ZERO);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/budget.log")));
    }

    #[test]
    fn test_bad_latency_keeps_default() {
        let config = AppConfig::from_lookup(|k| (k == "BUDGET_LATENCY_MS").then(|| "soon".to_string()));
        assert_eq!(config.simulated_latency, Duration::from_millis(DEFAULT_LATENCY_MS));
    }
}
