// 📜 Logging bootstrap
// One tracing subscriber per process; the TUI writes to a file so the
// terminal stays clean.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Fails when the filter does not parse, the log file cannot be opened, or a
/// subscriber is already installed.
pub fn init_logging(filter: &str, log_file: Option<&Path>) -> Result<()> {
    let env_filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter `{}`", filter))?;

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {}", e))?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {}", e))?;
        }
    }

    tracing::info!(version = crate::VERSION, filter, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_filter() {
        let err = init_logging("family_budget=loud", None).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }
}
