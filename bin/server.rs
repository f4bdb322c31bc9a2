// Family Budget - Web Server
// REST API + dashboard shell with Axum

use anyhow::{Context, Result};
use clap::Parser;
use family_budget::api::{router, AppState};
use family_budget::{init_logging, AppConfig, LocalStore};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "budget-server",
    about = "JSON API and web dashboard for the household budget",
    version
)]
struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "BUDGET_BIND")]
    bind: Option<String>,

    /// SQLite file holding the local store (`:memory:` for a throwaway session)
    #[arg(long, env = "BUDGET_DB")]
    db: Option<String>,

    /// Delay in front of login, assistant and scan analysis
    #[arg(long, env = "BUDGET_LATENCY_MS")]
    latency_ms: Option<u64>,

    /// Tracing filter, e.g. `family_budget=debug,tower_http=debug`
    #[arg(long, env = "BUDGET_LOG")]
    log: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "BUDGET_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl ServerArgs {
    /// Flags win over the defaults in `base`.
    fn apply(self, mut base: AppConfig) -> AppConfig {
        if let Some(bind) = self.bind {
            base.bind_addr = bind;
        }
        if let Some(db) = self.db {
            base.db_path = (db != ":memory:").then(|| PathBuf::from(db));
        }
        if let Some(ms) = self.latency_ms {
            base.simulated_latency = Duration::from_millis(ms);
        }
        if let Some(filter) = self.log {
            base.log_filter = filter;
        }
        if let Some(file) = self.log_file {
            base.log_file = Some(file);
        }
        base
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerArgs::parse().apply(AppConfig::from_env());
    init_logging(&config.log_filter, config.log_file.as_deref())?;

    println!("🌐 Family Budget - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = match &config.db_path {
        Some(path) => LocalStore::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?,
        None => LocalStore::open_in_memory()?,
    };
    match &config.db_path {
        Some(path) => println!("✓ Store opened: {}", path.display()),
        None => println!("✓ In-memory store (nothing is kept after exit)"),
    }

    let app = router(AppState::new(store, config.simulated_latency));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, latency_ms = config.simulated_latency.as_millis() as u64, "server listening");
    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/dashboard", config.bind_addr);
    println!("   UI:  http://{}/dashboard", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("server stopped unexpectedly")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = ServerArgs::try_parse_from([
            "budget-server",
            "--bind",
            "127.0.0.1:8080",
            "--db",
            ":memory:",
            "--latency-ms",
            "0",
        ])
        .unwrap();

        let config = args.apply(AppConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.db_path.is_none());
        assert_eq!(config.simulated_latency, Duration::ZERO);
    }

    #[test]
    fn test_no_flags_keep_base() {
        let args = ServerArgs {
            bind: None,
            db: None,
            latency_ms: None,
            log: None,
            log_file: None,
        };
        assert_eq!(args.apply(AppConfig::default()), AppConfig::default());
    }

    #[test]
    fn test_rejects_non_numeric_latency() {
        assert!(ServerArgs::try_parse_from(["budget-server", "--latency-ms", "soon"]).is_err());
    }
}
