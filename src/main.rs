//! Recency LRU - command-line driver
//!
//! Reads one command per line from stdin, applies it to a cache configured
//! from the environment, and writes one reply per line to stdout.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recency_lru::config::{CacheMode, Config};
use recency_lru::driver::{Command, Reply, Session};

/// Main entry point for the cache driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging (stderr)
/// 2. Load configuration from environment variables
/// 3. Build the cache for the configured mode
/// 4. Apply stdin commands until EOF
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recency_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    match config.mode {
        CacheMode::Count => info!(capacity = config.capacity, "configuration loaded"),
        CacheMode::Bytes => info!(byte_budget = config.byte_budget, "configuration loaded"),
    }

    let mut session =
        Session::from_config(&config).context("failed to build cache from configuration")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut applied = 0u64;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read command")?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let reply = line
            .parse::<Command>()
            .and_then(|command| session.execute(command));
        match reply {
            Ok(Reply::Dump { text }) => write!(out, "{}", text)?,
            Ok(reply) => {
                let json = serde_json::to_string(&reply).context("failed to encode reply")?;
                writeln!(out, "{}", json)?;
            }
            Err(err) => {
                warn!(%err, "command rejected");
                writeln!(out, "{}", serde_json::json!({ "error": err.to_string() }))?;
            }
        }
        applied += 1;
    }

    out.flush()?;
    info!(applied, "input exhausted, shutting down");
    Ok(())
}
