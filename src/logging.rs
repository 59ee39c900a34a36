//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The level comes from the `RUSH_LOG` environment variable ("error", "warn",
//! "info", "debug", "trace"). Without it logging stays off, so standard error
//! only ever carries the shell's own diagnostic.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;

pub const LOG_ENV_VAR: &str = "RUSH_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging() -> Result<()> {
    let level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|s| parse_level_str(&s))
        .unwrap_or(LevelFilter::OFF);

    fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {}", e))
}

fn parse_level_str(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
