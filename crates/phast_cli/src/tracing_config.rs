//! Tracing configuration for the `phast` binary.
//!
//! The filter comes from `PHAST_LOG`, then `RUST_LOG`, then defaults to
//! `warn`. `PHAST_LOG_FORMAT=json` switches to one JSON object per event.
//!
//! ```bash
//! PHAST_LOG=debug phast index.php
//! PHAST_LOG="phast_transformers=trace" PHAST_LOG_FORMAT=json phast index.php
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("PHAST_LOG_FORMAT").unwrap_or_default())
    }
}

fn build_filter() -> EnvFilter {
    let directives = std::env::var("PHAST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    EnvFilter::builder().parse_lossy(directives)
}

/// Install the global subscriber. All output goes to stderr so it never
/// mixes with emitted JavaScript or `--dump-bound` output.
pub fn init_tracing() {
    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
