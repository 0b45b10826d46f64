//! Tracing bootstrap. Logs go to stderr; stdout carries the port stream.

use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str =
    "warn,meetbridge_cli=info,meetbridge_runtime=info,meetbridge_backend=info";

/// Initialize the global tracing subscriber.
///
/// Precedence:
/// 1) `RUST_LOG`
/// 2) `MEETBRIDGE_LOG`
/// 3) internal default filter
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(filter_from_env())
        .try_init();
}

fn filter_from_env() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if let Some(filter) = env::var("MEETBRIDGE_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
    {
        return filter;
    }

    EnvFilter::new(DEFAULT_FILTER)
}
