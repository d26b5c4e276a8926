//! Tracing subscriber setup.
//!
//! Filter priority, highest first:
//! 1. `ZIME_LOG`
//! 2. `RUST_LOG`
//! 3. `log_filter` from `zime.toml`
//! 4. `-v` (debug for the zime crates) or plain `warn`

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const ENV_VAR: &str = "ZIME_LOG";

/// Install the global subscriber writing to stderr. A second call is a
/// no-op.
pub fn init(verbose: bool, config_filter: Option<&str>) {
    let filter = build_env_filter(verbose, config_filter);
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .compact();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn build_env_filter(verbose: bool, config_filter: Option<&str>) -> EnvFilter {
    if let Ok(directives) = std::env::var(ENV_VAR) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = default_directive(verbose, config_filter);
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Directive used when neither environment variable is set.
pub fn default_directive(verbose: bool, config_filter: Option<&str>) -> String {
    match (verbose, config_filter) {
        (true, _) => "warn,zime_core=debug,zime_tools=debug".to_string(),
        (false, Some(filter)) if !filter.trim().is_empty() => filter.trim().to_string(),
        _ => "warn".to_string(),
    }
}
