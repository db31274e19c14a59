//! Diagnostic logging for the command-line host.
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG` (default
//! `chartkeeper=info`), human-readable unless `RUST_LOG_FORMAT=json`, and
//! forwards records from the library's `log` macros into it.

use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "chartkeeper=info";

/// Initializes the global subscriber. Later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let is_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if is_json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_ok() {
        let _ = LogTracer::init();
    }
}
