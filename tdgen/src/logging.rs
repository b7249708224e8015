//! Diagnostic tracing for the generator.
//!
//! Tracing output goes to stderr so stdout stays reserved for status lines
//! and generated code.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the filter is `warn`, or
/// `tdgen=debug` when `verbose` is set.
///
/// # Example
/// ```bash
/// RUST_LOG=tdgen=trace tdgen run spec.txt
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "tdgen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
