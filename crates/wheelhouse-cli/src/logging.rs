//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate; `wheelhouse-core` only emits events.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `level` - Level for wheelhouse's own crates (see `Config::log_level`)
/// * `json` - If true, output JSON lines to stderr
///
/// Output always goes to stderr so stdout stays parseable.
///
/// # Panics
/// Panics if the subscriber cannot be initialized (e.g., called twice).
pub fn init(level: Level, json: bool) {
    // RUST_LOG wins for other crates; our crates follow -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("wheelhouse_core={level}").parse().unwrap())
        .add_directive(format!("wheelhouse={level}").parse().unwrap());

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
