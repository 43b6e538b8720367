//! Tracing subscriber setup.
//!
//! The level comes from `RUST_LOG` when set, e.g.
//!
//! ```bash
//! RUST_LOG=netowork_auth=debug,sqlx=warn netowork sweep
//! ```
//!
//! Call exactly one initializer, once, at process start.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Plain text logs at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging() {
    init_logging_with_level("info");
}

/// Plain text logs with an explicit default level (`"debug"`, `"warn"`, ...).
/// `RUST_LOG` still wins when present.
pub fn init_logging_with_level(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Multi-line, human oriented output for local development.
pub fn init_logging_pretty() {
    tracing_subscriber::registry()
        .with(filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_line_number(true)
                .with_target(true),
        )
        .init();
}

/// One JSON object per event, for log aggregation in production.
pub fn init_logging_json() {
    init_logging_json_with_level("info");
}

pub fn init_logging_json_with_level(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
