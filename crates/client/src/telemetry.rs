//! Tracing bootstrap for host applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with an env filter and a fmt layer.
///
/// Defaults to info level for this crate if `RUST_LOG` is not set. Call once
/// at app startup; calling twice panics inside `tracing-subscriber`, so
/// embedders owning their own subscriber should skip this.
pub fn init_telemetry() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tiffin_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
