//! Tracing setup for console diagnostics.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=habit_shift=debug`
/// to see per-cell coercion counts.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habit_shift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
