use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: our crates plus per-request spans.
pub const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Install the global JSON subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` when a subscriber
/// was already installed (the call is then a no-op).
pub fn install(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Span fields (run_id, request) are attached to every event inside them.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
