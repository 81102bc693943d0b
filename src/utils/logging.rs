use tracing_subscriber::{fmt, EnvFilter};

// JSON logs without ANSI colors or module targets so CloudWatch renders them
// cleanly. RUST_LOG overrides the default filter.
pub fn setup_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_ansi(false)
        .json()
        .try_init();
}
