use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins; otherwise info for everything and debug for
/// this crate. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,draftroom=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
