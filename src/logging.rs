//! Log setup shared by the command-line tools

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unusable
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `RUST_LOG`-style directives
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the fmt subscriber, honoring `RUST_LOG`
pub fn init() {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .init();
}
