pub mod config;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod verifier;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding this crate. Honors RUST_LOG,
/// falling back to the crate-level default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
