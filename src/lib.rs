pub mod catalog;
pub mod commands;
pub mod config;
pub mod connection_config;
pub mod core_state;
pub mod db;
pub mod driver;
pub mod intake;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod synthesis;
pub mod templates;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, filtered by `RUST_LOG` or the default filter.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

/// Build file-backed state from the environment.
pub fn init() -> Result<core_state::CoreState, core_state::CoreError> {
    init_logging();
    core_state::CoreState::new(config::SimulatorConfig::from_env())
}
