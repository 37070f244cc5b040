use crate::components::storage::{mark_installed, token_like_keys, KeyValueStore};
use crate::config::Config;
use crate::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => {
            info!(
                "Loaded configuration: endpoint {}, timezone {}, recipient mode {}",
                config.endpoint, config.timezone, config.recipients.mode
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// One-time side effects on the host storage: installed marker and a token key survey.
///
/// The marker is optional; a store that cannot be written only logs a warning.
pub fn prepare_store(store: &mut dyn KeyValueStore) {
    match mark_installed(store) {
        Ok(()) => info!("Outlook OOTO initialized"),
        Err(e) => warn!("Could not write installed marker: {}", e),
    }

    for key in token_like_keys(&*store) {
        debug!("Found token-like storage key: {}", key);
    }
}
