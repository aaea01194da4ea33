// Logging module for structured logging using the tracing crate

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

static INIT: Once = Once::new();

/// Initialize the tracing subscriber for structured logging
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `config.level`. Output goes to stderr so command output on stdout stays
/// machine-readable.
///
/// Only the first call installs a subscriber; later calls are no-ops. If
/// another global subscriber is already installed, it is left in place.
///
/// # Examples
///
/// ```
/// use watermark_my_images::config::LoggingConfig;
/// use watermark_my_images::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default());
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let result = match config.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.try_init(),
        };

        if let Err(e) = result {
            eprintln!("Logging not initialized: {}", e);
        }
    });
}
