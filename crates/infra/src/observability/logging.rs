//! Tracing subscriber setup
//!
//! Installs a global `tracing-subscriber` registry with an [`EnvFilter`]
//! and one fmt layer in the configured [`LogFormat`]. `RUST_LOG` is not
//! consulted; the filter comes from [`LoggingConfig`] (which the config
//! loader fills from `VOICEDASH_LOG_*`).

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use voicedash_domain::config::{LogFormat, LoggingConfig};
use voicedash_domain::{Result, VoiceDashError};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Install the global subscriber
///
/// # Errors
/// Returns `VoiceDashError::Config` if the level or filter is invalid, or
/// if a global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => {
            registry.with(tracing_subscriber::fmt::layer().pretty().with_target(true)).try_init()
        }
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        LogFormat::Compact => {
            registry.with(tracing_subscriber::fmt::layer().compact().with_target(true)).try_init()
        }
    };

    result.map_err(|e| VoiceDashError::Config(format!("Failed to initialize logging: {e}")))
}

/// Build the filter for `config`
///
/// An explicit `filter` directive wins; otherwise VoiceDash crates log at
/// `level` and HTTP internals at `warn`.
///
/// # Errors
/// Returns `VoiceDashError::Config` for an unknown level or a malformed
/// directive
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = match &config.filter {
        Some(custom) => custom.clone(),
        None => {
            let level = config.level.to_ascii_lowercase();
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(VoiceDashError::Config(format!("Invalid log level: {}", config.level)));
            }
            format!(
                "voicedash_infra={level},voicedash_common={level},voicedash_domain={level},\
                 h2=warn,hyper=warn,reqwest=warn"
            )
        }
    };

    EnvFilter::try_new(&filter_string)
        .map_err(|e| VoiceDashError::Config(format!("Invalid log filter: {e}")))
}
