//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `VOICEDASH_API_BASE_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `VOICEDASH_API_BASE_URL`: Backend base URL (required)
//! - `VOICEDASH_REFRESH_PATH`: Token refresh endpoint path
//! - `VOICEDASH_LOGIN_PATH`: Login endpoint path
//! - `VOICEDASH_REQUEST_TIMEOUT_MS`: Per-request timeout
//! - `VOICEDASH_TOKEN_WAIT_TIMEOUT_MS`: How long requests wait for a token
//! - `VOICEDASH_TOKEN_POLL_INTERVAL_MS`: Token availability poll interval
//! - `VOICEDASH_SIGN_IN_REDIRECT`: Redirect target on session termination
//! - `VOICEDASH_SESSION_FILE`: Persisted session location
//! - `VOICEDASH_LOG_LEVEL`: Log level (`trace`..`error`)
//! - `VOICEDASH_LOG_FORMAT`: `pretty`, `json` or `compact`
//! - `VOICEDASH_LOG_FILTER`: Full filter directive, overrides the level
//!
//! Unset optional variables keep their defaults.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}`, then `./voicedash.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use voicedash_domain::config::{ApiConfig, AuthConfig, Config, LogFormat, LoggingConfig};
use voicedash_domain::{Result, VoiceDashError};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "voicedash.json", "voicedash.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `VoiceDashError::Config` if neither source yields a valid
/// configuration
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `VoiceDashError::Config` if `VOICEDASH_API_BASE_URL` is missing
/// or a variable has an invalid value
pub fn load_from_env() -> Result<Config> {
    let api_defaults = ApiConfig::default();
    let auth_defaults = AuthConfig::default();
    let logging_defaults = LoggingConfig::default();

    let api = ApiConfig {
        base_url: env_var("VOICEDASH_API_BASE_URL")?,
        refresh_path: env_or("VOICEDASH_REFRESH_PATH", api_defaults.refresh_path),
        login_path: env_or("VOICEDASH_LOGIN_PATH", api_defaults.login_path),
        request_timeout_ms: env_parse(
            "VOICEDASH_REQUEST_TIMEOUT_MS",
            api_defaults.request_timeout_ms,
        )?,
        user_agent: api_defaults.user_agent,
    };

    let auth = AuthConfig {
        token_wait_timeout_ms: env_parse(
            "VOICEDASH_TOKEN_WAIT_TIMEOUT_MS",
            auth_defaults.token_wait_timeout_ms,
        )?,
        token_poll_interval_ms: env_parse(
            "VOICEDASH_TOKEN_POLL_INTERVAL_MS",
            auth_defaults.token_poll_interval_ms,
        )?,
        sign_in_redirect: env_or("VOICEDASH_SIGN_IN_REDIRECT", auth_defaults.sign_in_redirect),
        session_file: std::env::var("VOICEDASH_SESSION_FILE").ok().or(auth_defaults.session_file),
    };

    let format = match std::env::var("VOICEDASH_LOG_FORMAT") {
        Ok(raw) => parse_log_format(&raw)?,
        Err(_) => logging_defaults.format,
    };
    let logging = LoggingConfig {
        level: env_or("VOICEDASH_LOG_LEVEL", logging_defaults.level),
        format,
        filter: std::env::var("VOICEDASH_LOG_FILTER").ok().or(logging_defaults.filter),
    };

    Ok(Config { api, auth, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `VoiceDashError::Config` if the file is missing, unreadable, or
/// malformed
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(VoiceDashError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            VoiceDashError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| VoiceDashError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| VoiceDashError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| VoiceDashError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(VoiceDashError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| [root.clone(), root.join(".."), root.join("../..")])
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        VoiceDashError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| VoiceDashError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        "compact" => Ok(LogFormat::Compact),
        other => Err(VoiceDashError::Config(format!("Unsupported log format: {other}"))),
    }
}
