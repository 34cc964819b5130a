//! CLI argument definitions for the enrollcast binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Enrollcast: a terminal chat assistant for FOUN enrollment forecasting.
#[derive(Parser, Debug)]
#[command(name = "enrollcast", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the forecasting backend.
    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Send one message, print the reply and exit.
    #[arg(short = 'm', long = "message")]
    pub message: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ENROLLCAST_CONFIG env var > ~/.enrollcast/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ENROLLCAST_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --api-url flag > ENROLLCAST_API_URL env var > config file value.
    pub fn resolve_api_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.api_url {
            return url.clone();
        }
        match std::env::var("ENROLLCAST_API_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => config_url.to_string(),
        }
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        match std::env::var("RUST_LOG") {
            Ok(level) if !level.trim().is_empty() => level,
            _ => config_level.to_string(),
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".enrollcast").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".enrollcast").join("config.toml");
    }
    PathBuf::from("config.toml")
}
