//! Configuration management for jarbox
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `JARBOX_LOG_LEVEL`: Logging level - default: "info"
//! - `JARBOX_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `JARBOX_IMAGE_PREFIX`: Prefix of built image tags and container names - default: "jarbox"
//! - `JARBOX_STAGING_DIR`: Directory staged projects are copied into - default: system temp dir
//! - `JARBOX_DOCKER_HOST`: Docker endpoint (`unix://...` or `http://...`) - default: local socket
//!
//! # Example
//!
//! ```no_run
//! use jarbox::JarboxConfig;
//!
//! let config = JarboxConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("Images tagged as {}-<user>-<project>", config.image_prefix);
//! ```

use crate::util::logging::{parse_level, LoggingConfig};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_IMAGE_PREFIX: &str = "jarbox";

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid image prefix: '{0}'. Use lowercase letters, digits and '-'")]
    InvalidImagePrefix(String),
}

#[derive(Debug, Clone)]
pub struct JarboxConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Prefix of image tags and container names
    pub image_prefix: String,

    /// Parent directory for staged project copies
    pub staging_dir: PathBuf,

    /// Docker endpoint; `None` uses the local defaults
    pub docker_host: Option<String>,
}

impl Default for JarboxConfig {
    /// Loads from `JARBOX_*` environment variables, falling back to defaults
    fn default() -> Self {
        let log_level = env::var("JARBOX_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("JARBOX_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let image_prefix =
            env::var("JARBOX_IMAGE_PREFIX").unwrap_or_else(|_| DEFAULT_IMAGE_PREFIX.to_string());

        let staging_dir = env::var("JARBOX_STAGING_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let docker_host = env::var("JARBOX_DOCKER_HOST")
            .ok()
            .filter(|v| !v.is_empty());

        Self {
            log_level,
            log_json,
            image_prefix,
            staging_dir,
            docker_host,
        }
    }
}

impl JarboxConfig {
    /// Logging setup for this configuration. Call after `validate`.
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: parse_level(&self.log_level),
            use_json: self.log_json,
            ..LoggingConfig::default()
        }
    }

    /// Checks the log level and image prefix
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        let prefix_ok = !self.image_prefix.is_empty()
            && !self.image_prefix.starts_with('-')
            && self
                .image_prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !prefix_ok {
            return Err(ConfigError::InvalidImagePrefix(self.image_prefix.clone()));
        }

        if let Some(host) = &self.docker_host {
            if !(host.starts_with("unix://")
                || host.starts_with("http://")
                || host.starts_with("tcp://"))
            {
                return Err(ConfigError::ValidationFailed(format!(
                    "Unsupported docker host: {}. Use unix://, http:// or tcp://",
                    host
                )));
            }
        }

        Ok(())
    }
}
