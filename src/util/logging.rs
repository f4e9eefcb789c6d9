//! Structured logging setup for jarbox
//!
//! Console output by default, JSON output for production. `RUST_LOG` takes
//! precedence over the configured level when set.
//!
//! ```no_run
//! use jarbox::JarboxConfig;
//! use jarbox::util::logging;
//!
//! logging::init_logging(JarboxConfig::default().logging_config());
//! tracing::info!("jarbox started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., jarbox::template) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with source locations
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }
}

/// Parses a log level, falling back to INFO for unknown values
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let mut filter = EnvFilter::new(format!("jarbox={}", level));
    for directive in ["h2=warn", "hyper=warn", "hyper_util=warn", "bollard=warn"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
