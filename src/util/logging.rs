//! Structured logging setup for cdash-reporter
//!
//! The library itself only emits `tracing` events. Embedding tools that want those
//! events on the console (or as JSON lines on a CI runner) call one of the `init_*`
//! functions once at startup.
//!
//! # Example
//!
//! ```no_run
//! use cdash_reporter::util::logging;
//!
//! // With environment: CDASH_LOG_LEVEL=debug CDASH_LOG_JSON=true
//! logging::init_from_env();
//!
//! tracing::info!(build = "zlib", "Reporting started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the minimum log level
pub const LOG_LEVEL_ENV: &str = "CDASH_LOG_LEVEL";

/// Environment variable switching to JSON output
pub const LOG_JSON_ENV: &str = "CDASH_LOG_JSON";

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for events from this crate
    pub level: Level,

    /// One JSON object per line instead of human-readable output
    pub use_json: bool,

    /// Include the module target (e.g. `cdash_reporter::upload`)
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

    /// JSON output with source locations, for CI logs that get machine-parsed
    pub fn ci() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    /// Reads [`LOG_LEVEL_ENV`] and [`LOG_JSON_ENV`], falling back to defaults
    pub fn from_env() -> Self {
        let level = env::var(LOG_LEVEL_ENV)
            .map(|s| parse_level(&s))
            .unwrap_or(Level::INFO);

        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::from_default_env();
        for directive in [
            format!("cdash_reporter={}", self.level),
            "hyper=warn".to_string(),
            "reqwest=warn".to_string(),
        ] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
}

/// Parses a log level (case-insensitive), defaulting to INFO
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

/// Installs the global subscriber; later calls are ignored
///
/// `RUST_LOG` directives are honoured in addition to the configured level.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();
        let layer = fmt::layer()
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        // try_init: the host may already own a global subscriber
        let _ = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        };
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level("INFO"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
        assert!(!config.include_location);
    }

    #[test]
    fn test_ci_config() {
        let config = LoggingConfig::ci();
        assert!(config.use_json);
        assert!(config.include_location);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(LOG_LEVEL_ENV, "debug");
        env::set_var(LOG_JSON_ENV, "true");

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);

        env::remove_var(LOG_LEVEL_ENV);
        env::remove_var(LOG_JSON_ENV);

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_default();
        init_logging(LoggingConfig::with_level(Level::DEBUG));
    }
}
