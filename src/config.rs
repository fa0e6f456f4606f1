//! Configuration management for cdash-reporter
//!
//! Settings normally arrive from the command layer that drives an installation. They can
//! also be loaded from environment variables, with defaults for anything missing.
//!
//! # Environment Variables
//!
//! - `CDASH_UPLOAD_URL`: CDash submit URL, e.g.
//!   `https://cdash.example.com/submit.php?project=Spack`. Unset or empty disables upload.
//! - `CDASH_BUILD`: Build name reported to CDash - default: the install command
//! - `CDASH_SITE`: Site name reported to CDash - default: local hostname
//! - `CDASH_TRACK`: Group the results are filed under - default: "Experimental"
//! - `CDASH_BUILDSTAMP`: Full build stamp override (takes precedence over the track)
//! - `CDASH_REQUEST_TIMEOUT`: Upload timeout in seconds - default: "120"
//!
//! # Example
//!
//! ```no_run
//! use cdash_reporter::CDashConfig;
//!
//! let config = CDashConfig::from_env()
//!     .expect("valid environment")
//!     .with_install_command("zlib@1.2.11 %gcc");
//! config.validate().expect("Invalid configuration");
//! ```

use reqwest::Url;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TRACK: &str = "Experimental";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Upload URL is not an absolute URL
    #[error("Invalid CDash upload URL '{url}': {reason}")]
    InvalidUploadUrl { url: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Settings for one reporting session
#[derive(Debug, Clone, PartialEq)]
pub struct CDashConfig {
    /// CDash submit URL; `None` turns uploading into a no-op
    pub upload_url: Option<String>,

    /// Build name override
    pub build: Option<String>,

    /// Site name override
    pub site: Option<String>,

    /// Track label folded into the build stamp
    pub track: String,

    /// Complete build stamp override
    pub buildstamp: Option<String>,

    /// Textual install command (the specs being installed)
    pub install_command: String,

    /// Timeout applied to each upload request
    pub request_timeout: Duration,
}

impl Default for CDashConfig {
    fn default() -> Self {
        Self {
            upload_url: None,
            build: None,
            site: None,
            track: DEFAULT_TRACK.to_string(),
            buildstamp: None,
            install_command: String::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl CDashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from `CDASH_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            upload_url: non_empty_var("CDASH_UPLOAD_URL"),
            build: non_empty_var("CDASH_BUILD"),
            site: non_empty_var("CDASH_SITE"),
            buildstamp: non_empty_var("CDASH_BUILDSTAMP"),
            ..Default::default()
        };

        if let Some(track) = non_empty_var("CDASH_TRACK") {
            config.track = track;
        }

        if let Some(timeout) = non_empty_var("CDASH_REQUEST_TIMEOUT") {
            let secs = timeout
                .parse::<u64>()
                .map_err(|e| ConfigError::ParseError {
                    field: "CDASH_REQUEST_TIMEOUT".to_string(),
                    error: e.to_string(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = Some(url.into()).filter(|u: &String| !u.is_empty());
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into()).filter(|b: &String| !b.is_empty());
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    pub fn with_buildstamp(mut self, buildstamp: impl Into<String>) -> Self {
        self.buildstamp = Some(buildstamp.into()).filter(|b: &String| !b.is_empty());
        self
    }

    pub fn with_install_command(mut self, command: impl Into<String>) -> Self {
        self.install_command = command.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Checks that the settings can drive a session
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.upload_url {
            Url::parse(url).map_err(|e| ConfigError::InvalidUploadUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        if self.buildstamp.is_none() && self.track.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "track must not be empty when no build stamp is given".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: &[&str] = &[
        "CDASH_UPLOAD_URL",
        "CDASH_BUILD",
        "CDASH_SITE",
        "CDASH_TRACK",
        "CDASH_BUILDSTAMP",
        "CDASH_REQUEST_TIMEOUT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = CDashConfig::default();
        assert_eq!(config.upload_url, None);
        assert_eq!(config.track, "Experimental");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CDashConfig::new()
            .with_upload_url("https://cdash.example.com/submit.php?project=Spack")
            .with_build("nightly")
            .with_site("builder-01")
            .with_track("Nightly")
            .with_install_command("zlib")
            .with_request_timeout(Duration::from_secs(30));

        assert_eq!(
            config.upload_url.as_deref(),
            Some("https://cdash.example.com/submit.php?project=Spack")
        );
        assert_eq!(config.build.as_deref(), Some("nightly"));
        assert_eq!(config.site.as_deref(), Some("builder-01"));
        assert_eq!(config.track, "Nightly");
        assert_eq!(config.install_command, "zlib");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_upload_url_disables_upload() {
        let config = CDashConfig::new().with_upload_url("");
        assert_eq!(config.upload_url, None);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = CDashConfig::new().with_upload_url("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUploadUrl { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = CDashConfig::new().with_request_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("CDASH_UPLOAD_URL", "http://localhost/cdash/submit.php?project=X");
        env::set_var("CDASH_SITE", "my_custom_site");
        env::set_var("CDASH_TRACK", "my_custom_track");
        env::set_var("CDASH_REQUEST_TIMEOUT", "15");
        env::set_var("CDASH_BUILD", "");

        let config = CDashConfig::from_env().unwrap();
        assert_eq!(
            config.upload_url.as_deref(),
            Some("http://localhost/cdash/submit.php?project=X")
        );
        assert_eq!(config.site.as_deref(), Some("my_custom_site"));
        assert_eq!(config.track, "my_custom_track");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.build, None);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout() {
        clear_env();
        env::set_var("CDASH_REQUEST_TIMEOUT", "soon");

        let err = CDashConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref field, .. } if field == "CDASH_REQUEST_TIMEOUT"));

        clear_env();
    }
}
