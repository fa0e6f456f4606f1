//! Build identity shared by every report of a session

use crate::config::CDashConfig;
use chrono::{Local, TimeZone, Utc};
use sysinfo::System;

const FALLBACK_SITE: &str = "localhost";

/// Identifies one reporting session to the dashboard
///
/// Constructed once from configuration and never mutated afterwards. Every report
/// written during the session carries the same identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    buildname: String,
    site: String,
    osname: String,
    buildstamp: String,
    install_command: String,
    starttime: i64,
}

impl BuildIdentity {
    /// Resolves defaults (hostname, OS, build stamp) against the current time
    pub fn from_config(config: &CDashConfig) -> Self {
        Self::at(config, Utc::now().timestamp())
    }

    /// Same as [`from_config`](Self::from_config) with an explicit session start
    pub fn at(config: &CDashConfig, starttime: i64) -> Self {
        let buildname = config
            .build
            .clone()
            .unwrap_or_else(|| config.install_command.clone());
        let site = config.site.clone().unwrap_or_else(local_hostname);
        let buildstamp = config
            .buildstamp
            .clone()
            .unwrap_or_else(|| format_buildstamp(starttime, &config.track));

        Self {
            buildname,
            site,
            osname: os_name(),
            buildstamp,
            install_command: config.install_command.clone(),
            starttime,
        }
    }

    pub fn buildname(&self) -> &str {
        &self.buildname
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn osname(&self) -> &str {
        &self.osname
    }

    pub fn buildstamp(&self) -> &str {
        &self.buildstamp
    }

    pub fn install_command(&self) -> &str {
        &self.install_command
    }

    /// Session start in seconds since the Unix epoch
    pub fn starttime(&self) -> i64 {
        self.starttime
    }
}

/// Formats `YYYYMMDD-HHMM-<track>` in local time
pub fn format_buildstamp(starttime: i64, track: &str) -> String {
    let stamp = match Local.timestamp_opt(starttime, 0).earliest() {
        Some(local) => local.format("%Y%m%d-%H%M").to_string(),
        None => Utc::now().format("%Y%m%d-%H%M").to_string(),
    };
    format!("{}-{}", stamp, track)
}

fn local_hostname() -> String {
    System::host_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_SITE.to_string())
}

fn os_name() -> String {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
    .to_string()
}
