//! Input records handed over by the build orchestrator

use crate::error::{ReportError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Everything collected while installing a set of specs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub specs: Vec<SpecRecord>,
}

/// One spec requested for installation, with the units built on its behalf
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRecord {
    pub name: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
}

/// Per-spec totals over its packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpecSummary {
    pub npackages: usize,
    pub nfailures: usize,
    pub nerrors: usize,
    /// Sum of `elapsed_time`, missing values counted as zero
    pub time: f64,
}

impl SpecRecord {
    pub fn summary(&self) -> SpecSummary {
        let count = |result: PackageResult| {
            self.packages
                .iter()
                .filter(|p| p.result == Some(result))
                .count()
        };

        SpecSummary {
            npackages: self.packages.len(),
            nfailures: count(PackageResult::Failure),
            nerrors: count(PackageResult::Error),
            time: self.packages.iter().filter_map(|p| p.elapsed_time).sum(),
        }
    }
}

/// Outcome of installing a single package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageResult {
    Success,
    Failure,
    Error,
    Skipped,
}

/// A built unit and its captured output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<PackageResult>,
    /// Seconds spent installing; pre-installed units carry it as a string (`"0.0"`)
    #[serde(default, deserialize_with = "seconds_from_number_or_string")]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    /// Combined stdout/stderr of every install phase; absent when nothing was captured
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub installed_from_binary_cache: bool,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn with_result(mut self, result: PackageResult) -> Self {
        self.result = Some(result);
        self
    }
}

impl ReportData {
    /// Convenience constructor for a single spec holding the given packages
    pub fn single(spec_name: impl Into<String>, packages: Vec<PackageRecord>) -> Self {
        Self {
            specs: vec![SpecRecord {
                name: spec_name.into(),
                timestamp: None,
                packages,
            }],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Iterates every package of every spec, in input order
    pub fn packages(&self) -> impl Iterator<Item = &PackageRecord> {
        self.specs.iter().flat_map(|spec| spec.packages.iter())
    }
}

fn seconds_from_number_or_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(secs)) => Ok(Some(secs)),
        Some(Seconds::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid elapsed_time '{}'", text))),
    }
}

/// Reads a package's build log, substituting a placeholder when it is unreadable
pub fn read_build_log(path: &Path, short_spec: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Build log unavailable");
            format!("Cannot open build log for {}", short_spec)
        }
    }
}
