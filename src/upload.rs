//! Submission of rendered reports to a CDash server
//!
//! CDash expects each XML file as the body of an HTTP PUT against its `submit.php`
//! endpoint, with the build identity and an MD5 of the file in the query string.

use crate::error::{ReportError, Result};
use crate::identity::BuildIdentity;
use regex::Regex;
use reqwest::blocking::{Body, Client};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Url;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

/// Read size used while checksumming report files
pub const CHECKSUM_BLOCK_SIZE: usize = 8192;

const SUBMIT_ENDPOINT: &str = "submit.php";

/// What the dashboard told us about an accepted report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub build_id: Option<u64>,
    pub summary_url: Option<String>,
}

/// MD5 of a file's contents as lowercase hex, read in fixed-size blocks
pub fn md5_file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    let mut context = md5::Context::new();
    let mut block = [0u8; CHECKSUM_BLOCK_SIZE];

    loop {
        match file.read(&mut block) {
            Ok(0) => break,
            Ok(n) => context.consume(&block[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ReportError::io(path, e)),
        }
    }

    Ok(format!("{:x}", context.compute()))
}

/// Extracts the numeric `<buildId>` from a submit response
pub fn parse_build_id(body: &str) -> Option<u64> {
    static BUILD_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = BUILD_ID_REGEX
        .get_or_init(|| Regex::new(r"<buildId>([0-9]+)</buildId>").expect("Invalid buildId regex"));

    re.captures(body)?.get(1)?.as_str().parse().ok()
}

/// Link to the human-readable build summary, derived from the submit URL
pub fn summary_url(upload_url: &str, build_id: u64) -> Option<String> {
    let base = &upload_url[..upload_url.find(SUBMIT_ENDPOINT)?];
    Some(format!("{}buildSummary.php?buildid={}", base, build_id))
}

/// Uploads report files for one session
#[derive(Debug, Clone)]
pub struct Uploader {
    target: Option<(String, Client)>,
}

impl Uploader {
    /// Creates an uploader; `None` makes every upload a no-op
    pub fn new(upload_url: Option<String>, timeout: Duration) -> Result<Self> {
        let target = match upload_url {
            Some(url) => {
                let client = Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(|e| ReportError::Upload {
                        url: url.clone(),
                        source: e,
                    })?;
                Some((url, client))
            }
            None => None,
        };
        Ok(Self { target })
    }

    /// Uploader that never contacts a server
    pub fn disabled() -> Self {
        Self { target: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Submit URL with the identity and checksum appended to its query string
    pub fn submission_url(upload_url: &str, identity: &BuildIdentity, md5sum: &str) -> Result<Url> {
        let mut url = Url::parse(upload_url).map_err(|e| ReportError::InvalidUrl {
            url: upload_url.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("build", identity.buildname())
            .append_pair("site", identity.site())
            .append_pair("stamp", identity.buildstamp())
            .append_pair("MD5", md5sum);
        Ok(url)
    }

    /// PUTs one report file
    ///
    /// Returns `Ok(None)` when uploading is disabled. Transport failures and non-success
    /// statuses are returned as errors and not retried. A response without a build id
    /// is still a success.
    pub fn upload(&self, path: &Path, identity: &BuildIdentity) -> Result<Option<UploadOutcome>> {
        let Some((upload_url, client)) = &self.target else {
            return Ok(None);
        };

        let md5sum = md5_file_checksum(path)?;
        let url = Self::submission_url(upload_url, identity, &md5sum)?;

        let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| ReportError::io(path, e))?
            .len();

        debug!(url = %url, bytes = size, md5 = %md5sum, "Submitting report");

        let upload_error = |source| ReportError::Upload {
            url: upload_url.clone(),
            source,
        };
        let response = client
            .put(url)
            .header(CONTENT_TYPE, "text/xml")
            .header(CONTENT_LENGTH, size)
            .body(Body::sized(file, size))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(upload_error)?;
        let body = response.text().map_err(upload_error)?;

        let build_id = parse_build_id(&body);
        let summary = build_id.and_then(|id| summary_url(upload_url, id));
        if let Some(link) = &summary {
            info!("View your build results here:\n  {}\n", link);
        } else {
            debug!("CDash response did not include a build id");
        }

        Ok(Some(UploadOutcome {
            build_id,
            summary_url: summary,
        }))
    }
}
