//! Reporting session: segment, classify, render and upload, one phase at a time

use crate::config::CDashConfig;
use crate::error::{ReportError, Result};
use crate::extract::{CTestLogParser, LogEventExtractor};
use crate::identity::BuildIdentity;
use crate::input::ReportData;
use crate::model::ReportModel;
use crate::phase::CoarsePhase;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::render::{write_report, ReportKind};
use crate::segment::segment_report;
use crate::upload::{UploadOutcome, Uploader};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A report file that was written (and possibly uploaded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub phase: CoarsePhase,
    pub path: PathBuf,
    /// `None` when uploading is disabled
    pub upload: Option<UploadOutcome>,
}

/// Turns the results of an installation into report files
pub trait Reporter {
    /// Reports the build output of every installed unit
    fn build_report(&self, dir: &Path, data: &ReportData) -> Result<Vec<ReportOutcome>>;

    /// Reports a failure that happened before anything was built
    fn concretization_report(&self, dir: &Path, msg: &str) -> Result<ReportOutcome>;
}

/// Reporter producing CTest-compatible XML for a CDash dashboard
pub struct CDashReporter {
    identity: BuildIdentity,
    uploader: Uploader,
    extractor: Box<dyn LogEventExtractor>,
    progress: Arc<dyn ProgressHandler>,
}

impl CDashReporter {
    /// Validates `config` and fixes the session identity at the current time
    pub fn new(config: &CDashConfig) -> Result<Self> {
        config.validate()?;
        let uploader = Uploader::new(config.upload_url.clone(), config.request_timeout)?;
        Ok(Self::with_parts(BuildIdentity::from_config(config), uploader))
    }

    pub fn with_parts(identity: BuildIdentity, uploader: Uploader) -> Self {
        Self {
            identity,
            uploader,
            extractor: Box::new(CTestLogParser::default()),
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_extractor(mut self, extractor: impl LogEventExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn identity(&self) -> &BuildIdentity {
        &self.identity
    }

    fn submit(&self, path: &Path) -> Result<Option<UploadOutcome>> {
        if !self.uploader.is_enabled() {
            self.progress.on_progress(&ProgressEvent::UploadSkipped {
                path: path.to_path_buf(),
            });
            return Ok(None);
        }

        let started = Instant::now();
        let outcome = self.uploader.upload(path, &self.identity)?;
        if let Some(result) = &outcome {
            self.progress.on_progress(&ProgressEvent::UploadComplete {
                path: path.to_path_buf(),
                build_id: result.build_id,
                summary_url: result.summary_url.clone(),
                duration: started.elapsed(),
            });
        }
        Ok(outcome)
    }

    fn write_and_submit(&self, dir: &Path, kind: &ReportKind<'_>) -> Result<ReportOutcome> {
        let started = Instant::now();
        let path = write_report(dir, &self.identity, kind)?;
        self.progress.on_progress(&ProgressEvent::ReportWritten {
            phase: kind.phase(),
            path: path.clone(),
            duration: started.elapsed(),
        });

        let upload = self.submit(&path)?;
        Ok(ReportOutcome {
            phase: kind.phase(),
            path,
            upload,
        })
    }
}

impl Reporter for CDashReporter {
    fn build_report(&self, dir: &Path, data: &ReportData) -> Result<Vec<ReportOutcome>> {
        fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
        info!(
            build = self.identity.buildname(),
            stamp = self.identity.buildstamp(),
            dir = %dir.display(),
            "Generating CDash reports"
        );

        let mut model = ReportModel::new(self.identity.starttime());
        segment_report(&mut model, data, self.progress.as_ref());
        model.finish_segmentation();

        let phases = model.phases_encountered().to_vec();
        debug!(phases = ?phases, "Phases to report");

        let mut outcomes = Vec::with_capacity(phases.len());
        for phase in phases {
            model.finalize(phase);

            let started = Instant::now();
            let events = self.extractor.extract(model.phase(phase).loglines());
            self.progress.on_progress(&ProgressEvent::ExtractionComplete {
                phase,
                errors: events.errors.len(),
                warnings: events.warnings.len(),
                duration: started.elapsed(),
            });
            model.apply_events(phase, events);

            let report = model.phase(phase);
            let kind = match phase {
                CoarsePhase::Configure => ReportKind::Configure(report),
                CoarsePhase::Build => ReportKind::Build(report),
                CoarsePhase::Update => ReportKind::Update { message: "" },
            };
            outcomes.push(self.write_and_submit(dir, &kind)?);
        }

        Ok(outcomes)
    }

    fn concretization_report(&self, dir: &Path, msg: &str) -> Result<ReportOutcome> {
        info!(dir = %dir.display(), "Generating CDash concretization report");
        self.write_and_submit(dir, &ReportKind::Update { message: msg })
    }
}
