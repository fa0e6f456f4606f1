//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::SegmentationStarted { unit } => {
                debug!(unit = %unit, "Parsing build output");
            }
            ProgressEvent::SegmentationComplete {
                unit,
                lines,
                kept,
                duration,
            } => {
                debug!(
                    unit = %unit,
                    lines,
                    kept,
                    duration_ms = duration.as_millis(),
                    "Finished parsing build output"
                );
            }
            ProgressEvent::ExtractionComplete {
                phase,
                errors,
                warnings,
                duration,
            } => {
                if *errors > 0 {
                    warn!(
                        phase = %phase,
                        errors,
                        warnings,
                        duration_ms = duration.as_millis(),
                        "Phase log contains errors"
                    );
                } else {
                    debug!(
                        phase = %phase,
                        warnings,
                        duration_ms = duration.as_millis(),
                        "Phase log classified"
                    );
                }
            }
            ProgressEvent::ReportWritten {
                phase,
                path,
                duration,
            } => {
                info!(
                    phase = %phase,
                    path = %path.display(),
                    duration_ms = duration.as_millis(),
                    "Wrote CDash report"
                );
            }
            ProgressEvent::UploadSkipped { path } => {
                debug!(path = %path.display(), "No upload URL configured, keeping report local");
            }
            ProgressEvent::UploadComplete {
                path,
                build_id,
                summary_url,
                duration,
            } => {
                info!(
                    path = %path.display(),
                    build_id = ?build_id,
                    summary = summary_url.as_deref().unwrap_or("-"),
                    duration_ms = duration.as_millis(),
                    "Uploaded CDash report"
                );
            }
        }
    }
}
