//! Progress handler trait and events

use crate::phase::CoarsePhase;
use std::path::PathBuf;
use std::time::Duration;

/// Checkpoints of a reporting session
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Started scanning one unit's captured output
    SegmentationStarted { unit: String },

    /// Finished scanning one unit's captured output
    SegmentationComplete {
        unit: String,
        lines: usize,
        kept: usize,
        duration: Duration,
    },

    /// Errors and warnings were extracted from a phase log
    ExtractionComplete {
        phase: CoarsePhase,
        errors: usize,
        warnings: usize,
        duration: Duration,
    },

    /// A phase report was written to disk
    ReportWritten {
        phase: CoarsePhase,
        path: PathBuf,
        duration: Duration,
    },

    /// No upload URL is configured
    UploadSkipped { path: PathBuf },

    /// The dashboard accepted a report
    UploadComplete {
        path: PathBuf,
        build_id: Option<u64>,
        summary_url: Option<String>,
        duration: Duration,
    },
}

/// Trait for observing a reporting session
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::SegmentationStarted {
            unit: "zlib".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::SegmentationStarted {
            unit: "zlib".to_string(),
        });
        handler.on_progress(&ProgressEvent::SegmentationComplete {
            unit: "zlib".to_string(),
            lines: 120,
            kept: 100,
            duration: Duration::from_millis(3),
        });
        handler.on_progress(&ProgressEvent::UploadSkipped {
            path: PathBuf::from("cdash_report/Build.xml"),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::ExtractionComplete {
            phase: CoarsePhase::Build,
            errors: 2,
            warnings: 5,
            duration: Duration::from_millis(1),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("ExtractionComplete"));
        assert!(debug_str.contains("errors: 2"));
    }
}
