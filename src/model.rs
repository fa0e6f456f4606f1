//! In-memory report model: one `PhaseReport` per coarse phase

use crate::extract::{ExtractedEvents, RawLogEvent};
use crate::phase::CoarsePhase;

/// Pass/fail state of a phase; only ever escalates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseStatus {
    #[default]
    Success,
    Failure,
}

impl PhaseStatus {
    /// Numeric code written into the report (0 success, 1 failure)
    pub fn code(self) -> u8 {
        match self {
            PhaseStatus::Success => 0,
            PhaseStatus::Failure => 1,
        }
    }
}

/// A classified error or warning, ready to be rendered
///
/// All text fields are already XML-escaped. `source_file` and `source_line_no` are
/// either both empty or both populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub line_no: usize,
    pub text: String,
    pub pre_context: String,
    pub post_context: String,
    pub source_file: String,
    pub source_line_no: String,
}

impl LogEvent {
    /// Flattens an extracted event; the text fields are copied without escaping
    pub fn from_raw(raw: RawLogEvent) -> Self {
        let (source_file, source_line_no) = match raw.source {
            Some(location) => (location.file, location.line.to_string()),
            None => (String::new(), String::new()),
        };

        Self {
            line_no: raw.line_no,
            text: raw.text,
            pre_context: raw.pre_context.join("\n"),
            post_context: raw.post_context.join("\n"),
            source_file,
            source_line_no,
        }
    }
}

/// Everything reported for one coarse phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    loglines: Vec<String>,
    log: String,
    status: PhaseStatus,
    starttime: i64,
    endtime: i64,
    errors: Vec<LogEvent>,
    warnings: Vec<LogEvent>,
}

impl PhaseReport {
    fn new(starttime: i64) -> Self {
        Self {
            loglines: Vec::new(),
            log: String::new(),
            status: PhaseStatus::Success,
            starttime,
            // Pinned to the session start; per-phase durations are not tracked.
            endtime: starttime,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn loglines(&self) -> &[String] {
        &self.loglines
    }

    /// Escaped log lines joined with newlines; empty until the phase is finalized
    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn status(&self) -> PhaseStatus {
        self.status
    }

    pub fn starttime(&self) -> i64 {
        self.starttime
    }

    pub fn endtime(&self) -> i64 {
        self.endtime
    }

    pub fn errors(&self) -> &[LogEvent] {
        &self.errors
    }

    pub fn warnings(&self) -> &[LogEvent] {
        &self.warnings
    }

    pub(crate) fn push_line(&mut self, line: String) {
        self.loglines.push(line);
    }

    fn fail(&mut self) {
        self.status = PhaseStatus::Failure;
    }
}

/// Aggregate owned by one reporting session
#[derive(Debug, Clone, PartialEq)]
pub struct ReportModel {
    configure: PhaseReport,
    build: PhaseReport,
    update: PhaseReport,
    phases_encountered: Vec<CoarsePhase>,
}

impl ReportModel {
    pub fn new(starttime: i64) -> Self {
        Self {
            configure: PhaseReport::new(starttime),
            build: PhaseReport::new(starttime),
            update: PhaseReport::new(starttime),
            phases_encountered: Vec::new(),
        }
    }

    pub fn phase(&self, phase: CoarsePhase) -> &PhaseReport {
        match phase {
            CoarsePhase::Configure => &self.configure,
            CoarsePhase::Build => &self.build,
            CoarsePhase::Update => &self.update,
        }
    }

    pub(crate) fn phase_mut(&mut self, phase: CoarsePhase) -> &mut PhaseReport {
        match phase {
            CoarsePhase::Configure => &mut self.configure,
            CoarsePhase::Build => &mut self.build,
            CoarsePhase::Update => &mut self.update,
        }
    }

    /// Phases to report, in first-seen order
    pub fn phases_encountered(&self) -> &[CoarsePhase] {
        &self.phases_encountered
    }

    pub(crate) fn mark_encountered(&mut self, phase: CoarsePhase) {
        if !self.phases_encountered.contains(&phase) {
            self.phases_encountered.push(phase);
        }
    }

    /// Closes segmentation: `update` is always reported, exactly once, last
    pub fn finish_segmentation(&mut self) {
        self.mark_encountered(CoarsePhase::Update);
    }

    /// Joins the collected lines into the phase's `log` field
    pub fn finalize(&mut self, phase: CoarsePhase) {
        let report = self.phase_mut(phase);
        report.log = report.loglines.join("\n");
    }

    /// Folds extractor output into the phase
    ///
    /// Configure fails on any error. Build keeps the classified events for rendering;
    /// its status does not react to them.
    pub fn apply_events(&mut self, phase: CoarsePhase, events: ExtractedEvents) {
        let report = self.phase_mut(phase);
        match phase {
            CoarsePhase::Configure => {
                if !events.errors.is_empty() {
                    report.fail();
                }
            }
            CoarsePhase::Build => {
                report.errors = events.errors.into_iter().map(LogEvent::from_raw).collect();
                report.warnings = events
                    .warnings
                    .into_iter()
                    .map(LogEvent::from_raw)
                    .collect();
            }
            CoarsePhase::Update => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SourceLocation;

    fn raw(text: &str, source: Option<SourceLocation>) -> RawLogEvent {
        RawLogEvent {
            line_no: 3,
            text: text.to_string(),
            pre_context: vec!["a".to_string(), "b &amp; c".to_string()],
            post_context: vec!["d".to_string()],
            source,
        }
    }

    #[test]
    fn test_new_model_pins_times() {
        let model = ReportModel::new(1234);
        for phase in CoarsePhase::ALL {
            let report = model.phase(phase);
            assert_eq!(report.starttime(), 1234);
            assert_eq!(report.endtime(), 1234);
            assert_eq!(report.status(), PhaseStatus::Success);
            assert!(report.loglines().is_empty());
        }
        assert!(model.phases_encountered().is_empty());
    }

    #[test]
    fn test_mark_encountered_suppresses_duplicates() {
        let mut model = ReportModel::new(0);
        model.mark_encountered(CoarsePhase::Build);
        model.mark_encountered(CoarsePhase::Configure);
        model.mark_encountered(CoarsePhase::Build);
        assert_eq!(
            model.phases_encountered(),
            &[CoarsePhase::Build, CoarsePhase::Configure]
        );
    }

    #[test]
    fn test_update_appended_exactly_once() {
        let mut model = ReportModel::new(0);
        model.mark_encountered(CoarsePhase::Configure);
        model.finish_segmentation();
        model.finish_segmentation();
        assert_eq!(
            model.phases_encountered(),
            &[CoarsePhase::Configure, CoarsePhase::Update]
        );
    }

    #[test]
    fn test_finalize_joins_lines() {
        let mut model = ReportModel::new(0);
        model.phase_mut(CoarsePhase::Build).push_line("one".to_string());
        model.phase_mut(CoarsePhase::Build).push_line("two".to_string());
        assert_eq!(model.phase(CoarsePhase::Build).log(), "");
        model.finalize(CoarsePhase::Build);
        assert_eq!(model.phase(CoarsePhase::Build).log(), "one\ntwo");
        model.finalize(CoarsePhase::Update);
        assert_eq!(model.phase(CoarsePhase::Update).log(), "");
    }

    #[test]
    fn test_configure_status_tracks_error_count() {
        let mut model = ReportModel::new(0);
        model.apply_events(
            CoarsePhase::Configure,
            ExtractedEvents {
                errors: vec![],
                warnings: vec![raw("warning: meh", None), raw("warning: again", None)],
            },
        );
        assert_eq!(model.phase(CoarsePhase::Configure).status().code(), 0);

        model.apply_events(
            CoarsePhase::Configure,
            ExtractedEvents {
                errors: vec![raw("configure: error: no cc", None)],
                warnings: vec![],
            },
        );
        assert_eq!(model.phase(CoarsePhase::Configure).status().code(), 1);

        // Never reset back to success.
        model.apply_events(CoarsePhase::Configure, ExtractedEvents::default());
        assert_eq!(
            model.phase(CoarsePhase::Configure).status(),
            PhaseStatus::Failure
        );
    }

    #[test]
    fn test_build_keeps_events_without_failing() {
        let mut model = ReportModel::new(0);
        model.apply_events(
            CoarsePhase::Build,
            ExtractedEvents {
                errors: vec![raw(
                    "foo.c:12: error: boom",
                    Some(SourceLocation {
                        file: "foo.c".to_string(),
                        line: 12,
                    }),
                )],
                warnings: vec![raw("warning: unused", None)],
            },
        );

        let build = model.phase(CoarsePhase::Build);
        assert_eq!(build.status(), PhaseStatus::Success);
        assert_eq!(build.errors().len(), 1);
        assert_eq!(build.warnings().len(), 1);

        let error = &build.errors()[0];
        assert_eq!(error.source_file, "foo.c");
        assert_eq!(error.source_line_no, "12");
        assert_eq!(error.pre_context, "a\nb &amp; c");
        assert_eq!(error.post_context, "d");

        let warning = &build.warnings()[0];
        assert_eq!(warning.source_file, "");
        assert_eq!(warning.source_line_no, "");
    }

    #[test]
    fn test_configure_does_not_retain_events() {
        let mut model = ReportModel::new(0);
        model.apply_events(
            CoarsePhase::Configure,
            ExtractedEvents {
                errors: vec![raw("error: x", None)],
                warnings: vec![],
            },
        );
        assert!(model.phase(CoarsePhase::Configure).errors().is_empty());
    }
}
