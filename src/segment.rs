//! Splits captured build output into per-phase logs

use crate::input::{PackageRecord, ReportData};
use crate::model::ReportModel;
use crate::phase::{map_phase, CoarsePhase};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::render::escape_text;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::trace;

/// Literal prefix of every phase boundary line
pub const PHASE_MARKER: &str = "Executing phase: '";

fn phase_regex() -> &'static Regex {
    static PHASE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHASE_REGEX.get_or_init(|| Regex::new(r"Executing phase: '([^']*)'").expect("Invalid phase regex"))
}

/// Returns the install phase named by a boundary line, if the line is one
///
/// The substring check runs first; the regex only sees the rare lines that pass it.
pub fn phase_marker(line: &str) -> Option<&str> {
    if !line.contains(PHASE_MARKER) {
        return None;
    }
    phase_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Splits captured output on `\n`, `\r\n` and a bare `\r`
///
/// A trailing terminator does not produce an empty last line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split_terminator('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

/// Line counts for one segmented unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentStats {
    pub lines: usize,
    pub kept: usize,
    pub markers: usize,
}

/// Appends one unit's output to the model's phase buffers
///
/// Returns `None` when the unit has no captured output.
pub fn segment_package(model: &mut ReportModel, package: &PackageRecord) -> Option<SegmentStats> {
    let stdout = package.stdout.as_deref()?;
    let mut stats = SegmentStats::default();
    let mut current: Option<CoarsePhase> = None;

    for line in split_lines(stdout) {
        stats.lines += 1;

        if let Some(fine) = phase_marker(line) {
            stats.markers += 1;
            current = map_phase(fine);
            match current {
                Some(phase) => {
                    model.mark_encountered(phase);
                    model.phase_mut(phase).push_line(format!(
                        "{} output for {}:",
                        phase,
                        escape_text(&package.name)
                    ));
                }
                None => trace!(unit = %package.name, phase = fine, "Skipping unreported phase"),
            }
            continue;
        }

        if let Some(phase) = current {
            model.phase_mut(phase).push_line(escape_text(line).into_owned());
            stats.kept += 1;
        }
    }

    Some(stats)
}

/// Segments every unit of every spec, in input order
///
/// Units are processed one at a time; the phase cursor never carries over from one
/// unit to the next.
pub fn segment_report(model: &mut ReportModel, data: &ReportData, progress: &dyn ProgressHandler) {
    for package in data.packages() {
        if package.stdout.is_none() {
            trace!(unit = %package.name, "No captured output");
            continue;
        }

        progress.on_progress(&ProgressEvent::SegmentationStarted {
            unit: package.name.clone(),
        });
        let started = Instant::now();

        if let Some(stats) = segment_package(model, package) {
            progress.on_progress(&ProgressEvent::SegmentationComplete {
                unit: package.name.clone(),
                lines: stats.lines,
                kept: stats.kept,
                duration: started.elapsed(),
            });
        }
    }
}
