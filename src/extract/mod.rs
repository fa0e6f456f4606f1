//! Error and warning extraction from phase logs
//!
//! The pipeline only depends on [`LogEventExtractor`]. [`CTestLogParser`] is the
//! default classifier, built on the same match tables CTest uses for build logs.

mod ctest;

pub use ctest::{CTestLogParser, DEFAULT_CONTEXT_LINES};

/// Where in the sources an event points, when the log line names a file and line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

/// An event as produced by an extractor, before flattening for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogEvent {
    /// 1-based index of the matched line within the phase log
    pub line_no: usize,
    pub text: String,
    pub pre_context: Vec<String>,
    pub post_context: Vec<String>,
    pub source: Option<SourceLocation>,
}

/// Errors and warnings in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedEvents {
    pub errors: Vec<RawLogEvent>,
    pub warnings: Vec<RawLogEvent>,
}

/// Classifies the lines of one phase log into errors and warnings
pub trait LogEventExtractor {
    fn extract(&self, lines: &[String]) -> ExtractedEvents;
}

impl<F> LogEventExtractor for F
where
    F: Fn(&[String]) -> ExtractedEvents,
{
    fn extract(&self, lines: &[String]) -> ExtractedEvents {
        self(lines)
    }
}
