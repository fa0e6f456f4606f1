//! CTest-style build log classifier

use super::{ExtractedEvents, LogEventExtractor, RawLogEvent, SourceLocation};
use regex::{Regex, RegexSet};
use std::sync::OnceLock;

/// Lines of context captured on each side of an event
pub const DEFAULT_CONTEXT_LINES: usize = 6;

const ERROR_MATCHES: &[&str] = &[
    r"^FAIL: ",
    r"^FATAL: ",
    r"^failed ",
    r"FAILED",
    r"Failed test",
    r"^[Bb]us [Ee]rror",
    r"^[Ss]egmentation [Vv]iolation",
    r"^[Ss]egmentation [Ff]ault",
    r":.*[Pp]ermission [Dd]enied",
    r"[^ :]:[0-9]+: [^ \t]",
    r"[^:]: error[ \t]*[0-9]+[ \t]*:",
    r"^Error ([0-9]+):",
    r"^Fatal",
    r"^[Ee]rror: ",
    r"^Error ",
    r"[0-9] ERROR: ",
    r#"^"[^"]+", line [0-9]+: [^Ww]"#,
    r"^cc[^C]*CC: ERROR File = ([^,]+), Line = ([0-9]+)",
    r"^ld([^:])*:([ \t])*ERROR([^:])*:",
    r"^ild:([ \t])*\(undefined symbol\)",
    r"[^ :] : (error|fatal error|catastrophic error)",
    r"[^:]: (Error:|error|undefined reference|multiply defined)",
    r"[^:]\([^\)]+\) ?: (error|fatal error|catastrophic error)",
    r"^fatal error C[0-9]+:",
    r": syntax error ",
    r"^collect2: ld returned 1 exit status",
    r"ld terminated with signal",
    r"Unsatisfied symbol",
    r"^Unresolved:",
    r"Undefined symbol",
    r"^Undefined[ \t]+first referenced",
    r"^CMake Error",
    r":[ \t]cannot find",
    r":[ \t]can't find",
    r": \*\*\* No rule to make target [`'].*'.  Stop",
    r": \*\*\* No targets specified and no makefile found",
    r": Invalid loader fixup for symbol",
    r": Invalid fixups exist",
    r": Can't find library for",
    r": internal link edit command failed",
    r": Unrecognized option [`'].*'",
    r#"", line [0-9]+\.[0-9]+: [0-9]+-[0-9]+ \([^WI]\)"#,
    r"ld: 0706-006 Cannot find or open library file: -l ",
    r"ild: \(argument error\) can't find library argument ::",
    r"^could not be found and will not be loaded.",
    r"s:616 string too big",
    r"make: Fatal error: ",
    r"ld: 0711-993 Error occurred while writing to the output file:",
    r"ld: fatal: ",
    r"final link failed:",
    r"make: \*\*\*.*Error",
    r"make\[.*\]: \*\*\*.*Error",
    r"\*\*\* Error code",
    r"nternal error:",
    r"Makefile:[0-9]+: \*\*\* .*  Stop\.",
    r": No such file or directory",
    r": Invalid argument",
    r"^The project cannot be built\.",
    r"^\[ERROR\]",
    r"^Command .* failed with exit code",
];

const ERROR_EXCEPTIONS: &[&str] = &[
    r"instantiated from ",
    r"candidates are:",
    r": warning",
    r": WARNING",
    r": \(Warning\)",
    r": note",
    r"    ld:",
    r"Note:",
    r"makefile:",
    r"Makefile:",
    r":[ \t]+Where:",
    r"[^ :]:[0-9]+: Warning",
    r"------ Build started: .* ------",
];

const WARNING_MATCHES: &[&str] = &[
    r"[^ :]:[0-9]+: warning:",
    r"[^ :]:[0-9]+: note:",
    r"^cc[^C]*CC: WARNING File = ([^,]+), Line = ([0-9]+)",
    r"^ld([^:])*:([ \t])*WARNING([^:])*:",
    r"[^:]: warning [0-9]+:",
    r#"^"[^"]+", line [0-9]+: [Ww](arning|arnung)"#,
    r"[^:]: warning[ \t]*[0-9]+[ \t]*:",
    r"^(Warning|Warnung) ([0-9]+):",
    r"^(Warning|Warnung)[ :]",
    r"WARNING: ",
    r"[^ :] : warning",
    r"[^:]: warning",
    r#"", line [0-9]+\.[0-9]+: [0-9]+-[0-9]+ \([WI]\)"#,
    r"^cxx: Warning:",
    r"file: .* has no symbols",
    r"[^ :]:[0-9]+: (Warning|Warnung)",
    r"\([0-9]*\): remark #[0-9]*",
    r#"".*", line [0-9]+: remark\([0-9]*\):"#,
    r"cc-[0-9]* CC: REMARK File = .*, Line = [0-9]*",
    r"^CMake Warning",
    r"^\[WARNING\]",
];

const WARNING_EXCEPTIONS: &[&str] = &[
    r"/usr/.*/X11/Xlib\.h:[0-9]+: war.*: ANSI C\+\+ forbids declaration",
    r"/usr/.*/X11/Xutil\.h:[0-9]+: war.*: ANSI C\+\+ forbids declaration",
    r"/usr/.*/X11/XResource\.h:[0-9]+: war.*: ANSI C\+\+ forbids declaration",
    r"WARNING 84 :",
    r"WARNING 47 :",
    r"warning:  Clock skew detected.  Your build may be incomplete.",
    r"/usr/openwin/include/GL/[^:]+:",
    r"bind_at_load",
    r"XrmQGetResource",
    r"IceFlush",
    r"warning LNK4089: all references to [^ \t]+ dropped by /OPT:REF",
    r"ld32: WARNING 85: .* discarded",
    r"ld: warning: directory name .* does not exist",
    r"ld: warning .*/libstdc\+\+.*",
    r"ld: warning .*/libstdc\+\+.* is not a valid object file",
    r"ld: warning: suggest use of -bnodelcsect",
    r"aix/xlc",
];

const FILE_LINE_MATCHES: &[&str] = &[
    r"^Warning W[0-9]+ ([a-zA-Z.:/0-9_+ ~-]+) ([0-9]+):",
    r"^([a-zA-Z./0-9_+ ~-]+):([0-9]+):",
    r"^([a-zA-Z.:/0-9_+ ~-]+)\(([0-9]+)\)",
    // MSVC `N>file(line)`; lines reach the classifier XML-escaped
    r"^[0-9]+&gt;([a-zA-Z.:/0-9_+ ~-]+)\(([0-9]+)\)",
    r"^([a-zA-Z./0-9_+ ~-]+)\(([0-9]+)\)",
    r#""([a-zA-Z./0-9_+ ~-]+)", line ([0-9]+)"#,
    r"File = ([a-zA-Z./0-9_+ ~-]+), Line = ([0-9]+)",
];

struct Tables {
    error_matches: RegexSet,
    error_exceptions: RegexSet,
    warning_matches: RegexSet,
    warning_exceptions: RegexSet,
    file_line: Vec<Regex>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables {
        error_matches: RegexSet::new(ERROR_MATCHES).expect("Invalid error match table"),
        error_exceptions: RegexSet::new(ERROR_EXCEPTIONS)
            .expect("Invalid error exception table"),
        warning_matches: RegexSet::new(WARNING_MATCHES).expect("Invalid warning match table"),
        warning_exceptions: RegexSet::new(WARNING_EXCEPTIONS)
            .expect("Invalid warning exception table"),
        file_line: FILE_LINE_MATCHES
            .iter()
            .map(|p| Regex::new(p).expect("Invalid file/line pattern"))
            .collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

/// Regex classifier modelled on CTest's build-log scraping
#[derive(Debug, Clone, Copy)]
pub struct CTestLogParser {
    context: usize,
}

impl Default for CTestLogParser {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl CTestLogParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    fn classify(line: &str) -> Option<Severity> {
        let t = tables();
        if t.error_matches.is_match(line) && !t.error_exceptions.is_match(line) {
            Some(Severity::Error)
        } else if t.warning_matches.is_match(line) && !t.warning_exceptions.is_match(line) {
            Some(Severity::Warning)
        } else {
            None
        }
    }

    fn source_location(line: &str) -> Option<SourceLocation> {
        tables().file_line.iter().find_map(|re| {
            let caps = re.captures(line)?;
            let file = caps.get(1)?.as_str().trim().to_string();
            let line = caps.get(2)?.as_str().parse().ok()?;
            Some(SourceLocation { file, line })
        })
    }
}

impl LogEventExtractor for CTestLogParser {
    fn extract(&self, lines: &[String]) -> ExtractedEvents {
        let mut events = ExtractedEvents::default();

        for (i, line) in lines.iter().enumerate() {
            let Some(severity) = Self::classify(line) else {
                continue;
            };

            let pre_start = i.saturating_sub(self.context);
            let post_end = (i + 1 + self.context).min(lines.len());
            let event = RawLogEvent {
                line_no: i + 1,
                text: line.clone(),
                pre_context: lines[pre_start..i].to_vec(),
                post_context: lines[i + 1..post_end].to_vec(),
                source: Self::source_location(line),
            };

            match severity {
                Severity::Error => events.errors.push(event),
                Severity::Warning => events.warnings.push(event),
            }
        }

        events
    }
}
