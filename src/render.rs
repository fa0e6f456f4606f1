//! XML rendering of CDash reports
//!
//! Each report kind has its own render function; Configure and Build documents share
//! the site header. Log text and event fields arrive already escaped and are written
//! verbatim. Identity fields are escaped here, once.

use crate::error::{ReportError, Result};
use crate::identity::BuildIdentity;
use crate::model::{LogEvent, PhaseReport};
use crate::phase::CoarsePhase;
use quick_xml::escape::{escape, partial_escape};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

/// Escapes `&`, `<` and `>` for element content
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    partial_escape(raw)
}

/// Escapes element content plus quotes, for attribute values
pub fn escape_attr(raw: &str) -> Cow<'_, str> {
    escape(raw)
}

/// The closed set of documents this crate produces
#[derive(Debug, Clone, Copy)]
pub enum ReportKind<'a> {
    Configure(&'a PhaseReport),
    Build(&'a PhaseReport),
    /// Concretization report, or the update pass of a build report
    Update { message: &'a str },
}

impl<'a> ReportKind<'a> {
    pub fn phase(&self) -> CoarsePhase {
        match self {
            ReportKind::Configure(_) => CoarsePhase::Configure,
            ReportKind::Build(_) => CoarsePhase::Build,
            ReportKind::Update { .. } => CoarsePhase::Update,
        }
    }

    pub fn file_name(&self) -> &'static str {
        self.phase().report_file_name()
    }
}

/// Renders a complete XML document
pub fn render(identity: &BuildIdentity, kind: &ReportKind<'_>) -> String {
    match kind {
        ReportKind::Configure(report) => {
            let mut out = render_site(identity);
            out.push_str(&render_configure(identity, report));
            out
        }
        ReportKind::Build(report) => {
            let mut out = render_site(identity);
            out.push_str(&render_build(identity, report));
            out
        }
        ReportKind::Update { message } => render_update(identity, message),
    }
}

/// Renders `kind` and writes it to `<dir>/<Phase>.xml`
///
/// The document is written to a temporary file next to the target and renamed into
/// place, so a failure never leaves a truncated report behind.
pub fn write_report(dir: &Path, identity: &BuildIdentity, kind: &ReportKind<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;

    let path = dir.join(kind.file_name());
    let xml = render(identity, kind);

    let mut tmp = temp_report(dir).map_err(|e| ReportError::io(dir, e))?;
    tmp.write_all(xml.as_bytes())
        .map_err(|e| ReportError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ReportError::io(tmp.path(), e))?;
    tmp.persist(&path)
        .map_err(|e| ReportError::io(&path, e.error))?;

    debug!(path = %path.display(), bytes = xml.len(), "Wrote report");
    Ok(path)
}

/// Temporary file next to the final report, created with the mode a plain
/// `File::create` would get (0666 minus the umask) instead of owner-only
fn temp_report(dir: &Path) -> io::Result<NamedTempFile> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn render_site(identity: &BuildIdentity) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Site BuildName=\"{}\"\n      \
         BuildStamp=\"{}\"\n      \
         Name=\"{}\"\n      \
         OSName=\"{}\"\n      \
         Generator=\"{}\"\n      \
         >\n",
        escape_attr(identity.buildname()),
        escape_attr(identity.buildstamp()),
        escape_attr(identity.site()),
        escape_attr(identity.osname()),
        GENERATOR,
    )
}

fn render_configure(identity: &BuildIdentity, report: &PhaseReport) -> String {
    format!(
        "  <Configure>\n    \
         <StartConfigureTime>{}</StartConfigureTime>\n    \
         <ConfigureCommand>{}</ConfigureCommand>\n    \
         <Log>{}</Log>\n    \
         <ConfigureStatus>{}</ConfigureStatus>\n    \
         <EndConfigureTime>{}</EndConfigureTime>\n  \
         </Configure>\n\
         </Site>\n",
        report.starttime(),
        escape_text(identity.install_command()),
        report.log(),
        report.status().code(),
        report.endtime(),
    )
}

fn render_build(identity: &BuildIdentity, report: &PhaseReport) -> String {
    let mut out = format!(
        "  <Build>\n    \
         <StartBuildTime>{}</StartBuildTime>\n    \
         <BuildCommand>{}</BuildCommand>\n",
        report.starttime(),
        escape_text(identity.install_command()),
    );

    for warning in report.warnings() {
        out.push_str(&render_event("Warning", warning));
    }
    for error in report.errors() {
        out.push_str(&render_event("Error", error));
    }

    out.push_str(&format!(
        "    <EndBuildTime>{}</EndBuildTime>\n    \
         <ElapsedMinutes>0</ElapsedMinutes>\n  \
         </Build>\n\
         </Site>\n",
        report.endtime(),
    ));
    out
}

fn render_event(tag: &str, event: &LogEvent) -> String {
    let mut out = format!(
        "    <{tag}>\n      \
         <BuildLogLine>{}</BuildLogLine>\n      \
         <Text>{}</Text>\n",
        event.line_no, event.text,
    );
    if !event.source_file.is_empty() {
        out.push_str(&format!(
            "      <SourceFile>{}</SourceFile>\n      \
             <SourceLineNumber>{}</SourceLineNumber>\n",
            event.source_file, event.source_line_no,
        ));
    }
    out.push_str(&format!(
        "      <PreContext>{}</PreContext>\n      \
         <PostContext>{}</PostContext>\n      \
         <RepeatCount>0</RepeatCount>\n    \
         </{tag}>\n",
        event.pre_context, event.post_context,
    ));
    out
}

fn render_update(identity: &BuildIdentity, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Update mode=\"Client\" Generator=\"{}\">\n  \
         <Site>{}</Site>\n  \
         <BuildName>{}</BuildName>\n  \
         <BuildStamp>{}</BuildStamp>\n  \
         <StartTime>{}</StartTime>\n  \
         <UpdateCommand>{}</UpdateCommand>\n  \
         <UpdateType>None</UpdateType>\n  \
         <EndTime>{}</EndTime>\n  \
         <ElapsedMinutes>0</ElapsedMinutes>\n  \
         <UpdateReturnStatus>{}</UpdateReturnStatus>\n\
         </Update>\n",
        GENERATOR,
        escape_text(identity.site()),
        escape_text(identity.buildname()),
        escape_text(identity.buildstamp()),
        identity.starttime(),
        escape_text(identity.install_command()),
        identity.starttime(),
        escape_text(message),
    )
}
