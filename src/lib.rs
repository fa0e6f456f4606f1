//! cdash-reporter - CTest-compatible build reports for CDash dashboards
//!
//! Takes the captured output of a package installation, splits it by install phase,
//! classifies errors and warnings, renders `Configure.xml`, `Build.xml` and
//! `Update.xml`, and optionally PUTs each file to a CDash `submit.php` endpoint.
//!
//! # Example Usage
//!
//! ```no_run
//! use cdash_reporter::{CDashConfig, CDashReporter, PackageRecord, ReportData, Reporter};
//! use std::path::Path;
//!
//! # fn main() -> cdash_reporter::Result<()> {
//! let config = CDashConfig::from_env()?.with_install_command("zlib");
//! let reporter = CDashReporter::new(&config)?;
//!
//! let log = "==> Executing phase: 'configure'\nchecking for gcc... gcc\n";
//! let data = ReportData::single("zlib", vec![PackageRecord::new("zlib").with_stdout(log)]);
//!
//! for outcome in reporter.build_report(Path::new("cdash_report"), &data)? {
//!     println!("{} -> {}", outcome.phase, outcome.path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`phase`]: install phase to reported phase mapping
//! - [`segment`]: splitting build output at phase markers
//! - [`extract`]: error and warning classification
//! - [`model`]: per-phase report state
//! - [`render`]: XML documents
//! - [`upload`]: submission to the dashboard
//! - [`reporter`]: the session tying it all together

pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod input;
pub mod model;
pub mod phase;
pub mod progress;
pub mod render;
pub mod reporter;
pub mod segment;
pub mod upload;
pub mod util;

pub use config::{CDashConfig, ConfigError};
pub use error::{ReportError, Result};
pub use extract::{CTestLogParser, ExtractedEvents, LogEventExtractor, RawLogEvent};
pub use identity::BuildIdentity;
pub use input::{PackageRecord, PackageResult, ReportData, SpecRecord, SpecSummary};
pub use model::{LogEvent, PhaseReport, PhaseStatus, ReportModel};
pub use phase::{map_phase, CoarsePhase};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use reporter::{CDashReporter, ReportOutcome, Reporter};
pub use upload::{UploadOutcome, Uploader};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
