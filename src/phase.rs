//! Mapping from fine-grained install phases to CDash report phases

use std::fmt;

/// Report-facing phase that several install steps collapse into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoarsePhase {
    Configure,
    Build,
    Update,
}

impl CoarsePhase {
    pub const ALL: [CoarsePhase; 3] = [
        CoarsePhase::Configure,
        CoarsePhase::Build,
        CoarsePhase::Update,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CoarsePhase::Configure => "configure",
            CoarsePhase::Build => "build",
            CoarsePhase::Update => "update",
        }
    }

    /// File name of this phase's report inside the report directory
    pub fn report_file_name(self) -> &'static str {
        match self {
            CoarsePhase::Configure => "Configure.xml",
            CoarsePhase::Build => "Build.xml",
            CoarsePhase::Update => "Update.xml",
        }
    }
}

impl fmt::Display for CoarsePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the coarse phase for an install step, or `None` if it is not reported
pub fn map_phase(fine_grained: &str) -> Option<CoarsePhase> {
    match fine_grained {
        "autoreconf" | "cmake" | "configure" | "edit" => Some(CoarsePhase::Configure),
        "build" | "install" => Some(CoarsePhase::Build),
        _ => None,
    }
}
