//! Recoverable problems found while interpreting a file, the options controlling how they are handled, and the
//! end-of-file summary.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::aperture::ApertureError;
use crate::arc::ArcError;
use crate::command::ContentError;
use crate::format::Units;
use crate::tokenizer::TokenizeError;

/// Default arc radius tolerance, in coordinate steps (units of the last declared decimal place).
///
/// Exporters round both end points to the coordinate grid, so the radii may differ by up to one step per axis.
pub const DEFAULT_ARC_TOLERANCE_STEPS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseOptions {
    /// Treat unresolved aperture references as fatal.
    pub strict: bool,
    /// Retain every diagnostic and log it at `warn` level.
    pub verbose: bool,
    /// Maximum difference between an arc's start and end radius, in coordinate steps.
    pub arc_tolerance: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            verbose: false,
            arc_tolerance: DEFAULT_ARC_TOLERANCE_STEPS,
        }
    }
}

impl ParseOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_arc_tolerance(mut self, arc_tolerance: f64) -> Self {
        self.arc_tolerance = arc_tolerance;
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DiagnosticKind {
    #[error(transparent)]
    Unterminated(#[from] TokenizeError),
    #[error(transparent)]
    Malformed(#[from] ContentError),
    #[error("Unrecognized command")]
    Unrecognized,
    #[error("Unsupported command")]
    Unsupported,
    #[error(transparent)]
    Aperture(#[from] ApertureError),
    #[error("Unresolved aperture. code: {0}")]
    UnresolvedAperture(i32),
    #[error("No aperture selected")]
    MissingAperture,
    #[error("{0}, drawn as a segment")]
    Arc(#[from] ArcError),
    #[error("Flash inside a region, ignored")]
    FlashInRegion,
    #[error("Unit change after drawing started, ignored. current: {current:?}, requested: {requested:?}")]
    UnitChangeIgnored { current: Units, requested: Units },
}

impl DiagnosticKind {
    /// Unrecognized and unsupported commands are reported separately from the other problems in the summary.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, DiagnosticKind::Unrecognized | DiagnosticKind::Unsupported)
    }

    /// False when the command still had an effect, e.g. an arc which was drawn as a segment.
    pub fn skips_command(&self) -> bool {
        !matches!(self, DiagnosticKind::Arc(_)) && !self.is_unrecognized()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based source line of the command.
    pub line: usize,
    /// Raw command text.
    pub command: String,
    pub kind: DiagnosticKind,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}, command: {:?}", self.line, self.kind, self.command)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseSummary {
    /// Commands read from the source, including the ones which were skipped.
    pub commands: usize,
    /// Unknown and unsupported commands.
    pub unrecognized: usize,
    /// Commands skipped for any other reason, e.g. malformed blocks or missing apertures.
    pub skipped: usize,
}

impl ParseSummary {
    pub fn all_recognized(&self) -> bool {
        self.unrecognized == 0
    }
}

impl Display for ParseSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.unrecognized {
            0 => write!(f, "all {} commands recognized", self.commands)?,
            unrecognized => write!(f, "{} commands, {} unrecognized", self.commands, unrecognized)?,
        }
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}
