use thiserror::Error;

use crate::format::FormatError;

/// Errors which abort the parse of a file.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GerberError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Coordinate operation before format specification (FS). line: {line}")]
    MissingFormat { line: usize },
    #[error("Coordinate operation before unit declaration (MO). line: {line}")]
    MissingUnits { line: usize },
    #[error("Invalid declaration. line: {line}, cause: {cause}")]
    InvalidDeclaration { line: usize, cause: FormatError },
    #[error("Unresolved aperture in strict mode. line: {line}, code: {code}")]
    UnresolvedAperture { line: usize, code: i32 },
    #[error("No aperture selected in strict mode. line: {line}")]
    MissingAperture { line: usize },
}

/// A fatal error in one file of a [`crate::LayerSet`].
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Failed to parse layer '{name}': {source}")]
pub struct LayerError {
    pub name: String,
    #[source]
    pub source: GerberError,
}
