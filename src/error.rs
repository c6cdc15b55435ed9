//! Crate-level error types.

use std::fmt;

use crate::report::ReportError;

/// Errors produced by the resqual crate outside the report pipeline.
#[derive(Debug)]
pub enum ResqualError {
    /// Fetching or building a quality report failed.
    Report(ReportError),
    /// Failed to load a molecular structure file.
    StructureLoad(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for ResqualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report(e) => write!(f, "quality report error: {e}"),
            Self::StructureLoad(msg) => {
                write!(f, "structure load error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResqualError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Report(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReportError> for ResqualError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

impl From<std::io::Error> for ResqualError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
