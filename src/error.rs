//! Error types for the fmaptool front end

use std::io;
use std::path::PathBuf;

use fmap_core::FmapError;
use thiserror::Error;

/// Errors reported by fmaptool commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read an input file
    #[error("unable to read \"{path}\": {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write an output file
    #[error("unable to write \"{path}\": {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Flashmap library error
    #[error(transparent)]
    Fmap(#[from] FmapError),

    /// Malformed line in a key/value input file
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No flashmap signature at an explicit offset
    #[error("no flashmap signature at offset {0:#x}")]
    BadSignature(usize),

    /// Flashmap at an explicit offset has a different name
    #[error("flashmap at offset {offset:#x} is \"{found}\", expected \"{expected}\"")]
    NameMismatch {
        offset: usize,
        found: String,
        expected: String,
    },

    /// Requested area is not present in the flashmap
    #[error("area \"{0}\" not found")]
    AreaNotFound(String),
}

/// Result type for fmaptool commands
pub type Result<T> = std::result::Result<T, CliError>;
