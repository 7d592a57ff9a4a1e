//! CLI command implementations
//!
//! ## Image commands
//!
//! The `inspect` module works on an existing firmware image: it locates the
//! flashmap, prints it, looks up areas and computes the static checksum.
//!
//! ## Build commands
//!
//! The `build` module produces new binary flashmaps, either from key/value
//! text or from the built-in example.

pub mod build;
pub mod inspect;

use std::fs;
use std::path::Path;

use crate::error::{CliError, Result};

/// Read a whole file into memory
fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Read {} bytes from {:?}", data.len(), path);
    Ok(data)
}

/// Write `data` to a file, replacing it
fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
