//! Image inspection commands

use std::path::Path;

use fmap_core::{find, image_checksum, locate_named, static_ranges, Flashmap};

use super::read_file;
use crate::error::{CliError, Result};

/// Load an image and decode its flashmap
///
/// With `offset` the search is skipped, but the signature must still be
/// present there; with `name` only a flashmap with that header name is
/// accepted.
pub fn load_flashmap(
    path: &Path,
    offset: Option<usize>,
    name: Option<&str>,
) -> Result<(Vec<u8>, usize, Flashmap)> {
    let image = read_file(path)?;

    let (offset, fmap) = match (offset, name) {
        (Some(offset), _) => {
            let fmap = Flashmap::decode_at(&image, offset)?;
            if !fmap.has_valid_signature() {
                return Err(CliError::BadSignature(offset));
            }
            (offset, fmap)
        }
        (None, Some(name)) => {
            let offset = locate_named(&image, name)?;
            (offset, Flashmap::decode_at(&image, offset)?)
        }
        (None, None) => find(&image)?,
    };

    if let Some(name) = name {
        if fmap.name != name {
            return Err(CliError::NameMismatch {
                offset,
                found: fmap.name.to_string(),
                expected: name.to_string(),
            });
        }
    }

    log::info!(
        "Flashmap \"{}\" v{}.{} at offset 0x{:x} ({} areas)",
        fmap.name,
        fmap.ver_major,
        fmap.ver_minor,
        offset,
        fmap.area_count()
    );
    Ok((image, offset, fmap))
}

/// Print the flashmap of an image as key/value lines
pub fn cmd_decode(path: &Path, offset: Option<usize>, name: Option<&str>) -> Result<()> {
    let (_, _, fmap) = load_flashmap(path, offset, name)?;
    print!("{}", fmap.display());
    Ok(())
}

/// Print the SHA-1 of the static areas of an image
pub fn cmd_csum(path: &Path, list: bool) -> Result<()> {
    let (image, _, fmap) = load_flashmap(path, None, None)?;

    if list {
        // Validate before listing so a bad map prints nothing
        static_ranges(&image, &fmap)?;
        for area in fmap.areas().iter().filter(|a| a.is_static()) {
            println!(
                "{:<32} 0x{:08x} 0x{:08x}",
                area.name.to_str_lossy(),
                area.offset,
                area.size
            );
        }
    }

    println!("{}", hex::encode(image_checksum(&image)?));
    Ok(())
}

/// Print one area of the flashmap of an image
pub fn cmd_area(path: &Path, name: &str) -> Result<()> {
    let (_, _, fmap) = load_flashmap(path, None, None)?;
    let area = fmap
        .find_area(name)
        .ok_or_else(|| CliError::AreaNotFound(name.to_string()))?;
    println!("{}", area);
    Ok(())
}
