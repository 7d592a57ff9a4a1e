//! Static region checksums
//!
//! An image checksum covers only the areas flagged [`AreaFlags::STATIC`],
//! concatenated in table order. Areas without the flag are left out
//! entirely, so two images that differ only in their mutable areas hash
//! the same.
//!
//! Area offsets are used directly as indices into the buffer the flashmap
//! was found in.
//!
//! [`AreaFlags::STATIC`]: crate::flags::AreaFlags::STATIC

use alloc::vec::Vec;

use digest::{Digest, Output};
use sha1::Sha1;

use crate::error::{FmapError, Result};
use crate::layout::Flashmap;
use crate::locate::find;

/// Length of the SHA-1 digest returned by [`image_checksum`]
pub const SHA1_DIGEST_SIZE: usize = 20;

/// Collect the byte ranges of all static areas, in table order
///
/// Every selected range is checked against `buffer` before anything is
/// returned; a range running past the end is an error, never truncated.
pub fn static_ranges<'a>(buffer: &'a [u8], fmap: &Flashmap) -> Result<Vec<&'a [u8]>> {
    let mut ranges = Vec::new();

    for (index, area) in fmap.areas().iter().enumerate() {
        if !area.is_static() {
            continue;
        }

        let end = area.end();
        let range = usize::try_from(end)
            .ok()
            .and_then(|end| buffer.get(area.offset as usize..end))
            .ok_or(FmapError::OutOfBounds {
                area: index,
                end,
                len: buffer.len(),
            })?;

        log::trace!(
            "Selected static area {} \"{}\" 0x{:08x}..0x{:08x}",
            index,
            area.name,
            area.offset,
            end
        );
        ranges.push(range);
    }

    Ok(ranges)
}

/// Hash the static areas of `buffer` with any streaming digest
pub fn static_digest<D: Digest>(buffer: &[u8], fmap: &Flashmap) -> Result<Output<D>> {
    let mut hasher = D::new();
    for range in static_ranges(buffer, fmap)? {
        hasher.update(range);
    }
    Ok(hasher.finalize())
}

/// Locate the flashmap in `image` and SHA-1 its static areas
pub fn image_checksum(image: &[u8]) -> Result<[u8; SHA1_DIGEST_SIZE]> {
    let (_, fmap) = find(image)?;
    let digest = static_digest::<Sha1>(image, &fmap)?;

    let mut out = [0u8; SHA1_DIGEST_SIZE];
    out.copy_from_slice(&digest);
    Ok(out)
}
