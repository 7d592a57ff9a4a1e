//! Flashmap search
//!
//! The flashmap can sit anywhere in an image. The search walks the buffer
//! from offset 0 upwards, using the signature as a cheap pre-filter, and
//! returns the first offset at which a complete flashmap decodes. A
//! signature that appears in unrelated data (truncated table, unknown
//! version) is skipped and the scan carries on.

use crate::error::{FmapError, Result};
use crate::layout::{Flashmap, FMAP_SIGNATURE, HEADER_SIZE};

/// Find the offset of the first valid flashmap in `buffer`
pub fn locate(buffer: &[u8]) -> Result<usize> {
    scan(buffer, |_| true).map(|(offset, _)| offset)
}

/// Find the first valid flashmap whose header name equals `name`
pub fn locate_named(buffer: &[u8], name: &str) -> Result<usize> {
    scan(buffer, |fmap| fmap.name == name).map(|(offset, _)| offset)
}

/// Locate and decode the first valid flashmap in `buffer`
pub fn find(buffer: &[u8]) -> Result<(usize, Flashmap)> {
    scan(buffer, |_| true)
}

fn scan<F>(buffer: &[u8], accept: F) -> Result<(usize, Flashmap)>
where
    F: Fn(&Flashmap) -> bool,
{
    if buffer.len() < HEADER_SIZE {
        return Err(FmapError::NotFound);
    }

    // Last offset at which a whole header still fits
    let last = buffer.len() - HEADER_SIZE;
    let mut start = 0;

    while start <= last {
        let window = &buffer[start..last + FMAP_SIGNATURE.len()];
        let Some(pos) = window
            .windows(FMAP_SIGNATURE.len())
            .position(|w| w == FMAP_SIGNATURE)
        else {
            break;
        };
        let offset = start + pos;

        match Flashmap::decode(&buffer[offset..]) {
            Ok(fmap) if accept(&fmap) => {
                log::debug!("Found flashmap \"{}\" at offset 0x{:x}", fmap.name, offset);
                return Ok((offset, fmap));
            }
            Ok(fmap) => {
                log::debug!(
                    "Skipping flashmap \"{}\" at offset 0x{:x}: name does not match",
                    fmap.name,
                    offset
                );
            }
            Err(e) => {
                log::debug!("Skipping signature at offset 0x{:x}: {}", offset, e);
            }
        }

        start = offset + 1;
    }

    Err(FmapError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::AreaFlags;
    use crate::layout::AREA_SIZE;
    use alloc::vec;
    use alloc::vec::Vec;

    fn test_fmap_bytes(name: &str) -> Vec<u8> {
        Flashmap::create(0, 0x10_0000, name)
            .and_then(|f| f.with_area(0x400, 0x10000, "test_area_1", AreaFlags::STATIC))
            .unwrap()
            .encode()
    }

    #[test]
    fn test_empty_and_short_buffers() {
        assert_eq!(locate(&[]), Err(FmapError::NotFound));
        assert_eq!(locate(&[0u8; HEADER_SIZE - 1]), Err(FmapError::NotFound));
    }

    #[test]
    fn test_no_signature() {
        let buf = vec![0u8; 0x10_0000];
        assert_eq!(locate(&buf), Err(FmapError::NotFound));
        assert_eq!(locate(&buf[..buf.len() - 1]), Err(FmapError::NotFound));
    }

    #[test]
    fn test_locate_unaligned() {
        let fmap = test_fmap_bytes("test_fmap");
        let total = 0x10_0000;
        let offset = total / 2 + 1;
        let mut buf = vec![0u8; total];
        buf[offset..offset + fmap.len()].copy_from_slice(&fmap);

        assert_eq!(locate(&buf), Ok(offset));
        assert_eq!(locate(&buf[..total - 1]), Ok(offset));
    }

    #[test]
    fn test_locate_at_start_and_at_end() {
        let fmap = test_fmap_bytes("test_fmap");

        let mut buf = vec![0xFF; 0x1000];
        buf[..fmap.len()].copy_from_slice(&fmap);
        assert_eq!(locate(&buf), Ok(0));

        let mut buf = vec![0xFF; 0x1000];
        let offset = buf.len() - fmap.len();
        buf[offset..].copy_from_slice(&fmap);
        assert_eq!(locate(&buf), Ok(offset));
    }

    #[test]
    fn test_overrun_is_not_a_match() {
        let fmap = test_fmap_bytes("test_fmap");
        let total = 0x1000;
        let mut buf = vec![0u8; total];
        // Header fits, last area record runs one byte past the end
        let offset = total - fmap.len() + 1;
        buf[offset..].copy_from_slice(&fmap[..fmap.len() - 1]);

        assert_eq!(locate(&buf), Err(FmapError::NotFound));
    }

    #[test]
    fn test_skips_decoy_signatures() {
        let fmap = test_fmap_bytes("test_fmap");
        let mut buf = vec![0x5A; 0x2000];

        // Bare signature in unrelated data
        buf[0x10..0x18].copy_from_slice(&FMAP_SIGNATURE);

        // Plausible header with an area table that would run off the end
        let decoy = 0x100;
        buf[decoy..decoy + HEADER_SIZE].copy_from_slice(&fmap[..HEADER_SIZE]);
        buf[decoy + 8] = 1;
        buf[decoy + 54..decoy + 56].copy_from_slice(&0xFFFFu16.to_le_bytes());

        // Valid layout with an unsupported major version
        let future = 0x400;
        buf[future..future + fmap.len()].copy_from_slice(&fmap);
        buf[future + 8] = 2;

        let k = 0x1234;
        buf[k..k + fmap.len()].copy_from_slice(&fmap);

        assert_eq!(locate(&buf), Ok(k));
    }

    #[test]
    fn test_first_valid_wins() {
        let fmap = test_fmap_bytes("test_fmap");
        let mut buf = vec![0u8; 0x1000];
        buf[0x300..0x300 + fmap.len()].copy_from_slice(&fmap);
        buf[0x800..0x800 + fmap.len()].copy_from_slice(&fmap);
        assert_eq!(locate(&buf), Ok(0x300));
    }

    #[test]
    fn test_locate_named() {
        let first = test_fmap_bytes("first");
        let second = test_fmap_bytes("second");
        let mut buf = vec![0u8; 0x1000];
        buf[0x100..0x100 + first.len()].copy_from_slice(&first);
        buf[0x200..0x200 + second.len()].copy_from_slice(&second);

        assert_eq!(locate_named(&buf, "first"), Ok(0x100));
        assert_eq!(locate_named(&buf, "second"), Ok(0x200));
        assert_eq!(locate_named(&buf, "banana"), Err(FmapError::NotFound));
    }

    #[test]
    fn test_find_decodes() {
        let fmap = test_fmap_bytes("test_fmap");
        let mut buf = vec![0u8; 0x800];
        buf[0x80..0x80 + fmap.len()].copy_from_slice(&fmap);

        let (offset, decoded) = find(&buf).unwrap();
        assert_eq!(offset, 0x80);
        assert_eq!(decoded.serialized_size(), fmap.len());
        assert_eq!(decoded.serialized_size(), HEADER_SIZE + AREA_SIZE);
        assert_eq!(decoded.areas()[0].name, "test_area_1");
    }
}
