//! Flashmap construction
//!
//! A new flashmap starts with an empty area table and grows one record at a
//! time. The map owns its table, so appends go through `&mut self` and
//! there is never more than one live handle to it.

use alloc::vec::Vec;

use crate::error::{FmapError, Result};
use crate::flags::AreaFlags;
use crate::layout::{Area, FixedName, Flashmap, FMAP_SIGNATURE, VERSION_MAJOR, VERSION_MINOR};

/// Largest table the 16-bit `nareas` field can describe
const MAX_AREAS: usize = u16::MAX as usize;

impl Flashmap {
    /// Create an empty flashmap with the current signature and version
    pub fn create(base: u64, size: u32, name: &str) -> Result<Self> {
        let fmap = Self {
            signature: FMAP_SIGNATURE,
            ver_major: VERSION_MAJOR,
            ver_minor: VERSION_MINOR,
            base,
            size,
            name: FixedName::new(name)?,
            areas: Vec::new(),
        };
        log::trace!("Created flashmap \"{}\" base 0x{:x} size 0x{:x}", name, base, size);
        Ok(fmap)
    }

    /// Append an area to the end of the table
    ///
    /// On error the flashmap is left exactly as it was.
    pub fn append_area(
        &mut self,
        offset: u32,
        size: u32,
        name: &str,
        flags: AreaFlags,
    ) -> Result<()> {
        let area = Area::new(offset, size, name, flags)?;
        self.push_area(area)
    }

    /// Append an already constructed area to the end of the table
    pub fn push_area(&mut self, area: Area) -> Result<()> {
        if self.areas.len() >= MAX_AREAS {
            return Err(FmapError::AllocationFailure);
        }
        self.areas
            .try_reserve(1)
            .map_err(|_| FmapError::AllocationFailure)?;

        log::trace!(
            "Appending area {} \"{}\" at 0x{:08x} (0x{:x} bytes)",
            self.areas.len(),
            area.name,
            area.offset,
            area.size
        );
        self.areas.push(area);
        Ok(())
    }

    /// Consuming form of [`append_area`](Self::append_area) for chained construction
    pub fn with_area(mut self, offset: u32, size: u32, name: &str, flags: AreaFlags) -> Result<Self> {
        self.append_area(offset, size, name, flags)?;
        Ok(self)
    }

    /// Replace the image name
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = FixedName::new(name)?;
        Ok(())
    }

    /// Set the address the image is mapped at
    pub fn set_base(&mut self, base: u64) {
        self.base = base;
    }

    /// Set the size of the described image
    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    /// Override the version written to the header
    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.ver_major = major;
        self.ver_minor = minor;
    }
}
