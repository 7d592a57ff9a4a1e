//! Key/value rendering of a flashmap
//!
//! Output is one line for the header followed by one line per area, each a
//! run of `key="value"` pairs:
//!
//! ```text
//! fmap_signature="0x5f5f464d41505f5f" fmap_ver_major="1" fmap_ver_minor="1" fmap_base="0x00000000fc000000" fmap_size="0x400000" fmap_name="x86_BIOS" fmap_nareas="1"
//! area_offset="0xfc000000" area_size="0x00000100" area_name="area_1" area_flags_raw="0x01" area_flags="static"
//! ```
//!
//! Names are written as stored, without escaping. A name containing `"`
//! therefore renders to text that the key/value reader rejects.

use alloc::string::String;
use core::fmt;

use crate::layout::{Area, Flashmap};

/// `Display` adaptor returned by [`Flashmap::display`]
pub struct FlashmapDisplay<'a>(&'a Flashmap);

impl Flashmap {
    /// Render this flashmap as key/value lines
    pub fn display(&self) -> FlashmapDisplay<'_> {
        FlashmapDisplay(self)
    }
}

/// Render a flashmap as key/value lines
pub fn render(fmap: &Flashmap) -> String {
    use alloc::string::ToString;
    fmap.display().to_string()
}

impl fmt::Display for FlashmapDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmap = self.0;

        write!(f, "fmap_signature=\"0x")?;
        for b in fmap.signature {
            write!(f, "{:02x}", b)?;
        }
        writeln!(
            f,
            "\" fmap_ver_major=\"{}\" fmap_ver_minor=\"{}\" fmap_base=\"0x{:016x}\" \
             fmap_size=\"0x{:04x}\" fmap_name=\"{}\" fmap_nareas=\"{}\"",
            fmap.ver_major,
            fmap.ver_minor,
            fmap.base,
            fmap.size,
            fmap.name,
            fmap.area_count()
        )?;

        for area in fmap.areas() {
            writeln!(f, "{}", area)?;
        }
        Ok(())
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "area_offset=\"0x{:08x}\" area_size=\"0x{:08x}\" area_name=\"{}\" \
             area_flags_raw=\"0x{:02x}\" area_flags=\"{}\"",
            self.offset,
            self.size,
            self.name,
            self.flags.bits(),
            self.flags.to_names()
        )
    }
}
