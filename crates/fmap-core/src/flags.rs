//! Flashmap area flags
//!
//! Each area carries a 16-bit flag field. The bits are independent and may
//! be combined freely.

use alloc::format;
use alloc::string::{String, ToString};
use bitflags::bitflags;

use crate::error::{FmapError, Result};

bitflags! {
    /// Attributes of a flashmap area
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AreaFlags: u16 {
        /// Content is identical across builds; covered by the image checksum
        const STATIC     = 1 << 0;
        /// Content is compressed
        const COMPRESSED = 1 << 1;
        /// Area is read-only
        const RO         = 1 << 2;
        /// Content must be preserved across updates
        const PRESERVE   = 1 << 3;
    }
}

/// Text names of the area flags, in bit order
pub const FLAG_NAMES: &[(&str, AreaFlags)] = &[
    ("static", AreaFlags::STATIC),
    ("compressed", AreaFlags::COMPRESSED),
    ("ro", AreaFlags::RO),
    ("preserve", AreaFlags::PRESERVE),
];

impl AreaFlags {
    /// Look up a single flag by its lowercase text name, ignoring case
    pub fn from_flag_name(name: &str) -> Option<Self> {
        FLAG_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, flag)| flag)
    }

    /// Parse a comma separated list of flag names, e.g. `"static,ro"`
    ///
    /// An empty string yields no flags.
    pub fn from_names(names: &str) -> Result<Self> {
        let mut flags = Self::empty();
        for name in names
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
        {
            flags |= Self::from_flag_name(name)
                .ok_or_else(|| FmapError::UnknownFlag(name.to_string()))?;
        }
        Ok(flags)
    }

    /// Render the flags as a comma separated list of names
    ///
    /// Bits without a name are rendered as hex so nothing is hidden.
    pub fn to_names(self) -> String {
        let mut out = String::new();
        for (name, flag) in FLAG_NAMES {
            if self.contains(*flag) {
                if !out.is_empty() {
                    out.push(',');
                }
                out.push_str(name);
            }
        }

        let unknown = self.bits() & !Self::all().bits();
        if unknown != 0 {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(&format!("0x{:x}", unknown));
        }
        out
    }
}
