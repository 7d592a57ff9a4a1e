//! Flashmap wire format
//!
//! A flashmap is a fixed 56-byte header immediately followed by `nareas`
//! 42-byte area records. All integers are little-endian and there is no
//! padding between fields:
//!
//! ```text
//! header: signature[8] ver_major:u8 ver_minor:u8 base:u64 size:u32 name[32] nareas:u16
//! area:   offset:u32 size:u32 name[32] flags:u16
//! ```
//!
//! Encoding and decoding read and write each field at its fixed offset, so
//! the in-memory types are free to use whatever layout Rust picks.
//!
//! Reference: https://chromium.googlesource.com/chromiumos/third_party/flashmap

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{FmapError, Result};
use crate::flags::AreaFlags;

/// Flashmap signature: "__FMAP__"
pub const FMAP_SIGNATURE: [u8; 8] = *b"__FMAP__";

/// Major version written by, and the only one accepted by, this library
pub const VERSION_MAJOR: u8 = 1;

/// Minor version written by this library
pub const VERSION_MINOR: u8 = 1;

/// Width of the fixed name fields
pub const FMAP_STRLEN: usize = 32;

/// Size of the flashmap header
pub const HEADER_SIZE: usize = 56;

/// Size of one area record
pub const AREA_SIZE: usize = 42;

// Header field offsets
const HDR_VER_MAJOR: usize = 8;
const HDR_VER_MINOR: usize = 9;
const HDR_BASE: usize = 10;
const HDR_SIZE: usize = 18;
const HDR_NAME: usize = 22;
const HDR_NAREAS: usize = 54;

// Area field offsets
const AREA_OFFSET: usize = 0;
const AREA_LEN: usize = 4;
const AREA_NAME: usize = 8;
const AREA_FLAGS: usize = 40;

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_u64(b: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&b[at..at + 8]);
    u64::from_le_bytes(raw)
}

/// A null-padded name stored in a fixed 32-byte field
///
/// Names are truncated at the first NUL, mirroring how the field is read
/// back. A name of exactly [`FMAP_STRLEN`] bytes is stored without a
/// terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedName(heapless::Vec<u8, FMAP_STRLEN>);

impl FixedName {
    /// Create a name, failing if it does not fit in the field
    pub fn new(name: &str) -> Result<Self> {
        Self::from_bytes(name.as_bytes())
    }

    /// Create a name from raw bytes, failing if it does not fit in the field
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        heapless::Vec::from_slice(&bytes[..end])
            .map(Self)
            .map_err(|_| FmapError::NameTooLong {
                len: end,
                max: FMAP_STRLEN,
            })
    }

    // `field` is always exactly FMAP_STRLEN bytes
    fn from_field(field: &[u8]) -> Self {
        Self::from_bytes(field).unwrap_or_default()
    }

    fn write_field(&self, field: &mut [u8]) {
        field.fill(0);
        field[..self.0.len()].copy_from_slice(&self.0);
    }

    /// Raw name bytes, without padding
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Name as text, replacing invalid UTF-8
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Length of the name in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the name is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl PartialEq<str> for FixedName {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for FixedName {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// One named region of the described image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    /// Offset of the area within the image
    pub offset: u32,
    /// Length of the area in bytes
    pub size: u32,
    /// Area name
    pub name: FixedName,
    /// Area attributes
    pub flags: AreaFlags,
}

impl Area {
    /// Create an area, validating the name width
    pub fn new(offset: u32, size: u32, name: &str, flags: AreaFlags) -> Result<Self> {
        Ok(Self {
            offset,
            size,
            name: FixedName::new(name)?,
            flags,
        })
    }

    /// Decode one area record from the start of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < AREA_SIZE {
            return Err(FmapError::MalformedLayout {
                needed: AREA_SIZE,
                available: bytes.len(),
            });
        }

        Ok(Self {
            offset: le_u32(bytes, AREA_OFFSET),
            size: le_u32(bytes, AREA_LEN),
            name: FixedName::from_field(&bytes[AREA_NAME..AREA_NAME + FMAP_STRLEN]),
            // Unknown bits are kept so re-encoding is lossless
            flags: AreaFlags::from_bits_retain(le_u16(bytes, AREA_FLAGS)),
        })
    }

    /// Encode this area as a wire record
    pub fn to_bytes(&self) -> [u8; AREA_SIZE] {
        let mut out = [0u8; AREA_SIZE];
        out[AREA_OFFSET..AREA_OFFSET + 4].copy_from_slice(&self.offset.to_le_bytes());
        out[AREA_LEN..AREA_LEN + 4].copy_from_slice(&self.size.to_le_bytes());
        self.name
            .write_field(&mut out[AREA_NAME..AREA_NAME + FMAP_STRLEN]);
        out[AREA_FLAGS..AREA_FLAGS + 2].copy_from_slice(&self.flags.bits().to_le_bytes());
        out
    }

    /// First byte past the end of the area (cannot overflow)
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    /// Check if the area is flagged static
    pub fn is_static(&self) -> bool {
        self.flags.contains(AreaFlags::STATIC)
    }
}

/// A flashmap header together with its area table
///
/// Areas are kept in table order, which is also the order used for
/// checksums. The table length is bounded by the 16-bit `nareas` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashmap {
    /// Signature bytes (always [`FMAP_SIGNATURE`] for a located map)
    pub signature: [u8; 8],
    /// Layout major version
    pub ver_major: u8,
    /// Layout minor version
    pub ver_minor: u8,
    /// Address the image is mapped at on the target
    pub base: u64,
    /// Size of the described image in bytes
    pub size: u32,
    /// Image name
    pub name: FixedName,
    pub(crate) areas: Vec<Area>,
}

impl Flashmap {
    /// Decode a flashmap from the start of `bytes`
    ///
    /// The signature is copied but not checked; that is the locator's job.
    /// The major version must equal [`VERSION_MAJOR`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FmapError::MalformedLayout {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let ver_major = bytes[HDR_VER_MAJOR];
        let ver_minor = bytes[HDR_VER_MINOR];
        if ver_major != VERSION_MAJOR {
            return Err(FmapError::UnsupportedVersion {
                major: ver_major,
                minor: ver_minor,
            });
        }

        let nareas = usize::from(le_u16(bytes, HDR_NAREAS));
        let needed = HEADER_SIZE + nareas * AREA_SIZE;
        if bytes.len() < needed {
            return Err(FmapError::MalformedLayout {
                needed,
                available: bytes.len(),
            });
        }

        let mut signature = [0u8; 8];
        signature.copy_from_slice(&bytes[..8]);

        let areas = bytes[HEADER_SIZE..needed]
            .chunks_exact(AREA_SIZE)
            .map(Area::decode)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            signature,
            ver_major,
            ver_minor,
            base: le_u64(bytes, HDR_BASE),
            size: le_u32(bytes, HDR_SIZE),
            name: FixedName::from_field(&bytes[HDR_NAME..HDR_NAME + FMAP_STRLEN]),
            areas,
        })
    }

    /// Decode a flashmap located at `offset` within `bytes`
    pub fn decode_at(bytes: &[u8], offset: usize) -> Result<Self> {
        let tail = bytes.get(offset..).ok_or(FmapError::MalformedLayout {
            needed: offset,
            available: bytes.len(),
        })?;
        Self::decode(tail)
    }

    /// Encode the header and area table
    pub fn encode(&self) -> Vec<u8> {
        let mut out = alloc::vec![0u8; self.serialized_size()];
        self.write_to(&mut out);
        out
    }

    /// Encode into the start of `out`, returning the number of bytes written
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize> {
        let needed = self.serialized_size();
        let available = out.len();
        let dst = out
            .get_mut(..needed)
            .ok_or(FmapError::MalformedLayout { needed, available })?;
        self.write_to(dst);
        Ok(needed)
    }

    // `out` is exactly serialized_size() bytes
    fn write_to(&self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.signature);
        out[HDR_VER_MAJOR] = self.ver_major;
        out[HDR_VER_MINOR] = self.ver_minor;
        out[HDR_BASE..HDR_BASE + 8].copy_from_slice(&self.base.to_le_bytes());
        out[HDR_SIZE..HDR_SIZE + 4].copy_from_slice(&self.size.to_le_bytes());
        self.name
            .write_field(&mut out[HDR_NAME..HDR_NAME + FMAP_STRLEN]);
        out[HDR_NAREAS..HDR_NAREAS + 2].copy_from_slice(&self.area_count().to_le_bytes());

        for (slot, area) in out[HEADER_SIZE..]
            .chunks_exact_mut(AREA_SIZE)
            .zip(&self.areas)
        {
            slot.copy_from_slice(&area.to_bytes());
        }
    }

    /// Number of bytes the encoded flashmap occupies
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE + self.areas.len() * AREA_SIZE
    }

    /// Number of areas in the table
    pub fn area_count(&self) -> u16 {
        // Bounded by decode (16-bit field) and append_area
        self.areas.len() as u16
    }

    /// Areas in table order
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Find the first area with exactly this name
    pub fn find_area(&self, name: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.name == name)
    }

    /// Check whether the signature matches [`FMAP_SIGNATURE`]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == FMAP_SIGNATURE
    }
}
