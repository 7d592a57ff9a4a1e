//! Error types for fmap-core
//!
//! The error type is `no_std` compatible; `std::error::Error` is only
//! implemented when the `std` feature is enabled.

use alloc::string::String;
use core::fmt;

/// Errors returned by flashmap operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FmapError {
    /// Buffer is shorter than the declared header or area table
    MalformedLayout {
        /// Bytes required to hold the structure
        needed: usize,
        /// Bytes actually available
        available: usize,
    },
    /// Major version is not the one this library understands
    UnsupportedVersion {
        /// Major version found in the header
        major: u8,
        /// Minor version found in the header
        minor: u8,
    },
    /// No valid flashmap was found in the buffer
    NotFound,
    /// A name does not fit in its fixed-width field
    NameTooLong {
        /// Length of the rejected name in bytes
        len: usize,
        /// Width of the field
        max: usize,
    },
    /// The area table could not be grown
    AllocationFailure,
    /// A static area extends past the end of the image buffer
    OutOfBounds {
        /// Index of the offending area in the table
        area: usize,
        /// First byte past the end of the area
        end: u64,
        /// Length of the image buffer
        len: usize,
    },
    /// Flag name not present in the flag table
    UnknownFlag(String),
}

impl fmt::Display for FmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLayout { needed, available } => write!(
                f,
                "malformed flashmap: need {} bytes, only {} available",
                needed, available
            ),
            Self::UnsupportedVersion { major, minor } => {
                write!(f, "unsupported flashmap version {}.{}", major, minor)
            }
            Self::NotFound => write!(f, "no valid flashmap found"),
            Self::NameTooLong { len, max } => {
                write!(f, "name is {} bytes long, maximum is {}", len, max)
            }
            Self::AllocationFailure => write!(f, "unable to grow flashmap area table"),
            Self::OutOfBounds { area, end, len } => write!(
                f,
                "area {} ends at 0x{:x}, past end of {}-byte image",
                area, end, len
            ),
            Self::UnknownFlag(name) => write!(f, "unknown area flag \"{}\"", name),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FmapError {}

/// Result type alias using [`FmapError`]
pub type Result<T> = core::result::Result<T, FmapError>;
