//! fmap-core - Flashmap (FMAP) library
//!
//! A flashmap is a small self-describing directory embedded somewhere in a
//! firmware image. It names the regions ("areas") of the image and tags
//! each one with flags such as `STATIC` or `RO`.
//!
//! This crate provides:
//!
//! - [`Flashmap`] / [`Area`] - the in-memory model with explicit
//!   little-endian encode/decode of the wire format
//! - [`locate()`] - leftmost search for a valid flashmap inside a buffer
//! - a builder API ([`Flashmap::create`], [`Flashmap::append_area`])
//! - [`static_ranges`] / [`static_digest`] - selection of the static areas
//!   that feed an image checksum
//! - a key/value text rendering of a flashmap ([`render`])
//!
//! The crate is `no_std` and always needs `alloc` for the area table.
//!
//! # Features
//!
//! - `std` (default) - Enable standard library support: `std::error::Error`
//!   for [`FmapError`] and the `std` features of the digest crates
//!
//! # Example
//!
//! ```
//! use fmap_core::{AreaFlags, Flashmap};
//!
//! let mut fmap = Flashmap::create(0xfc00_0000, 0x40_0000, "x86_BIOS")?;
//! fmap.append_area(0, 0x100, "RO_SECTION", AreaFlags::STATIC | AreaFlags::RO)?;
//! let bytes = fmap.encode();
//! assert_eq!(bytes.len(), fmap.serialized_size());
//! # Ok::<(), fmap_core::FmapError>(())
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod builder;
pub mod checksum;
pub mod display;
pub mod error;
pub mod flags;
pub mod layout;
pub mod locate;

pub use checksum::{image_checksum, static_digest, static_ranges, SHA1_DIGEST_SIZE};
pub use display::render;
pub use error::{FmapError, Result};
pub use flags::AreaFlags;
pub use layout::{
    Area, FixedName, Flashmap, AREA_SIZE, FMAP_SIGNATURE, FMAP_STRLEN, HEADER_SIZE, VERSION_MAJOR,
    VERSION_MINOR,
};
pub use locate::{find, locate, locate_named};
