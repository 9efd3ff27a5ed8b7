//! Read-only FAT16 volume reader over a [`platform::BlockDevice`].
//!
//! Root directory only, 8.3 names only, no writes. Everything is reached
//! through byte offsets computed once at mount time and read through a
//! [`platform::ByteWindow`].
//!
//! # Modules
//!
//! - [`mbr`]: partition table scan for the first FAT16-family entry
//! - [`boot_sector`]: BPB fields and the derived [`VolumeLayout`]
//! - [`dir`]: 32-byte root directory records and 8.3 names
//! - [`file`]: [`FileCursor`] position bookkeeping
//! - [`volume`]: [`Fat16Volume`]: mount, list, open, read, seek
//! - `image`: synthetic disk images for host tests (`std` feature)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)] // FAT fields are narrower than usize

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod boot_sector;
pub mod dir;
pub mod error;
pub mod file;
pub mod image;
pub mod mbr;
pub mod volume;

// Top-level re-exports for convenience
pub use boot_sector::{BootSector, VolumeLayout};
pub use dir::{DirectoryEntry, EntryKind, ShortName};
pub use error::Fat16Error;
pub use file::{FileCursor, SeekFrom};
pub use mbr::PartitionDescriptor;
pub use volume::{FatEntry, Fat16Volume};
