//! # fatview Volume
//!
//! The FAT12 decoder and traversal engine.
//!
//! A [`Volume`] is loaded whole into memory: boot sector, the first FAT
//! copy, the root directory, and the data region. On top of that sit the
//! chain reader ([`Volume::contents_of`]), the path resolver with its
//! working-directory stack, and read-only stream [`Handle`]s.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fatview_volume::Volume;
//! use std::path::Path;
//!
//! let mut volume = Volume::load(Path::new("floppy.img")).unwrap();
//! volume.change_directory("docs").unwrap();
//! let mut handle = volume.open_file("readme.txt").unwrap();
//! let mut buf = vec![0u8; handle.size()];
//! let len = buf.len();
//! let n = handle.read(&volume, &mut buf, 1, len).unwrap();
//! println!("{}", String::from_utf8_lossy(&buf[..n]));
//! ```

pub mod boot;
pub mod entry;
pub mod fat;
pub mod handle;
pub mod nav;
pub mod volume;

#[cfg(test)]
pub(crate) mod fixtures;

pub use boot::BootSector;
pub use entry::DirEntry;
pub use fat::{Fat, FatClass, FatStats};
pub use handle::{Handle, HandleKind};
pub use nav::Resolved;
pub use volume::Volume;
