//! # fatview Pipeline
//!
//! Stream access to the disk image file.
//!
//! The volume loader consumes any `Read` source; this crate provides the
//! default one, a read-only memory mapping of the image:
//!
//! ```rust,no_run
//! use fatview_pipeline::MmapPipeline;
//! use std::io::Read;
//! use std::path::Path;
//!
//! let mut pipeline = MmapPipeline::open(Path::new("floppy.img")).unwrap();
//! let mut boot = [0u8; 512];
//! pipeline.read_exact(&mut boot).unwrap();
//! ```

pub mod mmap;

pub use mmap::MmapPipeline;
