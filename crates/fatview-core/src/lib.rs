//! # fatview Core
//!
//! Shared error handling and parsing limits for fatview.
//!
//! The crates build on each other:
//! - **fatview-pipeline**: stream access to the image file
//! - **fatview-volume**: the FAT12 decoder and traversal engine
//! - **fatview-cli**: the interactive shell
//!
//! ## Example
//!
//! ```rust
//! use fatview_core::{validate_allocation_size, Error};
//!
//! let err = validate_allocation_size(10_000, 1024, "FAT").unwrap_err();
//! assert!(matches!(err, Error::AllocationLimit(_)));
//! ```

pub mod error;
pub mod security;

// Re-export commonly used items
pub use error::{Error, Result};
pub use security::*;
