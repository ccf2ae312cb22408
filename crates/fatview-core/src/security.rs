//! Parsing limits and checked arithmetic
//!
//! A disk image is untrusted input: every size the decoder derives from
//! on-disk fields is validated against these limits before a buffer is
//! allocated, and size arithmetic is overflow-checked.

use crate::Error;

/// Maximum image file size accepted for memory mapping. A FAT12 volume
/// tops out far below this; anything bigger is not a FAT12 image.
pub const MAX_IMAGE_SIZE: u64 = 512 * 1024 * 1024;

/// Maximum size for any single buffer derived from image fields (64 MB)
pub const MAX_ALLOCATION_SIZE: usize = 64 * 1024 * 1024;

/// Maximum FAT size (a FAT12 table addresses at most 4085 clusters,
/// so 8 MB is far beyond any well-formed volume)
pub const MAX_FAT_SIZE: usize = 8 * 1024 * 1024;

/// Maximum cluster chain length (prevents cycles from looping forever)
pub const MAX_CHAIN_LENGTH: usize = 65_536;

/// Maximum working-directory depth below the root
pub const MAX_DIRECTORY_DEPTH: usize = 100;

/// Validate that a size is within allocation limits
pub fn validate_allocation_size(size: u64, limit: usize, context: &str) -> crate::Result<usize> {
    if size > limit as u64 {
        return Err(Error::allocation_limit(format!(
            "{} size {} exceeds limit {}",
            context, size, limit
        )));
    }

    size.try_into()
        .map_err(|_| Error::allocation_limit(format!("{} size exceeds platform limits", context)))
}

/// Safely multiply u32 values and return u64
pub fn checked_multiply_u32_to_u64(a: u32, b: u32, context: &str) -> crate::Result<u64> {
    (a as u64)
        .checked_mul(b as u64)
        .ok_or_else(|| Error::invalid_image(format!("{}: multiplication overflow", context)))
}
