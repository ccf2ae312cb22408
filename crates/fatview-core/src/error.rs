//! fatview error types

use thiserror::Error;

/// The main error type for fatview operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading the disk image or writing extracted files
    #[error("Image I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed boot sector, geometry, or on-disk structure
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// A buffer the image asks for exceeds the configured limits
    #[error("Allocation limit: {0}")]
    AllocationLimit(String),

    /// File or directory not found on the volume
    #[error("Not found: {0}")]
    NotFound(String),

    /// Path component or operation target is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Operation target is a directory where a file is required
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// A cluster chain ran into a bad (0xFF7) FAT entry
    #[error("Cluster chain hit a bad entry (value {cluster:#05x})")]
    BadChain { cluster: u16 },

    /// The working-directory stack would grow past its bound
    #[error("Maximum directory depth reached")]
    DepthExceeded,

    /// A read request's size multiplied by item count overflowed
    #[error("Read request size overflow")]
    ReadOverflow,

    /// Cursor already at the end of the stream or iteration exhausted
    #[error("End of file")]
    EndOfFile,

    /// Operation on a handle that has been closed
    #[error("Handle is closed")]
    Closed,
}

/// Result type alias for fatview operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid image error
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Error::InvalidImage(msg.into())
    }

    /// Create an allocation limit error
    pub fn allocation_limit(msg: impl Into<String>) -> Self {
        Error::AllocationLimit(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a not-a-directory error
    pub fn not_a_directory(msg: impl Into<String>) -> Self {
        Error::NotADirectory(msg.into())
    }

    /// Create a not-a-file error
    pub fn not_a_file(msg: impl Into<String>) -> Self {
        Error::NotAFile(msg.into())
    }

    /// Create a bad chain error for the given cluster
    pub fn bad_chain(cluster: u16) -> Self {
        Error::BadChain { cluster }
    }
}
