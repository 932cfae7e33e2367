//! Crate-specific error types for mapped-region.

use std::io;
use thiserror::Error;

/// Result alias for mapped-region operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// Error type covering precondition, mapping, ownership and advisory failures.
#[derive(Debug, Error)]
pub enum MapError {
    /// Wrapper for `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The mapping granularity could not be obtained from the OS.
    #[error("could not determine page size: {0}")]
    PageSize(io::Error),

    /// Requested length is not usable (zero-length regions are rejected).
    #[error("invalid length: {0}")]
    InvalidLength(&'static str),

    /// Error when a requested offset/length pair is out of bounds.
    #[error("range out of bounds: offset={offset}, len={len}, total={total}")]
    OutOfBounds {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Total size of the underlying file.
        total: u64,
    },

    /// Offset plus length (or the page adjustment) does not fit the integer types involved.
    #[error("range overflows: offset={offset}, len={len}")]
    RangeOverflow {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
    },

    /// `create` was called on a region that already holds a mapping.
    #[error("region already holds a mapping")]
    AlreadyMapped,

    /// The operation needs a live mapping but the region is empty.
    #[error("region holds no mapping")]
    NotMapped,

    /// Error returned when attempting an operation in an incompatible mode.
    #[error("invalid access mode: {0}")]
    InvalidMode(&'static str),

    /// The OS refused to establish the mapping.
    #[error("mapping {len} bytes at offset {offset} failed: {source}")]
    MapFailed {
        /// Page-aligned offset passed to the OS.
        offset: u64,
        /// Page-adjusted length passed to the OS.
        len: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The OS rejected an access-pattern hint.
    #[error("advice failed: {0}")]
    AdviceFailed(String),

    /// The platform does not provide the requested facility.
    #[error("unsupported on this platform: {0}")]
    Unsupported(&'static str),
}
