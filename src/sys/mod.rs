//! Platform mapping primitives behind a single capability trait.
//!
//! Exactly one backend is compiled per target. Everything above this module
//! talks to [`Platform`] through [`MapBackend`] and never touches the OS
//! directly.

use std::io;
use std::ptr::NonNull;

#[cfg(feature = "advise")]
use crate::advise::MapAdvice;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub(crate) use unix::Unix as Platform;
        /// Raw OS handle a region is mapped from (a file descriptor on Unix).
        pub type RawMapHandle = std::os::fd::RawFd;
    } else if #[cfg(windows)] {
        mod windows;
        pub(crate) use windows::{Section, Windows as Platform};
        /// Raw OS handle a region is mapped from (a file `HANDLE` on Windows).
        pub type RawMapHandle = std::os::windows::io::RawHandle;
    } else {
        compile_error!("mapped-region supports Unix and Windows targets only");
    }
}

/// Anything that can lend an open file handle for mapping.
///
/// Implemented for every `AsFd` type on Unix and every `AsHandle` type on
/// Windows, so `File`, `&File` and borrowed descriptors all work. The handle
/// is only read while the mapping is being established; it is never closed
/// or duplicated.
pub trait AsMapHandle {
    /// Borrow the raw handle.
    fn as_map_handle(&self) -> RawMapHandle;
}

#[cfg(unix)]
impl<T: std::os::fd::AsFd + ?Sized> AsMapHandle for T {
    fn as_map_handle(&self) -> RawMapHandle {
        use std::os::fd::AsRawFd;
        self.as_fd().as_raw_fd()
    }
}

#[cfg(windows)]
impl<T: std::os::windows::io::AsHandle + ?Sized> AsMapHandle for T {
    fn as_map_handle(&self) -> RawMapHandle {
        use std::os::windows::io::AsRawHandle;
        self.as_handle().as_raw_handle()
    }
}

/// A live physical mapping as returned by the OS.
#[derive(Debug)]
pub(crate) struct RawMapping {
    pub(crate) base: NonNull<u8>,
    pub(crate) len: usize,
    // Section object that lives as long as the view.
    #[cfg(windows)]
    pub(crate) section: Section,
}

/// OS mapping capability.
pub(crate) trait MapBackend {
    /// Granularity that mapping offsets must be aligned to.
    fn granularity() -> io::Result<usize>;

    /// Current length of the file behind `handle`, or `None` when the
    /// handle has no meaningful length (devices, pseudo files).
    fn file_len(handle: RawMapHandle) -> io::Result<Option<u64>>;

    /// Map `len` bytes of `handle` starting at the aligned `offset`, shared
    /// with other mappers of the same file.
    ///
    /// # Safety
    ///
    /// `handle` must be open for reading (and writing unless `read_only`),
    /// and `offset` must be a multiple of [`MapBackend::granularity`].
    unsafe fn map(
        handle: RawMapHandle,
        offset: u64,
        len: usize,
        read_only: bool,
    ) -> io::Result<RawMapping>;

    /// Release a mapping produced by [`MapBackend::map`].
    ///
    /// # Safety
    ///
    /// Must be called at most once per mapping, and no reference into the
    /// mapping may outlive the call.
    unsafe fn unmap(mapping: &RawMapping) -> io::Result<()>;

    /// Pass an access-pattern hint for the whole physical mapping.
    ///
    /// # Safety
    ///
    /// `mapping` must be live.
    #[cfg(feature = "advise")]
    unsafe fn advise(mapping: &RawMapping, advice: MapAdvice) -> io::Result<()>;
}
