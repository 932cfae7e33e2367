//! Exclusively-owned mapping of a byte range of an open file.

use std::fmt;
use std::ptr;

use crate::errors::{MapError, Result};
use crate::sys::{AsMapHandle, MapBackend, Platform, RawMapping};
use crate::utils::{ensure_in_bounds, page_size, page_span};

// Error message constants
const ERR_ZERO_LENGTH: &str = "Length must be greater than zero";

/// A mapped byte range of a file.
///
/// The OS can only map whole pages starting at page boundaries, so the
/// *physical* mapping usually starts a few bytes before the requested
/// offset. `MappedRegion` keeps track of both: [`data`](Self::data) and
/// friends expose exactly the *logical* range that was asked for, while
/// [`base_ptr`](Self::base_ptr) and [`base_len`](Self::base_len) describe
/// the physical mapping underneath.
///
/// A region starts out empty. [`create`](Self::create) fills it exactly
/// once. The mapping is released when the region is dropped, which also
/// covers replacing it by assignment. Moving a region moves ownership of
/// the mapping; [`take`](Self::take) moves it out and leaves the source
/// empty. There is no `Clone`.
///
/// The mapping is shared with every other mapper of the same file. As with
/// any shared mapping, the bytes may change underneath the returned slices
/// if another process writes to the file.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use mapped_region::MappedRegion;
///
/// let file = File::open("data.bin")?;
/// let mut region = MappedRegion::new();
/// region.create(Some("data.bin"), &file, 4100, 50, true)?;
///
/// assert_eq!(region.data()?.len(), 50);
/// assert_eq!(region.data_offset(), 4100);
/// # Ok::<(), mapped_region::MapError>(())
/// ```
#[derive(Default)]
pub struct MappedRegion {
    name: Option<String>,
    mapping: Option<RawMapping>,
    data_offset: u64,
    data_len: usize,
    adjust: usize,
    read_only: bool,
}

// SAFETY: the region exclusively owns its mapping. Shared references only
// hand out read access; writes need `&mut self`.
unsafe impl Send for MappedRegion {}
// SAFETY: see above.
unsafe impl Sync for MappedRegion {}

impl fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedRegion")
            .field("name", &self.name)
            .field("mapped", &self.is_mapped())
            .field("read_only", &self.read_only)
            .field("data_offset", &self.data_offset)
            .field("data_len", &self.data_len)
            .field("base_len", &self.base_len())
            .finish()
    }
}

impl MappedRegion {
    /// Create an empty region that holds no mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `[offset, offset + len)` of `file`.
    ///
    /// The file must be open for reading, and for writing too unless
    /// `read_only` is set. It is only borrowed while the mapping is set up;
    /// closing it afterwards does not affect the mapping. `name` is copied
    /// and kept for diagnostics.
    ///
    /// On failure the region stays empty and nothing is leaked.
    ///
    /// # Errors
    ///
    /// Returns `MapError::AlreadyMapped` if this region already holds a mapping.
    /// Returns `MapError::InvalidLength` if `len` is zero.
    /// Returns `MapError::PageSize` if the page size cannot be determined.
    /// Returns `MapError::RangeOverflow` if the range does not fit.
    /// Returns `MapError::OutOfBounds` if the range extends past end-of-file
    /// (regular files only).
    /// Returns `MapError::Io` if the file length cannot be queried.
    /// Returns `MapError::MapFailed` if the OS refuses the mapping.
    pub fn create<H: AsMapHandle + ?Sized>(
        &mut self,
        name: Option<&str>,
        file: &H,
        offset: u64,
        len: usize,
        read_only: bool,
    ) -> Result<()> {
        if self.mapping.is_some() {
            return Err(MapError::AlreadyMapped);
        }
        if len == 0 {
            return Err(MapError::InvalidLength(ERR_ZERO_LENGTH));
        }

        let span = page_span(offset, len, page_size()?)?;
        let handle = file.as_map_handle();
        // Handles without a length (devices, pseudo files) are not bounds-checked.
        if let Some(total) = Platform::file_len(handle)? {
            ensure_in_bounds(offset, len as u64, total)?;
        }

        // SAFETY: `span.offset` is aligned to the granularity reported by the
        // backend, and the handle is borrowed for the duration of the call.
        let mapping = unsafe { Platform::map(handle, span.offset, span.len, read_only) }
            .map_err(|source| {
                log::error!(
                    "map({}, {}) failed for {}: {source}",
                    span.offset,
                    span.len,
                    name.unwrap_or("<unnamed>")
                );
                MapError::MapFailed {
                    offset: span.offset,
                    len: span.len,
                    source,
                }
            })?;

        log::trace!(
            "MAP: base {:p}/{} data {:p}/{}",
            mapping.base,
            mapping.len,
            // SAFETY: adjust < span.len, so the result stays inside the mapping.
            unsafe { mapping.base.as_ptr().add(span.adjust) },
            len
        );

        self.name = name.map(str::to_owned);
        self.mapping = Some(mapping);
        self.data_offset = offset;
        self.data_len = len;
        self.adjust = span.adjust;
        self.read_only = read_only;
        Ok(())
    }

    /// Move the mapping out, leaving this region empty.
    ///
    /// Dropping the emptied region afterwards releases nothing.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Whether a mapping is currently held.
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    /// Whether the mapping was created read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Label given at creation, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// File offset of the first logical byte.
    #[must_use]
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Number of logical bytes.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Distance between the physical base and the logical start.
    #[must_use]
    pub fn page_adjust(&self) -> usize {
        self.adjust
    }

    /// Pointer to the first logical byte, or null when empty.
    #[must_use]
    pub fn data_ptr(&self) -> *const u8 {
        match &self.mapping {
            // SAFETY: adjust is strictly inside the mapping.
            Some(m) => unsafe { m.base.as_ptr().add(self.adjust).cast_const() },
            None => ptr::null(),
        }
    }

    /// Start of the physical mapping, or null when empty.
    ///
    /// Meant for passing to external advisory or locking APIs together with
    /// [`base_len`](Self::base_len).
    #[must_use]
    pub fn base_ptr(&self) -> *const u8 {
        self.mapping
            .as_ref()
            .map_or(ptr::null(), |m| m.base.as_ptr().cast_const())
    }

    /// Length of the physical mapping (0 when empty).
    #[must_use]
    pub fn base_len(&self) -> usize {
        self.mapping.as_ref().map_or(0, |m| m.len)
    }

    /// The logical bytes.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotMapped` if the region is empty.
    pub fn data(&self) -> Result<&[u8]> {
        let mapping = self.mapping.as_ref().ok_or(MapError::NotMapped)?;
        // SAFETY: [adjust, adjust + data_len) lies inside the live mapping and
        // inside the file (checked at creation for regular files).
        Ok(unsafe {
            std::slice::from_raw_parts(mapping.base.as_ptr().add(self.adjust), self.data_len)
        })
    }

    /// The logical bytes, writable. Writes go straight to the shared mapping.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotMapped` if the region is empty.
    /// Returns `MapError::InvalidMode` if the mapping is read-only.
    pub fn data_mut(&mut self) -> Result<&mut [u8]> {
        let mapping = self.mapping.as_ref().ok_or(MapError::NotMapped)?;
        if self.read_only {
            return Err(MapError::InvalidMode("mutable access on read-only mapping"));
        }
        // SAFETY: as in `data`, plus the mapping is writable and `&mut self`
        // guarantees exclusive access.
        Ok(unsafe {
            std::slice::from_raw_parts_mut(mapping.base.as_ptr().add(self.adjust), self.data_len)
        })
    }

    pub(crate) fn raw(&self) -> Option<&RawMapping> {
        self.mapping.as_ref()
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        if let Some(mapping) = self.mapping.take() {
            // SAFETY: taken out of `self`, so it is released exactly once, and
            // no borrow of `self` can be alive during drop.
            match unsafe { Platform::unmap(&mapping) } {
                Ok(()) => log::trace!("UNMAP: base {:p}/{}", mapping.base, mapping.len),
                Err(err) => log::warn!(
                    "unmap({:p}, {}) failed: {err}",
                    mapping.base,
                    mapping.len
                ),
            }
        }
    }
}
