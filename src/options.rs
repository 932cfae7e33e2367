//! Builder for mapping a region with named options.

use crate::errors::{MapError, Result};
use crate::region::MappedRegion;
use crate::sys::{AsMapHandle, MapBackend, Platform};

const ERR_NO_FILE_LENGTH: &str = "Length must be given for files without a size";

/// Options for mapping a region of a file.
///
/// Defaults: offset 0, length "up to end of file", read-only, no name.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use mapped_region::MapOptions;
///
/// let file = File::open("assets.pak")?;
/// let region = MapOptions::new()
///     .name("assets.pak")
///     .offset(4096)
///     .len(100)
///     .map(&file)?;
/// assert_eq!(region.data()?.len(), 100);
/// # Ok::<(), mapped_region::MapError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MapOptions {
    name: Option<String>,
    offset: u64,
    len: Option<usize>,
    read_only: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MapOptions {
    /// Start from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            offset: 0,
            len: None,
            read_only: true,
        }
    }

    /// Label kept on the region for diagnostics.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// File offset of the first byte to map.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Number of bytes to map. When unset, maps from the offset to end of file.
    #[must_use]
    pub fn len(mut self, len: usize) -> Self {
        self.len = Some(len);
        self
    }

    /// Map read-only (`true`, the default) or read-write.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Map the configured range of `file` into a new region.
    ///
    /// # Errors
    ///
    /// Returns `MapError::OutOfBounds` if the offset lies past end-of-file
    /// and no length was given.
    /// Returns `MapError::InvalidLength` if no length was given and the file
    /// has no size (a device, for instance).
    /// Plus every error of [`MappedRegion::create`].
    pub fn map<H: AsMapHandle + ?Sized>(&self, file: &H) -> Result<MappedRegion> {
        let len = match self.len {
            Some(len) => len,
            None => self.remaining_len(file)?,
        };
        let mut region = MappedRegion::new();
        region.create(self.name.as_deref(), file, self.offset, len, self.read_only)?;
        Ok(region)
    }

    fn remaining_len<H: AsMapHandle + ?Sized>(&self, file: &H) -> Result<usize> {
        let total = Platform::file_len(file.as_map_handle())?
            .ok_or(MapError::InvalidLength(ERR_NO_FILE_LENGTH))?;
        let remaining = total
            .checked_sub(self.offset)
            .ok_or(MapError::OutOfBounds {
                offset: self.offset,
                len: 0,
                total,
            })?;
        usize::try_from(remaining).map_err(|_| MapError::RangeOverflow {
            offset: self.offset,
            len: remaining,
        })
    }
}
