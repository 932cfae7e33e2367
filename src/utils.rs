//! Utility helpers for page size discovery, alignment, and bounds checking.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{MapError, Result};
use crate::sys::{MapBackend, Platform};

// Zero means "not resolved yet". A failed lookup leaves it at zero.
static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

/// Get the mapping granularity in bytes.
///
/// On Unix this is the system page size. On Windows it is the allocation
/// granularity, because view offsets must be multiples of it.
///
/// The value is queried from the OS on first use and cached for the rest of
/// the process. A failed query is not cached, so the next call tries again.
///
/// # Errors
///
/// Returns `MapError::PageSize` if the OS does not report a usable value.
pub fn page_size() -> Result<usize> {
    let cached = PAGE_SIZE.load(Ordering::Acquire);
    if cached != 0 {
        return Ok(cached);
    }

    let size = Platform::granularity().map_err(|e| {
        log::error!("could not get page size: {e}");
        MapError::PageSize(e)
    })?;

    // Racing initializers compute the same value; first store wins.
    match PAGE_SIZE.compare_exchange(0, size, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => Ok(size),
        Err(existing) => Ok(existing),
    }
}

/// Page-aligned placement of a logical `[offset, offset + len)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    /// Distance from the aligned start to the logical start (`offset mod page`).
    pub adjust: usize,
    /// Aligned offset handed to the OS.
    pub offset: u64,
    /// Length handed to the OS (`len + adjust`).
    pub len: usize,
}

/// Compute the aligned span the OS must map to host `[offset, offset + len)`.
///
/// # Errors
///
/// Returns `MapError::InvalidLength` if `page` is zero.
/// Returns `MapError::RangeOverflow` if the adjusted length or the range end
/// does not fit.
pub fn page_span(offset: u64, len: usize, page: usize) -> Result<PageSpan> {
    if page == 0 {
        return Err(MapError::InvalidLength("page size must be greater than zero"));
    }
    let overflow = || MapError::RangeOverflow {
        offset,
        len: len as u64,
    };
    offset.checked_add(len as u64).ok_or_else(overflow)?;

    // Remainder is < page, which itself fits usize.
    #[allow(clippy::cast_possible_truncation)]
    let adjust = (offset % page as u64) as usize;
    let adj_len = len.checked_add(adjust).ok_or_else(overflow)?;

    Ok(PageSpan {
        adjust,
        offset: offset - adjust as u64,
        len: adj_len,
    })
}

/// Ensure the requested [offset, offset+len) range is within [0, total).
/// Returns `Ok(())` if valid; otherwise an `OutOfBounds` error.
///
/// # Errors
///
/// Returns `MapError::OutOfBounds` if the range exceeds bounds.
pub fn ensure_in_bounds(offset: u64, len: u64, total: u64) -> Result<()> {
    if offset > total {
        return Err(MapError::OutOfBounds { offset, len, total });
    }
    let end = offset.saturating_add(len);
    if end > total {
        return Err(MapError::OutOfBounds { offset, len, total });
    }
    Ok(())
}
