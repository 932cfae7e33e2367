//! Memory advise operations for optimizing OS behavior.

#[cfg(feature = "advise")]
use crate::errors::{MapError, Result};
#[cfg(feature = "advise")]
use crate::region::MappedRegion;
#[cfg(feature = "advise")]
use crate::sys::{MapBackend, Platform};

/// Memory access pattern advice for the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAdvice {
    /// Normal access pattern (default).
    Normal,
    /// Random access pattern.
    Random,
    /// Sequential access pattern.
    Sequential,
    /// Will need this range soon.
    WillNeed,
    /// Won't need this range soon.
    DontNeed,
}

impl MapAdvice {
    /// Every hint, in declaration order.
    pub const ALL: [MapAdvice; 5] = [
        MapAdvice::Normal,
        MapAdvice::Random,
        MapAdvice::Sequential,
        MapAdvice::WillNeed,
        MapAdvice::DontNeed,
    ];
}

#[cfg(feature = "advise")]
impl MappedRegion {
    /// Advise the OS about the expected access pattern of this region.
    ///
    /// The hint covers the whole physical mapping, including the leading
    /// bytes before the logical start. It never changes what the mapping
    /// contains or whether it stays valid.
    ///
    /// # Platform-specific behavior
    ///
    /// - **Unix**: Uses `madvise` system call
    /// - **Windows**: Always fails with `MapError::Unsupported`
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotMapped` if the region holds no mapping.
    /// Returns `MapError::AdviceFailed` if the system call fails.
    /// Returns `MapError::Unsupported` if the platform has no advice facility.
    pub fn advise(&self, advice: MapAdvice) -> Result<()> {
        let mapping = self.raw().ok_or(MapError::NotMapped)?;

        // SAFETY: the mapping is live for as long as `self` is borrowed.
        let result = unsafe { Platform::advise(mapping, advice) };
        result.map_err(|err| {
            log::warn!(
                "advise({advice:?}) on {:p}/{} failed: {err}",
                mapping.base,
                mapping.len
            );
            if err.kind() == std::io::ErrorKind::Unsupported {
                MapError::Unsupported("memory advice")
            } else {
                MapError::AdviceFailed(format!("{advice:?}: {err}"))
            }
        })
    }
}
