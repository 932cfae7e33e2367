//! `mmap`-family backend.

use std::io;
use std::ptr::{self, NonNull};

#[cfg(feature = "advise")]
use crate::advise::MapAdvice;

use super::{MapBackend, RawMapHandle, RawMapping};

// glibc and bionic keep a 32-bit `off_t` on 32-bit targets; the *64 entry
// points take 64-bit offsets everywhere.
cfg_if::cfg_if! {
    if #[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "android"))] {
        use libc::{fstat64 as fstat, mmap64 as mmap, off64_t as Off, stat64 as Stat};
    } else {
        use libc::{fstat, mmap, off_t as Off, stat as Stat};
    }
}

fn to_off(offset: u64) -> io::Result<Off> {
    Off::try_from(offset).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "offset does not fit the platform file offset type",
        )
    })
}

pub(crate) struct Unix;

impl MapBackend for Unix {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn granularity() -> io::Result<usize> {
        // SAFETY: sysconf with _SC_PAGESIZE is safe to call.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "sysconf(_SC_PAGESIZE) returned no value",
            ));
        }
        Ok(page_size as usize)
    }

    #[allow(clippy::cast_sign_loss)]
    fn file_len(handle: RawMapHandle) -> io::Result<Option<u64>> {
        let mut stat = std::mem::MaybeUninit::<Stat>::uninit();
        // SAFETY: fstat only writes into the provided buffer.
        let rc = unsafe { fstat(handle, stat.as_mut_ptr()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: fstat succeeded, so the buffer is initialized.
        let stat = unsafe { stat.assume_init() };
        // Devices and pseudo files report a size of 0 but map fine.
        if stat.st_mode & libc::S_IFMT != libc::S_IFREG {
            return Ok(None);
        }
        Ok(Some(stat.st_size.max(0) as u64))
    }

    unsafe fn map(
        handle: RawMapHandle,
        offset: u64,
        len: usize,
        read_only: bool,
    ) -> io::Result<RawMapping> {
        let offset = to_off(offset)?;

        let mut prot = libc::PROT_READ;
        if !read_only {
            prot |= libc::PROT_WRITE;
        }

        let ptr = mmap(ptr::null_mut(), len, prot, libc::MAP_SHARED, handle, offset);
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let base = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned a null view"))?;
        Ok(RawMapping { base, len })
    }

    unsafe fn unmap(mapping: &RawMapping) -> io::Result<()> {
        if libc::munmap(mapping.base.as_ptr().cast(), mapping.len) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(feature = "advise")]
    unsafe fn advise(mapping: &RawMapping, advice: MapAdvice) -> io::Result<()> {
        use libc::{MADV_DONTNEED, MADV_NORMAL, MADV_RANDOM, MADV_SEQUENTIAL, MADV_WILLNEED};

        let advice_flag = match advice {
            MapAdvice::Normal => MADV_NORMAL,
            MapAdvice::Random => MADV_RANDOM,
            MapAdvice::Sequential => MADV_SEQUENTIAL,
            MapAdvice::WillNeed => MADV_WILLNEED,
            MapAdvice::DontNeed => MADV_DONTNEED,
        };

        if libc::madvise(mapping.base.as_ptr().cast(), mapping.len, advice_flag) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
