//! File-mapping section + view backend.

use std::io;
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};

#[cfg(feature = "advise")]
use crate::advise::MapAdvice;

use super::{MapBackend, RawMapHandle, RawMapping};

type Handle = *mut core::ffi::c_void;

/// Section object backing the view; closed after the view is unmapped.
pub(crate) type Section = Handle;

const PAGE_READONLY: u32 = 0x02;
const PAGE_READWRITE: u32 = 0x04;
const FILE_MAP_WRITE: u32 = 0x0002;
const FILE_MAP_READ: u32 = 0x0004;

#[allow(non_snake_case)]
#[repr(C)]
struct SYSTEM_INFO {
    wProcessorArchitecture: u16,
    wReserved: u16,
    dwPageSize: u32,
    lpMinimumApplicationAddress: *mut core::ffi::c_void,
    lpMaximumApplicationAddress: *mut core::ffi::c_void,
    dwActiveProcessorMask: usize,
    dwNumberOfProcessors: u32,
    dwProcessorType: u32,
    dwAllocationGranularity: u32,
    wProcessorLevel: u16,
    wProcessorRevision: u16,
}

extern "system" {
    fn GetSystemInfo(lpSystemInfo: *mut SYSTEM_INFO);
    fn GetFileSizeEx(hFile: Handle, lpFileSize: *mut i64) -> i32;
    fn CreateFileMappingW(
        hFile: Handle,
        lpFileMappingAttributes: *const core::ffi::c_void,
        flProtect: u32,
        dwMaximumSizeHigh: u32,
        dwMaximumSizeLow: u32,
        lpName: *const u16,
    ) -> Handle;
    fn MapViewOfFile(
        hFileMappingObject: Handle,
        dwDesiredAccess: u32,
        dwFileOffsetHigh: u32,
        dwFileOffsetLow: u32,
        dwNumberOfBytesToMap: usize,
    ) -> *mut core::ffi::c_void;
    fn UnmapViewOfFile(lpBaseAddress: *const core::ffi::c_void) -> i32;
    fn CloseHandle(hObject: Handle) -> i32;
}

pub(crate) struct Windows;

impl MapBackend for Windows {
    fn granularity() -> io::Result<usize> {
        let mut sysinfo = MaybeUninit::<SYSTEM_INFO>::uninit();
        // SAFETY: GetSystemInfo always fills the structure.
        let info = unsafe {
            GetSystemInfo(sysinfo.as_mut_ptr());
            sysinfo.assume_init()
        };
        match info.dwAllocationGranularity {
            0 => Err(io::Error::new(
                io::ErrorKind::Other,
                "GetSystemInfo reported zero allocation granularity",
            )),
            g => Ok(g as usize),
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn file_len(handle: RawMapHandle) -> io::Result<Option<u64>> {
        let mut size = 0i64;
        // SAFETY: GetFileSizeEx only writes into `size`.
        if unsafe { GetFileSizeEx(handle, &mut size) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Some(size.max(0) as u64))
    }

    #[allow(clippy::cast_possible_truncation)]
    unsafe fn map(
        handle: RawMapHandle,
        offset: u64,
        len: usize,
        read_only: bool,
    ) -> io::Result<RawMapping> {
        let protect = if read_only { PAGE_READONLY } else { PAGE_READWRITE };
        let section = CreateFileMappingW(handle, ptr::null(), protect, 0, 0, ptr::null());
        if section.is_null() {
            return Err(io::Error::last_os_error());
        }

        let access = if read_only {
            FILE_MAP_READ
        } else {
            FILE_MAP_READ | FILE_MAP_WRITE
        };
        let view = MapViewOfFile(
            section,
            access,
            (offset >> 32) as u32,
            offset as u32,
            len,
        );
        let Some(base) = NonNull::new(view.cast::<u8>()) else {
            let err = io::Error::last_os_error();
            CloseHandle(section);
            return Err(err);
        };

        Ok(RawMapping { base, len, section })
    }

    unsafe fn unmap(mapping: &RawMapping) -> io::Result<()> {
        let unmapped = UnmapViewOfFile(mapping.base.as_ptr().cast());
        let err = (unmapped == 0).then(io::Error::last_os_error);
        // The section must go even when the view could not be unmapped.
        CloseHandle(mapping.section);
        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[cfg(feature = "advise")]
    unsafe fn advise(_mapping: &RawMapping, _advice: MapAdvice) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no access-pattern advice facility on Windows",
        ))
    }
}
