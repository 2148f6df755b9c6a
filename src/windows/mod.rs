//! Named shared-memory access on Windows.
//!
//! Thin wrapper over `OpenFileMappingW`/`MapViewOfFile` used by the sensor
//! sources. The mapped regions belong to external producers (GPU-Z, AIDA64);
//! this module only opens, copies, and unmaps — it never writes.

use std::ptr::NonNull;

use tracing::trace;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    FILE_MAP_ALL_ACCESS, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    OpenFileMappingW, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use crate::{BridgeError, Result};

/// Access mode requested when opening a named mapping.
///
/// GPU-Z publishes its region for read-write access and refuses read-only
/// opens; AIDA64 is opened read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAccess {
    ReadOnly,
    ReadWrite,
}

/// An open view of a named shared-memory region.
pub struct SharedMemoryRegion {
    mapping: HANDLE,
    base: NonNull<u8>,
}

impl SharedMemoryRegion {
    /// Open a named mapping object and map a view of it.
    ///
    /// `len` bytes are mapped; pass 0 to map the whole section (used when the
    /// producer does not publish a fixed size).
    pub fn open(name: &str, access: RegionAccess, len: usize) -> Result<Self> {
        trace!(name, ?access, len, "Opening shared-memory region");

        let desired = match access {
            RegionAccess::ReadOnly => FILE_MAP_READ,
            RegionAccess::ReadWrite => FILE_MAP_ALL_ACCESS,
        };

        let mapping = unsafe {
            let wide_name = wide_string(name);
            OpenFileMappingW(desired.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
                .map_err(|e| BridgeError::windows_api_error("OpenFileMappingW", e))?
        };

        let base = unsafe {
            let ptr = MapViewOfFile(mapping, desired, 0, 0, len);
            match NonNull::new(ptr.Value as *mut u8) {
                Some(base) => base,
                None => {
                    let win_err = windows::core::Error::from_thread();
                    let _ = CloseHandle(mapping);
                    return Err(BridgeError::windows_api_error("MapViewOfFile", win_err));
                }
            }
        };

        Ok(Self { mapping, base })
    }

    /// Copy `len` bytes out of the mapped view.
    ///
    /// The caller is responsible for `len` not exceeding the mapped size; the
    /// producers here publish fixed layouts, so the size is known up front.
    pub fn copy_bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        unsafe {
            std::ptr::copy_nonoverlapping(self.base.as_ptr(), buf.as_mut_ptr(), len);
        }
        buf
    }

    /// Copy bytes up to (not including) the first NUL, capped at `max` bytes.
    ///
    /// Used for text-format regions that are NUL-terminated C strings of
    /// unpublished length.
    pub fn copy_until_nul(&self, max: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        unsafe {
            for offset in 0..max {
                let byte = *self.base.as_ptr().add(offset);
                if byte == 0 {
                    break;
                }
                buf.push(byte);
            }
        }
        buf
    }
}

impl Drop for SharedMemoryRegion {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: the struct only holds a Windows handle and a mapped pointer that
// are valid for read access from any thread.
unsafe impl Send for SharedMemoryRegion {}
unsafe impl Sync for SharedMemoryRegion {}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    #[test]
    fn missing_region_reports_windows_api_error() {
        let err = SharedMemoryRegion::open("thermolink-no-such-region", RegionAccess::ReadOnly, 0)
            .unwrap_err();
        assert!(matches!(err, BridgeError::WindowsApi { .. }));
    }

    #[test]
    fn wide_string_is_nul_terminated() {
        let wide = wide_string("GPUZShMem");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide.len(), "GPUZShMem".len() + 1);
    }
}
