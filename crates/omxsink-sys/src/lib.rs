// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::too_many_arguments)]

include!("ffi.rs");

// Re-export libloading for error handling
pub use libloading;

use std::sync::{Mutex, OnceLock};

static LIBRARY: OnceLock<OmxLibrary> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Default soname of the VideoCore OpenMAX IL core.
pub const OPENMAXIL_LIBRARY: &str = "libopenmaxil.so";

/// Default soname of the VideoCore host support library.
pub const BCM_HOST_LIBRARY: &str = "libbcm_host.so";

/// Initialize the OpenMAX IL bindings by loading libopenmaxil.so and
/// libbcm_host.so
///
/// This must be called before using any other OpenMAX function. Returns an
/// error if either library cannot be loaded.
///
/// The environment variables `OMXSINK_OPENMAXIL_LIBRARY` and
/// `OMXSINK_BCM_HOST_LIBRARY` can be used to specify custom paths to the
/// libraries. If not set, searches standard system paths.
pub fn init() -> Result<&'static OmxLibrary, libloading::Error> {
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }

    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    // Double-check after acquiring lock
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }

    let omx_path = std::env::var("OMXSINK_OPENMAXIL_LIBRARY")
        .ok()
        .unwrap_or_else(|| OPENMAXIL_LIBRARY.to_string());
    let bcm_host_path = std::env::var("OMXSINK_BCM_HOST_LIBRARY")
        .ok()
        .unwrap_or_else(|| BCM_HOST_LIBRARY.to_string());

    let lib = unsafe { OmxLibrary::new(omx_path.as_str(), bcm_host_path.as_str())? };

    Ok(LIBRARY.get_or_init(|| lib))
}

/// Try to get a reference to the loaded library without loading it
pub fn try_library() -> Option<&'static OmxLibrary> {
    LIBRARY.get()
}

/// Convert a signed 64-bit timestamp into the split `OMX_TICKS` layout.
pub const fn ticks_from_i64(value: i64) -> OMX_TICKS {
    OMX_TICKS {
        nLowPart: value as u64 as u32,
        nHighPart: ((value as u64) >> 32) as u32,
    }
}

/// Convert a split `OMX_TICKS` value back into a signed 64-bit timestamp.
pub const fn ticks_to_i64(ticks: OMX_TICKS) -> i64 {
    (((ticks.nHighPart as u64) << 32) | ticks.nLowPart as u64) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_word() {
        // 1.1.2.0 packed little end first, as OMX_VERSIONTYPE.nVersion
        assert_eq!(OMX_VERSION, 0x0002_0101);
    }

    #[test]
    fn test_ticks_zero() {
        let ticks = ticks_from_i64(0);
        assert_eq!(ticks, OMX_TICKS::default());
    }

    #[test]
    fn test_ticks_split() {
        let ticks = ticks_from_i64(0x0000_0001_8000_0002);
        assert_eq!(ticks.nLowPart, 0x8000_0002);
        assert_eq!(ticks.nHighPart, 0x0000_0001);
        assert_eq!(ticks_to_i64(ticks), 0x0000_0001_8000_0002);
    }

    #[test]
    fn test_ticks_negative() {
        let ticks = ticks_from_i64(-1);
        assert_eq!(ticks.nLowPart, u32::MAX);
        assert_eq!(ticks.nHighPart, u32::MAX);
        assert_eq!(ticks_to_i64(ticks), -1);
    }

    #[test]
    fn test_try_library_matches_init() {
        let loaded = init().is_ok();
        assert_eq!(try_library().is_some(), loaded);
    }

    #[test]
    fn test_missing_library() {
        let result = unsafe {
            OmxLibrary::new(
                "/nonexistent/libopenmaxil.so",
                "/nonexistent/libbcm_host.so",
            )
        };
        assert!(result.is_err());
    }
}
