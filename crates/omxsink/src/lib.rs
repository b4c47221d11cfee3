// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! omxsink for Rust
//!
//! Safe control of the Raspberry Pi OpenMAX `video_render` component: bringing
//! it from an uninitialized state through buffer allocation, port enablement
//! and execution, and streaming raw video frames into hardware-owned buffers
//! for display.
//!
//! The component is asynchronous by nature. This crate drives it with
//! synchronous, bounded polling instead of callbacks, owns the pool of
//! hardware buffers exclusively, and tears everything down best-effort so a
//! partially failing teardown still releases what it can.
//!
//! # Quick Start
//!
//! ```no_run
//! use omxsink::display::Display;
//! use omxsink::omx::OmxPlatform;
//!
//! let mut display = Display::new(OmxPlatform::new()?);
//! display.init()?;
//! display.enable(1280, 720, 1280)?;
//!
//! let frame = display.acquire_buffer()?;
//! let used = frame.len().min(1280 * 720 * 3 / 2);
//! frame[..used].fill(0x80);
//! display.submit_buffer(used)?;
//!
//! display.disable()?;
//! display.deinit()?;
//! # Ok::<(), omxsink::Error>(())
//! ```
//!
//! # Testing without hardware
//!
//! [`mock::MockPlatform`] implements the same traits in memory and records
//! every hardware call, see [`component`] for the seam.

use omxsink_sys as ffi;
use std::{error, fmt};

use crate::component::{Geometry, OmxError};

/// Resource required by an operation that has not been set up yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The component handle, created by `init`.
    Component,
    /// The buffer pool, allocated by `enable`.
    BufferPool,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resource::Component => write!(f, "component"),
            Resource::BufferPool => write!(f, "buffer pool"),
        }
    }
}

/// Error type for omxsink operations
#[derive(Debug)]
pub enum Error {
    /// libopenmaxil.so or libbcm_host.so could not be loaded at runtime
    LibraryNotLoaded(ffi::libloading::Error),

    /// The subsystem could not be initialized or the component handle could
    /// not be obtained
    ComponentCreation(OmxError),

    /// The operation needs a resource that does not exist yet
    NotInitialized(Resource),

    /// The hardware rejected a parameter read or write
    Configuration(OmxError),

    /// The port did not accept the requested geometry
    GeometryMismatch {
        requested: Geometry,
        reported: Geometry,
    },

    /// A hardware buffer could not be allocated
    OutOfMemory(OmxError),

    /// The operation is not valid in the current state
    InvalidState(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::LibraryNotLoaded(err) => {
                write!(f, "OpenMAX library could not be loaded: {}", err)
            }
            Error::ComponentCreation(err) => {
                write!(f, "failed to create video_render component: {}", err)
            }
            Error::NotInitialized(resource) => write!(f, "{} is not initialized", resource),
            Error::Configuration(err) => write!(f, "hardware rejected configuration: {}", err),
            Error::GeometryMismatch {
                requested,
                reported,
            } => write!(
                f,
                "could not set requested resolution {}, port reports {}",
                requested, reported
            ),
            Error::OutOfMemory(err) => write!(f, "buffer allocation failed: {}", err),
            Error::InvalidState(msg) => write!(f, "invalid state: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::LibraryNotLoaded(err) => Some(err),
            Error::ComponentCreation(err) => Some(err),
            Error::Configuration(err) => Some(err),
            Error::OutOfMemory(err) => Some(err),
            Error::NotInitialized(_) | Error::GeometryMismatch { .. } | Error::InvalidState(_) => {
                None
            }
        }
    }
}

impl From<ffi::libloading::Error> for Error {
    fn from(err: ffi::libloading::Error) -> Self {
        Error::LibraryNotLoaded(err)
    }
}

/// Helper macro to call through a component's function table.
/// Evaluates to `Result<(), OmxError>`.
macro_rules! omx_call {
    ($handle:expr, $method:ident($($args:expr),*)) => {
        {
            let handle: *mut $crate::ffi::OMX_COMPONENTTYPE = $handle;
            #[allow(clippy::macro_metavars_in_unsafe)]
            let result = match unsafe { (*handle).$method } {
                Some(method) => $crate::component::OmxError::check(unsafe {
                    method(handle as $crate::ffi::OMX_HANDLETYPE, $($args),*)
                }),
                None => Err($crate::component::OmxError::NOT_IMPLEMENTED),
            };
            result
        }
    };
}

/// The component module defines the hardware traits and value types.
pub mod component;

/// The timing module provides the delays used while driving the component.
pub mod timing;

/// The poller module provides bounded waits on state and port transitions.
pub mod poller;

/// The pool module owns the hardware buffers of the video port.
pub mod pool;

/// The display module provides the lifecycle controller and frame feed.
pub mod display;

/// The omx module implements the hardware traits on the VideoCore libraries.
pub mod omx;

/// The mock module implements the hardware traits in memory.
pub mod mock;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::GeometryMismatch {
            requested: Geometry::new(1920, 1080, 1920),
            reported: Geometry::new(1920, 1088, 1920),
        };
        assert_eq!(
            format!("{}", err),
            "could not set requested resolution 1920x1080 stride 1920, port reports 1920x1088 stride 1920"
        );
        assert_eq!(
            format!("{}", Error::NotInitialized(Resource::BufferPool)),
            "buffer pool is not initialized"
        );
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;

        let err = Error::OutOfMemory(OmxError::INSUFFICIENT_RESOURCES);
        assert!(err.source().is_some());
        assert!(Error::InvalidState("x").source().is_none());
    }
}
