// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! VideoCore implementation of the hardware traits.
//!
//! [`OmxPlatform`] loads `libbcm_host.so` and `libopenmaxil.so` at runtime
//! and creates components through the IL core. Component calls go through
//! the component's function table.
//!
//! Command completions arrive on a VideoCore thread through the event
//! callback. They are only logged; the controller learns about transitions
//! by polling.

use crate::{
    component::{
        Buffer, BufferFlags, BufferHeader, Command, Component, DisplayRegion, OmxError, Platform,
        PortDefinition, State,
    },
    Error,
};
use omxsink_sys as ffi;
use std::{
    ffi::CString,
    fmt, mem,
    ptr::{self, NonNull},
};

/// IL structure header fields every parameter block starts with.
trait IlStruct: Sized {
    fn header(&mut self) -> (&mut ffi::OMX_U32, &mut ffi::OMX_VERSIONTYPE, &mut ffi::OMX_U32);

    /// A zeroed block with size, version and port index filled in.
    fn for_port(port: u32) -> Self {
        // SAFETY: IL parameter blocks are plain C structs for which all-zero
        // is a valid bit pattern (null pointers, zero integers).
        let mut block: Self = unsafe { mem::zeroed() };
        let (size, version, port_index) = block.header();
        *size = mem::size_of::<Self>() as ffi::OMX_U32;
        version.nVersion = ffi::OMX_VERSION;
        *port_index = port;
        block
    }
}

impl IlStruct for ffi::OMX_PARAM_PORTDEFINITIONTYPE {
    fn header(&mut self) -> (&mut ffi::OMX_U32, &mut ffi::OMX_VERSIONTYPE, &mut ffi::OMX_U32) {
        (&mut self.nSize, &mut self.nVersion, &mut self.nPortIndex)
    }
}

impl IlStruct for ffi::OMX_CONFIG_DISPLAYREGIONTYPE {
    fn header(&mut self) -> (&mut ffi::OMX_U32, &mut ffi::OMX_VERSIONTYPE, &mut ffi::OMX_U32) {
        (&mut self.nSize, &mut self.nVersion, &mut self.nPortIndex)
    }
}

/// Asynchronous notification delivered by the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A command finished; `data` is the new state for state-set commands
    /// and the port for the others.
    CommandComplete { command: u32, data: u32 },
    Error(OmxError),
    Mark,
    PortSettingsChanged { port: u32 },
    BufferFlag { port: u32, flags: BufferFlags },
    ParamOrConfigChanged { index: u32 },
    Unknown { event: u32, data1: u32, data2: u32 },
}

impl Event {
    pub fn from_raw(event: ffi::OMX_EVENTTYPE, data1: u32, data2: u32) -> Self {
        match event {
            ffi::OMX_EVENTTYPE_OMX_EventCmdComplete => Event::CommandComplete {
                command: data1,
                data: data2,
            },
            ffi::OMX_EVENTTYPE_OMX_EventError => Event::Error(OmxError(data1)),
            ffi::OMX_EVENTTYPE_OMX_EventMark => Event::Mark,
            ffi::OMX_EVENTTYPE_OMX_EventPortSettingsChanged => {
                Event::PortSettingsChanged { port: data1 }
            }
            ffi::OMX_EVENTTYPE_OMX_EventBufferFlag => Event::BufferFlag {
                port: data1,
                flags: BufferFlags(data2),
            },
            ffi::OMX_EVENTTYPE_OMX_EventParamOrConfigChanged => {
                Event::ParamOrConfigChanged { index: data2 }
            }
            _ => Event::Unknown {
                event,
                data1,
                data2,
            },
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::CommandComplete { command, data } => match *command {
                ffi::OMX_COMMANDTYPE_OMX_CommandStateSet => {
                    write!(f, "state set to {}", State::from_raw(*data))
                }
                ffi::OMX_COMMANDTYPE_OMX_CommandFlush => write!(f, "port {} flushed", data),
                ffi::OMX_COMMANDTYPE_OMX_CommandPortDisable => {
                    write!(f, "port {} disabled", data)
                }
                ffi::OMX_COMMANDTYPE_OMX_CommandPortEnable => write!(f, "port {} enabled", data),
                _ => write!(f, "command {} complete ({})", command, data),
            },
            Event::Error(err) => write!(f, "error {}", err),
            Event::Mark => write!(f, "mark"),
            Event::PortSettingsChanged { port } => write!(f, "port {} settings changed", port),
            Event::BufferFlag { port, flags } => {
                write!(f, "buffer flag 0x{:x} on port {}", flags.0, port)
            }
            Event::ParamOrConfigChanged { index } => {
                write!(f, "parameter 0x{:08x} changed", index)
            }
            Event::Unknown {
                event,
                data1,
                data2,
            } => write!(f, "event 0x{:08x} ({}, {})", event, data1, data2),
        }
    }
}

unsafe extern "C" fn event_handler(
    _component: ffi::OMX_HANDLETYPE,
    _app_data: ffi::OMX_PTR,
    event: ffi::OMX_EVENTTYPE,
    data1: ffi::OMX_U32,
    data2: ffi::OMX_U32,
    _event_data: ffi::OMX_PTR,
) -> ffi::OMX_ERRORTYPE {
    match Event::from_raw(event, data1, data2) {
        Event::Error(err) if err == OmxError::SAME_STATE => log::trace!("video_render: {}", err),
        ev @ Event::Error(_) => log::warn!("video_render: {}", ev),
        ev => log::trace!("video_render: {}", ev),
    }
    ffi::OMX_ERRORTYPE_OMX_ErrorNone
}

unsafe extern "C" fn buffer_done(
    _component: ffi::OMX_HANDLETYPE,
    _app_data: ffi::OMX_PTR,
    _buffer: *mut ffi::OMX_BUFFERHEADERTYPE,
) -> ffi::OMX_ERRORTYPE {
    ffi::OMX_ERRORTYPE_OMX_ErrorNone
}

fn callbacks() -> ffi::OMX_CALLBACKTYPE {
    ffi::OMX_CALLBACKTYPE {
        EventHandler: Some(event_handler),
        EmptyBufferDone: Some(buffer_done),
        FillBufferDone: Some(buffer_done),
    }
}

/// The VideoCore IL core.
///
/// # Examples
///
/// ```no_run
/// use omxsink::component::Platform;
/// use omxsink::display::VIDEO_RENDER_COMPONENT;
/// use omxsink::omx::OmxPlatform;
///
/// let mut platform = OmxPlatform::new()?;
/// platform.initialize()?;
/// let component = platform.create_component(VIDEO_RENDER_COMPONENT)?;
/// platform.destroy_component(component)?;
/// platform.deinitialize()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct OmxPlatform {
    lib: &'static ffi::OmxLibrary,
    callbacks: Box<ffi::OMX_CALLBACKTYPE>,
}

impl fmt::Debug for OmxPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OmxPlatform").finish_non_exhaustive()
    }
}

impl OmxPlatform {
    /// Loads the VideoCore libraries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LibraryNotLoaded`] if either library or one of the
    /// required symbols is missing.
    pub fn new() -> Result<Self, Error> {
        Ok(OmxPlatform {
            lib: ffi::init()?,
            callbacks: Box::new(callbacks()),
        })
    }
}

impl Platform for OmxPlatform {
    type Component = OmxComponent;

    fn initialize(&mut self) -> Result<(), OmxError> {
        // SAFETY: both libraries were resolved in `new`.
        unsafe { self.lib.bcm_host_init() };
        OmxError::check(unsafe { self.lib.OMX_Init() })?;
        log::debug!("OpenMAX IL core initialized");
        Ok(())
    }

    fn create_component(&mut self, name: &str) -> Result<OmxComponent, OmxError> {
        let name = CString::new(name).map_err(|_| OmxError::BAD_PARAMETER)?;
        let mut handle: ffi::OMX_HANDLETYPE = ptr::null_mut();
        // SAFETY: the name outlives the call and the callback table is boxed
        // for the lifetime of the platform, which outlives its components.
        OmxError::check(unsafe {
            self.lib.OMX_GetHandle(
                &mut handle,
                name.as_ptr() as ffi::OMX_STRING,
                ptr::null_mut(),
                &mut *self.callbacks,
            )
        })?;

        match NonNull::new(handle as *mut ffi::OMX_COMPONENTTYPE) {
            Some(handle) => Ok(OmxComponent { handle }),
            None => Err(OmxError::INSUFFICIENT_RESOURCES),
        }
    }

    fn destroy_component(&mut self, component: OmxComponent) -> Result<(), OmxError> {
        // SAFETY: the handle came from OMX_GetHandle and is released once.
        OmxError::check(unsafe {
            self.lib
                .OMX_FreeHandle(component.handle.as_ptr() as ffi::OMX_HANDLETYPE)
        })
    }

    fn deinitialize(&mut self) -> Result<(), OmxError> {
        let result = OmxError::check(unsafe { self.lib.OMX_Deinit() });
        unsafe { self.lib.bcm_host_deinit() };
        result
    }
}

/// A component handle obtained from the IL core.
#[derive(Debug)]
pub struct OmxComponent {
    handle: NonNull<ffi::OMX_COMPONENTTYPE>,
}

unsafe impl Send for OmxComponent {}

impl OmxComponent {
    fn raw(&self) -> *mut ffi::OMX_COMPONENTTYPE {
        self.handle.as_ptr()
    }

    fn raw_port_definition(&self, port: u32) -> Result<ffi::OMX_PARAM_PORTDEFINITIONTYPE, OmxError> {
        let mut definition = ffi::OMX_PARAM_PORTDEFINITIONTYPE::for_port(port);
        omx_call!(
            self.raw(),
            GetParameter(
                ffi::OMX_INDEXTYPE_OMX_IndexParamPortDefinition,
                &mut definition as *mut _ as ffi::OMX_PTR
            )
        )?;
        Ok(definition)
    }
}

impl Component for OmxComponent {
    type Buffer = OmxBuffer;

    fn state(&mut self) -> Result<State, OmxError> {
        let mut state: ffi::OMX_STATETYPE = ffi::OMX_STATETYPE_OMX_StateInvalid;
        omx_call!(self.raw(), GetState(&mut state))?;
        Ok(State::from_raw(state))
    }

    fn send_command(&mut self, command: Command) -> Result<(), OmxError> {
        log::trace!("sending {}", command);
        let (cmd, param) = command.to_raw();
        omx_call!(self.raw(), SendCommand(cmd, param, ptr::null_mut()))
    }

    fn port_definition(&mut self, port: u32) -> Result<PortDefinition, OmxError> {
        let raw = self.raw_port_definition(port)?;
        // SAFETY: the video render input port is a video domain port.
        let video = unsafe { raw.format.video };
        Ok(PortDefinition {
            port: raw.nPortIndex,
            width: video.nFrameWidth,
            height: video.nFrameHeight,
            stride: video.nStride,
            slice_height: video.nSliceHeight,
            buffer_count: raw.nBufferCountActual,
            buffer_count_min: raw.nBufferCountMin,
            buffer_size: raw.nBufferSize,
            enabled: raw.bEnabled != 0,
            populated: raw.bPopulated != 0,
        })
    }

    fn set_port_definition(&mut self, definition: &PortDefinition) -> Result<(), OmxError> {
        let mut raw = self.raw_port_definition(definition.port)?;
        raw.format.video.nFrameWidth = definition.width;
        raw.format.video.nFrameHeight = definition.height;
        raw.format.video.nStride = definition.stride;
        raw.format.video.nSliceHeight = definition.slice_height;
        raw.bEnabled = definition.enabled as ffi::OMX_BOOL;
        omx_call!(
            self.raw(),
            SetParameter(
                ffi::OMX_INDEXTYPE_OMX_IndexParamPortDefinition,
                &mut raw as *mut _ as ffi::OMX_PTR
            )
        )
    }

    fn set_display_region(&mut self, port: u32, region: &DisplayRegion) -> Result<(), OmxError> {
        let mut raw = ffi::OMX_CONFIG_DISPLAYREGIONTYPE::for_port(port);
        raw.set = region.fields.bits();
        raw.fullscreen = region.fullscreen as ffi::OMX_BOOL;
        raw.transform = region.rotation.to_raw();
        raw.mode = region.mode.to_raw();
        raw.dest_rect = ffi::OMX_DISPLAYRECTTYPE {
            x_offset: region.dest_rect.x,
            y_offset: region.dest_rect.y,
            width: region.dest_rect.width,
            height: region.dest_rect.height,
        };
        omx_call!(
            self.raw(),
            SetConfig(
                ffi::OMX_INDEXTYPE_OMX_IndexConfigDisplayRegion,
                &mut raw as *mut _ as ffi::OMX_PTR
            )
        )
    }

    fn allocate_buffer(&mut self, port: u32, size: u32) -> Result<OmxBuffer, OmxError> {
        let mut header: *mut ffi::OMX_BUFFERHEADERTYPE = ptr::null_mut();
        omx_call!(
            self.raw(),
            AllocateBuffer(&mut header, port, ptr::null_mut(), size)
        )?;
        NonNull::new(header)
            .map(|header| OmxBuffer { header })
            .ok_or(OmxError::INSUFFICIENT_RESOURCES)
    }

    fn free_buffer(&mut self, port: u32, buffer: OmxBuffer) -> Result<(), OmxError> {
        omx_call!(self.raw(), FreeBuffer(port, buffer.header.as_ptr()))
    }

    fn empty_buffer(&mut self, buffer: &mut OmxBuffer) -> Result<(), OmxError> {
        omx_call!(self.raw(), EmptyThisBuffer(buffer.header.as_ptr()))
    }
}

/// Buffer header allocated by the component. Freed through
/// [`Component::free_buffer`], never on drop.
#[derive(Debug)]
pub struct OmxBuffer {
    header: NonNull<ffi::OMX_BUFFERHEADERTYPE>,
}

unsafe impl Send for OmxBuffer {}

impl OmxBuffer {
    fn raw(&self) -> &ffi::OMX_BUFFERHEADERTYPE {
        // SAFETY: the header stays valid until the buffer is freed, which
        // consumes self.
        unsafe { self.header.as_ref() }
    }
}

impl Buffer for OmxBuffer {
    fn capacity(&self) -> u32 {
        self.raw().nAllocLen
    }

    fn data(&mut self) -> &mut [u8] {
        let raw = self.raw();
        if raw.pBuffer.is_null() {
            return &mut [];
        }
        // SAFETY: pBuffer points at nAllocLen bytes owned by the header, and
        // the returned slice borrows self mutably.
        unsafe { std::slice::from_raw_parts_mut(raw.pBuffer, raw.nAllocLen as usize) }
    }

    fn header(&self) -> BufferHeader {
        let raw = self.raw();
        BufferHeader {
            filled_len: raw.nFilledLen,
            offset: raw.nOffset,
            flags: BufferFlags(raw.nFlags),
            timestamp: ffi::ticks_to_i64(raw.nTimeStamp),
        }
    }

    fn set_header(&mut self, header: BufferHeader) {
        // SAFETY: see `raw`; &mut self gives exclusive access.
        let raw = unsafe { self.header.as_mut() };
        raw.nFilledLen = header.filled_len;
        raw.nOffset = header.offset;
        raw.nFlags = header.flags.0;
        raw.nTimeStamp = ffi::ticks_from_i64(header.timestamp);
    }
}
