// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Hardware seam between the display controller and an OpenMAX component.
//!
//! The controller never talks to the IL core directly. It drives a
//! [`Platform`] (subsystem bring-up and component handles) and the
//! [`Component`] it creates. [`crate::omx`] implements these traits on top of
//! the VideoCore libraries and [`crate::mock`] implements them in memory.
//!
//! All hardware calls report failure as an [`OmxError`] carrying the raw IL
//! error code; deciding which failures are fatal is left to the caller.

use omxsink_sys as ffi;
use std::{fmt, ops::BitOr};

/// Raw OpenMAX IL error code returned by a failed hardware call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OmxError(pub u32);

impl OmxError {
    pub const INSUFFICIENT_RESOURCES: OmxError =
        OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorInsufficientResources);
    pub const UNDEFINED: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorUndefined);
    pub const COMPONENT_NOT_FOUND: OmxError =
        OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorComponentNotFound);
    pub const BAD_PARAMETER: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorBadParameter);
    pub const NOT_IMPLEMENTED: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorNotImplemented);
    pub const HARDWARE: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorHardware);
    pub const INVALID_STATE: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorInvalidState);
    pub const SAME_STATE: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorSameState);
    pub const INCORRECT_STATE_TRANSITION: OmxError =
        OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorIncorrectStateTransition);
    pub const INCORRECT_STATE_OPERATION: OmxError =
        OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorIncorrectStateOperation);
    pub const UNSUPPORTED_SETTING: OmxError =
        OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorUnsupportedSetting);
    pub const UNSUPPORTED_INDEX: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorUnsupportedIndex);
    pub const BAD_PORT_INDEX: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorBadPortIndex);
    pub const PORT_UNPOPULATED: OmxError = OmxError(ffi::OMX_ERRORTYPE_OMX_ErrorPortUnpopulated);

    /// Maps a raw IL return code onto a `Result`.
    pub fn check(code: ffi::OMX_ERRORTYPE) -> Result<(), OmxError> {
        if code == ffi::OMX_ERRORTYPE_OMX_ErrorNone {
            Ok(())
        } else {
            Err(OmxError(code))
        }
    }

    /// Symbolic name of the error code, if it is one the IL defines.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            ffi::OMX_ERRORTYPE_OMX_ErrorInsufficientResources => "InsufficientResources",
            ffi::OMX_ERRORTYPE_OMX_ErrorUndefined => "Undefined",
            ffi::OMX_ERRORTYPE_OMX_ErrorInvalidComponentName => "InvalidComponentName",
            ffi::OMX_ERRORTYPE_OMX_ErrorComponentNotFound => "ComponentNotFound",
            ffi::OMX_ERRORTYPE_OMX_ErrorInvalidComponent => "InvalidComponent",
            ffi::OMX_ERRORTYPE_OMX_ErrorBadParameter => "BadParameter",
            ffi::OMX_ERRORTYPE_OMX_ErrorNotImplemented => "NotImplemented",
            ffi::OMX_ERRORTYPE_OMX_ErrorUnderflow => "Underflow",
            ffi::OMX_ERRORTYPE_OMX_ErrorOverflow => "Overflow",
            ffi::OMX_ERRORTYPE_OMX_ErrorHardware => "Hardware",
            ffi::OMX_ERRORTYPE_OMX_ErrorInvalidState => "InvalidState",
            ffi::OMX_ERRORTYPE_OMX_ErrorStreamCorrupt => "StreamCorrupt",
            ffi::OMX_ERRORTYPE_OMX_ErrorPortsNotCompatible => "PortsNotCompatible",
            ffi::OMX_ERRORTYPE_OMX_ErrorResourcesLost => "ResourcesLost",
            ffi::OMX_ERRORTYPE_OMX_ErrorNoMore => "NoMore",
            ffi::OMX_ERRORTYPE_OMX_ErrorVersionMismatch => "VersionMismatch",
            ffi::OMX_ERRORTYPE_OMX_ErrorNotReady => "NotReady",
            ffi::OMX_ERRORTYPE_OMX_ErrorTimeout => "Timeout",
            ffi::OMX_ERRORTYPE_OMX_ErrorSameState => "SameState",
            ffi::OMX_ERRORTYPE_OMX_ErrorResourcesPreempted => "ResourcesPreempted",
            ffi::OMX_ERRORTYPE_OMX_ErrorIncorrectStateTransition => "IncorrectStateTransition",
            ffi::OMX_ERRORTYPE_OMX_ErrorIncorrectStateOperation => "IncorrectStateOperation",
            ffi::OMX_ERRORTYPE_OMX_ErrorUnsupportedSetting => "UnsupportedSetting",
            ffi::OMX_ERRORTYPE_OMX_ErrorUnsupportedIndex => "UnsupportedIndex",
            ffi::OMX_ERRORTYPE_OMX_ErrorBadPortIndex => "BadPortIndex",
            ffi::OMX_ERRORTYPE_OMX_ErrorPortUnpopulated => "PortUnpopulated",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for OmxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "OMX_Error{} (0x{:08x})", name, self.0),
            None => write!(f, "OMX error 0x{:08x}", self.0),
        }
    }
}

impl fmt::Debug for OmxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OmxError({})", self)
    }
}

impl std::error::Error for OmxError {}

/// Coarse component state as reported by a state query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Invalid,
    Loaded,
    Idle,
    Executing,
    Pause,
    WaitForResources,
}

impl State {
    pub fn from_raw(raw: ffi::OMX_STATETYPE) -> Self {
        match raw {
            ffi::OMX_STATETYPE_OMX_StateLoaded => State::Loaded,
            ffi::OMX_STATETYPE_OMX_StateIdle => State::Idle,
            ffi::OMX_STATETYPE_OMX_StateExecuting => State::Executing,
            ffi::OMX_STATETYPE_OMX_StatePause => State::Pause,
            ffi::OMX_STATETYPE_OMX_StateWaitForResources => State::WaitForResources,
            _ => State::Invalid,
        }
    }

    pub fn to_raw(self) -> ffi::OMX_STATETYPE {
        match self {
            State::Invalid => ffi::OMX_STATETYPE_OMX_StateInvalid,
            State::Loaded => ffi::OMX_STATETYPE_OMX_StateLoaded,
            State::Idle => ffi::OMX_STATETYPE_OMX_StateIdle,
            State::Executing => ffi::OMX_STATETYPE_OMX_StateExecuting,
            State::Pause => ffi::OMX_STATETYPE_OMX_StatePause,
            State::WaitForResources => ffi::OMX_STATETYPE_OMX_StateWaitForResources,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Invalid => "invalid",
            State::Loaded => "loaded",
            State::Idle => "idle",
            State::Executing => "executing",
            State::Pause => "pause",
            State::WaitForResources => "wait-for-resources",
        };
        f.write_str(name)
    }
}

/// Commands the controller issues to the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Request a coarse state transition.
    StateSet(State),
    /// Return all buffers queued on the port.
    Flush(u32),
    PortEnable(u32),
    PortDisable(u32),
}

impl Command {
    /// The `(command, nParam1)` pair passed to `SendCommand`.
    pub fn to_raw(self) -> (ffi::OMX_COMMANDTYPE, u32) {
        match self {
            Command::StateSet(state) => (ffi::OMX_COMMANDTYPE_OMX_CommandStateSet, state.to_raw()),
            Command::Flush(port) => (ffi::OMX_COMMANDTYPE_OMX_CommandFlush, port),
            Command::PortEnable(port) => (ffi::OMX_COMMANDTYPE_OMX_CommandPortEnable, port),
            Command::PortDisable(port) => (ffi::OMX_COMMANDTYPE_OMX_CommandPortDisable, port),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::StateSet(state) => write!(f, "state-set({})", state),
            Command::Flush(port) => write!(f, "flush(port {})", port),
            Command::PortEnable(port) => write!(f, "port-enable(port {})", port),
            Command::PortDisable(port) => write!(f, "port-disable(port {})", port),
        }
    }
}

/// Frame geometry programmed on the video port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    /// Bytes per row of the luma plane; negative for bottom-up images.
    pub stride: i32,
}

impl Geometry {
    pub fn new(width: u32, height: u32, stride: i32) -> Self {
        Geometry {
            width,
            height,
            stride,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} stride {}", self.width, self.height, self.stride)
    }
}

/// Port definition as read from, and written back to, the component.
///
/// The hardware is the source of truth: after writing a definition it must be
/// read again to learn what was actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortDefinition {
    pub port: u32,
    pub width: u32,
    pub height: u32,
    pub stride: i32,
    pub slice_height: u32,
    /// Number of buffers the port expects (`nBufferCountActual`).
    pub buffer_count: u32,
    pub buffer_count_min: u32,
    /// Size in bytes of each buffer the port expects.
    pub buffer_size: u32,
    pub enabled: bool,
    pub populated: bool,
}

impl PortDefinition {
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height, self.stride)
    }
}

/// Display rotation applied by the video renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Rot0,
    Rot90,
    Rot180,
    Rot270,
}

impl Rotation {
    /// Maps an angle in degrees onto a rotation. Anything other than 90, 180
    /// or 270 is treated as 0.
    pub fn from_degrees(angle: i32) -> Self {
        match angle {
            90 => Rotation::Rot90,
            180 => Rotation::Rot180,
            270 => Rotation::Rot270,
            _ => Rotation::Rot0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Rot0 => 0,
            Rotation::Rot90 => 90,
            Rotation::Rot180 => 180,
            Rotation::Rot270 => 270,
        }
    }

    pub fn to_raw(self) -> ffi::OMX_DISPLAYTRANSFORMTYPE {
        match self {
            Rotation::Rot0 => ffi::OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT0,
            Rotation::Rot90 => ffi::OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT90,
            Rotation::Rot180 => ffi::OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT180,
            Rotation::Rot270 => ffi::OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT270,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// How the renderer scales the frame into the destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    Fill,
    #[default]
    Letterbox,
}

impl DisplayMode {
    pub fn to_raw(self) -> ffi::OMX_DISPLAYMODETYPE {
        match self {
            DisplayMode::Fill => ffi::OMX_DISPLAYMODETYPE_OMX_DISPLAY_MODE_FILL,
            DisplayMode::Letterbox => ffi::OMX_DISPLAYMODETYPE_OMX_DISPLAY_MODE_LETTERBOX,
        }
    }
}

/// Destination rectangle on the screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

impl Rect {
    pub fn new(x: i16, y: i16, width: i16, height: i16) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Which members of a [`DisplayRegion`] the hardware should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegionFields(u32);

impl RegionFields {
    pub const FULLSCREEN: RegionFields =
        RegionFields(ffi::OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_FULLSCREEN);
    pub const TRANSFORM: RegionFields =
        RegionFields(ffi::OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_TRANSFORM);
    pub const DEST_RECT: RegionFields =
        RegionFields(ffi::OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_DEST_RECT);
    pub const MODE: RegionFields = RegionFields(ffi::OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_MODE);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: RegionFields) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for RegionFields {
    type Output = RegionFields;

    fn bitor(self, rhs: RegionFields) -> RegionFields {
        RegionFields(self.0 | rhs.0)
    }
}

/// Display region configuration pushed to the renderer.
///
/// Write-only: no copy is kept after it has been pushed. Only the members
/// named in `fields` are applied by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayRegion {
    pub fields: RegionFields,
    pub fullscreen: bool,
    pub rotation: Rotation,
    pub dest_rect: Rect,
    pub mode: DisplayMode,
}

impl DisplayRegion {
    /// Fullscreen output in the given scaling mode.
    pub fn fullscreen(mode: DisplayMode) -> Self {
        DisplayRegion {
            fields: RegionFields::FULLSCREEN | RegionFields::MODE,
            fullscreen: true,
            mode,
            ..Default::default()
        }
    }

    /// Rotation only; every other member is left untouched on the hardware.
    pub fn rotation(rotation: Rotation) -> Self {
        DisplayRegion {
            fields: RegionFields::TRANSFORM,
            rotation,
            ..Default::default()
        }
    }

    /// Letterboxed output inside `rect`.
    pub fn window(rect: Rect, rotation: Rotation) -> Self {
        DisplayRegion {
            fields: RegionFields::TRANSFORM
                | RegionFields::DEST_RECT
                | RegionFields::FULLSCREEN
                | RegionFields::MODE,
            fullscreen: false,
            rotation,
            dest_rect: rect,
            mode: DisplayMode::Letterbox,
        }
    }
}

/// Buffer flags understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferFlags(pub u32);

impl BufferFlags {
    pub const NONE: BufferFlags = BufferFlags(0);
    pub const END_OF_STREAM: BufferFlags = BufferFlags(ffi::OMX_BUFFERFLAG_EOS);
    /// Marks the buffer as the start of the stream timeline.
    pub const START_TIME: BufferFlags = BufferFlags(ffi::OMX_BUFFERFLAG_STARTTIME);

    pub fn contains(self, other: BufferFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Mutable bookkeeping fields of a hardware buffer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferHeader {
    pub filled_len: u32,
    pub offset: u32,
    pub flags: BufferFlags,
    pub timestamp: i64,
}

/// A hardware-allocated buffer owned by the buffer pool.
pub trait Buffer {
    /// Allocated size in bytes.
    fn capacity(&self) -> u32;

    /// Writable view over the whole allocation.
    fn data(&mut self) -> &mut [u8];

    fn header(&self) -> BufferHeader;

    fn set_header(&mut self, header: BufferHeader);
}

/// Command and query surface of one component instance.
pub trait Component {
    type Buffer: Buffer;

    /// Queries the current coarse state.
    fn state(&mut self) -> Result<State, OmxError>;

    /// Issues a command. Completion is asynchronous and must be polled for.
    fn send_command(&mut self, command: Command) -> Result<(), OmxError>;

    fn port_definition(&mut self, port: u32) -> Result<PortDefinition, OmxError>;

    /// Writes geometry, slice height and the enabled flag of `definition`
    /// back to its port. Other hardware fields are preserved.
    fn set_port_definition(&mut self, definition: &PortDefinition) -> Result<(), OmxError>;

    fn set_display_region(&mut self, port: u32, region: &DisplayRegion) -> Result<(), OmxError>;

    fn allocate_buffer(&mut self, port: u32, size: u32) -> Result<Self::Buffer, OmxError>;

    fn free_buffer(&mut self, port: u32, buffer: Self::Buffer) -> Result<(), OmxError>;

    /// Hands a filled buffer to the component. Does not wait for consumption.
    fn empty_buffer(&mut self, buffer: &mut Self::Buffer) -> Result<(), OmxError>;
}

/// Process-wide hardware subsystem that creates components.
pub trait Platform {
    type Component: Component;

    /// One-time subsystem bring-up.
    fn initialize(&mut self) -> Result<(), OmxError>;

    fn create_component(&mut self, name: &str) -> Result<Self::Component, OmxError>;

    fn destroy_component(&mut self, component: Self::Component) -> Result<(), OmxError>;

    fn deinitialize(&mut self) -> Result<(), OmxError>;
}
