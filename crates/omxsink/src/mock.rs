// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! In-memory implementation of the hardware traits.
//!
//! The mock behaves like a cooperative video_render component: commands
//! succeed, state transitions become visible after a configurable number of
//! queries, and the port reports buffers sized for I420 frames of the
//! programmed geometry. Faults are injected through [`MockConfig`].
//!
//! Every hardware call is recorded in a [`Journal`] shared by all clones of
//! the config, so a test keeps observing the platform after handing it to a
//! [`crate::display::Display`].
//!
//! ```
//! use omxsink::component::{Command, State};
//! use omxsink::display::Display;
//! use omxsink::mock::{MockConfig, MockPlatform};
//! use omxsink::timing::Timings;
//!
//! let config = MockConfig::default().with_state_latency(3);
//! let journal = config.journal();
//! let mut display = Display::new(MockPlatform::new(config)).with_timings(Timings::none());
//! display.init()?;
//! display.enable(320, 240, 320)?;
//! assert_eq!(journal.commands()[0], Command::StateSet(State::Idle));
//! # Ok::<(), omxsink::Error>(())
//! ```

use crate::{
    component::{
        Buffer, BufferHeader, Command, Component, DisplayRegion, Geometry, OmxError, Platform,
        PortDefinition, State,
    },
    display::{VIDEO_RENDER_COMPONENT, VIDEO_RENDER_PORT},
};
use std::sync::{Arc, Mutex, MutexGuard};

/// One recorded hardware call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize,
    CreateComponent(String),
    DestroyComponent,
    Deinitialize,
    GetState,
    SendCommand(Command),
    GetPortDefinition(u32),
    SetPortDefinition(PortDefinition),
    SetDisplayRegion(DisplayRegion),
    AllocateBuffer { size: u32 },
    FreeBuffer { id: usize },
    EmptyBuffer { id: usize },
}

/// A buffer handed to the component for consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: usize,
    pub header: BufferHeader,
    /// Copy of the first `header.filled_len` bytes.
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Faults {
    initialize: bool,
    create: bool,
    commands: bool,
    display_region: bool,
    port_write: bool,
    frees: bool,
    submissions: bool,
    allocation_at: Option<usize>,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Vec<Call>,
    submissions: Vec<Submission>,
    allocation_attempts: usize,
    faults: Faults,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Behaviour of the mock platform and its components.
#[derive(Debug, Clone)]
pub struct MockConfig {
    buffer_count: u32,
    reported_geometry: Option<Geometry>,
    state_latency: u32,
    stuck_state: bool,
    stuck_port: bool,
    shared: Arc<Mutex<Shared>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            buffer_count: 3,
            reported_geometry: None,
            state_latency: 0,
            stuck_state: false,
            stuck_port: false,
            shared: Arc::default(),
        }
    }
}

impl MockConfig {
    /// Handle on the call journal shared with every component created from
    /// this config.
    pub fn journal(&self) -> Journal {
        Journal {
            shared: self.shared.clone(),
        }
    }

    /// Number of buffers the port asks for.
    pub fn with_buffer_count(self, buffer_count: u32) -> Self {
        MockConfig {
            buffer_count,
            ..self
        }
    }

    /// The port reports `geometry` on read-back whatever was written.
    pub fn with_reported_geometry(self, geometry: Geometry) -> Self {
        MockConfig {
            reported_geometry: Some(geometry),
            ..self
        }
    }

    /// A requested state becomes visible after `queries` state queries.
    pub fn with_state_latency(self, queries: u32) -> Self {
        MockConfig {
            state_latency: queries,
            ..self
        }
    }

    /// State-set commands are accepted but the state never changes.
    pub fn with_stuck_state(self) -> Self {
        MockConfig {
            stuck_state: true,
            ..self
        }
    }

    /// Port enable/disable commands are accepted but the flag never changes.
    pub fn with_stuck_port(self) -> Self {
        MockConfig {
            stuck_port: true,
            ..self
        }
    }

    pub fn with_failing_initialize(self) -> Self {
        lock(&self.shared).faults.initialize = true;
        self
    }

    pub fn with_failing_create(self) -> Self {
        lock(&self.shared).faults.create = true;
        self
    }

    pub fn with_failing_commands(self) -> Self {
        lock(&self.shared).faults.commands = true;
        self
    }

    pub fn with_failing_display_region(self) -> Self {
        lock(&self.shared).faults.display_region = true;
        self
    }

    pub fn with_failing_port_write(self) -> Self {
        lock(&self.shared).faults.port_write = true;
        self
    }

    /// The allocation attempt with zero-based index `index` fails.
    pub fn with_allocation_failure_at(self, index: usize) -> Self {
        lock(&self.shared).faults.allocation_at = Some(index);
        self
    }

    pub fn with_failing_frees(self) -> Self {
        lock(&self.shared).faults.frees = true;
        self
    }

    pub fn with_failing_submissions(self) -> Self {
        lock(&self.shared).faults.submissions = true;
        self
    }
}

/// Shared record of the calls made against the mock.
#[derive(Debug, Clone)]
pub struct Journal {
    shared: Arc<Mutex<Shared>>,
}

impl Journal {
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.shared).calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Call) -> bool,
    {
        lock(&self.shared).calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.filter_map(|call| match call {
            Call::SendCommand(command) => Some(*command),
            _ => None,
        })
    }

    pub fn display_regions(&self) -> Vec<DisplayRegion> {
        self.filter_map(|call| match call {
            Call::SetDisplayRegion(region) => Some(*region),
            _ => None,
        })
    }

    pub fn port_writes(&self) -> Vec<PortDefinition> {
        self.filter_map(|call| match call {
            Call::SetPortDefinition(definition) => Some(*definition),
            _ => None,
        })
    }

    /// Number of allocation attempts, failed ones included.
    pub fn allocations(&self) -> usize {
        self.count(|call| matches!(call, Call::AllocateBuffer { .. }))
    }

    pub fn allocation_sizes(&self) -> Vec<u32> {
        self.filter_map(|call| match call {
            Call::AllocateBuffer { size } => Some(*size),
            _ => None,
        })
    }

    /// Ids of the buffers passed to free, failed frees included.
    pub fn frees(&self) -> Vec<usize> {
        self.filter_map(|call| match call {
            Call::FreeBuffer { id } => Some(*id),
            _ => None,
        })
    }

    pub fn submissions(&self) -> Vec<Submission> {
        lock(&self.shared).submissions.clone()
    }

    pub fn state_queries(&self) -> usize {
        self.count(|call| matches!(call, Call::GetState))
    }

    /// Forgets recorded calls and submissions. Fault settings are kept.
    pub fn clear(&self) {
        let mut shared = lock(&self.shared);
        shared.calls.clear();
        shared.submissions.clear();
    }

    pub fn set_failing_commands(&self, failing: bool) {
        lock(&self.shared).faults.commands = failing;
    }

    pub fn set_failing_frees(&self, failing: bool) {
        lock(&self.shared).faults.frees = failing;
    }

    pub fn set_failing_submissions(&self, failing: bool) {
        lock(&self.shared).faults.submissions = failing;
    }

    fn filter_map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&Call) -> Option<T>,
    {
        lock(&self.shared).calls.iter().filter_map(f).collect()
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    id: usize,
    data: Vec<u8>,
    header: BufferHeader,
}

impl MockBuffer {
    /// Allocation order of this buffer on its component, starting at 0.
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Buffer for MockBuffer {
    fn capacity(&self) -> u32 {
        self.data.len() as u32
    }

    fn data(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn header(&self) -> BufferHeader {
        self.header
    }

    fn set_header(&mut self, header: BufferHeader) {
        self.header = header;
    }
}

#[derive(Debug)]
pub struct MockComponent {
    config: MockConfig,
    state: State,
    pending: Option<(State, u32)>,
    port: PortDefinition,
    next_id: usize,
    live: usize,
}

impl MockComponent {
    pub fn new(config: MockConfig) -> Self {
        let mut port = PortDefinition {
            port: VIDEO_RENDER_PORT,
            width: 160,
            height: 64,
            stride: 160,
            slice_height: 64,
            buffer_count: config.buffer_count,
            buffer_count_min: config.buffer_count,
            buffer_size: 0,
            enabled: false,
            populated: false,
        };
        port.buffer_size = i420_size(&port).unwrap_or(0);
        MockComponent {
            config,
            state: State::Loaded,
            pending: None,
            port,
            next_id: 0,
            live: 0,
        }
    }

    /// Buffers allocated and not yet successfully freed.
    pub fn live_buffers(&self) -> usize {
        self.live
    }

    fn record(&self, call: Call) -> MutexGuard<'_, Shared> {
        let mut shared = lock(&self.config.shared);
        shared.calls.push(call);
        shared
    }

    fn check_port(&self, port: u32) -> Result<(), OmxError> {
        if port == self.port.port {
            Ok(())
        } else {
            Err(OmxError::BAD_PORT_INDEX)
        }
    }

    fn set_port_enabled(&mut self, enabled: bool) {
        if !self.config.stuck_port {
            self.port.enabled = enabled;
            self.port.populated = enabled && self.live as u32 >= self.port.buffer_count;
        }
    }
}

/// Packed I420 size of one frame, `None` if it does not fit the header field.
fn i420_size(port: &PortDefinition) -> Option<u32> {
    let size = u64::from(port.stride.unsigned_abs()) * u64::from(port.slice_height) * 3 / 2;
    u32::try_from(size).ok()
}

impl Component for MockComponent {
    type Buffer = MockBuffer;

    fn state(&mut self) -> Result<State, OmxError> {
        drop(self.record(Call::GetState));
        if let Some((target, remaining)) = self.pending {
            if remaining == 0 {
                self.state = target;
                self.pending = None;
            } else {
                self.pending = Some((target, remaining - 1));
            }
        }
        Ok(self.state)
    }

    fn send_command(&mut self, command: Command) -> Result<(), OmxError> {
        if self.record(Call::SendCommand(command)).faults.commands {
            return Err(OmxError::INCORRECT_STATE_OPERATION);
        }

        match command {
            Command::StateSet(target) => {
                if !self.config.stuck_state {
                    self.pending = Some((target, self.config.state_latency));
                }
            }
            Command::Flush(port) => self.check_port(port)?,
            Command::PortEnable(port) => {
                self.check_port(port)?;
                self.set_port_enabled(true);
            }
            Command::PortDisable(port) => {
                self.check_port(port)?;
                self.set_port_enabled(false);
            }
        }
        Ok(())
    }

    fn port_definition(&mut self, port: u32) -> Result<PortDefinition, OmxError> {
        drop(self.record(Call::GetPortDefinition(port)));
        self.check_port(port)?;
        Ok(self.port)
    }

    fn set_port_definition(&mut self, definition: &PortDefinition) -> Result<(), OmxError> {
        if self
            .record(Call::SetPortDefinition(*definition))
            .faults
            .port_write
        {
            return Err(OmxError::UNSUPPORTED_SETTING);
        }
        self.check_port(definition.port)?;

        let geometry = self
            .config
            .reported_geometry
            .unwrap_or_else(|| definition.geometry());
        let mut port = self.port;
        port.width = geometry.width;
        port.height = geometry.height;
        port.stride = geometry.stride;
        port.slice_height = if self.config.reported_geometry.is_some() {
            geometry.height
        } else {
            definition.slice_height
        };
        port.buffer_size = i420_size(&port).ok_or(OmxError::UNSUPPORTED_SETTING)?;
        self.port = port;
        Ok(())
    }

    fn set_display_region(&mut self, port: u32, region: &DisplayRegion) -> Result<(), OmxError> {
        if self
            .record(Call::SetDisplayRegion(*region))
            .faults
            .display_region
        {
            return Err(OmxError::BAD_PARAMETER);
        }
        self.check_port(port)
    }

    fn allocate_buffer(&mut self, port: u32, size: u32) -> Result<MockBuffer, OmxError> {
        {
            let mut shared = self.record(Call::AllocateBuffer { size });
            let attempt = shared.allocation_attempts;
            shared.allocation_attempts += 1;
            if shared.faults.allocation_at == Some(attempt) {
                return Err(OmxError::INSUFFICIENT_RESOURCES);
            }
        }
        self.check_port(port)?;

        let buffer = MockBuffer {
            id: self.next_id,
            data: vec![0; size as usize],
            header: BufferHeader::default(),
        };
        self.next_id += 1;
        self.live += 1;
        Ok(buffer)
    }

    fn free_buffer(&mut self, port: u32, buffer: MockBuffer) -> Result<(), OmxError> {
        if self.record(Call::FreeBuffer { id: buffer.id }).faults.frees {
            return Err(OmxError::UNDEFINED);
        }
        self.check_port(port)?;
        self.live = self.live.saturating_sub(1);
        Ok(())
    }

    fn empty_buffer(&mut self, buffer: &mut MockBuffer) -> Result<(), OmxError> {
        let header = buffer.header;
        let filled = (header.filled_len as usize).min(buffer.data.len());
        let mut shared = self.record(Call::EmptyBuffer { id: buffer.id });
        shared.submissions.push(Submission {
            id: buffer.id,
            header,
            data: buffer.data[..filled].to_vec(),
        });
        if shared.faults.submissions {
            return Err(OmxError::INCORRECT_STATE_OPERATION);
        }
        Ok(())
    }
}

/// In-memory platform creating [`MockComponent`]s.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        MockPlatform { config }
    }

    pub fn journal(&self) -> Journal {
        self.config.journal()
    }

    fn record(&self, call: Call) -> MutexGuard<'_, Shared> {
        let mut shared = lock(&self.config.shared);
        shared.calls.push(call);
        shared
    }
}

impl Platform for MockPlatform {
    type Component = MockComponent;

    fn initialize(&mut self) -> Result<(), OmxError> {
        if self.record(Call::Initialize).faults.initialize {
            return Err(OmxError::INSUFFICIENT_RESOURCES);
        }
        Ok(())
    }

    fn create_component(&mut self, name: &str) -> Result<MockComponent, OmxError> {
        if self
            .record(Call::CreateComponent(name.to_string()))
            .faults
            .create
            || name != VIDEO_RENDER_COMPONENT
        {
            return Err(OmxError::COMPONENT_NOT_FOUND);
        }
        Ok(MockComponent::new(self.config.clone()))
    }

    fn destroy_component(&mut self, _component: MockComponent) -> Result<(), OmxError> {
        drop(self.record(Call::DestroyComponent));
        Ok(())
    }

    fn deinitialize(&mut self) -> Result<(), OmxError> {
        drop(self.record(Call::Deinitialize));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::Poller;
    use std::time::Duration;

    #[test]
    fn test_state_latency() {
        let mut comp = MockComponent::new(MockConfig::default().with_state_latency(2));
        comp.send_command(Command::StateSet(State::Idle)).unwrap();
        assert_eq!(comp.state().unwrap(), State::Loaded);
        assert_eq!(comp.state().unwrap(), State::Loaded);
        assert_eq!(comp.state().unwrap(), State::Idle);
    }

    #[test]
    fn test_stuck_state_exhausts_poller() {
        let config = MockConfig::default().with_stuck_state();
        let journal = config.journal();
        let mut comp = MockComponent::new(config);
        comp.send_command(Command::StateSet(State::Executing)).unwrap();

        let outcome = Poller::new(200, Duration::ZERO).wait_for_state(&mut comp, State::Executing);
        assert!(!outcome.reached());
        assert_eq!(journal.state_queries(), 200);
    }

    #[test]
    fn test_stuck_port() {
        let mut comp = MockComponent::new(MockConfig::default().with_stuck_port());
        comp.send_command(Command::PortEnable(VIDEO_RENDER_PORT)).unwrap();
        assert!(!comp.port_definition(VIDEO_RENDER_PORT).unwrap().enabled);
    }

    #[test]
    fn test_port_write_keeps_enabled_flag() {
        let mut comp = MockComponent::new(MockConfig::default());
        let mut definition = comp.port_definition(VIDEO_RENDER_PORT).unwrap();
        definition.width = 1280;
        definition.height = 720;
        definition.stride = 1280;
        definition.slice_height = 720;
        definition.enabled = true;
        comp.set_port_definition(&definition).unwrap();

        let reported = comp.port_definition(VIDEO_RENDER_PORT).unwrap();
        assert_eq!(reported.geometry(), Geometry::new(1280, 720, 1280));
        assert_eq!(reported.buffer_size, 1280 * 720 * 3 / 2);
        assert!(!reported.enabled);
    }

    #[test]
    fn test_port_write_rejects_oversized_frame() {
        let mut comp = MockComponent::new(MockConfig::default());
        let before = comp.port_definition(VIDEO_RENDER_PORT).unwrap();
        let mut definition = before;
        definition.width = 70000;
        definition.height = 70000;
        definition.stride = 70000;
        definition.slice_height = 70000;
        assert_eq!(
            comp.set_port_definition(&definition),
            Err(OmxError::UNSUPPORTED_SETTING)
        );
        assert_eq!(comp.port_definition(VIDEO_RENDER_PORT).unwrap(), before);
    }

    #[test]
    fn test_bad_port() {
        let mut comp = MockComponent::new(MockConfig::default());
        assert_eq!(comp.port_definition(91), Err(OmxError::BAD_PORT_INDEX));
        assert_eq!(
            comp.send_command(Command::PortEnable(91)),
            Err(OmxError::BAD_PORT_INDEX)
        );
    }

    #[test]
    fn test_unknown_component() {
        let mut platform = MockPlatform::default();
        assert_eq!(
            platform.create_component("OMX.broadcom.egl_render").unwrap_err(),
            OmxError::COMPONENT_NOT_FOUND
        );
    }

    #[test]
    fn test_runtime_fault_toggle() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut comp = MockComponent::new(config);
        journal.set_failing_commands(true);
        assert!(comp.send_command(Command::Flush(VIDEO_RENDER_PORT)).is_err());
        journal.set_failing_commands(false);
        assert!(comp.send_command(Command::Flush(VIDEO_RENDER_PORT)).is_ok());
        assert_eq!(journal.commands().len(), 2);
    }
}
