// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Display component controller
//!
//! [`Display`] owns the component handle and the buffer pool of the video
//! render port, and walks the component through its lifecycle:
//!
//! | Operation | Transitions |
//! |-----------|-------------|
//! | [`Display::init`] | Uninitialized → Created |
//! | [`Display::enable`] | Created → Configured → PortEnabled → Executing |
//! | [`Display::disable`] | Executing → Idle → PortDisabled → Loaded |
//! | [`Display::deinit`] | any → Destroyed |
//!
//! Every command is confirmed by polling the hardware before the next one is
//! issued (see [`crate::poller`]). The component enforces this ordering as a
//! protocol; the controller never reorders it.
//!
//! # Failure policy
//!
//! `enable` only aborts on configuration errors (parameter reads/writes the
//! hardware rejects, geometry that does not round-trip) and on buffer
//! allocation failure. `disable` and `deinit` never abort: each failed step is
//! logged, recorded in the returned [`TeardownReport`], and the sequence
//! carries on so hardware resources are always released. Poll timeouts are
//! logged and otherwise ignored everywhere.
//!
//! # Example
//!
//! ```
//! use omxsink::display::{Display, DisplayState};
//! use omxsink::mock::{MockConfig, MockPlatform};
//! use omxsink::timing::Timings;
//!
//! let platform = MockPlatform::new(MockConfig::default());
//! let mut display = Display::new(platform).with_timings(Timings::none());
//!
//! display.init()?;
//! display.enable(640, 480, 640)?;
//! assert_eq!(display.state(), DisplayState::Executing);
//!
//! let report = display.disable()?;
//! assert!(report.is_clean());
//! display.deinit()?;
//! # Ok::<(), omxsink::Error>(())
//! ```

mod feed;

use crate::{
    component::{
        Command, Component, DisplayMode, DisplayRegion, Geometry, OmxError, Platform,
        PortDefinition, Rect, Rotation, State,
    },
    poller::Poller,
    pool::BufferPool,
    timing::{self, Timings},
    Error, Resource,
};
use std::fmt;

/// Name of the Broadcom video render component.
pub const VIDEO_RENDER_COMPONENT: &str = "OMX.broadcom.video_render";

/// Input port of the video render component.
pub const VIDEO_RENDER_PORT: u32 = 90;

/// Lifecycle position of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayState {
    Uninitialized,
    Created,
    Configured,
    PortEnabled,
    Executing,
    Idle,
    PortDisabled,
    Loaded,
    Destroyed,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayState::Uninitialized => "uninitialized",
            DisplayState::Created => "created",
            DisplayState::Configured => "configured",
            DisplayState::PortEnabled => "port-enabled",
            DisplayState::Executing => "executing",
            DisplayState::Idle => "idle",
            DisplayState::PortDisabled => "port-disabled",
            DisplayState::Loaded => "loaded",
            DisplayState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Teardown step that can fail without aborting the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Flush,
    Idle,
    PortDisable,
    FreeBuffer(usize),
    Loaded,
    ReleaseHandle,
    Deinitialize,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Flush => write!(f, "flush"),
            Step::Idle => write!(f, "set idle"),
            Step::PortDisable => write!(f, "port disable"),
            Step::FreeBuffer(index) => write!(f, "free buffer {}", index),
            Step::Loaded => write!(f, "set loaded"),
            Step::ReleaseHandle => write!(f, "release handle"),
            Step::Deinitialize => write!(f, "deinitialize"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub error: OmxError,
}

impl StepFailure {
    pub fn new(step: Step, error: OmxError) -> Self {
        StepFailure { step, error }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.error)
    }
}

/// Steps that failed during a best-effort teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    failures: Vec<StepFailure>,
}

impl TeardownReport {
    /// `true` if every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[StepFailure] {
        &self.failures
    }

    fn push(&mut self, step: Step, error: OmxError) {
        self.failures.push(StepFailure::new(step, error));
    }

    fn extend(&mut self, failures: Vec<StepFailure>) {
        self.failures.extend(failures);
    }
}

/// Controller for one video render component.
///
/// The controller is the single owner of the component handle and the buffer
/// pool; all access goes through `&mut self`. Lifecycle operations and frame
/// submission must not be interleaved from different call sites.
pub struct Display<P: Platform> {
    platform: P,
    component: Option<P::Component>,
    pool: BufferPool<<P::Component as Component>::Buffer>,
    port: u32,
    timings: Timings,
    poller: Poller,
    state: DisplayState,
}

impl<P: Platform> Display<P> {
    /// Creates an uninitialized controller for the video render port.
    pub fn new(platform: P) -> Self {
        let timings = Timings::default();
        Display {
            platform,
            component: None,
            pool: BufferPool::new().with_free_settle(timings.buffer_free),
            port: VIDEO_RENDER_PORT,
            timings,
            poller: Poller::from_timings(&timings),
            state: DisplayState::Uninitialized,
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.pool = std::mem::take(&mut self.pool).with_free_settle(timings.buffer_free);
        self.poller = Poller::from_timings(&timings);
        self.timings = timings;
        self
    }

    pub fn with_port(mut self, port: u32) -> Self {
        self.port = port;
        self
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.component.is_some()
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Number of buffers currently allocated.
    pub fn buffer_count(&self) -> usize {
        self.pool.len()
    }

    /// Index of the buffer last handed out by [`Display::acquire_buffer`].
    pub fn cursor(&self) -> usize {
        self.pool.cursor()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Initializes the subsystem and creates the component handle.
    ///
    /// Buffers left over from an earlier session are released first. Calling
    /// `init` with a component already present keeps that component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComponentCreation`] if the subsystem cannot be
    /// initialized or the handle cannot be obtained.
    pub fn init(&mut self) -> Result<(), Error> {
        if let Some(component) = self.component.as_mut() {
            if !self.pool.is_empty() {
                log::debug!("releasing {} buffers from previous session", self.pool.len());
                for failure in self.pool.release(component, self.port) {
                    log::warn!("re-init: {}", failure);
                }
            }
            log::debug!("video_render component already created");
            return Ok(());
        }

        self.platform.initialize().map_err(|err| {
            log::error!("failed to initialize OpenMAX: {}", err);
            Error::ComponentCreation(err)
        })?;

        match self.platform.create_component(VIDEO_RENDER_COMPONENT) {
            Ok(component) => {
                log::debug!("created video_render component");
                self.component = Some(component);
                self.state = DisplayState::Created;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to create video_render component: {}", err);
                if let Err(err) = self.platform.deinitialize() {
                    log::warn!("failed to deinitialize OpenMAX: {}", err);
                }
                Err(Error::ComponentCreation(err))
            }
        }
    }

    /// Configures the port for `width`x`height` frames with `stride` bytes
    /// per row and brings the component to the executing state.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if [`Display::init`] has not succeeded.
    /// - [`Error::Configuration`] if the port definition cannot be read or
    ///   written.
    /// - [`Error::GeometryMismatch`] if the port does not report back exactly
    ///   the requested width, height and stride. No buffers are allocated.
    /// - [`Error::OutOfMemory`] if a buffer cannot be allocated.
    ///
    /// After an error the controller can still be disabled or deinitialized.
    pub fn enable(&mut self, width: u32, height: u32, stride: i32) -> Result<(), Error> {
        let port = self.port;
        let component = self
            .component
            .as_mut()
            .ok_or(Error::NotInitialized(Resource::Component))?;
        let requested = Geometry::new(width, height, stride);
        log::debug!("enabling display at {}", requested);

        if let Err(err) = component.send_command(Command::StateSet(State::Idle)) {
            log::warn!("failed to request idle state: {}", err);
        }

        let region = DisplayRegion::fullscreen(DisplayMode::Letterbox);
        if let Err(err) = component.set_display_region(port, &region) {
            log::warn!("couldn't configure display region: {}", err);
        }

        let mut definition = component.port_definition(port).map_err(|err| {
            log::error!("couldn't retrieve port definition: {}", err);
            Error::Configuration(err)
        })?;
        log::debug!(
            "port definition (before): {} slice height {}",
            definition.geometry(),
            definition.slice_height
        );

        definition.width = width;
        definition.height = height;
        definition.stride = stride;
        definition.slice_height = height;
        definition.enabled = true;

        component.set_port_definition(&definition).map_err(|err| {
            log::error!("could not set port definition: {}", err);
            Error::Configuration(err)
        })?;

        let reported = component.port_definition(port).map_err(|err| {
            log::error!("couldn't read back port definition: {}", err);
            Error::Configuration(err)
        })?;
        if reported.geometry() != requested {
            log::error!(
                "could not set requested resolution {}, port reports {}",
                requested,
                reported.geometry()
            );
            return Err(Error::GeometryMismatch {
                requested,
                reported: reported.geometry(),
            });
        }
        self.state = DisplayState::Configured;

        if self.pool.is_empty() {
            self.pool
                .allocate(component, port, reported.buffer_count, reported.buffer_size)?;
        }

        self.poller.wait_for_state(component, State::Idle);

        if let Err(err) = component.send_command(Command::PortEnable(port)) {
            log::warn!("failed to enable port {}: {}", port, err);
        }
        self.poller.wait_for_port(component, port, true);
        self.state = DisplayState::PortEnabled;
        timing::sleep(self.timings.port_settle);

        if let Err(err) = component.send_command(Command::StateSet(State::Executing)) {
            log::warn!("failed to request executing state: {}", err);
        }
        self.poller.wait_for_state(component, State::Executing);
        self.state = DisplayState::Executing;

        log::info!(
            "display enabled at {} with {} buffers of {} bytes",
            requested,
            self.pool.len(),
            reported.buffer_size
        );
        Ok(())
    }

    /// Flushes and disables the port, releases the buffer pool and returns
    /// the component to the loaded state.
    ///
    /// Every step runs even if earlier ones fail; failures are collected in
    /// the returned report. Without a component this is a no-op.
    pub fn disable(&mut self) -> Result<TeardownReport, Error> {
        let port = self.port;
        let mut report = TeardownReport::default();
        let Some(component) = self.component.as_mut() else {
            log::debug!("disable: no component, nothing to do");
            return Ok(report);
        };
        log::debug!("disabling display");

        if let Err(err) = component.send_command(Command::Flush(port)) {
            log::warn!("failed to flush port {}: {}", port, err);
            report.push(Step::Flush, err);
        }
        // No flush-complete signal is consulted; a fixed delay stands in.
        timing::sleep(self.timings.flush);

        if let Err(err) = component.send_command(Command::StateSet(State::Idle)) {
            log::warn!("failed to switch component to idle: {}", err);
            report.push(Step::Idle, err);
        }
        self.poller.wait_for_state(component, State::Idle);
        self.state = DisplayState::Idle;

        if let Err(err) = component.send_command(Command::PortDisable(port)) {
            log::warn!("failed to disable port {}: {}", port, err);
            report.push(Step::PortDisable, err);
        }

        report.extend(self.pool.release(component, port));

        self.poller.wait_for_port(component, port, false);
        self.state = DisplayState::PortDisabled;

        if let Err(err) = component.send_command(Command::StateSet(State::Loaded)) {
            log::warn!("failed to switch component to loaded: {}", err);
            report.push(Step::Loaded, err);
        }
        self.poller.wait_for_state(component, State::Loaded);
        self.state = DisplayState::Loaded;

        if report.is_clean() {
            log::info!("display disabled");
        } else {
            log::warn!(
                "display disabled with {} failed steps",
                report.failures().len()
            );
        }
        Ok(report)
    }

    /// Sets the display rotation. Angles other than 0, 90, 180 and 270 are
    /// treated as 0. Only the transform is pushed; a rejection by the
    /// hardware is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if there is no component.
    pub fn configure_rotation(&mut self, angle: i32) -> Result<(), Error> {
        let port = self.port;
        let component = self
            .component
            .as_mut()
            .ok_or(Error::NotInitialized(Resource::Component))?;

        let rotation = Rotation::from_degrees(angle);
        if rotation.degrees() != angle {
            log::debug!("unsupported rotation {}°, using {}", angle, rotation);
        }

        if let Err(err) = component.set_display_region(port, &DisplayRegion::rotation(rotation)) {
            log::warn!("failed to set rotation {}: {}", rotation, err);
        }
        Ok(())
    }

    /// Renders letterboxed into `rect` instead of fullscreen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if there is no component and
    /// [`Error::Configuration`] if the hardware rejects the region.
    pub fn configure_window(&mut self, rect: Rect, rotation: Rotation) -> Result<(), Error> {
        let port = self.port;
        let component = self
            .component
            .as_mut()
            .ok_or(Error::NotInitialized(Resource::Component))?;

        log::debug!("configuring window {} rotated {}", rect, rotation);
        component
            .set_display_region(port, &DisplayRegion::window(rect, rotation))
            .map_err(Error::Configuration)
    }

    /// Reads the live port definition from the hardware.
    pub fn port_definition(&mut self) -> Result<PortDefinition, Error> {
        let port = self.port;
        let component = self
            .component
            .as_mut()
            .ok_or(Error::NotInitialized(Resource::Component))?;
        component.port_definition(port).map_err(Error::Configuration)
    }

    /// Releases the component handle and deinitializes the subsystem.
    ///
    /// Buffers still allocated are released first. Safe to call repeatedly;
    /// without a component this is a no-op.
    pub fn deinit(&mut self) -> Result<TeardownReport, Error> {
        let mut report = TeardownReport::default();
        let Some(mut component) = self.component.take() else {
            return Ok(report);
        };

        if !self.pool.is_empty() {
            log::warn!(
                "releasing {} buffers still allocated at deinit",
                self.pool.len()
            );
            report.extend(self.pool.release(&mut component, self.port));
        }

        if let Err(err) = self.platform.destroy_component(component) {
            log::warn!("failed to release component handle: {}", err);
            report.push(Step::ReleaseHandle, err);
        }
        timing::sleep(self.timings.handle_release);

        if let Err(err) = self.platform.deinitialize() {
            log::warn!("failed to deinitialize OpenMAX: {}", err);
            report.push(Step::Deinitialize, err);
        }

        self.state = DisplayState::Destroyed;
        log::debug!("display deinitialized");
        Ok(report)
    }
}

impl<P: Platform> Drop for Display<P> {
    fn drop(&mut self) {
        if self.component.is_some() {
            let _ = self.deinit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        component::RegionFields,
        mock::{Call, MockConfig, MockPlatform},
    };

    fn display(config: MockConfig) -> Display<MockPlatform> {
        Display::new(MockPlatform::new(config)).with_timings(Timings::none())
    }

    #[test]
    fn test_new_is_uninitialized() {
        let display = display(MockConfig::default());
        assert_eq!(display.state(), DisplayState::Uninitialized);
        assert!(!display.is_initialized());
        assert_eq!(display.port(), VIDEO_RENDER_PORT);
    }

    #[test]
    fn test_init_creates_component() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        assert_eq!(display.state(), DisplayState::Created);
        assert_eq!(
            journal.calls()[..2],
            [
                Call::Initialize,
                Call::CreateComponent(VIDEO_RENDER_COMPONENT.to_string())
            ]
        );
    }

    #[test]
    fn test_init_failure() {
        let mut display = display(MockConfig::default().with_failing_create());
        let err = display.init().unwrap_err();
        assert!(matches!(err, Error::ComponentCreation(_)));
        assert!(!display.is_initialized());
    }

    #[test]
    fn test_init_subsystem_failure() {
        let config = MockConfig::default().with_failing_initialize();
        let journal = config.journal();
        let mut display = display(config);
        assert!(matches!(
            display.init(),
            Err(Error::ComponentCreation(_))
        ));
        assert_eq!(journal.calls(), vec![Call::Initialize]);
    }

    #[test]
    fn test_reinit_releases_buffers() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(64, 32, 64).unwrap();
        assert_eq!(display.buffer_count(), 3);

        display.init().unwrap();
        assert_eq!(display.buffer_count(), 0);
        assert_eq!(journal.frees().len(), 3);
        // Still the same component
        assert_eq!(journal.count(|c| matches!(c, Call::CreateComponent(_))), 1);
    }

    #[test]
    fn test_enable_sequence() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(1920, 1080, 1920).unwrap();

        assert_eq!(display.state(), DisplayState::Executing);
        assert_eq!(display.buffer_count(), 3);
        assert_eq!(
            journal.commands(),
            vec![
                Command::StateSet(State::Idle),
                Command::PortEnable(VIDEO_RENDER_PORT),
                Command::StateSet(State::Executing),
            ]
        );

        let regions = journal.display_regions();
        assert_eq!(regions.len(), 1);
        assert!(regions[0].fullscreen);
        assert_eq!(regions[0].mode, DisplayMode::Letterbox);
        assert_eq!(regions[0].fields, RegionFields::FULLSCREEN | RegionFields::MODE);

        let written = journal.port_writes();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].geometry(), Geometry::new(1920, 1080, 1920));
        assert_eq!(written[0].slice_height, 1080);
        assert!(written[0].enabled);
    }

    #[test]
    fn test_enable_allocates_reported_size() {
        let config = MockConfig::default().with_buffer_count(2);
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(64, 32, 64).unwrap();

        // I420: stride * slice height * 3 / 2
        assert_eq!(journal.allocation_sizes(), vec![3072, 3072]);
    }

    #[test]
    fn test_enable_geometry_mismatch() {
        let config = MockConfig::default().with_reported_geometry(Geometry::new(1920, 1088, 1920));
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();

        let err = display.enable(1920, 1080, 1920).unwrap_err();
        match err {
            Error::GeometryMismatch {
                requested,
                reported,
            } => {
                assert_eq!(requested, Geometry::new(1920, 1080, 1920));
                assert_eq!(reported, Geometry::new(1920, 1088, 1920));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(journal.allocations(), 0);
        assert_eq!(display.buffer_count(), 0);
        assert_eq!(display.state(), DisplayState::Created);
    }

    #[test]
    fn test_enable_port_write_rejected() {
        let mut display = display(MockConfig::default().with_failing_port_write());
        display.init().unwrap();
        assert!(matches!(
            display.enable(640, 480, 640),
            Err(Error::Configuration(_))
        ));
        assert_eq!(display.buffer_count(), 0);
    }

    #[test]
    fn test_enable_allocation_failure() {
        let mut display = display(MockConfig::default().with_allocation_failure_at(1));
        display.init().unwrap();
        assert!(matches!(
            display.enable(640, 480, 640),
            Err(Error::OutOfMemory(_))
        ));
        assert_eq!(display.buffer_count(), 0);

        // Safe to unwind after a failed enable
        assert!(display.disable().unwrap().is_clean());
        display.deinit().unwrap();
    }

    #[test]
    fn test_enable_tolerates_command_failures() {
        let config = MockConfig::default().with_failing_commands();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();

        // Each wait ran into the ceiling and the sequence carried on
        assert_eq!(
            journal.state_queries(),
            2 * Timings::DEFAULT_POLL_ATTEMPTS as usize
        );
        assert_eq!(display.state(), DisplayState::Executing);
    }

    #[test]
    fn test_enable_with_display_region_rejected() {
        let mut display = display(MockConfig::default().with_failing_display_region());
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();
        assert_eq!(display.state(), DisplayState::Executing);
    }

    #[test]
    fn test_enable_before_init() {
        let mut display = display(MockConfig::default());
        assert!(matches!(
            display.enable(640, 480, 640),
            Err(Error::NotInitialized(Resource::Component))
        ));
    }

    #[test]
    fn test_disable_sequence() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();
        journal.clear();

        let report = display.disable().unwrap();
        assert!(report.is_clean());
        assert_eq!(display.state(), DisplayState::Loaded);
        assert_eq!(display.buffer_count(), 0);
        assert_eq!(display.cursor(), 0);

        let order: Vec<Call> = journal
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SendCommand(_) | Call::FreeBuffer { .. }))
            .collect();
        assert_eq!(
            order,
            vec![
                Call::SendCommand(Command::Flush(VIDEO_RENDER_PORT)),
                Call::SendCommand(Command::StateSet(State::Idle)),
                Call::SendCommand(Command::PortDisable(VIDEO_RENDER_PORT)),
                Call::FreeBuffer { id: 0 },
                Call::FreeBuffer { id: 1 },
                Call::FreeBuffer { id: 2 },
                Call::SendCommand(Command::StateSet(State::Loaded)),
            ]
        );
    }

    #[test]
    fn test_disable_collects_failures() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();
        display.acquire_buffer().unwrap();

        journal.set_failing_commands(true);
        journal.set_failing_frees(true);

        let report = display.disable().unwrap();
        let steps: Vec<Step> = report.failures().iter().map(|f| f.step).collect();
        assert_eq!(
            steps,
            vec![
                Step::Flush,
                Step::Idle,
                Step::PortDisable,
                Step::FreeBuffer(0),
                Step::FreeBuffer(1),
                Step::FreeBuffer(2),
                Step::Loaded,
            ]
        );
        assert_eq!(display.buffer_count(), 0);
        assert_eq!(display.cursor(), 0);
    }

    #[test]
    fn test_disable_twice() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();

        display.disable().unwrap();
        let frees = journal.frees().len();
        let report = display.disable().unwrap();
        assert!(report.is_clean());
        assert_eq!(journal.frees().len(), frees);
        assert_eq!(display.state(), DisplayState::Loaded);
    }

    #[test]
    fn test_disable_without_component() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        assert!(display.disable().unwrap().is_clean());
        assert!(journal.calls().is_empty());
    }

    #[test]
    fn test_reenable_after_disable() {
        let mut display = display(MockConfig::default());
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();
        display.disable().unwrap();
        display.enable(1280, 720, 1280).unwrap();
        assert_eq!(display.state(), DisplayState::Executing);
        assert_eq!(display.buffer_count(), 3);
    }

    #[test]
    fn test_configure_rotation() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();

        for (angle, expected) in [
            (0, Rotation::Rot0),
            (90, Rotation::Rot90),
            (180, Rotation::Rot180),
            (270, Rotation::Rot270),
            (45, Rotation::Rot0),
            (-90, Rotation::Rot0),
            (360, Rotation::Rot0),
        ] {
            journal.clear();
            display.configure_rotation(angle).unwrap();
            let regions = journal.display_regions();
            assert_eq!(regions.len(), 1);
            assert_eq!(regions[0].fields, RegionFields::TRANSFORM);
            assert_eq!(regions[0].rotation, expected, "angle {}", angle);
        }
    }

    #[test]
    fn test_configure_rotation_rejected_is_not_fatal() {
        let mut display = display(MockConfig::default().with_failing_display_region());
        display.init().unwrap();
        display.configure_rotation(90).unwrap();
    }

    #[test]
    fn test_configure_rotation_before_init() {
        let mut display = display(MockConfig::default());
        assert!(matches!(
            display.configure_rotation(90),
            Err(Error::NotInitialized(Resource::Component))
        ));
    }

    #[test]
    fn test_configure_window() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display
            .configure_window(Rect::new(0, 0, 960, 540), Rotation::Rot90)
            .unwrap();
        let region = journal.display_regions()[0];
        assert!(!region.fullscreen);
        assert_eq!(region.dest_rect, Rect::new(0, 0, 960, 540));
        assert_eq!(region.rotation, Rotation::Rot90);
    }

    #[test]
    fn test_configure_window_rejected() {
        let mut display = display(MockConfig::default().with_failing_display_region());
        display.init().unwrap();
        assert!(matches!(
            display.configure_window(Rect::new(0, 0, 960, 540), Rotation::Rot0),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_enable_oversized_geometry() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        assert!(matches!(
            display.enable(70000, 70000, 70000),
            Err(Error::Configuration(_))
        ));
        assert_eq!(journal.allocations(), 0);
        assert_eq!(display.buffer_count(), 0);
    }

    #[test]
    fn test_with_port() {
        let timings = Timings::none();
        let mut display = Display::new(MockPlatform::default())
            .with_port(91)
            .with_timings(timings);
        assert_eq!(display.port(), 91);
        assert_eq!(display.timings(), &timings);

        display.init().unwrap();
        let journal = display.platform().journal();
        assert!(matches!(
            display.enable(64, 32, 64),
            Err(Error::Configuration(_))
        ));
        assert!(journal.calls().contains(&Call::GetPortDefinition(91)));
    }

    #[test]
    fn test_port_definition() {
        let mut display = display(MockConfig::default().with_buffer_count(4));
        display.init().unwrap();
        let definition = display.port_definition().unwrap();
        assert_eq!(definition.port, VIDEO_RENDER_PORT);
        assert_eq!(definition.buffer_count, 4);
    }

    #[test]
    fn test_deinit_idempotent() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        assert!(display.deinit().unwrap().is_clean());
        assert_eq!(display.state(), DisplayState::Destroyed);
        let calls = journal.calls().len();
        assert!(display.deinit().unwrap().is_clean());
        assert_eq!(journal.calls().len(), calls);
    }

    #[test]
    fn test_deinit_releases_leftover_buffers() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = display(config);
        display.init().unwrap();
        display.enable(640, 480, 640).unwrap();
        display.deinit().unwrap();
        assert_eq!(journal.frees().len(), 3);
        assert_eq!(
            journal.calls()[journal.calls().len() - 2..],
            [Call::DestroyComponent, Call::Deinitialize]
        );
    }

    #[test]
    fn test_drop_deinitializes() {
        let config = MockConfig::default();
        let journal = config.journal();
        {
            let mut display = display(config);
            display.init().unwrap();
        }
        assert_eq!(journal.calls().last(), Some(&Call::Deinitialize));
    }
}
