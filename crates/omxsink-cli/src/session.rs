// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::metrics::{FrameStats, StatsCollector};
use crate::utils::Pacer;
use omxsink::{
    component::Platform,
    display::{Display, TeardownReport},
    mock::{MockConfig, MockPlatform},
    omx::OmxPlatform,
    timing::Timings,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Work performed against a display, whatever the backend.
pub trait DisplayTask {
    type Output;

    fn run<P: Platform>(self, display: &mut Display<P>) -> Result<Self::Output, CliError>;
}

/// Runs `task` on the VideoCore, or on the in-memory mock if `mock` is set.
pub fn dispatch<T: DisplayTask>(task: T, mock: bool) -> Result<T::Output, CliError> {
    if mock {
        log::info!("Using mock display backend");
        let platform = MockPlatform::new(MockConfig::default());
        let mut display = Display::new(platform).with_timings(Timings::none());
        task.run(&mut display)
    } else {
        let mut display = Display::new(OmxPlatform::new()?);
        task.run(&mut display)
    }
}

/// Parameters of a frame feed session
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub width: u32,
    pub height: u32,
    pub rotation: i32,
    pub fps: f64,
    /// Number of frames to submit (0=unlimited)
    pub frames: u64,
}

/// Fills one acquired buffer. Returns the payload length, or `None` once
/// the source is exhausted.
pub trait FrameSource {
    fn fill(&mut self, buffer: &mut [u8], index: u64) -> Result<Option<usize>, CliError>;
}

/// Brings the display up, feeds frames from `source` until it runs dry, the
/// frame limit is reached or `term` is raised, then tears everything down.
pub fn run_feed<P, S>(
    display: &mut Display<P>,
    options: &FeedOptions,
    term: &AtomicBool,
    source: &mut S,
) -> Result<FrameStats, CliError>
where
    P: Platform,
    S: FrameSource,
{
    display.init()?;
    display.configure_rotation(options.rotation)?;

    let mut stats = StatsCollector::new();
    let result = match display.enable(options.width, options.height, options.width as i32) {
        Ok(()) => {
            log::info!(
                "Displaying {}x{} at {} fps",
                options.width,
                options.height,
                options.fps
            );
            feed(display, options, term, source, &mut stats)
        }
        Err(err) => Err(err.into()),
    };

    stats.record_teardown_failures(log_report("disable", display.disable()?));
    stats.record_teardown_failures(log_report("deinit", display.deinit()?));

    result?;
    Ok(stats.finalize())
}

fn feed<P, S>(
    display: &mut Display<P>,
    options: &FeedOptions,
    term: &AtomicBool,
    source: &mut S,
    stats: &mut StatsCollector,
) -> Result<(), CliError>
where
    P: Platform,
    S: FrameSource,
{
    let mut pacer = Pacer::new(options.fps);

    while !term.load(Ordering::Relaxed) {
        if options.frames > 0 && stats.frames() >= options.frames {
            break;
        }

        let buffer = display.acquire_buffer()?;
        let Some(len) = source.fill(buffer, stats.frames())? else {
            log::debug!("Frame source exhausted");
            break;
        };
        display.submit_buffer(len)?;
        stats.record_frame(len);

        pacer.wait();
    }

    if term.load(Ordering::Relaxed) {
        log::info!("Interrupted, shutting down");
    }
    Ok(())
}

fn log_report(phase: &str, report: TeardownReport) -> usize {
    for failure in report.failures() {
        log::warn!("{}: {}", phase, failure);
    }
    report.failures().len()
}

/// Print statistics as text or JSON
pub fn print_stats(stats: &FrameStats, json: bool) -> Result<(), CliError> {
    if json {
        stats
            .print_json()
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))
    } else {
        stats.print_text();
        Ok(())
    }
}
