// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use signal_hook::consts::SIGINT;
use signal_hook::flag;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Parse resolution string in format "WxH" or "W*H"
pub fn parse_resolution(s: &str) -> Result<(u32, u32), CliError> {
    let (width_str, height_str) = s
        .split_once('x')
        .or_else(|| s.split_once('*'))
        .ok_or_else(|| {
            CliError::InvalidArgs(format!(
                "Invalid resolution format (expected WxH or W*H): {}",
                s
            ))
        })?;

    let width = width_str
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid width in resolution: {}", s)))?;
    let height = height_str
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid height in resolution: {}", s)))?;

    if width == 0 || height == 0 {
        return Err(CliError::InvalidArgs(format!(
            "Resolution dimensions must be positive: {}",
            s
        )));
    }
    // Display rectangles are 16-bit on the VideoCore
    if width > i16::MAX as u32 || height > i16::MAX as u32 {
        return Err(CliError::InvalidArgs(format!("Resolution too large: {}", s)));
    }

    Ok((width, height))
}

/// Parse an I420 resolution; both dimensions must be even for 4:2:0
/// chroma subsampling.
pub fn parse_i420_resolution(s: &str) -> Result<(u32, u32), CliError> {
    let (width, height) = parse_resolution(s)?;
    if width % 2 != 0 || height % 2 != 0 {
        return Err(CliError::InvalidArgs(format!(
            "I420 dimensions must be even: {}",
            s
        )));
    }
    Ok((width, height))
}

/// Bytes in one packed I420 frame.
pub fn i420_frame_size(width: u32, height: u32) -> usize {
    let luma = width as usize * height as usize;
    luma + luma / 2
}

/// Install signal handler for graceful shutdown on Ctrl+C
///
/// Returns an Arc<AtomicBool> that will be set to true when SIGINT is received.
pub fn install_signal_handler() -> Result<Arc<AtomicBool>, CliError> {
    let term = Arc::new(AtomicBool::new(false));

    flag::register(SIGINT, Arc::clone(&term))
        .map_err(|e| CliError::General(format!("Failed to register signal handler: {}", e)))?;

    log::debug!("Installed SIGINT handler");
    Ok(term)
}

/// Paces a loop to a fixed frame rate. A rate of zero disables pacing.
pub struct Pacer {
    interval: Option<Duration>,
    next: Instant,
}

impl Pacer {
    pub fn new(fps: f64) -> Self {
        let interval = if fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps).ok()
        } else {
            None
        };
        Pacer {
            interval,
            next: Instant::now(),
        }
    }

    /// Sleeps until the next frame is due.
    pub fn wait(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        self.next += interval;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        } else {
            // Running late, do not try to catch up
            self.next = now;
        }
    }
}
