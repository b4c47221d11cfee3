// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::session::{self, DisplayTask, FeedOptions, FrameSource};
use crate::utils;
use clap::Args as ClapArgs;
use omxsink::{component::Platform, display::Display};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Resolution in WxH format
    #[arg(short, long, default_value = "1280x720")]
    resolution: String,

    /// Number of frames to display (0=unlimited)
    #[arg(short, long, default_value = "0")]
    frames: u64,

    /// Display rotation in degrees (0, 90, 180 or 270)
    #[arg(short = 'R', long, default_value = "0", allow_hyphen_values = true)]
    rotation: i32,

    /// Target frame rate (0=as fast as the hardware accepts)
    #[arg(short = 'F', long, default_value = "30")]
    fps: f64,
}

pub fn execute(args: Args, json: bool, mock: bool) -> Result<(), CliError> {
    log::debug!("Pattern parameters: {:?}", args);

    let (width, height) = utils::parse_i420_resolution(&args.resolution)?;
    let term = utils::install_signal_handler()?;

    let task = PatternTask {
        options: FeedOptions {
            width,
            height,
            rotation: args.rotation,
            fps: args.fps,
            frames: args.frames,
        },
        term,
    };

    let stats = session::dispatch(task, mock)?;
    session::print_stats(&stats, json)
}

struct PatternTask {
    options: FeedOptions,
    term: Arc<AtomicBool>,
}

impl DisplayTask for PatternTask {
    type Output = crate::metrics::FrameStats;

    fn run<P: Platform>(self, display: &mut Display<P>) -> Result<Self::Output, CliError> {
        let mut source = TestPattern {
            width: self.options.width as usize,
            height: self.options.height as usize,
        };
        session::run_feed(display, &self.options, &self.term, &mut source)
    }
}

/// Diagonal luma ramp scrolling one step per frame over slowly cycling
/// chroma.
struct TestPattern {
    width: usize,
    height: usize,
}

impl FrameSource for TestPattern {
    fn fill(&mut self, buffer: &mut [u8], index: u64) -> Result<Option<usize>, CliError> {
        Ok(Some(fill_i420(buffer, self.width, self.height, index)))
    }
}

/// Writes one packed I420 frame into `buffer`, truncated to its length.
/// Returns the number of bytes written.
pub fn fill_i420(buffer: &mut [u8], width: usize, height: usize, frame: u64) -> usize {
    let luma = width * height;
    let chroma = luma / 4;
    let size = (luma + 2 * chroma).min(buffer.len());
    if size < luma + 2 * chroma {
        log::warn!(
            "Buffer of {} bytes truncates {}x{} frame",
            buffer.len(),
            width,
            height
        );
    }

    let shift = (frame as usize).wrapping_mul(4);
    let (y_plane, rest) = buffer[..size].split_at_mut(luma.min(size));
    for (i, px) in y_plane.iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        *px = (x.wrapping_add(y).wrapping_add(shift) & 0xff) as u8;
    }

    let cb = (frame % 256) as u8;
    let (u_plane, v_plane) = rest.split_at_mut(chroma.min(rest.len()));
    u_plane.fill(cb);
    v_plane.fill(255 - cb);

    size
}
