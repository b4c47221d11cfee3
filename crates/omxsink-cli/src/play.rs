// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::metrics::FrameStats;
use crate::session::{self, DisplayTask, FeedOptions, FrameSource};
use crate::utils;
use clap::Args as ClapArgs;
use omxsink::{component::Platform, display::Display};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Raw I420 file, frames packed back to back
    input: PathBuf,

    /// Resolution of the frames in WxH format
    #[arg(short, long, default_value = "1920x1080")]
    resolution: String,

    /// Restart from the beginning at end of file
    #[arg(short = 'l', long = "loop")]
    looping: bool,

    /// Number of frames to display (0=until end of file)
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
    log::debug!("Play parameters: {:?}", args);

    let (width, height) = utils::parse_i420_resolution(&args.resolution)?;
    let file = File::open(&args.input)
        .map_err(|e| CliError::Io(format!("{}: {}", args.input.display(), e)))?;
    let frame_size = utils::i420_frame_size(width, height);

    let file_len = file.metadata()?.len();
    if file_len < frame_size as u64 {
        return Err(CliError::InvalidArgs(format!(
            "{} holds less than one {}x{} frame ({} < {} bytes)",
            args.input.display(),
            width,
            height,
            file_len,
            frame_size
        )));
    }
    if file_len % frame_size as u64 != 0 {
        log::warn!(
            "{} has {} trailing bytes that will be ignored",
            args.input.display(),
            file_len % frame_size as u64
        );
    }
    log::info!(
        "Playing {} ({} frames)",
        args.input.display(),
        file_len / frame_size as u64
    );

    let term = utils::install_signal_handler()?;
    let task = PlayTask {
        options: FeedOptions {
            width,
            height,
            rotation: args.rotation,
            fps: args.fps,
            frames: args.frames,
        },
        source: RawFrames {
            reader: BufReader::new(file),
            frame_size,
            looping: args.looping,
        },
        term,
    };

    let stats = session::dispatch(task, mock)?;
    session::print_stats(&stats, json)
}

struct PlayTask {
    options: FeedOptions,
    source: RawFrames<BufReader<File>>,
    term: Arc<AtomicBool>,
}

impl DisplayTask for PlayTask {
    type Output = FrameStats;

    fn run<P: Platform>(mut self, display: &mut Display<P>) -> Result<FrameStats, CliError> {
        session::run_feed(display, &self.options, &self.term, &mut self.source)
    }
}

/// Fixed-size frames read back to back from a seekable stream.
struct RawFrames<R> {
    reader: R,
    frame_size: usize,
    looping: bool,
}

impl<R: Read + Seek> FrameSource for RawFrames<R> {
    fn fill(&mut self, buffer: &mut [u8], _index: u64) -> Result<Option<usize>, CliError> {
        if buffer.len() < self.frame_size {
            return Err(CliError::Configuration(format!(
                "buffer of {} bytes cannot hold a {} byte frame",
                buffer.len(),
                self.frame_size
            )));
        }
        let frame = &mut buffer[..self.frame_size];

        match self.reader.read_exact(frame) {
            Ok(()) => return Ok(Some(self.frame_size)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
            Err(e) => return Err(e.into()),
        }

        if !self.looping {
            return Ok(None);
        }
        log::debug!("End of file, looping");
        self.reader.seek(SeekFrom::Start(0))?;
        self.reader.read_exact(frame)?;
        Ok(Some(self.frame_size))
    }
}
