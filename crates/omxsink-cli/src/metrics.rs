// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use serde::Serialize;
use std::time::Instant;

/// Statistics of a frame feed session
#[derive(Debug, Clone, Serialize)]
pub struct FrameStats {
    /// Total number of frames submitted
    pub frames: u64,
    /// Total payload bytes submitted
    pub bytes: u64,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Average frame rate
    pub fps: f64,
    /// Average bandwidth in megabits per second
    pub bandwidth_mbps: f64,
    /// Number of teardown steps the hardware reported as failed
    pub teardown_failures: usize,
}

/// Collector for frame feed statistics
pub struct StatsCollector {
    start_time: Instant,
    frames: u64,
    bytes: u64,
    teardown_failures: usize,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            frames: 0,
            bytes: 0,
            teardown_failures: 0,
        }
    }

    /// Record one submitted frame of `bytes` payload
    pub fn record_frame(&mut self, bytes: usize) {
        self.frames += 1;
        self.bytes += bytes as u64;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn record_teardown_failures(&mut self, count: usize) {
        self.teardown_failures += count;
    }

    /// Finalize and calculate all statistics
    pub fn finalize(&self) -> FrameStats {
        let duration = self.start_time.elapsed();
        let duration_secs = duration.as_secs_f64();

        let (fps, bandwidth_mbps) = if duration_secs > 0.0 {
            (
                self.frames as f64 / duration_secs,
                (self.bytes as f64 * 8.0) / (duration_secs * 1_000_000.0),
            )
        } else {
            (0.0, 0.0)
        };

        FrameStats {
            frames: self.frames,
            bytes: self.bytes,
            duration_ms: duration.as_millis() as u64,
            fps,
            bandwidth_mbps,
            teardown_failures: self.teardown_failures,
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    /// Print statistics in human-readable format
    pub fn print_text(&self) {
        println!("\n=== Frame Statistics ===");
        println!("Frames submitted:  {}", self.frames);
        println!(
            "Bytes submitted:   {} ({:.2} MB)",
            self.bytes,
            self.bytes as f64 / 1_048_576.0
        );
        println!("Duration:          {:.2} s", self.duration_ms as f64 / 1000.0);
        println!("Frame rate:        {:.2} fps", self.fps);
        println!("Bandwidth:         {:.2} Mbps", self.bandwidth_mbps);
        if self.teardown_failures > 0 {
            println!("Teardown failures: {}", self.teardown_failures);
        }
    }

    /// Print statistics in JSON format
    pub fn print_json(&self) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string_pretty(self)?;
        println!("{}", json);
        Ok(())
    }
}
