// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Fixed delays used while driving the component.

use std::{thread, time::Duration};

/// Blocks the calling thread, skipping the syscall for a zero duration.
pub fn sleep(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Delays and retry ceiling applied by the display controller.
///
/// The defaults are tuned for the VideoCore IV video_render component.
/// [`Timings::none`] removes every delay, which is what the mock backend
/// wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Sleep between two state or port queries.
    pub poll_interval: Duration,

    /// Maximum number of queries before a wait is abandoned.
    pub poll_attempts: u32,

    /// Stand-in for waiting on flush completion, which is never signalled.
    pub flush: Duration,

    /// Settle time after the port is confirmed enabled.
    pub port_settle: Duration,

    /// Settle time after each successful buffer free and after the batch.
    pub buffer_free: Duration,

    /// Settle time after the component handle is released.
    pub handle_release: Duration,
}

impl Timings {
    pub const DEFAULT_POLL_ATTEMPTS: u32 = 200;

    /// No delays at all, keeping the default retry ceiling.
    pub fn none() -> Self {
        Timings {
            poll_interval: Duration::ZERO,
            poll_attempts: Self::DEFAULT_POLL_ATTEMPTS,
            flush: Duration::ZERO,
            port_settle: Duration::ZERO,
            buffer_free: Duration::ZERO,
            handle_release: Duration::ZERO,
        }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Timings {
            poll_interval,
            ..self
        }
    }

    pub fn with_poll_attempts(self, poll_attempts: u32) -> Self {
        Timings {
            poll_attempts,
            ..self
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            poll_interval: Duration::from_millis(1),
            poll_attempts: Self::DEFAULT_POLL_ATTEMPTS,
            flush: Duration::from_millis(25),
            port_settle: Duration::from_millis(10),
            buffer_free: Duration::from_millis(1),
            handle_release: Duration::from_millis(20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_sleep() {
        let start = Instant::now();
        sleep(Duration::from_millis(2));
        assert!(start.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn test_default_timings() {
        let timings = Timings::default();
        assert_eq!(timings.poll_interval, Duration::from_millis(1));
        assert_eq!(timings.poll_attempts, 200);
        assert_eq!(timings.flush, Duration::from_millis(25));
    }

    #[test]
    fn test_none_keeps_ceiling() {
        let timings = Timings::none().with_poll_attempts(7);
        assert_eq!(timings.poll_attempts, 7);
        assert!(timings.poll_interval.is_zero());
        assert!(timings.handle_release.is_zero());
    }
}
