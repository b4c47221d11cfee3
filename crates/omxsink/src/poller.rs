// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Bounded busy-wait on component state and port transitions.
//!
//! The component reports command completion through asynchronous callbacks.
//! Instead of synchronising on those, the controller re-queries the hardware
//! at a fixed interval until the expected value shows up or the retry ceiling
//! is hit. Running out of attempts is logged and reported as
//! [`PollOutcome::TimedOut`], never as an error: the caller carries on with
//! the sequence either way.

use crate::{
    component::{Component, State},
    timing::{self, Timings},
};
use std::time::Duration;

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The expected value was observed on query number `attempts`.
    Reached { attempts: u32 },
    /// The ceiling was hit after `attempts` queries.
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn reached(&self) -> bool {
        matches!(self, PollOutcome::Reached { .. })
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            PollOutcome::Reached { attempts } | PollOutcome::TimedOut { attempts } => attempts,
        }
    }
}

/// Retry-with-ceiling helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    attempts: u32,
    interval: Duration,
}

impl Poller {
    /// A poller making at most `attempts` queries, `interval` apart. At least
    /// one query is always made.
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Poller {
            attempts: attempts.max(1),
            interval,
        }
    }

    pub fn from_timings(timings: &Timings) -> Self {
        Poller::new(timings.poll_attempts, timings.poll_interval)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Calls `check` until it returns `true` or the ceiling is reached,
    /// sleeping between calls. `what` names the awaited condition in logs.
    pub fn retry<F>(&self, what: &str, mut check: F) -> PollOutcome
    where
        F: FnMut() -> bool,
    {
        for attempt in 1..=self.attempts {
            if check() {
                log::trace!("{} after {} queries", what, attempt);
                return PollOutcome::Reached { attempts: attempt };
            }
            if attempt < self.attempts {
                timing::sleep(self.interval);
            }
        }

        log::warn!("timed out waiting for {} after {} queries", what, self.attempts);
        PollOutcome::TimedOut {
            attempts: self.attempts,
        }
    }

    /// Waits until the component reports `target`.
    pub fn wait_for_state<C>(&self, component: &mut C, target: State) -> PollOutcome
    where
        C: Component + ?Sized,
    {
        let what = format!("state {}", target);
        self.retry(&what, || match component.state() {
            Ok(state) => state == target,
            Err(err) => {
                log::debug!("state query failed: {}", err);
                false
            }
        })
    }

    /// Waits until `port` reports the `enabled` flag.
    pub fn wait_for_port<C>(&self, component: &mut C, port: u32, enabled: bool) -> PollOutcome
    where
        C: Component + ?Sized,
    {
        let what = format!(
            "port {} {}",
            port,
            if enabled { "enabled" } else { "disabled" }
        );
        self.retry(&what, || match component.port_definition(port) {
            Ok(definition) => definition.enabled == enabled,
            Err(err) => {
                log::debug!("port definition query failed: {}", err);
                false
            }
        })
    }
}

impl Default for Poller {
    fn default() -> Self {
        Poller::from_timings(&Timings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_never_reached_stops_at_ceiling() {
        let poller = Poller::new(200, Duration::ZERO);
        let mut queries = 0;
        let outcome = poller.retry("nothing", || {
            queries += 1;
            false
        });
        assert_eq!(queries, 200);
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 200 });
        assert!(!outcome.reached());
    }

    #[test]
    fn test_reached_after_some_queries() {
        let poller = Poller::new(200, Duration::ZERO);
        let mut queries = 0;
        let outcome = poller.retry("third query", || {
            queries += 1;
            queries == 3
        });
        assert_eq!(queries, 3);
        assert_eq!(outcome, PollOutcome::Reached { attempts: 3 });
    }

    #[test]
    fn test_queries_even_when_already_matching() {
        let poller = Poller::new(200, Duration::ZERO);
        let mut queries = 0;
        let outcome = poller.retry("immediate", || {
            queries += 1;
            true
        });
        assert_eq!(queries, 1);
        assert_eq!(outcome.attempts(), 1);
    }

    #[test]
    fn test_zero_ceiling_still_queries_once() {
        let poller = Poller::new(0, Duration::ZERO);
        let mut queries = 0;
        poller.retry("zero", || {
            queries += 1;
            false
        });
        assert_eq!(queries, 1);
    }

    #[test]
    fn test_sleeps_between_queries_only() {
        // 3 queries means 2 sleeps
        let poller = Poller::new(3, Duration::from_millis(5));
        let start = Instant::now();
        poller.retry("sleepy", || false);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
    }
}
