// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Steady-state frame feed: acquire a buffer, fill it, submit it.

use super::Display;
use crate::{
    component::{Buffer, BufferFlags, BufferHeader, Component, Platform},
    Error, Resource,
};

impl<P: Platform> Display<P> {
    /// Advances to the next buffer of the pool and returns its storage.
    ///
    /// The first call after `enable` hands out buffer 1, then 2, and so on,
    /// wrapping back to 0. The buffer's filled length is preset to its full
    /// capacity; [`Display::submit_buffer`] overrides it with the length
    /// actually used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before a successful `enable`.
    pub fn acquire_buffer(&mut self) -> Result<&mut [u8], Error> {
        if self.component.is_none() {
            return Err(Error::NotInitialized(Resource::Component));
        }
        let buffer = self
            .pool
            .acquire()
            .ok_or(Error::NotInitialized(Resource::BufferPool))?;

        let header = BufferHeader {
            filled_len: buffer.capacity(),
            ..buffer.header()
        };
        buffer.set_header(header);
        Ok(buffer.data())
    }

    /// Submits the buffer returned by the last [`Display::acquire_buffer`]
    /// with `used` bytes of payload. Completion is not awaited.
    ///
    /// A submission the hardware rejects is logged and the frame is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before a successful `enable`.
    pub fn submit_buffer(&mut self, used: usize) -> Result<(), Error> {
        let component = self
            .component
            .as_mut()
            .ok_or(Error::NotInitialized(Resource::Component))?;
        let index = self.pool.cursor();
        let buffer = self
            .pool
            .current_mut()
            .ok_or(Error::NotInitialized(Resource::BufferPool))?;

        let capacity = buffer.capacity();
        let filled_len = match u32::try_from(used) {
            Ok(len) if len <= capacity => len,
            _ => {
                log::warn!(
                    "submitted length {} exceeds buffer capacity {}, clamping",
                    used,
                    capacity
                );
                capacity
            }
        };

        buffer.set_header(BufferHeader {
            filled_len,
            offset: 0,
            flags: BufferFlags::START_TIME,
            timestamp: 0,
        });

        log::trace!("submitting buffer {} ({} bytes)", index, filled_len);
        if let Err(err) = component.empty_buffer(buffer) {
            log::warn!("failed to submit buffer {}: {}", index, err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        component::BufferFlags,
        display::Display,
        mock::{MockConfig, MockPlatform},
        timing::Timings,
        Error, Resource,
    };

    fn enabled(config: MockConfig) -> Display<MockPlatform> {
        let mut display = Display::new(MockPlatform::new(config)).with_timings(Timings::none());
        display.init().unwrap();
        display.enable(64, 32, 64).unwrap();
        display
    }

    #[test]
    fn test_acquire_before_enable() {
        let mut display = Display::new(MockPlatform::default()).with_timings(Timings::none());
        assert!(matches!(
            display.acquire_buffer(),
            Err(Error::NotInitialized(Resource::Component))
        ));
        display.init().unwrap();
        assert!(matches!(
            display.acquire_buffer(),
            Err(Error::NotInitialized(Resource::BufferPool))
        ));
        assert!(matches!(
            display.submit_buffer(16),
            Err(Error::NotInitialized(Resource::BufferPool))
        ));
    }

    #[test]
    fn test_acquire_returns_full_capacity() {
        let mut display = enabled(MockConfig::default());
        let data = display.acquire_buffer().unwrap();
        assert_eq!(data.len(), 3072);
        data.fill(0x10);
        assert_eq!(display.cursor(), 1);
    }

    #[test]
    fn test_submit_sets_header() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = enabled(config);

        display.acquire_buffer().unwrap()[..4].copy_from_slice(&[1, 2, 3, 4]);
        display.submit_buffer(1000).unwrap();

        let submissions = journal.submissions();
        assert_eq!(submissions.len(), 1);
        let submission = &submissions[0];
        assert_eq!(submission.id, 1);
        assert_eq!(submission.header.filled_len, 1000);
        assert_eq!(submission.header.offset, 0);
        assert_eq!(submission.header.timestamp, 0);
        assert_eq!(submission.header.flags, BufferFlags::START_TIME);
        assert_eq!(&submission.data[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_submit_clamps_to_capacity() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = enabled(config);
        display.acquire_buffer().unwrap();
        display.submit_buffer(usize::MAX).unwrap();
        assert_eq!(journal.submissions()[0].header.filled_len, 3072);
    }

    #[test]
    fn test_submit_failure_is_not_fatal() {
        let config = MockConfig::default().with_failing_submissions();
        let journal = config.journal();
        let mut display = enabled(config);
        display.acquire_buffer().unwrap();
        display.submit_buffer(16).unwrap();
        assert_eq!(journal.submissions().len(), 1);
    }

    #[test]
    fn test_feed_continues_after_rejected_frames() {
        let config = MockConfig::default();
        let journal = config.journal();
        let mut display = enabled(config);

        journal.set_failing_submissions(true);
        for _ in 0..2 {
            display.acquire_buffer().unwrap();
            display.submit_buffer(8).unwrap();
        }
        journal.set_failing_submissions(false);
        display.acquire_buffer().unwrap();
        display.submit_buffer(8).unwrap();

        let ids: Vec<usize> = journal.submissions().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert_eq!(display.cursor(), 0);
    }

    #[test]
    fn test_feed_cycles_through_pool() {
        let config = MockConfig::default().with_buffer_count(4);
        let journal = config.journal();
        let mut display = enabled(config);
        for _ in 0..10 {
            display.acquire_buffer().unwrap();
            display.submit_buffer(8).unwrap();
        }
        let ids: Vec<usize> = journal.submissions().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 0, 1, 2, 3, 0, 1, 2]);
    }
}
