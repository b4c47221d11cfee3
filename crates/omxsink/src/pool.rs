// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Fixed-size pool of hardware buffers bound to one port.
//!
//! The pool is the only owner of buffer lifetime. It is either empty or holds
//! exactly the number of buffers the port asked for: a failed allocation is
//! unwound before the error is returned.

use crate::{
    component::{Buffer, Component},
    display::{Step, StepFailure},
    timing, Error,
};
use std::time::Duration;

pub struct BufferPool<B> {
    buffers: Vec<B>,
    current: usize,
    free_settle: Duration,
}

impl<B: Buffer> BufferPool<B> {
    pub fn new() -> Self {
        BufferPool {
            buffers: Vec::new(),
            current: 0,
            free_settle: Duration::ZERO,
        }
    }

    /// Sleep applied after each successful free and after a release batch.
    pub fn with_free_settle(self, free_settle: Duration) -> Self {
        BufferPool {
            free_settle,
            ..self
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Index of the buffer handed out by the last [`BufferPool::acquire`].
    pub fn cursor(&self) -> usize {
        self.current
    }

    /// Allocates `count` buffers of `size` bytes on `port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the pool already holds buffers or
    /// `count` is zero, and [`Error::OutOfMemory`] if any allocation fails. On
    /// failure every buffer allocated so far is freed again and the pool stays
    /// empty.
    pub fn allocate<C>(
        &mut self,
        component: &mut C,
        port: u32,
        count: u32,
        size: u32,
    ) -> Result<(), Error>
    where
        C: Component<Buffer = B> + ?Sized,
    {
        if !self.buffers.is_empty() {
            return Err(Error::InvalidState("buffer pool is already allocated"));
        }
        if count == 0 {
            return Err(Error::InvalidState("port requested zero buffers"));
        }

        let mut buffers = Vec::with_capacity(count as usize);
        for index in 0..count {
            log::trace!("allocating buffer {} ({} bytes) on port {}", index, size, port);
            match component.allocate_buffer(port, size) {
                Ok(buffer) => buffers.push(buffer),
                Err(err) => {
                    log::error!("buffer allocation {} of {} failed: {}", index, count, err);
                    for (freed, buffer) in buffers.into_iter().enumerate() {
                        if let Err(err) = component.free_buffer(port, buffer) {
                            log::warn!("unwinding buffer {} failed: {}", freed, err);
                        }
                    }
                    return Err(Error::OutOfMemory(err));
                }
            }
        }

        log::debug!("allocated {} buffers of {} bytes on port {}", count, size, port);
        self.buffers = buffers;
        self.current = 0;
        Ok(())
    }

    /// Frees every buffer, continuing past individual failures.
    ///
    /// The pool is empty and the cursor reset afterwards regardless of what
    /// the hardware reported. Returns the frees that failed.
    pub fn release<C>(&mut self, component: &mut C, port: u32) -> Vec<StepFailure>
    where
        C: Component<Buffer = B> + ?Sized,
    {
        let mut failures = Vec::new();
        if self.buffers.is_empty() {
            return failures;
        }

        for (index, buffer) in self.buffers.drain(..).enumerate() {
            match component.free_buffer(port, buffer) {
                Ok(()) => {
                    log::trace!("freed buffer {}", index);
                    timing::sleep(self.free_settle);
                }
                Err(err) => {
                    log::warn!("freeing buffer {} failed: {}", index, err);
                    failures.push(StepFailure::new(Step::FreeBuffer(index), err));
                }
            }
        }

        timing::sleep(self.free_settle);
        self.current = 0;
        log::debug!("released buffer pool on port {}", port);
        failures
    }

    /// Advances the cursor, wrapping at the end of the pool, and returns the
    /// buffer it now points at. `None` if the pool is empty.
    pub fn acquire(&mut self) -> Option<&mut B> {
        if self.buffers.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.buffers.len();
        self.buffers.get_mut(self.current)
    }

    /// The buffer at the cursor, without advancing.
    pub fn current_mut(&mut self) -> Option<&mut B> {
        self.buffers.get_mut(self.current)
    }

    pub fn get(&self, index: usize) -> Option<&B> {
        self.buffers.get(index)
    }
}

impl<B: Buffer> Default for BufferPool<B> {
    fn default() -> Self {
        Self::new()
    }
}
