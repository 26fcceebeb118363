//! Mount/unmount bookkeeping for a running effect.
//!
//! An effect is either [`Phase::Idle`] (nothing attached) or
//! [`Phase::Running`] (listeners attached, one animation frame pending).
//! [`Lifecycle`] owns the handles for both and guarantees that unmounting
//! cancels the frame and detaches every listener, whatever path led there.
//! The browser side implements [`Host`]; tests use a recording host.

use crate::error::Result;
use crate::input::Binding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// Environment that can attach listeners and schedule frames.
pub trait Host {
    type Listener;
    type Frame;

    fn attach(&mut self, binding: Binding) -> Result<Self::Listener>;
    fn detach(&mut self, listener: Self::Listener);
    fn schedule(&mut self) -> Result<Self::Frame>;
    fn cancel(&mut self, frame: Self::Frame);
}

pub struct Lifecycle<H: Host> {
    listeners: Vec<H::Listener>,
    frame: Option<H::Frame>,
    frames: u64,
    phase: Phase,
}

impl<H: Host> Default for Lifecycle<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Lifecycle<H> {
    pub fn new() -> Self {
        Self { listeners: Vec::new(), frame: None, frames: 0, phase: Phase::Idle }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn pending_frame(&self) -> Option<&H::Frame> {
        self.frame.as_ref()
    }

    /// Frames completed since mount.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Idle -> Running. On failure nothing stays attached.
    pub fn mount(&mut self, host: &mut H, bindings: &[Binding]) -> Result<()> {
        if self.phase == Phase::Running {
            return Ok(());
        }
        for binding in bindings {
            match host.attach(*binding) {
                Ok(listener) => self.listeners.push(listener),
                Err(e) => {
                    self.release(host);
                    return Err(e);
                }
            }
        }
        match host.schedule() {
            Ok(frame) => self.frame = Some(frame),
            Err(e) => {
                self.release(host);
                return Err(e);
            }
        }
        self.frames = 0;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Called from the frame callback after drawing; schedules the next one.
    pub fn frame(&mut self, host: &mut H) -> Result<()> {
        // The frame that just ran is spent.
        self.frame = None;
        if self.phase != Phase::Running {
            return Ok(());
        }
        self.frames += 1;
        match host.schedule() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(())
            }
            Err(e) => {
                self.unmount(host);
                Err(e)
            }
        }
    }

    /// Running -> Idle. Idempotent.
    pub fn unmount(&mut self, host: &mut H) {
        self.release(host);
        self.phase = Phase::Idle;
    }

    fn release(&mut self, host: &mut H) {
        if let Some(frame) = self.frame.take() {
            host.cancel(frame);
        }
        for listener in self.listeners.drain(..) {
            host.detach(listener);
        }
    }
}
