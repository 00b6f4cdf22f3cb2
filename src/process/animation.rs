//! `AnimationProcess`: cycles through frames on ticks.
//!
//! The process owns the timing; whoever renders reads the current frame
//! through an [`AnimationFrame`] handle taken before the process is started.

use super::Process;
use crate::actor::FrameCycle;
use crate::error::{FrameError, ProcessError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Commands understood by [`AnimationProcess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCommand {
    /// Stop advancing frames.
    Pause,
    /// Continue advancing frames.
    Resume,
    /// Jump back to the starting frame.
    Reset,
}

/// Application messages that may carry an [`AnimationCommand`].
///
/// Implement this for your message type so animations can be paused
/// with `notify_where`.
pub trait AnimationMessage {
    /// The animation command inside this message, if any.
    fn animation_command(&self) -> Option<AnimationCommand>;
}

impl AnimationMessage for AnimationCommand {
    fn animation_command(&self) -> Option<AnimationCommand> {
        Some(*self)
    }
}

impl AnimationMessage for () {
    fn animation_command(&self) -> Option<AnimationCommand> {
        None
    }
}

/// Read side of a running animation.
#[derive(Debug)]
pub struct AnimationFrame<T> {
    frames: Arc<[T]>,
    index: Arc<AtomicUsize>,
}

impl<T> Clone for AnimationFrame<T> {
    fn clone(&self) -> Self {
        Self {
            frames: Arc::clone(&self.frames),
            index: Arc::clone(&self.index),
        }
    }
}

impl<T> AnimationFrame<T> {
    /// Index of the frame currently shown.
    #[inline]
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    /// The frame currently shown, or `None` for an empty frame list.
    pub fn current(&self) -> Option<&T> {
        self.frames.get(self.index())
    }
}

/// A process that advances through `frames`, `step` ticks per frame.
pub struct AnimationProcess<T> {
    frames: Arc<[T]>,
    index: Arc<AtomicUsize>,
    step: u32,
    cycle: Option<FrameCycle>,
    /// Wrap around instead of completing.
    pub repeat: bool,
    /// Hold the current frame.
    pub paused: bool,
    /// Run backwards, starting from the last frame.
    pub reversed: bool,
}

impl<T: Send + Sync + 'static> AnimationProcess<T> {
    /// Create an animation over `frames`.
    pub fn new(frames: impl Into<Arc<[T]>>, step: u32) -> Self {
        Self {
            frames: frames.into(),
            index: Arc::new(AtomicUsize::new(0)),
            step,
            cycle: None,
            repeat: false,
            paused: false,
            reversed: false,
        }
    }

    /// Loop forever instead of completing after the last frame.
    #[must_use]
    pub const fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Play backwards.
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Handle for reading the current frame from elsewhere.
    pub fn frame(&self) -> AnimationFrame<T> {
        AnimationFrame {
            frames: Arc::clone(&self.frames),
            index: Arc::clone(&self.index),
        }
    }

    fn publish(&self) {
        if let Some(cycle) = &self.cycle {
            self.index.store(cycle.index(), Ordering::Release);
        }
    }

    fn rewind_to_start(&mut self) {
        let reversed = self.reversed;
        if let Some(cycle) = self.cycle.as_mut() {
            if reversed {
                cycle.seek_last();
            } else {
                cycle.reset();
            }
        }
        self.publish();
    }
}

impl<T, M> Process<M> for AnimationProcess<T>
where
    T: Send + Sync + 'static,
    M: AnimationMessage + Send + 'static,
{
    fn init(&mut self) -> Result<(), ProcessError> {
        if self.frames.is_empty() {
            return Err(FrameError::NoFrames.into());
        }
        self.cycle = Some(FrameCycle::new(self.frames.len(), self.step, self.repeat)?);
        self.rewind_to_start();
        Ok(())
    }

    fn tick(&mut self) -> Result<bool, ProcessError> {
        if self.paused {
            return Ok(true);
        }
        let reversed = self.reversed;
        let Some(cycle) = self.cycle.as_mut() else {
            return Ok(false);
        };
        let alive = if reversed {
            cycle.rewind()
        } else {
            cycle.advance()
        };
        self.publish();
        Ok(alive)
    }

    fn handle_message(&mut self, message: M) -> Result<(), ProcessError> {
        match message.animation_command() {
            Some(AnimationCommand::Pause) => self.paused = true,
            Some(AnimationCommand::Resume) => self.paused = false,
            Some(AnimationCommand::Reset) => self.rewind_to_start(),
            None => {}
        }
        Ok(())
    }
}
