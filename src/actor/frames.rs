//! Frame cycles for tick-driven sub-animations.
//!
//! A `FrameCycle` turns a tick counter into a frame index that is always in
//! bounds: looping cycles wrap to frame 0, one-shot cycles stop and hold the
//! last frame.

use crate::error::FrameError;

/// Tick counter mapped onto `len` frames, `step` ticks per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCycle {
    len: usize,
    step: u32,
    counter: u64,
    looping: bool,
    finished: bool,
}

impl FrameCycle {
    /// Create a cycle over `len` frames.
    ///
    /// A `step` of zero is treated as one tick per frame.
    pub fn new(len: usize, step: u32, looping: bool) -> Result<Self, FrameError> {
        if len == 0 {
            return Err(FrameError::NoFrames);
        }
        Ok(Self {
            len,
            step: step.max(1),
            counter: 0,
            looping,
            finished: false,
        })
    }

    /// Number of frames.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a cycle has at least one frame.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether a one-shot cycle has run past its end.
    #[inline]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the cycle wraps around.
    #[inline]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    fn span(&self) -> u64 {
        self.len as u64 * u64::from(self.step)
    }

    /// Current frame index, clamped to `0..len`.
    pub fn index(&self) -> usize {
        let raw = self.counter / u64::from(self.step);
        usize::try_from(raw).map_or(self.len - 1, |index| index.min(self.len - 1))
    }

    /// Advance one tick forward.
    ///
    /// Returns `false` once a one-shot cycle has passed its last frame.
    pub fn advance(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.counter += 1;
        if self.counter >= self.span() {
            if self.looping {
                self.counter = 0;
            } else {
                self.counter = self.span() - 1;
                self.finished = true;
                return false;
            }
        }
        true
    }

    /// Step one tick backward.
    ///
    /// Looping cycles wrap to the end of the last frame; one-shot cycles
    /// stop and hold frame 0.
    pub fn rewind(&mut self) -> bool {
        if self.finished {
            return false;
        }
        if self.counter == 0 {
            if self.looping {
                self.counter = self.span() - 1;
            } else {
                self.finished = true;
                return false;
            }
        } else {
            self.counter -= 1;
        }
        true
    }

    /// Jump to the first tick of the last frame.
    pub fn seek_last(&mut self) {
        self.counter = (self.len as u64 - 1) * u64::from(self.step);
        self.finished = false;
    }

    /// Back to frame 0.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.finished = false;
    }
}
