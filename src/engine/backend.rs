//! The render/event source the loop drives.

use super::event::{Event, KeyCode, KeyEvent};
use super::timing::ManualClock;
use crate::config::Rgb;
use crate::error::EngineError;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Display and event source.
pub trait Backend {
    /// Block until the next event arrives.
    ///
    /// # Errors
    ///
    /// A failing event source is fatal to the run.
    fn wait_event(&mut self) -> Result<Event, EngineError>;

    /// Whether no further event is already waiting.
    fn queue_is_empty(&self) -> bool;

    /// Clear the frame to `color`.
    ///
    /// # Errors
    ///
    /// Returns an error if the display rejects the write.
    fn clear(&mut self, color: Rgb) -> Result<(), EngineError>;

    /// Show the finished frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the display rejects the write.
    fn present(&mut self) -> Result<(), EngineError>;
}

/// One entry of a [`ScriptedBackend`] script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Deliver an event.
    Event(Event),
    /// Let time pass on the backend's clock.
    Advance(Duration),
    /// Fail the event source.
    Fail(String),
}

/// Backend that replays a fixed script against a [`ManualClock`].
///
/// Events separated by an `Advance` count as arriving later, so the event
/// queue looks empty right before an `Advance`. Once the script runs out
/// the backend reports `Close`.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: VecDeque<Cue>,
    clock: ManualClock,
    clears: Vec<Rgb>,
    presented: u64,
}

impl ScriptedBackend {
    /// An empty script driving `clock`.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    /// Clock this backend advances.
    pub const fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Append a cue.
    #[must_use]
    pub fn cue(mut self, cue: Cue) -> Self {
        self.script.push_back(cue);
        self
    }

    /// Append an event.
    #[must_use]
    pub fn event(self, event: Event) -> Self {
        self.cue(Cue::Event(event))
    }

    /// Append a pause.
    #[must_use]
    pub fn advance(self, by: Duration) -> Self {
        self.cue(Cue::Advance(by))
    }

    /// Append `by` of elapsed time followed by a timer event.
    #[must_use]
    pub fn frame(self, by: Duration) -> Self {
        self.advance(by).event(Event::Timer)
    }

    /// Append `count` frames of `by` each.
    #[must_use]
    pub fn frames(self, count: usize, by: Duration) -> Self {
        (0..count).fold(self, |backend, _| backend.frame(by))
    }

    /// Append a key press and release.
    #[must_use]
    pub fn key(self, code: KeyCode) -> Self {
        self.event(Event::KeyDown(KeyEvent::plain(code)))
            .event(Event::KeyUp(KeyEvent::plain(code)))
    }

    /// Append an event source failure.
    #[must_use]
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.cue(Cue::Fail(message.into()))
    }

    /// Colors passed to `clear`, one per rendered frame.
    pub fn clears(&self) -> &[Rgb] {
        &self.clears
    }

    /// Number of presented frames.
    pub const fn presented(&self) -> u64 {
        self.presented
    }

    /// Cues not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Backend for ScriptedBackend {
    fn wait_event(&mut self) -> Result<Event, EngineError> {
        loop {
            match self.script.pop_front() {
                Some(Cue::Event(event)) => return Ok(event),
                Some(Cue::Advance(by)) => self.clock.advance(by),
                Some(Cue::Fail(message)) => {
                    return Err(EngineError::Backend(io::Error::other(message)));
                }
                None => return Ok(Event::Close),
            }
        }
    }

    fn queue_is_empty(&self) -> bool {
        !matches!(self.script.front(), Some(Cue::Event(_) | Cue::Fail(_)))
    }

    fn clear(&mut self, color: Rgb) -> Result<(), EngineError> {
        self.clears.push(color);
        Ok(())
    }

    fn present(&mut self) -> Result<(), EngineError> {
        self.presented += 1;
        Ok(())
    }
}
