//! Message and lifecycle types for processes.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// A message delivered to a process mailbox.
///
/// `Tick` and `Quit` are handled by the scheduler itself; everything the
/// application wants to say travels as `App`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<M = ()> {
    /// Advance the process by one simulation step.
    Tick,
    /// Terminate immediately, without starting a successor.
    Quit,
    /// Application payload, forwarded to [`Process::handle_message`](super::Process::handle_message).
    App(M),
}

/// Lifecycle of a scheduled process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProcessState {
    /// `init` is running on the caller.
    Initializing = 0,
    /// The receive loop is live.
    Running = 1,
    /// The receive loop exited; cleanup and successor dispatch in progress.
    Quitting = 2,
    /// The mailbox is closed and the process left the live set.
    Terminated = 3,
}

impl ProcessState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Initializing,
            1 => Self::Running,
            2 => Self::Quitting,
            _ => Self::Terminated,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Quitting => "quitting",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Atomic cell holding a [`ProcessState`].
#[derive(Debug)]
pub(crate) struct AtomicProcessState(AtomicU8);

impl AtomicProcessState {
    pub(crate) const fn new(state: ProcessState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> ProcessState {
        ProcessState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: ProcessState) {
        self.0.store(state as u8, Ordering::Release);
    }
}
