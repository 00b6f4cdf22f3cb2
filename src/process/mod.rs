//! Processes: independent, message-driven units of game logic.
//!
//! A process is any type implementing [`Process`]. Starting one through a
//! [`Scheduler`] runs `init` on the calling thread and then moves the
//! process onto its own thread, where it handles its mailbox strictly in
//! send order:
//!
//! - `Tick` calls [`Process::tick`]; returning `Ok(false)` completes the
//!   process and starts its [`Process::next`] successor.
//! - `Quit` ends the process without a successor.
//! - `App(m)` calls [`Process::handle_message`].
//!
//! Any hook error ends the process, logs the error and skips the successor.
//! `cleanup` runs exactly once, whichever way the process ends.

mod animation;
mod delay;
mod handle;
mod message;
mod scheduler;

pub use animation::{AnimationCommand, AnimationFrame, AnimationMessage, AnimationProcess};
pub use delay::DelayProcess;
pub use handle::{ProcessHandle, ProcessId};
pub use message::{Message, ProcessState};
pub use scheduler::Scheduler;

use crate::error::ProcessError;

/// A unit of tick- and message-driven logic.
///
/// Every hook has a default, so the smallest process is an empty
/// `impl Process for MyType {}` that lives until quit.
pub trait Process<M = ()>: Send + 'static {
    /// Called once, synchronously, before the process is scheduled.
    fn init(&mut self) -> Result<(), ProcessError> {
        Ok(())
    }

    /// Called on each `Tick`. Return `Ok(false)` once the process is done.
    fn tick(&mut self) -> Result<bool, ProcessError> {
        Ok(true)
    }

    /// Called for each application message.
    fn handle_message(&mut self, message: M) -> Result<(), ProcessError> {
        let _ = message;
        Ok(())
    }

    /// Called exactly once when the process stops.
    fn cleanup(&mut self) {}

    /// Successor to start after a normal completion.
    fn next(&mut self) -> Option<Box<dyn Process<M>>> {
        None
    }

    /// Name used in logs and by [`ProcessHandle::is`].
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
