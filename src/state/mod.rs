//! Game states and the state stack.
//!
//! The top of the [`StateStack`] is the current state. Each state owns a
//! [`Stage`]: the processes, actors and views registered while it was
//! current. Popping a state tears its stage down, so nothing registered
//! under it outlives it.
//!
//! ```text
//!   top ─▶ ┌──────────────┐  Stage g3: scheduler, actors, views
//!          │ Paused       │
//!          ├──────────────┤  Stage g2 (paused)
//!          │ Playing      │
//!          └──────────────┘
//! ```

mod stack;
mod stage;

pub use stack::StateStack;
pub use stage::{Stage, Transition};

use crate::engine::Event;

/// One screen or mode of the game.
///
/// All hooks default to doing nothing.
pub trait GameState<M = ()>: Send + 'static {
    /// Called once after the state is pushed.
    fn init(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// Called once per simulation step, after processes were ticked and
    /// actors and views were stepped.
    fn update(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// Called once per frame, before the actors are rendered.
    fn render(&mut self, stage: &Stage<M>, delta: f32) {
        let _ = (stage, delta);
    }

    /// Offered every input event first. Return `true` to consume it.
    fn handle_event(&mut self, stage: &Stage<M>, event: &Event) -> bool {
        let _ = (stage, event);
        false
    }

    /// Another state was pushed above this one.
    fn pause(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// The state above this one was popped.
    fn resume(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// Called once when the state is popped, before its stage is torn down.
    fn cleanup(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// Name for logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A listener attached to a state: receives events the state did not
/// consume and is updated once per step.
pub trait View<M = ()>: Send + 'static {
    /// Called once when the view is added.
    fn init(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// Return `true` to consume the event.
    fn handle_event(&mut self, stage: &Stage<M>, event: &Event) -> bool {
        let _ = (stage, event);
        false
    }

    /// Called once per simulation step.
    fn update(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }

    /// Called once when the owning state is popped.
    fn cleanup(&mut self, stage: &Stage<M>) {
        let _ = stage;
    }
}
