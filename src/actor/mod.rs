//! Actors: the things that live in a game state.
//!
//! Actors are stepped once per simulation step and rendered once per frame,
//! on the driver thread. Each actor is registered under a layer of the
//! state that was current when it was added; rendering visits layers in
//! ascending order and actors within a layer in registration order.
//!
//! # Layout
//!
//! ```text
//! ActorRegistry
//! ├── flat list      [a, b, c, d]        step order
//! └── layers
//!     ├── 0 ─▶ [b]                        render order
//!     ├── 1 ─▶ [a, d]
//!     └── 2 ─▶ [c]
//! ```

mod body;
mod frames;
mod registry;
mod stateful;

pub use body::{ActorId, Body};
pub use frames::FrameCycle;
pub use registry::{ActorHandle, ActorRef, ActorRegistry};
pub use stateful::{ActorState, Stateful};

/// Something that is stepped and rendered by the loop.
///
/// All hooks default to doing nothing.
pub trait Actor: Send + 'static {
    /// Called once, synchronously, when the actor is added.
    fn init(&mut self) {}

    /// Called once per simulation step.
    fn step(&mut self) {}

    /// Called once per frame; `delta` is the fraction of a step elapsed
    /// since the last simulated one.
    fn render(&self, delta: f32) {
        let _ = delta;
    }

    /// Called exactly once when the actor is destroyed or its state is
    /// popped.
    fn cleanup(&mut self) {}
}
