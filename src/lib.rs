//! # Proscenium
//!
//! A fixed-timestep game runtime built from three pieces:
//!
//! - **State stack**: screens and modes ([`GameState`]) stacked on a
//!   [`StateStack`]. Each state owns a [`Stage`] holding everything it
//!   registered, and popping the state tears that stage down.
//! - **Actors**: per-frame game objects ([`Actor`]) grouped into render
//!   layers, with optional per-actor state machines ([`Stateful`]).
//! - **Processes**: tick- and message-driven logic ([`Process`]), each on
//!   its own thread, chained through successors and drained on transitions.
//!
//! An [`Engine`] drives the stack from a [`Backend`]: it steps the
//! simulation at a fixed rate and renders once per frame with the leftover
//! fraction of a step as interpolation delta.
//!
//! ## Example
//!
//! ```rust
//! use proscenium::{Engine, EngineConfig, GameState, ManualClock, ScriptedBackend, Stage};
//!
//! struct Title;
//!
//! impl GameState for Title {
//!     fn update(&mut self, stage: &Stage) {
//!         stage.request_exit();
//!     }
//! }
//!
//! let config = EngineConfig::default();
//! let clock = ManualClock::new();
//! let backend = ScriptedBackend::new(clock.clone()).frame(config.step());
//! let mut engine: Engine<_> = Engine::with_clock(backend, config, clock);
//! engine.run(Title).unwrap();
//! assert_eq!(engine.stats().steps, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod config;
pub mod engine;
pub mod error;
pub mod process;
pub mod state;
pub mod terminal;

// Re-exports for convenience
pub use actor::{Actor, ActorHandle, ActorId, ActorRegistry, ActorState, Body, FrameCycle, Stateful};
pub use config::{EngineConfig, Rgb};
pub use engine::{
    Backend, Clock, Cue, Engine, Event, FixedStep, FrameStats, KeyCode, KeyEvent, KeyModifiers,
    Keyboard, ManualClock, ScriptedBackend, SystemClock,
};
pub use error::{ConfigError, EngineError, FrameError, ProcessError, SchedulerError};
pub use process::{
    AnimationCommand, AnimationFrame, AnimationProcess, DelayProcess, Message, Process,
    ProcessHandle, ProcessId, ProcessState, Scheduler,
};
pub use state::{GameState, StateStack, Stage, Transition, View};
pub use terminal::{Surface, TerminalBackend};
