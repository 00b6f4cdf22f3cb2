//! The fixed-timestep loop and its collaborators.
//!
//! - [`Backend`]: blocking event source plus clear/present
//! - [`Engine`]: drives the [`StateStack`](crate::state::StateStack)
//! - [`FixedStep`] and [`Clock`]: deterministic step accounting
//! - [`Keyboard`]: which keys are held right now

mod backend;
mod driver;
mod event;
mod keyboard;
mod timing;

pub use backend::{Backend, Cue, ScriptedBackend};
pub use driver::{Engine, FrameStats};
pub use event::{Event, KeyCode, KeyEvent, KeyModifiers};
pub use keyboard::Keyboard;
pub use timing::{Clock, FixedStep, ManualClock, SystemClock};
