//! Positional base shared by most actors.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, monotonically increasing actor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(u64);

impl ActorId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Identity, position and velocity of an actor.
///
/// Velocity is in units per simulation step and is only used to
/// extrapolate the drawn position between steps; moving the body is up to
/// the actor's `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    id: ActorId,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
}

impl Body {
    /// A body at rest at `(x, y)`.
    pub const fn new(id: ActorId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// The injected actor id.
    #[inline]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Apply velocity once.
    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }

    /// Position to draw at, `delta` of a step past the last simulated one.
    #[inline]
    pub fn render_pos(&self, delta: f32) -> (f32, f32) {
        (self.x + self.vx * delta, self.y + self.vy * delta)
    }
}
