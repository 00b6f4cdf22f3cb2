//! Error types shared across the runtime.
//!
//! Process-level errors are local to the failing process: the scheduler logs
//! them and terminates that process only. Only [`EngineError`] ever stops the
//! main loop.

use std::io;

/// Error returned from a process hook.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// A plain failure message.
    #[error("{0}")]
    Failed(String),

    /// Invalid frame data handed to an animation.
    #[error(transparent)]
    Frames(#[from] FrameError),

    /// Any other error raised by process code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProcessError {
    /// Build a [`ProcessError::Failed`] from anything printable.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Error returned when a process cannot be scheduled.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The process's `init` hook failed; it was never scheduled.
    #[error("process {kind} failed to initialize: {source}")]
    Init {
        /// Type name of the process.
        kind: &'static str,
        /// Error returned by `init`.
        #[source]
        source: ProcessError,
    },

    /// The owning state was popped or is draining.
    #[error("scheduler is closed to new processes")]
    Closed,

    /// The OS refused to spawn the process thread.
    #[error("failed to spawn process thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Error for frame sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// No frames were provided.
    #[error("no frames were provided for this animation")]
    NoFrames,
}

/// Fatal loop-level error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The render/event backend failed.
    #[error("backend failure: {0}")]
    Backend(#[from] io::Error),

    /// The event source hung up before a close event was seen.
    #[error("event source disconnected")]
    EventSourceClosed,

    /// `run` was called with nothing on the state stack.
    #[error("state stack is empty")]
    EmptyStack,
}

/// Error loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A tick rate of zero would never step.
    #[error("tick_rate must be greater than zero")]
    InvalidTickRate,
}
