//! Engine: the fixed-timestep loop.
//!
//! The engine owns the backend, the clock and the state stack, and is the
//! only thing that steps or renders. Each pass of the loop:
//!
//! ```text
//! wait_event ─▶ Timer? ──────────────────────────┐
//!      │        Close? ─▶ stop                    │
//!      └──────▶ other  ─▶ state, then views       │
//!                                                 ▼
//!                  queue empty? ─▶ while lag >= step { tick, step, update }
//!                                  clear ─▶ render(delta) ─▶ present
//! ```

use super::backend::Backend;
use super::event::Event;
use super::keyboard::Keyboard;
use super::timing::{Clock, FixedStep, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::state::{GameState, StateStack};
use log::{debug, error, info};

/// Counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames rendered.
    pub frames: u64,
    /// Simulation steps run.
    pub steps: u64,
    /// Events received, including timer events.
    pub events: u64,
}

/// The main loop.
pub struct Engine<B: Backend, M: Send + 'static = ()> {
    backend: B,
    clock: Box<dyn Clock>,
    config: EngineConfig,
    stack: StateStack<M>,
    stats: FrameStats,
}

impl<B: Backend, M: Send + 'static> Engine<B, M> {
    /// Create an engine on the wall clock.
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self::with_clock(backend, config, SystemClock::new())
    }

    /// Create an engine on a custom clock.
    pub fn with_clock(backend: B, config: EngineConfig, clock: impl Clock + 'static) -> Self {
        let mut stack = StateStack::new();
        stack.set_drain_timeout(config.drain_timeout());
        Self {
            backend,
            clock: Box::new(clock),
            config,
            stack,
            stats: FrameStats::default(),
        }
    }

    /// The configuration the engine was built with.
    #[inline]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The state stack.
    #[inline]
    pub const fn stack(&self) -> &StateStack<M> {
        &self.stack
    }

    /// The state stack, mutably. Use this to seed states before
    /// [`run_stack`](Self::run_stack).
    #[inline]
    pub fn stack_mut(&mut self) -> &mut StateStack<M> {
        &mut self.stack
    }

    /// Keys currently held.
    #[inline]
    pub const fn keyboard(&self) -> &Keyboard {
        self.stack.keyboard()
    }

    /// The backend.
    #[inline]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Counters so far.
    #[inline]
    pub const fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Push `initial` and run until close.
    ///
    /// # Errors
    ///
    /// Returns the backend error that aborted the run. The stack has been
    /// drained and emptied either way.
    pub fn run(&mut self, initial: impl GameState<M>) -> Result<(), EngineError> {
        self.stack.push(Box::new(initial));
        self.stack.apply_pending();
        self.run_stack()
    }

    /// Run the states already on the stack until close.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptyStack`] if there is nothing to run, otherwise
    /// the backend error that aborted the run.
    pub fn run_stack(&mut self) -> Result<(), EngineError> {
        if self.stack.is_empty() {
            return Err(EngineError::EmptyStack);
        }
        info!(
            "starting up: {} at {} Hz (step {:?})",
            self.config.title,
            self.config.tick_rate,
            self.config.step()
        );

        let result = self.run_loop();
        if let Err(err) = &result {
            error!("loop aborted: {err}");
        }

        info!("shutting down");
        let blanked = self
            .backend
            .clear(self.config.background)
            .and_then(|()| self.backend.present());
        self.stack.shutdown();
        info!(
            "stopped after {} frames / {} steps",
            self.stats.frames, self.stats.steps
        );
        result.and(blanked)
    }

    fn run_loop(&mut self) -> Result<(), EngineError> {
        let mut fixed = FixedStep::new(self.config.step());
        let mut last = self.clock.now();
        let mut ticking = false;
        let mut running = true;

        while running {
            let event = self.backend.wait_event()?;
            self.stats.events += 1;

            match &event {
                Event::Timer => ticking = true,
                Event::Close => {
                    debug!("close received");
                    running = false;
                }
                other => {
                    self.track_keys(other);
                    self.stack.handle_event(other);
                }
            }
            running &= !self.should_stop();

            if running && ticking && self.backend.queue_is_empty() {
                let now = self.clock.now();
                fixed.accumulate(now.saturating_sub(last));
                last = now;

                while fixed.next_step() {
                    self.stack.step();
                    self.stats.steps += 1;
                    if self.stack.is_empty() {
                        break;
                    }
                }
                self.render_frame(fixed.delta())?;
                ticking = false;
                running &= !self.should_stop();
            }
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        self.stack.exit_requested() || self.stack.is_empty()
    }

    fn track_keys(&self, event: &Event) {
        let keyboard = self.stack.keyboard();
        match event {
            Event::KeyDown(key) => keyboard.press(*key),
            Event::KeyUp(key) => keyboard.release(*key),
            Event::FocusLost => keyboard.clear(),
            _ => {}
        }
    }

    fn render_frame(&mut self, delta: f32) -> Result<(), EngineError> {
        self.backend.clear(self.config.background)?;
        self.stack.render(delta);
        self.backend.present()?;
        self.stats.frames += 1;
        Ok(())
    }
}

impl<B: Backend, M: Send + 'static> std::fmt::Debug for Engine<B, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("stack", &self.stack)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
