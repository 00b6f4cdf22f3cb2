//! `DelayProcess`: wait a number of ticks, then act.

use super::Process;
use crate::error::ProcessError;

type Activation = Box<dyn FnOnce() + Send>;

/// A process that counts ticks, fires an optional callback once the delay
/// runs out, and then hands off to an optional successor.
///
/// ```rust,ignore
/// let fade_out = DelayProcess::new(120)
///     .on_activate(move || stage.request_exit())
///     .then(DelayProcess::new(1));
/// stage.run_process(fade_out)?;
/// ```
pub struct DelayProcess<M = ()> {
    delay: u32,
    elapsed: u32,
    activate: Option<Activation>,
    successor: Option<Box<dyn Process<M>>>,
}

impl<M: Send + 'static> DelayProcess<M> {
    /// Create a process that completes after `delay` ticks.
    ///
    /// A delay of zero completes on the first tick.
    pub fn new(delay: u32) -> Self {
        Self {
            delay,
            elapsed: 0,
            activate: None,
            successor: None,
        }
    }

    /// Run `activate` once, on the tick the delay runs out.
    #[must_use]
    pub fn on_activate(mut self, activate: impl FnOnce() + Send + 'static) -> Self {
        self.activate = Some(Box::new(activate));
        self
    }

    /// Start `successor` after this process completes normally.
    #[must_use]
    pub fn then(mut self, successor: impl Process<M>) -> Self {
        self.successor = Some(Box::new(successor));
        self
    }

    /// Ticks counted so far.
    #[inline]
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }
}

impl<M: Send + 'static> Process<M> for DelayProcess<M> {
    fn tick(&mut self) -> Result<bool, ProcessError> {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed < self.delay {
            return Ok(true);
        }
        if let Some(activate) = self.activate.take() {
            activate();
        }
        Ok(false)
    }

    fn next(&mut self) -> Option<Box<dyn Process<M>>> {
        self.successor.take()
    }
}
