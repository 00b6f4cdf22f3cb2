//! Actor state machines.
//!
//! A [`Stateful`] actor holds at most one [`ActorState`]. While a state is
//! installed it is the sole authority: `step` and `render` go to the state
//! instead of the actor, and the only way to move to another state is
//! [`Stateful::change_state`] (which is also what a successor returned from
//! [`ActorState::step`] goes through).

use super::Actor;

/// One state of an actor's state machine.
pub trait ActorState<A>: Send + 'static {
    /// Called when the state becomes current.
    fn init(&mut self, actor: &mut A) {
        let _ = actor;
    }

    /// Called once per simulation step. Return a state to move to it.
    fn step(&mut self, actor: &mut A) -> Option<Box<dyn ActorState<A>>> {
        let _ = actor;
        None
    }

    /// Called once per frame.
    fn render(&self, actor: &A, delta: f32) {
        let _ = (actor, delta);
    }

    /// Called when the state is replaced or the actor is destroyed.
    fn cleanup(&mut self, actor: &mut A) {
        let _ = actor;
    }

    /// Name for logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Actor wrapper that dispatches to an installed [`ActorState`].
pub struct Stateful<A> {
    actor: A,
    state: Option<Box<dyn ActorState<A>>>,
    initial: Option<Box<dyn ActorState<A>>>,
}

impl<A: Actor> Stateful<A> {
    /// Wrap `actor` with no state installed.
    pub const fn new(actor: A) -> Self {
        Self {
            actor,
            state: None,
            initial: None,
        }
    }

    /// Wrap `actor` and install `state` when the actor is initialized.
    pub fn with_state(actor: A, state: impl ActorState<A>) -> Self {
        Self {
            actor,
            state: None,
            initial: Some(Box::new(state)),
        }
    }

    /// The wrapped actor.
    #[inline]
    pub const fn actor(&self) -> &A {
        &self.actor
    }

    /// The wrapped actor, mutably.
    #[inline]
    pub fn actor_mut(&mut self) -> &mut A {
        &mut self.actor
    }

    /// Whether a state is installed.
    #[inline]
    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// Name of the installed state.
    pub fn state_name(&self) -> Option<&'static str> {
        self.state.as_ref().map(|state| state.name())
    }

    /// Move to `next`.
    ///
    /// `None` leaves the current state untouched. Otherwise the current
    /// state is cleaned up, `next` is installed, and only then is its
    /// `init` run.
    pub fn change_state(&mut self, next: Option<Box<dyn ActorState<A>>>) {
        let Some(next) = next else {
            return;
        };
        if let Some(mut old) = self.state.take() {
            old.cleanup(&mut self.actor);
        }
        let state = self.state.insert(next);
        log::trace!("actor state -> {}", state.name());
        state.init(&mut self.actor);
    }
}

impl<A: Actor> Actor for Stateful<A> {
    fn init(&mut self) {
        self.actor.init();
        let initial = self.initial.take();
        self.change_state(initial);
    }

    fn step(&mut self) {
        match self.state.as_mut() {
            Some(state) => {
                let next = state.step(&mut self.actor);
                self.change_state(next);
            }
            None => self.actor.step(),
        }
    }

    fn render(&self, delta: f32) {
        match &self.state {
            Some(state) => state.render(&self.actor, delta),
            None => self.actor.render(delta),
        }
    }

    fn cleanup(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.cleanup(&mut self.actor);
        }
        self.actor.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Dummy {
        log: Log,
        steps: u32,
    }

    impl Dummy {
        fn push(&self, entry: impl Into<String>) {
            self.log.lock().push(entry.into());
        }
    }

    impl Actor for Dummy {
        fn step(&mut self) {
            self.steps += 1;
            self.push("actor:step");
        }

        fn render(&self, _delta: f32) {
            self.push("actor:render");
        }

        fn cleanup(&mut self) {
            self.push("actor:cleanup");
        }
    }

    struct Named {
        name: &'static str,
        then: Option<&'static str>,
    }

    impl ActorState<Dummy> for Named {
        fn init(&mut self, actor: &mut Dummy) {
            actor.push(format!("{}:init", self.name));
        }

        fn step(&mut self, actor: &mut Dummy) -> Option<Box<dyn ActorState<Dummy>>> {
            actor.push(format!("{}:step", self.name));
            self.then.take().map(|name| {
                Box::new(Named { name, then: None }) as Box<dyn ActorState<Dummy>>
            })
        }

        fn render(&self, actor: &Dummy, _delta: f32) {
            actor.push(format!("{}:render", self.name));
        }

        fn cleanup(&mut self, actor: &mut Dummy) {
            actor.push(format!("{}:cleanup", self.name));
        }
    }

    fn dummy() -> (Stateful<Dummy>, Log) {
        let log = Log::default();
        let actor = Dummy {
            log: log.clone(),
            steps: 0,
        };
        (Stateful::new(actor), log)
    }

    fn entries(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock())
    }

    #[test]
    fn test_without_state_actor_hooks_run() {
        let (mut actor, log) = dummy();
        actor.step();
        actor.render(0.0);
        assert_eq!(entries(&log), vec!["actor:step", "actor:render"]);
        assert_eq!(actor.actor().steps, 1);
    }

    #[test]
    fn test_state_is_sole_authority() {
        let (mut actor, log) = dummy();
        actor.change_state(Some(Box::new(Named { name: "a", then: None })));
        actor.step();
        actor.render(0.5);
        assert_eq!(entries(&log), vec!["a:init", "a:step", "a:render"]);
        assert_eq!(actor.actor().steps, 0);
    }

    #[test]
    fn test_change_state_none_is_noop() {
        let (mut actor, log) = dummy();
        actor.change_state(Some(Box::new(Named { name: "a", then: None })));
        entries(&log);

        actor.change_state(None);
        assert!(entries(&log).is_empty());
        assert!(actor.state_name().is_some_and(|name| name.ends_with("Named")));
    }

    #[test]
    fn test_replacement_cleans_up_before_init() {
        let (mut actor, log) = dummy();
        actor.change_state(Some(Box::new(Named { name: "a", then: None })));
        actor.change_state(Some(Box::new(Named { name: "b", then: None })));
        assert_eq!(entries(&log), vec!["a:init", "a:cleanup", "b:init"]);
    }

    #[test]
    fn test_step_successor_goes_through_change_state() {
        let (mut actor, log) = dummy();
        actor.change_state(Some(Box::new(Named {
            name: "a",
            then: Some("b"),
        })));
        actor.step();
        actor.step();
        assert_eq!(
            entries(&log),
            vec!["a:init", "a:step", "a:cleanup", "b:init", "b:step"]
        );
    }

    #[test]
    fn test_initial_state_installed_on_init() {
        let log = Log::default();
        let mut actor = Stateful::with_state(
            Dummy {
                log: log.clone(),
                steps: 0,
            },
            Named { name: "idle", then: None },
        );
        assert!(!actor.has_state());
        actor.init();
        assert!(actor.has_state());
        actor.cleanup();
        assert_eq!(entries(&log), vec!["idle:init", "idle:cleanup", "actor:cleanup"]);
    }
}
