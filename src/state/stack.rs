//! The state stack and its transitions.

use super::stage::{Request, Requests, Stage, Transition};
use super::GameState;
use crate::engine::{Event, Keyboard};
use log::{debug, error, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often a `new_state_wait` waiter checks whether its state was popped.
const WAITER_POLL: Duration = Duration::from_millis(20);

struct Level<M> {
    state: Box<dyn GameState<M>>,
    stage: Stage<M>,
}

/// Ordered stack of game states; the last one is current.
///
/// The stack is owned by the driver. Hooks and processes change it through
/// [`Stage`] requests, which are applied by [`apply_pending`]
/// (called after every phase).
///
/// [`apply_pending`]: StateStack::apply_pending
pub struct StateStack<M: Send + 'static = ()> {
    levels: Vec<Level<M>>,
    next_generation: u64,
    requests: Arc<Requests<M>>,
    keyboard: Keyboard,
    drain_timeout: Option<Duration>,
    waiters: Vec<JoinHandle<()>>,
}

impl<M: Send + 'static> Default for StateStack<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> std::fmt::Debug for StateStack<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStack")
            .field("depth", &self.levels.len())
            .field(
                "states",
                &self.levels.iter().map(|l| l.state.name()).collect::<Vec<_>>(),
            )
            .field("waiters", &self.waiters.len())
            .finish()
    }
}

impl<M: Send + 'static> StateStack<M> {
    /// An empty stack with its own keyboard tracker.
    pub fn new() -> Self {
        Self::with_keyboard(Keyboard::new())
    }

    /// An empty stack sharing `keyboard`.
    pub fn with_keyboard(keyboard: Keyboard) -> Self {
        Self {
            levels: Vec::new(),
            next_generation: 0,
            requests: Arc::new(Requests::new()),
            keyboard,
            drain_timeout: None,
            waiters: Vec::new(),
        }
    }

    /// Upper bound for every process drain; `None` waits forever.
    pub fn set_drain_timeout(&mut self, timeout: Option<Duration>) {
        self.drain_timeout = timeout;
    }

    /// The shared keyboard tracker.
    #[inline]
    pub const fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// Number of states.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether there is no current state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Stage of the current state.
    pub fn current_stage(&self) -> Option<&Stage<M>> {
        self.levels.last().map(|level| &level.stage)
    }

    /// Generation of the current state.
    pub fn current_generation(&self) -> Option<u64> {
        self.current_stage().map(Stage::generation)
    }

    /// Name of the current state.
    pub fn current_name(&self) -> Option<&'static str> {
        self.levels.last().map(|level| level.state.name())
    }

    /// Whether some hook asked the loop to stop.
    pub fn exit_requested(&self) -> bool {
        self.requests.exit_requested()
    }

    /// Ask the loop to stop.
    pub fn request_exit(&self) {
        self.requests.request_exit();
    }

    // ---- transitions ----

    /// Pause the current state, then push and initialize `state` with a
    /// fresh stage.
    pub fn push(&mut self, state: Box<dyn GameState<M>>) {
        if let Some(top) = self.levels.last_mut() {
            top.state.pause(&top.stage);
        }
        self.next_generation += 1;
        let stage = Stage::new(
            self.next_generation,
            Arc::clone(&self.requests),
            self.keyboard.clone(),
        );
        debug!("push {} as generation {}", state.name(), stage.generation());
        self.levels.push(Level { state, stage });
        if let Some(level) = self.levels.last_mut() {
            level.state.init(&level.stage);
        }
    }

    /// Pop the current state: clean it up, tear down its stage, resume the
    /// state below.
    ///
    /// The popped state's processes are told to quit but not waited for.
    pub fn pop(&mut self) -> Option<Box<dyn GameState<M>>> {
        self.pop_level(true)
    }

    fn pop_level(&mut self, resume: bool) -> Option<Box<dyn GameState<M>>> {
        let mut level = self.levels.pop()?;
        debug!("pop {} (generation {})", level.state.name(), level.stage.generation());
        level.state.cleanup(&level.stage);
        level.stage.retire();
        if resume {
            if let Some(top) = self.levels.last_mut() {
                top.state.resume(&top.stage);
            }
        }
        Some(level.state)
    }

    /// Pop the current state, then push `state`.
    pub fn new_state(&mut self, state: Box<dyn GameState<M>>) {
        self.pop();
        self.push(state);
    }

    /// Quit every process of the current state and block until all of them
    /// have exited, then replace the current state with `state`.
    pub fn new_state_now(&mut self, state: Box<dyn GameState<M>>) {
        if let Some(stage) = self.current_stage() {
            if !stage.scheduler().drain(self.drain_timeout) {
                warn!(
                    "replacing generation {} before its processes drained",
                    stage.generation()
                );
            }
        }
        self.new_state(state);
    }

    /// Replace the current state once its processes have finished on their
    /// own, without blocking.
    ///
    /// Nothing is quit. The current state keeps stepping, so its processes
    /// keep receiving ticks and may complete, activate and start
    /// successors. A waiter thread watches the live set; once it is empty
    /// the replacement is applied by the next [`apply_pending`]. If the
    /// state is popped meanwhile, the replacement is dropped.
    ///
    /// [`apply_pending`]: Self::apply_pending
    pub fn new_state_wait(&mut self, state: Box<dyn GameState<M>>) {
        let Some(stage) = self.current_stage() else {
            self.push(state);
            return;
        };

        let generation = stage.generation();
        let watched = stage.clone();
        let requests = Arc::clone(&self.requests);
        let slot = Arc::new(Mutex::new(Some(state)));
        let waiting = Arc::clone(&slot);

        let spawned = thread::Builder::new()
            .name(format!("proscenium-wait-{generation}"))
            .spawn(move || {
                while !watched.scheduler().wait_drained_timeout(WAITER_POLL) {
                    if watched.is_retired() {
                        debug!("generation {generation} popped while waiting to be replaced");
                        return;
                    }
                }
                if let Some(state) = waiting.lock().take() {
                    requests.push(Request::Drained { generation, state });
                }
            });

        match spawned {
            Ok(waiter) => self.waiters.push(waiter),
            Err(err) => {
                error!("failed to spawn waiter thread, replacing now: {err}");
                let state = slot.lock().take();
                if let Some(state) = state {
                    self.new_state_now(state);
                }
            }
        }
    }

    /// Apply every queued transition, in request order.
    pub fn apply_pending(&mut self) {
        while let Some(request) = self.requests.pop() {
            match request {
                Request::Transition(transition) => self.apply(transition),
                Request::Drained { generation, state } => {
                    if self.current_generation() == Some(generation) {
                        self.new_state(state);
                    } else {
                        debug!(
                            "dropping {}: generation {generation} is no longer current",
                            state.name()
                        );
                    }
                }
            }
        }
        self.waiters.retain(|waiter| !waiter.is_finished());
    }

    /// Apply one transition now.
    pub fn apply(&mut self, transition: Transition<M>) {
        match transition {
            Transition::Push(state) => self.push(state),
            Transition::Pop => {
                self.pop();
            }
            Transition::Replace(state) => self.new_state(state),
            Transition::ReplaceNow(state) => self.new_state_now(state),
            Transition::ReplaceWait(state) => self.new_state_wait(state),
        }
    }

    // ---- loop phases ----

    /// One simulation step of the current state: tick its processes, step
    /// its actors and views, then update the state itself.
    pub fn step(&mut self) {
        if let Some(level) = self.levels.last_mut() {
            level.stage.scheduler().tick_all();
            level.stage.actors().step_all();
            level.stage.update_views();
            level.state.update(&level.stage);
        }
        self.apply_pending();
    }

    /// Render the current state, then its actors by ascending layer.
    pub fn render(&mut self, delta: f32) {
        if let Some(level) = self.levels.last_mut() {
            level.state.render(&level.stage, delta);
            level.stage.actors().render_all(delta);
        }
        self.apply_pending();
    }

    /// Offer `event` to the current state, then to its views in
    /// registration order until one consumes it.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let consumed = match self.levels.last_mut() {
            Some(level) => {
                level.state.handle_event(&level.stage, event)
                    || level.stage.offer_to_views(event)
            }
            None => false,
        };
        self.apply_pending();
        consumed
    }

    /// Pop every state, draining each level's processes first.
    ///
    /// Pending transitions are discarded.
    pub fn shutdown(&mut self) {
        self.requests.clear();
        while let Some(stage) = self.current_stage() {
            if !stage.scheduler().drain(self.drain_timeout) {
                warn!("generation {} did not drain before shutdown", stage.generation());
            }
            self.pop_level(false);
        }
        for waiter in self.waiters.drain(..) {
            if waiter.join().is_err() {
                error!("drain thread panicked");
            }
        }
        self.requests.clear();
    }
}

impl<M: Send + 'static> Drop for StateStack<M> {
    fn drop(&mut self) {
        // Dropped without a shutdown: tear down without waiting.
        while self.pop_level(false).is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorId};
    use crate::engine::KeyCode;
    use crate::error::{ProcessError, SchedulerError};
    use crate::process::{DelayProcess, Process, Scheduler};
    use crate::state::View;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(5);

    type Log = Arc<Mutex<Vec<String>>>;

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock())
    }

    /// State that records its hooks and runs a setup closure in `init`.
    struct Recorder {
        name: &'static str,
        log: Log,
        setup: Option<Box<dyn FnOnce(&Stage) + Send>>,
        on_update: Option<Box<dyn FnMut(&Stage) + Send>>,
        consume: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                setup: None,
                on_update: None,
                consume: false,
            }
        }

        fn setup(mut self, f: impl FnOnce(&Stage) + Send + 'static) -> Self {
            self.setup = Some(Box::new(f));
            self
        }

        fn on_update(mut self, f: impl FnMut(&Stage) + Send + 'static) -> Self {
            self.on_update = Some(Box::new(f));
            self
        }

        fn push(&self, what: &str) {
            self.log.lock().push(format!("{}:{what}", self.name));
        }
    }

    impl GameState for Recorder {
        fn init(&mut self, stage: &Stage) {
            self.push("init");
            if let Some(setup) = self.setup.take() {
                setup(stage);
            }
        }

        fn update(&mut self, stage: &Stage) {
            self.push("update");
            if let Some(on_update) = self.on_update.as_mut() {
                on_update(stage);
            }
        }

        fn render(&mut self, _stage: &Stage, _delta: f32) {
            self.push("render");
        }

        fn handle_event(&mut self, _stage: &Stage, _event: &Event) -> bool {
            self.push("event");
            self.consume
        }

        fn pause(&mut self, _stage: &Stage) {
            self.push("pause");
        }

        fn resume(&mut self, _stage: &Stage) {
            self.push("resume");
        }

        fn cleanup(&mut self, _stage: &Stage) {
            self.push("cleanup");
        }
    }

    struct Painter {
        tag: String,
        log: Log,
    }

    impl Actor for Painter {
        fn step(&mut self) {
            self.log.lock().push(format!("{}:step", self.tag));
        }

        fn render(&self, _delta: f32) {
            self.log.lock().push(format!("{}:render", self.tag));
        }

        fn cleanup(&mut self) {
            self.log.lock().push(format!("{}:cleanup", self.tag));
        }
    }

    struct Listener {
        tag: &'static str,
        log: Log,
        consume: bool,
    }

    impl View for Listener {
        fn init(&mut self, _stage: &Stage) {
            self.log.lock().push(format!("{}:init", self.tag));
        }

        fn handle_event(&mut self, _stage: &Stage, _event: &Event) -> bool {
            self.log.lock().push(format!("{}:event", self.tag));
            self.consume
        }

        fn update(&mut self, _stage: &Stage) {
            self.log.lock().push(format!("{}:update", self.tag));
        }

        fn cleanup(&mut self, _stage: &Stage) {
            self.log.lock().push(format!("{}:cleanup", self.tag));
        }
    }

    /// Lives until quit; counts its cleanups.
    struct Sleeper(Arc<AtomicUsize>);

    impl Process for Sleeper {
        fn cleanup(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        condition()
    }

    #[test]
    fn test_push_pop_lifecycle() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();

        stack.push(Box::new(Recorder::new("a", &log)));
        stack.push(Box::new(Recorder::new("b", &log)));
        assert_eq!(stack.len(), 2);

        let popped = stack.pop();
        assert!(popped.is_some_and(|state| state.name().ends_with("Recorder")));
        assert_eq!(take(&log), vec!["a:init", "a:pause", "b:init", "b:cleanup", "a:resume"]);

        stack.pop();
        assert!(stack.pop().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_generations_are_fresh() {
        let mut stack = StateStack::<()>::new();
        let log = Log::default();
        stack.push(Box::new(Recorder::new("a", &log)));
        let first = stack.current_generation();
        stack.new_state(Box::new(Recorder::new("b", &log)));
        assert_ne!(stack.current_generation(), first);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_tears_down_stage() {
        let log = Log::default();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut stack = StateStack::<()>::new();
        let counter = cleanups.clone();
        let setup_log = log.clone();
        stack.push(Box::new(Recorder::new("a", &log).setup(move |stage| {
            stage.run_process(Sleeper(counter)).unwrap();
            stage.add_actor(0, |_| Painter {
                tag: "p".into(),
                log: setup_log.clone(),
            });
            stage.add_view(Listener {
                tag: "v",
                log: setup_log,
                consume: false,
            });
        })));
        let stage = stack.current_stage().cloned().unwrap();
        take(&log);

        stack.pop();
        assert!(stage.is_retired());
        assert_eq!(take(&log), vec!["a:cleanup", "v:cleanup", "p:cleanup"]);
        assert!(wait_until(|| cleanups.load(Ordering::SeqCst) == 1));
        assert!(stage.scheduler().wait_drained_timeout(WAIT));

        // Entries of a popped generation are unreachable.
        assert!(matches!(
            stage.run_process(DelayProcess::new(1)),
            Err(SchedulerError::Closed)
        ));
        let late = stage.add_actor(0, |_| Painter {
            tag: "late".into(),
            log: log.clone(),
        });
        assert!(stage.find_actor(late.id()).is_none());
        assert!(!stage.add_view(Listener {
            tag: "late",
            log: log.clone(),
            consume: false,
        }));
    }

    #[test]
    fn test_new_state_now_drains_before_next_init() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let counter = cleanups.clone();
        stack.push(Box::new(Recorder::new("old", &log).setup(move |stage| {
            stage.run_process(Sleeper(counter.clone())).unwrap();
            stage.run_process(Sleeper(counter)).unwrap();
        })));
        let old: Scheduler = stack.current_stage().unwrap().scheduler().clone();
        assert_eq!(old.live_count(), 2);

        let seen_live = Arc::new(AtomicUsize::new(usize::MAX));
        let seen = seen_live.clone();
        let probe = old.clone();
        stack.new_state_now(Box::new(Recorder::new("next", &log).setup(move |_| {
            seen.store(probe.live_count(), Ordering::SeqCst);
        })));

        assert_eq!(seen_live.load(Ordering::SeqCst), 0);
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
        assert_eq!(take(&log), vec!["old:init", "old:cleanup", "next:init"]);
    }

    #[test]
    fn test_transition_debug_names_the_state() {
        let log = Log::default();
        let push = Transition::Push(Box::new(Recorder::new("a", &log)));
        let text = format!("{push:?}");
        assert!(text.starts_with("Push("));
        assert!(text.contains("Recorder"));
        assert_eq!(format!("{:?}", Transition::<()>::Pop), "Pop");
    }

    #[test]
    fn test_new_state_wait_lets_processes_finish() {
        let log = Log::default();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let mut stack = StateStack::<()>::new();
        stack.push(Box::new(Recorder::new("old", &log).setup(move |stage| {
            let delay = DelayProcess::new(3).on_activate(move || flag.store(true, Ordering::SeqCst));
            stage.run_process(delay).unwrap();
        })));
        let old = stack.current_generation();
        let scheduler: Scheduler = stack.current_stage().unwrap().scheduler().clone();

        let fired_at_init = Arc::new(AtomicBool::new(false));
        let seen = fired_at_init.clone();
        let watch = fired.clone();
        stack.new_state_wait(Box::new(Recorder::new("next", &log).setup(move |_| {
            seen.store(watch.load(Ordering::SeqCst), Ordering::SeqCst);
        })));
        assert_eq!(stack.current_generation(), old);
        assert!(!scheduler.is_closed());

        assert!(wait_until(|| {
            stack.step();
            stack.current_generation() != old
        }));
        assert!(fired.load(Ordering::SeqCst));
        assert!(fired_at_init.load(Ordering::SeqCst));

        let log = take(&log);
        assert_eq!(log.first().map(String::as_str), Some("old:init"));
        assert!(log.contains(&"old:update".to_string()));
        let cleanup = log.iter().position(|e| e == "old:cleanup").unwrap();
        assert_eq!(log[cleanup + 1], "next:init");
    }

    #[test]
    fn test_new_state_wait_accepts_processes_meanwhile() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        stack.push(Box::new(Recorder::new("old", &log).setup(|stage| {
            stage.run_process(DelayProcess::new(2)).unwrap();
        })));
        let old = stack.current_generation();
        stack.new_state_wait(Box::new(Recorder::new("next", &log)));

        let stage = stack.current_stage().unwrap().clone();
        assert!(stage.run_process(DelayProcess::new(4)).is_ok());

        assert!(wait_until(|| {
            stack.step();
            stack.current_generation() != old
        }));
        assert_eq!(stage.scheduler().live_count(), 0);
    }

    #[test]
    fn test_stale_drain_is_dropped() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        stack.push(Box::new(Recorder::new("old", &log)));
        stack.new_state_wait(Box::new(Recorder::new("next", &log)));
        stack.pop();
        stack.push(Box::new(Recorder::new("other", &log)));

        for waiter in std::mem::take(&mut stack.waiters) {
            waiter.join().unwrap();
        }
        stack.apply_pending();
        assert_eq!(stack.len(), 1);
        assert!(!take(&log).contains(&"next:init".to_string()));
    }

    #[test]
    fn test_transitions_from_hooks_are_queued() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        let inner_log = log.clone();
        let mut pushed = false;
        stack.push(Box::new(Recorder::new("a", &log).on_update(move |stage| {
            if !pushed {
                pushed = true;
                stage.push_state(Recorder::new("b", &inner_log));
            }
        })));

        stack.step();
        assert_eq!(stack.len(), 2);
        assert_eq!(take(&log), vec!["a:init", "a:update", "a:pause", "b:init"]);

        stack.current_stage().unwrap().pop_state();
        stack.apply_pending();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_popped_stage_requests_ignored() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        stack.push(Box::new(Recorder::new("a", &log)));
        stack.push(Box::new(Recorder::new("b", &log)));
        let stale = stack.current_stage().cloned().unwrap();
        stack.pop();

        stale.pop_state();
        stack.apply_pending();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_step_order() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        let setup_log = log.clone();
        stack.push(Box::new(Recorder::new("s", &log).setup(move |stage| {
            stage.add_actor(0, |_| Painter {
                tag: "actor".into(),
                log: setup_log.clone(),
            });
            stage.add_view(Listener {
                tag: "view",
                log: setup_log,
                consume: false,
            });
        })));
        take(&log);

        stack.step();
        assert_eq!(take(&log), vec!["actor:step", "view:update", "s:update"]);
    }

    #[test]
    fn test_render_walks_layers_ascending() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        let setup_log = log.clone();
        stack.push(Box::new(Recorder::new("s", &log).setup(move |stage| {
            for layer in [2, 0, 1] {
                stage.add_actor(layer, |_| Painter {
                    tag: format!("layer{layer}"),
                    log: setup_log.clone(),
                });
            }
        })));
        take(&log);

        stack.render(0.0);
        assert_eq!(
            take(&log),
            vec!["s:render", "layer0:render", "layer1:render", "layer2:render"]
        );
    }

    #[test]
    fn test_events_go_to_state_then_views_in_order() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        let setup_log = log.clone();
        stack.push(Box::new(Recorder::new("s", &log).setup(move |stage| {
            for (tag, consume) in [("v1", false), ("v2", true), ("v3", false)] {
                stage.add_view(Listener {
                    tag,
                    log: setup_log.clone(),
                    consume,
                });
            }
        })));
        take(&log);

        let key = Event::KeyDown(KeyCode::Enter.into());
        assert!(stack.handle_event(&key));
        assert_eq!(take(&log), vec!["s:event", "v1:event", "v2:event"]);
    }

    #[test]
    fn test_state_consumes_first() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        let mut state = Recorder::new("s", &log);
        state.consume = true;
        let setup_log = log.clone();
        state = state.setup(move |stage| {
            stage.add_view(Listener {
                tag: "v",
                log: setup_log,
                consume: true,
            });
        });
        stack.push(Box::new(state));
        take(&log);

        assert!(stack.handle_event(&Event::FocusLost));
        assert_eq!(take(&log), vec!["s:event"]);
    }

    #[test]
    fn test_shutdown_drains_every_level() {
        let log = Log::default();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut stack = StateStack::<()>::new();
        for name in ["a", "b"] {
            let counter = cleanups.clone();
            stack.push(Box::new(Recorder::new(name, &log).setup(move |stage| {
                stage.run_process(Sleeper(counter)).unwrap();
            })));
        }
        take(&log);

        stack.shutdown();
        assert!(stack.is_empty());
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
        assert_eq!(take(&log), vec!["b:cleanup", "a:cleanup"]);
    }

    #[test]
    fn test_process_errors_do_not_reach_the_stack() {
        struct Broken;
        impl Process for Broken {
            fn tick(&mut self) -> Result<bool, ProcessError> {
                Err(ProcessError::msg("boom"))
            }
        }

        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        stack.push(Box::new(Recorder::new("s", &log).setup(|stage| {
            stage.run_process(Broken).unwrap();
        })));
        stack.step();
        let stage = stack.current_stage().cloned().unwrap();
        assert!(stage.scheduler().wait_drained_timeout(WAIT));
        stack.step();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_destroy_actor_through_stage() {
        let log = Log::default();
        let mut stack = StateStack::<()>::new();
        stack.push(Box::new(Recorder::new("s", &log)));
        let stage = stack.current_stage().cloned().unwrap();
        let ids: Vec<ActorId> = ["a", "b", "c"]
            .into_iter()
            .map(|tag| {
                stage
                    .add_actor(1, |_| Painter {
                        tag: tag.into(),
                        log: log.clone(),
                    })
                    .id()
            })
            .collect();
        take(&log);

        assert!(stage.destroy_actor(ids[1]));
        assert_eq!(stage.actors().layer(1), vec![ids[0], ids[2]]);
        assert_eq!(take(&log), vec!["b:cleanup"]);
    }
}
