//! `Stage`: everything scoped to one game state generation.

use super::{GameState, View};
use crate::actor::{Actor, ActorHandle, ActorId, ActorRef, ActorRegistry};
use crate::engine::{Event, Keyboard};
use crate::error::SchedulerError;
use crate::process::{Process, ProcessHandle, Scheduler};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A state-stack change requested from inside a hook or process.
///
/// Requests are queued and applied by the driver between phases, so no hook
/// ever observes the stack changing underneath it.
pub enum Transition<M = ()> {
    /// Pause the current state and push a new one.
    Push(Box<dyn GameState<M>>),
    /// Pop the current state.
    Pop,
    /// Pop the current state, then push a new one.
    Replace(Box<dyn GameState<M>>),
    /// Drain the current state's processes, then replace it.
    ReplaceNow(Box<dyn GameState<M>>),
    /// Replace the current state once its processes have finished on their
    /// own. Nothing is quit and the driver is not blocked.
    ReplaceWait(Box<dyn GameState<M>>),
}

impl<M: 'static> fmt::Debug for Transition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(state) => f.debug_tuple("Push").field(&state.name()).finish(),
            Self::Pop => f.write_str("Pop"),
            Self::Replace(state) => f.debug_tuple("Replace").field(&state.name()).finish(),
            Self::ReplaceNow(state) => f.debug_tuple("ReplaceNow").field(&state.name()).finish(),
            Self::ReplaceWait(state) => f.debug_tuple("ReplaceWait").field(&state.name()).finish(),
        }
    }
}

pub(crate) enum Request<M> {
    Transition(Transition<M>),
    /// A `ReplaceWait` whose processes have all finished.
    Drained {
        generation: u64,
        state: Box<dyn GameState<M>>,
    },
}

/// Transition queue shared by every stage of one stack.
pub(crate) struct Requests<M> {
    queue: Mutex<VecDeque<Request<M>>>,
    exit: AtomicBool,
}

impl<M> Requests<M> {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            exit: AtomicBool::new(false),
        }
    }

    pub(crate) fn push(&self, request: Request<M>) {
        self.queue.lock().push_back(request);
    }

    pub(crate) fn pop(&self) -> Option<Request<M>> {
        self.queue.lock().pop_front()
    }

    pub(crate) fn clear(&self) {
        self.queue.lock().clear();
    }

    pub(crate) fn request_exit(&self) {
        self.exit.store(true, Ordering::Release);
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::Acquire)
    }
}

type SharedView<M> = Arc<Mutex<dyn View<M>>>;

struct StageInner<M> {
    generation: u64,
    scheduler: Scheduler<M>,
    actors: ActorRegistry,
    views: Mutex<Vec<SharedView<M>>>,
    requests: Arc<Requests<M>>,
    keyboard: Keyboard,
    retired: AtomicBool,
}

/// Scope of one game state: its processes, actors and views.
///
/// Every hook receives the stage of the state it belongs to. Cloning is
/// cheap, so processes and actors may keep a clone to register more
/// entries later. Once the state is popped the stage is retired and
/// refuses new processes, actors and views.
pub struct Stage<M = ()> {
    inner: Arc<StageInner<M>>,
}

impl<M> Clone for Stage<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> fmt::Debug for Stage<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("generation", &self.inner.generation)
            .field("actors", &self.inner.actors)
            .field("views", &self.inner.views.lock().len())
            .field("retired", &self.inner.retired.load(Ordering::Relaxed))
            .finish()
    }
}

impl<M: Send + 'static> Stage<M> {
    pub(crate) fn new(generation: u64, requests: Arc<Requests<M>>, keyboard: Keyboard) -> Self {
        Self {
            inner: Arc::new(StageInner {
                generation,
                scheduler: Scheduler::for_generation(generation),
                actors: ActorRegistry::new(),
                views: Mutex::new(Vec::new()),
                requests,
                keyboard,
                retired: AtomicBool::new(false),
            }),
        }
    }

    /// Generation number, unique within the stack.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// The process scheduler of this state.
    #[inline]
    pub fn scheduler(&self) -> &Scheduler<M> {
        &self.inner.scheduler
    }

    /// The actor registry of this state.
    #[inline]
    pub fn actors(&self) -> &ActorRegistry {
        &self.inner.actors
    }

    /// Keys currently held.
    #[inline]
    pub fn keyboard(&self) -> &Keyboard {
        &self.inner.keyboard
    }

    /// Whether the state was popped.
    #[inline]
    pub fn is_retired(&self) -> bool {
        self.inner.retired.load(Ordering::Acquire)
    }

    // ---- processes ----

    /// Start a process in this state.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::run`].
    pub fn run_process<P: Process<M>>(&self, process: P) -> Result<ProcessHandle<M>, SchedulerError> {
        self.inner.scheduler.run(process)
    }

    /// Send an application message to every live process of this state.
    pub fn notify_all(&self, message: &M)
    where
        M: Clone,
    {
        self.inner.scheduler.notify_all(message);
    }

    /// Send an application message to the live processes matching
    /// `predicate`.
    pub fn notify_where<F>(&self, message: &M, predicate: F)
    where
        M: Clone,
        F: Fn(&ProcessHandle<M>) -> bool,
    {
        self.inner.scheduler.notify_where(message, predicate);
    }

    // ---- actors ----

    /// Add an actor to this state under `layer`.
    pub fn add_actor<A, F>(&self, layer: u32, make: F) -> ActorHandle<A>
    where
        A: Actor,
        F: FnOnce(ActorId) -> A,
    {
        self.inner.actors.add(layer, make)
    }

    /// Destroy an actor of this state. No-op for unknown ids.
    pub fn destroy_actor(&self, id: ActorId) -> bool {
        self.inner.actors.destroy(id)
    }

    /// Look up an actor of this state.
    pub fn find_actor(&self, id: ActorId) -> Option<ActorRef> {
        self.inner.actors.find(id)
    }

    // ---- views ----

    /// Initialize `view` and append it to this state's views.
    ///
    /// Returns `false` if the state was already popped.
    pub fn add_view<V: View<M>>(&self, view: V) -> bool {
        if self.is_retired() {
            warn!("view not added: generation {} was popped", self.generation());
            return false;
        }
        let view: SharedView<M> = Arc::new(Mutex::new(view));
        view.lock().init(self);
        self.inner.views.lock().push(view);
        true
    }

    /// Number of views.
    pub fn view_count(&self) -> usize {
        self.inner.views.lock().len()
    }

    fn views(&self) -> Vec<SharedView<M>> {
        self.inner.views.lock().clone()
    }

    pub(crate) fn update_views(&self) {
        for view in self.views() {
            view.lock().update(self);
        }
    }

    /// Offer `event` to each view in registration order until one
    /// consumes it.
    pub(crate) fn offer_to_views(&self, event: &Event) -> bool {
        self.views()
            .iter()
            .any(|view| view.lock().handle_event(self, event))
    }

    // ---- stack requests ----

    fn request(&self, transition: Transition<M>) {
        if self.is_retired() {
            warn!(
                "{transition:?} ignored: generation {} was popped",
                self.generation()
            );
            return;
        }
        debug!("generation {} requested {transition:?}", self.generation());
        self.inner.requests.push(Request::Transition(transition));
    }

    /// Push `state` above the current one.
    pub fn push_state(&self, state: impl GameState<M>) {
        self.request(Transition::Push(Box::new(state)));
    }

    /// Pop the current state.
    pub fn pop_state(&self) {
        self.request(Transition::Pop);
    }

    /// Replace the current state.
    pub fn new_state(&self, state: impl GameState<M>) {
        self.request(Transition::Replace(Box::new(state)));
    }

    /// Drain the current state's processes, then replace it.
    pub fn new_state_now(&self, state: impl GameState<M>) {
        self.request(Transition::ReplaceNow(Box::new(state)));
    }

    /// Replace the current state once its processes have all finished.
    ///
    /// Unlike [`new_state_now`](Self::new_state_now) nothing is quit: the
    /// state keeps running, and its processes may still activate and hand
    /// off to successors before the switch.
    pub fn new_state_wait(&self, state: impl GameState<M>) {
        self.request(Transition::ReplaceWait(Box::new(state)));
    }

    /// Stop the loop as a close event would.
    pub fn request_exit(&self) {
        self.inner.requests.request_exit();
    }

    /// Tear down everything scoped to this stage.
    ///
    /// Processes are told to quit but not waited for.
    pub(crate) fn retire(&self) {
        self.inner.retired.store(true, Ordering::Release);
        self.inner.scheduler.close();
        self.inner.scheduler.quit_all();

        let views = std::mem::take(&mut *self.inner.views.lock());
        for view in views {
            view.lock().cleanup(self);
        }
        self.inner.actors.teardown();
        debug!("generation {} retired", self.generation());
    }
}
