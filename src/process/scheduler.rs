//! Scheduler: owns the live process set of one state generation.
//!
//! Every process runs on its own named thread and owns the receiving end of
//! an unbounded mailbox. The live set is a `Vec` of handles behind a mutex;
//! the mutex is held only while the list is spliced or walked for a
//! broadcast, never while a process hook runs.

use super::handle::ProcessHandle;
use super::message::{Message, ProcessState};
use super::Process;
use crate::error::SchedulerError;
use crossbeam_channel::{unbounded, Receiver};
use log::{debug, error, warn};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct Inner<M> {
    /// Live processes, in start order.
    live: Mutex<Vec<ProcessHandle<M>>>,
    /// Signalled whenever the live set becomes empty.
    drained: Condvar,
    /// Set once the owning state is popped or draining.
    closed: AtomicBool,
    generation: u64,
}

/// Process scheduler for a single state generation.
///
/// Cloning is cheap and yields another handle to the same live set.
pub struct Scheduler<M = ()> {
    inner: Arc<Inner<M>>,
}

impl<M> Clone for Scheduler<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> std::fmt::Debug for Scheduler<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("generation", &self.inner.generation)
            .field("live", &self.inner.live.lock().len())
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl<M: Send + 'static> Default for Scheduler<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// How a receive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// `tick` returned `false`.
    Completed,
    /// Quit message, or every sender is gone.
    Quit,
    /// A hook returned an error.
    Failed,
}

impl<M: Send + 'static> Scheduler<M> {
    /// Create a standalone scheduler.
    pub fn new() -> Self {
        Self::for_generation(0)
    }

    pub(crate) fn for_generation(generation: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                live: Mutex::new(Vec::new()),
                drained: Condvar::new(),
                closed: AtomicBool::new(false),
                generation,
            }),
        }
    }

    /// State generation this scheduler belongs to.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// Initialize `process` on the calling thread, then start its receive
    /// loop on a new thread.
    ///
    /// If `init` fails the error is logged and returned, and the process is
    /// never scheduled.
    pub fn run<P: Process<M>>(&self, process: P) -> Result<ProcessHandle<M>, SchedulerError> {
        self.run_boxed(Box::new(process))
    }

    /// Boxed variant of [`run`](Self::run), used for successors.
    pub fn run_boxed(
        &self,
        process: Box<dyn Process<M>>,
    ) -> Result<ProcessHandle<M>, SchedulerError> {
        self.start(process, |name, task| {
            thread::Builder::new().name(name).spawn(task).map(drop)
        })
    }

    fn start<S>(
        &self,
        mut process: Box<dyn Process<M>>,
        spawn: S,
    ) -> Result<ProcessHandle<M>, SchedulerError>
    where
        S: FnOnce(String, Box<dyn FnOnce() + Send>) -> std::io::Result<()>,
    {
        let kind = process.kind();
        if self.is_closed() {
            warn!("refusing to start {kind}: generation {} is closed", self.generation());
            return Err(SchedulerError::Closed);
        }

        if let Err(source) = process.init() {
            error!("error during process initialization of {kind}: {source}");
            return Err(SchedulerError::Init { kind, source });
        }

        let (tx, rx) = unbounded();
        let handle = ProcessHandle::new(kind, tx);
        {
            let mut live = self.inner.live.lock();
            // Re-checked under the lock so a concurrent drain cannot miss us.
            if self.is_closed() {
                drop(live);
                process.cleanup();
                return Err(SchedulerError::Closed);
            }
            live.push(handle.clone());
        }
        handle.set_state(ProcessState::Running);

        // Shared so the process is still reachable if the spawn fails.
        let slot = Arc::new(Mutex::new(Some(process)));
        let claimed = Arc::clone(&slot);
        let inner = Arc::clone(&self.inner);
        let task = handle.clone();
        let spawned = spawn(
            format!("proscenium-proc-{}", handle.id().get()),
            Box::new(move || {
                let process = claimed.lock().take();
                if let Some(process) = process {
                    run_task(inner, task, process, rx);
                }
            }),
        );

        match spawned {
            Ok(()) => {
                debug!("started {kind} {} in generation {}", handle.id(), self.generation());
                Ok(handle)
            }
            Err(err) => {
                error!("failed to spawn a thread for {kind}: {err}");
                let process = slot.lock().take();
                if let Some(mut process) = process {
                    process.cleanup();
                }
                handle.set_state(ProcessState::Terminated);
                self.inner.remove(&handle);
                Err(SchedulerError::Spawn(err))
            }
        }
    }

    /// Send an application message to one process.
    #[inline]
    pub fn notify(&self, process: &ProcessHandle<M>, message: M) -> bool {
        process.notify(message)
    }

    /// Send `Quit` to one process.
    #[inline]
    pub fn close_process(&self, process: &ProcessHandle<M>) -> bool {
        process.close()
    }

    /// Send an application message to every live process.
    pub fn notify_all(&self, message: &M)
    where
        M: Clone,
    {
        self.notify_where(message, |_| true);
    }

    /// Send an application message to every live process matching `filter`.
    pub fn notify_where<F>(&self, message: &M, predicate: F)
    where
        M: Clone,
        F: Fn(&ProcessHandle<M>) -> bool,
    {
        // The predicate is caller code, so it runs on a snapshot.
        for process in &self.processes() {
            if predicate(process) {
                process.notify(message.clone());
            }
        }
    }

    /// Deliver one `Tick` to every live process.
    pub fn tick_all(&self) {
        self.send_all(|| Message::Tick);
    }

    /// Deliver `Quit` to every live process.
    pub fn quit_all(&self) {
        self.send_all(|| Message::Quit);
    }

    fn send_all(&self, make: impl Fn() -> Message<M>) {
        let live = self.inner.live.lock();
        for process in live.iter() {
            process.send(make());
        }
    }

    /// Number of live processes.
    pub fn live_count(&self) -> usize {
        self.inner.live.lock().len()
    }

    /// Whether `process` is still in the live set.
    pub fn is_live(&self, process: &ProcessHandle<M>) -> bool {
        self.inner.live.lock().contains(process)
    }

    /// Snapshot of the live set.
    pub fn processes(&self) -> Vec<ProcessHandle<M>> {
        self.inner.live.lock().clone()
    }

    /// Refuse every future `run` on this scheduler.
    pub fn close(&self) {
        let _live = self.inner.live.lock();
        self.inner.closed.store(true, Ordering::Release);
    }

    /// Whether the scheduler refuses new processes.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Block until the live set is empty.
    pub fn wait_drained(&self) {
        let mut live = self.inner.live.lock();
        while !live.is_empty() {
            self.inner.drained.wait(&mut live);
        }
    }

    /// Block until the live set is empty or `timeout` elapses.
    ///
    /// Returns `true` if the live set drained.
    pub fn wait_drained_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut live = self.inner.live.lock();
        while !live.is_empty() {
            if self.inner.drained.wait_until(&mut live, deadline).timed_out() {
                return live.is_empty();
            }
        }
        true
    }

    /// Close the scheduler, quit every live process and wait for all of them
    /// to exit.
    ///
    /// With a timeout, returns `false` if processes were still live when it
    /// elapsed.
    pub fn drain(&self, timeout: Option<Duration>) -> bool {
        self.close();
        self.quit_all();
        match timeout {
            Some(timeout) => {
                let drained = self.wait_drained_timeout(timeout);
                if !drained {
                    warn!(
                        "generation {} still has {} live processes after {timeout:?}",
                        self.generation(),
                        self.live_count()
                    );
                }
                drained
            }
            None => {
                self.wait_drained();
                true
            }
        }
    }
}

impl<M> Inner<M> {
    fn remove(&self, process: &ProcessHandle<M>) {
        let mut live = self.live.lock();
        if let Some(index) = live.iter().position(|p| p == process) {
            live.remove(index);
        }
        if live.is_empty() {
            self.drained.notify_all();
        }
    }
}

/// Removes the process from the live set when the task ends, including by
/// panic.
struct LiveGuard<M> {
    inner: Arc<Inner<M>>,
    handle: ProcessHandle<M>,
}

impl<M> Drop for LiveGuard<M> {
    fn drop(&mut self) {
        self.handle.set_state(ProcessState::Terminated);
        self.inner.remove(&self.handle);
    }
}

/// Body of a process thread.
fn run_task<M: Send + 'static>(
    inner: Arc<Inner<M>>,
    handle: ProcessHandle<M>,
    mut process: Box<dyn Process<M>>,
    mailbox: Receiver<Message<M>>,
) {
    let guard = LiveGuard {
        inner,
        handle: handle.clone(),
    };

    let exit = receive_loop(process.as_mut(), &mailbox, &handle);
    handle.set_state(ProcessState::Quitting);
    process.cleanup();

    if exit == Exit::Completed {
        if let Some(next) = process.next() {
            let scheduler = Scheduler {
                inner: Arc::clone(&guard.inner),
            };
            if let Err(err) = scheduler.run_boxed(next) {
                warn!("successor of {} {} not started: {err}", handle.kind(), handle.id());
            }
        }
    }

    debug!("{} {} exited ({exit:?})", handle.kind(), handle.id());
    drop(mailbox);
    drop(guard);
}

fn receive_loop<M>(
    process: &mut dyn Process<M>,
    mailbox: &Receiver<Message<M>>,
    handle: &ProcessHandle<M>,
) -> Exit
where
    M: Send + 'static,
{
    loop {
        let Ok(message) = mailbox.recv() else {
            return Exit::Quit;
        };

        match message {
            Message::Quit => return Exit::Quit,
            Message::Tick => match process.tick() {
                Ok(true) => {}
                Ok(false) => return Exit::Completed,
                Err(err) => {
                    error!("{} {} exited with error: {err}", handle.kind(), handle.id());
                    return Exit::Failed;
                }
            },
            Message::App(message) => {
                if let Err(err) = process.handle_message(message) {
                    error!(
                        "{} {} failed handling a message: {err}",
                        handle.kind(),
                        handle.id()
                    );
                    return Exit::Failed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;
    use crate::process::DelayProcess;
    use crossbeam_channel::{Receiver, Sender};

    const WAIT: Duration = Duration::from_secs(5);

    /// Records every hook call on a channel.
    struct Probe {
        name: &'static str,
        events: Sender<String>,
        ticks_left: u32,
        fail_on_message: bool,
        successor: Option<Box<dyn Process<u32>>>,
    }

    impl Probe {
        fn new(name: &'static str, events: &Sender<String>) -> Self {
            Self {
                name,
                events: events.clone(),
                ticks_left: u32::MAX,
                fail_on_message: false,
                successor: None,
            }
        }

        fn log(&self, what: &str) {
            let _ = self.events.send(format!("{}:{what}", self.name));
        }
    }

    impl Process<u32> for Probe {
        fn init(&mut self) -> Result<(), ProcessError> {
            self.log("init");
            Ok(())
        }

        fn tick(&mut self) -> Result<bool, ProcessError> {
            self.log("tick");
            self.ticks_left -= 1;
            Ok(self.ticks_left > 0)
        }

        fn handle_message(&mut self, message: u32) -> Result<(), ProcessError> {
            self.log(&format!("msg{message}"));
            if self.fail_on_message {
                return Err(ProcessError::msg("bad message"));
            }
            Ok(())
        }

        fn cleanup(&mut self) {
            self.log("cleanup");
        }

        fn next(&mut self) -> Option<Box<dyn Process<u32>>> {
            self.successor.take()
        }
    }

    struct FailingInit;

    impl Process<u32> for FailingInit {
        fn init(&mut self) -> Result<(), ProcessError> {
            Err(ProcessError::msg("no assets"))
        }
    }

    fn drain_events(rx: &Receiver<String>) -> Vec<String> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_init_runs_on_caller() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        let handle = scheduler.run(Probe::new("a", &tx)).unwrap();

        // init happened before run returned
        assert_eq!(rx.try_recv().unwrap(), "a:init");
        assert_eq!(handle.state(), ProcessState::Running);
        assert_eq!(scheduler.live_count(), 1);

        assert!(scheduler.drain(Some(WAIT)));
    }

    #[test]
    fn test_init_failure_not_scheduled() {
        let scheduler = Scheduler::<u32>::new();
        let result = scheduler.run(FailingInit);
        assert!(matches!(result, Err(SchedulerError::Init { .. })));
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_messages_in_send_order() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        let handle = scheduler.run(Probe::new("a", &tx)).unwrap();

        for i in 0..5 {
            assert!(handle.notify(i));
        }
        handle.close();
        scheduler.wait_drained();

        let events = drain_events(&rx);
        assert_eq!(
            events,
            vec!["a:init", "a:msg0", "a:msg1", "a:msg2", "a:msg3", "a:msg4", "a:cleanup"]
        );
    }

    #[test]
    fn test_close_then_drain() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        let handle = scheduler.run(Probe::new("a", &tx)).unwrap();

        assert!(handle.close());
        assert!(scheduler.drain(Some(WAIT)));

        assert!(handle.is_terminated());
        assert!(!scheduler.is_live(&handle));
        let cleanups = drain_events(&rx).iter().filter(|e| *e == "a:cleanup").count();
        assert_eq!(cleanups, 1);

        // Mailbox closed: every send is a silent no-op.
        assert!(!handle.notify(7));
        assert!(!handle.send(Message::Tick));
        assert!(!handle.close());
    }

    #[test]
    fn test_error_terminates_without_successor() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();

        let mut probe = Probe::new("a", &tx);
        probe.fail_on_message = true;
        probe.successor = Some(Box::new(Probe::new("b", &tx)));
        let sibling = scheduler.run(Probe::new("c", &tx)).unwrap();
        let handle = scheduler.run(probe).unwrap();

        handle.notify(1);
        let deadline = Instant::now() + WAIT;
        while !handle.is_terminated() && Instant::now() < deadline {
            thread::yield_now();
        }
        assert!(handle.is_terminated());

        // The sibling is untouched.
        assert!(scheduler.is_live(&sibling));
        assert_eq!(scheduler.live_count(), 1);

        assert!(scheduler.drain(Some(WAIT)));
        let events = drain_events(&rx);
        assert!(events.contains(&"a:cleanup".to_string()));
        assert!(!events.contains(&"b:init".to_string()));
    }

    #[test]
    fn test_quit_skips_successor() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        let mut probe = Probe::new("a", &tx);
        probe.successor = Some(Box::new(Probe::new("b", &tx)));
        scheduler.run(probe).unwrap().close();

        scheduler.wait_drained();
        let events = drain_events(&rx);
        assert!(!events.iter().any(|e| e.starts_with("b:")));
    }

    #[test]
    fn test_delay_chain_hands_off_to_successor() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        let delay = DelayProcess::new(3).then(Probe::new("s", &tx));
        let handle = scheduler.run(delay).unwrap();

        for _ in 0..3 {
            assert!(handle.send(Message::Tick));
        }

        // Successor registers before the delay process leaves the live set.
        let deadline = Instant::now() + WAIT;
        while !handle.is_terminated() && Instant::now() < deadline {
            thread::yield_now();
        }
        assert!(handle.is_terminated());
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), "s:init");

        let live = scheduler.processes();
        assert_eq!(live.len(), 1);
        assert!(live[0].is::<Probe>());

        // A fourth tick to the finished delay process goes nowhere.
        assert!(!handle.send(Message::Tick));

        assert!(scheduler.drain(Some(WAIT)));
    }

    #[test]
    fn test_notify_where_filters() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        scheduler.run(Probe::new("a", &tx)).unwrap();
        scheduler.run(DelayProcess::new(100)).unwrap();

        scheduler.notify_where(&9, |p| p.is::<Probe>());
        scheduler.notify_all(&4);
        assert!(scheduler.drain(Some(WAIT)));

        let events = drain_events(&rx);
        assert_eq!(events, vec!["a:init", "a:msg9", "a:msg4", "a:cleanup"]);
    }

    #[test]
    fn test_closed_scheduler_refuses() {
        let scheduler = Scheduler::<u32>::new();
        scheduler.close();
        let result = scheduler.run(DelayProcess::new(1));
        assert!(matches!(result, Err(SchedulerError::Closed)));
    }

    #[test]
    fn test_debug_reports_closed() {
        let scheduler = Scheduler::<u32>::new();
        assert!(format!("{scheduler:?}").contains("closed: false"));
        scheduler.close();
        assert!(format!("{scheduler:?}").contains("closed: true"));
    }

    #[test]
    fn test_spawn_failure_cleans_up() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Scheduler::<u32>::new();
        let result = scheduler.start(Box::new(Probe::new("orphan", &tx)), |_, _| {
            Err(std::io::Error::other("no threads left"))
        });

        assert!(matches!(result, Err(SchedulerError::Spawn(_))));
        assert_eq!(drain_events(&rx), vec!["orphan:init", "orphan:cleanup"]);
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_panicking_process_leaves_live_set() {
        struct Panics;
        impl Process for Panics {
            fn tick(&mut self) -> Result<bool, ProcessError> {
                panic!("tick exploded");
            }
        }

        let scheduler = Scheduler::<()>::new();
        let handle = scheduler.run(Panics).unwrap();
        scheduler.tick_all();
        assert!(scheduler.wait_drained_timeout(WAIT));
        assert!(handle.is_terminated());
    }

    #[test]
    fn test_wait_drained_timeout_expires() {
        let scheduler = Scheduler::<()>::new();
        scheduler.run(DelayProcess::new(10)).unwrap();
        assert!(!scheduler.wait_drained_timeout(Duration::from_millis(20)));
        assert!(scheduler.drain(Some(WAIT)));
    }
}
