//! Ticker thread: feeds `Event::Timer` at the configured step.

use super::input::Feed;
use crate::engine::Event;
use crossbeam_channel::TrySendError;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Owns the `proscenium-ticker` thread.
///
/// At most one timer event is in flight: the next one is only queued once
/// the loop has taken the previous one (see [`TickerThread::taken`]). A
/// slow loop therefore never finds a backlog of timers in its queue.
pub(crate) struct TickerThread {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    pending: Arc<AtomicBool>,
}

impl TickerThread {
    pub(crate) fn spawn(feed: Feed, interval: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let in_flight = Arc::clone(&pending);

        let handle = thread::Builder::new()
            .name("proscenium-ticker".to_string())
            .spawn(move || run_loop(&feed, &flag, &in_flight, interval))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            pending,
        })
    }

    /// The loop received a timer event.
    pub(crate) fn taken(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub(crate) fn join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TickerThread {
    fn drop(&mut self) {
        self.join();
    }
}

fn run_loop(feed: &Feed, shutdown: &AtomicBool, pending: &AtomicBool, interval: Duration) {
    let mut next_tick = Instant::now() + interval;

    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now < next_tick {
            thread::sleep((next_tick - now).min(Duration::from_millis(1)));
            continue;
        }

        if !pending.swap(true, Ordering::AcqRel) {
            match feed.try_send(Ok(Event::Timer)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => pending.store(false, Ordering::Release),
                Err(TrySendError::Disconnected(_)) => break,
            }
        }

        next_tick += interval;
        if next_tick < now {
            next_tick = now + interval;
        }
    }
}
