//! Input thread: polls crossterm and forwards engine events.

use crate::engine::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossbeam_channel::{SendTimeoutError, Sender};
use crossterm::event::{self, KeyEventKind};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) type Feed = Sender<io::Result<Event>>;

/// Owns the `proscenium-input` thread.
pub(crate) struct InputThread {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl InputThread {
    /// Spawn the thread. Without terminal release reporting every press is
    /// followed by a synthetic release.
    pub(crate) fn spawn(feed: Feed, poll_timeout: Duration, releases: bool) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("proscenium-input".to_string())
            .spawn(move || run_loop(&feed, &flag, poll_timeout, releases))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    pub(crate) fn join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        self.join();
    }
}

fn run_loop(feed: &Feed, shutdown: &AtomicBool, poll_timeout: Duration, releases: bool) {
    while !shutdown.load(Ordering::Relaxed) {
        let polled = event::poll(poll_timeout).and_then(|ready| {
            if ready {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        });

        let raw = match polled {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(err) => {
                log::error!("terminal input failed: {err}");
                forward(feed, shutdown, Err(err), poll_timeout);
                break;
            }
        };

        for event in convert_event(raw, releases) {
            if !forward(feed, shutdown, Ok(event), poll_timeout) {
                return;
            }
        }
    }
}

/// Queue `item`, waiting while the queue is full. Gives up once shutdown is
/// requested or the receiver is gone; returns whether the item was queued.
fn forward(
    feed: &Feed,
    shutdown: &AtomicBool,
    item: io::Result<Event>,
    patience: Duration,
) -> bool {
    let mut item = item;
    loop {
        match feed.send_timeout(item, patience) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(back)) => {
                if shutdown.load(Ordering::Relaxed) {
                    return false;
                }
                item = back;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

/// Translate one crossterm event; yields zero, one or two engine events.
pub(crate) fn convert_event(event: event::Event, releases: bool) -> Vec<Event> {
    match event {
        event::Event::Key(key) => {
            let Some(code) = convert_key_code(key.code) else {
                return Vec::new();
            };
            let modifiers = convert_modifiers(key.modifiers);

            // Raw mode swallows SIGINT.
            if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                return vec![Event::Close];
            }

            let key_event = KeyEvent::new(code, modifiers);
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat if releases => {
                    vec![Event::KeyDown(key_event)]
                }
                KeyEventKind::Press => vec![Event::KeyDown(key_event), Event::KeyUp(key_event)],
                KeyEventKind::Release => vec![Event::KeyUp(key_event)],
                KeyEventKind::Repeat => Vec::new(),
            }
        }
        event::Event::Resize(width, height) => vec![Event::Resize { width, height }],
        event::Event::FocusGained => vec![Event::FocusGained],
        event::Event::FocusLost => vec![Event::FocusLost],
        event::Event::Paste(text) => vec![Event::Paste(text)],
        event::Event::Mouse(_) => Vec::new(),
    }
}

fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
    Some(match code {
        event::KeyCode::Char(' ') => KeyCode::Space,
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::F(n) => KeyCode::F(n),
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        event::KeyCode::Home => KeyCode::Home,
        event::KeyCode::End => KeyCode::End,
        event::KeyCode::PageUp => KeyCode::PageUp,
        event::KeyCode::PageDown => KeyCode::PageDown,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::BackTab => KeyCode::BackTab,
        event::KeyCode::Delete => KeyCode::Delete,
        event::KeyCode::Insert => KeyCode::Insert,
        event::KeyCode::Esc => KeyCode::Esc,
        _ => return None,
    })
}

fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    out.set(KeyModifiers::SHIFT, mods.contains(event::KeyModifiers::SHIFT));
    out.set(KeyModifiers::CONTROL, mods.contains(event::KeyModifiers::CONTROL));
    out.set(KeyModifiers::ALT, mods.contains(event::KeyModifiers::ALT));
    out.set(KeyModifiers::SUPER, mods.contains(event::KeyModifiers::SUPER));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: event::KeyCode, mods: event::KeyModifiers, kind: KeyEventKind) -> event::Event {
        event::Event::Key(event::KeyEvent::new_with_kind(code, mods, kind))
    }

    #[test]
    fn test_press_with_release_reporting() {
        let events = convert_event(
            key(event::KeyCode::Left, event::KeyModifiers::SHIFT, KeyEventKind::Press),
            true,
        );
        assert_eq!(
            events,
            vec![Event::KeyDown(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT))]
        );

        let events = convert_event(
            key(event::KeyCode::Left, event::KeyModifiers::NONE, KeyEventKind::Release),
            true,
        );
        assert_eq!(events, vec![Event::KeyUp(KeyCode::Left.into())]);
    }

    #[test]
    fn test_press_without_release_reporting() {
        let events = convert_event(
            key(event::KeyCode::Char(' '), event::KeyModifiers::NONE, KeyEventKind::Press),
            false,
        );
        assert_eq!(
            events,
            vec![
                Event::KeyDown(KeyCode::Space.into()),
                Event::KeyUp(KeyCode::Space.into())
            ]
        );
    }

    #[test]
    fn test_ctrl_c_closes() {
        let events = convert_event(
            key(event::KeyCode::Char('c'), event::KeyModifiers::CONTROL, KeyEventKind::Press),
            false,
        );
        assert_eq!(events, vec![Event::Close]);
    }

    #[test]
    fn test_full_queue_does_not_block_shutdown() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let shutdown = AtomicBool::new(false);
        let patience = Duration::from_millis(5);

        assert!(forward(&tx, &shutdown, Ok(Event::FocusGained), patience));
        shutdown.store(true, Ordering::Relaxed);
        assert!(!forward(&tx, &shutdown, Ok(Event::FocusLost), patience));
        assert_eq!(rx.len(), 1);

        drop(rx);
        shutdown.store(false, Ordering::Relaxed);
        assert!(!forward(&tx, &shutdown, Ok(Event::FocusLost), patience));
    }

    #[test]
    fn test_passthrough_and_ignored() {
        assert_eq!(
            convert_event(event::Event::Resize(80, 24), false),
            vec![Event::Resize { width: 80, height: 24 }]
        );
        assert!(convert_event(
            key(event::KeyCode::CapsLock, event::KeyModifiers::NONE, KeyEventKind::Press),
            false
        )
        .is_empty());
    }
}
