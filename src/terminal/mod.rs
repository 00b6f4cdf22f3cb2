//! Crossterm-backed [`Backend`].
//!
//! Two threads feed one bounded queue:
//!
//! ```text
//! ┌──────────────────┐
//! │ proscenium-input │──┐   KeyDown / KeyUp / Resize / Close
//! └──────────────────┘  │
//!                       ├──► queue ──► TerminalBackend::wait_event
//! ┌───────────────────┐ │
//! │ proscenium-ticker │─┘   Timer, once per step
//! └───────────────────┘
//! ```
//!
//! Frames are drawn into a shared [`Surface`] and written to stdout in one
//! flush by `present`.

mod input;
mod output;
mod surface;
mod ticker;

pub use output::OutputBuffer;
pub use surface::Surface;

use crate::config::{EngineConfig, Rgb};
use crate::engine::{Backend, Event};
use crate::error::EngineError;
use crossbeam_channel::{bounded, Receiver};
use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use input::InputThread;
use std::io;
use std::time::Duration;
use ticker::TickerThread;

const QUEUE_CAPACITY: usize = 64;
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Full-screen terminal backend.
///
/// Creating one puts the terminal in raw mode on the alternate screen;
/// dropping it stops both threads and restores the terminal.
pub struct TerminalBackend {
    events: Receiver<io::Result<Event>>,
    input: InputThread,
    ticker: TickerThread,
    surface: Surface,
    enhanced: bool,
}

impl TerminalBackend {
    /// Take over the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup or thread spawning fails.
    pub fn new(config: &EngineConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        let setup = execute!(
            stdout,
            EnterAlternateScreen,
            cursor::Hide,
            SetTitle(&config.title)
        )
        .and_then(|()| {
            if enhanced {
                execute!(
                    stdout,
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )
            } else {
                Ok(())
            }
        });
        if let Err(err) = setup {
            restore(enhanced);
            return Err(err);
        }

        let (tx, events) = bounded(QUEUE_CAPACITY);
        let threads = InputThread::spawn(tx.clone(), POLL_TIMEOUT, enhanced).and_then(|input| {
            TickerThread::spawn(tx, config.step()).map(|ticker| (input, ticker))
        });
        let (input, ticker) = match threads {
            Ok(threads) => threads,
            Err(err) => {
                restore(enhanced);
                return Err(err);
            }
        };

        log::debug!(
            "terminal backend up: {width}x{height}, release events: {enhanced}, step {:?}",
            config.step()
        );

        Ok(Self {
            events,
            input,
            ticker,
            surface: Surface::new(width, height),
            enhanced,
        })
    }

    /// The frame render hooks draw into.
    pub const fn surface(&self) -> &Surface {
        &self.surface
    }
}

impl Backend for TerminalBackend {
    fn wait_event(&mut self) -> Result<Event, EngineError> {
        let event = self
            .events
            .recv()
            .map_err(|_| EngineError::EventSourceClosed)??;

        match event {
            Event::Timer => self.ticker.taken(),
            Event::Resize { width, height } => self.surface.resize(width, height),
            _ => {}
        }
        Ok(event)
    }

    fn queue_is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn clear(&mut self, color: Rgb) -> Result<(), EngineError> {
        self.surface.begin(color);
        Ok(())
    }

    fn present(&mut self) -> Result<(), EngineError> {
        let mut stdout = io::stdout().lock();
        self.surface.flush_to(&mut stdout)?;
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        self.input.join();
        self.ticker.join();
        restore(self.enhanced);
    }
}

impl std::fmt::Debug for TerminalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalBackend")
            .field("queued", &self.events.len())
            .field("size", &self.surface.size())
            .field("enhanced", &self.enhanced)
            .finish_non_exhaustive()
    }
}

fn restore(enhanced: bool) {
    let mut stdout = io::stdout();
    if enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}
