//! `Surface`: the drawing target handed to states and actors.

use super::output::OutputBuffer;
use crate::config::Rgb;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Debug)]
struct Canvas {
    out: OutputBuffer,
    width: u16,
    height: u16,
}

/// Shared frame under construction.
///
/// The backend starts every frame by clearing it and ends it by flushing
/// it to the terminal; everything in between is drawn by render hooks.
/// Drawing outside the visible area is clipped. Clones share the frame.
#[derive(Debug, Clone)]
pub struct Surface {
    canvas: Arc<Mutex<Canvas>>,
}

impl Surface {
    /// A surface of `width` x `height` cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            canvas: Arc::new(Mutex::new(Canvas {
                out: OutputBuffer::new(),
                width,
                height,
            })),
        }
    }

    /// Size in cells.
    pub fn size(&self) -> (u16, u16) {
        let canvas = self.canvas.lock();
        (canvas.width, canvas.height)
    }

    /// Draw `ch` at cell `(x, y)`.
    pub fn put(&self, x: i32, y: i32, ch: char, fg: Rgb) {
        let mut canvas = self.canvas.lock();
        let Some((col, row)) = canvas.clip(x, y) else {
            return;
        };
        canvas.out.cursor_move(col, row);
        canvas.out.set_fg(fg);
        canvas.out.write_char(ch);
    }

    /// Draw `text` left to right from `(x, y)`, one char per cell.
    pub fn text(&self, x: i32, y: i32, text: &str, fg: Rgb) {
        let mut canvas = self.canvas.lock();
        canvas.out.set_fg(fg);
        let mut cursor = None;
        for (offset, ch) in (0i32..).zip(text.chars()) {
            let Some((col, row)) = canvas.clip(x.saturating_add(offset), y) else {
                cursor = None;
                continue;
            };
            if cursor != Some(col) {
                canvas.out.cursor_move(col, row);
            }
            canvas.out.write_char(ch);
            cursor = Some(col + 1);
        }
    }

    pub(crate) fn resize(&self, width: u16, height: u16) {
        let mut canvas = self.canvas.lock();
        canvas.width = width;
        canvas.height = height;
    }

    /// Start a new frame cleared to `background`.
    pub(crate) fn begin(&self, background: Rgb) {
        let mut canvas = self.canvas.lock();
        canvas.out.clear();
        canvas.out.reset_attrs();
        canvas.out.set_bg(background);
        canvas.out.clear_screen();
    }

    /// Write the frame to `writer`.
    pub(crate) fn flush_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.canvas.lock().out.flush_to(writer)
    }

    /// Bytes of the frame so far.
    pub fn contents(&self) -> Vec<u8> {
        self.canvas.lock().out.as_bytes().to_vec()
    }
}

impl Canvas {
    fn clip(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let col = u16::try_from(x).ok().filter(|col| *col < self.width)?;
        let row = u16::try_from(y).ok().filter(|row| *row < self.height)?;
        Some((col, row))
    }
}
