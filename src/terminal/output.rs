//! `OutputBuffer`: one frame of ANSI output, flushed in a single write.

use crate::config::Rgb;
use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// A whole frame is accumulated here, then flushed in one `write()` so the
/// terminal never shows a half-drawn frame.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical frame (16KB).
    pub fn new() -> Self {
        Self::with_capacity(16 * 1024)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a character.
    #[inline]
    pub fn write_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.data
            .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    /// Move cursor to (x, y), 0-indexed.
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        // CSI row ; col H
        let _ = write!(self.data, "\x1b[{};{}H", y + 1, x + 1);
    }

    /// Set foreground color (true color).
    #[inline]
    pub fn set_fg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Set background color (true color).
    #[inline]
    pub fn set_bg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Clear the entire screen with the current background.
    #[inline]
    pub fn clear_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[2J");
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
