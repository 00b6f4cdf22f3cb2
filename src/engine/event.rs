//! Events delivered to the loop by a [`Backend`](super::Backend).

use bitflags::bitflags;

/// Key codes.
///
/// A backend-neutral subset of what terminals and windowing layers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab key.
    Tab,
    /// Backtab (Shift+Tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Escape key.
    Esc,
    /// Space bar.
    Space,
}

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// ```
    /// use proscenium::KeyModifiers;
    /// let chord = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
    /// assert!(chord.contains(KeyModifiers::SHIFT));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// Shift key held
        const SHIFT = 0b0000_0001;
        /// Control key held
        const CONTROL = 0b0000_0010;
        /// Alt/Option key held
        const ALT = 0b0000_0100;
        /// Super/Command/Windows key held
        const SUPER = 0b0000_1000;
    }
}

impl std::fmt::Debug for KeyModifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key.
    pub code: KeyCode,
    /// Modifiers held with it.
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// A key event without modifiers.
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// A key event with modifiers.
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}

/// Everything the loop can be woken by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The frame timer fired.
    Timer,
    /// The display or session is closing.
    Close,
    /// A key went down.
    KeyDown(KeyEvent),
    /// A key went up.
    KeyUp(KeyEvent),
    /// The display was resized.
    Resize {
        /// New width.
        width: u16,
        /// New height.
        height: u16,
    },
    /// Focus gained.
    FocusGained,
    /// Focus lost.
    FocusLost,
    /// Pasted text (bracketed paste).
    Paste(String),
}

impl Event {
    /// The key code of a key event.
    pub const fn key(&self) -> Option<KeyCode> {
        match self {
            Self::KeyDown(key) | Self::KeyUp(key) => Some(key.code),
            _ => None,
        }
    }

    /// Whether this is a press of `code`.
    pub fn is_key_down(&self, code: KeyCode) -> bool {
        matches!(self, Self::KeyDown(key) if key.code == code)
    }
}
