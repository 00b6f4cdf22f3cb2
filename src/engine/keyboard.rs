//! Held-key tracking.

use super::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Pressed {
    keys: BTreeSet<KeyCode>,
    modifiers: KeyModifiers,
}

/// Shared set of keys currently held down.
///
/// The loop updates it from key events before dispatching them, so any hook
/// can ask whether a key is held. Cloning yields another handle to the
/// same set.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    pressed: Arc<Mutex<Pressed>>,
}

impl Keyboard {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down.
    pub fn press(&self, key: KeyEvent) {
        let mut pressed = self.pressed.lock();
        pressed.keys.insert(key.code);
        pressed.modifiers = key.modifiers;
    }

    /// Record a key going up.
    pub fn release(&self, key: KeyEvent) {
        let mut pressed = self.pressed.lock();
        pressed.keys.remove(&key.code);
        pressed.modifiers = key.modifiers;
    }

    /// Whether `code` is held.
    pub fn is_down(&self, code: KeyCode) -> bool {
        self.pressed.lock().keys.contains(&code)
    }

    /// Modifiers reported with the latest key event.
    pub fn modifiers(&self) -> KeyModifiers {
        self.pressed.lock().modifiers
    }

    /// Whether exactly `modifiers` are held together with every key in `keys`.
    pub fn matches(&self, modifiers: KeyModifiers, keys: &[KeyCode]) -> bool {
        let pressed = self.pressed.lock();
        pressed.modifiers == modifiers && keys.iter().all(|key| pressed.keys.contains(key))
    }

    /// Keys currently held, in a stable order.
    pub fn held(&self) -> Vec<KeyCode> {
        self.pressed.lock().keys.iter().copied().collect()
    }

    /// Forget every held key, e.g. after focus is lost.
    pub fn clear(&self) {
        let mut pressed = self.pressed.lock();
        pressed.keys.clear();
        pressed.modifiers = KeyModifiers::empty();
    }
}
