// Quickesc Pressed Key State
// Keys currently held down on the synthetic output

use crate::Key;
use smallvec::SmallVec;

/// Tracks keys held on the output side, in press order
#[derive(Debug, Clone, Default)]
pub struct PressedKeyState {
    pressed: SmallVec<[Key; 8]>,
}

impl PressedKeyState {
    /// Create a new empty pressed key state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held; returns false if it already was
    pub fn add(&mut self, key: Key) -> bool {
        if self.is_pressed(key) {
            return false;
        }
        self.pressed.push(key);
        true
    }

    /// Mark a key as released; returns false if it was not held
    pub fn remove(&mut self, key: Key) -> bool {
        match self.pressed.iter().position(|k| *k == key) {
            Some(pos) => {
                self.pressed.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Check if a key is currently pressed
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Held keys in press order
    pub fn get_all(&self) -> &[Key] {
        &self.pressed
    }

    /// Forget every held key, returning them most recent first
    pub fn drain(&mut self) -> SmallVec<[Key; 8]> {
        let mut keys = std::mem::take(&mut self.pressed);
        keys.reverse();
        keys
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}
