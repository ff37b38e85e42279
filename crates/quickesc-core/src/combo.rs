// Quickesc Combo Type
// A key plus the modifiers that must be held while it is tapped

use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::modifier::{Modifier, ModifierSnapshot};
use crate::Key;

/// A key combination with an ordered set of modifiers
#[derive(Debug, Clone)]
pub struct Combo {
    modifiers: SmallVec<[Modifier; 4]>,
    key: Key,
}

impl Combo {
    /// Create a new Combo from modifiers and a key; duplicates are dropped
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        let mut unique: SmallVec<[Modifier; 4]> = SmallVec::new();
        for modifier in modifiers {
            if !unique.contains(&modifier) {
                unique.push(modifier);
            }
        }
        Self {
            modifiers: unique,
            key,
        }
    }

    /// A bare key with no modifiers
    pub fn key_only(key: Key) -> Self {
        Self {
            modifiers: SmallVec::new(),
            key,
        }
    }

    /// Get the modifiers for this combo
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Get the key for this combo
    pub fn key(&self) -> Key {
        self.key
    }

    /// Union of the modifier masks
    pub fn mask(&self) -> ModifierSnapshot {
        ModifierSnapshot::of(&self.modifiers)
    }

    /// True if the combo is just a key
    pub fn is_bare(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Add a modifier to this combo
    pub fn with_modifier(&self, modifier: Modifier) -> Self {
        Self::new(self.modifiers.iter().copied().chain([modifier]), self.key)
    }
}

impl PartialEq for Combo {
    fn eq(&self, other: &Self) -> bool {
        // Order-independent: compare the covered modifier bits
        self.mask() == other.mask() && self.key == other.key
    }
}

impl Eq for Combo {}

impl Hash for Combo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mask().hash(state);
        self.key.hash(state);
    }
}

impl From<Key> for Combo {
    fn from(key: Key) -> Self {
        Combo::key_only(key)
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}-", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}
