// Quickesc Combo Sending Calculation
// Modifier arithmetic for determining which keys to lift, press and restore

use smallvec::SmallVec;

use crate::{Combo, Key, Modifier, ModifierSnapshot};

/// Keys to toggle around the main key when sending a combo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboActionSequence {
    /// Held modifier keys that the combo does not want (released first, last-held first)
    pub modifiers_to_release: SmallVec<[Key; 8]>,
    /// Modifier keys the combo needs that are not held
    pub modifiers_to_press: SmallVec<[Key; 4]>,
    /// The main key of the combo
    pub main_key: Key,
    /// Lifted modifier keys to press again afterwards, in the order they were held
    pub modifiers_to_restore: SmallVec<[Key; 8]>,
}

impl ComboActionSequence {
    /// Check if this sequence requires any modifier changes
    pub fn needs_modifier_changes(&self) -> bool {
        !self.modifiers_to_release.is_empty() || !self.modifiers_to_press.is_empty()
    }

    /// Number of key reports the sequence produces
    pub fn total_actions(&self) -> usize {
        self.modifiers_to_release.len()
            + self.modifiers_to_press.len() * 2 // press, then release after the tap
            + 2 // press and release main key
            + self.modifiers_to_restore.len()
    }
}

/// Calculate the key toggles needed to send `combo` while `held` is down.
///
/// 1. Every held modifier key starts in the "lift" set.
/// 2. A held key that satisfies one of the combo's modifiers stays down, and
///    that modifier no longer needs pressing.
/// 3. Lift the rest, press what is missing, tap the key, restore the lifted keys.
pub fn calculate_combo_actions(combo: &Combo, held: ModifierSnapshot) -> ComboActionSequence {
    let held_keys = held.keys();
    let mut mod_keys_to_lift: SmallVec<[Key; 8]> = held_keys.clone();
    let mut mods_to_press: SmallVec<[Modifier; 4]> = combo.modifiers().iter().copied().collect();

    for held_key in &held_keys {
        for modifier in combo.modifiers() {
            if modifier.keys().contains(held_key) {
                mod_keys_to_lift.retain(|k| k != held_key);
                // The same modifier can be satisfied twice (both sides held)
                if let Some(pos) = mods_to_press.iter().position(|m| m == modifier) {
                    mods_to_press.remove(pos);
                }
            }
        }
    }

    let modifiers_to_release: SmallVec<[Key; 8]> = mod_keys_to_lift.iter().rev().copied().collect();
    let modifiers_to_press = mods_to_press.iter().map(|m| m.key()).collect();
    let modifiers_to_restore = mod_keys_to_lift;

    ComboActionSequence {
        modifiers_to_release,
        modifiers_to_press,
        main_key: combo.key(),
        modifiers_to_restore,
    }
}
