// Quickesc Host Boundary
// The firmware services the core calls into, and the scoped modifier override

use std::ops::{Deref, DerefMut};

use crate::{Combo, Key, ModifierSnapshot};

/// Services the surrounding firmware provides to the core.
///
/// Emission is fire-and-forget: the host queues the report and returns.
pub trait Host {
    /// Currently held modifiers (`get_mods`)
    fn mods(&self) -> ModifierSnapshot;

    /// Replace the held modifier state (`set_mods` / `register_mods`)
    fn set_mods(&mut self, mods: ModifierSnapshot);

    /// Press and release a single key (`tap_code`)
    fn tap(&mut self, key: Key);

    /// Press and release a key with exactly the combo's modifiers (`tap_code16`)
    fn tap_combo(&mut self, combo: &Combo);

    /// Emit a combo, using the plain tap when it carries no modifiers
    fn emit(&mut self, combo: &Combo) {
        if combo.is_bare() {
            self.tap(combo.key());
        } else {
            self.tap_combo(combo);
        }
    }
}

/// Temporarily clears modifiers on a host and restores them when dropped.
///
/// The saved state is restored on every exit path, including unwinding.
pub struct ModifierOverride<'a, H: Host> {
    host: &'a mut H,
    saved: ModifierSnapshot,
}

impl<'a, H: Host> ModifierOverride<'a, H> {
    /// Clear `suppress` from the host's modifiers until the guard is dropped
    pub fn new(host: &'a mut H, suppress: ModifierSnapshot) -> Self {
        let saved = host.mods();
        if saved.intersects(suppress) {
            host.set_mods(saved.without(suppress));
        }
        Self { host, saved }
    }

    /// Modifier state that will be restored
    pub fn saved(&self) -> ModifierSnapshot {
        self.saved
    }
}

impl<H: Host> Deref for ModifierOverride<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: Host> DerefMut for ModifierOverride<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: Host> Drop for ModifierOverride<'_, H> {
    fn drop(&mut self) {
        if self.host.mods() != self.saved {
            self.host.set_mods(self.saved);
        }
    }
}
