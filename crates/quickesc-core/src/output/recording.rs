// Quickesc Recording Host
// In-memory host used by the simulator and tests; logs every emission and the
// low-level key reports a USB stack would see

use super::combo::calculate_combo_actions;
use super::host::Host;
use super::state::PressedKeyState;
use crate::{Action, Combo, Key, ModifierSnapshot};

/// A call the core made into the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Modifier state replaced
    SetMods(ModifierSnapshot),
    /// Bare key tap
    Tap(Key),
    /// Chorded combo tap
    TapCombo(Combo),
}

/// A single low-level key report
pub type KeyReport = (Key, Action);

/// Host that records calls instead of talking to hardware
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    mods: ModifierSnapshot,
    events: Vec<HostEvent>,
    reports: Vec<KeyReport>,
    pressed: PressedKeyState,
}

impl RecordingHost {
    /// Create a host with no modifiers held
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host with `mods` physically held
    pub fn with_mods(mods: ModifierSnapshot) -> Self {
        let mut host = Self::new();
        for key in mods.keys() {
            host.pressed.add(key);
        }
        host.mods = mods;
        host
    }

    /// Simulate the user pressing or releasing modifiers (not recorded as an event)
    pub fn hold_mods(&mut self, mods: ModifierSnapshot) {
        self.apply_mods(mods);
    }

    /// Every call made so far
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Low-level reports emitted so far
    pub fn reports(&self) -> &[KeyReport] {
        &self.reports
    }

    /// Only the taps and combos, as combos
    pub fn emissions(&self) -> Vec<Combo> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Tap(key) => Some(Combo::key_only(*key)),
                HostEvent::TapCombo(combo) => Some(combo.clone()),
                HostEvent::SetMods(_) => None,
            })
            .collect()
    }

    /// Keys currently down on the output
    pub fn pressed_keys(&self) -> &[Key] {
        self.pressed.get_all()
    }

    /// Drop the recorded history, keeping the held state
    pub fn clear_log(&mut self) {
        self.events.clear();
        self.reports.clear();
    }

    /// Release everything still held on the output
    pub fn release_all(&mut self) {
        for key in self.pressed.drain() {
            self.reports.push((key, Action::Release));
        }
        self.mods = ModifierSnapshot::EMPTY;
    }

    fn press(&mut self, key: Key) {
        if self.pressed.add(key) {
            self.reports.push((key, Action::Press));
        }
    }

    fn release(&mut self, key: Key) {
        if self.pressed.remove(key) {
            self.reports.push((key, Action::Release));
        }
    }

    fn apply_mods(&mut self, mods: ModifierSnapshot) {
        let before = self.mods.keys();
        let after = mods.keys();
        for key in before.iter().rev().filter(|k| !after.contains(*k)) {
            self.release(*key);
        }
        for key in after.iter().filter(|k| !before.contains(*k)) {
            self.press(*key);
        }
        self.mods = mods;
    }
}

impl Host for RecordingHost {
    fn mods(&self) -> ModifierSnapshot {
        self.mods
    }

    fn set_mods(&mut self, mods: ModifierSnapshot) {
        log::trace!("host set_mods {} -> {}", self.mods, mods);
        self.events.push(HostEvent::SetMods(mods));
        self.apply_mods(mods);
    }

    fn tap(&mut self, key: Key) {
        log::trace!("host tap {}", key);
        self.events.push(HostEvent::Tap(key));
        self.press(key);
        self.release(key);
    }

    fn tap_combo(&mut self, combo: &Combo) {
        log::trace!("host tap_combo {}", combo);
        self.events.push(HostEvent::TapCombo(combo.clone()));

        let sequence = calculate_combo_actions(combo, self.mods);
        for key in &sequence.modifiers_to_release {
            self.release(*key);
        }
        for key in &sequence.modifiers_to_press {
            self.press(*key);
        }
        self.press(sequence.main_key);
        self.release(sequence.main_key);
        for key in sequence.modifiers_to_press.iter().rev() {
            self.release(*key);
        }
        for key in &sequence.modifiers_to_restore {
            self.press(*key);
        }
    }
}
