// Quickesc Modifier System
// Modifier identities (Shift, Ctrl, Alt, Meta) and the held-modifier bitset

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use smallvec::SmallVec;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::Key;

/// A keyboard modifier, either side-specific (`LShift`) or generic (`Shift`).
///
/// A generic modifier is satisfied by either of its side-specific keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Modifier {
    Control,
    LControl,
    RControl,
    Shift,
    LShift,
    RShift,
    Alt,
    LAlt,
    RAlt,
    Meta,
    LMeta,
    RMeta,
}

impl Modifier {
    /// Canonical registry name
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Control => "CONTROL",
            Modifier::LControl => "L_CONTROL",
            Modifier::RControl => "R_CONTROL",
            Modifier::Shift => "SHIFT",
            Modifier::LShift => "L_SHIFT",
            Modifier::RShift => "R_SHIFT",
            Modifier::Alt => "ALT",
            Modifier::LAlt => "L_ALT",
            Modifier::RAlt => "R_ALT",
            Modifier::Meta => "META",
            Modifier::LMeta => "L_META",
            Modifier::RMeta => "R_META",
        }
    }

    /// Accepted spellings in config files and combo strings; the first is primary
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Modifier::Control => &["Ctrl", "C", "Control"],
            Modifier::LControl => &["LCtrl", "LC"],
            Modifier::RControl => &["RCtrl", "RC"],
            Modifier::Shift => &["Shift", "S"],
            Modifier::LShift => &["LShift"],
            Modifier::RShift => &["RShift"],
            Modifier::Alt => &["Alt", "A", "Opt", "Option"],
            Modifier::LAlt => &["LAlt", "LA", "LOpt", "LOption"],
            Modifier::RAlt => &["RAlt", "RA", "ROpt", "ROption"],
            Modifier::Meta => &["Cmd", "Command", "Gui", "Super", "Win", "Meta", "G"],
            Modifier::LMeta => &["LCmd", "LCommand", "LGui", "LSuper", "LWin", "LMeta"],
            Modifier::RMeta => &["RCmd", "RCommand", "RGui", "RSuper", "RWin", "RMeta"],
        }
    }

    /// Get the first alias (string representation)
    pub fn primary_alias(self) -> &'static str {
        self.aliases()[0]
    }

    /// Bits of the HID modifier byte this modifier covers
    pub fn mask(self) -> ModifierSnapshot {
        let bits = match self {
            Modifier::LControl => 0x01,
            Modifier::LShift => 0x02,
            Modifier::LAlt => 0x04,
            Modifier::LMeta => 0x08,
            Modifier::RControl => 0x10,
            Modifier::RShift => 0x20,
            Modifier::RAlt => 0x40,
            Modifier::RMeta => 0x80,
            Modifier::Control => 0x11,
            Modifier::Shift => 0x22,
            Modifier::Alt => 0x44,
            Modifier::Meta => 0x88,
        };
        ModifierSnapshot(bits)
    }

    /// Physical keys that represent this modifier
    pub fn keys(self) -> &'static [Key] {
        match self {
            Modifier::Control => &[Key::LEFT_CTRL, Key::RIGHT_CTRL],
            Modifier::LControl => &[Key::LEFT_CTRL],
            Modifier::RControl => &[Key::RIGHT_CTRL],
            Modifier::Shift => &[Key::LEFT_SHIFT, Key::RIGHT_SHIFT],
            Modifier::LShift => &[Key::LEFT_SHIFT],
            Modifier::RShift => &[Key::RIGHT_SHIFT],
            Modifier::Alt => &[Key::LEFT_ALT, Key::RIGHT_ALT],
            Modifier::LAlt => &[Key::LEFT_ALT],
            Modifier::RAlt => &[Key::RIGHT_ALT],
            Modifier::Meta => &[Key::LEFT_META, Key::RIGHT_META],
            Modifier::LMeta => &[Key::LEFT_META],
            Modifier::RMeta => &[Key::RIGHT_META],
        }
    }

    /// The key pressed when this modifier has to be synthesized
    pub fn key(self) -> Key {
        self.keys()[0]
    }

    /// Check if this is a side-specific modifier (single key)
    pub fn is_specific(self) -> bool {
        self.keys().len() == 1
    }

    /// Side-specific modifier for a physical modifier key
    pub fn from_key(key: Key) -> Option<Modifier> {
        Modifier::iter().find(|m| m.is_specific() && m.key() == key)
    }

    /// Check if a key is a modifier key
    pub fn is_key_modifier(key: Key) -> bool {
        Self::from_key(key).is_some()
    }

    /// Get modifier by canonical name
    pub fn from_name(name: &str) -> Option<Modifier> {
        Modifier::iter().find(|m| m.name() == name)
    }

    /// Get modifier by alias (case-sensitive) or canonical name
    pub fn from_alias(alias: &str) -> Option<Modifier> {
        if let Some(m) = Self::from_name(alias) {
            return Some(m);
        }
        Modifier::iter().find(|m| m.aliases().contains(&alias))
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary_alias())
    }
}

/// Held modifiers sampled from the host, as a HID modifier byte.
///
/// bit0 LCtrl, bit1 LShift, bit2 LAlt, bit3 LMeta,
/// bit4 RCtrl, bit5 RShift, bit6 RAlt, bit7 RMeta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierSnapshot(u8);

impl ModifierSnapshot {
    /// No modifiers held
    pub const EMPTY: ModifierSnapshot = ModifierSnapshot(0);

    /// Build a snapshot from a raw modifier byte
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw modifier byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of the masks of the given modifiers
    pub fn of(modifiers: &[Modifier]) -> Self {
        modifiers
            .iter()
            .fold(Self::EMPTY, |acc, m| acc | m.mask())
    }

    /// Snapshot of the given held physical keys; non-modifier keys are ignored
    pub fn from_keys(keys: &[Key]) -> Self {
        keys.iter()
            .filter_map(|k| Modifier::from_key(*k))
            .fold(Self::EMPTY, |acc, m| acc | m.mask())
    }

    /// True if any bit of `mask` is held
    pub fn intersects(self, mask: ModifierSnapshot) -> bool {
        self.0 & mask.0 != 0
    }

    /// True if `modifier` is held (either side for generic modifiers)
    pub fn holds(self, modifier: Modifier) -> bool {
        self.intersects(modifier.mask())
    }

    /// True if nothing outside `mask` is held
    pub fn is_within(self, mask: ModifierSnapshot) -> bool {
        self.0 & !mask.0 == 0
    }

    /// This snapshot with every bit of `mask` cleared
    pub fn without(self, mask: ModifierSnapshot) -> Self {
        Self(self.0 & !mask.0)
    }

    /// Side-specific modifiers currently held, in Ctrl/Shift/Alt/Meta order
    pub fn specific_modifiers(self) -> SmallVec<[Modifier; 8]> {
        Modifier::iter()
            .filter(|m| m.is_specific() && self.intersects(m.mask()))
            .collect()
    }

    /// Physical keys of the held modifiers
    pub fn keys(self) -> SmallVec<[Key; 8]> {
        self.specific_modifiers().iter().map(|m| m.key()).collect()
    }

    /// Generic modifiers covering this snapshot, for compact display
    pub fn generic_modifiers(self) -> SmallVec<[Modifier; 4]> {
        [Modifier::Control, Modifier::Shift, Modifier::Alt, Modifier::Meta]
            .into_iter()
            .filter(|m| self.holds(*m))
            .collect()
    }

    /// Parse "Shift+Cmd" style lists; "-" and "" mean no modifiers
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return Some(Self::EMPTY);
        }
        trimmed
            .split('+')
            .map(|part| Modifier::from_alias(part.trim()).map(Modifier::mask))
            .try_fold(Self::EMPTY, |acc, m| m.map(|m| acc | m))
    }
}

impl BitOr for ModifierSnapshot {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierSnapshot {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Modifier> for ModifierSnapshot {
    fn from(modifier: Modifier) -> Self {
        modifier.mask()
    }
}

impl fmt::Display for ModifierSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let parts: Vec<&str> = self
            .specific_modifiers()
            .iter()
            .map(|m| m.primary_alias())
            .collect();
        write!(f, "{}", parts.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_from_key() {
        assert_eq!(Modifier::from_key(Key::LEFT_CTRL), Some(Modifier::LControl));
        assert_eq!(Modifier::from_key(Key::RIGHT_META), Some(Modifier::RMeta));
        assert_eq!(Modifier::from_key(Key::A), None);
    }

    #[test]
    fn test_modifier_from_alias() {
        assert_eq!(Modifier::from_alias("Ctrl"), Some(Modifier::Control));
        assert_eq!(Modifier::from_alias("LCtrl"), Some(Modifier::LControl));
        assert_eq!(Modifier::from_alias("Cmd"), Some(Modifier::Meta));
        assert_eq!(Modifier::from_alias("Opt"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_alias("SHIFT"), Some(Modifier::Shift));
        // Aliases are case-sensitive
        assert_eq!(Modifier::from_alias("cmd"), None);
    }

    #[test]
    fn test_is_key_modifier() {
        assert!(Modifier::is_key_modifier(Key::LEFT_SHIFT));
        assert!(Modifier::is_key_modifier(Key::RIGHT_ALT));
        assert!(!Modifier::is_key_modifier(Key::GRAVE));
    }

    #[test]
    fn test_generic_mask_covers_both_sides() {
        let shift = Modifier::Shift.mask();
        assert!(ModifierSnapshot::from(Modifier::LShift).intersects(shift));
        assert!(ModifierSnapshot::from(Modifier::RShift).intersects(shift));
        assert!(!ModifierSnapshot::from(Modifier::LAlt).intersects(shift));
    }

    #[test]
    fn test_snapshot_is_within() {
        let shift = Modifier::Shift.mask();
        let lshift = ModifierSnapshot::from(Modifier::LShift);
        let both = lshift | Modifier::LControl.mask();

        assert!(lshift.is_within(shift));
        assert!(!both.is_within(shift));
        assert!(ModifierSnapshot::EMPTY.is_within(shift));
    }

    #[test]
    fn test_snapshot_without() {
        let held = ModifierSnapshot::of(&[Modifier::LShift, Modifier::RMeta]);
        let cleared = held.without(Modifier::Shift.mask());
        assert_eq!(cleared, Modifier::RMeta.mask());
    }

    #[test]
    fn test_snapshot_from_keys() {
        let held = ModifierSnapshot::from_keys(&[Key::LEFT_SHIFT, Key::A, Key::RIGHT_META]);
        assert_eq!(held.bits(), 0x02 | 0x80);
        assert_eq!(held.keys().as_slice(), &[Key::LEFT_SHIFT, Key::RIGHT_META]);
    }

    #[test]
    fn test_snapshot_parse() {
        assert_eq!(ModifierSnapshot::parse("-"), Some(ModifierSnapshot::EMPTY));
        assert_eq!(
            ModifierSnapshot::parse("LShift+RCmd"),
            Some(ModifierSnapshot::from_bits(0x02 | 0x80))
        );
        assert_eq!(ModifierSnapshot::parse("Shift"), Some(Modifier::Shift.mask()));
        assert_eq!(ModifierSnapshot::parse("Shift+Bogus"), None);
    }

    #[test]
    fn test_snapshot_display() {
        assert_eq!(ModifierSnapshot::EMPTY.to_string(), "-");
        let held = ModifierSnapshot::of(&[Modifier::LShift, Modifier::LMeta]);
        assert_eq!(held.to_string(), "LShift+LCmd");
    }
}
