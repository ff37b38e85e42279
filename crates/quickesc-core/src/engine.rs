// Quickesc Engine
// Per-event dispatch for the trigger key: override check, then tap timing

use std::fmt;

use crate::output::Host;
use crate::resolver::OverrideTable;
use crate::tap::{TapConfig, TapDecision, TapMachine, TapMode};
use crate::timer::{Clock, Tick};
use crate::{Action, Combo, Key};

/// Where an emission came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionSource {
    /// A modifier override rule, by name
    Override(String),
    /// The tap timing machine
    Tap(TapDecision),
}

impl fmt::Display for EmissionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmissionSource::Override(name) => write!(f, "override {}", name),
            EmissionSource::Tap(decision) => write!(f, "{}", decision),
        }
    }
}

/// One synthetic key action sent to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub source: EmissionSource,
    pub combo: Combo,
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.combo, self.source)
    }
}

/// Outcome of feeding one key event to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// Not the trigger key; the caller keeps processing it
    Passthrough,
    /// Trigger event consumed, with the emission it produced if any
    Handled(Option<Emission>),
}

impl ProcessResult {
    /// Whether default processing should continue for this event
    pub fn continue_processing(&self) -> bool {
        matches!(self, ProcessResult::Passthrough)
    }

    pub fn emission(&self) -> Option<&Emission> {
        match self {
            ProcessResult::Handled(Some(emission)) => Some(emission),
            _ => None,
        }
    }
}

/// The quick-escape key: one trigger that resolves to Escape, grave, tilde or
/// a Command chord depending on held modifiers and press timing.
#[derive(Debug, Clone)]
pub struct QuickEsc<T: Tick> {
    trigger: Key,
    overrides: OverrideTable,
    tap: TapMachine<T>,
}

impl<T: Tick> QuickEsc<T> {
    pub fn new(trigger: Key, overrides: OverrideTable, tap: TapConfig) -> Self {
        Self {
            trigger,
            overrides,
            tap: TapMachine::new(tap),
        }
    }

    pub fn trigger(&self) -> Key {
        self.trigger
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn tap(&self) -> &TapMachine<T> {
        &self.tap
    }

    pub fn mode(&self) -> TapMode {
        self.tap.mode()
    }

    /// Reset timing state, e.g. after the keyboard resumes from suspend
    pub fn clear(&mut self) {
        self.tap.clear();
    }

    /// Process one key transition.
    ///
    /// Events for other keys pass through untouched. Every trigger event is
    /// handled; only presses emit. The clock is read only when the press
    /// reaches the tap machine.
    pub fn process_event<H, C>(
        &mut self,
        key: Key,
        action: Action,
        host: &mut H,
        clock: &C,
    ) -> ProcessResult
    where
        H: Host,
        C: Clock<Tick = T>,
    {
        if key != self.trigger {
            return ProcessResult::Passthrough;
        }
        if !action.just_pressed() {
            log::trace!("trigger {} ignored", action);
            return ProcessResult::Handled(None);
        }

        let mods = host.mods();
        if let Some(rule) = self.overrides.resolve(mods) {
            log::debug!("mods {} matched override {}", mods, rule.name());
            rule.apply(host);
            return ProcessResult::Handled(Some(Emission {
                source: EmissionSource::Override(rule.name().to_string()),
                combo: rule.emit().clone(),
            }));
        }

        let decision = self.tap.on_press(clock.now());
        let combo = self.tap.combo_for(decision).clone();
        host.emit(&combo);
        ProcessResult::Handled(Some(Emission {
            source: EmissionSource::Tap(decision),
            combo,
        }))
    }
}

impl<T: Tick> Default for QuickEsc<T> {
    fn default() -> Self {
        Self::new(Key::ESC, OverrideTable::standard(), TapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{HostEvent, RecordingHost};
    use crate::timer::ManualClock;
    use crate::{Modifier, ModifierSnapshot};

    fn press(
        engine: &mut QuickEsc<u32>,
        host: &mut RecordingHost,
        clock: &ManualClock<u32>,
    ) -> ProcessResult {
        engine.process_event(Key::ESC, Action::Press, host, clock)
    }

    #[test]
    fn test_other_keys_pass_through() {
        let mut engine = QuickEsc::<u32>::default();
        let mut host = RecordingHost::new();
        let clock = ManualClock::new(0);

        let result = engine.process_event(Key::A, Action::Press, &mut host, &clock);
        assert_eq!(result, ProcessResult::Passthrough);
        assert!(result.continue_processing());
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_release_and_repeat_are_swallowed() {
        let mut engine = QuickEsc::<u32>::default();
        let mut host = RecordingHost::new();
        let clock = ManualClock::new(0);

        for action in [Action::Release, Action::Repeat] {
            let result = engine.process_event(Key::ESC, action, &mut host, &clock);
            assert_eq!(result, ProcessResult::Handled(None));
            assert!(!result.continue_processing());
        }
        assert!(host.events().is_empty());
        assert_eq!(engine.tap().state().last_event, None);
    }

    #[test]
    fn test_double_tap_emits_escape_then_grave() {
        let mut engine = QuickEsc::<u32>::default();
        let mut host = RecordingHost::new();
        let clock = ManualClock::new(0);

        let first = press(&mut engine, &mut host, &clock);
        clock.advance(200);
        let second = press(&mut engine, &mut host, &clock);

        assert_eq!(
            first.emission().map(|e| e.source.clone()),
            Some(EmissionSource::Tap(TapDecision::Single))
        );
        assert_eq!(
            second.emission().map(|e| e.source.clone()),
            Some(EmissionSource::Tap(TapDecision::Repeat))
        );
        assert_eq!(
            host.events(),
            &[HostEvent::Tap(Key::ESC), HostEvent::Tap(Key::GRAVE)]
        );
        assert_eq!(engine.mode(), TapMode::GraveLatched);
    }

    #[test]
    fn test_override_leaves_tap_state_untouched() {
        let mut engine = QuickEsc::<u32>::default();
        let mut host = RecordingHost::new();
        let clock = ManualClock::new(0);

        press(&mut engine, &mut host, &clock);
        clock.advance(100);
        press(&mut engine, &mut host, &clock);
        let state_before = *engine.tap().state();

        host.hold_mods(ModifierSnapshot::of(&[Modifier::LMeta, Modifier::LShift]));
        clock.advance(100);
        let result = press(&mut engine, &mut host, &clock);

        assert_eq!(
            result.emission().map(|e| e.combo.clone()),
            Some(Combo::new([Modifier::Meta, Modifier::Shift], Key::GRAVE))
        );
        assert_eq!(*engine.tap().state(), state_before);
    }

    #[test]
    fn test_unmatched_modifier_reaches_tap_machine() {
        let mut engine = QuickEsc::<u32>::default();
        let mut host = RecordingHost::with_mods(Modifier::LControl.mask());
        let clock = ManualClock::new(0);

        let result = press(&mut engine, &mut host, &clock);
        assert_eq!(
            result.emission().map(|e| e.combo.clone()),
            Some(Combo::key_only(Key::ESC))
        );
        // Ctrl stays held, so the host sees Ctrl+Esc
        assert_eq!(host.mods(), Modifier::LControl.mask());
    }

    #[test]
    fn test_disabled_overrides() {
        let mut engine = QuickEsc::<u32>::new(
            Key::ESC,
            OverrideTable::empty(),
            TapConfig::default(),
        );
        let mut host = RecordingHost::with_mods(Modifier::LShift.mask());
        let clock = ManualClock::new(0);

        press(&mut engine, &mut host, &clock);
        assert_eq!(host.events(), &[HostEvent::Tap(Key::ESC)]);
    }

    #[test]
    fn test_custom_trigger() {
        let mut engine =
            QuickEsc::<u16>::new(Key::CAPSLOCK, OverrideTable::standard(), TapConfig::default());
        let mut host = RecordingHost::new();
        let clock = ManualClock::new(0);

        let esc = engine.process_event(Key::ESC, Action::Press, &mut host, &clock);
        assert!(esc.continue_processing());
        let caps = engine.process_event(Key::CAPSLOCK, Action::Press, &mut host, &clock);
        assert_eq!(caps.emission().map(|e| e.combo.key()), Some(Key::ESC));
    }

    #[test]
    fn test_clear_forgets_latch() {
        let mut engine = QuickEsc::<u32>::default();
        let mut host = RecordingHost::new();
        let clock = ManualClock::new(0);

        press(&mut engine, &mut host, &clock);
        clock.advance(10);
        press(&mut engine, &mut host, &clock);
        engine.clear();
        clock.advance(10);

        let result = press(&mut engine, &mut host, &clock);
        assert_eq!(
            result.emission().map(|e| e.source.clone()),
            Some(EmissionSource::Tap(TapDecision::Single))
        );
    }

    #[test]
    fn test_emission_display() {
        let emission = Emission {
            source: EmissionSource::Override("cmd-grave".into()),
            combo: Combo::new([Modifier::Meta], Key::GRAVE),
        };
        assert_eq!(emission.to_string(), "Cmd-GRAVE (override cmd-grave)");
    }
}
