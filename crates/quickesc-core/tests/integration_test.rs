// Quickesc Integration Tests
//
// Configuration files driving the engine end to end.

use quickesc_core::output::RecordingHost;
use quickesc_core::{
    Action, Combo, Config, ConfigError, Key, ManualClock, Modifier, ModifierSnapshot, TapMode,
    TapPolicy,
};

const FULL_CONFIG: &str = r#"
# Quick-escape on Caps Lock with a triple-tap latch
[general]
trigger = "CAPSLOCK"

[tap]
timeout_ms = 500
policy = "multi-tap"
taps = 3
tapping_term_ms = 250
single_tap = "ESC"
repeat_tap = "GRAVE"

[overrides]
enabled = true

[[overrides.rule]]
name = "cmd-shift-grave"
when = ["Cmd", "Shift"]
emit = "Cmd-Shift-GRAVE"

[[overrides.rule]]
name = "ctrl-tilde"
when = ["Ctrl"]
exact = true
suppress = ["Ctrl"]
emit = "Shift-GRAVE"
"#;

#[test]
fn test_full_config_parses() {
    let config = Config::from_toml(FULL_CONFIG).unwrap();
    assert_eq!(config.trigger, Key::CAPSLOCK);
    assert_eq!(config.tap.timeout_ms, 500);
    assert_eq!(
        config.tap.policy,
        TapPolicy::MultiTap {
            taps: 3,
            tapping_term_ms: 250
        }
    );
    let names: Vec<&str> = config.overrides.rules().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["cmd-shift-grave", "ctrl-tilde"]);
}

#[test]
fn test_full_config_drives_engine() {
    let config = Config::from_toml(FULL_CONFIG).unwrap();
    let mut engine = config.build_engine::<u32>();
    let mut host = RecordingHost::new();
    let clock = ManualClock::<u32>::new(0);

    let mut press = |host: &mut RecordingHost| {
        engine
            .process_event(Key::CAPSLOCK, Action::Press, host, &clock)
            .emission()
            .map(|e| e.combo.clone())
    };

    // Two quick taps emit Escape, the third latches
    assert_eq!(press(&mut host), Some(Combo::key_only(Key::ESC)));
    clock.advance(100);
    assert_eq!(press(&mut host), Some(Combo::key_only(Key::ESC)));
    clock.advance(100);
    assert_eq!(press(&mut host), Some(Combo::key_only(Key::GRAVE)));

    // Ctrl alone now types a tilde; Alt has no rule and falls through
    host.hold_mods(Modifier::LControl.mask());
    assert_eq!(
        press(&mut host),
        Some(Combo::new([Modifier::Shift], Key::GRAVE))
    );
    host.hold_mods(Modifier::LAlt.mask());
    clock.advance(100);
    assert_eq!(press(&mut host), Some(Combo::key_only(Key::GRAVE)));
}

#[test]
fn test_real_escape_key_passes_through_with_custom_trigger() {
    let config = Config::from_toml(FULL_CONFIG).unwrap();
    let mut engine = config.build_engine::<u16>();
    let mut host = RecordingHost::new();
    let clock = ManualClock::<u16>::new(0);

    let result = engine.process_event(Key::ESC, Action::Press, &mut host, &clock);
    assert!(result.continue_processing());
    assert_eq!(engine.mode(), TapMode::Idle);
}

#[test]
fn test_disabled_overrides_use_tap_path() {
    let config = Config::from_toml("[overrides]\nenabled = false\n").unwrap();
    let mut engine = config.build_engine::<u32>();
    let mut host = RecordingHost::with_mods(ModifierSnapshot::of(&[
        Modifier::LMeta,
        Modifier::LShift,
    ]));
    let clock = ManualClock::<u32>::new(0);

    let result = engine.process_event(Key::ESC, Action::Press, &mut host, &clock);
    assert_eq!(
        result.emission().map(|e| e.combo.clone()),
        Some(Combo::key_only(Key::ESC))
    );
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("quickesc-test-{}.toml", std::process::id()));
    std::fs::write(&path, "[tap]\ntimeout_ms = 250\n").unwrap();

    let config = Config::from_toml_path(&path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.unwrap().tap.timeout_ms, 250);
}

#[test]
fn test_config_error_messages() {
    let err = Config::from_toml("[tap]\ntimeout_ms = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::TimeoutOutOfRange(_)));
    assert_eq!(
        err.to_string(),
        "Timeout value out of range: tap.timeout_ms must be 1-60000ms, got 0"
    );

    let err = Config::from_toml("[tap]\nsingle_tap = \"Cmd-\"\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid combo string: tap.single_tap: combo string cannot end with hyphen"
    );
}
