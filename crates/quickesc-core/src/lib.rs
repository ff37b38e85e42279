// Quickesc Core Library
// Tap/hold disambiguation for a single quick-escape key

pub mod action;
pub mod combo;
pub mod config;
pub mod engine;
pub mod key;
pub mod modifier;
pub mod output;
pub mod resolver;
pub mod tap;
pub mod timer;
pub mod trace;

pub use action::Action;
pub use combo::Combo;
pub use config::{parse_combo_string, ComboParseError, Config, ConfigError};
pub use engine::{Emission, EmissionSource, ProcessResult, QuickEsc};
pub use key::Key;
pub use modifier::{Modifier, ModifierSnapshot};
pub use output::{
    calculate_combo_actions, ComboActionSequence, Host, HostEvent, ModifierOverride,
    PressedKeyState, RecordingHost,
};
pub use resolver::{OverrideRule, OverrideTable};
pub use tap::{TapConfig, TapDecision, TapMachine, TapMode, TapPolicy, TapState};
pub use timer::{Clock, ManualClock, Tick};
pub use trace::{parse_trace, replay, ReplayStep, TraceError, TraceEvent};
