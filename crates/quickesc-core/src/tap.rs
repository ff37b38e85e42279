// Quickesc Tap Timing State Machine
// Decides between the single-tap and repeat-tap emissions from press timing

use std::fmt;

use crate::timer::Tick;
use crate::{Combo, Key};

/// Default window for the repeat tap, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// Default number of presses that latch under the multi-tap policy
pub const DEFAULT_TAPS: u8 = 2;

/// Top-level mode of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapMode {
    /// Presses emit the single tap unless they land inside the window
    #[default]
    Idle,
    /// Every press inside the window emits the repeat tap
    GraveLatched,
}

impl fmt::Display for TapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapMode::Idle => write!(f, "idle"),
            TapMode::GraveLatched => write!(f, "grave-latched"),
        }
    }
}

/// How presses in `Idle` are counted towards the latch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapPolicy {
    /// A second press inside the timeout latches
    #[default]
    Toggle,
    /// `taps` presses whose run started less than `tapping_term_ms` ago latch.
    /// Values of `taps` below 2 behave as 2.
    MultiTap { taps: u8, tapping_term_ms: u32 },
}

impl TapPolicy {
    /// Multi-tap policy whose tapping term equals `timeout_ms`
    pub fn multi_tap(taps: u8, timeout_ms: u32) -> Self {
        TapPolicy::MultiTap {
            taps,
            tapping_term_ms: timeout_ms,
        }
    }
}

/// What a press resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapDecision {
    /// Isolated press (Escape by default)
    Single,
    /// Rapid repeat (grave by default)
    Repeat,
}

impl fmt::Display for TapDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapDecision::Single => write!(f, "single-tap"),
            TapDecision::Repeat => write!(f, "repeat-tap"),
        }
    }
}

/// Tunables for [`TapMachine`]
#[derive(Debug, Clone, PartialEq)]
pub struct TapConfig {
    /// Window for the repeat tap and for staying latched
    pub timeout_ms: u32,
    pub policy: TapPolicy,
    /// Emitted for [`TapDecision::Single`]
    pub single_tap: Combo,
    /// Emitted for [`TapDecision::Repeat`]
    pub repeat_tap: Combo,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            policy: TapPolicy::Toggle,
            single_tap: Combo::key_only(Key::ESC),
            repeat_tap: Combo::key_only(Key::GRAVE),
        }
    }
}

/// Mutable state of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapState<T: Tick> {
    pub mode: TapMode,
    /// Last press that touched the window, if any
    pub last_event: Option<T>,
    /// Start of the current multi-tap run
    pub run_start: Option<T>,
    /// Presses in the current multi-tap run
    pub run_taps: u8,
}

impl<T: Tick> Default for TapState<T> {
    fn default() -> Self {
        Self {
            mode: TapMode::Idle,
            last_event: None,
            run_start: None,
            run_taps: 0,
        }
    }
}

impl<T: Tick> TapState<T> {
    /// True when `last_event` exists and `now` is strictly inside the window
    fn within(&self, now: T, window_ms: u32) -> bool {
        self.last_event
            .is_some_and(|last| now.elapsed_since(last) < window_ms)
    }
}

/// Press-timing state machine for the trigger key
#[derive(Debug, Clone)]
pub struct TapMachine<T: Tick> {
    config: TapConfig,
    state: TapState<T>,
}

impl<T: Tick> TapMachine<T> {
    pub fn new(config: TapConfig) -> Self {
        Self {
            config,
            state: TapState::default(),
        }
    }

    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    pub fn state(&self) -> &TapState<T> {
        &self.state
    }

    pub fn mode(&self) -> TapMode {
        self.state.mode
    }

    /// Combo configured for a decision
    pub fn combo_for(&self, decision: TapDecision) -> &Combo {
        match decision {
            TapDecision::Single => &self.config.single_tap,
            TapDecision::Repeat => &self.config.repeat_tap,
        }
    }

    /// Forget all timing history
    pub fn clear(&mut self) {
        self.state = TapState::default();
    }

    /// Feed a press of the trigger key observed at `now`
    pub fn on_press(&mut self, now: T) -> TapDecision {
        let decision = match self.state.mode {
            TapMode::GraveLatched => self.press_latched(now),
            TapMode::Idle => match self.config.policy {
                TapPolicy::Toggle => self.press_toggle(now),
                TapPolicy::MultiTap {
                    taps,
                    tapping_term_ms,
                } => self.press_multi_tap(now, taps.max(2), tapping_term_ms),
            },
        };
        log::debug!(
            "trigger press at {:?}: {} (mode {})",
            now,
            decision,
            self.state.mode
        );
        decision
    }

    fn press_latched(&mut self, now: T) -> TapDecision {
        let within = self.state.within(now, self.config.timeout_ms);
        self.state.last_event = Some(now);
        if within {
            return TapDecision::Repeat;
        }

        self.state.mode = TapMode::Idle;
        if matches!(self.config.policy, TapPolicy::MultiTap { .. }) {
            self.state.run_start = Some(now);
            self.state.run_taps = 1;
        }
        TapDecision::Single
    }

    fn press_toggle(&mut self, now: T) -> TapDecision {
        let within = self.state.within(now, self.config.timeout_ms);
        self.state.last_event = Some(now);
        if within {
            self.state.mode = TapMode::GraveLatched;
            TapDecision::Repeat
        } else {
            TapDecision::Single
        }
    }

    fn press_multi_tap(&mut self, now: T, taps: u8, tapping_term_ms: u32) -> TapDecision {
        let continuing = self
            .state
            .run_start
            .is_some_and(|start| now.elapsed_since(start) < tapping_term_ms);
        if continuing {
            self.state.run_taps = self.state.run_taps.saturating_add(1);
        } else {
            self.state.run_start = Some(now);
            self.state.run_taps = 1;
        }
        self.state.last_event = Some(now);

        if self.state.run_taps >= taps {
            self.state.mode = TapMode::GraveLatched;
            self.state.run_start = None;
            self.state.run_taps = 0;
            TapDecision::Repeat
        } else {
            TapDecision::Single
        }
    }
}

impl<T: Tick> Default for TapMachine<T> {
    fn default() -> Self {
        Self::new(TapConfig::default())
    }
}
