// Quickesc Event Traces
// Line-based key event traces and their replay through the engine
//
// One event per line:
//
//     <ms> press|release|repeat [key=NAME] [mods=Shift+Cmd]
//
// `key` defaults to the engine's trigger, `mods` to none. `#` starts a comment.

use std::fmt;

use crate::engine::{ProcessResult, QuickEsc};
use crate::output::{Host, RecordingHost};
use crate::timer::{ManualClock, Tick};
use crate::{Action, Key, ModifierSnapshot};

/// Errors while reading a trace
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("line {line}: invalid timestamp '{value}'")]
    InvalidTime { line: usize, value: String },

    #[error("line {line}: missing action")]
    MissingAction { line: usize },

    #[error("line {line}: unknown action '{value}'")]
    InvalidAction { line: usize, value: String },

    #[error("line {line}: unknown key '{value}'")]
    InvalidKey { line: usize, value: String },

    #[error("line {line}: invalid modifiers '{value}'")]
    InvalidModifiers { line: usize, value: String },

    #[error("line {line}: unexpected field '{value}'")]
    UnexpectedField { line: usize, value: String },

    #[error("line {line}: timestamp {time} is earlier than {previous}")]
    OutOfOrder { line: usize, time: u64, previous: u64 },
}

/// One key transition in a trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Absolute time in milliseconds
    pub time_ms: u64,
    pub action: Action,
    /// `None` means the trigger key
    pub key: Option<Key>,
    /// Modifiers held while the event happens
    pub mods: ModifierSnapshot,
}

impl TraceEvent {
    /// A trigger press with no modifiers
    pub fn press(time_ms: u64) -> Self {
        Self {
            time_ms,
            action: Action::Press,
            key: None,
            mods: ModifierSnapshot::EMPTY,
        }
    }

    /// A trigger release with no modifiers
    pub fn release(time_ms: u64) -> Self {
        Self {
            action: Action::Release,
            ..Self::press(time_ms)
        }
    }

    pub fn with_mods(mut self, mods: ModifierSnapshot) -> Self {
        self.mods = mods;
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time_ms, self.action)?;
        if let Some(key) = self.key {
            write!(f, " key={}", key)?;
        }
        if !self.mods.is_empty() {
            write!(f, " mods={}", self.mods)?;
        }
        Ok(())
    }
}

/// Parse a whole trace
pub fn parse_trace(input: &str) -> Result<Vec<TraceEvent>, TraceError> {
    let mut events: Vec<TraceEvent> = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let Some(event) = parse_line(line, raw)? else {
            continue;
        };
        if let Some(previous) = events.last() {
            if event.time_ms < previous.time_ms {
                return Err(TraceError::OutOfOrder {
                    line,
                    time: event.time_ms,
                    previous: previous.time_ms,
                });
            }
        }
        events.push(event);
    }
    log::debug!("parsed {} trace events", events.len());
    Ok(events)
}

fn parse_line(line: usize, raw: &str) -> Result<Option<TraceEvent>, TraceError> {
    let content = raw.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(None);
    }

    let mut fields = content.split_whitespace();
    let time_str = fields.next().unwrap_or_default();
    let time_ms = time_str.parse::<u64>().map_err(|_| TraceError::InvalidTime {
        line,
        value: time_str.to_string(),
    })?;

    let action_str = fields.next().ok_or(TraceError::MissingAction { line })?;
    let action = Action::from_name(action_str).ok_or_else(|| TraceError::InvalidAction {
        line,
        value: action_str.to_string(),
    })?;

    let mut event = TraceEvent {
        time_ms,
        action,
        key: None,
        mods: ModifierSnapshot::EMPTY,
    };
    for field in fields {
        match field.split_once('=') {
            Some(("key", name)) => {
                let key = crate::key::key_from_name(name).ok_or_else(|| TraceError::InvalidKey {
                    line,
                    value: name.to_string(),
                })?;
                event.key = Some(key);
            }
            Some(("mods", list)) => {
                event.mods =
                    ModifierSnapshot::parse(list).ok_or_else(|| TraceError::InvalidModifiers {
                        line,
                        value: list.to_string(),
                    })?;
            }
            _ => {
                return Err(TraceError::UnexpectedField {
                    line,
                    value: field.to_string(),
                })
            }
        }
    }
    Ok(Some(event))
}

/// One replayed event and what the engine did with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub event: TraceEvent,
    pub result: ProcessResult,
}

/// Drive `engine` through `events` on a manual clock.
///
/// Each event first sets the host's held modifiers to the event's `mods`,
/// then moves the clock to the event time. The clock starts at the first
/// event's time, truncated to the counter width of `T`.
pub fn replay<T: Tick>(
    engine: &mut QuickEsc<T>,
    events: &[TraceEvent],
    host: &mut RecordingHost,
) -> Vec<ReplayStep> {
    let start = events.first().map(|e| e.time_ms).unwrap_or_default();
    let clock = ManualClock::<T>::at_millis(start);

    events
        .iter()
        .map(|event| {
            if host.mods() != event.mods {
                host.hold_mods(event.mods);
            }
            clock.set_millis(event.time_ms);
            let key = event.key.unwrap_or(engine.trigger());
            let result = engine.process_event(key, event.action, host, &clock);
            if let Some(emission) = result.emission() {
                log::info!("{:>8}ms {}", event.time_ms, emission);
            }
            ReplayStep {
                event: event.clone(),
                result,
            }
        })
        .collect()
}
