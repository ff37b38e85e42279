// Quickesc Output Layer
// Host boundary, modifier scoping and combo emission

mod combo;
mod host;
mod recording;
mod state;

pub use combo::{calculate_combo_actions, ComboActionSequence};
pub use host::{Host, ModifierOverride};
pub use recording::{HostEvent, KeyReport, RecordingHost};
pub use state::PressedKeyState;
