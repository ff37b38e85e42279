// Quickesc Config API
// TOML configuration and combo string parsing

pub mod combo_parser;
pub mod parser;

pub use combo_parser::{parse_combo_string, parse_modifier_list, ComboParseError};
pub use parser::{
    Config, ConfigError, ConfigToml, GeneralConfig, OverrideRuleToml, OverridesToml, PolicyToml,
    TapToml, TAPS_RANGE, TIMEOUT_RANGE_MS,
};
