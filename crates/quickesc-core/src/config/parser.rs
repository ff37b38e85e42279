// Quickesc Config Parser - TOML with Serde
// Parses configuration from TOML files

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::combo_parser::{parse_combo_string, parse_modifier_list, ComboParseError};
use crate::engine::QuickEsc;
use crate::resolver::{OverrideRule, OverrideTable};
use crate::tap::{TapConfig, TapPolicy, DEFAULT_TAPS, DEFAULT_TIMEOUT_MS};
use crate::timer::Tick;
use crate::{Combo, Key, Modifier, ModifierSnapshot};

/// Accepted range for `timeout_ms` and `tapping_term_ms`
pub const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u32> = 1..=60_000;

/// Accepted range for `taps`
pub const TAPS_RANGE: std::ops::RangeInclusive<u8> = 2..=16;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Invalid combo string: {0}")]
    InvalidCombo(String),

    #[error("Timeout value out of range: {0}")]
    TimeoutOutOfRange(String),

    #[error("Invalid tap count: {0}")]
    InvalidTapCount(String),
}

/// Root TOML table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub general: Option<GeneralConfig>,

    /// Tap timing settings
    #[serde(default)]
    pub tap: Option<TapToml>,

    /// Modifier override table
    #[serde(default)]
    pub overrides: Option<OverridesToml>,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Key name of the trigger
    pub trigger: Option<String>,
}

/// `[tap]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TapToml {
    pub timeout_ms: Option<u32>,
    pub policy: Option<PolicyToml>,
    /// Presses needed to latch (multi-tap only)
    pub taps: Option<u8>,
    /// Run window (multi-tap only); defaults to `timeout_ms`
    pub tapping_term_ms: Option<u32>,
    pub single_tap: Option<String>,
    pub repeat_tap: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyToml {
    Toggle,
    MultiTap,
}

/// `[overrides]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverridesToml {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `[[overrides.rule]]` entries, in priority order
    #[serde(default, rename = "rule")]
    pub rules: Vec<OverrideRuleToml>,
}

/// One `[[overrides.rule]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideRuleToml {
    pub name: String,
    /// Modifier aliases that must all be held
    pub when: Vec<String>,
    #[serde(default)]
    pub exact: bool,
    /// Modifier aliases cleared while emitting
    #[serde(default)]
    pub suppress: Vec<String>,
    /// Combo string to emit
    pub emit: String,
}

fn default_true() -> bool {
    true
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub trigger: Key,
    pub tap: TapConfig,
    /// Empty when overrides are disabled
    pub overrides: OverrideTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger: Key::ESC,
            tap: TapConfig::default(),
            overrides: OverrideTable::standard(),
        }
    }
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Build an engine for a counter of width `T`
    pub fn build_engine<T: Tick>(&self) -> QuickEsc<T> {
        QuickEsc::new(self.trigger, self.overrides.clone(), self.tap.clone())
    }
}

impl ConfigToml {
    /// Convert parsed TOML to the validated Config
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(general) = &self.general {
            if let Some(name) = &general.trigger {
                config.trigger = parse_key(name)?;
                if Modifier::is_key_modifier(config.trigger) {
                    log::warn!("trigger {} is a modifier key", config.trigger);
                }
            }
        }

        if let Some(tap) = &self.tap {
            config.tap = tap.to_tap_config()?;
        }

        if let Some(overrides) = &self.overrides {
            config.overrides = overrides.to_table()?;
        }

        log::debug!(
            "config: trigger={} timeout={}ms policy={:?} rules={}",
            config.trigger,
            config.tap.timeout_ms,
            config.tap.policy,
            config.overrides.len()
        );
        Ok(config)
    }
}

impl TapToml {
    fn to_tap_config(&self) -> Result<TapConfig, ConfigError> {
        let mut tap = TapConfig::default();

        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        check_timeout("tap.timeout_ms", timeout_ms)?;
        tap.timeout_ms = timeout_ms;

        match self.policy.unwrap_or(PolicyToml::Toggle) {
            PolicyToml::Toggle => {
                if self.taps.is_some() || self.tapping_term_ms.is_some() {
                    log::warn!("tap.taps and tap.tapping_term_ms only apply to policy \"multi-tap\"");
                }
            }
            PolicyToml::MultiTap => {
                let taps = self.taps.unwrap_or(DEFAULT_TAPS);
                if !TAPS_RANGE.contains(&taps) {
                    return Err(ConfigError::InvalidTapCount(format!(
                        "tap.taps must be {}-{}, got {}",
                        TAPS_RANGE.start(),
                        TAPS_RANGE.end(),
                        taps
                    )));
                }
                let tapping_term_ms = self.tapping_term_ms.unwrap_or(timeout_ms);
                check_timeout("tap.tapping_term_ms", tapping_term_ms)?;
                tap.policy = TapPolicy::MultiTap {
                    taps,
                    tapping_term_ms,
                };
            }
        }

        if let Some(s) = &self.single_tap {
            tap.single_tap = parse_combo("tap.single_tap", s)?;
        }
        if let Some(s) = &self.repeat_tap {
            tap.repeat_tap = parse_combo("tap.repeat_tap", s)?;
        }
        Ok(tap)
    }
}

impl OverridesToml {
    fn to_table(&self) -> Result<OverrideTable, ConfigError> {
        if !self.enabled {
            if !self.rules.is_empty() {
                log::warn!(
                    "overrides disabled; ignoring {} configured rule(s)",
                    self.rules.len()
                );
            }
            return Ok(OverrideTable::empty());
        }
        if self.rules.is_empty() {
            return Ok(OverrideTable::standard());
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for entry in &self.rules {
            if rules.iter().any(|r: &OverrideRule| r.name() == entry.name) {
                log::warn!("duplicate override rule name '{}'", entry.name);
            }
            rules.push(entry.to_rule()?);
        }
        Ok(OverrideTable::new(rules))
    }
}

impl OverrideRuleToml {
    fn to_rule(&self) -> Result<OverrideRule, ConfigError> {
        let required = parse_modifiers(&self.name, "when", &self.when)?;
        if required.is_empty() {
            return Err(ConfigError::InvalidModifier(format!(
                "rule '{}': 'when' needs at least one modifier",
                self.name
            )));
        }
        let suppress = parse_modifiers(&self.name, "suppress", &self.suppress)?;
        let emit = parse_combo(&format!("rule '{}' emit", self.name), &self.emit)?;

        Ok(OverrideRule::new(
            self.name.clone(),
            required,
            self.exact,
            ModifierSnapshot::of(&suppress),
            emit,
        ))
    }
}

fn check_timeout(field: &str, value: u32) -> Result<(), ConfigError> {
    if TIMEOUT_RANGE_MS.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::TimeoutOutOfRange(format!(
            "{} must be {}-{}ms, got {}",
            field,
            TIMEOUT_RANGE_MS.start(),
            TIMEOUT_RANGE_MS.end(),
            value
        )))
    }
}

/// Parse a key name into a Key
fn parse_key(name: &str) -> Result<Key, ConfigError> {
    let trimmed = name.trim();
    crate::key::key_from_name(trimmed).ok_or_else(|| ConfigError::InvalidKey(trimmed.to_string()))
}

fn parse_combo(field: &str, s: &str) -> Result<Combo, ConfigError> {
    parse_combo_string(s).map_err(|e| ConfigError::InvalidCombo(format!("{}: {}", field, e)))
}

fn parse_modifiers(
    rule: &str,
    field: &str,
    aliases: &[String],
) -> Result<smallvec::SmallVec<[Modifier; 4]>, ConfigError> {
    parse_modifier_list(aliases).map_err(|e| match e {
        ComboParseError::UnknownModifier(alias) => {
            ConfigError::InvalidModifier(format!("rule '{}' {}: '{}'", rule, field, alias))
        }
        other => ConfigError::InvalidModifier(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.trigger, Key::ESC);
        assert_eq!(config.tap.timeout_ms, 1000);
        assert_eq!(config.tap.policy, TapPolicy::Toggle);
        assert_eq!(config.overrides.len(), 4);
    }

    #[test]
    fn test_full_tap_section() {
        let config = Config::from_toml(
            r#"
            [general]
            trigger = "CAPSLOCK"

            [tap]
            timeout_ms = 300
            policy = "multi-tap"
            taps = 3
            single_tap = "ESC"
            repeat_tap = "Shift-GRAVE"
            "#,
        )
        .unwrap();

        assert_eq!(config.trigger, Key::CAPSLOCK);
        assert_eq!(config.tap.timeout_ms, 300);
        assert_eq!(
            config.tap.policy,
            TapPolicy::MultiTap {
                taps: 3,
                tapping_term_ms: 300
            }
        );
        assert_eq!(
            config.tap.repeat_tap,
            Combo::new([Modifier::Shift], Key::GRAVE)
        );
    }

    #[test]
    fn test_explicit_tapping_term() {
        let config = Config::from_toml(
            r#"
            [tap]
            policy = "multi-tap"
            tapping_term_ms = 200
            "#,
        )
        .unwrap();
        assert_eq!(config.tap.policy, TapPolicy::multi_tap(2, 200));
    }

    #[test]
    fn test_timeout_out_of_range() {
        for bad in ["0", "60001"] {
            let toml = format!("[tap]\ntimeout_ms = {}\n", bad);
            assert!(matches!(
                Config::from_toml(&toml),
                Err(ConfigError::TimeoutOutOfRange(_))
            ));
        }
        let ok = Config::from_toml("[tap]\ntimeout_ms = 60000\n").unwrap();
        assert_eq!(ok.tap.timeout_ms, 60_000);
    }

    #[test]
    fn test_invalid_tap_count() {
        let result = Config::from_toml("[tap]\npolicy = \"multi-tap\"\ntaps = 1\n");
        assert!(matches!(result, Err(ConfigError::InvalidTapCount(_))));
        let result = Config::from_toml("[tap]\npolicy = \"multi-tap\"\ntaps = 17\n");
        assert!(matches!(result, Err(ConfigError::InvalidTapCount(_))));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(matches!(
            Config::from_toml("[tap]\ntimeout = 100\n"),
            Err(ConfigError::TomlParse(_))
        ));
        assert!(matches!(
            Config::from_toml("[keymap]\n"),
            Err(ConfigError::TomlParse(_))
        ));
        assert!(matches!(
            Config::from_toml("[tap]\npolicy = \"double\"\n"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_invalid_trigger() {
        let result = Config::from_toml("[general]\ntrigger = \"NOPE\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidKey(name)) if name == "NOPE"));
    }

    #[test]
    fn test_invalid_combo() {
        let result = Config::from_toml("[tap]\nrepeat_tap = \"Hyper-GRAVE\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidCombo(_))));
    }

    #[test]
    fn test_overrides_disabled() {
        let config = Config::from_toml("[overrides]\nenabled = false\n").unwrap();
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn test_custom_override_rules() {
        let config = Config::from_toml(
            r#"
            [[overrides.rule]]
            name = "ctrl-tilde"
            when = ["Ctrl"]
            exact = true
            suppress = ["Ctrl"]
            emit = "Shift-GRAVE"

            [[overrides.rule]]
            name = "hyper"
            when = ["Ctrl", "Alt"]
            emit = "F13"
            "#,
        )
        .unwrap();

        let rules = config.overrides.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "ctrl-tilde");
        assert!(rules[0].is_exact());
        assert_eq!(rules[0].suppress(), Modifier::Control.mask());
        assert!(!rules[1].is_exact());
        assert_eq!(rules[1].emit(), &Combo::key_only(Key::F13));

        let resolved = config
            .overrides
            .resolve(ModifierSnapshot::of(&[Modifier::RControl]))
            .map(|r| r.name());
        assert_eq!(resolved, Some("ctrl-tilde"));
    }

    #[test]
    fn test_rule_errors() {
        let empty_when = r#"
            [[overrides.rule]]
            name = "none"
            when = []
            emit = "GRAVE"
        "#;
        assert!(matches!(
            Config::from_toml(empty_when),
            Err(ConfigError::InvalidModifier(_))
        ));

        let bad_alias = r#"
            [[overrides.rule]]
            name = "bad"
            when = ["Hyper"]
            emit = "GRAVE"
        "#;
        match Config::from_toml(bad_alias) {
            Err(ConfigError::InvalidModifier(msg)) => assert!(msg.contains("Hyper")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_build_engine() {
        let config = Config::from_toml("[general]\ntrigger = \"F13\"\n").unwrap();
        let engine = config.build_engine::<u16>();
        assert_eq!(engine.trigger(), Key::F13);
        assert_eq!(engine.overrides().len(), 4);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_toml_path("/nonexistent/quickesc.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
