// Quickesc Config - Combo String Parser
// Parses combo strings like "Cmd-Shift-GRAVE" and modifier lists

use smallvec::SmallVec;

use crate::{Combo, Modifier};

/// Errors that can occur during combo parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboParseError {
    #[error("combo string cannot be empty")]
    EmptyInput,

    #[error("unknown key name: '{0}'")]
    UnknownKey(String),

    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),

    #[error("combo string cannot end with hyphen")]
    TrailingHyphen,
}

/// Parse a combo string like "Cmd-Shift-GRAVE".
///
/// The last hyphen-separated part is the key (case-insensitive); everything
/// before it is a modifier alias (case-sensitive). Repeated modifiers collapse.
///
/// ```
/// use quickesc_core::config::parse_combo_string;
/// use quickesc_core::{Key, Modifier};
/// let combo = parse_combo_string("Alt-grave").unwrap();
/// assert_eq!(combo.modifiers(), &[Modifier::Alt]);
/// assert_eq!(combo.key(), Key::GRAVE);
/// ```
pub fn parse_combo_string(exp: &str) -> Result<Combo, ComboParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(ComboParseError::EmptyInput);
    }
    if trimmed.ends_with('-') {
        return Err(ComboParseError::TrailingHyphen);
    }

    let mut parts: SmallVec<[&str; 5]> = trimmed.split('-').collect();
    let key_str = parts.pop().unwrap_or_default();
    let key = crate::key::key_from_name(key_str)
        .ok_or_else(|| ComboParseError::UnknownKey(key_str.to_string()))?;

    let modifiers = parse_modifier_list(&parts)?;
    Ok(Combo::new(modifiers, key))
}

/// Parse modifier aliases ("Shift", "Cmd", "LAlt", ...), dropping repeats
pub fn parse_modifier_list<S: AsRef<str>>(
    aliases: &[S],
) -> Result<SmallVec<[Modifier; 4]>, ComboParseError> {
    let mut modifiers: SmallVec<[Modifier; 4]> = SmallVec::new();
    for alias in aliases {
        let alias = alias.as_ref().trim();
        let modifier = Modifier::from_alias(alias)
            .ok_or_else(|| ComboParseError::UnknownModifier(alias.to_string()))?;
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    Ok(modifiers)
}
