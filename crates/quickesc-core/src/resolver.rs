// Quickesc Modifier Override Resolver
// Stateless mapping from held modifiers to an alternate emission

use std::fmt;

use smallvec::SmallVec;

use crate::output::{Host, ModifierOverride};
use crate::{Combo, Key, Modifier, ModifierSnapshot};

/// One row of the override table
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRule {
    name: String,
    required: SmallVec<[Modifier; 4]>,
    exact: bool,
    suppress: ModifierSnapshot,
    emit: Combo,
}

impl OverrideRule {
    /// Create a rule.
    ///
    /// Every modifier in `required` must be held (either side for generic
    /// modifiers). With `exact`, nothing outside the required masks may be held.
    /// `suppress` is cleared on the host for the duration of the emission.
    pub fn new(
        name: impl Into<String>,
        required: impl IntoIterator<Item = Modifier>,
        exact: bool,
        suppress: ModifierSnapshot,
        emit: Combo,
    ) -> Self {
        Self {
            name: name.into(),
            required: required.into_iter().collect(),
            exact,
            suppress,
            emit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> &[Modifier] {
        &self.required
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn suppress(&self) -> ModifierSnapshot {
        self.suppress
    }

    pub fn emit(&self) -> &Combo {
        &self.emit
    }

    /// Check the rule against a modifier snapshot
    pub fn matches(&self, mods: ModifierSnapshot) -> bool {
        if self.required.is_empty() {
            return false;
        }
        if !self.required.iter().all(|m| mods.holds(*m)) {
            return false;
        }
        !self.exact || mods.is_within(ModifierSnapshot::of(&self.required))
    }

    /// Emit this rule's combo with the suppressed modifiers cleared
    pub fn apply<H: Host>(&self, host: &mut H) {
        let mut scoped = ModifierOverride::new(host, self.suppress);
        scoped.emit(&self.emit);
    }
}

impl fmt::Display for OverrideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when: Vec<&str> = self.required.iter().map(|m| m.primary_alias()).collect();
        write!(
            f,
            "{}: {}{} -> {}",
            self.name,
            when.join("+"),
            if self.exact { " (exact)" } else { "" },
            self.emit
        )
    }
}

/// Ordered override rules; the first match wins
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideTable {
    rules: Vec<OverrideRule>,
}

impl OverrideTable {
    /// Build a table from rules in priority order
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self { rules }
    }

    /// A table that never matches
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Cmd+Shift, then Shift alone, Alt alone, Cmd alone.
    ///
    /// Cmd+Shift is checked first and is not exact, so it also wins for
    /// chords that add Ctrl or Alt on top.
    pub fn standard() -> Self {
        Self::new(vec![
            OverrideRule::new(
                "cmd-shift-grave",
                [Modifier::Meta, Modifier::Shift],
                false,
                ModifierSnapshot::EMPTY,
                Combo::new([Modifier::Meta, Modifier::Shift], Key::GRAVE),
            ),
            OverrideRule::new(
                "shift-grave",
                [Modifier::Shift],
                true,
                Modifier::Shift.mask(),
                Combo::key_only(Key::GRAVE),
            ),
            OverrideRule::new(
                "alt-tilde",
                [Modifier::Alt],
                true,
                Modifier::Alt.mask(),
                Combo::new([Modifier::Shift], Key::GRAVE),
            ),
            OverrideRule::new(
                "cmd-grave",
                [Modifier::Meta],
                true,
                ModifierSnapshot::EMPTY,
                Combo::new([Modifier::Meta], Key::GRAVE),
            ),
        ])
    }

    /// First rule matching `mods`
    pub fn resolve(&self, mods: ModifierSnapshot) -> Option<&OverrideRule> {
        if mods.is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(mods))
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for OverrideTable {
    fn default() -> Self {
        Self::standard()
    }
}
