use crate::types::{Action, Combo};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Immutable combo → action mapping. Only exact set matches resolve.
#[derive(Debug, Clone, Default)]
pub struct ChordTable {
    entries: HashMap<Combo, Action>,
    overridden: Vec<Combo>,
}

impl ChordTable {
    /// Builds the table in list order. A combo listed twice keeps its last action;
    /// every such override is logged and remembered in [`ChordTable::overridden`].
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Combo, Action)>,
    {
        let mut map = HashMap::new();
        let mut overridden = Vec::new();
        for (combo, action) in entries {
            if let Some(previous) = map.insert(combo.clone(), action) {
                if previous != action {
                    warn!(
                        "Chord {} defined twice: {:?} replaced by {:?}",
                        combo, previous, action
                    );
                }
                if !overridden.contains(&combo) {
                    overridden.push(combo);
                }
            }
        }
        Self {
            entries: map,
            overridden,
        }
    }

    pub fn lookup(&self, combo: &Combo) -> Option<Action> {
        if combo.is_empty() {
            return None;
        }
        self.entries.get(combo).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combos that were defined more than once during construction.
    pub fn overridden(&self) -> &[Combo] {
        &self.overridden
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Combo, &Action)> {
        self.entries.iter()
    }
}

impl FromIterator<(Combo, Action)> for ChordTable {
    fn from_iter<I: IntoIterator<Item = (Combo, Action)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

/// All tables one board interprets combos with.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    /// Normal layer. Also carries the layer trigger entries.
    pub chords: ChordTable,
    /// Stage-1 selections of the modifier layer, as `EmitKey(modifier)`.
    pub modifier_select: ChordTable,
    /// Cursor moves of the mouse layer, as `EmitMouseDelta`.
    pub mouse: ChordTable,
    /// Normal-layer combos that only fire on a double tap.
    pub double_tap: HashSet<Combo>,
}

impl Keymap {
    pub fn is_double_tap(&self, combo: &Combo) -> bool {
        self.double_tap.contains(combo)
    }
}
