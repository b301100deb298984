use crate::keycode::Keycode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical key position within a hand (0..6 on the 7-key boards).
pub type KeyIndex = u8;

/// Set of keys held at one sampling instant, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Combo {
    keys: Vec<KeyIndex>,
}

impl Combo {
    pub fn new(keys: &[KeyIndex]) -> Self {
        keys.iter().copied().collect()
    }

    pub const fn empty() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn contains(&self, key: KeyIndex) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    /// True when every key of `self` is in `other` and `other` has more.
    pub fn is_strict_subset_of(&self, other: &Combo) -> bool {
        self.len() < other.len() && self.keys.iter().all(|&k| other.contains(k))
    }
}

impl FromIterator<KeyIndex> for Combo {
    fn from_iter<I: IntoIterator<Item = KeyIndex>>(iter: I) -> Self {
        let mut keys: Vec<KeyIndex> = iter.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        Self { keys }
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, k) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", k)?;
        }
        f.write_str("}")
    }
}

/// Layers that can be entered from the Normal layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Modifier,
    Mouse,
}

/// What a chord table entry asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    EmitKey(Keycode),
    /// (modifier, code) pressed together.
    EmitKeyPair(Keycode, Keycode),
    EmitMouseDelta(i8, i8),
    /// Enter the layer, or leave it if it is already active.
    ToggleLayer(LayerKind),
    /// Enter the layer from scratch, resetting any partial selection.
    ArmLayer(LayerKind),
}

/// Output decision from the chord engine, handed to the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Momentary tap of one key
    Tap(Keycode),
    /// Momentary tap of two keys pressed together
    TapPair(Keycode, Keycode),
    /// Relative cursor movement
    MouseMove(i8, i8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_is_order_independent() {
        let a = Combo::new(&[2, 0, 1]);
        let b: Combo = vec![1, 2, 0, 2].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{0,1,2}");
        assert!(a.contains(1));
        assert!(!a.contains(3));
    }

    #[test]
    fn test_strict_subset() {
        let toggle = Combo::new(&[4, 5, 6]);
        assert!(Combo::new(&[5, 6]).is_strict_subset_of(&toggle));
        assert!(!toggle.is_strict_subset_of(&toggle));
        assert!(!Combo::new(&[3, 5]).is_strict_subset_of(&toggle));
        assert!(Combo::empty().is_strict_subset_of(&toggle));
    }

    #[test]
    fn test_combo_display() {
        assert_eq!(Combo::new(&[3, 0]).to_string(), "{0,3}");
        assert_eq!(Combo::empty().to_string(), "{}");
    }
}
