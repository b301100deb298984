use crate::error::PinError;
use crate::types::{Combo, KeyIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Keys wired to one expander.
pub const KEYS_PER_HAND: usize = 7;

/// Indices below this are finger keys and take part in mirroring.
pub const FINGER_KEYS: KeyIndex = 4;

/// One input pin on one I/O expander (identified by its bus address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinId {
    pub expander: u8,
    pub pin: u8,
}

impl PinId {
    pub const fn new(expander: u8, pin: u8) -> Self {
        Self { expander, pin }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {} @ 0x{:02X}", self.pin, self.expander)
    }
}

/// Capability to read the electrical level of a pin (`true` = high).
pub trait PinSource {
    fn read(&mut self, pin: PinId) -> Result<bool, PinError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandLayout {
    pub expander: u8,
    /// (physical pin, logical key index)
    pub pins: Vec<(u8, KeyIndex)>,
    /// Reverse finger keys (`3 - index`) so both hands share finger order.
    pub mirror_fingers: bool,
}

impl HandLayout {
    /// Pins 0..n mapped one to one onto key indices 0..n.
    pub fn identity(expander: u8, keys: u8) -> Self {
        Self {
            expander,
            pins: (0..keys).map(|p| (p, p)).collect(),
            mirror_fingers: false,
        }
    }

    pub fn mirrored(mut self) -> Self {
        self.mirror_fingers = true;
        self
    }

    pub fn logical_index(&self, key: KeyIndex) -> KeyIndex {
        if self.mirror_fingers && key < FINGER_KEYS {
            FINGER_KEYS - 1 - key
        } else {
            key
        }
    }

    fn key_slots(&self) -> usize {
        self.pins
            .iter()
            .map(|(_, k)| *k as usize + 1)
            .max()
            .unwrap_or(0)
            .max(KEYS_PER_HAND)
    }
}

/// How the key spaces of several hands become one combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandMerge {
    /// Every hand uses indices 0..KEYS_PER_HAND; a combo is the union.
    Fold,
    /// Hand `n` is offset by `n * KEYS_PER_HAND`.
    Concatenate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixLayout {
    pub hands: Vec<HandLayout>,
    pub merge: HandMerge,
    /// Pressed keys pull their pin low (pull-up wiring).
    pub active_low: bool,
}

impl MatrixLayout {
    pub fn pin_count(&self) -> usize {
        self.hands.iter().map(|h| h.pins.len()).sum()
    }
}

/// Per-key pressed state, refreshed once per poll cycle.
pub struct KeyTracker {
    layout: MatrixLayout,
    pressed: Vec<Vec<bool>>,
}

impl KeyTracker {
    pub fn new(layout: MatrixLayout) -> Self {
        let pressed = layout
            .hands
            .iter()
            .map(|h| vec![false; h.key_slots()])
            .collect();
        Self { layout, pressed }
    }

    /// Reads every configured pin. A pin that fails to read keeps its previous
    /// state. Returns the number of failed reads.
    pub fn sample<P: PinSource>(&mut self, source: &mut P) -> usize {
        let mut faults = 0;
        for (hand_idx, hand) in self.layout.hands.iter().enumerate() {
            for &(pin, key) in &hand.pins {
                let id = PinId::new(hand.expander, pin);
                match source.read(id) {
                    Ok(level) => {
                        self.pressed[hand_idx][key as usize] = level != self.layout.active_low;
                    }
                    Err(e) => {
                        trace!("{}; keeping previous state", e);
                        faults += 1;
                    }
                }
            }
        }
        faults
    }

    pub fn is_pressed(&self, hand: usize, key: KeyIndex) -> bool {
        self.pressed
            .get(hand)
            .and_then(|keys| keys.get(key as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Builds the canonical combo from the current key states.
    pub fn combo(&self) -> Combo {
        let mut keys = Vec::new();
        for (hand_idx, hand) in self.layout.hands.iter().enumerate() {
            let offset = match self.layout.merge {
                HandMerge::Fold => 0,
                HandMerge::Concatenate => hand_idx * KEYS_PER_HAND,
            };
            for (key, &down) in self.pressed[hand_idx].iter().enumerate() {
                if down {
                    let logical = hand.logical_index(key as KeyIndex) as usize + offset;
                    keys.push(logical as KeyIndex);
                }
            }
        }
        keys.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// Pull-up bank: every pin reads high unless listed as low or failing.
    #[derive(Default)]
    struct FakeBank {
        low: HashSet<PinId>,
        failing: HashSet<PinId>,
        reads: HashMap<PinId, usize>,
    }

    impl PinSource for FakeBank {
        fn read(&mut self, pin: PinId) -> Result<bool, PinError> {
            *self.reads.entry(pin).or_default() += 1;
            if self.failing.contains(&pin) {
                return Err(PinError { pin });
            }
            Ok(!self.low.contains(&pin))
        }
    }

    fn one_hand() -> MatrixLayout {
        MatrixLayout {
            hands: vec![HandLayout::identity(0x20, 7)],
            merge: HandMerge::Fold,
            active_low: true,
        }
    }

    #[test]
    fn test_active_low_reads_as_pressed() {
        let mut tracker = KeyTracker::new(one_hand());
        let mut bank = FakeBank::default();
        bank.low.insert(PinId::new(0x20, 0));
        bank.low.insert(PinId::new(0x20, 2));

        assert_eq!(tracker.sample(&mut bank), 0);
        assert!(tracker.is_pressed(0, 0));
        assert!(!tracker.is_pressed(0, 1));
        assert_eq!(tracker.combo(), Combo::new(&[0, 2]));
    }

    #[test]
    fn test_failed_read_keeps_previous_state() {
        let mut tracker = KeyTracker::new(one_hand());
        let mut bank = FakeBank::default();
        let p3 = PinId::new(0x20, 3);
        bank.low.insert(p3);
        tracker.sample(&mut bank);
        assert!(tracker.is_pressed(0, 3));

        // Released electrically, but the bus errors on that pin this cycle.
        bank.low.clear();
        bank.failing.insert(p3);
        assert_eq!(tracker.sample(&mut bank), 1);
        assert!(tracker.is_pressed(0, 3));

        // Every other pin was still read.
        assert_eq!(bank.reads[&PinId::new(0x20, 6)], 2);

        bank.failing.clear();
        tracker.sample(&mut bank);
        assert!(tracker.combo().is_empty());
    }

    #[test]
    fn test_pin_remap() {
        let layout = MatrixLayout {
            hands: vec![HandLayout {
                expander: 0x20,
                pins: vec![(0, 0), (1, 1), (2, 2), (3, 3), (6, 4), (5, 5), (4, 6)],
                mirror_fingers: false,
            }],
            merge: HandMerge::Fold,
            active_low: true,
        };
        let mut tracker = KeyTracker::new(layout);
        let mut bank = FakeBank::default();
        bank.low.insert(PinId::new(0x20, 6));
        tracker.sample(&mut bank);
        assert_eq!(tracker.combo(), Combo::new(&[4]));
    }

    #[test]
    fn test_two_hands_fold_with_mirror() {
        let layout = MatrixLayout {
            hands: vec![
                HandLayout::identity(0x20, 7),
                HandLayout::identity(0x21, 7).mirrored(),
            ],
            merge: HandMerge::Fold,
            active_low: true,
        };
        let mut tracker = KeyTracker::new(layout);
        let mut bank = FakeBank::default();
        // Right-hand finger 0 mirrors onto 3, thumb 5 stays 5.
        bank.low.insert(PinId::new(0x21, 0));
        bank.low.insert(PinId::new(0x21, 5));
        tracker.sample(&mut bank);
        assert_eq!(tracker.combo(), Combo::new(&[3, 5]));

        // Same logical key on both hands collapses into one entry.
        bank.low.insert(PinId::new(0x20, 3));
        tracker.sample(&mut bank);
        assert_eq!(tracker.combo(), Combo::new(&[3, 5]));
    }

    #[test]
    fn test_two_hands_concatenate() {
        let layout = MatrixLayout {
            hands: vec![
                HandLayout::identity(0x20, 7),
                HandLayout::identity(0x21, 7),
            ],
            merge: HandMerge::Concatenate,
            active_low: true,
        };
        let mut tracker = KeyTracker::new(layout);
        let mut bank = FakeBank::default();
        bank.low.insert(PinId::new(0x20, 1));
        bank.low.insert(PinId::new(0x21, 1));
        tracker.sample(&mut bank);
        assert_eq!(tracker.combo(), Combo::new(&[1, 8]));
    }
}
