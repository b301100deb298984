use serde::{Deserialize, Serialize};
use std::fmt;

/// USB HID keyboard usage id (usage page 0x07).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Keycode(pub u8);

impl Keycode {
    pub const fn new(usage: u8) -> Self {
        Self(usage)
    }

    pub const A: Keycode = Keycode(0x04);
    pub const B: Keycode = Keycode(0x05);
    pub const C: Keycode = Keycode(0x06);
    pub const D: Keycode = Keycode(0x07);
    pub const E: Keycode = Keycode(0x08);
    pub const F: Keycode = Keycode(0x09);
    pub const G: Keycode = Keycode(0x0A);
    pub const H: Keycode = Keycode(0x0B);
    pub const I: Keycode = Keycode(0x0C);
    pub const J: Keycode = Keycode(0x0D);
    pub const K: Keycode = Keycode(0x0E);
    pub const L: Keycode = Keycode(0x0F);
    pub const M: Keycode = Keycode(0x10);
    pub const N: Keycode = Keycode(0x11);
    pub const O: Keycode = Keycode(0x12);
    pub const P: Keycode = Keycode(0x13);
    pub const Q: Keycode = Keycode(0x14);
    pub const R: Keycode = Keycode(0x15);
    pub const S: Keycode = Keycode(0x16);
    pub const T: Keycode = Keycode(0x17);
    pub const U: Keycode = Keycode(0x18);
    pub const V: Keycode = Keycode(0x19);
    pub const W: Keycode = Keycode(0x1A);
    pub const X: Keycode = Keycode(0x1B);
    pub const Y: Keycode = Keycode(0x1C);
    pub const Z: Keycode = Keycode(0x1D);

    pub const ONE: Keycode = Keycode(0x1E);
    pub const TWO: Keycode = Keycode(0x1F);
    pub const THREE: Keycode = Keycode(0x20);
    pub const FOUR: Keycode = Keycode(0x21);
    pub const FIVE: Keycode = Keycode(0x22);
    pub const SIX: Keycode = Keycode(0x23);
    pub const SEVEN: Keycode = Keycode(0x24);
    pub const EIGHT: Keycode = Keycode(0x25);
    pub const NINE: Keycode = Keycode(0x26);
    pub const ZERO: Keycode = Keycode(0x27);

    pub const ENTER: Keycode = Keycode(0x28);
    pub const ESCAPE: Keycode = Keycode(0x29);
    pub const BACKSPACE: Keycode = Keycode(0x2A);
    pub const TAB: Keycode = Keycode(0x2B);
    pub const SPACE: Keycode = Keycode(0x2C);
    pub const MINUS: Keycode = Keycode(0x2D);
    pub const EQUALS: Keycode = Keycode(0x2E);
    pub const LEFT_BRACKET: Keycode = Keycode(0x2F);
    pub const RIGHT_BRACKET: Keycode = Keycode(0x30);
    pub const BACKSLASH: Keycode = Keycode(0x31);
    pub const SEMICOLON: Keycode = Keycode(0x33);
    pub const QUOTE: Keycode = Keycode(0x34);
    pub const GRAVE_ACCENT: Keycode = Keycode(0x35);
    pub const COMMA: Keycode = Keycode(0x36);
    pub const PERIOD: Keycode = Keycode(0x37);
    pub const FORWARD_SLASH: Keycode = Keycode(0x38);

    pub const RIGHT_ARROW: Keycode = Keycode(0x4F);
    pub const LEFT_ARROW: Keycode = Keycode(0x50);
    pub const DOWN_ARROW: Keycode = Keycode(0x51);
    pub const UP_ARROW: Keycode = Keycode(0x52);

    pub const LEFT_CONTROL: Keycode = Keycode(0xE0);
    pub const LEFT_SHIFT: Keycode = Keycode(0xE1);
    pub const LEFT_ALT: Keycode = Keycode(0xE2);
    pub const LEFT_GUI: Keycode = Keycode(0xE3);

    /// Modifier usages live in 0xE0..=0xE7.
    pub const fn is_modifier(self) -> bool {
        self.0 >= 0xE0 && self.0 <= 0xE7
    }

    pub fn name(self) -> Option<&'static str> {
        KEYCODE_NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

pub const KEYCODE_NAMES: &[(Keycode, &str)] = &[
    (Keycode::A, "A"),
    (Keycode::B, "B"),
    (Keycode::C, "C"),
    (Keycode::D, "D"),
    (Keycode::E, "E"),
    (Keycode::F, "F"),
    (Keycode::G, "G"),
    (Keycode::H, "H"),
    (Keycode::I, "I"),
    (Keycode::J, "J"),
    (Keycode::K, "K"),
    (Keycode::L, "L"),
    (Keycode::M, "M"),
    (Keycode::N, "N"),
    (Keycode::O, "O"),
    (Keycode::P, "P"),
    (Keycode::Q, "Q"),
    (Keycode::R, "R"),
    (Keycode::S, "S"),
    (Keycode::T, "T"),
    (Keycode::U, "U"),
    (Keycode::V, "V"),
    (Keycode::W, "W"),
    (Keycode::X, "X"),
    (Keycode::Y, "Y"),
    (Keycode::Z, "Z"),
    (Keycode::ONE, "1"),
    (Keycode::TWO, "2"),
    (Keycode::THREE, "3"),
    (Keycode::FOUR, "4"),
    (Keycode::FIVE, "5"),
    (Keycode::SIX, "6"),
    (Keycode::SEVEN, "7"),
    (Keycode::EIGHT, "8"),
    (Keycode::NINE, "9"),
    (Keycode::ZERO, "0"),
    (Keycode::ENTER, "ENTER"),
    (Keycode::ESCAPE, "ESCAPE"),
    (Keycode::BACKSPACE, "BACKSPACE"),
    (Keycode::TAB, "TAB"),
    (Keycode::SPACE, "SPACE"),
    (Keycode::MINUS, "-"),
    (Keycode::EQUALS, "="),
    (Keycode::LEFT_BRACKET, "["),
    (Keycode::RIGHT_BRACKET, "]"),
    (Keycode::BACKSLASH, "\\"),
    (Keycode::SEMICOLON, ";"),
    (Keycode::QUOTE, "'"),
    (Keycode::GRAVE_ACCENT, "`"),
    (Keycode::COMMA, ","),
    (Keycode::PERIOD, "."),
    (Keycode::FORWARD_SLASH, "/"),
    (Keycode::RIGHT_ARROW, "RIGHT"),
    (Keycode::LEFT_ARROW, "LEFT"),
    (Keycode::DOWN_ARROW, "DOWN"),
    (Keycode::UP_ARROW, "UP"),
    (Keycode::LEFT_CONTROL, "CTRL"),
    (Keycode::LEFT_SHIFT, "SHIFT"),
    (Keycode::LEFT_ALT, "ALT"),
    (Keycode::LEFT_GUI, "GUI"),
];
