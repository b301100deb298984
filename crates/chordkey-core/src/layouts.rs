use crate::chord_engine::Profile;
use crate::chord_table::{ChordTable, Keymap};
use crate::keycode::Keycode;
use crate::matrix::{HandLayout, HandMerge, MatrixLayout};
use crate::types::{Action, Combo, KeyIndex, LayerKind};
use std::collections::HashSet;

/// Cursor distance of one mouse-layer step.
pub const MOUSE_STEP: i8 = 10;

pub const LEFT_EXPANDER: u8 = 0x20;
pub const RIGHT_EXPANDER: u8 = 0x21;

/// Everything that differs between hardware builds.
#[derive(Debug, Clone)]
pub struct Board {
    pub name: &'static str,
    pub matrix: MatrixLayout,
    pub keymap: Keymap,
    pub profile: Profile,
}

lazy_static::lazy_static! {
    /// Wired single-hand board.
    pub static ref C7K_LT: Board = c7k_lt();
    /// Wireless board with both hands sharing one chord table.
    pub static ref NNV2: Board = nnv2();
}

pub fn by_name(name: &str) -> Option<&'static Board> {
    match name {
        "c7k" | "c7k-lt" => Some(&*C7K_LT),
        "nnv2" => Some(&*NNV2),
        _ => None,
    }
}

fn key(keys: &[KeyIndex], code: Keycode) -> (Combo, Action) {
    (Combo::new(keys), Action::EmitKey(code))
}

/// Shared chord set. `four` and `six` are the single thumb keys,
/// `zero_two_four` lists every binding of {0,2,4} in definition order.
fn base_chords(four: Keycode, six: Keycode, zero_two_four: &[Keycode]) -> Vec<(Combo, Action)> {
    let mut v = vec![
        key(&[0], Keycode::E),
        key(&[1], Keycode::I),
        key(&[2], Keycode::A),
        key(&[3], Keycode::S),
        key(&[4], four),
        key(&[0, 1], Keycode::R),
        key(&[0, 2], Keycode::O),
        key(&[0, 3], Keycode::C),
        key(&[1, 2], Keycode::N),
        key(&[1, 3], Keycode::L),
        key(&[2, 3], Keycode::T),
        key(&[0, 5], Keycode::M),
        key(&[1, 5], Keycode::G),
        key(&[2, 5], Keycode::H),
        key(&[3, 5], Keycode::B),
        key(&[0, 4], Keycode::SPACE),
        key(&[0, 1, 5], Keycode::Y),
        key(&[0, 2, 5], Keycode::W),
        key(&[0, 3, 5], Keycode::X),
        key(&[1, 2, 5], Keycode::F),
        key(&[1, 3, 5], Keycode::K),
        key(&[2, 3, 5], Keycode::V),
        key(&[0, 1, 2], Keycode::D),
        key(&[1, 2, 3], Keycode::P),
        key(&[0, 1, 2, 5], Keycode::J),
        key(&[1, 2, 3, 5], Keycode::Z),
        key(&[0, 1, 2, 3], Keycode::U),
        key(&[0, 1, 2, 3, 5], Keycode::Q),
        key(&[0, 6], Keycode::ONE),
        key(&[1, 6], Keycode::TWO),
        key(&[2, 6], Keycode::THREE),
        key(&[3, 6], Keycode::FOUR),
        key(&[0, 1, 6], Keycode::FIVE),
        key(&[1, 2, 6], Keycode::SIX),
        key(&[2, 3, 6], Keycode::SEVEN),
        key(&[0, 2, 6], Keycode::EIGHT),
        key(&[1, 3, 6], Keycode::NINE),
        key(&[0, 3, 6], Keycode::UP_ARROW),
        key(&[0, 1, 2, 6], Keycode::ZERO),
        key(&[0, 1, 3, 6], Keycode::RIGHT_ARROW),
        key(&[0, 2, 3, 6], Keycode::LEFT_ARROW),
        key(&[1, 2, 3, 6], Keycode::ESCAPE),
        key(&[0, 1, 2, 3, 6], Keycode::DOWN_ARROW),
        key(&[6], six),
        key(&[1, 4], Keycode::TAB),
        key(&[2, 4], Keycode::PERIOD),
        key(&[3, 4], Keycode::MINUS),
        key(&[0, 2, 3], Keycode::SPACE),
        key(&[0, 1, 3], Keycode::BACKSPACE),
        key(&[2, 3, 4], Keycode::FORWARD_SLASH),
        key(&[0, 1, 4], Keycode::ENTER),
    ];
    v.extend(zero_two_four.iter().map(|&code| key(&[0, 2, 4], code)));
    v.extend([
        key(&[1, 3, 4], Keycode::LEFT_BRACKET),
        key(&[0, 3, 4], Keycode::RIGHT_BRACKET),
        // Same combo as FORWARD_SLASH above; this later entry wins.
        key(&[2, 3, 4], Keycode::BACKSLASH),
        key(&[1, 2, 4], Keycode::BACKSPACE),
        key(&[0, 1, 3, 4], Keycode::QUOTE),
        key(&[0, 2, 3, 4], Keycode::SEMICOLON),
        key(&[0, 1, 2, 3, 4], Keycode::GRAVE_ACCENT),
        // Layer triggers
        (Combo::new(&[5, 6]), Action::ArmLayer(LayerKind::Modifier)),
        (Combo::new(&[4, 5, 6]), Action::ToggleLayer(LayerKind::Mouse)),
    ]);
    v
}

fn modifier_select() -> ChordTable {
    ChordTable::from_entries([
        key(&[0], Keycode::LEFT_CONTROL),
        key(&[1], Keycode::LEFT_SHIFT),
        key(&[2], Keycode::LEFT_ALT),
        key(&[3], Keycode::LEFT_GUI),
    ])
}

fn mouse_layer() -> ChordTable {
    ChordTable::from_entries([
        (Combo::new(&[0]), Action::EmitMouseDelta(-MOUSE_STEP, 0)),
        (Combo::new(&[1]), Action::EmitMouseDelta(0, -MOUSE_STEP)),
        (Combo::new(&[2]), Action::EmitMouseDelta(0, MOUSE_STEP)),
        (Combo::new(&[3]), Action::EmitMouseDelta(MOUSE_STEP, 0)),
    ])
}

fn c7k_lt() -> Board {
    // Physical pins 4 and 6 are wired to the opposite thumb positions.
    let hand = HandLayout {
        expander: LEFT_EXPANDER,
        pins: vec![(0, 0), (1, 1), (2, 2), (3, 3), (6, 4), (5, 5), (4, 6)],
        mirror_fingers: false,
    };
    Board {
        name: "c7k-lt",
        matrix: MatrixLayout {
            hands: vec![hand],
            merge: HandMerge::Fold,
            active_low: true,
        },
        keymap: Keymap {
            chords: ChordTable::from_entries(base_chords(
                Keycode::BACKSPACE,
                Keycode::SPACE,
                &[Keycode::COMMA],
            )),
            modifier_select: modifier_select(),
            mouse: mouse_layer(),
            double_tap: HashSet::from([Combo::new(&[4]), Combo::new(&[6])]),
        },
        profile: Profile::wired(),
    }
}

fn nnv2() -> Board {
    Board {
        name: "nnv2",
        matrix: MatrixLayout {
            hands: vec![
                HandLayout::identity(LEFT_EXPANDER, 7),
                HandLayout::identity(RIGHT_EXPANDER, 7).mirrored(),
            ],
            merge: HandMerge::Fold,
            active_low: true,
        },
        keymap: Keymap {
            chords: ChordTable::from_entries(base_chords(
                Keycode::SPACE,
                Keycode::BACKSPACE,
                &[Keycode::COMMA, Keycode::EQUALS],
            )),
            modifier_select: modifier_select(),
            mouse: mouse_layer(),
            double_tap: HashSet::new(),
        },
        profile: Profile::wireless(),
    }
}
