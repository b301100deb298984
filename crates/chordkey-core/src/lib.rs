pub mod chord_engine;
pub mod chord_table;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod keycode;
pub mod layouts;
pub mod matrix;
pub mod types;

pub use chord_engine::{ChordEngine, Layer, Profile};
pub use chord_table::{ChordTable, Keymap};
pub use emitter::{Emitter, HidTransport};
pub use engine::{Engine, RunSummary};
pub use error::{EngineError, PinError, TransportError};
pub use keycode::Keycode;
pub use matrix::{PinId, PinSource};
pub use types::{Action, Combo, Decision, KeyIndex, LayerKind};
