#![allow(dead_code)]

use chordkey_core::{HidTransport, Keycode, PinError, PinId, PinSource, TransportError};
use std::cell::Cell;
use std::collections::HashSet;

/// HID report as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Press(Keycode),
    Pair(Keycode, Keycode),
    ReleaseAll,
    Mouse(i8, i8),
}

/// Pull-up expander bank: pins listed in `low` read as pressed.
#[derive(Default)]
pub struct Bank {
    pub low: HashSet<PinId>,
    pub failing: HashSet<PinId>,
}

impl Bank {
    pub fn set(&mut self, pins: &[PinId]) {
        self.low = pins.iter().copied().collect();
    }
}

impl PinSource for Bank {
    fn read(&mut self, pin: PinId) -> Result<bool, PinError> {
        if self.failing.contains(&pin) {
            return Err(PinError { pin });
        }
        Ok(!self.low.contains(&pin))
    }
}

/// Plays back one frame of held pins per poll cycle; after the last frame
/// every key reads released.
pub struct ScriptedPins {
    frames: Vec<HashSet<PinId>>,
    pins_per_frame: usize,
    reads: usize,
}

impl ScriptedPins {
    pub fn new(frames: Vec<Vec<PinId>>, pins_per_frame: usize) -> Self {
        Self {
            frames: frames
                .into_iter()
                .map(|f| f.into_iter().collect())
                .collect(),
            pins_per_frame,
            reads: 0,
        }
    }
}

impl PinSource for ScriptedPins {
    fn read(&mut self, pin: PinId) -> Result<bool, PinError> {
        let frame = self.reads / self.pins_per_frame;
        self.reads += 1;
        let pressed = self
            .frames
            .get(frame)
            .is_some_and(|held| held.contains(&pin));
        Ok(!pressed)
    }
}

/// Records every report. Can be told to reject presses or to drop the link
/// after a number of connection checks.
#[derive(Default)]
pub struct Recorder {
    pub log: Vec<Report>,
    pub reject_presses: bool,
    pub disconnect_on_press: bool,
    /// `is_connected` turns false after this many calls (None = never).
    pub connected_checks: Option<u32>,
    /// `is_connected` stays false for this many initial calls.
    pub connect_after: u32,
    /// Calls to `is_connected` so far.
    pub checks: Cell<u32>,
}

impl Recorder {
    pub fn keys(&self) -> Vec<Keycode> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Report::Press(k) => Some(*k),
                Report::Pair(_, k) => Some(*k),
                _ => None,
            })
            .collect()
    }

    fn press_result(&self) -> Result<(), TransportError> {
        if self.disconnect_on_press {
            return Err(TransportError::Disconnected);
        }
        if self.reject_presses {
            return Err(TransportError::Rejected("report queue full".into()));
        }
        Ok(())
    }
}

impl HidTransport for Recorder {
    fn press(&mut self, code: Keycode) -> Result<(), TransportError> {
        self.log.push(Report::Press(code));
        self.press_result()
    }

    fn press_pair(&mut self, first: Keycode, second: Keycode) -> Result<(), TransportError> {
        self.log.push(Report::Pair(first, second));
        self.press_result()
    }

    fn release_all(&mut self) -> Result<(), TransportError> {
        self.log.push(Report::ReleaseAll);
        Ok(())
    }

    fn move_mouse(&mut self, dx: i8, dy: i8) -> Result<(), TransportError> {
        self.log.push(Report::Mouse(dx, dy));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        let n = self.checks.get() + 1;
        self.checks.set(n);
        if n <= self.connect_after {
            return false;
        }
        self.connected_checks.map_or(true, |limit| n <= limit)
    }
}

/// Routes engine logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn pin(expander: u8, pin: u8) -> PinId {
    PinId::new(expander, pin)
}
