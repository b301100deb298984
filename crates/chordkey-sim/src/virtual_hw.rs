use chordkey_core::{HidTransport, Keycode, PinError, PinId, PinSource, TransportError};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Pin levels shared between the script player and the engine.
#[derive(Debug, Default)]
pub struct VirtualBank {
    low: HashSet<PinId>,
    pub finished: bool,
}

impl VirtualBank {
    pub fn hold(&mut self, pins: impl IntoIterator<Item = PinId>) {
        self.low = pins.into_iter().collect();
    }
}

/// Pull-up expanders driven by the script.
pub struct VirtualExpander {
    bank: Arc<Mutex<VirtualBank>>,
}

impl VirtualExpander {
    pub fn new(bank: Arc<Mutex<VirtualBank>>) -> Self {
        Self { bank }
    }
}

impl PinSource for VirtualExpander {
    fn read(&mut self, pin: PinId) -> Result<bool, PinError> {
        Ok(!self.bank.lock().low.contains(&pin))
    }
}

/// What the simulated host receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostReport {
    Press(Keycode),
    PressPair(Keycode, Keycode),
    ReleaseAll,
    Mouse(i8, i8),
}

impl fmt::Display for HostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostReport::Press(code) => write!(f, "press   {}", code),
            HostReport::PressPair(m, code) => write!(f, "press   {}+{}", m, code),
            HostReport::ReleaseAll => write!(f, "release"),
            HostReport::Mouse(dx, dy) => write!(f, "mouse   {:+} {:+}", dx, dy),
        }
    }
}

/// Forwards reports to the host thread. The link counts as connected until
/// the script has finished playing.
pub struct ChannelTransport {
    tx: Sender<HostReport>,
    bank: Arc<Mutex<VirtualBank>>,
}

impl ChannelTransport {
    pub fn new(tx: Sender<HostReport>, bank: Arc<Mutex<VirtualBank>>) -> Self {
        Self { tx, bank }
    }

    fn send(&self, report: HostReport) -> Result<(), TransportError> {
        self.tx
            .send(report)
            .map_err(|_| TransportError::Disconnected)
    }
}

impl HidTransport for ChannelTransport {
    fn press(&mut self, code: Keycode) -> Result<(), TransportError> {
        self.send(HostReport::Press(code))
    }

    fn press_pair(&mut self, first: Keycode, second: Keycode) -> Result<(), TransportError> {
        self.send(HostReport::PressPair(first, second))
    }

    fn release_all(&mut self) -> Result<(), TransportError> {
        self.send(HostReport::ReleaseAll)
    }

    fn move_mouse(&mut self, dx: i8, dy: i8) -> Result<(), TransportError> {
        self.send(HostReport::Mouse(dx, dy))
    }

    fn is_connected(&self) -> bool {
        !self.bank.lock().finished
    }
}
