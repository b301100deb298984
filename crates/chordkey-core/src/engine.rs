use crate::chord_engine::{ChordEngine, Layer, Profile};
use crate::chord_table::Keymap;
use crate::emitter::{Emitter, HidTransport};
use crate::error::{EngineError, TransportError};
use crate::layouts::Board;
use crate::matrix::{KeyTracker, MatrixLayout, PinSource};
use crate::types::Decision;
use std::time::Instant;
use tracing::{debug, error, info};

/// Counters reported when the poll loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub emitted: u64,
    pub pin_faults: u64,
    pub transport_failures: u64,
}

/// One board's sampler, state machine and emitter, driven by a single loop.
pub struct Engine<P, T> {
    pins: P,
    tracker: KeyTracker,
    chord_engine: ChordEngine,
    emitter: Emitter<T>,
    summary: RunSummary,
}

impl<P: PinSource, T: HidTransport> Engine<P, T> {
    pub fn new(board: &Board, pins: P, transport: T) -> Self {
        info!(
            "Engine: board {} with {} pins, {} chords.",
            board.name,
            board.matrix.pin_count(),
            board.keymap.chords.len()
        );
        Self::from_parts(
            board.matrix.clone(),
            board.keymap.clone(),
            board.profile.clone(),
            pins,
            transport,
        )
    }

    pub fn from_parts(
        matrix: MatrixLayout,
        keymap: Keymap,
        profile: Profile,
        pins: P,
        transport: T,
    ) -> Self {
        Self {
            pins,
            tracker: KeyTracker::new(matrix),
            chord_engine: ChordEngine::new(profile, keymap),
            emitter: Emitter::new(transport),
            summary: RunSummary::default(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.chord_engine.profile
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.chord_engine.set_profile(profile);
    }

    pub fn layer(&self) -> Layer {
        self.chord_engine.layer()
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn transport(&self) -> &T {
        self.emitter.transport()
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// One Sampler → Tracker → Builder → State Machine → Emitter pass.
    pub fn cycle(&mut self, now: Instant) -> Result<Option<Decision>, TransportError> {
        let faults = self.tracker.sample(&mut self.pins);
        self.summary.cycles += 1;
        self.summary.pin_faults += faults as u64;

        let combo = self.tracker.combo();
        let Some(decision) = self.chord_engine.on_combo(&combo, now) else {
            return Ok(None);
        };
        self.emitter.emit(decision)?;
        self.summary.emitted += 1;
        Ok(Some(decision))
    }

    /// Waits for the host, then polls until the host goes away.
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        let timeout = self.profile().connect_timeout();
        info!("Waiting up to {:?} for host connection...", timeout);
        if !self.emitter.transport_mut().wait_connected(timeout) {
            return Err(EngineError::ConnectTimeout(timeout));
        }
        info!("Host connected. Starting poll loop.");

        while self.emitter.transport().is_connected() {
            match self.cycle(Instant::now()) {
                Ok(Some(decision)) => debug!("Sent {:?}", decision),
                Ok(None) => {}
                Err(TransportError::Disconnected) => {
                    info!("Host disconnected during send.");
                    break;
                }
                Err(e) => {
                    error!("Transport failure: {}", e);
                    self.summary.transport_failures += 1;
                }
            }
            std::thread::sleep(self.profile().poll_interval());
        }

        info!(
            "Poll loop ended: {} cycles, {} reports, {} pin faults, {} transport failures.",
            self.summary.cycles,
            self.summary.emitted,
            self.summary.pin_faults,
            self.summary.transport_failures
        );
        Ok(self.summary)
    }
}
