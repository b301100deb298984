use anyhow::{bail, Context};
use chordkey_core::layouts::{LEFT_EXPANDER, RIGHT_EXPANDER};
use chordkey_core::PinId;
use parking_lot::Mutex;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

use crate::virtual_hw::VirtualBank;

/// Pins per MCP23008 expander.
const EXPANDER_PINS: u8 = 8;

/// Idle time after the last frame so the engine sees the final release.
const TRAILING_IDLE: Duration = Duration::from_millis(100);

/// Physical pins held down for `hold_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Frame {
    pub hold_ms: u64,
    #[serde(default)]
    pub left: Vec<u8>,
    #[serde(default)]
    pub right: Vec<u8>,
}

impl Frame {
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        let left = self.left.iter().map(|&p| PinId::new(LEFT_EXPANDER, p));
        let right = self.right.iter().map(|&p| PinId::new(RIGHT_EXPANDER, p));
        left.chain(right)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub frames: Vec<Frame>,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let frames: Vec<Frame> = serde_json::from_str(text)?;
        for (i, frame) in frames.iter().enumerate() {
            if let Some(p) = frame
                .left
                .iter()
                .chain(&frame.right)
                .find(|&&p| p >= EXPANDER_PINS)
            {
                bail!("frame {}: pin {} out of range 0..{}", i, p, EXPANDER_PINS);
            }
        }
        Ok(Self { frames })
    }

    pub fn duration(&self) -> Duration {
        self.frames
            .iter()
            .map(|f| Duration::from_millis(f.hold_ms))
            .sum()
    }

    /// Plays the frames into `bank` on a background thread, then marks the
    /// bank finished.
    pub fn spawn_player(self, bank: Arc<Mutex<VirtualBank>>) -> JoinHandle<()> {
        thread::spawn(move || {
            for (i, frame) in self.frames.iter().enumerate() {
                debug!("Frame {}: {:?}", i, frame);
                bank.lock().hold(frame.pins());
                thread::sleep(Duration::from_millis(frame.hold_ms));
            }
            bank.lock().hold(std::iter::empty());
            thread::sleep(TRAILING_IDLE);
            bank.lock().finished = true;
        })
    }
}
