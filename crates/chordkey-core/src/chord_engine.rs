use crate::chord_table::Keymap;
use crate::keycode::Keycode;
use crate::types::{Action, Combo, Decision, LayerKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Timing constants and repeat policy. Compiled in through the board presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Keys must be down this long before anything resolves.
    #[serde(default = "default_minimum_hold_ms")]
    pub minimum_hold_ms: u64,
    /// Interval between repeats of a held chord.
    #[serde(default = "default_repeat_delay_ms")]
    pub repeat_delay_ms: u64,
    /// Empty samples closer together than this do not reset the engine twice.
    #[serde(default = "default_release_window_ms")]
    pub release_window_ms: u64,
    /// Max gap between the two taps of a gated combo.
    #[serde(default = "default_double_press_window_ms")]
    pub double_press_window_ms: u64,
    /// When set, a changed combo after a resolution is only accepted within
    /// this window; anything later waits for a full release.
    #[serde(default)]
    pub combo_window_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub normal_repeat: bool,
    #[serde(default = "default_true")]
    pub mouse_repeat: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_minimum_hold_ms() -> u64 {
    10
}

fn default_repeat_delay_ms() -> u64 {
    200
}

fn default_release_window_ms() -> u64 {
    10
}

fn default_double_press_window_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_connect_timeout_ms() -> u64 {
    30_000
}

impl Default for Profile {
    fn default() -> Self {
        Self::wired()
    }
}

impl Profile {
    /// USB single-hand board: repeats held chords, no combo lockout.
    pub fn wired() -> Self {
        Self {
            minimum_hold_ms: 10,
            repeat_delay_ms: 200,
            release_window_ms: 10,
            double_press_window_ms: 300,
            combo_window_ms: None,
            normal_repeat: true,
            mouse_repeat: true,
            poll_interval_ms: 50,
            connect_timeout_ms: 30_000,
        }
    }

    /// BLE two-hand board: one emission per hold, rolled combos locked out.
    pub fn wireless() -> Self {
        Self {
            combo_window_ms: Some(10),
            normal_repeat: false,
            poll_interval_ms: 10,
            ..Self::wired()
        }
    }

    pub fn minimum_hold(&self) -> Duration {
        Duration::from_millis(self.minimum_hold_ms)
    }

    pub fn repeat_delay(&self) -> Duration {
        Duration::from_millis(self.repeat_delay_ms)
    }

    pub fn release_window(&self) -> Duration {
        Duration::from_millis(self.release_window_ms)
    }

    pub fn double_press_window(&self) -> Duration {
        Duration::from_millis(self.double_press_window_ms)
    }

    pub fn combo_window(&self) -> Option<Duration> {
        self.combo_window_ms.map(Duration::from_millis)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No keys down
    Idle,
    /// Keys down, nothing resolved yet
    Holding,
    /// Something was resolved for `pending`
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Normal,
    /// `held` is `None` until a stage-1 combo picks the modifier.
    ModifierArmed { held: Option<Keycode> },
    MouseArmed,
}

impl Layer {
    fn armed(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Modifier => Layer::ModifierArmed { held: None },
            LayerKind::Mouse => Layer::MouseArmed,
        }
    }

    pub fn kind(self) -> Option<LayerKind> {
        match self {
            Layer::Normal => None,
            Layer::ModifierArmed { .. } => Some(LayerKind::Modifier),
            Layer::MouseArmed => Some(LayerKind::Mouse),
        }
    }
}

pub struct ChordState {
    pub phase: Phase,
    pub pending: Option<Combo>,
    pub last_combo_time: Option<Instant>,
    pub first_hold_time: Option<Instant>,
    pub last_release_time: Option<Instant>,
    /// Last lone tap of each double-tap gated combo.
    pub last_tap: HashMap<Combo, Instant>,
    pub layer: Layer,
    // What re-emits while `pending` stays held.
    repeat: Option<Decision>,
}

impl Default for ChordState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            last_combo_time: None,
            first_hold_time: None,
            last_release_time: None,
            last_tap: HashMap::new(),
            layer: Layer::Normal,
            repeat: None,
        }
    }
}

pub struct ChordEngine {
    pub profile: Profile,
    pub state: ChordState,
    keymap: Keymap,
}

impl ChordEngine {
    pub fn new(profile: Profile, keymap: Keymap) -> Self {
        Self {
            profile,
            state: ChordState::default(),
            keymap,
        }
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    pub fn layer(&self) -> Layer {
        self.state.layer
    }

    /// Advances the engine by one poll cycle with the combo sampled at `now`.
    pub fn on_combo(&mut self, combo: &Combo, now: Instant) -> Option<Decision> {
        if combo.is_empty() {
            self.on_release(now);
            return None;
        }

        let first_hold = match self.state.first_hold_time {
            Some(t) => t,
            None => {
                self.state.first_hold_time = Some(now);
                self.state.phase = Phase::Holding;
                now
            }
        };
        if now.saturating_duration_since(first_hold) < self.profile.minimum_hold() {
            return None;
        }

        if self.state.pending.as_ref() == Some(combo) {
            return self.repeat(now);
        }

        // Keys lifted off a layer trigger stay swallowed until a full release.
        if let Some(pending) = &self.state.pending {
            if combo.is_strict_subset_of(pending) && self.is_layer_trigger(pending) {
                return None;
            }
        }

        if let (Some(window), Some(_), Some(last)) = (
            self.profile.combo_window(),
            self.state.pending.as_ref(),
            self.state.last_combo_time,
        ) {
            if now.saturating_duration_since(last) > window {
                return None;
            }
        }

        self.resolve(combo, now)
    }

    fn on_release(&mut self, now: Instant) {
        let due = match self.state.last_release_time {
            None => true,
            Some(t) => now.saturating_duration_since(t) >= self.profile.release_window(),
        };
        if due {
            if self.state.phase != Phase::Idle {
                debug!("Released {:?}; idle", self.state.pending);
            }
            self.state.pending = None;
            self.state.first_hold_time = None;
            self.state.repeat = None;
            self.state.phase = Phase::Idle;
            self.state.last_release_time = Some(now);
        }

        let window = self.profile.double_press_window();
        self.state
            .last_tap
            .retain(|_, t| now.saturating_duration_since(*t) <= window);
    }

    fn repeat(&mut self, now: Instant) -> Option<Decision> {
        let decision = self.state.repeat?;
        let last = self.state.last_combo_time?;
        if now.saturating_duration_since(last) < self.profile.repeat_delay() {
            return None;
        }
        self.state.last_combo_time = Some(now);
        debug!("Repeat {:?}", decision);
        Some(decision)
    }

    fn is_layer_trigger(&self, combo: &Combo) -> bool {
        matches!(
            self.keymap.chords.lookup(combo),
            Some(Action::ToggleLayer(_) | Action::ArmLayer(_))
        )
    }

    fn resolve(&mut self, combo: &Combo, now: Instant) -> Option<Decision> {
        // Layer triggers work from every layer.
        if let Some(action @ (Action::ToggleLayer(_) | Action::ArmLayer(_))) =
            self.keymap.chords.lookup(combo)
        {
            self.apply_layer_action(action);
            self.mark_resolved(combo, now, None);
            return None;
        }

        let layer = self.state.layer;
        match layer {
            Layer::Normal => self.resolve_normal(combo, now),
            Layer::MouseArmed => match self.keymap.mouse.lookup(combo) {
                Some(Action::EmitMouseDelta(dx, dy)) => {
                    let decision = Decision::MouseMove(dx, dy);
                    let repeat = self.profile.mouse_repeat.then_some(decision);
                    self.mark_resolved(combo, now, repeat);
                    debug!("Mouse {} -> {:?}", combo, decision);
                    Some(decision)
                }
                _ => None,
            },
            Layer::ModifierArmed { held: None } => match self.keymap.modifier_select.lookup(combo) {
                Some(Action::EmitKey(modifier)) if modifier.is_modifier() => {
                    self.state.layer = Layer::ModifierArmed {
                        held: Some(modifier),
                    };
                    self.mark_resolved(combo, now, None);
                    debug!("Modifier {} selected by {}", modifier, combo);
                    None
                }
                _ => None,
            },
            Layer::ModifierArmed {
                held: Some(modifier),
            } => match self.keymap.chords.lookup(combo) {
                Some(Action::EmitKey(code)) => {
                    self.state.layer = Layer::Normal;
                    self.mark_resolved(combo, now, None);
                    let decision = Decision::TapPair(modifier, code);
                    debug!("Modified chord {} -> {:?}", combo, decision);
                    Some(decision)
                }
                _ => None,
            },
        }
    }

    fn resolve_normal(&mut self, combo: &Combo, now: Instant) -> Option<Decision> {
        if self.keymap.is_double_tap(combo) {
            return self.double_tap(combo, now);
        }
        let decision = to_decision(self.keymap.chords.lookup(combo)?)?;
        let repeat = self.profile.normal_repeat.then_some(decision);
        self.mark_resolved(combo, now, repeat);
        debug!("Chord {} -> {:?}", combo, decision);
        Some(decision)
    }

    fn double_tap(&mut self, combo: &Combo, now: Instant) -> Option<Decision> {
        let window = self.profile.double_press_window();
        let second = self
            .state
            .last_tap
            .get(combo)
            .is_some_and(|prev| now.saturating_duration_since(*prev) <= window);

        if !second {
            // Lone tap: remember it and swallow the rest of this hold.
            self.state.last_tap.insert(combo.clone(), now);
            self.mark_resolved(combo, now, None);
            debug!("Double-tap gate armed for {}", combo);
            return None;
        }

        self.state.last_tap.remove(combo);
        let decision = self.keymap.chords.lookup(combo).and_then(to_decision);
        let repeat = if self.profile.normal_repeat {
            decision
        } else {
            None
        };
        self.mark_resolved(combo, now, repeat);
        debug!("Double tap {} -> {:?}", combo, decision);
        decision
    }

    fn apply_layer_action(&mut self, action: Action) {
        let next = match action {
            Action::ToggleLayer(kind) if self.state.layer.kind() == Some(kind) => Layer::Normal,
            Action::ToggleLayer(kind) | Action::ArmLayer(kind) => Layer::armed(kind),
            _ => return,
        };
        debug!("Layer {:?} -> {:?}", self.state.layer, next);
        self.state.layer = next;
    }

    fn mark_resolved(&mut self, combo: &Combo, now: Instant, repeat: Option<Decision>) {
        self.state.pending = Some(combo.clone());
        self.state.last_combo_time = Some(now);
        self.state.phase = Phase::Resolved;
        self.state.repeat = repeat;
    }
}

fn to_decision(action: Action) -> Option<Decision> {
    match action {
        Action::EmitKey(code) => Some(Decision::Tap(code)),
        Action::EmitKeyPair(modifier, code) => Some(Decision::TapPair(modifier, code)),
        Action::EmitMouseDelta(dx, dy) => Some(Decision::MouseMove(dx, dy)),
        Action::ToggleLayer(_) | Action::ArmLayer(_) => None,
    }
}
