//! Mixer control state: the active-control state machine and the mapping
//! from normalized palm position onto bounded parameter values.

use serde::Serialize;

use crate::fingers::FingerStates;
use crate::gestures::{self, Gesture};

pub const VOLUME_RANGE: (u8, u8) = (0, 100);
pub const EQ_GAIN_RANGE_DB: (i8, i8) = (-12, 12);
pub const REVERB_RANGE: (f32, f32) = (0.0, 1.0);

/// The parameter currently steered by hand position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Volume,
    LowEq,
    /// Has no selector gesture; kept as a state so the enum covers the full
    /// mixer surface, but nothing ever transitions into it.
    MidEq,
    HighEq,
    Reverb,
    All,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::LowEq => "lowEQ",
            Self::MidEq => "midEQ",
            Self::HighEq => "highEQ",
            Self::Reverb => "reverb",
            Self::All => "all",
        }
    }
}

impl From<Gesture> for ControlMode {
    fn from(g: Gesture) -> Self {
        match g {
            Gesture::Volume => Self::Volume,
            Gesture::LowEq => Self::LowEq,
            Gesture::HighEq => Self::HighEq,
            Gesture::Reverb => Self::Reverb,
            Gesture::All => Self::All,
        }
    }
}

/// Full parameter block handed to the audio sink on every change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixerParams {
    /// Master volume, percent.
    pub volume: u8,
    /// Low-shelf gain, dB.
    pub low_gain: i8,
    /// Peaking mid gain, dB. Never written by the mapper.
    pub mid_gain: i8,
    /// High-shelf gain, dB.
    pub high_gain: i8,
    /// Reverb wet fraction, two-decimal steps.
    pub reverb_mix: f32,
}

impl Default for MixerParams {
    fn default() -> Self {
        Self {
            volume: 75,
            low_gain: 0,
            mid_gain: 0,
            high_gain: 0,
            reverb_mix: 0.0,
        }
    }
}

/// What one frame did to the mixer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    pub gesture: Option<Gesture>,
    pub mode_changed: bool,
    pub params_changed: bool,
}

/// Which single parameter a frame adjusts.
#[derive(Debug, Clone, Copy)]
enum Target {
    Volume,
    LowGain,
    HighGain,
    ReverbMix,
}

fn target_of_mode(mode: ControlMode) -> Option<Target> {
    match mode {
        ControlMode::Volume => Some(Target::Volume),
        ControlMode::LowEq => Some(Target::LowGain),
        ControlMode::HighEq => Some(Target::HighGain),
        ControlMode::Reverb => Some(Target::ReverbMix),
        // The mid band holds its last value; "all" selects everything and
        // writes nothing until a single-control gesture takes over.
        ControlMode::MidEq | ControlMode::All => None,
    }
}

/// Session-lifetime mixer state. Mutated only from the frame loop, so there
/// is no interior locking here; the session wraps snapshots for readers.
#[derive(Debug)]
pub struct Mixer {
    mode: ControlMode,
    params: MixerParams,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            mode: ControlMode::All,
            params: MixerParams::default(),
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn params(&self) -> &MixerParams {
        &self.params
    }

    /// Runs one frame's finger states and normalized palm x through the
    /// state machine and the mapper. Without a recognized gesture this frame
    /// nothing is written at all; the state is sticky across any number of
    /// unrecognized frames.
    pub fn advance(&mut self, states: &FingerStates, nx: f32) -> FrameUpdate {
        let Some(gesture) = gestures::classify(states) else {
            return FrameUpdate::default();
        };
        let mode_changed = self.select(gesture);
        let params_changed = self.steer(nx);
        FrameUpdate {
            gesture: Some(gesture),
            mode_changed,
            params_changed,
        }
    }

    /// Transition rule: a recognized gesture that differs from the current
    /// mode replaces it. The same gesture repeated is a no-op.
    fn select(&mut self, gesture: Gesture) -> bool {
        let next = ControlMode::from(gesture);
        if next != self.mode {
            self.mode = next;
            true
        } else {
            false
        }
    }

    /// Maps `nx` (palm x / frame width, 0 = left edge) onto the parameter
    /// selected by the current mode. `select` has already folded this
    /// frame's gesture into the mode, so reaching here in "all" mode means
    /// the gesture was the open palm itself, which adjusts nothing; any
    /// single-control gesture has already switched the mode and is steered
    /// directly. Returns whether any value actually moved.
    fn steer(&mut self, nx: f32) -> bool {
        let Some(target) = target_of_mode(self.mode) else {
            return false;
        };

        let before = self.params;
        match target {
            Target::Volume => self.params.volume = map_volume(nx),
            Target::LowGain => self.params.low_gain = map_gain(nx),
            Target::HighGain => self.params.high_gain = map_gain(nx),
            Target::ReverbMix => self.params.reverb_mix = map_reverb(nx),
        }
        self.params != before
    }
}

// Outputs are clamped before rounding; `f32::round` ties away from zero.

fn map_volume(nx: f32) -> u8 {
    (nx * 100.0).clamp(0.0, 100.0).round() as u8
}

fn map_gain(nx: f32) -> i8 {
    (nx * 24.0 - 12.0).clamp(-12.0, 12.0).round() as i8
}

fn map_reverb(nx: f32) -> f32 {
    (nx.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
