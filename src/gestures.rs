//! Gesture classification: a fixed pattern table over finger states.

use crate::fingers::FingerStates;

/// Recognized hand gestures. Each is a well-known informal hand sign chosen
/// to be geometrically distinct under partial finger-detection noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Horns: index + pinky extended.
    Volume,
    /// Point: index only.
    LowEq,
    /// Peace: index + middle.
    HighEq,
    /// Fist: nothing extended.
    Reverb,
    /// Open palm: everything extended.
    All,
}

impl Gesture {
    /// String form used in IPC and sink output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::LowEq => "lowEQ",
            Self::HighEq => "highEQ",
            Self::Reverb => "reverb",
            Self::All => "all",
        }
    }
}

/// Classifies one frame's finger states, `None` for anything off-table.
///
/// The rows are distinct truth assignments, so at most one can match; the
/// order mirrors the recognition table for readability. There is
/// deliberately no row selecting the mid band — it is only ever adjusted
/// directly, never via gesture.
pub fn classify(states: &FingerStates) -> Option<Gesture> {
    match states.as_array() {
        // thumb, index, middle, ring, pinky
        [false, true, false, false, true] => Some(Gesture::Volume),
        [false, true, false, false, false] => Some(Gesture::LowEq),
        [false, true, true, false, false] => Some(Gesture::HighEq),
        [false, false, false, false, false] => Some(Gesture::Reverb),
        [true, true, true, true, true] => Some(Gesture::All),
        _ => None,
    }
}
