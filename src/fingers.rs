//! Finger-extension classification: landmarks in, five booleans out.

use crate::config::Thresholds;
use crate::landmarks::{Finger, LandmarkSet, THUMB_IP, THUMB_TIP};

/// Per-finger extension states for one frame, ordered thumb → pinky.
/// Recomputed every frame, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerStates([bool; 5]);

impl FingerStates {
    pub fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self([thumb, index, middle, ring, pinky])
    }

    pub fn from_landmarks(set: &LandmarkSet, th: &Thresholds) -> Self {
        Self(Finger::ALL.map(|f| is_extended(set, f, th)))
    }

    pub fn as_array(&self) -> [bool; 5] {
        self.0
    }
}

/// `true` if `finger` reads as extended in this frame.
///
/// The thumb flexes in the image-plane x axis, so its tip is compared
/// sideways against the interphalangeal joint. The other fingers point
/// upward in typical camera framing, so their tip must sit above the finger
/// base (smaller y). Both comparisons carry a pixel deadband against jitter.
/// Callers must supply a full 21-point set; shorter input is out of contract.
pub fn is_extended(set: &LandmarkSet, finger: Finger, th: &Thresholds) -> bool {
    match finger {
        Finger::Thumb => set[THUMB_TIP].x < set[THUMB_IP].x - th.thumb_dx,
        other => set[other.tip()].y < set[other.base()].y - th.finger_dy,
    }
}
