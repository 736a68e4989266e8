//! Hand landmark geometry: the 21-point set produced by a hand-pose model.

/// One tracked point in video-pixel space. `z` is relative depth and is not
/// consulted by the classifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub const LANDMARK_COUNT: usize = 21;

/// Ordered set of exactly 21 landmarks. Indices follow the anatomical
/// convention: 0 = wrist, 1–4 = thumb (base→tip), 5–8 = index,
/// 9–12 = middle, 13–16 = ring, 17–20 = pinky.
pub type LandmarkSet = [Landmark; LANDMARK_COUNT];

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;

/// One of the five fingers, in landmark order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    fn ordinal(self) -> usize {
        match self {
            Finger::Thumb => 0,
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Ring => 3,
            Finger::Pinky => 4,
        }
    }

    /// Metacarpophalangeal joint (finger base) landmark index.
    pub fn base(self) -> usize {
        self.ordinal() * 4 + 1
    }

    /// Fingertip landmark index.
    pub fn tip(self) -> usize {
        self.ordinal() * 4 + 4
    }
}

/// Builds a synthetic hand with the requested fingers extended, laid out so
/// the default thresholds classify it unambiguously. The wrist sits at
/// `wrist_x` for palm-position tests.
#[cfg(test)]
pub(crate) fn test_hand(
    thumb: bool,
    index: bool,
    middle: bool,
    ring: bool,
    pinky: bool,
    wrist_x: f32,
) -> LandmarkSet {
    let mut set = [Landmark {
        x: 100.0,
        y: 200.0,
        z: 0.0,
    }; LANDMARK_COUNT];
    set[WRIST].x = wrist_x;
    set[WRIST].y = 220.0;

    // Thumb flexes sideways: extended = tip well left of the IP joint.
    set[THUMB_TIP].x = if thumb { 80.0 } else { 100.0 };

    for (finger, up) in [
        (Finger::Index, index),
        (Finger::Middle, middle),
        (Finger::Ring, ring),
        (Finger::Pinky, pinky),
    ] {
        set[finger.tip()].y = if up { 150.0 } else { 200.0 };
    }
    set
}
