//! Landmark frame sources.
//!
//! The live detector (webcam + hand-pose model) is an external collaborator;
//! what the session consumes is anything implementing [`LandmarkSource`].
//! [`TraceSource`] plays back a recorded JSONL trace, one record per video
//! frame:
//!
//! ```text
//! {"width":640,"height":480,"hands":[[[x,y,z], ...21 points]]}
//! {"width":640,"height":480,"hands":[]}
//! ```

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;
use thiserror::Error;

use crate::landmarks::{LANDMARK_COUNT, Landmark, LandmarkSet};

/// Failures at the landmark-source boundary. All of these are recoverable at
/// the session level: log, skip the frame, poll again.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    /// The pipeline contract requires exactly 21 points per hand; anything
    /// else is rejected here so the classifiers never see it.
    #[error("malformed landmark set: expected {LANDMARK_COUNT} points, got {0}")]
    MalformedLandmarks(usize),
}

/// One polled step of a landmark source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A decoded video frame with non-zero dimensions, carrying the first
    /// detected hand if any.
    Frame {
        width: u32,
        height: u32,
        hand: Option<LandmarkSet>,
    },
    /// The source is alive but has nothing usable yet, e.g. the capture
    /// stream has not reported its dimensions. The session keeps polling.
    Pending,
    /// The source is exhausted; the session winds down.
    End,
}

/// Anything that can produce landmark frames, one per poll.
///
/// A poll may block while the underlying detector runs; the session never
/// issues overlapping polls, so implementations need no internal locking.
pub trait LandmarkSource {
    fn poll(&mut self) -> Result<SourceEvent, SourceError>;
}

#[derive(Debug, Deserialize)]
struct TraceRecord {
    width: u32,
    height: u32,
    /// Detected hands, 21 `[x, y, z]` points each. Only the first is used;
    /// extra hands are ignored.
    #[serde(default)]
    hands: Vec<Vec<[f32; 3]>>,
}

/// Plays back a JSONL landmark trace.
pub struct TraceSource<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: Read> TraceSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

impl TraceSource<File> {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("failed to open trace {}: {e}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<R: Read> LandmarkSource for TraceSource<R> {
    fn poll(&mut self) -> Result<SourceEvent, SourceError> {
        let Some(line) = self.lines.next() else {
            return Ok(SourceEvent::End);
        };
        let line = line?;
        if line.trim().is_empty() {
            return Ok(SourceEvent::Pending);
        }
        let rec: TraceRecord = serde_json::from_str(&line)?;
        if rec.width == 0 || rec.height == 0 {
            // Capture stream not ready yet; stall gracefully.
            return Ok(SourceEvent::Pending);
        }
        let hand = match rec.hands.first() {
            None => None,
            Some(points) => Some(landmark_set(points)?),
        };
        Ok(SourceEvent::Frame {
            width: rec.width,
            height: rec.height,
            hand,
        })
    }
}

fn landmark_set(points: &[[f32; 3]]) -> Result<LandmarkSet, SourceError> {
    if points.len() != LANDMARK_COUNT {
        return Err(SourceError::MalformedLandmarks(points.len()));
    }
    let mut set = [Landmark::default(); LANDMARK_COUNT];
    for (slot, [x, y, z]) in set.iter_mut().zip(points) {
        *slot = Landmark {
            x: *x,
            y: *y,
            z: *z,
        };
    }
    Ok(set)
}
