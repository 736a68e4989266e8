//! Output seams for the frame loop: audio engine, render overlay, UI state.
//! The session only classifies; what the values drive lives behind these
//! traits.

use anyhow::Result;
use std::io::{self, Write};

use crate::landmarks::LandmarkSet;
use crate::mixer::{ControlMode, MixerParams};

/// Receives the full parameter block on every change. The sink owns how the
/// values map to actual signal processing.
pub trait AudioSink {
    fn apply(&mut self, params: &MixerParams) -> Result<()>;
}

/// Receives the raw landmark set whenever a hand is present, for rendering.
pub trait OverlaySink {
    fn draw(&mut self, hand: &LandmarkSet) -> Result<()>;
}

/// Receives the active control and hand-present flag for display.
pub trait UiSink {
    fn show(&mut self, mode: ControlMode, hand_present: bool) -> Result<()>;
}

/// Emits sink traffic as JSON lines on a writer; the CLI points this at
/// stdout so a downstream audio process can consume the stream.
pub struct JsonlSink<W: Write> {
    out: W,
}

impl JsonlSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AudioSink for JsonlSink<W> {
    fn apply(&mut self, params: &MixerParams) -> Result<()> {
        let line = serde_json::json!({"event": "params", "params": params});
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

impl<W: Write> OverlaySink for JsonlSink<W> {
    fn draw(&mut self, hand: &LandmarkSet) -> Result<()> {
        let points: Vec<[f32; 3]> = hand.iter().map(|l| [l.x, l.y, l.z]).collect();
        let line = serde_json::json!({"event": "overlay", "points": points});
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

impl<W: Write> UiSink for JsonlSink<W> {
    fn show(&mut self, mode: ControlMode, hand_present: bool) -> Result<()> {
        let line = serde_json::json!({
            "event": "ui",
            "active_control": mode.as_str(),
            "hand_present": hand_present,
        });
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

/// Discards everything. Stands in for the overlay by default, since dumping
/// 21 points per frame is only worth it when something renders them.
pub struct NullSink;

impl AudioSink for NullSink {
    fn apply(&mut self, _params: &MixerParams) -> Result<()> {
        Ok(())
    }
}

impl OverlaySink for NullSink {
    fn draw(&mut self, _hand: &LandmarkSet) -> Result<()> {
        Ok(())
    }
}

impl UiSink for NullSink {
    fn show(&mut self, _mode: ControlMode, _hand_present: bool) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_serialize_as_one_json_line() {
        let mut buf = Vec::new();
        let mut sink = JsonlSink::new(&mut buf);
        sink.apply(&MixerParams::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(v["event"], "params");
        assert_eq!(v["params"]["volume"], 75);
        assert_eq!(v["params"]["mid_gain"], 0);
    }

    #[test]
    fn ui_line_carries_mode_and_presence() {
        let mut buf = Vec::new();
        let mut sink = JsonlSink::new(&mut buf);
        sink.show(ControlMode::LowEq, true).unwrap();
        let v: serde_json::Value = serde_json::from_str(String::from_utf8(buf).unwrap().trim())
            .unwrap();
        assert_eq!(v["active_control"], "lowEQ");
        assert_eq!(v["hand_present"], true);
    }
}
