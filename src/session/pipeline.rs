//! The frame loop: one landmark set per frame through classify → select →
//! steer → publish.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{SessionState, Sinks};
use crate::config::Config;
use crate::fingers::FingerStates;
use crate::landmarks::WRIST;
use crate::mixer::Mixer;
use crate::source::{LandmarkSource, SourceEvent};

const IDLE_POLL: Duration = Duration::from_millis(4);

/// Drives the pipeline until the source drains or the stop flag is raised.
///
/// Frames are strictly serialized: the next poll is not issued until the
/// previous one resolved and its frame went through the mixer. A failed poll
/// only skips that frame; a pending source (e.g. capture dimensions not yet
/// known) is retried after a short sleep.
pub fn run_session<S: LandmarkSource>(
    source: &mut S,
    sinks: &mut Sinks,
    config: &Arc<Mutex<Config>>,
    state: &Arc<Mutex<SessionState>>,
    stop: &Arc<AtomicBool>,
) -> Result<()> {
    let mut mixer = Mixer::new();
    let mut hand_present = false;

    // Sinks start from the session's initial values.
    sinks.audio.apply(mixer.params())?;
    sinks.ui.show(mixer.mode(), hand_present)?;

    while !stop.load(Ordering::Relaxed) {
        let event = match source.poll() {
            Ok(ev) => ev,
            Err(e) => {
                // A single bad frame never ends the session; the sleep keeps
                // a persistently failing source from spinning the loop hot.
                warn!("detection failed, skipping frame: {e}");
                thread::sleep(IDLE_POLL);
                continue;
            }
        };

        let (width, hand) = match event {
            SourceEvent::Pending => {
                thread::sleep(IDLE_POLL);
                continue;
            }
            SourceEvent::End => {
                info!("landmark source drained");
                break;
            }
            SourceEvent::Frame { width, hand, .. } => (width, hand),
        };

        let mode_was = mixer.mode();
        let was_present = hand_present;

        match hand {
            None => {
                hand_present = false;
            }
            Some(set) => {
                hand_present = true;
                if let Err(e) = sinks.overlay.draw(&set) {
                    error!("overlay sink failed: {e}");
                }
                let th = { config.lock().unwrap().thresholds.clone() };
                let states = FingerStates::from_landmarks(&set, &th);
                let nx = set[WRIST].x / width as f32;
                let update = mixer.advance(&states, nx);
                if let (Some(g), true) = (update.gesture, update.mode_changed) {
                    debug!("gesture {} selects {}", g.as_str(), mixer.mode().as_str());
                }
                if update.params_changed {
                    if let Err(e) = sinks.audio.apply(mixer.params()) {
                        error!("audio sink failed: {e}");
                    }
                }
            }
        }

        if mixer.mode() != mode_was || hand_present != was_present {
            if let Err(e) = sinks.ui.show(mixer.mode(), hand_present) {
                error!("ui sink failed: {e}");
            }
        }

        let mut st = state.lock().unwrap();
        st.mode = mixer.mode();
        st.params = *mixer.params();
        st.hand_present = hand_present;
        st.frames += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LandmarkSet, test_hand};
    use crate::mixer::{ControlMode, MixerParams};
    use crate::sinks::{AudioSink, OverlaySink, UiSink};
    use crate::source::SourceError;
    use std::collections::VecDeque;

    struct ScriptSource {
        events: VecDeque<Result<SourceEvent, SourceError>>,
    }

    impl ScriptSource {
        fn new(events: Vec<Result<SourceEvent, SourceError>>) -> Self {
            Self {
                events: events.into(),
            }
        }
    }

    impl LandmarkSource for ScriptSource {
        fn poll(&mut self) -> Result<SourceEvent, SourceError> {
            self.events.pop_front().unwrap_or(Ok(SourceEvent::End))
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        inner: Arc<Mutex<Record>>,
    }

    #[derive(Default)]
    struct Record {
        applies: Vec<MixerParams>,
        shows: Vec<(ControlMode, bool)>,
        draws: usize,
    }

    impl AudioSink for Recorder {
        fn apply(&mut self, params: &MixerParams) -> Result<()> {
            self.inner.lock().unwrap().applies.push(*params);
            Ok(())
        }
    }

    impl OverlaySink for Recorder {
        fn draw(&mut self, _hand: &LandmarkSet) -> Result<()> {
            self.inner.lock().unwrap().draws += 1;
            Ok(())
        }
    }

    impl UiSink for Recorder {
        fn show(&mut self, mode: ControlMode, hand_present: bool) -> Result<()> {
            self.inner.lock().unwrap().shows.push((mode, hand_present));
            Ok(())
        }
    }

    fn frame(hand: Option<LandmarkSet>) -> Result<SourceEvent, SourceError> {
        Ok(SourceEvent::Frame {
            width: 640,
            height: 480,
            hand,
        })
    }

    fn harness(
        events: Vec<Result<SourceEvent, SourceError>>,
    ) -> (Recorder, Arc<Mutex<SessionState>>) {
        let rec = Recorder::default();
        let mut sinks = Sinks {
            audio: Box::new(rec.clone()),
            overlay: Box::new(rec.clone()),
            ui: Box::new(rec.clone()),
        };
        let config = Arc::new(Mutex::new(Config::default()));
        let state = Arc::new(Mutex::new(SessionState::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = ScriptSource::new(events);
        run_session(&mut source, &mut sinks, &config, &state, &stop).unwrap();
        (rec, state)
    }

    #[test]
    fn fifty_handless_frames_change_nothing() {
        let events = (0..50).map(|_| frame(None)).collect();
        let (rec, state) = harness(events);
        let record = rec.inner.lock().unwrap();
        // Only the initial publish; no value ever moved.
        assert_eq!(record.applies, vec![MixerParams::default()]);
        assert_eq!(record.shows, vec![(ControlMode::All, false)]);
        assert_eq!(record.draws, 0);
        let st = state.lock().unwrap();
        assert_eq!(st.frames, 50);
        assert!(!st.hand_present);
        assert_eq!(st.mode, ControlMode::All);
    }

    #[test]
    fn hand_frames_drive_params_and_ui() {
        // Horns at the right edge, then point at the left edge.
        let horns = test_hand(false, true, false, false, true, 640.0);
        let point = test_hand(false, true, false, false, false, 0.0);
        let (rec, state) = harness(vec![frame(Some(horns)), frame(Some(point))]);
        let record = rec.inner.lock().unwrap();
        assert_eq!(record.draws, 2);
        assert_eq!(record.applies.len(), 3);
        assert_eq!(record.applies[1].volume, 100);
        assert_eq!(record.applies[2].low_gain, -12);
        assert_eq!(record.applies[2].volume, 100);
        assert_eq!(
            record.shows,
            vec![
                (ControlMode::All, false),
                (ControlMode::Volume, true),
                (ControlMode::LowEq, true),
            ]
        );
        assert_eq!(state.lock().unwrap().mode, ControlMode::LowEq);
    }

    #[test]
    fn detection_error_skips_the_frame() {
        let horns = test_hand(false, true, false, false, true, 320.0);
        let (rec, state) = harness(vec![
            Err(SourceError::MalformedLandmarks(7)),
            frame(Some(horns)),
        ]);
        let record = rec.inner.lock().unwrap();
        // The bad poll is skipped; the next frame still lands.
        assert_eq!(record.applies.len(), 2);
        assert_eq!(record.applies[1].volume, 50);
        assert_eq!(state.lock().unwrap().frames, 1);
    }

    #[test]
    fn failing_polls_back_off_instead_of_spinning() {
        let errors = (0..5)
            .map(|_| Err(SourceError::MalformedLandmarks(0)))
            .collect();
        let started = std::time::Instant::now();
        let (rec, state) = harness(errors);
        // Five failed polls each sleep the idle interval before retrying.
        assert!(started.elapsed() >= IDLE_POLL * 4);
        assert_eq!(state.lock().unwrap().frames, 0);
        assert_eq!(rec.inner.lock().unwrap().applies.len(), 1);
    }

    #[test]
    fn pending_frames_stall_without_side_effects() {
        let (rec, state) = harness(vec![
            Ok(SourceEvent::Pending),
            Ok(SourceEvent::Pending),
            frame(None),
        ]);
        let record = rec.inner.lock().unwrap();
        assert_eq!(record.applies.len(), 1);
        assert_eq!(state.lock().unwrap().frames, 1);
    }

    #[test]
    fn hand_loss_flips_presence_once() {
        let fist = test_hand(false, false, false, false, false, 320.0);
        let (rec, _state) = harness(vec![
            frame(Some(fist)),
            frame(None),
            frame(None),
            frame(None),
        ]);
        let record = rec.inner.lock().unwrap();
        assert_eq!(
            record.shows,
            vec![
                (ControlMode::All, false),
                (ControlMode::Reverb, true),
                (ControlMode::Reverb, false),
            ]
        );
    }

    #[test]
    fn raised_stop_flag_prevents_polling() {
        let rec = Recorder::default();
        let mut sinks = Sinks {
            audio: Box::new(rec.clone()),
            overlay: Box::new(rec.clone()),
            ui: Box::new(rec.clone()),
        };
        let config = Arc::new(Mutex::new(Config::default()));
        let state = Arc::new(Mutex::new(SessionState::new()));
        let stop = Arc::new(AtomicBool::new(true));
        let horns = test_hand(false, true, false, false, true, 640.0);
        let mut source = ScriptSource::new(vec![frame(Some(horns))]);
        run_session(&mut source, &mut sinks, &config, &state, &stop).unwrap();
        assert_eq!(state.lock().unwrap().frames, 0);
        // Only the initial publish went out.
        assert_eq!(rec.inner.lock().unwrap().applies.len(), 1);
    }
}
