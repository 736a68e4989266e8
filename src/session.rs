//! Session orchestration: one frame loop, one control socket, one stop flag.

pub mod pipeline;
pub mod runtime;
pub mod server;

use anyhow::Result;
use log::{error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::Config;
use crate::mixer::{ControlMode, MixerParams};
use crate::sinks::{AudioSink, JsonlSink, NullSink, OverlaySink, UiSink};
use crate::source::TraceSource;

/// Latest published pipeline state, read by the IPC server for `status`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub mode: ControlMode,
    pub params: MixerParams,
    pub hand_present: bool,
    pub frames: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            mode: ControlMode::All,
            params: MixerParams::default(),
            hand_present: false,
            frames: 0,
        }
    }
}

/// The three output seams the frame loop publishes to.
pub struct Sinks {
    pub audio: Box<dyn AudioSink>,
    pub overlay: Box<dyn OverlaySink>,
    pub ui: Box<dyn UiSink>,
}

/// Runs a session in the foreground: frame loop on this thread, control
/// socket on a helper thread, both wound down by the shared stop flag
/// (SIGINT/SIGTERM or the IPC shutdown op).
pub fn run(trace: Option<&Path>, config_path: Option<&Path>, overlay: bool) -> Result<()> {
    // The reload op re-reads whatever file this session was started with,
    // so the resolved path travels with the shared config.
    let (config, config_file) = match config_path {
        Some(p) => (Config::load(p)?, p.to_path_buf()),
        None => (
            Config::load_or_install_default()?,
            crate::config::config_path(),
        ),
    };
    let config = Arc::new(Mutex::new(config));
    let state = Arc::new(Mutex::new(SessionState::new()));
    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, stop.clone())?;
    signal_hook::flag::register(SIGTERM, stop.clone())?;

    let server = {
        let state = state.clone();
        let config = config.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            if let Err(e) = server::serve(state, config, config_file, stop) {
                error!("control socket failed: {e}");
            }
        })
    };

    let overlay_sink: Box<dyn OverlaySink> = if overlay {
        Box::new(JsonlSink::stdout())
    } else {
        Box::new(NullSink)
    };
    let mut sinks = Sinks {
        audio: Box::new(JsonlSink::stdout()),
        overlay: overlay_sink,
        ui: Box::new(JsonlSink::stdout()),
    };

    let result = match trace {
        Some(p) if p != Path::new("-") => {
            let mut source = TraceSource::open(p)?;
            pipeline::run_session(&mut source, &mut sinks, &config, &state, &stop)
        }
        _ => {
            info!("reading landmark trace from stdin");
            let mut source = TraceSource::new(io::stdin());
            pipeline::run_session(&mut source, &mut sinks, &config, &state, &stop)
        }
    };

    stop.store(true, Ordering::Relaxed);
    let _ = server.join();
    result
}
