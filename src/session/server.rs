//! Control socket: newline-delimited JSON requests against a running
//! session. Ops: status, reload, shutdown.

use anyhow::Result;
use log::{error, info};
use std::{
    io::{BufRead, BufReader, Write},
    os::unix::net::{UnixListener, UnixStream},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use super::SessionState;
use super::runtime::socket_path;
use crate::config::Config;

/// Accepts clients until the stop flag is raised, then removes the socket.
/// `config_file` is the file this session's config was loaded from; the
/// reload op re-reads that file, not a fixed default location.
pub fn serve(
    state: Arc<Mutex<SessionState>>,
    config: Arc<Mutex<Config>>,
    config_file: PathBuf,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let sock = socket_path();
    if sock.exists() {
        let _ = std::fs::remove_file(&sock);
    }
    let listener = UnixListener::bind(&sock)?;
    listener.set_nonblocking(true)?;
    info!("session: listening on {}", sock.display());

    while !stop.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _)) => {
                let state = state.clone();
                let config = config.clone();
                let config_file = config_file.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_client(stream, state, config, config_file, stop) {
                        error!("ipc client error: {e}");
                    }
                });
            }
            Err(_) => thread::sleep(Duration::from_millis(5)),
        }
    }

    let _ = std::fs::remove_file(&sock);
    Ok(())
}

fn handle_client(
    mut stream: UnixStream,
    state: Arc<Mutex<SessionState>>,
    config: Arc<Mutex<Config>>,
    config_file: PathBuf,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim().is_empty() {
        return Ok(());
    }
    let req: serde_json::Value = serde_json::from_str(&line)?;
    let resp = respond(&req, &state, &config, &config_file, &stop);
    writeln!(stream, "{resp}")?;
    Ok(())
}

fn respond(
    req: &serde_json::Value,
    state: &Arc<Mutex<SessionState>>,
    config: &Arc<Mutex<Config>>,
    config_file: &Path,
    stop: &Arc<AtomicBool>,
) -> serde_json::Value {
    let op = req.get("op").and_then(|v| v.as_str()).unwrap_or("");
    match op {
        "status" => {
            let st = state.lock().unwrap().clone();
            serde_json::json!({"ok": true, "data": {
                "active_control": st.mode.as_str(),
                "params": st.params,
                "hand_present": st.hand_present,
                "frames": st.frames,
            }})
        }
        "reload" => match Config::load(config_file) {
            Ok(fresh) => {
                *config.lock().unwrap() = fresh;
                info!("config reloaded from {}", config_file.display());
                serde_json::json!({"ok": true, "data": "reloaded"})
            }
            Err(e) => serde_json::json!({"ok": false, "error": e.to_string()}),
        },
        "shutdown" => {
            stop.store(true, Ordering::Relaxed);
            serde_json::json!({"ok": true, "data": "shutting down"})
        }
        _ => serde_json::json!({"ok": false, "error": format!("unknown op: {op}")}),
    }
}

/// Sends one request to a running session and returns its response.
pub fn client_request(req: serde_json::Value) -> Result<serde_json::Value> {
    let sock = socket_path();
    if !sock.exists() {
        return Err(anyhow::anyhow!(
            "no handmix session is running (socket missing at {})",
            sock.display()
        ));
    }
    let mut stream = UnixStream::connect(sock)?;
    let line = serde_json::to_string(&req)? + "\n";
    stream.write_all(line.as_bytes())?;
    let mut reader = BufReader::new(stream);
    let mut resp = String::new();
    reader.read_line(&mut resp)?;
    Ok(serde_json::from_str(&resp)?)
}
