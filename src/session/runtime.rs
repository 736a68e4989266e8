//! Runtime path for the control socket.

use directories::UserDirs;
use std::{fs, path::PathBuf};

/// `~/.local/run/handmix.sock`; the directory is created on demand.
pub fn socket_path() -> PathBuf {
    let home = UserDirs::new().unwrap().home_dir().to_path_buf();
    let dir = home.join(".local").join("run");
    let _ = fs::create_dir_all(&dir);
    dir.join("handmix.sock")
}
