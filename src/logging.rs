//! Process-wide logger setup. Logs go to stderr so the JSONL sink output on
//! stdout stays machine-readable; `RUST_LOG` overrides the default level.

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
