use anyhow::Result;
use pico_args::Arguments;
use std::{env, path::PathBuf};

use crate::config::Config;
use crate::session::{self, server};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("run") => {
            let trace: Option<PathBuf> = pargs.opt_value_from_str("--trace")?;
            let config: Option<PathBuf> = pargs.opt_value_from_str("--config")?;
            let overlay = pargs.contains("--overlay");
            session::run(trace.as_deref(), config.as_deref(), overlay)
        }

        Some("status") => {
            let r = server::client_request(serde_json::json!({"op":"status"}))?;
            print_response(&r);
            Ok(())
        }

        Some("reload") => {
            let r = server::client_request(serde_json::json!({"op":"reload"}))?;
            print_response(&r);
            Ok(())
        }

        Some("stop") => {
            let r = server::client_request(serde_json::json!({"op":"shutdown"}))?;
            print_response(&r);
            Ok(())
        }

        Some("doctor") => {
            let cfg = Config::load_or_install_default()?;
            print_response(&cfg.doctor_report());
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"handmix — hand-gesture mixer control

USAGE:
  handmix help [command]            Show general or command-specific help
  handmix run [--trace <file>]      Run a session over a landmark trace
              [--config <file>]     (default: read JSONL frames from stdin)
              [--overlay]           Also emit overlay points per frame
  handmix status                    Show the running session's mixer state
  handmix reload                    Re-read the session's config file
  handmix stop                      Stop the running session
  handmix doctor                    Print config path, thresholds and ranges

GESTURES:
  horns (index + pinky)   volume      point (index only)     low EQ
  peace (index + middle)  high EQ     fist                   reverb
  open palm               all-controls mode
  Move the hand left (low) to right (high) to sweep the selected parameter.

TIPS:
  - Config: ~/.config/handmix/config.toml
  - Parameter changes stream to stdout as JSON lines; logs go to stderr
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: handmix run [--trace <file>] [--config <file>] [--overlay]\n\
             Plays a JSONL landmark trace (file, or stdin when omitted or '-')\n\
             through the gesture pipeline and streams parameter changes to\n\
             stdout. A control socket answers status/reload/stop meanwhile."
        ),
        "status" => println!(
            "usage: handmix status\nShows active control, parameter values, hand presence and frame count."
        ),
        "reload" => println!(
            "usage: handmix reload\nRe-reads the config file the running session was started with\n(--config override, or ~/.config/handmix/config.toml)."
        ),
        "stop" => println!("usage: handmix stop\nAsks the running session to wind down."),
        "doctor" => println!(
            "usage: handmix doctor\nPrints the config path, classifier thresholds and parameter ranges."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
