mod cli;
mod config;
mod fingers;
mod gestures;
mod landmarks;
mod logging;
mod mixer;
mod session;
mod sinks;
mod source;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
