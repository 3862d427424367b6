//! saavy - terminal polysynth
//!
//! Run with: cargo run -- [preset name]
//!
//! Logs go to `saavy.log` (filter with `RUST_LOG`) so they do not draw over
//! the TUI.

mod app;
mod ui;

use std::fs::File;

use app::Saavy;
use color_eyre::eyre::WrapErr;

const LOG_FILE: &str = "saavy.log";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut saavy = Saavy::new().voices(8);
    if let Some(preset) = std::env::args().nth(1) {
        saavy = saavy.preset(preset);
    }
    saavy.run()
}

fn init_logging() -> color_eyre::Result<()> {
    let file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {LOG_FILE}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
