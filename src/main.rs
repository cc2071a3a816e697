//! Roundmix - assemble songs and silent breaks into one audio file.
//!
//! Reads a sources file of YouTube/Spotify links and `Break: N` lines,
//! works out the playback order (inserting a break between consecutive
//! songs), then downloads, trims and concatenates everything with spotdl
//! and ffmpeg.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod round;
#[cfg(test)]
pub mod test_utils;
pub mod tools;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("roundmix=info".parse()?))
        .init();

    cli::run_command(&args)
}
