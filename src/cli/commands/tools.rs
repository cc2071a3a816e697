//! Tool check and config commands.

use std::path::Path;

use crate::config::{self, Config};
use crate::tools::ffmpeg::FFMPEG_PATHS;
use crate::tools::spotdl::SPOTDL_PATHS;
use crate::tools::{find_tool, tool_version};

/// Check if ffmpeg and spotdl are installed
pub fn cmd_check_tools(ffmpeg: Option<&Path>, downloader: Option<&Path>) -> anyhow::Result<()> {
    println!("Checking external tools...\n");

    let mut missing = 0;

    match find_tool(ffmpeg, FFMPEG_PATHS, "-version") {
        Some(path) => {
            let version = tool_version(&path, "-version").unwrap_or_default();
            println!("✓ ffmpeg: {} ({})", version, path.display());
        }
        None => {
            missing += 1;
            println!("✗ ffmpeg not found");
            println!("  Windows: winget install Gyan.FFmpeg");
            println!("  macOS:   brew install ffmpeg");
            println!("  Linux:   apt install ffmpeg");
        }
    }

    match find_tool(downloader, SPOTDL_PATHS, "--version") {
        Some(path) => {
            let version = tool_version(&path, "--version").unwrap_or_default();
            println!("✓ spotdl: {} ({})", version, path.display());
        }
        None => {
            missing += 1;
            println!("✗ spotdl not found (only needed when downloading)");
            println!("  Install: pip install spotdl");
        }
    }

    if missing > 0 {
        println!("\n{} tool(s) missing.", missing);
    } else {
        println!("\nAll tools available.");
    }
    Ok(())
}

/// Write the current settings to a config file
pub fn cmd_init_config(path: Option<&Path>, config: &Config, force: bool) -> anyhow::Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if target.exists() && !force {
        println!("Config already exists at {}", target.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    config::save_to(config, &target)?;
    println!("Wrote config to {}", target.display());
    Ok(())
}
