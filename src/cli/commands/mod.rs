//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `build`: parse the sources file and render the round
//! - `plan`: show the rendering order and concat list without running tools
//! - `tools`: check external tools, write a default config

mod build;
mod plan;
mod tools;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::round::{ArtifactDir, ParsedSource, RoundList, parse_source_file};

pub use build::cmd_build;
pub use plan::cmd_plan;
pub use tools::{cmd_check_tools, cmd_init_config};

const DEFAULT_SOURCES: &str = "sources.txt";
const DEFAULT_OUTPUT: &str = "rounds.mp3";

/// Roundmix CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the one in the OS config directory
    #[arg(long, global = true, env = "ROUNDMIX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments shared by commands that read a sources file
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// The path to the sources file
    #[arg(short, long, default_value = DEFAULT_SOURCES)]
    pub sources: PathBuf,
    /// Directory for downloads, trimmed songs and silence clips
    #[arg(short, long)]
    pub artifacts_dir: Option<PathBuf>,
    /// Seconds of silence inserted between songs without an explicit break
    #[arg(long)]
    pub song_break: Option<u32>,
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            sources: PathBuf::from(DEFAULT_SOURCES),
            artifacts_dir: None,
            song_break: None,
        }
    }
}

/// Arguments of the `build` command
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output file (mp3)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    /// Use songs already in the artifacts directory instead of downloading
    #[arg(long)]
    pub no_download: bool,
    /// Download songs one at a time
    #[arg(long)]
    pub single_threaded: bool,
    /// Path of the ffmpeg binary
    #[arg(long, env = "FFMPEG_PATH")]
    pub ffmpeg_path: Option<PathBuf>,
    /// Path of the spotdl binary
    #[arg(long)]
    pub downloader_path: Option<PathBuf>,
    /// Continue past songs that fail to trim
    #[arg(long)]
    pub keep_going: bool,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            source: SourceArgs::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            no_download: false,
            single_threaded: false,
            ffmpeg_path: None,
            downloader_path: None,
            keep_going: false,
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Download, trim and concatenate the songs of a sources file (default)
    Build(BuildArgs),
    /// Show the rendering order and concat list without running any tool
    Plan {
        #[command(flatten)]
        source: SourceArgs,
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check if ffmpeg and spotdl are installed
    CheckTools {
        /// Path of the ffmpeg binary
        #[arg(long, env = "FFMPEG_PATH")]
        ffmpeg_path: Option<PathBuf>,
        /// Path of the spotdl binary
        #[arg(long)]
        downloader_path: Option<PathBuf>,
    },
    /// Write a config file with default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command. No command means `build` with defaults.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Some(Commands::Build(args)) => {
            let rt = Runtime::new()?;
            cmd_build(&rt, config, args)
        }
        None => {
            let rt = Runtime::new()?;
            cmd_build(&rt, config, &BuildArgs::default())
        }
        Some(Commands::Plan { source, format }) => cmd_plan(config, source, format),
        Some(Commands::CheckTools {
            ffmpeg_path,
            downloader_path,
        }) => cmd_check_tools(
            ffmpeg_path.as_deref().or(config.tools.ffmpeg_path.as_deref()),
            downloader_path
                .as_deref()
                .or(config.tools.downloader_path.as_deref()),
        ),
        Some(Commands::InitConfig { force }) => {
            cmd_init_config(cli.config.as_deref(), &config, *force)
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the explicit config file, or the default one if none was given.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) if path.exists() => config::load_from(path)?,
        Some(path) => {
            tracing::info!("Config file {:?} does not exist yet, using defaults", path);
            Config::default()
        }
        None => config::load(),
    };
    Ok(config)
}

/// Apply source arguments on top of the config.
pub(crate) fn apply_source_args(config: &mut Config, args: &SourceArgs) {
    if let Some(dir) = &args.artifacts_dir {
        config.rounds.artifacts_dir = dir.clone();
    }
    if let Some(song_break) = args.song_break {
        config.rounds.song_break = song_break;
    }
}

/// Parse the sources file into a round list configured from `config`.
///
/// Warnings are printed; an unreadable file is an error.
pub(crate) fn load_rounds(config: &Config, args: &SourceArgs) -> anyhow::Result<ParsedSource> {
    let rounds = RoundList::new(
        ArtifactDir::new(&config.rounds.artifacts_dir),
        config.rounds.song_break,
    );
    let parsed = parse_source_file(&args.sources, rounds)?;

    for warning in &parsed.warnings {
        eprintln!("Warning: {}", warning);
    }

    Ok(parsed)
}
