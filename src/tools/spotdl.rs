//! spotDL-backed downloader.
//!
//! `spotdl` resolves YouTube and Spotify links and writes an mp3. It picks
//! the file extension itself, so the output template carries its
//! `{output-ext}` placeholder instead of `.mp3`.
//!
//! Install: `pip install spotdl`

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::Downloader;
use super::process::{find_tool, run_tool};
use crate::error::{Error, Result};

const TOOL: &str = "spotdl";
const VERSION_ARG: &str = "--version";

/// Placeholder spotdl replaces with the output file's extension.
const EXT_PLACEHOLDER: &str = "{output-ext}";

#[cfg(windows)]
pub const SPOTDL_PATHS: &[&str] = &["spotdl", "spotdl.exe"];

#[cfg(not(windows))]
pub const SPOTDL_PATHS: &[&str] = &["spotdl", "/usr/local/bin/spotdl", "/usr/bin/spotdl"];

/// Downloader that runs spotdl.
#[derive(Debug, Clone)]
pub struct SpotdlDownloader {
    program: PathBuf,
}

impl SpotdlDownloader {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate spotdl, preferring an explicitly configured path.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        let program = find_tool(configured, SPOTDL_PATHS, VERSION_ARG).ok_or_else(|| {
            Error::ToolNotFound(match configured {
                Some(path) => format!("spotdl at {}", path.display()),
                None => "spotdl (pip install spotdl, or pass --downloader-path)".to_string(),
            })
        })?;
        tracing::debug!("Using spotdl at {:?}", program);
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Output template for `dest`: same stem, extension left to spotdl.
    pub fn output_template(dest: &Path) -> OsString {
        let mut template = dest.with_extension("").into_os_string();
        template.push(".");
        template.push(EXT_PLACEHOLDER);
        template
    }

    pub fn download_args(&self, link: &str, dest: &Path) -> Vec<OsString> {
        vec![
            "download".into(),
            link.into(),
            "--format".into(),
            "mp3".into(),
            "--output".into(),
            Self::output_template(dest),
            // Indices restart every run, so an existing file may hold another song
            "--overwrite".into(),
            "force".into(),
        ]
    }
}

#[async_trait]
impl Downloader for SpotdlDownloader {
    async fn download(&self, link: &str, dest: &Path) -> Result<()> {
        run_tool(TOOL, &self.program, &self.download_args(link, dest)).await
    }
}
