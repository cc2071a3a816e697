//! Round items: the songs and silent breaks placed into a round.
//!
//! Items carry only their own data (index plus link or duration). File
//! locations are resolved against an [`ArtifactDir`] owned by the
//! [`RoundList`](super::RoundList), so the directory is configured once.
//!
//! Artifact naming:
//! - `{index}.mp3`: downloaded song
//! - `{index}.trimmed.mp3`: trimmed and faded song
//! - `break_{duration}.mp3`: silence clip, shared by all breaks of that duration

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory that holds every rendered artifact of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactDir(PathBuf);

impl ArtifactDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path of a file inside the directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }

    /// Path of the concatenation manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.join(MANIFEST_NAME)
    }
}

impl Default for ArtifactDir {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

/// File name of the concatenation manifest inside the artifact directory.
pub const MANIFEST_NAME: &str = "concat_list.txt";

/// A track to download, trim and place into the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    index: usize,
    link: String,
}

impl Song {
    pub(crate) fn new(index: usize, link: impl Into<String>) -> Self {
        Self {
            index,
            link: link.into(),
        }
    }

    /// Position in the canonical sequence. Stable identifier for artifacts.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Name of the raw downloaded file.
    pub fn artifact_name(&self) -> String {
        format!("{}.mp3", self.index)
    }

    /// Name of the trimmed file, as listed in the concatenation manifest.
    pub fn trimmed_name(&self) -> String {
        format!("{}.trimmed.mp3", self.index)
    }

    pub fn artifact_path(&self, dir: &ArtifactDir) -> PathBuf {
        dir.join(&self.artifact_name())
    }

    pub fn trimmed_path(&self, dir: &ArtifactDir) -> PathBuf {
        dir.join(&self.trimmed_name())
    }
}

/// A stretch of silence between songs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundBreak {
    /// `None` for breaks inserted automatically between songs
    index: Option<usize>,
    /// Length in seconds
    duration: u32,
}

impl RoundBreak {
    pub(crate) fn new(index: usize, duration: u32) -> Self {
        Self {
            index: Some(index),
            duration,
        }
    }

    /// A break that was not written in the sources file.
    pub(crate) fn synthetic(duration: u32) -> Self {
        Self {
            index: None,
            duration,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_synthetic(&self) -> bool {
        self.index.is_none()
    }

    /// Name of the silence clip. Equal durations share one file.
    pub fn artifact_name(&self) -> String {
        break_artifact_name(self.duration)
    }

    pub fn artifact_path(&self, dir: &ArtifactDir) -> PathBuf {
        dir.join(&self.artifact_name())
    }
}

/// Name of the silence clip for a duration in seconds.
pub fn break_artifact_name(duration: u32) -> String {
    format!("break_{duration}.mp3")
}

/// One entry of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundItem {
    Song(Song),
    Break(RoundBreak),
}

impl RoundItem {
    /// Canonical index, `None` for synthetic breaks.
    pub fn index(&self) -> Option<usize> {
        match self {
            RoundItem::Song(song) => Some(song.index()),
            RoundItem::Break(brk) => brk.index(),
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, RoundItem::Break(_))
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, RoundItem::Break(brk) if brk.is_synthetic())
    }

    pub fn as_song(&self) -> Option<&Song> {
        match self {
            RoundItem::Song(song) => Some(song),
            RoundItem::Break(_) => None,
        }
    }

    pub fn as_break(&self) -> Option<&RoundBreak> {
        match self {
            RoundItem::Break(brk) => Some(brk),
            RoundItem::Song(_) => None,
        }
    }

    /// Name of the finished artifact this item contributes to the output.
    pub fn concat_name(&self) -> String {
        match self {
            RoundItem::Song(song) => song.trimmed_name(),
            RoundItem::Break(brk) => brk.artifact_name(),
        }
    }

    /// Path of the artifact the item's own collaborator call produces.
    pub fn artifact_path(&self, dir: &ArtifactDir) -> PathBuf {
        match self {
            RoundItem::Song(song) => song.artifact_path(dir),
            RoundItem::Break(brk) => brk.artifact_path(dir),
        }
    }
}
