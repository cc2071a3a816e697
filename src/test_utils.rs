//! Test utilities and fixtures for roundmix tests.
//!
//! ```ignore
//! use crate::test_utils::{list_from, temp_artifacts, Entry};
//!
//! let (artifacts, _dir) = temp_artifacts();
//! let entries = [Entry::Song(LINK_A), Entry::Break(20), Entry::Song(LINK_B)];
//! let rounds = list_from(&artifacts, &entries);
//! ```

use tempfile::TempDir;

use crate::round::{ArtifactDir, DEFAULT_SONG_BREAK, RoundList};

pub const LINK_A: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const LINK_B: &str = "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC";
pub const LINK_C: &str = "https://youtu.be/9bZkp7q19f0";

/// One canonical entry for [`list_from`].
#[derive(Debug, Clone, Copy)]
pub enum Entry {
    Song(&'static str),
    Break(u32),
}

/// Build a round list with the default song break.
pub fn list_from(artifacts: &ArtifactDir, entries: &[Entry]) -> RoundList {
    let mut rounds = RoundList::new(artifacts.clone(), DEFAULT_SONG_BREAK);
    for entry in entries {
        match *entry {
            Entry::Song(link) => {
                rounds.append_song(link);
            }
            Entry::Break(duration) => {
                rounds.append_break(duration);
            }
        }
    }
    rounds
}

/// Creates a temporary artifact directory.
///
/// Keep the `TempDir` alive for the duration of the test; the directory is
/// deleted when it is dropped.
pub fn temp_artifacts() -> (ArtifactDir, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    (ArtifactDir::new(dir.path()), dir)
}
