//! External collaborators: the downloader and the ffmpeg transcoder.
//!
//! The pipeline only talks to the [`Downloader`] and [`Transcoder`] traits.
//! Production code uses [`spotdl::SpotdlDownloader`] and
//! [`ffmpeg::FfmpegTranscoder`], which shell out to the respective tools;
//! tests substitute the recording mocks in [`mocks`].

pub mod ffmpeg;
mod process;
pub mod spotdl;

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::round::ArtifactDir;

pub use process::{find_tool, tool_version};

/// Fetches a track reference into a local audio file.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `link` so that it ends up at `dest`.
    async fn download(&self, link: &str, dest: &Path) -> Result<()>;
}

/// Audio operations performed on local files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Clip `source` to the trim window with fades, writing `dest`.
    async fn trim(&self, source: &Path, dest: &Path) -> Result<()>;

    /// Render `duration` seconds of silence to `dest`.
    async fn render_silence(&self, duration: u32, dest: &Path) -> Result<()>;

    /// Re-encode the named artifacts, in order, into `output`.
    async fn concat(&self, names: &[String], artifacts: &ArtifactDir, output: &Path)
    -> Result<()>;
}

/// Recording collaborators for pipeline tests.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    /// A recorded collaborator call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Download { link: String, dest: String },
        Trim { source: String, dest: String },
        Silence { duration: u32, dest: String },
        Concat { names: Vec<String>, output: String },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Downloader that writes an empty file and records the call.
    #[derive(Default)]
    pub struct MockDownloader {
        pub calls: Mutex<Vec<Call>>,
        /// Links that fail instead of downloading
        pub fail_links: Vec<String>,
    }

    impl MockDownloader {
        pub fn failing_on(link: &str) -> Self {
            Self {
                fail_links: vec![link.to_string()],
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Downloader for MockDownloader {
        async fn download(&self, link: &str, dest: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Download {
                link: link.to_string(),
                dest: file_name(dest),
            });
            if self.fail_links.iter().any(|l| l == link) {
                return Err(Error::collaborator(None, "mock-downloader", "not found"));
            }
            std::fs::write(dest, b"")?;
            Ok(())
        }
    }

    /// Transcoder that writes empty files and records every call.
    #[derive(Default)]
    pub struct MockTranscoder {
        pub calls: Mutex<Vec<Call>>,
        /// Trim sources (file names) that fail
        pub fail_trims: Vec<String>,
    }

    impl MockTranscoder {
        pub fn failing_trim(name: &str) -> Self {
            Self {
                fail_trims: vec![name.to_string()],
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transcoder for MockTranscoder {
        async fn trim(&self, source: &Path, dest: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Trim {
                source: file_name(source),
                dest: file_name(dest),
            });
            if self.fail_trims.contains(&file_name(source)) {
                return Err(Error::collaborator(None, "mock-ffmpeg", "invalid data"));
            }
            std::fs::write(dest, b"")?;
            Ok(())
        }

        async fn render_silence(&self, duration: u32, dest: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Silence {
                duration,
                dest: file_name(dest),
            });
            std::fs::write(dest, b"")?;
            Ok(())
        }

        async fn concat(
            &self,
            names: &[String],
            _artifacts: &ArtifactDir,
            output: &Path,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Concat {
                names: names.to_vec(),
                output: file_name(output),
            });
            Ok(())
        }
    }
}
