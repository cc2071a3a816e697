//! Rendering driver.
//!
//! Runs a [`RenderPlan`] against the collaborators:
//! 1. downloads: every song, either as concurrent tasks (all spawned at
//!    once, then joined) or one after another
//! 2. trims and silence clips, in rendering order; a silence clip that
//!    already exists on disk is reused
//! 3. concatenation of the plan's concat list into the output file
//!
//! No call is retried. Download failures are reported after all downloads
//! have finished; trim failures abort unless `keep_going` is set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result, ResultExt};
use crate::plan::{PlanStep, RenderPlan};
use crate::round::Song;
use crate::round::item::break_artifact_name;
use crate::tools::{Downloader, Transcoder};

/// How the pipeline runs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Final concatenated file
    pub output: PathBuf,
    /// Run downloads as concurrent tasks
    pub parallel_downloads: bool,
    /// Log trim failures and continue instead of aborting
    pub keep_going: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("rounds.mp3"),
            parallel_downloads: true,
            keep_going: false,
        }
    }
}

/// What a pipeline run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub downloaded: usize,
    pub trimmed: usize,
    pub silences_rendered: usize,
    /// Silence clips that already existed
    pub silences_reused: usize,
    /// Indices of songs whose trim failed (only with `keep_going`)
    pub failed: Vec<usize>,
    pub output: PathBuf,
}

/// Executes render plans.
pub struct Pipeline {
    /// `None` skips downloading; songs must already be in the artifact dir
    downloader: Option<Arc<dyn Downloader>>,
    transcoder: Arc<dyn Transcoder>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        downloader: Option<Arc<dyn Downloader>>,
        transcoder: Arc<dyn Transcoder>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            downloader,
            transcoder,
            options,
        }
    }

    /// Render `plan` into the output file.
    pub async fn run(&self, plan: &RenderPlan) -> Result<PipelineReport> {
        let artifacts = plan.artifacts();
        tokio::fs::create_dir_all(artifacts.path())
            .await
            .with_context(format!("creating {}", artifacts.path().display()))?;

        let mut report = PipelineReport {
            output: self.options.output.clone(),
            ..Default::default()
        };

        if let Some(downloader) = &self.downloader {
            let songs: Vec<Song> = plan.downloads().cloned().collect();
            report.downloaded = if self.options.parallel_downloads {
                self.download_concurrently(downloader, songs, plan).await?
            } else {
                self.download_sequentially(downloader.as_ref(), &songs, plan).await?
            };
        } else {
            tracing::info!("Downloads disabled, using existing artifacts");
        }

        for step in plan.steps() {
            match step {
                PlanStep::Download { .. } => {}
                PlanStep::Trim { song } => match self.trim(song, plan).await {
                    Ok(()) => report.trimmed += 1,
                    Err(e) if self.options.keep_going => {
                        tracing::error!("{}", e);
                        report.failed.push(song.index());
                    }
                    Err(e) => return Err(e),
                },
                PlanStep::RenderSilence { duration } => {
                    if self.render_silence(*duration, plan).await? {
                        report.silences_rendered += 1;
                    } else {
                        report.silences_reused += 1;
                    }
                }
            }
        }

        tracing::info!(
            "Concatenating {} entries into {:?}",
            plan.concat_list().len(),
            self.options.output
        );
        self.transcoder
            .concat(plan.concat_list(), artifacts, &self.options.output)
            .await?;

        Ok(report)
    }

    /// Spawn one task per song, then join them all.
    ///
    /// Returns the first failure by song order once every task has finished.
    async fn download_concurrently(
        &self,
        downloader: &Arc<dyn Downloader>,
        songs: Vec<Song>,
        plan: &RenderPlan,
    ) -> Result<usize> {
        tracing::info!("Downloading {} songs concurrently", songs.len());

        let handles: Vec<_> = songs
            .into_iter()
            .map(|song| {
                let downloader = Arc::clone(downloader);
                let dest = song.artifact_path(plan.artifacts());
                tokio::spawn(async move {
                    tracing::debug!("Downloading {} to {:?}", song.link(), dest);
                    downloader
                        .download(song.link(), &dest)
                        .await
                        .map_err(|e| e.at_item(song.index()))
                })
            })
            .collect();

        let mut first_error = None;
        let mut downloaded = 0;
        for joined in futures::future::join_all(handles).await {
            let result = joined
                .map_err(|e| Error::TaskJoin(e.to_string()))
                .and_then(|r| r);
            match result {
                Ok(()) => downloaded += 1,
                Err(e) => {
                    tracing::error!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(downloaded),
        }
    }

    async fn download_sequentially(
        &self,
        downloader: &dyn Downloader,
        songs: &[Song],
        plan: &RenderPlan,
    ) -> Result<usize> {
        for song in songs {
            let dest = song.artifact_path(plan.artifacts());
            tracing::info!("Downloading {} to {:?}", song.link(), dest);
            downloader
                .download(song.link(), &dest)
                .await
                .map_err(|e| e.at_item(song.index()))?;
        }
        Ok(songs.len())
    }

    async fn trim(&self, song: &Song, plan: &RenderPlan) -> Result<()> {
        let source = song.artifact_path(plan.artifacts());
        let dest = song.trimmed_path(plan.artifacts());
        // A trimmed file left by an earlier run must not stand in for a failed trim
        remove_stale(&dest).await?;
        tracing::info!("Trimming {:?} -> {:?}", source, dest);
        self.transcoder
            .trim(&source, &dest)
            .await
            .map_err(|e| e.at_item(song.index()))
    }

    /// Render a silence clip unless it exists. Returns whether it was rendered.
    async fn render_silence(&self, duration: u32, plan: &RenderPlan) -> Result<bool> {
        let dest = plan.artifacts().join(&break_artifact_name(duration));
        let exists = tokio::fs::try_exists(&dest)
            .await
            .with_context(format!("checking {}", dest.display()))?;
        if exists {
            tracing::info!("{:?} already exists, skipping", dest);
            return Ok(false);
        }

        tracing::info!("Rendering {}s of silence to {:?}", duration, dest);
        self.transcoder.render_silence(duration, &dest).await?;
        Ok(true)
    }
}

/// Remove `path` if it exists.
async fn remove_stale(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!("Removed stale {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(format!("removing {}", path.display())),
    }
}
