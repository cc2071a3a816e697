//! Render plan: the collaborator calls a round needs and the final
//! concatenation list.
//!
//! The plan is derived from a [`RoundList`]'s rendering order. Every song
//! needs a download and a trim. Breaks need a silence clip, but clips are
//! keyed by duration, so one [`PlanStep::RenderSilence`] is emitted per
//! distinct duration no matter how often it occurs.

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{Result, ResultExt};
use crate::round::{ArtifactDir, RoundItem, RoundList, Song};

/// A single collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStep {
    /// Fetch the song to `{index}.mp3`
    Download { song: Song },
    /// Cut and fade `{index}.mp3` into `{index}.trimmed.mp3`
    Trim { song: Song },
    /// Render `break_{duration}.mp3`
    RenderSilence { duration: u32 },
}

/// Everything needed to render a round.
#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan {
    artifacts: ArtifactDir,
    order: Vec<RoundItem>,
    steps: Vec<PlanStep>,
    concat_list: Vec<String>,
}

impl RenderPlan {
    /// Plan the rendering of a round list.
    pub fn from_rounds(rounds: &RoundList) -> Self {
        Self::from_order(rounds.artifacts().clone(), rounds.rendering_order())
    }

    /// Plan from an already derived rendering order.
    pub fn from_order(artifacts: ArtifactDir, order: Vec<RoundItem>) -> Self {
        let mut steps = Vec::with_capacity(order.len() * 2);
        let mut concat_list = Vec::with_capacity(order.len());
        let mut silences = HashSet::new();

        for item in &order {
            match item {
                RoundItem::Song(song) => {
                    steps.push(PlanStep::Download { song: song.clone() });
                    steps.push(PlanStep::Trim { song: song.clone() });
                }
                RoundItem::Break(brk) => {
                    if silences.insert(brk.duration()) {
                        steps.push(PlanStep::RenderSilence {
                            duration: brk.duration(),
                        });
                    }
                }
            }
            concat_list.push(item.concat_name());
        }

        Self {
            artifacts,
            order,
            steps,
            concat_list,
        }
    }

    pub fn artifacts(&self) -> &ArtifactDir {
        &self.artifacts
    }

    /// The rendering order the plan was built from.
    pub fn order(&self) -> &[RoundItem] {
        &self.order
    }

    /// All steps, in rendering order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Artifact names to concatenate, one per rendering order entry.
    pub fn concat_list(&self) -> &[String] {
        &self.concat_list
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Songs that need downloading.
    pub fn downloads(&self) -> impl Iterator<Item = &Song> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Download { song } => Some(song),
            _ => None,
        })
    }

    /// Distinct silence durations, in first-use order.
    pub fn silences(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::RenderSilence { duration } => Some(*duration),
            _ => None,
        })
    }

    /// Text of the concat manifest for this plan.
    pub fn manifest(&self) -> String {
        manifest_text(&self.concat_list)
    }
}

/// Quote a file name for an ffmpeg concat manifest.
fn quote_concat_entry(name: &str) -> String {
    format!("'{}'", name.replace('\'', r"'\''"))
}

/// Build concat manifest text: one `file '<name>'` line per entry.
pub fn manifest_text(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("file {}\n", quote_concat_entry(name)))
        .collect()
}

/// Write the concat manifest into the artifact directory.
///
/// Names are relative to the manifest, which sits next to the artifacts.
pub fn write_manifest(names: &[String], artifacts: &ArtifactDir) -> Result<PathBuf> {
    let path = artifacts.manifest_path();
    std::fs::write(&path, manifest_text(names))
        .with_context(format!("writing concat manifest {}", path.display()))?;
    tracing::debug!("Wrote {} entries to {:?}", names.len(), path);
    Ok(path)
}
