//! Round building command.

use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::plan::RenderPlan;
use crate::tools::Downloader;
use crate::tools::ffmpeg::FfmpegTranscoder;
use crate::tools::spotdl::SpotdlDownloader;

use super::{BuildArgs, apply_source_args, load_rounds};

/// Parse the sources file and render the round into the output file
pub fn cmd_build(rt: &Runtime, mut config: Config, args: &BuildArgs) -> anyhow::Result<()> {
    apply_source_args(&mut config, &args.source);
    if let Some(path) = &args.ffmpeg_path {
        config.tools.ffmpeg_path = Some(path.clone());
    }
    if let Some(path) = &args.downloader_path {
        config.tools.downloader_path = Some(path.clone());
    }
    config.validate()?;

    let parsed = load_rounds(&config, &args.source)?;
    if parsed.rounds.songs().is_empty() {
        anyhow::bail!("No songs found in {}", args.source.sources.display());
    }

    let plan = RenderPlan::from_rounds(&parsed.rounds);
    println!(
        "Building {} songs with {} breaks ({}s of silence)",
        plan.downloads().count(),
        plan.order().iter().filter(|i| i.is_break()).count(),
        parsed.rounds.total_break_secs()
    );

    let transcoder = FfmpegTranscoder::locate(
        config.tools.ffmpeg_path.as_deref(),
        config.trim.clone(),
        config.encode.clone(),
    )?;

    let downloader: Option<Arc<dyn Downloader>> = if args.no_download {
        None
    } else {
        Some(Arc::new(SpotdlDownloader::locate(
            config.tools.downloader_path.as_deref(),
        )?))
    };

    let pipeline = Pipeline::new(
        downloader,
        Arc::new(transcoder),
        PipelineOptions {
            output: args.output.clone(),
            parallel_downloads: !args.single_threaded,
            keep_going: args.keep_going,
        },
    );

    let report = rt.block_on(pipeline.run(&plan))?;

    if !report.failed.is_empty() {
        eprintln!(
            "{} songs failed to trim: {:?}",
            report.failed.len(),
            report.failed
        );
    }
    println!(
        "Downloaded {}, trimmed {}, silence clips {} rendered / {} reused",
        report.downloaded, report.trimmed, report.silences_rendered, report.silences_reused
    );
    println!("Success! Wrote {}", report.output.display());
    Ok(())
}
