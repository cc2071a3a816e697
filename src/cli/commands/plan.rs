//! Plan preview command.

use serde::Serialize;

use crate::config::Config;
use crate::plan::RenderPlan;
use crate::round::{ParseWarning, RoundItem};

use super::{SourceArgs, apply_source_args, load_rounds};

/// JSON view of a plan together with the parse warnings
#[derive(Serialize)]
struct PlanReport<'a> {
    song_break: u32,
    warnings: &'a [ParseWarning],
    #[serde(flatten)]
    plan: &'a RenderPlan,
}

/// Print the rendering order and concat list
pub fn cmd_plan(mut config: Config, source: &SourceArgs, format: &str) -> anyhow::Result<()> {
    apply_source_args(&mut config, source);
    let parsed = load_rounds(&config, source)?;
    let plan = RenderPlan::from_rounds(&parsed.rounds);

    match format {
        "json" => {
            let report = PlanReport {
                song_break: parsed.rounds.song_break(),
                warnings: &parsed.warnings,
                plan: &plan,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => print_text(&plan),
        other => anyhow::bail!("Unknown format '{}', expected text or json", other),
    }

    Ok(())
}

fn print_text(plan: &RenderPlan) {
    if plan.is_empty() {
        println!("No songs or breaks found.");
        return;
    }

    println!("Rendering order:");
    for (pos, item) in plan.order().iter().enumerate() {
        match item {
            RoundItem::Song(song) => {
                println!("  {:>3}. song   #{:<3} {}", pos + 1, song.index(), song.link())
            }
            RoundItem::Break(brk) if brk.is_synthetic() => {
                println!("  {:>3}. break  auto {}s", pos + 1, brk.duration())
            }
            RoundItem::Break(brk) => {
                let index = brk.index().unwrap_or_default();
                println!("  {:>3}. break  #{:<3} {}s", pos + 1, index, brk.duration())
            }
        }
    }

    println!();
    println!("Artifacts: {}", plan.artifacts().path().display());
    println!("Concat list:");
    print!("{}", plan.manifest());
}
