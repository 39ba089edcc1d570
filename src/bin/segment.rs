use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use lfpseg::config::{SegmenterConfig, Session};
use lfpseg::io::{load_assignments, load_good_channels, load_onsets, load_scores, write_group_matrix};
use lfpseg::stage::Stage;

/// Segment every good channel of one area by sleep stage and export the
/// per-group concatenations as matrices (one row per channel).
#[derive(Parser)]
#[command(name = "segment", about = "Export per-stage sample groups for one area")]
struct Args {
    /// Subject identifier, e.g. r14.
    #[arg(long)]
    subject: String,

    /// Recording condition, e.g. habituation.
    #[arg(long)]
    condition: String,

    /// Base storage directory for the session.
    #[arg(long)]
    base_dir: PathBuf,

    /// Anatomical area to export, e.g. PFC.
    #[arg(long)]
    area: String,

    /// Stage groups to export (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "wakefulness,nrem,rem")]
    groups: Vec<String>,

    /// Artifact window width in samples.
    #[arg(long, default_value_t = 3000)]
    artifact_window: usize,

    /// Samples covered by one sleep score.
    #[arg(long, default_value_t = 5000)]
    stage_repeat: usize,
}

fn stage_by_name(name: &str) -> Result<Stage> {
    Ok(match name {
        "wakefulness" => Stage::Wakefulness,
        "nrem" => Stage::Nrem,
        "rem" => Stage::Rem,
        "unidentified" => Stage::Unidentified,
        other => bail!("unknown stage group: {other}"),
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let session = Session::new(&args.subject, &args.condition, &args.base_dir);
    let cfg = SegmenterConfig {
        artifact_window: args.artifact_window,
        stage_repeat: args.stage_repeat,
        ..SegmenterConfig::default()
    };

    let stages: Vec<Stage> = args
        .groups
        .iter()
        .map(|name| stage_by_name(name))
        .collect::<Result<_>>()?;

    let assignments = load_assignments(&session.assigned_file())?;
    let (channels, positions) = load_good_channels(&session, &assignments, &args.area)?;
    if channels.is_empty() {
        println!("No good channels found.");
        return Ok(());
    }

    let scores = load_scores(&session.scores_file())?;
    let onsets = load_onsets(&session.onsets_file())?;

    // One row per channel, per requested group.
    let mut rows: Vec<Vec<Vec<f32>>> = vec![Vec::new(); stages.len()];

    for (data, position) in channels.iter().zip(&positions) {
        println!("Processing data from channel with index {position}:");
        let groups = lfpseg::segment(data, &scores, &onsets, &cfg);

        for stage in [Stage::Wakefulness, Stage::Nrem, Stage::Rem, Stage::Unidentified] {
            let group = groups.group(stage);
            let filtered = group.strip_artifacts();
            println!(
                "  {:<12}  {:>10} offsets, {:>10} after artifact removal",
                stage.name(),
                group.count(),
                filtered.len()
            );
        }
        println!("  unassigned    {:>10} offsets", groups.unassigned);

        for (slot, &stage) in rows.iter_mut().zip(&stages) {
            slot.push(groups.group(stage).strip_artifacts().values);
        }
    }

    for (slot, &stage) in rows.iter().zip(&stages) {
        let out = session.group_matrix_file(&args.area, stage.name());
        write_group_matrix(&out, stage.name(), slot)?;
        println!("Saved {} matrix → {}", stage.name(), out.display());
    }

    Ok(())
}
