use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use lfpseg::config::{SegmenterConfig, Session};
use lfpseg::epoch::align_channels;
use lfpseg::io::{load_channels, load_onsets, load_scores, write_matrix};

/// Extract fixed-length REM epochs from the specified channels and export
/// one cross-channel matrix per epoch index.
#[derive(Parser)]
#[command(name = "epochs", about = "Export aligned REM epoch matrices")]
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

    /// Anatomical area the channels belong to (output grouping only).
    #[arg(long)]
    area: String,

    /// Channel positions to process (comma-separated).
    #[arg(long, value_delimiter = ',')]
    channels: Vec<usize>,

    /// Samples per epoch.
    #[arg(long, default_value_t = 240_000)]
    epoch_len: usize,

    /// Artifact window width in samples.
    #[arg(long, default_value_t = 3000)]
    artifact_window: usize,

    /// Samples covered by one sleep score.
    #[arg(long, default_value_t = 5000)]
    stage_repeat: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let session = Session::new(&args.subject, &args.condition, &args.base_dir);
    let cfg = SegmenterConfig {
        epoch_len: args.epoch_len,
        artifact_window: args.artifact_window,
        stage_repeat: args.stage_repeat,
        ..SegmenterConfig::default()
    };

    let (channels, positions) = load_channels(&session, &args.channels)?;
    if channels.is_empty() {
        println!("No LFP data to process.");
        return Ok(());
    }

    let scores = load_scores(&session.scores_file())?;
    let onsets = load_onsets(&session.onsets_file())?;

    let mut per_channel = Vec::with_capacity(channels.len());
    for (data, &position) in channels.iter().zip(&positions) {
        println!("Processing data from channel with index {position}:");
        let epochs = lfpseg::rem_epochs(data, &scores, &onsets, &cfg);
        println!("  {} epochs of {} samples", epochs.len(), cfg.epoch_len);
        per_channel.push(epochs);
    }

    // Fatal on a cross-channel mismatch: nothing is written.
    let matrices = align_channels(&per_channel)?;

    for (k, matrix) in matrices.iter().enumerate() {
        let out = session.epoch_matrix_file(&args.area, "REM", k);
        write_matrix(&out, "matrix", matrix)?;
        println!("Saved matrix {k} with corresponding epochs from all channels");
    }
    println!("Total epochs saved: {}", matrices.len() * channels.len());

    Ok(())
}
