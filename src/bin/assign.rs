use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use lfpseg::config::{SegmenterConfig, Session};
use lfpseg::io::{load_channel_map, save_assignments, scan_positions};
use lfpseg::tetrode::{assign, label_quality};

/// Build the channel/tetrode assignment table for a session and label each
/// channel's quality from the known-good position list.
#[derive(Parser)]
#[command(name = "assign", about = "Assign tetrodes to channels and label quality")]
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

    /// Known-good channel positions (comma-separated).
    #[arg(long, default_value = "")]
    good: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let session = Session::new(&args.subject, &args.condition, &args.base_dir);

    let good: Vec<usize> = if args.good.is_empty() {
        vec![]
    } else {
        args.good
            .split(',')
            .map(|s| s.trim().parse())
            .collect::<Result<_, _>>()?
    };
    let cfg = SegmenterConfig {
        known_good_positions: good,
        ..SegmenterConfig::default()
    };

    let channel_map = load_channel_map(&session.channel_map_file())?;
    let present = scan_positions(&session.dataset_dir())?;
    println!(
        "{} labels in channel map, {} channel files on disk",
        channel_map.len(),
        present.len()
    );

    let mut assignments = assign(&channel_map, &present);
    label_quality(&mut assignments, &cfg.known_good_positions);

    for a in &assignments {
        let quality = match a.quality {
            Some(q) => format!("{q:?}"),
            None => String::new(),
        };
        println!(
            "{:>20}  {:<4} {:<5} lead {}  {quality}",
            a.file, a.area, a.tetrode, a.lead
        );
    }

    let out = session.assigned_file();
    save_assignments(&out, &assignments)?;
    println!("Saved assignment table → {}", out.display());
    Ok(())
}
