use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use lfpseg::config::Session;
use lfpseg::io::{load_channels, TensorWriter};
use lfpseg::psd::welch;

/// Estimate a Welch PSD per channel and write them all to one tensor file
/// for downstream plotting.
#[derive(Parser)]
#[command(name = "psd", about = "Welch power spectral density per channel")]
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

    /// Channel positions to process (comma-separated).
    #[arg(long, value_delimiter = ',')]
    channels: Vec<usize>,

    /// Output tensor file.
    #[arg(long)]
    output: PathBuf,

    /// Sampling rate in Hz.
    #[arg(long, default_value_t = 1000.0)]
    fs: f32,

    /// Samples per Welch segment.
    #[arg(long, default_value_t = 1024)]
    nperseg: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let session = Session::new(&args.subject, &args.condition, &args.base_dir);

    let (channels, positions) = load_channels(&session, &args.channels)?;
    if channels.is_empty() {
        println!("No LFP data to process.");
        return Ok(());
    }

    let mut w = TensorWriter::new();
    let mut freqs_written = false;

    for (data, &position) in channels.iter().zip(&positions) {
        let (freqs, psd) = welch(data, args.fs, args.nperseg)?;
        println!(
            "channel {position}: {} samples → {} frequency bins",
            data.len(),
            psd.len()
        );
        if !freqs_written {
            w.add_f32("frequencies", &freqs, &[freqs.len()]);
            freqs_written = true;
        }
        w.add_f32(&format!("psd_{position}"), &psd, &[psd.len()]);
    }

    if let Some(dir) = args.output.parent() {
        std::fs::create_dir_all(dir)?;
    }
    w.write(&args.output)?;
    println!("Written → {}", args.output.display());
    Ok(())
}
