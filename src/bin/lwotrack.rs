//! Inspect the tracks recovered from an LWO2 tube mesh.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use lwotrack::{lwo, DecodeOptions};

#[derive(Parser, Debug)]
#[command(name = "lwotrack")]
#[command(about = "Recover track paths from LWO2 tube meshes", long_about = None)]
struct Args {
    /// Input .lwo file
    input: PathBuf,

    /// Resampling step along each track (default: 1.0)
    #[arg(long, default_value = "1.0")]
    step: f32,

    /// Maximum number of chunks read from the file (default: 1000)
    #[arg(long, default_value_t = DecodeOptions::DEFAULT_MAX_CHUNKS)]
    max_chunks: usize,

    /// Ring disambiguation budget (default: 10)
    #[arg(long, default_value_t = DecodeOptions::DEFAULT_DISAMBIGUATION_ROUNDS)]
    rounds: usize,

    /// Print every resampled position
    #[arg(long)]
    samples: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = DecodeOptions::new(args.max_chunks, args.rounds);
    let model = lwo::load_file(&args.input, &options)
        .with_context(|| format!("Failed to load {:?}", args.input))?;

    println!("{}: {} track(s)", model.name, model.tracks.len());
    for (i, track) in model.tracks.iter().enumerate() {
        let samples = track
            .resample(args.step)
            .context("Failed to resample track")?;
        println!(
            "Track {}: {} rings, looped = {}, length = {:.3}, {} samples at step {}",
            i,
            track.rings.len(),
            track.looped,
            track.total_length,
            samples.len(),
            args.step
        );

        if args.samples {
            for sample in &samples {
                println!("  {}", sample.position);
            }
        }
    }
    Ok(())
}
