mod convert;
mod generator;
mod throughput;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random shot data for benchmarking and testing.
    Gen {
        #[arg(long, default_value = "shots.b8")]
        out: String,
        #[arg(long, default_value = "b8")]
        format: String,
        #[arg(long, default_value_t = 10_000)]
        shots: usize,
        #[arg(long, default_value_t = 1024)]
        measurements: usize,
        #[arg(long, default_value_t = 0.01)]
        p: f64,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
    /// Re-encode shot data from one format into another.
    Convert {
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: String,
        #[arg(long)]
        in_format: String,
        #[arg(long)]
        out_format: String,
        #[arg(short, long)]
        measurements: usize,
        #[arg(long, default_value_t = 0)]
        detectors: usize,
        #[arg(long, default_value_t = 0)]
        observables: usize,
    },
    /// Measure bulk decode throughput of a shot file.
    Bench {
        #[arg(short, long)]
        input: String,
        #[arg(long)]
        format: String,
        #[arg(short, long)]
        measurements: usize,
        #[arg(long, default_value_t = 100_000)]
        max_shots: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Gen {
            out,
            format,
            shots,
            measurements,
            p,
            seed,
        } => {
            generator::generate_random_shots(&out, &format, shots, measurements, p, seed)?;
        }
        Commands::Convert {
            input,
            output,
            in_format,
            out_format,
            measurements,
            detectors,
            observables,
        } => {
            convert::convert(
                &input,
                &output,
                &in_format,
                &out_format,
                measurements,
                detectors,
                observables,
            )?;
        }
        Commands::Bench {
            input,
            format,
            measurements,
            max_shots,
        } => {
            throughput::run_benchmark(&input, &format, measurements, max_shots)?;
        }
    }
    Ok(())
}
