use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};

use qsr_io::{SampleFormat, make_writer};

/// Generates uniformly random shot data in any writable format.
pub fn generate_random_shots(
    out_path: &str,
    format: &str,
    num_shots: usize,
    num_measurements: usize,
    p: f64,
    seed: u64,
) -> Result<()> {
    let format: SampleFormat = format.parse()?;
    println!(
        "Generating {} shots of {} bits (p={}) into {}...",
        num_shots, num_measurements, p, out_path
    );

    let mut out = BufWriter::new(File::create(out_path).context("Failed to create output file")?);
    let mut writer = make_writer(&mut out, format)?;

    // Simple Xorshift RNG
    let mut state: u64 = seed | 1;
    let mut rng_float = move || {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        let result = state.wrapping_mul(0x2545F4914F6CDD1D);
        (result as f64) / (u64::MAX as f64)
    };

    for _ in 0..num_shots {
        for _ in 0..num_measurements {
            writer.write_bit(rng_float() < p)?;
        }
        writer.write_end()?;
    }
    drop(writer);
    out.flush()?;

    println!("Done.");
    Ok(())
}
