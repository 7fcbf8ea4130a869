//! Bulk decode throughput measurement.
//!
//! Decodes an entire shot file into a bit table, timing the decode, then
//! summarizes hit density with a parallel popcount pass over the rows.
//! Used to compare format decode costs on identical data.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use qsr_core::{BitPack, BitTable};
use qsr_io::{SampleFormat, make_reader};

pub fn run_benchmark(
    in_path: &str,
    format: &str,
    num_measurements: usize,
    max_shots: usize,
) -> Result<()> {
    let format: SampleFormat = format.parse()?;

    println!("Loading shots from {}...", in_path);
    let input = BufReader::new(File::open(in_path).context("Failed to open input file")?);
    let mut reader = make_reader(input, format, num_measurements, 0, 0)?;

    let mut table = BitTable::new(max_shots, num_measurements);
    let start = Instant::now();
    let num_shots = reader.read_records_into(&mut table, true, max_shots)?;
    let seconds = start.elapsed().as_secs_f64();

    println!("Results");
    println!("Shots: {}", num_shots);
    println!("Time: {:.4} s", seconds);
    println!("Throughput: {:.2} shots/s", num_shots as f64 / seconds);

    let words_per_row = table.words_per_row();
    if num_shots > 0 && words_per_row > 0 {
        let total_hits: usize = table
            .as_words()
            .par_chunks(words_per_row)
            .take(num_shots)
            .map(BitPack::ones)
            .sum();
        println!(
            "Hit density: {:.4} per shot ({} total)",
            total_hits as f64 / num_shots as f64,
            total_hits
        );
    }

    Ok(())
}
