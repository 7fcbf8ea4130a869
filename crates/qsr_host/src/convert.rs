use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use qsr_core::BitRow;
use qsr_io::{SampleFormat, make_reader, make_writer};

/// Streams shots from one file format into another.
///
/// The shot shape `(measurements, detectors, observables)` applies to both
/// sides; section kinds flow from the reader into the writer so labeled
/// output keeps its `M`/`D`/`L` split.
pub fn convert(
    in_path: &str,
    out_path: &str,
    in_format: &str,
    out_format: &str,
    num_measurements: usize,
    num_detectors: usize,
    num_observables: usize,
) -> Result<()> {
    let in_format: SampleFormat = in_format.parse()?;
    let out_format: SampleFormat = out_format.parse()?;

    let input = BufReader::new(File::open(in_path).context("Failed to open input file")?);
    let mut output = BufWriter::new(File::create(out_path).context("Failed to create output file")?);

    let mut reader = make_reader(
        input,
        in_format,
        num_measurements,
        num_detectors,
        num_observables,
    )?;
    let mut writer = make_writer(&mut output, out_format)?;

    // Per-shot scratch row; sections are staged here one at a time.
    let mut row = BitRow::new(num_measurements + num_detectors + num_observables);
    let mut num_shots = 0usize;
    while reader.start_record()? {
        let mut current = reader.current_result_type();
        writer.begin_result_type(current)?;
        while !reader.is_end_of_record()? {
            let kind = reader.current_result_type();
            if kind != current {
                current = kind;
                writer.begin_result_type(kind)?;
            }
            let n = reader.read_bits_into_bytes(row.as_bytes_mut())?;
            writer.write_bytes(row.as_bytes(), n)?;
        }
        writer.write_end()?;
        num_shots += 1;
    }
    drop(writer);
    output.flush()?;

    println!(
        "Converted {} shots from {} to {}.",
        num_shots, in_format, out_format
    );
    Ok(())
}
