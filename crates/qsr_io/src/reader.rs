use std::io::Read;

use qsr_core::BitTable;

use crate::format::{SampleFormat, SectionKind};
use crate::source::ByteSource;
use crate::{Error, Result};

mod ascii;
mod b8;
mod dets;
mod hits;
mod r8;

pub use ascii::AsciiReader;
pub use b8::B8Reader;
pub use dets::DetsReader;
pub use hits::HitsReader;
pub use r8::R8Reader;

/// A streaming decoder for one shot-record format.
///
/// A reader is bound to one byte source and one shot shape at construction
/// and driven strictly forward: `start_record`, then bits until
/// `is_end_of_record`, then the next `start_record`. Bits of one shot never
/// leak into the next. All five formats expose identical semantics through
/// this trait; only the wire framing differs.
pub trait RecordReader {
    /// Advances to the next shot.
    ///
    /// Returns `Ok(false)` on clean end of input at a shot boundary. A
    /// partial shot is an error.
    fn start_record(&mut self) -> Result<bool>;

    /// Discards the rest of the current shot, then starts the next one.
    fn next_record(&mut self) -> Result<bool>;

    /// Returns the next bit of the current shot.
    fn read_bit(&mut self) -> Result<bool>;

    /// True iff the current shot's bits are exhausted.
    ///
    /// Does not advance any state. For line formats this is also where a
    /// length mismatch between the line and the declared width surfaces.
    fn is_end_of_record(&self) -> Result<bool>;

    /// The section kind of the next bit to be produced.
    fn current_result_type(&self) -> SectionKind {
        SectionKind::Measurement
    }

    /// Fills `out` with up to `8 * out.len()` bits of the current shot,
    /// LSB-first within each byte.
    ///
    /// Stops early at end of record or when the section kind changes, so
    /// callers can split labeled output by section. Returns the number of
    /// bits written. Formats with byte-aligned framing may bulk-copy.
    fn read_bits_into_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        drain_bits(self, out)
    }

    /// Decodes shots into rows of `table` until it is full, `max_shots` is
    /// reached, or the input ends. Returns the number of shots read.
    ///
    /// With `major_is_shot` false, decodes into a transposed scratch table
    /// and transposes back, so the caller's minor axis indexes shots.
    /// Rows past the returned count are left untouched.
    fn read_records_into(
        &mut self,
        table: &mut BitTable,
        major_is_shot: bool,
        max_shots: usize,
    ) -> Result<usize> {
        if !major_is_shot {
            let mut scratch = BitTable::new(table.num_minor_padded(), table.num_major_padded());
            let n = self.read_records_into(&mut scratch, true, max_shots)?;
            scratch.transpose_into(table);
            return Ok(n);
        }

        let max_shots = max_shots.min(table.num_major_padded());
        let mut rec = 0;
        while rec < max_shots && self.start_record()? {
            self.read_bits_into_bytes(table.row_bytes_mut(rec))?;
            if !self.is_end_of_record()? {
                return Err(Error::Framing(
                    "a shot contained more bits than expected".into(),
                ));
            }
            rec += 1;
        }
        Ok(rec)
    }
}

/// The bit-at-a-time fill shared by the trait default and the byte-packed
/// decoder's unaligned fallback.
pub(crate) fn drain_bits<T: RecordReader + ?Sized>(
    reader: &mut T,
    out: &mut [u8],
) -> Result<usize> {
    if reader.is_end_of_record()? {
        return Ok(0);
    }
    let result_type = reader.current_result_type();
    let mut n = 0;
    for byte in out.iter_mut() {
        *byte = 0;
        for k in 0..8 {
            *byte |= u8::from(reader.read_bit()?) << k;
            n += 1;
            if reader.is_end_of_record()? || reader.current_result_type() != result_type {
                return Ok(n);
            }
        }
    }
    Ok(n)
}

/// Creates a reader for `format` over `input`.
///
/// `num_detection_events` and `num_observables` must be zero for every
/// format except `dets`, which carries all three sections in the order
/// measurements, detection events, observables. The bulk-only `ptb64`
/// format has no single-shot reader and is rejected.
pub fn make_reader<'a, R: Read + 'a>(
    input: R,
    format: SampleFormat,
    num_measurements: usize,
    num_detection_events: usize,
    num_observables: usize,
) -> Result<Box<dyn RecordReader + 'a>> {
    if format != SampleFormat::Dets && num_detection_events != 0 {
        return Err(Error::Unsupported(
            "only the dets format supports detection event records".into(),
        ));
    }
    if format != SampleFormat::Dets && num_observables != 0 {
        return Err(Error::Unsupported(
            "only the dets format supports logical observable records".into(),
        ));
    }

    let source = ByteSource::new(input);
    match format {
        SampleFormat::Ascii01 => Ok(Box::new(AsciiReader::new(source, num_measurements))),
        SampleFormat::B8 => Ok(Box::new(B8Reader::new(source, num_measurements))),
        SampleFormat::R8 => Ok(Box::new(R8Reader::new(source, num_measurements))),
        SampleFormat::Hits => Ok(Box::new(HitsReader::new(source, num_measurements))),
        SampleFormat::Dets => Ok(Box::new(DetsReader::new(
            source,
            num_measurements,
            num_detection_events,
            num_observables,
        ))),
        SampleFormat::Ptb64 => Err(Error::Unsupported(
            "ptb64 data is stored in 64-shot blocks and cannot be read shot by shot".into(),
        )),
    }
}
