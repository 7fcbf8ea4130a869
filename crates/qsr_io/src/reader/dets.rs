//! Decoder for the "dets" format: labeled multi-section shot lines.
//!
//! Each shot is a line `shot M0 D2 L0 ...` where every token names one set
//! bit as a section letter plus an index within that section. The decoded
//! shot concatenates the measurement, detection-event, and observable
//! sections in that order.

use std::io::Read;

use bitvec::prelude::*;

use crate::format::SectionKind;
use crate::reader::RecordReader;
use crate::scan::{maybe_consume_keyword, read_u64};
use crate::source::ByteSource;
use crate::{Error, Result};

pub struct DetsReader<R> {
    source: ByteSource<R>,
    num_measurements: usize,
    num_detection_events: usize,
    num_observables: usize,
    scratch: BitVec<u64, Lsb0>,
    position: usize,
}

impl<R: Read> DetsReader<R> {
    pub fn new(
        source: ByteSource<R>,
        num_measurements: usize,
        num_detection_events: usize,
        num_observables: usize,
    ) -> Self {
        let total = num_measurements + num_detection_events + num_observables;
        Self {
            source,
            num_measurements,
            num_detection_events,
            num_observables,
            scratch: bitvec![u64, Lsb0; 0; total],
            position: total,
        }
    }

    fn total_bits(&self) -> usize {
        self.num_measurements + self.num_detection_events + self.num_observables
    }

    /// Offset and width of the section a prefix letter selects.
    fn section(&self, prefix: u8) -> Option<(usize, usize)> {
        match prefix {
            b'M' => Some((0, self.num_measurements)),
            b'D' => Some((self.num_measurements, self.num_detection_events)),
            b'L' => Some((
                self.num_measurements + self.num_detection_events,
                self.num_observables,
            )),
            _ => None,
        }
    }
}

impl<R: Read> RecordReader for DetsReader<R> {
    fn start_record(&mut self) -> Result<bool> {
        let mut next = match maybe_consume_keyword(&mut self.source, "shot")? {
            None => return Ok(false),
            Some(next) => next,
        };
        self.scratch.fill(false);
        self.position = 0;

        loop {
            let had_spacing = next == Some(b' ');
            while next == Some(b' ') {
                next = self.source.get()?;
            }
            if next == Some(b'\n') || next.is_none() {
                break;
            }
            if !had_spacing {
                return Err(Error::FormatMismatch(
                    "dets values must be separated by spaces".into(),
                ));
            }
            let Some(prefix) = next else { break };
            let (offset, size) = match self.section(prefix) {
                Some(section) => section,
                None => {
                    return Err(Error::FormatMismatch(format!(
                        "unrecognized dets prefix: '{}'",
                        prefix as char
                    )));
                }
            };
            let value = match read_u64(&mut self.source, &mut next, false)? {
                Some(value) => value,
                None => {
                    return Err(Error::FormatMismatch(format!(
                        "dets prefix '{}' wasn't followed by an integer",
                        prefix as char
                    )));
                }
            };
            if value >= size as u64 {
                return Err(Error::OutOfRange(format!(
                    "got '{}{}' but the {} section has {} bits",
                    prefix as char,
                    value,
                    prefix as char,
                    size
                )));
            }
            let index = offset + value as usize;
            let bit = self.scratch[index];
            self.scratch.set(index, !bit);
        }
        Ok(true)
    }

    fn next_record(&mut self) -> Result<bool> {
        self.start_record()
    }

    fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.total_bits() {
            return Err(Error::ReadPastEnd);
        }
        let bit = self.scratch[self.position];
        self.position += 1;
        Ok(bit)
    }

    fn is_end_of_record(&self) -> Result<bool> {
        Ok(self.position == self.total_bits())
    }

    fn current_result_type(&self) -> SectionKind {
        if self.position < self.num_measurements && self.num_measurements > 0 {
            return SectionKind::Measurement;
        }
        if self.position < self.num_measurements + self.num_detection_events
            && self.num_detection_events > 0
        {
            return SectionKind::Detection;
        }
        if self.num_observables > 0 {
            return SectionKind::Logical;
        }
        if self.num_detection_events > 0 {
            return SectionKind::Detection;
        }
        SectionKind::Measurement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::make_reader;
    use crate::SampleFormat;
    use std::io::Cursor;

    fn reader(data: &str, m: usize, d: usize, l: usize) -> Box<dyn RecordReader> {
        make_reader(
            Cursor::new(data.as_bytes().to_vec()),
            SampleFormat::Dets,
            m,
            d,
            l,
        )
        .unwrap()
    }

    #[test]
    fn sections_decode_in_order() {
        let mut r = reader("shot M0 D1 L0\n", 3, 2, 1);
        assert!(r.start_record().unwrap());

        let mut kinds = Vec::new();
        let mut bits = Vec::new();
        for _ in 0..6 {
            kinds.push(r.current_result_type());
            bits.push(r.read_bit().unwrap());
        }
        use SectionKind::*;
        assert_eq!(
            kinds,
            [Measurement, Measurement, Measurement, Detection, Detection, Logical]
        );
        assert_eq!(bits, [true, false, false, false, true, true]);
        assert!(r.is_end_of_record().unwrap());
        assert!(!r.start_record().unwrap());
    }

    #[test]
    fn byte_fill_stops_at_section_changes() {
        let mut r = reader("shot M0 D1 L0\n", 3, 2, 1);
        assert!(r.start_record().unwrap());

        let mut bytes = [0u8; 1];
        assert_eq!(r.current_result_type(), SectionKind::Measurement);
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 3);
        assert_eq!(bytes[0], 0x01);

        assert_eq!(r.current_result_type(), SectionKind::Detection);
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 2);
        assert_eq!(bytes[0], 0x02);

        assert_eq!(r.current_result_type(), SectionKind::Logical);
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 1);
        assert_eq!(bytes[0], 0x01);
        assert!(r.is_end_of_record().unwrap());
    }

    #[test]
    fn duplicate_tokens_cancel() {
        let mut r = reader("shot D1 D1 D0\n", 0, 3, 0);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 1];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 3);
        assert_eq!(bytes[0], 0x01);
    }

    #[test]
    fn empty_shot_line_is_all_zeros() {
        let mut r = reader("shot\n", 2, 2, 0);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 1];
        // Measurement section, then detection section.
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 2);
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 2);
        assert!(r.is_end_of_record().unwrap());
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let mut r = reader("shot X0\n", 1, 1, 1);
        assert!(matches!(r.start_record(), Err(Error::FormatMismatch(_))));
    }

    #[test]
    fn index_out_of_section_range_is_rejected() {
        let mut r = reader("shot D5\n", 3, 2, 1);
        assert!(matches!(r.start_record(), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn missing_space_between_tokens_is_rejected() {
        let mut r = reader("shot M0D1\n", 3, 2, 1);
        assert!(matches!(r.start_record(), Err(Error::FormatMismatch(_))));
    }

    #[test]
    fn keyword_mismatch_is_rejected() {
        let mut r = reader("spot M0\n", 3, 2, 1);
        assert!(matches!(r.start_record(), Err(Error::FormatMismatch(_))));
    }

    #[test]
    fn eof_at_record_boundary_is_clean() {
        let mut r = reader("", 3, 2, 1);
        assert!(!r.start_record().unwrap());
    }
}
