//! Decoder for the "hits" format: comma-separated indices of 1 bits.

use std::io::Read;

use bitvec::prelude::*;

use crate::reader::RecordReader;
use crate::scan::read_u64;
use crate::source::ByteSource;
use crate::{Error, Result};

/// Reads shots encoded as lines of decimal 1-bit indices.
///
/// The whole line is expanded into a scratch bit-row at `start_record`;
/// bits are then served from the scratch row. The row is allocated once
/// and reused across shots. Listing an index twice toggles the bit back
/// off, so duplicates cancel.
pub struct HitsReader<R> {
    source: ByteSource<R>,
    bits_per_record: usize,
    scratch: BitVec<u64, Lsb0>,
    position: usize,
}

impl<R: Read> HitsReader<R> {
    pub fn new(source: ByteSource<R>, bits_per_record: usize) -> Self {
        Self {
            source,
            bits_per_record,
            scratch: bitvec![u64, Lsb0; 0; bits_per_record],
            position: bits_per_record,
        }
    }
}

impl<R: Read> RecordReader for HitsReader<R> {
    fn start_record(&mut self) -> Result<bool> {
        let mut next = self.source.get()?;
        if next.is_none() {
            return Ok(false);
        }
        self.scratch.fill(false);
        self.position = 0;

        let mut is_first = true;
        while next != Some(b'\n') {
            let value = match read_u64(&mut self.source, &mut next, is_first)? {
                Some(value) => value,
                None => {
                    return Err(Error::FormatMismatch(
                        "hits are expected to start immediately at the start of the line or \
                         after a comma"
                            .into(),
                    ));
                }
            };
            if next != Some(b',') && next != Some(b'\n') {
                return Err(Error::FormatMismatch(
                    "hits must be followed by a comma or a line feed".into(),
                ));
            }
            if value >= self.bits_per_record as u64 {
                return Err(Error::OutOfRange(format!(
                    "hit {value} in a record of width {}",
                    self.bits_per_record
                )));
            }
            let index = value as usize;
            let bit = self.scratch[index];
            self.scratch.set(index, !bit);
            is_first = false;
        }
        Ok(true)
    }

    fn next_record(&mut self) -> Result<bool> {
        self.start_record()
    }

    fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.bits_per_record {
            return Err(Error::ReadPastEnd);
        }
        let bit = self.scratch[self.position];
        self.position += 1;
        Ok(bit)
    }

    fn is_end_of_record(&self) -> Result<bool> {
        Ok(self.position >= self.bits_per_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::make_reader;
    use crate::SampleFormat;
    use std::io::Cursor;

    fn reader(data: &str, width: usize) -> Box<dyn RecordReader> {
        make_reader(
            Cursor::new(data.as_bytes().to_vec()),
            SampleFormat::Hits,
            width,
            0,
            0,
        )
        .unwrap()
    }

    #[test]
    fn duplicate_hits_cancel() {
        let mut r = reader("1,3,1\n", 10);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 2];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 10);
        assert_eq!(bytes, [0x08, 0x00]);
        assert!(r.is_end_of_record().unwrap());
        assert!(!r.start_record().unwrap());
    }

    #[test]
    fn empty_line_is_all_zeros() {
        let mut r = reader("\n5\n", 8);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 1];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 8);
        assert_eq!(bytes[0], 0x00);

        assert!(r.start_record().unwrap());
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 8);
        assert_eq!(bytes[0], 0x20);
    }

    #[test]
    fn scratch_row_is_reset_between_shots() {
        let mut r = reader("0,2\n1\n", 4);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 1];
        r.read_bits_into_bytes(&mut bytes).unwrap();
        assert_eq!(bytes[0], 0x05);
        assert!(r.start_record().unwrap());
        r.read_bits_into_bytes(&mut bytes).unwrap();
        assert_eq!(bytes[0], 0x02);
    }

    #[test]
    fn leading_whitespace_is_rejected() {
        let mut r = reader(" 1\n", 10);
        assert!(matches!(r.start_record(), Err(Error::FormatMismatch(_))));
    }

    #[test]
    fn hit_out_of_range_is_rejected() {
        let mut r = reader("10\n", 10);
        assert!(matches!(r.start_record(), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn bad_separator_is_rejected() {
        let mut r = reader("1;2\n", 10);
        assert!(matches!(r.start_record(), Err(Error::FormatMismatch(_))));
    }

    #[test]
    fn unterminated_line_is_rejected() {
        let mut r = reader("1,2", 10);
        assert!(r.start_record().is_err());
    }

    #[test]
    fn overflowing_hit_is_rejected() {
        let mut r = reader("99999999999999999999\n", 10);
        assert!(matches!(r.start_record(), Err(Error::Overflow)));
    }
}
