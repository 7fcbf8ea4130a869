//! Decoder for the "b8" format: raw bytes, bits packed LSB-first.

use std::io::Read;

use crate::reader::{RecordReader, drain_bits};
use crate::source::ByteSource;
use crate::{Error, Result};

/// Reads shots stored as `ceil(width / 8)` raw bytes each.
///
/// There is no in-band delimiter; the shot count is however many whole
/// shots fit before end of input. End of input at a shot boundary ends
/// decoding cleanly.
pub struct B8Reader<R> {
    source: ByteSource<R>,
    bits_per_record: usize,
    payload: Option<u8>,
    bits_available: u32,
    position: usize,
}

impl<R: Read> B8Reader<R> {
    pub fn new(source: ByteSource<R>, bits_per_record: usize) -> Self {
        Self {
            source,
            bits_per_record,
            payload: None,
            bits_available: 0,
            position: bits_per_record,
        }
    }

    fn maybe_update_payload(&mut self) -> Result<()> {
        if self.bits_available > 0 {
            return Ok(());
        }
        self.payload = self.source.get()?;
        if self.payload.is_some() {
            self.bits_available = 8;
        }
        Ok(())
    }
}

impl<R: Read> RecordReader for B8Reader<R> {
    fn start_record(&mut self) -> Result<bool> {
        self.position = 0;
        self.bits_available = 0;
        self.payload = None;
        self.maybe_update_payload()?;
        Ok(self.payload.is_some())
    }

    fn next_record(&mut self) -> Result<bool> {
        while !self.is_end_of_record()? {
            self.read_bit()?;
        }
        self.start_record()
    }

    fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.bits_per_record {
            return Err(Error::ReadPastEnd);
        }
        self.maybe_update_payload()?;
        let payload = match self.payload.as_mut() {
            None => {
                return Err(Error::EndOfInput(
                    "b8 data ran out in the middle of a record".into(),
                ));
            }
            Some(p) => p,
        };
        let bit = *payload & 1 == 1;
        *payload >>= 1;
        self.bits_available -= 1;
        self.position += 1;
        Ok(bit)
    }

    fn is_end_of_record(&self) -> Result<bool> {
        Ok(self.position >= self.bits_per_record)
    }

    fn read_bits_into_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.position >= self.bits_per_record {
            return Ok(0);
        }
        if self.bits_available > 0 {
            // Mid-byte; fall back to bit-at-a-time until realigned.
            return drain_bits(self, out);
        }

        let mut n_bits = (8 * out.len()).min(self.bits_per_record - self.position);
        let n_bytes = n_bits.div_ceil(8);
        let got = self.source.read_block(&mut out[..n_bytes])?;
        n_bits = (8 * got).min(n_bits);
        self.position += n_bits;
        Ok(n_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::make_reader;
    use crate::SampleFormat;
    use std::io::Cursor;

    fn reader(data: &[u8], width: usize) -> Box<dyn RecordReader> {
        make_reader(Cursor::new(data.to_vec()), SampleFormat::B8, width, 0, 0).unwrap()
    }

    #[test]
    fn decodes_two_shots_with_dont_care_tail() {
        let mut r = reader(&[0xAA, 0x0C, 0x55, 0x03], 12);

        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 2];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 12);
        assert_eq!(bytes, [0xAA, 0x0C]);
        assert!(r.is_end_of_record().unwrap());
        // The reader never produces the top 4 bits of the second byte.
        assert!(matches!(r.read_bit(), Err(Error::ReadPastEnd)));

        assert!(r.start_record().unwrap());
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 12);
        assert_eq!(bytes, [0x55, 0x03]);

        assert!(!r.start_record().unwrap());
    }

    #[test]
    fn bulk_path_after_byte_aligned_drain() {
        let mut r = reader(&[0xAA, 0x0C], 12);
        assert!(r.start_record().unwrap());
        // Drain the buffered lookahead byte bit by bit, leaving the cursor
        // byte-aligned so the remaining bits arrive via one block read.
        let mut low = 0u8;
        for k in 0..8 {
            low |= u8::from(r.read_bit().unwrap()) << k;
        }
        assert_eq!(low, 0xAA);
        let mut rest = [0u8; 1];
        assert_eq!(r.read_bits_into_bytes(&mut rest).unwrap(), 4);
        assert_eq!(rest[0], 0x0C);
        assert!(r.is_end_of_record().unwrap());
    }

    #[test]
    fn bit_by_bit_agrees_with_bulk() {
        let data = [0x5Eu8, 0x01, 0x3C, 0x02];
        let mut bulk = reader(&data, 10);
        let mut bitwise = reader(&data, 10);
        for _ in 0..2 {
            assert!(bulk.start_record().unwrap());
            assert!(bitwise.start_record().unwrap());
            let mut bytes = [0u8; 2];
            bulk.read_bits_into_bytes(&mut bytes).unwrap();
            for k in 0..10 {
                assert_eq!(
                    bitwise.read_bit().unwrap(),
                    (bytes[k / 8] >> (k % 8)) & 1 == 1
                );
            }
        }
    }

    #[test]
    fn truncated_record_reports_end_of_input() {
        let mut r = reader(&[0xFF], 12);
        assert!(r.start_record().unwrap());
        for _ in 0..8 {
            r.read_bit().unwrap();
        }
        assert!(matches!(r.read_bit(), Err(Error::EndOfInput(_))));
    }

    #[test]
    fn empty_input_has_no_records() {
        let mut r = reader(&[], 8);
        assert!(!r.start_record().unwrap());
    }
}
