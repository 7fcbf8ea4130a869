//! Decoder for the "r8" format: run-length gaps between 1 bits.
//!
//! Each byte is the number of 0 bits before the next 1 bit; 0xFF means
//! "255 zeros and keep counting". Every record carries one synthetic 1
//! just past its end, so a record whose data ends in zeros closes with a
//! run landing exactly one past the width, and a record whose final data
//! bit is 1 closes with an explicit 0x00 terminator byte.

use std::io::Read;

use crate::reader::RecordReader;
use crate::source::ByteSource;
use crate::{Error, Result};

pub struct R8Reader<R> {
    source: ByteSource<R>,
    bits_per_record: usize,
    buffered_0s: usize,
    buffered_1s: usize,
    position: usize,
    have_seen_terminal_1: bool,
}

impl<R: Read> R8Reader<R> {
    pub fn new(source: ByteSource<R>, bits_per_record: usize) -> Self {
        Self {
            source,
            bits_per_record,
            buffered_0s: 0,
            buffered_1s: 0,
            position: 0,
            have_seen_terminal_1: false,
        }
    }

    fn at_end(&self) -> bool {
        self.position == self.bits_per_record && self.have_seen_terminal_1
    }

    /// Refills the run buffers from the next gap in the input.
    ///
    /// Returns `Ok(false)` only for clean end of input at a record start.
    /// Decides by arithmetic whether the run's 1 bit is record data (a
    /// terminator byte must follow) or the synthetic 1 past the end.
    fn maybe_buffer_data(&mut self) -> Result<bool> {
        debug_assert_eq!(self.buffered_0s, 0);
        debug_assert_eq!(self.buffered_1s, 0);
        if self.at_end() {
            return Err(Error::ReadPastEnd);
        }

        loop {
            match self.source.get()? {
                None => {
                    if self.buffered_0s == 0 && self.position == 0 {
                        // No next record.
                        return Ok(false);
                    }
                    return Err(Error::EndOfInput(
                        "r8 data ended on a continuation (a 0xFF byte)".into(),
                    ));
                }
                Some(gap) => {
                    self.buffered_0s += gap as usize;
                    if gap != 0xFF {
                        break;
                    }
                }
            }
        }
        self.buffered_1s = 1;

        let total_data = self.position + self.buffered_0s + self.buffered_1s;
        if total_data == self.bits_per_record {
            // The 1 is real data, so the synthetic 1 past the end must
            // follow as an explicit zero-gap terminator byte.
            match self.source.get()? {
                None => {
                    return Err(Error::EndOfInput(
                        "r8 record ended in a 1 with no 0x00 terminator before end of input".into(),
                    ));
                }
                Some(0) => {}
                Some(_) => {
                    return Err(Error::Framing(
                        "r8 record ended in a 1 with no 0x00 terminator before further data".into(),
                    ));
                }
            }
            self.have_seen_terminal_1 = true;
        } else if total_data == self.bits_per_record + 1 {
            self.have_seen_terminal_1 = true;
            self.buffered_1s = 0;
        } else if total_data > self.bits_per_record + 1 {
            return Err(Error::Framing(
                "r8 data encoded a jump past the end of the record".into(),
            ));
        }
        Ok(true)
    }
}

impl<R: Read> RecordReader for R8Reader<R> {
    fn start_record(&mut self) -> Result<bool> {
        self.position = 0;
        self.have_seen_terminal_1 = false;
        self.maybe_buffer_data()
    }

    fn next_record(&mut self) -> Result<bool> {
        while !self.is_end_of_record()? {
            self.read_bit()?;
        }
        self.start_record()
    }

    fn read_bit(&mut self) -> Result<bool> {
        if self.buffered_0s == 0 && self.buffered_1s == 0 {
            self.maybe_buffer_data()?;
        }
        if self.buffered_0s > 0 {
            self.buffered_0s -= 1;
            self.position += 1;
            Ok(false)
        } else if self.buffered_1s > 0 {
            self.buffered_1s -= 1;
            self.position += 1;
            Ok(true)
        } else {
            Err(Error::ReadPastEnd)
        }
    }

    fn is_end_of_record(&self) -> Result<bool> {
        Ok(self.at_end())
    }

    fn read_bits_into_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        for byte in out.iter_mut() {
            *byte = 0;
            if self.buffered_0s >= 8 {
                // A whole byte of zeros needs no bit-level work.
                self.buffered_0s -= 8;
                self.position += 8;
                n += 8;
                continue;
            }
            for k in 0..8 {
                if self.buffered_0s == 0 && self.buffered_1s == 0 && !self.have_seen_terminal_1 {
                    self.maybe_buffer_data()?;
                }
                if self.at_end() {
                    return Ok(n);
                }
                *byte |= u8::from(self.read_bit()?) << k;
                n += 1;
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::make_reader;
    use crate::SampleFormat;
    use std::io::Cursor;

    fn reader(data: &[u8], width: usize) -> Box<dyn RecordReader> {
        make_reader(Cursor::new(data.to_vec()), SampleFormat::R8, width, 0, 0).unwrap()
    }

    #[test]
    fn absorbed_terminator_variant() {
        // Width 16 with only bit 3 set: gap of 3, then the closing run
        // lands one past the end, absorbing the terminator.
        let mut r = reader(&[0x03, 0x0C], 16);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 2];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 16);
        assert_eq!(bytes, [0x08, 0x00]);
        assert!(r.is_end_of_record().unwrap());
        assert!(!r.start_record().unwrap());
    }

    #[test]
    fn explicit_terminator_variant() {
        // Width 16 with the final bit set: the data's 1 lands exactly at
        // the width, so a 0x00 terminator byte must follow.
        let mut r = reader(&[0x0F, 0x00], 16);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 2];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 16);
        assert_eq!(bytes, [0x00, 0x80]);
        assert!(r.is_end_of_record().unwrap());
        assert!(!r.start_record().unwrap());
    }

    #[test]
    fn continuation_spans_wide_all_zero_record() {
        let mut r = reader(&[0xFF, 0x2D], 300);
        assert!(r.start_record().unwrap());
        let mut count = 0;
        while !r.is_end_of_record().unwrap() {
            assert!(!r.read_bit().unwrap());
            count += 1;
        }
        assert_eq!(count, 300);
        assert!(!r.start_record().unwrap());
    }

    #[test]
    fn bulk_read_skips_zero_bytes() {
        let mut r = reader(&[0xFF, 0x2D], 300);
        assert!(r.start_record().unwrap());
        let mut bytes = [0xFFu8; 38];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 300);
        assert!(bytes[..37].iter().all(|&b| b == 0));
        assert_eq!(bytes[37], 0);
        assert!(r.is_end_of_record().unwrap());
    }

    #[test]
    fn missing_terminator_is_an_error() {
        assert!(matches!(
            reader(&[0x0F], 16).start_record(),
            Err(Error::EndOfInput(_))
        ));
        assert!(matches!(
            reader(&[0x0F, 0x05], 16).start_record(),
            Err(Error::Framing(_))
        ));
    }

    #[test]
    fn jump_past_end_is_an_error() {
        assert!(matches!(
            reader(&[0x20], 16).start_record(),
            Err(Error::Framing(_))
        ));
    }

    #[test]
    fn ending_on_continuation_is_an_error() {
        assert!(matches!(
            reader(&[0xFF], 300).start_record(),
            Err(Error::EndOfInput(_))
        ));
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(!reader(&[], 16).start_record().unwrap());
    }

    #[test]
    fn consecutive_records() {
        // Two 8-bit records: bits 0 and 2 set, then all zeros.
        let mut r = reader(&[0x00, 0x01, 0x05, 0x08], 8);
        assert!(r.start_record().unwrap());
        let mut bytes = [0u8; 1];
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 8);
        assert_eq!(bytes[0], 0x05);
        assert!(r.start_record().unwrap());
        assert_eq!(r.read_bits_into_bytes(&mut bytes).unwrap(), 8);
        assert_eq!(bytes[0], 0x00);
        assert!(!r.start_record().unwrap());
    }
}
