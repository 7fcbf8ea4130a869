//! Decoder for the "01" format: one ASCII line of '0'/'1' per shot.

use std::io::Read;

use crate::reader::RecordReader;
use crate::source::ByteSource;
use crate::{Error, Result};

/// Reads shots encoded as line-feed terminated runs of '0' and '1'.
///
/// Keeps a one-character lookahead so end-of-record and end-of-input are
/// always decidable without unreading. The initial lookahead is a line-feed
/// sentinel, which makes the first `start_record` indistinguishable from
/// any later one.
pub struct AsciiReader<R> {
    source: ByteSource<R>,
    payload: Option<u8>,
    position: usize,
    bits_per_record: usize,
}

impl<R: Read> AsciiReader<R> {
    pub fn new(source: ByteSource<R>, bits_per_record: usize) -> Self {
        Self {
            source,
            payload: Some(b'\n'),
            position: bits_per_record,
            bits_per_record,
        }
    }
}

impl<R: Read> RecordReader for AsciiReader<R> {
    fn start_record(&mut self) -> Result<bool> {
        self.payload = self.source.get()?;
        self.position = 0;
        Ok(self.payload.is_some())
    }

    fn next_record(&mut self) -> Result<bool> {
        while let Some(c) = self.payload {
            if c == b'\n' {
                break;
            }
            if self.position > self.bits_per_record {
                return Err(Error::Framing(format!(
                    "line too long for a width of {} in 01 format",
                    self.bits_per_record
                )));
            }
            self.position += 1;
            self.payload = self.source.get()?;
        }
        self.start_record()
    }

    fn read_bit(&mut self) -> Result<bool> {
        let payload = match self.payload {
            None => {
                return Err(Error::EndOfInput(
                    "attempted to read a bit past end-of-file".into(),
                ));
            }
            Some(c) => c,
        };
        if payload == b'\n' || self.position >= self.bits_per_record {
            return Err(Error::ReadPastEnd);
        }
        let bit = match payload {
            b'0' => false,
            b'1' => true,
            other => {
                return Err(Error::FormatMismatch(format!(
                    "expected '0' or '1' in 01 format data but got '{}'",
                    other as char
                )));
            }
        };
        self.payload = self.source.get()?;
        self.position += 1;
        Ok(bit)
    }

    fn is_end_of_record(&self) -> Result<bool> {
        let payload_ended = matches!(self.payload, None | Some(b'\n'));
        let expected_end = self.position >= self.bits_per_record;
        if payload_ended && !expected_end {
            return Err(Error::Framing(
                "record in 01 format ended before its expected length".into(),
            ));
        }
        if !payload_ended && expected_end {
            return Err(Error::Framing(
                "record in 01 format did not end at its expected length".into(),
            ));
        }
        Ok(payload_ended)
    }
}
