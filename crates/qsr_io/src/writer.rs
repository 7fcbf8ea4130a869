//! Encoders producing the five single-shot wire formats.
//!
//! Writers mirror the readers byte for byte: anything a writer emits, the
//! matching reader decodes back to the same bits. A record is written as
//! `begin_result_type`, the record's bits in order, then `write_end` to
//! close the shot.

use std::io::Write;

use crate::format::{SampleFormat, SectionKind};
use crate::{Error, Result};

/// A streaming encoder for one shot-record format.
pub trait RecordWriter {
    /// Declares the section kind of the bits that follow.
    ///
    /// Only the labeled format observes this; it restarts the per-section
    /// index count. Other formats ignore it.
    fn begin_result_type(&mut self, kind: SectionKind) -> Result<()> {
        let _ = kind;
        Ok(())
    }

    /// Appends one bit to the current shot.
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Appends `num_bits` bits taken LSB-first from `data`.
    fn write_bytes(&mut self, data: &[u8], num_bits: usize) -> Result<()> {
        for k in 0..num_bits {
            self.write_bit((data[k / 8] >> (k % 8)) & 1 == 1)?;
        }
        Ok(())
    }

    /// Closes the current shot.
    fn write_end(&mut self) -> Result<()>;
}

/// Creates a writer for `format` over `out`.
///
/// The bulk-only `ptb64` format has no single-shot writer and is rejected.
pub fn make_writer<'a, W: Write + 'a>(
    out: W,
    format: SampleFormat,
) -> Result<Box<dyn RecordWriter + 'a>> {
    match format {
        SampleFormat::Ascii01 => Ok(Box::new(AsciiWriter { out })),
        SampleFormat::B8 => Ok(Box::new(B8Writer {
            out,
            payload: 0,
            bits_buffered: 0,
        })),
        SampleFormat::R8 => Ok(Box::new(R8Writer { out, run: 0 })),
        SampleFormat::Hits => Ok(Box::new(HitsWriter {
            out,
            position: 0,
            any_hits: false,
        })),
        SampleFormat::Dets => Ok(Box::new(DetsWriter {
            out,
            kind: SectionKind::Measurement,
            index: 0,
            shot_started: false,
        })),
        SampleFormat::Ptb64 => Err(Error::Unsupported(
            "ptb64 data is stored in 64-shot blocks and cannot be written shot by shot".into(),
        )),
    }
}

struct AsciiWriter<W> {
    out: W,
}

impl<W: Write> RecordWriter for AsciiWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.out.write_all(if bit { b"1" } else { b"0" })?;
        Ok(())
    }

    fn write_end(&mut self) -> Result<()> {
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

struct B8Writer<W> {
    out: W,
    payload: u8,
    bits_buffered: u32,
}

impl<W: Write> B8Writer<W> {
    fn flush_payload(&mut self) -> Result<()> {
        self.out.write_all(&[self.payload])?;
        self.payload = 0;
        self.bits_buffered = 0;
        Ok(())
    }
}

impl<W: Write> RecordWriter for B8Writer<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.payload |= u8::from(bit) << self.bits_buffered;
        self.bits_buffered += 1;
        if self.bits_buffered == 8 {
            self.flush_payload()?;
        }
        Ok(())
    }

    fn write_end(&mut self) -> Result<()> {
        // The tail of the last byte pads with zeros.
        if self.bits_buffered > 0 {
            self.flush_payload()?;
        }
        Ok(())
    }
}

struct R8Writer<W> {
    out: W,
    run: usize,
}

impl<W: Write> R8Writer<W> {
    /// Emits the buffered gap followed by an implicit 1.
    fn flush_run(&mut self) -> Result<()> {
        while self.run >= 0xFF {
            self.out.write_all(&[0xFF])?;
            self.run -= 0xFF;
        }
        self.out.write_all(&[self.run as u8])?;
        self.run = 0;
        Ok(())
    }
}

impl<W: Write> RecordWriter for R8Writer<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.flush_run()?;
        } else {
            self.run += 1;
        }
        Ok(())
    }

    fn write_end(&mut self) -> Result<()> {
        // The synthetic 1 just past the end of the record. When the final
        // data bit was 1 the run is empty and this emits the bare 0x00
        // terminator byte.
        self.flush_run()
    }
}

struct HitsWriter<W> {
    out: W,
    position: u64,
    any_hits: bool,
}

impl<W: Write> RecordWriter for HitsWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            if self.any_hits {
                self.out.write_all(b",")?;
            }
            write!(self.out, "{}", self.position)?;
            self.any_hits = true;
        }
        self.position += 1;
        Ok(())
    }

    fn write_end(&mut self) -> Result<()> {
        self.out.write_all(b"\n")?;
        self.position = 0;
        self.any_hits = false;
        Ok(())
    }
}

struct DetsWriter<W> {
    out: W,
    kind: SectionKind,
    index: u64,
    shot_started: bool,
}

impl<W: Write> DetsWriter<W> {
    fn ensure_shot_keyword(&mut self) -> Result<()> {
        if !self.shot_started {
            self.out.write_all(b"shot")?;
            self.shot_started = true;
        }
        Ok(())
    }
}

impl<W: Write> RecordWriter for DetsWriter<W> {
    fn begin_result_type(&mut self, kind: SectionKind) -> Result<()> {
        self.kind = kind;
        self.index = 0;
        Ok(())
    }

    fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.ensure_shot_keyword()?;
            write!(self.out, " {}{}", self.kind.prefix(), self.index)?;
        }
        self.index += 1;
        Ok(())
    }

    fn write_end(&mut self) -> Result<()> {
        self.ensure_shot_keyword()?;
        self.out.write_all(b"\n")?;
        self.shot_started = false;
        self.index = 0;
        self.kind = SectionKind::Measurement;
        Ok(())
    }
}
