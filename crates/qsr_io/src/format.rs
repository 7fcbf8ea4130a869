use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The on-disk sample formats understood by the codec layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    /// One ASCII line of '0'/'1' characters per shot ("01").
    Ascii01,
    /// Raw bytes, bits packed LSB-first, no delimiters ("b8").
    B8,
    /// Run-length gaps between successive 1 bits ("r8").
    R8,
    /// One line of comma-separated indices of 1 bits per shot ("hits").
    Hits,
    /// Labeled `shot M.. D.. L..` lines with three sections ("dets").
    Dets,
    /// 64-shot transposed blocks ("ptb64"). Bulk-only; the single-shot
    /// reader factory rejects it.
    Ptb64,
}

impl SampleFormat {
    /// The format's conventional short name, as used in file extensions
    /// and on command lines.
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::Ascii01 => "01",
            SampleFormat::B8 => "b8",
            SampleFormat::R8 => "r8",
            SampleFormat::Hits => "hits",
            SampleFormat::Dets => "dets",
            SampleFormat::Ptb64 => "ptb64",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "01" => Ok(SampleFormat::Ascii01),
            "b8" => Ok(SampleFormat::B8),
            "r8" => Ok(SampleFormat::R8),
            "hits" => Ok(SampleFormat::Hits),
            "dets" => Ok(SampleFormat::Dets),
            "ptb64" => Ok(SampleFormat::Ptb64),
            other => Err(Error::Unsupported(format!(
                "unrecognized sample format '{other}'"
            ))),
        }
    }
}

/// The kind of bit section a shot position belongs to.
///
/// Only the labeled "dets" format distinguishes sections on the wire; all
/// other formats carry a single measurement section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Measurement,
    Detection,
    Logical,
}

impl SectionKind {
    /// The single-letter wire prefix used by the labeled format.
    pub fn prefix(self) -> char {
        match self {
            SectionKind::Measurement => 'M',
            SectionKind::Detection => 'D',
            SectionKind::Logical => 'L',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for format in [
            SampleFormat::Ascii01,
            SampleFormat::B8,
            SampleFormat::R8,
            SampleFormat::Hits,
            SampleFormat::Dets,
            SampleFormat::Ptb64,
        ] {
            assert_eq!(format.name().parse::<SampleFormat>().unwrap(), format);
        }
        assert!("q1".parse::<SampleFormat>().is_err());
    }

    #[test]
    fn section_prefixes() {
        assert_eq!(SectionKind::Measurement.prefix(), 'M');
        assert_eq!(SectionKind::Detection.prefix(), 'D');
        assert_eq!(SectionKind::Logical.prefix(), 'L');
    }
}
