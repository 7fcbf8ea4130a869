//! Shot-record I/O for Clifford-circuit simulation data.
//!
//! Measurement and detection-event samples move between tools in a handful
//! of on-disk formats with very different framing: ASCII 0/1 lines, raw
//! LSB-first packed bytes, run-length gap encoding, sparse hit-index lines,
//! and labeled multi-section `shot ...` lines. This crate decodes all of
//! them through one streaming [`RecordReader`] interface that deposits bits
//! into the bit-packed rows and tables of [`qsr_core`], and encodes them
//! back through the matching [`RecordWriter`] interface.

use thiserror::Error;

/// Wire-format identifiers and the section kinds carried inside a shot.
pub mod format;

/// Byte-oriented input with single-byte and bulk reads.
pub mod source;

/// The streaming reader interface, its five format decoders, and bulk
/// decode into a bit table.
pub mod reader;

/// The streaming writer interface and its format encoders.
pub mod writer;

mod scan;

pub use format::{SampleFormat, SectionKind};
pub use reader::{RecordReader, make_reader};
pub use source::ByteSource;
pub use writer::{RecordWriter, make_writer};

/// Result type of the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by shot-record readers and writers.
///
/// Every failure is reported synchronously at the call that detected it and
/// leaves the reader unusable for further decoding. Clean end-of-input at a
/// shot boundary is not an error; readers report it as `start_record()`
/// returning `Ok(false)`.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying byte source.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A character or byte inconsistent with the declared format.
    #[error("unexpected input: {0}")]
    FormatMismatch(String),

    /// A shot ended earlier or later than its declared width allows.
    #[error("broken record framing: {0}")]
    Framing(String),

    /// A decimal index in the input overflowed while being parsed.
    #[error("integer value in input was too big")]
    Overflow,

    /// A hit or label index at or past the width of its section.
    #[error("index out of range: {0}")]
    OutOfRange(String),

    /// The input ended while a shot was still in progress.
    #[error("input ended mid-record: {0}")]
    EndOfInput(String),

    /// A bit was requested after the current shot was exhausted.
    #[error("attempted to read past the end of the record")]
    ReadPastEnd,

    /// The requested format or section combination has no single-shot codec.
    #[error("unsupported: {0}")]
    Unsupported(String),
}
