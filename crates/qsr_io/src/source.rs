use std::io::{self, ErrorKind, Read};

/// A byte-oriented input source with one-byte and bulk reads.
///
/// Thin wrapper over any [`Read`] implementation. Decoders pull single
/// bytes through [`get`](ByteSource::get) for framed formats and whole
/// blocks through [`read_block`](ByteSource::read_block) where the format
/// permits bulk copies, so callers should hand in buffered readers for
/// byte-at-a-time formats.
pub struct ByteSource<R> {
    inner: R,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads one byte. `None` means end of input.
    pub fn get(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Fills `out` from the input, returning the number of bytes read.
    ///
    /// Short counts occur only at end of input.
    pub fn read_block(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < out.len() {
            match self.inner.read(&mut out[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}
