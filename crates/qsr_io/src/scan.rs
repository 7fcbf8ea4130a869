//! Shared micro-parsers for the textual formats.

use std::io::Read;

use crate::source::ByteSource;
use crate::{Error, Result};

/// Tries to consume `keyword` at the current position.
///
/// Returns `Ok(None)` when end of input is found before the first keyword
/// character. On success returns the first byte after the keyword (or
/// `None` if the keyword was the last thing in the input). Any mismatch
/// inside the keyword is a hard error.
pub(crate) fn maybe_consume_keyword<R: Read>(
    source: &mut ByteSource<R>,
    keyword: &str,
) -> Result<Option<Option<u8>>> {
    let mut next = source.get()?;
    if next.is_none() {
        return Ok(None);
    }

    for want in keyword.bytes() {
        if next != Some(want) {
            return Err(Error::FormatMismatch(format!(
                "failed to find expected string \"{keyword}\""
            )));
        }
        next = source.get()?;
    }

    Ok(Some(next))
}

/// Parses a decimal unsigned integer at the current position.
///
/// When `include_next` is set, `*next` is treated as the first character;
/// otherwise a fresh byte is read first. Returns `Ok(None)` without
/// consuming further input when the first character is not a digit. On
/// success `*next` holds the first byte after the digits.
pub(crate) fn read_u64<R: Read>(
    source: &mut ByteSource<R>,
    next: &mut Option<u8>,
    include_next: bool,
) -> Result<Option<u64>> {
    if !include_next {
        *next = source.get()?;
    }
    match *next {
        Some(c) if c.is_ascii_digit() => {}
        _ => return Ok(None),
    }

    let mut value: u64 = 0;
    while let Some(c) = *next {
        if !c.is_ascii_digit() {
            break;
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(c - b'0')))
            .ok_or(Error::Overflow)?;
        *next = source.get()?;
    }
    Ok(Some(value))
}
