//! Fixed-width lowercase hex encoding for trace and span identifiers.
//!
//! Encoding writes straight into a caller-provided buffer at an offset so the
//! traceparent encoder can assemble its fixed-layout header without
//! intermediate allocations. Decoding reports the first invalid character
//! together with its absolute position in the source text.

use crate::error::{PropagationError, Result};

/// Number of hex characters produced per byte.
pub const BYTE_BASE16: usize = 2;

/// Encodes `bytes` as lowercase hex into `dest[offset..offset + 2 * bytes.len()]`.
///
/// # Errors
///
/// Returns [`PropagationError::OutOfRange`] if `dest` is too short.
pub fn encode_into(bytes: &[u8], dest: &mut [u8], offset: usize) -> Result<()> {
    let needed = bytes.len() * BYTE_BASE16;
    let available = dest_available(dest.len(), offset);
    let window = window_mut(dest, offset, needed)?;
    hex::encode_to_slice(bytes, window).map_err(|_| PropagationError::OutOfRange {
        offset,
        needed,
        available,
    })
}

/// Encodes a `u64` as 16 big-endian lowercase hex characters into `dest`.
///
/// # Errors
///
/// Returns [`PropagationError::OutOfRange`] if `dest` is too short.
pub fn encode_u64_into(value: u64, dest: &mut [u8], offset: usize) -> Result<()> {
    encode_into(&value.to_be_bytes(), dest, offset)
}

/// Encodes `bytes` as an owned lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes `2 * out.len()` hex characters of `text`, starting at `offset`,
/// into `out`. Both upper and lower case digits are accepted.
///
/// # Errors
///
/// - [`PropagationError::OutOfRange`] if fewer characters remain than needed.
/// - [`PropagationError::InvalidEncoding`] naming the first non-hex character.
pub fn decode_into(text: &str, offset: usize, out: &mut [u8]) -> Result<()> {
    let needed = out.len() * BYTE_BASE16;
    let window = window(text.as_bytes(), offset, needed)?;
    hex::decode_to_slice(window, out).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            invalid_character(text, offset + index, c)
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            PropagationError::OutOfRange {
                offset,
                needed,
                available: text.len().saturating_sub(offset),
            }
        }
    })
}

/// Decodes 16 hex characters at `offset` as a big-endian `u64`.
///
/// Digit order always matches byte order, independent of host endianness.
///
/// # Errors
///
/// Same as [`decode_into`].
pub fn decode_u64(text: &str, offset: usize) -> Result<u64> {
    let mut bytes = [0u8; 8];
    decode_into(text, offset, &mut bytes)?;
    Ok(u64::from_be_bytes(bytes))
}

/// Checks that `text[offset..offset + len]` only contains `[0-9a-f]`.
///
/// # Errors
///
/// - [`PropagationError::OutOfRange`] if the range runs past the end of `text`.
/// - [`PropagationError::InvalidEncoding`] naming the first offending character.
pub fn validate_lowercase(text: &str, offset: usize, len: usize) -> Result<()> {
    let window = window(text.as_bytes(), offset, len)?;
    match window
        .iter()
        .position(|b| !matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        Some(pos) => Err(invalid_character(
            text,
            offset + pos,
            char::from(window[pos]),
        )),
        None => Ok(()),
    }
}

/// Returns the value of a single hex digit, or `None` if `byte` is not one.
pub fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn window(src: &[u8], offset: usize, needed: usize) -> Result<&[u8]> {
    src.get(offset..offset.saturating_add(needed))
        .ok_or(PropagationError::OutOfRange {
            offset,
            needed,
            available: src.len().saturating_sub(offset),
        })
}

fn window_mut(dest: &mut [u8], offset: usize, needed: usize) -> Result<&mut [u8]> {
    let available = dest_available(dest.len(), offset);
    dest.get_mut(offset..offset.saturating_add(needed))
        .ok_or(PropagationError::OutOfRange {
            offset,
            needed,
            available,
        })
}

fn dest_available(len: usize, offset: usize) -> usize {
    len.saturating_sub(offset)
}

// Reports the real character when the index sits on a char boundary, so a
// multi-byte UTF-8 character is not shown as its first byte.
fn invalid_character(text: &str, index: usize, fallback: char) -> PropagationError {
    let character = text
        .get(index..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(fallback);
    PropagationError::InvalidEncoding { character, index }
}
