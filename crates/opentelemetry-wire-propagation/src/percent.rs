//! RFC 3986 percent-encoding for baggage values and metadata.
//!
//! The escaper keeps alphanumerics, the unreserved marks and the
//! sub-delimiters that carry no meaning inside a baggage header; everything
//! else, including every byte of a non-ASCII character, becomes an uppercase
//! `%XY` triplet. Inputs made only of safe characters are returned borrowed.
//!
//! Rust strings are always valid UTF-8, so unpaired surrogates cannot reach
//! the escaper.

use crate::error::{PropagationError, Result};
use crate::hex_codec::digit_value;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::borrow::Cow;

/// Bytes that must be escaped: everything except ALPHA / DIGIT, the
/// unreserved marks `-._~` and the sub-delimiters `!$&'()*+=`. The
/// sub-delimiters `,` and `;` are baggage separators and stay escaped.
const BAGGAGE_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b'=');

/// Percent-encodes `text` for use as a baggage value or metadata.
///
/// # Examples
///
/// ```
/// use opentelemetry_wire_propagation::percent;
///
/// assert_eq!(percent::escape("plain-value"), "plain-value");
/// assert_eq!(percent::escape("a b,c"), "a%20b%2Cc");
/// assert_eq!(percent::escape("é"), "%C3%A9");
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
    utf8_percent_encode(text, BAGGAGE_ESCAPE_SET).into()
}

/// Returns whether `byte` passes through [`escape`] unchanged.
pub fn is_safe(byte: u8) -> bool {
    // `AsciiSet::contains` is not public; an unescaped ASCII byte encodes to
    // a single-byte chunk, an escaped one to a `%XY` triplet.
    byte.is_ascii()
        && percent_encoding::percent_encode(&[byte], BAGGAGE_ESCAPE_SET)
            .next()
            .is_some_and(|chunk| chunk.len() == 1)
}

/// Decodes every `%XY` triplet in `text` and interprets the resulting bytes
/// as UTF-8. `+` is left as is.
///
/// # Errors
///
/// Returns [`PropagationError::InvalidArgument`] if an escape is truncated or
/// contains a non-hex digit, or if the decoded bytes are not valid UTF-8.
pub fn decode(text: &str) -> Result<Cow<'_, str>> {
    if !text.contains('%') {
        return Ok(Cow::Borrowed(text));
    }

    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }

        let high = bytes.get(i + 1).copied().and_then(digit_value);
        let low = bytes.get(i + 2).copied().and_then(digit_value);
        match (high, low) {
            (Some(high), Some(low)) => {
                decoded.push((high << 4) | low);
                i += 3;
            }
            _ => {
                return Err(PropagationError::invalid_argument(
                    "malformed percent escape",
                    text,
                ));
            }
        }
    }

    String::from_utf8(decoded)
        .map(Cow::Owned)
        .map_err(|_| PropagationError::invalid_argument("decoded bytes are not UTF-8", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn safe_strings_are_borrowed(s in "[A-Za-z0-9._~!$&'()*+=-]{0,64}") {
            prop_assert!(matches!(escape(&s), Cow::Borrowed(_)));
            prop_assert_eq!(escape(&s), s.as_str());
        }

        #[test]
        fn decode_inverts_escape(s in any::<String>()) {
            let escaped = escape(&s);
            prop_assert!(escaped.bytes().all(|b| is_safe(b) || b == b'%' || b.is_ascii_hexdigit()));
            prop_assert_eq!(decode(&escaped).unwrap(), s.as_str());
        }
    }

    #[test]
    fn test_escape_baggage_delimiters() {
        assert_eq!(escape("k=v"), "k=v");
        assert_eq!(escape("a,b;c"), "a%2Cb%3Bc");
        assert_eq!(escape("quote\"back\\slash"), "quote%22back%5Cslash");
        assert_eq!(escape("100%"), "100%25");
    }

    #[test]
    fn test_escape_multibyte_code_points() {
        // 2, 3 and 4 byte UTF-8 sequences become 2, 3 and 4 triplets.
        assert_eq!(escape("ß"), "%C3%9F");
        assert_eq!(escape("€"), "%E2%82%AC");
        assert_eq!(escape("😀"), "%F0%9F%98%80");
        assert_eq!(escape("a😀b"), "a%F0%9F%98%80b");
    }

    #[test]
    fn test_decode_without_escapes_is_borrowed() {
        assert!(matches!(decode("value+1"), Ok(Cow::Borrowed("value+1"))));
    }

    #[test]
    fn test_decode_lowercase_and_uppercase_digits() {
        assert_eq!(decode("%c3%a9%C3%A9").unwrap(), "éé");
    }

    #[test]
    fn test_decode_malformed_escape() {
        assert!(matches!(
            decode("abc%2"),
            Err(PropagationError::InvalidArgument { .. })
        ));
        assert!(matches!(
            decode("%"),
            Err(PropagationError::InvalidArgument { .. })
        ));
        assert!(matches!(
            decode("%zz"),
            Err(PropagationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(matches!(
            decode("%FF%FE"),
            Err(PropagationError::InvalidArgument { .. })
        ));
    }
}
