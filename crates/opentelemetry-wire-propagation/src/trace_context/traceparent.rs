//! Fixed-offset `traceparent` codec.
//!
//! The header layout is `vv-<trace id>-<span id>-ff`: version at 0, trace id
//! at 3, span id at 36, flags at 53, 55 characters in total. Later versions
//! may append fields after a `-` at offset 55; those are accepted and
//! ignored.

use super::{SpanId, TraceFlags, TraceId};
use crate::error::{PropagationError, Result};
use crate::hex_codec::{self, BYTE_BASE16};
use std::fmt;
use std::str::FromStr;

const VERSION: u8 = 0x00;
const INVALID_VERSION: u8 = 0xff;
const DELIMITER: u8 = b'-';

const VERSION_SIZE: usize = BYTE_BASE16;
const TRACE_ID_SIZE: usize = 16 * BYTE_BASE16;
const SPAN_ID_SIZE: usize = 8 * BYTE_BASE16;
const FLAGS_SIZE: usize = BYTE_BASE16;

const TRACE_ID_OFFSET: usize = VERSION_SIZE + 1;
const SPAN_ID_OFFSET: usize = TRACE_ID_OFFSET + TRACE_ID_SIZE + 1;
const FLAGS_OFFSET: usize = SPAN_ID_OFFSET + SPAN_ID_SIZE + 1;

/// Length of a version `00` traceparent header.
pub const TRACEPARENT_HEADER_SIZE: usize = FLAGS_OFFSET + FLAGS_SIZE;

/// The decoded fields of a `traceparent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceParent {
    /// Header version; always `0` when encoding.
    pub version: u8,
    /// Trace id, never all zeros after decoding.
    pub trace_id: TraceId,
    /// Parent span id, never all zeros after decoding.
    pub span_id: SpanId,
    /// Trace flags.
    pub trace_flags: TraceFlags,
}

impl TraceParent {
    /// Creates a version `00` traceparent.
    pub fn new(trace_id: TraceId, span_id: SpanId, trace_flags: TraceFlags) -> Self {
        Self {
            version: VERSION,
            trace_id,
            span_id,
            trace_flags,
        }
    }

    /// Decodes a `traceparent` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_wire_propagation::TraceParent;
    ///
    /// let header = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
    /// let tp = TraceParent::decode(header).unwrap();
    /// assert!(tp.trace_flags.is_sampled());
    /// assert_eq!(tp.span_id.to_string(), "00f067aa0ba902b7");
    /// ```
    ///
    /// # Errors
    ///
    /// - [`PropagationError::InvalidArgument`] for a wrong length, misplaced
    ///   delimiters, version `ff`, a version `00` header with trailing data,
    ///   or an all-zero id.
    /// - [`PropagationError::InvalidEncoding`] for any character outside
    ///   `[0-9a-f]` in the version, id or flags fields.
    pub fn decode(header: &str) -> Result<Self> {
        let bytes = header.as_bytes();
        let length_ok = bytes.len() == TRACEPARENT_HEADER_SIZE
            || (bytes.len() > TRACEPARENT_HEADER_SIZE
                && bytes[TRACEPARENT_HEADER_SIZE] == DELIMITER);
        if !length_ok
            || bytes[TRACE_ID_OFFSET - 1] != DELIMITER
            || bytes[SPAN_ID_OFFSET - 1] != DELIMITER
            || bytes[FLAGS_OFFSET - 1] != DELIMITER
        {
            return Err(PropagationError::invalid_argument(
                "malformed traceparent",
                header,
            ));
        }

        hex_codec::validate_lowercase(header, 0, VERSION_SIZE)?;
        let mut version = [0u8; 1];
        hex_codec::decode_into(header, 0, &mut version)?;
        let version = version[0];
        if version == INVALID_VERSION {
            return Err(PropagationError::invalid_argument(
                "traceparent version ff is invalid",
                header,
            ));
        }
        if version == VERSION && bytes.len() > TRACEPARENT_HEADER_SIZE {
            return Err(PropagationError::invalid_argument(
                "version 00 traceparent has trailing data",
                header,
            ));
        }

        hex_codec::validate_lowercase(header, TRACE_ID_OFFSET, TRACE_ID_SIZE)?;
        let mut trace_id = [0u8; 16];
        hex_codec::decode_into(header, TRACE_ID_OFFSET, &mut trace_id)?;

        hex_codec::validate_lowercase(header, SPAN_ID_OFFSET, SPAN_ID_SIZE)?;
        let mut span_id = [0u8; 8];
        hex_codec::decode_into(header, SPAN_ID_OFFSET, &mut span_id)?;

        hex_codec::validate_lowercase(header, FLAGS_OFFSET, FLAGS_SIZE)?;
        let mut flags = [0u8; 1];
        hex_codec::decode_into(header, FLAGS_OFFSET, &mut flags)?;

        let trace_id = TraceId::from_bytes(trace_id);
        let span_id = SpanId::from_bytes(span_id);
        if !trace_id.is_valid() || !span_id.is_valid() {
            return Err(PropagationError::invalid_argument(
                "traceparent carries an all-zero id",
                header,
            ));
        }

        Ok(Self {
            version,
            trace_id,
            span_id,
            trace_flags: TraceFlags::new(flags[0]),
        })
    }

    /// Encodes as a version `00` header into a fixed 55-byte buffer.
    ///
    /// The stored version is ignored: only version `00` is ever written.
    ///
    /// # Errors
    ///
    /// Never fails for the fixed layout; the `Result` surfaces codec bounds
    /// errors if the layout constants were ever inconsistent.
    pub fn encode(&self) -> Result<String> {
        let mut buf = [DELIMITER; TRACEPARENT_HEADER_SIZE];
        hex_codec::encode_into(&[VERSION], &mut buf, 0)?;
        hex_codec::encode_into(&self.trace_id.to_bytes(), &mut buf, TRACE_ID_OFFSET)?;
        hex_codec::encode_into(&self.span_id.to_bytes(), &mut buf, SPAN_ID_OFFSET)?;
        hex_codec::encode_into(&[self.trace_flags.to_u8()], &mut buf, FLAGS_OFFSET)?;
        Ok(buf.iter().copied().map(char::from).collect())
    }
}

impl FromStr for TraceParent {
    type Err = PropagationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl fmt::Display for TraceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "00-{}-{}-{}",
            self.trace_id, self.span_id, self.trace_flags
        )
    }
}
