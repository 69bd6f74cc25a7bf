//! Error types for the propagation codecs.

use thiserror::Error;

/// A specialised Result type for codec operations.
pub type Result<T> = std::result::Result<T, PropagationError>;

/// Errors raised by the low-level codecs and header parsers.
///
/// These never escape a propagator: [`crate::TextMapPropagator`]
/// implementations downgrade them to an empty or invalid context.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    /// A character that is not a valid hex digit was found.
    #[error("invalid encoding: character {character:?} at index {index}")]
    InvalidEncoding {
        /// The offending character.
        character: char,
        /// Byte index of the character within the input.
        index: usize,
    },

    /// The input ended before the requested number of characters.
    #[error("out of range: {needed} characters needed at offset {offset}, {available} available")]
    OutOfRange {
        /// Offset the read started at.
        offset: usize,
        /// Number of characters the read required.
        needed: usize,
        /// Number of characters left after `offset`.
        available: usize,
    },

    /// The input is structurally malformed.
    #[error("invalid argument: {reason}: {input:?}")]
    InvalidArgument {
        /// What was wrong with the input.
        reason: &'static str,
        /// The raw input that was rejected.
        input: String,
    },

    /// A W3C size or member-count limit was exceeded.
    #[error("{what} exceeds limit of {limit}")]
    LimitExceeded {
        /// Which limit was hit.
        what: &'static str,
        /// The configured limit.
        limit: usize,
    },
}

impl PropagationError {
    pub(crate) fn invalid_argument(reason: &'static str, input: impl Into<String>) -> Self {
        PropagationError::InvalidArgument {
            reason,
            input: input.into(),
        }
    }
}
