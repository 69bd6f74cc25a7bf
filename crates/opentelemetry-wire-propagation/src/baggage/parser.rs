//! Single-pass `baggage` header parser.
//!
//! The parser walks the header one byte at a time, routing bytes to a key or
//! value [`FieldScanner`] depending on [`ParserState`]. An invalid field only
//! costs its own record: the parser sets `skip_to_next` and ignores input up
//! to the next `,`. Limit violations are [`ParseOutcome::Fatal`] and abort
//! the whole header.

use super::scanner::FieldScanner;
use super::{Baggage, BaggageEntry};
use crate::config::BaggageLimits;
use crate::error::{PropagationError, Result};
use crate::percent;

/// Which part of a list member the parser is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Before the `=` of a member.
    Key,
    /// Between `=` and `;` or `,`.
    Value,
    /// Free-form properties after `;`.
    Meta,
}

/// Result of closing one list member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A decoded member to store.
    Entry {
        /// Member key.
        key: String,
        /// Decoded value and metadata.
        entry: BaggageEntry,
    },
    /// The member was malformed and is dropped.
    Skip,
    /// The header must be discarded as a whole.
    Fatal(PropagationError),
}

/// Parser over one raw `baggage` header.
#[derive(Debug)]
pub struct BaggageParser<'h> {
    header: &'h str,
    state: ParserState,
    key: FieldScanner<'h>,
    value: FieldScanner<'h>,
    meta_start: usize,
    skip_to_next: bool,
}

impl<'h> BaggageParser<'h> {
    /// Creates a parser positioned at the start of `header`.
    pub fn new(header: &'h str) -> Self {
        Self {
            header,
            state: ParserState::Key,
            key: FieldScanner::for_key(),
            value: FieldScanner::for_value(),
            meta_start: 0,
            skip_to_next: false,
        }
    }

    /// Parses the whole header into `baggage`.
    ///
    /// Malformed members are skipped. On error `baggage` may hold the
    /// members accepted so far; callers wanting all-or-nothing behaviour
    /// should discard it.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::LimitExceeded`] when the header or the
    /// number of members is over `limits`.
    pub fn parse_into(mut self, baggage: &mut Baggage, limits: &BaggageLimits) -> Result<()> {
        if self.header.len() > limits.max_header_bytes {
            return self.apply(
                ParseOutcome::Fatal(PropagationError::LimitExceeded {
                    what: "baggage header bytes",
                    limit: limits.max_header_bytes,
                }),
                baggage,
            );
        }

        let header = self.header;
        for (i, byte) in header.bytes().enumerate() {
            if self.skip_to_next {
                if byte == b',' {
                    self.reset(i + 1);
                }
                continue;
            }

            match byte {
                b'=' => match self.state {
                    ParserState::Key => {
                        if self.key.try_terminating(i, header) {
                            self.set_state(ParserState::Value, i + 1);
                        } else {
                            self.skip_to_next = true;
                        }
                    }
                    ParserState::Value => {
                        self.skip_to_next = !self.value.try_next_char(byte, i);
                    }
                    ParserState::Meta => {}
                },
                b';' => {
                    if self.state == ParserState::Value {
                        self.skip_to_next = !self.value.try_terminating(i, header);
                        self.set_state(ParserState::Meta, i + 1);
                    }
                }
                b',' => {
                    let meta = match self.state {
                        ParserState::Value => {
                            self.value.try_terminating(i, header);
                            None
                        }
                        ParserState::Meta => header.get(self.meta_start..i).map(str::trim),
                        ParserState::Key => None,
                    };
                    let outcome = self.close_member(meta, baggage, limits);
                    self.apply(outcome, baggage)?;
                    self.reset(i + 1);
                }
                _ => match self.state {
                    ParserState::Key => self.skip_to_next = !self.key.try_next_char(byte, i),
                    ParserState::Value => self.skip_to_next = !self.value.try_next_char(byte, i),
                    ParserState::Meta => {}
                },
            }
        }

        match self.state {
            ParserState::Key => Ok(()),
            ParserState::Meta => {
                let rest = header.get(self.meta_start..).map(str::trim);
                let outcome = self.close_member(rest, baggage, limits);
                self.apply(outcome, baggage)
            }
            ParserState::Value => {
                if self.skip_to_next {
                    return Ok(());
                }
                self.value.try_terminating(header.len(), header);
                let outcome = self.close_member(None, baggage, limits);
                self.apply(outcome, baggage)
            }
        }
    }

    /// Decodes the captured member. A value or metadata that fails to
    /// percent-decode counts as absent.
    fn close_member(
        &self,
        meta: Option<&str>,
        baggage: &Baggage,
        limits: &BaggageLimits,
    ) -> ParseOutcome {
        let (Some(key), Some(raw_value)) = (self.key.value(), self.value.value()) else {
            return ParseOutcome::Skip;
        };
        let Ok(value) = percent::decode(raw_value) else {
            return ParseOutcome::Skip;
        };
        let metadata = meta
            .and_then(|m| percent::decode(m).ok())
            .map(|m| m.into_owned())
            .unwrap_or_default();

        if !baggage.contains_key(key) && baggage.len() >= limits.max_entries {
            return ParseOutcome::Fatal(PropagationError::LimitExceeded {
                what: "baggage entries",
                limit: limits.max_entries,
            });
        }

        ParseOutcome::Entry {
            key: key.to_owned(),
            entry: BaggageEntry {
                value: value.into_owned(),
                metadata,
            },
        }
    }

    fn apply(&self, outcome: ParseOutcome, baggage: &mut Baggage) -> Result<()> {
        match outcome {
            ParseOutcome::Entry { key, entry } => {
                baggage.insert_entry(key, entry);
                Ok(())
            }
            ParseOutcome::Skip => {
                tracing::trace!(header = self.header, "Skipping malformed baggage member");
                Ok(())
            }
            ParseOutcome::Fatal(err) => Err(err),
        }
    }

    fn set_state(&mut self, state: ParserState, start: usize) {
        self.state = state;
        match state {
            ParserState::Key => self.key.reset(start),
            ParserState::Value => self.value.reset(start),
            ParserState::Meta => self.meta_start = start,
        }
    }

    fn reset(&mut self, next_start: usize) {
        self.skip_to_next = false;
        self.state = ParserState::Key;
        self.key.reset(next_start);
        self.value.reset(next_start);
        self.meta_start = 0;
    }
}
