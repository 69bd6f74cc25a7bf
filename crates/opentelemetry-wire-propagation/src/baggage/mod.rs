//! W3C Baggage: the in-memory entry set and its `baggage` header codec.

mod parser;
mod propagator;
mod scanner;

pub use parser::{BaggageParser, ParseOutcome, ParserState};
pub use propagator::{BAGGAGE_HEADER, BaggagePropagator};

use crate::config::BaggageLimits;
use crate::error::Result;
use crate::percent;
use serde::Serialize;
use std::collections::BTreeMap;

/// Value and properties of one baggage member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BaggageEntry {
    /// Decoded member value.
    pub value: String,
    /// Decoded property text after `;`, empty if there was none.
    pub metadata: String,
}

impl BaggageEntry {
    /// Creates an entry without metadata.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            metadata: String::new(),
        }
    }

    /// Sets the metadata text.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }
}

/// A set of baggage members keyed by name.
///
/// Members are kept sorted by key so the encoded header is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Baggage {
    entries: BTreeMap<String, BaggageEntry>,
}

impl Baggage {
    /// Creates empty baggage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `baggage` header with the default W3C limits.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_wire_propagation::Baggage;
    ///
    /// let baggage = Baggage::parse("userId=alice, region = eu-west-1;origin").unwrap();
    /// assert_eq!(baggage.get("userId"), Some("alice"));
    /// assert_eq!(baggage.get_entry("region").unwrap().metadata, "origin");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails only when a limit is exceeded; malformed members are skipped.
    pub fn parse(header: &str) -> Result<Self> {
        Self::parse_with_limits(header, &BaggageLimits::default())
    }

    /// Parses a `baggage` header, failing if it breaks `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PropagationError::LimitExceeded`] if the header is too
    /// long or holds too many members.
    pub fn parse_with_limits(header: &str, limits: &BaggageLimits) -> Result<Self> {
        let mut baggage = Self::new();
        BaggageParser::new(header).parse_into(&mut baggage, limits)?;
        Ok(baggage)
    }

    /// Inserts `key = value` without metadata.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert_entry(key, BaggageEntry::new(value));
    }

    /// Inserts `key = value;metadata`.
    pub fn insert_with_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        metadata: impl Into<String>,
    ) {
        self.insert_entry(key, BaggageEntry::new(value).with_metadata(metadata));
    }

    /// Inserts a full entry, replacing any entry with the same key.
    pub fn insert_entry(&mut self, key: impl Into<String>, entry: BaggageEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Removes and returns the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<BaggageEntry> {
        self.entries.remove(key)
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    /// Returns the full entry stored for `key`.
    pub fn get_entry(&self, key: &str) -> Option<&BaggageEntry> {
        self.entries.get(key)
    }

    /// Returns whether an entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BaggageEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Encodes the entries as a `baggage` header value.
    ///
    /// Values and metadata are percent-encoded. Entries whose key is not a
    /// valid token are left out. Returns `None` if nothing was written.
    pub fn to_header(&self) -> Option<String> {
        let mut header = String::new();
        for (key, entry) in self.iter().filter(|(key, _)| is_valid_key(key)) {
            if !header.is_empty() {
                header.push(',');
            }
            header.push_str(key);
            header.push('=');
            header.push_str(&percent::escape(&entry.value));
            if !entry.metadata.is_empty() {
                header.push(';');
                header.push_str(&percent::escape(&entry.metadata));
            }
        }

        (!header.is_empty()).then_some(header)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Baggage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut baggage = Self::new();
        for (key, value) in iter {
            baggage.insert(key, value);
        }
        baggage
    }
}

/// Returns whether `key` is a non-empty RFC 7230 token.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| !scanner::is_excluded(scanner::KEY_EXCLUDED, b))
}
