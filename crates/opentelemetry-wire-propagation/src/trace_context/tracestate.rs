//! Bounded `tracestate` list codec.

use crate::config::TraceStateLimits;
use crate::error::{PropagationError, Result};
use std::collections::VecDeque;
use std::fmt;

const MAX_KEY_LEN: usize = 256;
const MAX_TENANT_LEN: usize = 241;
const MAX_SYSTEM_LEN: usize = 14;
const MAX_VALUE_LEN: usize = 256;

/// Ordered vendor key/value pairs from a `tracestate` header.
///
/// Duplicate keys are kept as received; [`TraceState::get`] returns the first
/// match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceState {
    entries: Vec<(String, String)>,
}

impl TraceState {
    /// Parses a `tracestate` header with the default W3C limits.
    ///
    /// # Errors
    ///
    /// See [`TraceState::parse_with_limits`].
    pub fn parse(header: &str) -> Result<Self> {
        Self::parse_with_limits(header, &TraceStateLimits::default())
    }

    /// Parses a `tracestate` header.
    ///
    /// Members are split on commas with optional surrounding spaces or tabs,
    /// and empty members are ignored.
    ///
    /// # Errors
    ///
    /// - [`PropagationError::LimitExceeded`] if the header is longer than
    ///   `limits.max_header_bytes` or has more than `limits.max_members`
    ///   members.
    /// - [`PropagationError::InvalidArgument`] if a member does not contain
    ///   exactly one `=` or has an invalid key or value.
    pub fn parse_with_limits(header: &str, limits: &TraceStateLimits) -> Result<Self> {
        if header.len() > limits.max_header_bytes {
            return Err(PropagationError::LimitExceeded {
                what: "tracestate header bytes",
                limit: limits.max_header_bytes,
            });
        }

        let members: Vec<&str> = header
            .split(',')
            .map(|member| member.trim_matches([' ', '\t']))
            .filter(|member| !member.is_empty())
            .collect();
        if members.len() > limits.max_members {
            return Err(PropagationError::LimitExceeded {
                what: "tracestate members",
                limit: limits.max_members,
            });
        }

        let mut builder = TraceStateBuilder::default();
        for member in members.into_iter().rev() {
            let mut parts = member.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(PropagationError::invalid_argument(
                    "tracestate member must contain exactly one '='",
                    member,
                ));
            };
            builder.prepend(key, value)?;
        }
        Ok(builder.build())
    }

    /// Returns the value of the first member named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns a copy with `key` moved to the front holding `value`, as W3C
    /// requires when a vendor updates its entry.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::InvalidArgument`] for an invalid key or value.
    pub fn insert(&self, key: &str, value: &str) -> Result<Self> {
        validate_member(key, value)?;
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push((key.to_owned(), value.to_owned()));
        entries.extend(self.entries.iter().filter(|(k, _)| k != key).cloned());
        Ok(Self { entries })
    }

    /// Returns a copy without any member named `key`.
    #[must_use]
    pub fn remove(&self, key: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over members in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes as a `tracestate` header value, or `None` when empty.
    pub fn to_header(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl fmt::Display for TraceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Accumulates validated members, each new one going to the front.
#[derive(Debug, Clone, Default)]
pub struct TraceStateBuilder {
    entries: VecDeque<(String, String)>,
}

impl TraceStateBuilder {
    /// Puts `key=value` in front of the members added so far.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::InvalidArgument`] for an invalid key or value.
    pub fn prepend(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        validate_member(key, value)?;
        self.entries.push_front((key.to_owned(), value.to_owned()));
        Ok(self)
    }

    /// Finishes the list.
    pub fn build(self) -> TraceState {
        TraceState {
            entries: self.entries.into(),
        }
    }
}

fn validate_member(key: &str, value: &str) -> Result<()> {
    if !is_valid_key(key) {
        return Err(PropagationError::invalid_argument(
            "invalid tracestate key",
            key,
        ));
    }
    if !is_valid_value(value) {
        return Err(PropagationError::invalid_argument(
            "invalid tracestate value",
            value,
        ));
    }
    Ok(())
}

fn is_key_char(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'*' | b'/')
}

/// `simple-key` or `tenant@system` multi-tenant key.
fn is_valid_key(key: &str) -> bool {
    match key.split_once('@') {
        None => {
            key.len() <= MAX_KEY_LEN
                && key.as_bytes().first().is_some_and(u8::is_ascii_lowercase)
                && key.bytes().all(is_key_char)
        }
        Some((tenant, system)) => {
            tenant.len() <= MAX_TENANT_LEN
                && tenant
                    .as_bytes()
                    .first()
                    .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
                && tenant.bytes().all(is_key_char)
                && system.len() <= MAX_SYSTEM_LEN
                && system.as_bytes().first().is_some_and(u8::is_ascii_lowercase)
                && system.bytes().all(is_key_char)
        }
    }
}

/// Printable ASCII except `,` and `=`, not ending in a space.
fn is_valid_value(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_VALUE_LEN
        && !value.ends_with(' ')
        && value
            .bytes()
            .all(|b| (0x20..=0x7e).contains(&b) && b != b',' && b != b'=')
}
