//! Header carrier with case-insensitive names.

use opentelemetry::propagation::{Extractor, Injector};
use std::collections::HashMap;

/// A header map whose names are matched case-insensitively.
///
/// Names are stored lowercased, so `Traceparent` and `traceparent` address
/// the same header.
///
/// # Examples
///
/// ```
/// use opentelemetry::propagation::Extractor;
/// use opentelemetry_wire_propagation::HeaderCarrier;
///
/// let carrier: HeaderCarrier = [("Baggage", "k=v")].into_iter().collect();
/// assert_eq!(carrier.get("baggage"), Some("k=v"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCarrier {
    headers: HashMap<String, String>,
}

impl HeaderCarrier {
    /// Creates an empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the headers keyed by lowercase name.
    pub fn into_inner(self) -> HashMap<String, String> {
        self.headers
    }
}

impl From<HashMap<String, String>> for HeaderCarrier {
    fn from(headers: HashMap<String, String>) -> Self {
        headers.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderCarrier {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut carrier = Self::new();
        for (name, value) in iter {
            carrier.insert(name.as_ref(), value);
        }
        carrier
    }
}

impl Extractor for HeaderCarrier {
    fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        self.headers.keys().map(String::as_str).collect()
    }
}

impl Injector for HeaderCarrier {
    fn set(&mut self, key: &str, value: String) {
        self.insert(key, value);
    }
}
