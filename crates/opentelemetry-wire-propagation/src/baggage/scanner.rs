//! Single-field token scanner used by the baggage parser.
//!
//! A scanner follows one key or value through three phases: leading
//! whitespace, token characters, trailing whitespace. Once trailing
//! whitespace has been seen any further token character invalidates the
//! field, so `"a b"` is rejected while `" ab "` yields `ab`.

/// Characters that may not appear in a baggage key (RFC 7230 separators).
pub(crate) const KEY_EXCLUDED: u128 = bitmap(b"(),/:;<=>?@[\\]{}\"");

/// Characters that may not appear in an unescaped baggage value.
pub(crate) const VALUE_EXCLUDED: u128 = bitmap(b"\",;\\");

const fn bitmap(chars: &[u8]) -> u128 {
    let mut bits = 0u128;
    let mut i = 0;
    while i < chars.len() {
        bits |= 1u128 << chars[i];
        i += 1;
    }
    bits
}

/// Returns whether `byte` is a control character, non-ASCII, or in `excluded`.
pub(crate) fn is_excluded(excluded: u128, byte: u8) -> bool {
    byte <= 32 || byte >= 127 || (excluded >> byte) & 1 == 1
}

fn is_whitespace(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Scan state for one key or value inside a baggage header.
#[derive(Debug, Clone)]
pub(crate) struct FieldScanner<'h> {
    excluded: u128,
    start: usize,
    end: usize,
    leading_space: bool,
    reading_value: bool,
    trailing_space: bool,
    value: Option<&'h str>,
}

impl<'h> FieldScanner<'h> {
    pub(crate) fn new(excluded: u128) -> Self {
        Self {
            excluded,
            start: 0,
            end: 0,
            leading_space: true,
            reading_value: false,
            trailing_space: false,
            value: None,
        }
    }

    pub(crate) fn for_key() -> Self {
        Self::new(KEY_EXCLUDED)
    }

    pub(crate) fn for_value() -> Self {
        Self::new(VALUE_EXCLUDED)
    }

    /// The extracted token, set once [`Self::try_terminating`] succeeds.
    pub(crate) fn value(&self) -> Option<&'h str> {
        self.value
    }

    pub(crate) fn reset(&mut self, next_start: usize) {
        self.start = next_start;
        self.end = next_start;
        self.leading_space = true;
        self.reading_value = false;
        self.trailing_space = false;
        self.value = None;
    }

    /// Feeds the byte at `index`. Returns `false` when the field is invalid
    /// and the rest of the record has to be skipped.
    pub(crate) fn try_next_char(&mut self, byte: u8, index: usize) -> bool {
        if is_whitespace(byte) {
            if self.reading_value {
                self.mark_end(index);
            }
            true
        } else if is_excluded(self.excluded, byte) {
            false
        } else {
            if self.leading_space {
                self.mark_start(index);
            }
            !self.trailing_space
        }
    }

    /// Closes the field at a delimiter found at `index`. Fails for empty or
    /// whitespace-only fields.
    pub(crate) fn try_terminating(&mut self, index: usize, source: &'h str) -> bool {
        if self.reading_value {
            self.mark_end(index);
        }
        if !self.trailing_space {
            return false;
        }
        match source.get(self.start..self.end) {
            Some(token) => {
                self.value.get_or_insert(token);
                true
            }
            None => false,
        }
    }

    fn mark_start(&mut self, index: usize) {
        self.start = index;
        self.reading_value = true;
        self.leading_space = false;
    }

    fn mark_end(&mut self, index: usize) {
        self.end = index;
        self.reading_value = false;
        self.trailing_space = true;
    }
}
