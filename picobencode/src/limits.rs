// SPDX-License-Identifier: Apache-2.0

//! Resource bounds applied while decoding.

/// Upper bounds on what a peer can make a parser buffer.
///
/// [`PushParser`](crate::PushParser) uses [`Limits::streaming`] unless told otherwise,
/// [`TreeParser`](crate::TreeParser) uses [`Limits::unbounded`].
///
/// ```
/// use picobencode::Limits;
///
/// let limits = Limits::streaming()
///     .max_byte_string_length(64 * 1024)
///     .max_depth(Some(32));
/// assert_eq!(limits.byte_string_length(), 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_integer_length: usize,
    max_byte_string_length: usize,
    max_key_length: usize,
    max_depth: Option<usize>,
}

/// Bytes allowed between `i` and `e`, and digits allowed in a length header.
/// Enough for `-9223372036854775808`.
pub const DEFAULT_MAX_INTEGER_LENGTH: usize = 20;

/// Largest byte-string payload accepted by default while streaming (1 MiB).
pub const DEFAULT_MAX_BYTE_STRING_LENGTH: usize = 1 << 20;

/// Largest dictionary key accepted by default while streaming. The streaming parser
/// keeps one key per open dictionary, so this bounds its memory per nesting level.
pub const DEFAULT_MAX_KEY_LENGTH: usize = (1 << 14) - 1;

impl Limits {
    /// Bounds suited to an untrusted peer.
    pub const fn streaming() -> Self {
        Self {
            max_integer_length: DEFAULT_MAX_INTEGER_LENGTH,
            max_byte_string_length: DEFAULT_MAX_BYTE_STRING_LENGTH,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_depth: None,
        }
    }

    /// No bounds besides available memory.
    pub const fn unbounded() -> Self {
        Self {
            max_integer_length: usize::MAX,
            max_byte_string_length: usize::MAX,
            max_key_length: usize::MAX,
            max_depth: None,
        }
    }

    pub const fn max_integer_length(mut self, length: usize) -> Self {
        self.max_integer_length = length;
        self
    }

    pub const fn max_byte_string_length(mut self, length: usize) -> Self {
        self.max_byte_string_length = length;
        self
    }

    /// Longest dictionary key. Checked against the declared length, before the key's
    /// bytes arrive.
    pub const fn max_key_length(mut self, length: usize) -> Self {
        self.max_key_length = length;
        self
    }

    /// Maximum number of lists and dictionaries open at once. `None` is unbounded.
    pub const fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub const fn integer_length(&self) -> usize {
        self.max_integer_length
    }

    pub const fn byte_string_length(&self) -> usize {
        self.max_byte_string_length
    }

    pub const fn key_length(&self) -> usize {
        self.max_key_length
    }

    pub const fn depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub(crate) fn depth_exceeded(&self, depth: usize) -> bool {
        matches!(self.max_depth, Some(max) if depth > max)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::streaming()
    }
}
