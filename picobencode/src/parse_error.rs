// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Faults reported by [`TreeParser`](crate::TreeParser).
///
/// Only [`DecodeError::IncompleteMessage`] is recoverable: feed more bytes and call
/// again. Every other variant means the message is invalid, and the parser should be
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The next byte does not start any bencode value.
    #[error("unknown type tag")]
    UnknownType,
    /// A value appeared where its container cannot accept it.
    #[error("value of the wrong type for its position")]
    WrongType,
    /// More input is needed. Parser state is kept for the next call.
    #[error("incomplete message")]
    IncompleteMessage,
    /// A number or length field is malformed or out of range.
    #[error("invalid value")]
    InvalidValue,
    /// A dictionary key is smaller than the key before it.
    #[error("dictionary keys are not sorted")]
    DictionaryUnsorted,
    /// A dictionary key equals the key before it.
    #[error("duplicate dictionary key")]
    DictionaryDuplicateKey,
}

impl DecodeError {
    /// True when the caller should supply more bytes and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecodeError::IncompleteMessage)
    }
}

/// The single fatal fault of [`PushParser`](crate::PushParser).
///
/// A stream that produced one of these is corrupt or hostile; the only recovery is to
/// drop the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct StreamError {
    message: &'static str,
    offset: usize,
}

impl StreamError {
    pub(crate) fn new(message: &'static str, offset: usize) -> Self {
        Self { message, offset }
    }

    /// Human readable description of the fault.
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Absolute position in the stream where the fault was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// An error that can occur during push-based parsing.
#[derive(Debug, PartialEq)]
pub enum PushParseError<E> {
    /// The byte stream itself is invalid.
    Stream(StreamError),
    /// An error was returned by the user's handler.
    Handler(E),
}

impl<E> From<StreamError> for PushParseError<E> {
    fn from(e: StreamError) -> Self {
        PushParseError::Stream(e)
    }
}

impl<E: core::fmt::Display> core::fmt::Display for PushParseError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PushParseError::Stream(e) => write!(f, "{e}"),
            PushParseError::Handler(e) => write!(f, "event handler failed: {e}"),
        }
    }
}

impl<E: core::fmt::Debug + core::fmt::Display> core::error::Error for PushParseError<E> {}
