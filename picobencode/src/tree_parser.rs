// SPDX-License-Identifier: Apache-2.0

//! Incremental parser that rebuilds a complete [`Value`] tree.
//!
//! Input may arrive in fragments of any size. Every call to
//! [`TreeParser::try_parse_one`] makes as much progress as the buffered bytes allow and
//! either returns the next complete top-level value or
//! [`DecodeError::IncompleteMessage`]. Partially built containers are kept on an
//! explicit stack of owned frames; when a frame completes it is moved into its parent.

use alloc::vec::Vec;

use crate::input_buffer::InputBuffer;
use crate::int_parser::{from_ascii_usize, parse_integer};
use crate::value::{Field, SortedDictionary, Value, ValueKind};
use crate::{DecodeError, Limits};

/// Upper bound on the up-front allocation for a byte string. Longer payloads grow
/// as their bytes actually arrive.
const PREALLOCATION_LIMIT: usize = 64 * 1024;

/// A node that is still being parsed.
#[derive(Debug)]
enum Frame {
    /// Header seen, payload not complete.
    ByteString { data: Vec<u8>, remaining: usize },
    List(Vec<Value>),
    /// `pending_key` holds a key whose value has not been parsed yet.
    Dictionary {
        fields: Vec<Field>,
        pending_key: Option<Vec<u8>>,
    },
}

impl Frame {
    /// Whether this frame can take a child of the given kind next.
    ///
    /// | frame | accepts |
    /// |---|---|
    /// | byte string | nothing (raw payload only) |
    /// | list | any kind |
    /// | dictionary, expecting a key | byte string |
    /// | dictionary, expecting a value | any kind |
    fn accepts(&self, kind: ValueKind) -> Result<(), DecodeError> {
        match self {
            Frame::ByteString { .. } => Err(DecodeError::WrongType),
            Frame::List(_) => Ok(()),
            Frame::Dictionary {
                pending_key: None, ..
            } if kind != ValueKind::ByteString => Err(DecodeError::WrongType),
            Frame::Dictionary { .. } => Ok(()),
        }
    }

    /// Moves a completed child into this frame.
    fn attach(&mut self, value: Value) -> Result<(), DecodeError> {
        self.accepts(value.kind())?;
        match self {
            Frame::ByteString { .. } => Err(DecodeError::WrongType),
            Frame::List(values) => {
                values.push(value);
                Ok(())
            }
            Frame::Dictionary {
                fields,
                pending_key,
            } => {
                match pending_key.take() {
                    Some(key) => fields.push(Field { key, value }),
                    None => {
                        let key = value.into_byte_string().ok_or(DecodeError::WrongType)?;
                        if let Some(previous) = fields.last() {
                            match previous.key.as_slice().cmp(&key) {
                                core::cmp::Ordering::Less => {}
                                core::cmp::Ordering::Equal => {
                                    return Err(DecodeError::DictionaryDuplicateKey)
                                }
                                core::cmp::Ordering::Greater => {
                                    return Err(DecodeError::DictionaryUnsorted)
                                }
                            }
                        }
                        *pending_key = Some(key);
                    }
                }
                Ok(())
            }
        }
    }

    /// Turns a finished frame into its value.
    fn close(self) -> Result<Value, DecodeError> {
        match self {
            Frame::ByteString { data, .. } => Ok(Value::ByteString(data)),
            Frame::List(values) => Ok(Value::List(values)),
            Frame::Dictionary {
                pending_key: Some(_),
                ..
            } => Err(DecodeError::WrongType),
            Frame::Dictionary { fields, .. } => Ok(Value::Dictionary(
                SortedDictionary::from_sorted_unchecked(fields),
            )),
        }
    }
}

/// Batch bencode parser.
///
/// ```
/// use picobencode::{DecodeError, TreeParser, Value};
///
/// let mut parser = TreeParser::new();
/// parser.append(b"l1:ai5");
/// assert_eq!(parser.try_parse_one(), Err(DecodeError::IncompleteMessage));
///
/// parser.append(b"elee");
/// let value = parser.try_parse_one().unwrap();
/// assert_eq!(
///     value,
///     Value::List(vec![Value::string("a"), Value::Integer(5), Value::List(vec![])])
/// );
/// assert!(parser.is_empty());
/// ```
#[derive(Debug)]
pub struct TreeParser {
    input: InputBuffer,
    /// Open nodes, innermost last. The bottom entry is the top-level value.
    stack: Vec<Frame>,
    limits: Limits,
}

impl Default for TreeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParser {
    /// Creates a parser without size limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::unbounded())
    }

    /// Creates a parser that rejects integers, byte strings and nesting beyond
    /// `limits` with [`DecodeError::InvalidValue`].
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            input: InputBuffer::new(),
            stack: Vec::new(),
            limits,
        }
    }

    /// Appends received bytes to the input buffer.
    pub fn append(&mut self, chunk: &[u8]) {
        self.input.extend(chunk);
    }

    /// Buffered bytes not yet consumed by a parse.
    pub fn buffered(&self) -> &[u8] {
        self.input.remaining()
    }

    /// True when no unparsed bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// True when no value is partially parsed.
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// Parses the next top-level value out of the buffered bytes.
    ///
    /// Returns [`DecodeError::IncompleteMessage`] when the buffer runs out first; all
    /// progress is kept, so call again after [`append`](Self::append)ing more. Any other
    /// error is terminal for this parser.
    pub fn try_parse_one(&mut self) -> Result<Value, DecodeError> {
        let result = self.parse_step();
        self.input.compact();
        match &result {
            Ok(value) => log::debug!("parsed a complete {:?}", value.kind()),
            Err(DecodeError::IncompleteMessage) => {
                log::trace!("incomplete message, {} frames open", self.stack.len())
            }
            Err(e) => log::warn!("bencode decode failed at offset {}: {e}", self.input.position()),
        }
        result
    }

    fn parse_step(&mut self) -> Result<Value, DecodeError> {
        loop {
            if let Some(Frame::ByteString { data, remaining }) = self.stack.last_mut() {
                let available = self.input.remaining();
                let take = (*remaining).min(available.len());
                data.extend_from_slice(&available[..take]);
                *remaining -= take;
                let complete = *remaining == 0;
                self.input.consume(take);
                if !complete {
                    return Err(DecodeError::IncompleteMessage);
                }
                if let Some(done) = self.close_innermost()? {
                    return Ok(done);
                }
                continue;
            }

            let Some(byte) = self.input.peek() else {
                return Err(DecodeError::IncompleteMessage);
            };

            if byte == b'e' && !self.stack.is_empty() {
                self.input.consume(1);
                if let Some(done) = self.close_innermost()? {
                    return Ok(done);
                }
                continue;
            }

            let finished = match byte {
                b'i' => self.parse_integer()?,
                b'0'..=b'9' => self.parse_byte_string_header()?,
                b'l' => {
                    self.open(ValueKind::List, Frame::List(Vec::new()))?;
                    None
                }
                b'd' => {
                    let frame = Frame::Dictionary {
                        fields: Vec::new(),
                        pending_key: None,
                    };
                    self.open(ValueKind::Dictionary, frame)?;
                    None
                }
                _ => return Err(DecodeError::UnknownType),
            };
            if let Some(done) = finished {
                return Ok(done);
            }
        }
    }

    /// Parses `i<digits>e`. Returns the value if it was the whole top-level item.
    fn parse_integer(&mut self) -> Result<Option<Value>, DecodeError> {
        let Some(end) = self.input.find(b'e') else {
            if self.input.len() - 1 > self.limits.integer_length() {
                return Err(DecodeError::InvalidValue);
            }
            return Err(DecodeError::IncompleteMessage);
        };
        let digits = &self.input.remaining()[1..end];
        if digits.len() > self.limits.integer_length() {
            return Err(DecodeError::InvalidValue);
        }
        let value = parse_integer(digits).map_err(|_| DecodeError::InvalidValue)?;
        self.check_accepted(ValueKind::Integer)?;
        self.input.consume(end + 1);
        self.deliver(Value::Integer(value))
    }

    /// Parses `<len>:`. Empty byte strings complete at once, others become a frame.
    fn parse_byte_string_header(&mut self) -> Result<Option<Value>, DecodeError> {
        let Some(end) = self.input.find(b':') else {
            if self.input.len() > self.limits.integer_length() {
                return Err(DecodeError::InvalidValue);
            }
            return Err(DecodeError::IncompleteMessage);
        };
        let digits = &self.input.remaining()[..end];
        if digits.len() > self.limits.integer_length() {
            return Err(DecodeError::InvalidValue);
        }
        let length = from_ascii_usize(digits).map_err(|_| DecodeError::InvalidValue)?;
        if length > self.limits.byte_string_length() {
            return Err(DecodeError::InvalidValue);
        }
        if self.expects_key() && length > self.limits.key_length() {
            return Err(DecodeError::InvalidValue);
        }
        self.check_accepted(ValueKind::ByteString)?;
        self.input.consume(end + 1);

        if length == 0 {
            return self.deliver(Value::ByteString(Vec::new()));
        }
        log::trace!("byte string header: {length} bytes expected");
        self.stack.push(Frame::ByteString {
            data: Vec::with_capacity(length.min(PREALLOCATION_LIMIT)),
            remaining: length,
        });
        Ok(None)
    }

    /// Consumes an `l` or `d` and pushes its frame.
    fn open(&mut self, kind: ValueKind, frame: Frame) -> Result<(), DecodeError> {
        self.check_accepted(kind)?;
        if self.limits.depth_exceeded(self.stack.len() + 1) {
            return Err(DecodeError::InvalidValue);
        }
        self.input.consume(1);
        log::trace!("open {kind:?} at depth {}", self.stack.len() + 1);
        self.stack.push(frame);
        Ok(())
    }

    fn expects_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Dictionary {
                pending_key: None,
                ..
            })
        )
    }

    fn check_accepted(&self, kind: ValueKind) -> Result<(), DecodeError> {
        match self.stack.last() {
            Some(parent) => parent.accepts(kind),
            None => Ok(()),
        }
    }

    /// Pops the innermost frame, which is complete, and hands its value on.
    fn close_innermost(&mut self) -> Result<Option<Value>, DecodeError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(None);
        };
        let value = frame.close()?;
        log::trace!("close {:?} at depth {}", value.kind(), self.stack.len() + 1);
        self.deliver(value)
    }

    /// Attaches a complete value to the innermost open frame, or returns it when it
    /// is the top-level item.
    fn deliver(&mut self, value: Value) -> Result<Option<Value>, DecodeError> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.attach(value)?;
                Ok(None)
            }
            None => Ok(Some(value)),
        }
    }
}
