// SPDX-License-Identifier: Apache-2.0

//! A SAX-style bencode push parser.
//!
//! Bytes arrive in arbitrary chunks through [`PushParser::receive`]; every complete token
//! is reported to a [`PushParserHandler`] as soon as its last byte is seen. The parser
//! never builds values. It keeps unconsumed input, one frame per open container and the
//! last key of each open dictionary, so memory stays bounded by [`Limits`].
//!
//! Every fault is fatal. Once [`receive`](PushParser::receive) fails the parser is
//! poisoned and keeps returning the same [`StreamError`].

use crate::frame_stack::{FrameKind, FrameStack, KeyOrder};
use crate::input_buffer::InputBuffer;
use crate::int_parser::{from_ascii_usize, parse_integer};
use crate::{Integer, Limits, PushParseError, StreamError};

/// A token reported by [`PushParser`].
///
/// Byte strings borrow from the parser's input buffer and are only valid for the duration
/// of the handler call. Whether a byte string is a dictionary key follows from its position:
/// inside a dictionary, keys and values alternate starting with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    Integer(Integer),
    ByteString(&'a [u8]),
    ListBegin,
    ListEnd,
    DictionaryBegin,
    DictionaryEnd,
}

/// A trait for handling events from a SAX-style push parser.
///
/// Returning an error aborts parsing: [`PushParser::receive`] returns it wrapped in
/// [`PushParseError::Handler`] and the parser is poisoned.
///
/// Implemented for every `FnMut(Event<'_>) -> Result<(), E>` closure.
pub trait PushParserHandler<E> {
    /// Handles a single, complete token.
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), E>;
}

impl<E, F> PushParserHandler<E> for F
where
    F: FnMut(Event<'_>) -> Result<(), E>,
{
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), E> {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParserState {
    Active,
    Failed(StreamError),
}

/// Reported when the handler aborted the stream.
const HANDLER_ABORTED: &str = "stream aborted by event handler";

/// A SAX-style bencode push parser.
///
/// ```
/// use picobencode::{Event, PushParser};
///
/// let mut integers = Vec::new();
/// let mut parser = PushParser::new(|event: Event<'_>| {
///     if let Event::Integer(value) = event {
///         integers.push(value);
///     }
///     Ok::<(), ()>(())
/// });
/// parser.receive(b"li1ei").unwrap();
/// parser.receive(b"22ee").unwrap();
/// assert!(parser.finished());
/// drop(parser);
/// assert_eq!(integers, [1, 22]);
/// ```
pub struct PushParser<H> {
    handler: H,
    input: InputBuffer,
    frames: FrameStack,
    /// Payload length of a byte string whose header has been consumed
    pending: Option<usize>,
    limits: Limits,
    state: ParserState,
}

impl<H> PushParser<H> {
    /// Creates a parser with [`Limits::streaming`].
    pub fn new(handler: H) -> Self {
        Self::with_limits(handler, Limits::streaming())
    }

    pub fn with_limits(handler: H, limits: Limits) -> Self {
        Self {
            handler,
            input: InputBuffer::new(),
            frames: FrameStack::new(),
            pending: None,
            limits,
            state: ParserState::Active,
        }
    }

    /// Processes a chunk of input data.
    ///
    /// Reports every token completed by `chunk` and keeps any trailing partial token for
    /// the next call. Any number of top-level values may follow each other.
    pub fn receive<E>(&mut self, chunk: &[u8]) -> Result<(), PushParseError<E>>
    where
        H: PushParserHandler<E>,
    {
        if let ParserState::Failed(error) = self.state {
            log::debug!("receive on a failed parser, {} bytes ignored", chunk.len());
            return Err(PushParseError::Stream(error));
        }
        self.input.extend(chunk);
        let result = self.drain();
        self.input.compact();
        match &result {
            Ok(()) => {
                log::trace!(
                    "chunk of {} bytes processed, {} buffered, depth {}",
                    chunk.len(),
                    self.input.len(),
                    self.frames.depth()
                );
            }
            Err(PushParseError::Stream(error)) => self.state = ParserState::Failed(*error),
            Err(PushParseError::Handler(_)) => {
                log::warn!("{HANDLER_ABORTED} at offset {}", self.input.position());
                self.state =
                    ParserState::Failed(StreamError::new(HANDLER_ABORTED, self.input.position()));
            }
        }
        result
    }

    /// Checks that the stream stopped on a value boundary.
    ///
    /// Fails if a token or container is still open, or if the parser already failed.
    pub fn finish<E>(&mut self) -> Result<(), PushParseError<E>> {
        if let ParserState::Failed(error) = self.state {
            return Err(PushParseError::Stream(error));
        }
        if self.finished() {
            return Ok(());
        }
        let error = self.fault("stream ended inside a value");
        self.state = ParserState::Failed(error);
        Err(error.into())
    }

    /// True when everything received so far forms complete top-level values: no open
    /// container, no partial token and nothing buffered.
    pub fn finished(&self) -> bool {
        self.state == ParserState::Active
            && self.input.is_empty()
            && self.frames.is_empty()
            && self.pending.is_none()
    }

    /// Number of open lists and dictionaries.
    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    /// The fault that poisoned this parser, if any.
    pub fn error(&self) -> Option<StreamError> {
        match self.state {
            ParserState::Active => None,
            ParserState::Failed(error) => Some(error),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Destroys the parser and returns the handler.
    pub fn destroy(self) -> H {
        self.handler
    }

    /// Reports every complete token in the input buffer.
    fn drain<E>(&mut self) -> Result<(), PushParseError<E>>
    where
        H: PushParserHandler<E>,
    {
        loop {
            if let Some(length) = self.pending {
                if self.input.len() < length {
                    return Ok(());
                }
                self.pending = None;
                self.byte_string_payload::<E>(length)?;
                continue;
            }
            let Some(tag) = self.input.peek() else {
                return Ok(());
            };
            let progressed = match tag {
                b'i' => self.integer::<E>()?,
                b'0'..=b'9' => self.byte_string_header::<E>()?,
                b'l' => self.open::<E>(FrameKind::List)?,
                b'd' => self.open::<E>(FrameKind::Dictionary)?,
                b'e' => self.close::<E>()?,
                _ => return Err(self.fault("unknown type tag").into()),
            };
            if !progressed {
                return Ok(());
            }
        }
    }

    /// `i<digits>e`. Returns false while the terminator is missing.
    fn integer<E>(&mut self) -> Result<bool, PushParseError<E>>
    where
        H: PushParserHandler<E>,
    {
        let limit = self.limits.integer_length();
        let Some(end) = self.input.find(b'e') else {
            if self.input.len() - 1 > limit {
                return Err(self.fault("integer too long").into());
            }
            return Ok(false);
        };
        if end - 1 > limit {
            return Err(self.fault("integer too long").into());
        }
        self.value_position()?;
        let value = match parse_integer(&self.input.remaining()[1..end]) {
            Ok(value) => value,
            Err(_) => return Err(self.fault("malformed integer").into()),
        };
        self.input.consume(end + 1);
        self.handler
            .handle_event(Event::Integer(value))
            .map_err(PushParseError::Handler)?;
        self.value_completed();
        Ok(true)
    }

    /// `<length>:`. Returns false while the colon is missing.
    fn byte_string_header<E>(&mut self) -> Result<bool, PushParseError<E>> {
        let limit = self.limits.integer_length();
        let Some(colon) = self.input.find(b':') else {
            if self.input.len() > limit {
                return Err(self.fault("byte string length too long").into());
            }
            return Ok(false);
        };
        if colon > limit {
            return Err(self.fault("byte string length too long").into());
        }
        let length = match from_ascii_usize(&self.input.remaining()[..colon]) {
            Ok(length) => length,
            Err(_) => return Err(self.fault("malformed byte string length").into()),
        };
        if length > self.limits.byte_string_length() {
            return Err(self.fault("byte string too long").into());
        }
        if self.frames.expects_key() && length > self.limits.key_length() {
            return Err(self.fault("dictionary key too long").into());
        }
        self.input.consume(colon + 1);
        self.pending = Some(length);
        Ok(true)
    }

    /// Reports a byte string whose whole payload is buffered.
    fn byte_string_payload<E>(&mut self, length: usize) -> Result<(), PushParseError<E>>
    where
        H: PushParserHandler<E>,
    {
        let is_key = self.frames.expects_key();
        let payload = &self.input.remaining()[..length];
        if is_key {
            if let Err(order) = self.frames.record_key(payload) {
                let message = match order {
                    KeyOrder::Duplicate => "duplicate dictionary key",
                    KeyOrder::Unsorted => "dictionary keys out of order",
                };
                return Err(self.fault(message).into());
            }
        }
        self.handler
            .handle_event(Event::ByteString(payload))
            .map_err(PushParseError::Handler)?;
        self.input.consume(length);
        if !is_key {
            self.value_completed();
        }
        Ok(())
    }

    fn open<E>(&mut self, kind: FrameKind) -> Result<bool, PushParseError<E>>
    where
        H: PushParserHandler<E>,
    {
        self.value_position()?;
        if self.limits.depth_exceeded(self.frames.depth() + 1) {
            return Err(self.fault("nesting too deep").into());
        }
        self.input.consume(1);
        self.frames.push(kind);
        let event = match kind {
            FrameKind::List => Event::ListBegin,
            FrameKind::Dictionary => Event::DictionaryBegin,
        };
        self.handler
            .handle_event(event)
            .map_err(PushParseError::Handler)?;
        Ok(true)
    }

    fn close<E>(&mut self) -> Result<bool, PushParseError<E>>
    where
        H: PushParserHandler<E>,
    {
        let Some(frame) = self.frames.pop() else {
            return Err(self.fault("end marker outside any container").into());
        };
        if frame.kind == FrameKind::Dictionary && !frame.expecting_key {
            return Err(self.fault("dictionary key without a value").into());
        }
        self.input.consume(1);
        let event = match frame.kind {
            FrameKind::List => Event::ListEnd,
            FrameKind::Dictionary => Event::DictionaryEnd,
        };
        self.handler
            .handle_event(event)
            .map_err(PushParseError::Handler)?;
        self.value_completed();
        Ok(true)
    }

    /// Rejects a non-byte-string token where a dictionary key is due.
    fn value_position(&self) -> Result<(), StreamError> {
        if self.frames.expects_key() {
            return Err(self.fault("dictionary key must be a byte string"));
        }
        Ok(())
    }

    fn value_completed(&mut self) {
        self.frames.value_completed();
        if self.frames.is_empty() {
            log::debug!("top-level value complete at offset {}", self.input.position());
        }
    }

    fn fault(&self, message: &'static str) -> StreamError {
        let offset = self.input.position();
        log::warn!("stream fault: {message} at offset {offset}");
        StreamError::new(message, offset)
    }
}
