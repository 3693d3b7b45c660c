// SPDX-License-Identifier: Apache-2.0

//! Bencode encoding and decoding for `no_std` + `alloc`.
//!
//! - [`Value`] models the four bencode kinds; dictionaries are kept canonical.
//! - [`encode`] and [`Writer`] produce canonical bytes.
//! - [`TreeParser`] rebuilds whole values from fragmented input.
//! - [`PushParser`] reports tokens to a [`PushParserHandler`] without building values.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// Compile-time configuration validation
mod config_check;

mod frame_stack;
mod input_buffer;
mod int_parser;

mod limits;
pub use limits::{
    Limits, DEFAULT_MAX_BYTE_STRING_LENGTH, DEFAULT_MAX_INTEGER_LENGTH, DEFAULT_MAX_KEY_LENGTH,
};

mod parse_error;
pub use parse_error::{DecodeError, PushParseError, StreamError};

mod value;
pub use value::{Dictionary, Field, Integer, SortedDictionary, Value, ValueKind};

mod writer;
pub use writer::{
    encode, encode_byte_string, encode_dictionary, encode_integer, encode_list, encode_value,
    DictionaryWriter, ListWriter, Writer,
};

mod tree_parser;
pub use tree_parser::TreeParser;

mod push_parser;
pub use push_parser::{Event, PushParser, PushParserHandler};
