// SPDX-License-Identifier: Apache-2.0

//! Canonical bencode output.
//!
//! Two ways in: encode a whole [`Value`] with [`encode`], or drive a [`Writer`]
//! imperatively. Nested containers on a [`Writer`] are opened with [`Writer::list`] and
//! [`Writer::dictionary`], which return scope guards that append the closing `e` when
//! dropped, so the output stays balanced on early return and during unwinding.
//!
//! Numbers are formatted through [`itoa::Buffer`], which is sized for the widest value
//! of the type. Formatting therefore has no failure path.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::value::{Integer, SortedDictionary, Value};

/// Encodes a value into a fresh buffer.
///
/// ```
/// use picobencode::{encode, Value};
///
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// assert_eq!(encode(&list), b"li1e3:twoe");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut output = Vec::with_capacity(32);
    encode_value(&mut output, value);
    output
}

/// Output still owed while walking a value tree.
enum Pending<'a> {
    Value(&'a Value),
    Key(&'a [u8]),
    End,
}

/// Appends the canonical encoding of any value.
///
/// Containers are walked with a heap worklist, so the nesting depth is bounded only by
/// memory, not by the call stack.
pub fn encode_value(output: &mut Vec<u8>, value: &Value) {
    let mut pending = vec![Pending::Value(value)];
    while let Some(next) = pending.pop() {
        match next {
            Pending::Value(Value::Integer(i)) => encode_integer(output, *i),
            Pending::Value(Value::ByteString(b)) => encode_byte_string(output, b),
            Pending::Value(Value::List(values)) => {
                output.push(b'l');
                pending.push(Pending::End);
                pending.extend(values.iter().rev().map(Pending::Value));
            }
            Pending::Value(Value::Dictionary(dictionary)) => {
                output.push(b'd');
                pending.push(Pending::End);
                for field in dictionary.iter().rev() {
                    pending.push(Pending::Value(&field.value));
                    pending.push(Pending::Key(&field.key));
                }
            }
            Pending::Key(key) => encode_byte_string(output, key),
            Pending::End => output.push(b'e'),
        }
    }
}

/// Appends `i<n>e`.
pub fn encode_integer(output: &mut Vec<u8>, value: Integer) {
    let mut digits = itoa::Buffer::new();
    output.push(b'i');
    output.extend_from_slice(digits.format(value).as_bytes());
    output.push(b'e');
}

/// Appends `<len>:<bytes>`.
pub fn encode_byte_string(output: &mut Vec<u8>, value: &[u8]) {
    let mut digits = itoa::Buffer::new();
    let length = digits.format(value.len()).as_bytes();
    output.reserve(length.len() + 1 + value.len());
    output.extend_from_slice(length);
    output.push(b':');
    output.extend_from_slice(value);
}

/// Appends `l<values>e`.
pub fn encode_list(output: &mut Vec<u8>, values: &[Value]) {
    output.push(b'l');
    for value in values {
        encode_value(output, value);
    }
    output.push(b'e');
}

/// Appends `d<key><value>...e`. The dictionary is already canonical.
pub fn encode_dictionary(output: &mut Vec<u8>, dictionary: &SortedDictionary) {
    output.push(b'd');
    for field in dictionary {
        encode_byte_string(output, &field.key);
        encode_value(output, &field.value);
    }
    output.push(b'e');
}

/// An output buffer with push-style bencode operations.
///
/// The writer keeps no state besides its buffer, so one writer can serve many
/// consecutive messages: push a message, [`take`](Writer::take) it, repeat.
///
/// ```
/// use picobencode::Writer;
///
/// let mut writer = Writer::new();
/// {
///     let mut list = writer.list();
///     list.push_byte_string(b"stdout");
///     list.push_byte_string(b"hello\n");
/// }
/// writer.push_integer(0);
/// assert_eq!(writer.take(), b"l6:stdout6:hello\nei0e");
/// assert!(writer.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn push_integer(&mut self, value: Integer) {
        encode_integer(&mut self.buffer, value);
    }

    pub fn push_byte_string(&mut self, value: &[u8]) {
        encode_byte_string(&mut self.buffer, value);
    }

    pub fn push_value(&mut self, value: &Value) {
        encode_value(&mut self.buffer, value);
    }

    /// Appends bytes that are already bencode. They are not checked.
    pub fn push_raw(&mut self, encoded: &[u8]) {
        self.buffer.extend_from_slice(encoded);
    }

    /// Opens a list; it is closed when the returned guard is dropped.
    pub fn list(&mut self) -> ListWriter<'_> {
        self.buffer.push(b'l');
        ListWriter { writer: self }
    }

    /// Opens a dictionary; it is closed when the returned guard is dropped.
    ///
    /// Keys pushed through the guard are written as given. Pushing them in
    /// increasing order is up to the caller.
    pub fn dictionary(&mut self) -> DictionaryWriter<'_> {
        self.buffer.push(b'd');
        DictionaryWriter { writer: self }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Removes and returns everything written so far.
    pub fn take(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.buffer)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Scope guard for an open list. Writes `e` on drop.
#[derive(Debug)]
pub struct ListWriter<'w> {
    writer: &'w mut Writer,
}

impl Deref for ListWriter<'_> {
    type Target = Writer;

    fn deref(&self) -> &Writer {
        &*self.writer
    }
}

impl DerefMut for ListWriter<'_> {
    fn deref_mut(&mut self) -> &mut Writer {
        &mut *self.writer
    }
}

impl Drop for ListWriter<'_> {
    fn drop(&mut self) {
        self.writer.buffer.push(b'e');
    }
}

/// Scope guard for an open dictionary. Writes `e` on drop.
#[derive(Debug)]
pub struct DictionaryWriter<'w> {
    writer: &'w mut Writer,
}

impl DictionaryWriter<'_> {
    /// Writes `key` followed by whatever `value` pushes.
    pub fn entry<F>(&mut self, key: &[u8], value: F) -> &mut Self
    where
        F: FnOnce(&mut Writer),
    {
        self.writer.push_byte_string(key);
        value(&mut *self.writer);
        self
    }
}

impl Deref for DictionaryWriter<'_> {
    type Target = Writer;

    fn deref(&self) -> &Writer {
        &*self.writer
    }
}

impl DerefMut for DictionaryWriter<'_> {
    fn deref_mut(&mut self) -> &mut Writer {
        &mut *self.writer
    }
}

impl Drop for DictionaryWriter<'_> {
    fn drop(&mut self) {
        self.writer.buffer.push(b'e');
    }
}
