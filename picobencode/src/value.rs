// SPDX-License-Identifier: Apache-2.0

//! The bencode value model.
//!
//! Bencode has four kinds of values, and that set is closed:
//!
//! | Kind | Wire form | Example |
//! |------|-----------|---------|
//! | Integer | `i<number>e` | `i42e` |
//! | Byte string | `<length>:<bytes>` | `4:spam` |
//! | List | `l<values>e` | `l4:spami42ee` |
//! | Dictionary | `d<key><value>...e` | `d3:cow3:mooe` |
//!
//! Dictionaries come in two flavours. [`Dictionary`] is a plain builder that keeps
//! pairs in insertion order. [`SortedDictionary`] is the canonical form: keys are in
//! strictly increasing byte-wise order and pairwise distinct. Only the canonical form
//! can be stored in a [`Value`], so only the canonical form can ever be encoded.

use alloc::vec::Vec;
use core::mem;

use crate::writer;

/// The integer type carried by [`Value::Integer`] and [`crate::Event::Integer`].
///
/// Selected with the `int64` (default) or `int32` Cargo feature.
#[cfg(feature = "int64")]
pub type Integer = i64;

/// The integer type carried by [`Value::Integer`] and [`crate::Event::Integer`].
///
/// Selected with the `int64` (default) or `int32` Cargo feature.
#[cfg(all(feature = "int32", not(feature = "int64")))]
pub type Integer = i32;

/// Discriminant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    ByteString,
    List,
    Dictionary,
}

/// A bencode value.
///
/// # Examples
///
/// ```
/// use picobencode::{Dictionary, Value};
///
/// let value = Value::from(
///     Dictionary::new()
///         .with("b", Value::Integer(2))
///         .with("a", Value::Integer(1)),
/// );
/// assert_eq!(value.encode(), b"d1:ai1e1:bi2ee");
/// assert_eq!(value.get(b"a").and_then(Value::as_integer), Some(1));
/// ```
///
/// # Depth
///
/// Dropping and [encoding](Value::encode) never recurse, so parsed values of any
/// nesting depth are safe to hold and re-emit. The derived `Clone`, `PartialEq` and
/// `Debug` impls do recurse, one stack frame per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed whole number.
    Integer(Integer),
    /// A byte string (may or may not be valid UTF-8).
    ByteString(Vec<u8>),
    /// An ordered, heterogeneous list of values.
    List(Vec<Value>),
    /// A dictionary in canonical key order.
    Dictionary(SortedDictionary),
}

/// One key/value pair of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: Vec<u8>,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Unordered dictionary builder.
///
/// Pairs are kept exactly as inserted, duplicates included. Convert it into a
/// [`SortedDictionary`] (or straight into a [`Value`]) to encode it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    fields: Vec<Field>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a pair.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) {
        self.fields.push(Field::new(key, value));
    }

    /// Appends a pair, builder style.
    pub fn with(mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Sorts the pairs into canonical form.
    pub fn into_sorted(self) -> SortedDictionary {
        SortedDictionary::from(self)
    }
}

impl FromIterator<Field> for Dictionary {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A dictionary whose keys are strictly increasing in byte-wise order.
///
/// There is no way to build one out of order: the public constructors sort, and the
/// parsers only produce one after having checked the order on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedDictionary {
    fields: Vec<Field>,
}

impl SortedDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps fields the caller has already proven to be canonical.
    pub(crate) fn from_sorted_unchecked(fields: Vec<Field>) -> Self {
        debug_assert!(fields.windows(2).all(|w| w[0].key < w[1].key));
        Self { fields }
    }

    /// Looks a key up by binary search.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.fields
            .binary_search_by(|field| field.key.as_slice().cmp(key))
            .ok()
            .map(|index| &self.fields[index].value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.fields.iter().map(|field| field.key.as_slice())
    }

    pub fn into_inner(self) -> Vec<Field> {
        self.fields
    }
}

impl From<Dictionary> for SortedDictionary {
    /// Stable byte-wise sort by key. When a key occurs more than once the last
    /// inserted pair wins, so the result never holds duplicates.
    fn from(dictionary: Dictionary) -> Self {
        let mut fields = dictionary.fields;
        fields.sort_by(|lhs, rhs| lhs.key.cmp(&rhs.key));

        let mut canonical: Vec<Field> = Vec::with_capacity(fields.len());
        for field in fields {
            match canonical.last_mut() {
                Some(last) if last.key == field.key => *last = field,
                _ => canonical.push(field),
            }
        }
        Self { fields: canonical }
    }
}

impl FromIterator<Field> for SortedDictionary {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Dictionary::from_iter(iter).into()
    }
}

impl<'a> IntoIterator for &'a SortedDictionary {
    type Item = &'a Field;
    type IntoIter = core::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Value {
    /// Creates a byte string value from UTF-8 text.
    pub fn string(s: &str) -> Self {
        Value::ByteString(s.as_bytes().to_vec())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::ByteString(_) => ValueKind::ByteString,
            Value::List(_) => ValueKind::List,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a byte string, if it is one.
    pub fn as_byte_string(&self) -> Option<&[u8]> {
        match self {
            Value::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as text if it is a byte string holding valid UTF-8.
    ///
    /// ```
    /// use picobencode::Value;
    ///
    /// assert_eq!(Value::string("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::ByteString(vec![0xff]).as_str(), None);
    /// assert_eq!(Value::Integer(1).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        self.as_byte_string()
            .and_then(|b| core::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&SortedDictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    // `Value` implements `Drop`, so payloads are taken rather than moved out.

    pub fn into_byte_string(mut self) -> Option<Vec<u8>> {
        match &mut self {
            Value::ByteString(b) => Some(mem::take(b)),
            _ => None,
        }
    }

    pub fn into_list(mut self) -> Option<Vec<Value>> {
        match &mut self {
            Value::List(l) => Some(mem::take(l)),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    pub fn into_dictionary(mut self) -> Option<SortedDictionary> {
        match &mut self {
            Value::Dictionary(d) => Some(mem::take(d)),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dictionary()?.get(key)
    }

    /// Encodes the value into a fresh buffer.
    pub fn encode(&self) -> Vec<u8> {
        writer::encode(self)
    }

    /// Appends the canonical encoding of the value to `output`.
    pub fn encode_into(&self, output: &mut Vec<u8>) {
        writer::encode_value(output, self)
    }
}

impl Drop for Value {
    /// Tears nested containers down with a heap worklist instead of recursion, so a
    /// value of any depth can be dropped on a small stack.
    fn drop(&mut self) {
        let mut pending = match self {
            Value::List(values) if !values.is_empty() => mem::take(values),
            Value::Dictionary(dictionary) if !dictionary.is_empty() => {
                mem::take(&mut dictionary.fields)
                    .into_iter()
                    .map(|field| field.value)
                    .collect()
            }
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::List(values) => pending.append(values),
                Value::Dictionary(dictionary) => pending.extend(
                    mem::take(&mut dictionary.fields)
                        .into_iter()
                        .map(|field| field.value),
                ),
                _ => {}
            }
            // `value` is now childless and drops without recursing.
        }
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::ByteString(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::ByteString(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dictionary(d.into())
    }
}

impl From<SortedDictionary> for Value {
    fn from(d: SortedDictionary) -> Self {
        Value::Dictionary(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_sorting_is_bytewise() {
        let sorted = Dictionary::new()
            .with("b", Value::Integer(2))
            .with("B", Value::Integer(3))
            .with("a", Value::Integer(1))
            .with("aa", Value::Integer(4))
            .into_sorted();
        let keys: Vec<&[u8]> = sorted.keys().collect();
        assert_eq!(keys, vec![&b"B"[..], &b"a"[..], &b"aa"[..], &b"b"[..]]);
    }

    #[test]
    fn test_duplicate_keys_keep_last_insert() {
        let sorted = Dictionary::new()
            .with("k", Value::Integer(1))
            .with("j", Value::Integer(0))
            .with("k", Value::Integer(2))
            .into_sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted.get(b"k"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_get_on_non_dictionary() {
        assert_eq!(Value::Integer(1).get(b"a"), None);
        let value = Value::from(Dictionary::new().with("a", "x"));
        assert_eq!(value.get(b"a").and_then(Value::as_str), Some("x"));
        assert_eq!(value.get(b"b"), None);
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.kind(), ValueKind::Integer);
        assert!(value.as_byte_string().is_none());

        let value = Value::from(&b"test"[..]);
        assert_eq!(value.as_str(), Some("test"));
        assert!(value.as_integer().is_none());

        let value = Value::List(vec![]);
        assert!(value.as_list().is_some());
        assert!(value.as_dictionary().is_none());
        assert_eq!(value.into_list(), Some(vec![]));
    }

    #[test]
    fn test_into_accessors_take_payload() {
        let value = Value::from(Dictionary::new().with("a", Value::Integer(1)));
        let dictionary = value.into_dictionary().unwrap();
        assert_eq!(dictionary.get(b"a"), Some(&Value::Integer(1)));

        assert_eq!(Value::string("x").into_byte_string(), Some(b"x".to_vec()));
        assert_eq!(Value::string("x").into_list(), None);
    }

    #[test]
    fn test_deep_values_drop_without_recursion() {
        let mut value = Value::List(vec![]);
        for level in 0..200_000 {
            value = if level % 2 == 0 {
                Value::List(vec![Value::Integer(level), value])
            } else {
                Value::from(Dictionary::new().with("k", value))
            };
        }
        drop(value);
    }
}
