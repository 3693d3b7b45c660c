// SPDX-License-Identifier: Apache-2.0

//! Generated values are encoded, then fed one byte per call to both parsers.
//!
//! The batch parser must rebuild an equal value, and the streaming parser's events written
//! back through a `Writer` must reproduce the encoding exactly.

use picobencode::{
    encode, DecodeError, Dictionary, Event, Field, Integer, PushParser, TreeParser, Value, Writer,
};

/// Payload bytes, biased towards bencode's own markers.
const ALPHABET: &[u8] = b"eil d:0123-\x00\xff";

/// Deterministic xorshift64 value generator.
struct Generator {
    state: u64,
}

impl Generator {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }

    fn integer(&mut self) -> Integer {
        match self.below(5) {
            0 => 0,
            1 => Integer::MAX,
            2 => Integer::MIN,
            3 => self.below(100) as Integer - 50,
            _ => self.next() as Integer,
        }
    }

    fn bytes(&mut self) -> Vec<u8> {
        let length = match self.below(8) {
            0 => 0,
            7 => 20 + self.below(200),
            n => n,
        };
        (0..length)
            .map(|_| ALPHABET[self.below(ALPHABET.len() as u64) as usize])
            .collect()
    }

    /// A value nested at most `depth` containers deep.
    fn value(&mut self, depth: usize) -> Value {
        let kinds = if depth == 0 { 2 } else { 4 };
        match self.below(kinds) {
            0 => Value::Integer(self.integer()),
            1 => Value::ByteString(self.bytes()),
            2 => {
                let count = self.below(4);
                Value::List((0..count).map(|_| self.value(depth - 1)).collect())
            }
            _ => {
                let count = self.below(5);
                let dictionary: Dictionary = (0..count)
                    .map(|_| Field::new(self.bytes(), self.value(depth - 1)))
                    .collect();
                Value::from(dictionary)
            }
        }
    }
}

fn tree_parse_bytewise(encoded: &[u8]) -> Result<Value, DecodeError> {
    let mut parser = TreeParser::new();
    for &byte in encoded {
        assert_eq!(parser.try_parse_one(), Err(DecodeError::IncompleteMessage));
        parser.append(&[byte]);
    }
    let value = parser.try_parse_one()?;
    assert!(parser.is_empty());
    Ok(value)
}

fn stream_reencode_bytewise(encoded: &[u8]) -> Vec<u8> {
    let mut writer = Writer::new();
    let mut parser = PushParser::new(|event: Event<'_>| {
        match event {
            Event::Integer(value) => writer.push_integer(value),
            Event::ByteString(bytes) => writer.push_byte_string(bytes),
            Event::ListBegin => writer.push_raw(b"l"),
            Event::DictionaryBegin => writer.push_raw(b"d"),
            Event::ListEnd | Event::DictionaryEnd => writer.push_raw(b"e"),
        }
        Ok::<(), ()>(())
    });
    for byte in encoded {
        parser.receive::<()>(core::slice::from_ref(byte)).unwrap();
    }
    assert!(parser.finished());
    drop(parser);
    writer.into_inner()
}

macro_rules! generate_round_trip_tests {
    ($($name:ident: $seed:expr,)*) => {
        $(
            paste::paste! {
                #[test_log::test]
                fn [<test_round_trip_ $name>]() {
                    let mut generator = Generator::new($seed);
                    for round in 0..100 {
                        let value = generator.value(4);
                        let encoded = encode(&value);
                        assert_eq!(
                            tree_parse_bytewise(&encoded).as_ref(),
                            Ok(&value),
                            "round {round}"
                        );
                        assert_eq!(stream_reencode_bytewise(&encoded), encoded, "round {round}");
                    }
                }
            }
        )*
    };
}

generate_round_trip_tests! {
    seed_1: 1,
    seed_2: 0x9e37_79b9_7f4a_7c15,
    seed_3: 0xdead_beef,
    seed_4: 42,
}
