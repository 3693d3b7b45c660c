// SPDX-License-Identifier: Apache-2.0

//! Canonical encoding fixtures for `encode` and `Writer`.

use picobencode::{encode, Dictionary, Field, SortedDictionary, Value, Writer};

fn list(values: Vec<Value>) -> Value {
    Value::List(values)
}

macro_rules! generate_encoding_tests {
    ($($name:ident: $value:expr => $expected:expr,)*) => {
        $(
            paste::paste! {
                #[test]
                fn [<test_encode_ $name>]() {
                    let value: Value = $value;
                    assert_eq!(
                        encode(&value),
                        $expected,
                        "{:?} encoded as {:?}",
                        value,
                        String::from_utf8_lossy(&encode(&value))
                    );
                }
            }
        )*
    };
}

generate_encoding_tests! {
    zero: Value::Integer(0) => b"i0e",
    positive: Value::Integer(25) => b"i25e",
    negative: Value::Integer(-1) => b"i-1e",
    empty_string: Value::string("") => b"0:",
    short_string: Value::string("foo") => b"3:foo",
    word: Value::string("bencode") => b"7:bencode",
    utf8_length_in_bytes: Value::string("\u{263a}") => "3:\u{263a}".as_bytes(),
    sentence: Value::string("Lorem ipsum dolor sit amet") => b"26:Lorem ipsum dolor sit amet",
    binary: Value::from(&[0u8, 255, b'e'][..]) => b"3:\x00\xffe",
    empty_list: list(vec![]) => b"le",
    single_item_list: list(vec![Value::string("a")]) => b"l1:ae",
    repeated_items: list(vec![Value::string("a"), Value::string("a")]) => b"l1:a1:ae",
    mixed_list: list(vec![
        Value::Integer(-1),
        Value::string("a"),
        Value::Integer(25),
        Value::string("foo"),
    ]) => b"li-1e1:ai25e3:fooe",
    nested_lists: list(vec![
        list(vec![Value::string("a"), Value::string("a")]),
        list(vec![Value::string("a"), Value::string("a")]),
    ]) => b"ll1:a1:ael1:a1:aee",
    empty_dictionary: Value::from(Dictionary::new()) => b"de",
    single_field: Value::from(Dictionary::new().with("a", Value::Integer(1))) => b"d1:ai1ee",
    sorted_fields: Value::from(
        Dictionary::new().with("a", Value::Integer(1)).with("b", Value::Integer(2))
    ) => b"d1:ai1e1:bi2ee",
    unsorted_fields: Value::from(
        Dictionary::new().with("b", Value::Integer(2)).with("a", Value::Integer(1))
    ) => b"d1:ai1e1:bi2ee",
    byte_order_not_length_order: Value::from(
        Dictionary::new().with("b", Value::Integer(1)).with("aa", Value::Integer(2))
    ) => b"d2:aai2e1:bi1ee",
}

#[cfg(feature = "int64")]
generate_encoding_tests! {
    max: Value::Integer(i64::MAX) => b"i9223372036854775807e",
    min: Value::Integer(i64::MIN) => b"i-9223372036854775808e",
}

#[cfg(feature = "int32")]
generate_encoding_tests! {
    max: Value::Integer(i32::MAX) => b"i2147483647e",
    min: Value::Integer(i32::MIN) => b"i-2147483648e",
}

#[test]
fn test_long_byte_string_header() {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor \
                incididunt ut labore et dolore magna aliqua.";
    let encoded = encode(&Value::string(text));
    assert_eq!(&encoded[..4], b"123:");
    assert_eq!(&encoded[4..], text.as_bytes());
}

#[test]
fn test_insertion_order_does_not_matter() {
    let pairs = [("cow", "moo"), ("spam", "eggs"), ("a", "first"), ("zebra", "last")];
    let forward: Dictionary = pairs.iter().map(|(k, v)| Field::new(*k, *v)).collect();
    let backward: Dictionary = pairs.iter().rev().map(|(k, v)| Field::new(*k, *v)).collect();
    assert_eq!(
        encode(&Value::from(forward)),
        encode(&Value::from(backward))
    );
}

#[test]
fn test_sorted_dictionary_keeps_last_duplicate() {
    let dictionary: SortedDictionary = Dictionary::new()
        .with("k", Value::Integer(1))
        .with("k", Value::Integer(2))
        .into_sorted();
    assert_eq!(dictionary.len(), 1);
    assert_eq!(encode(&Value::from(dictionary)), b"d1:ki2ee");
}

#[test]
fn test_writer_matches_encode() {
    let value = Value::from(
        Dictionary::new()
            .with("list", list(vec![Value::Integer(1), Value::string("x")]))
            .with("int", Value::Integer(-7)),
    );

    let mut writer = Writer::new();
    {
        let mut dictionary = writer.dictionary();
        dictionary
            .entry(b"int", |w| w.push_integer(-7))
            .entry(b"list", |w| {
                let mut list = w.list();
                list.push_integer(1);
                list.push_byte_string(b"x");
            });
    }
    assert_eq!(writer.as_bytes(), encode(&value));

    writer.clear();
    writer.push_value(&value);
    assert_eq!(writer.into_inner(), encode(&value));
}

#[test]
fn test_guard_closes_on_early_return() {
    fn write_until_empty(writer: &mut Writer, items: &[&[u8]]) -> Result<(), usize> {
        let mut list = writer.list();
        for (index, item) in items.iter().enumerate() {
            if item.is_empty() {
                return Err(index);
            }
            list.push_byte_string(item);
        }
        Ok(())
    }

    let mut writer = Writer::new();
    assert_eq!(write_until_empty(&mut writer, &[b"ab", b"", b"cd"]), Err(1));
    assert_eq!(writer.take(), b"l2:abe");
    assert_eq!(write_until_empty(&mut writer, &[b"x"]), Ok(()));
    assert_eq!(writer.take(), b"l1:xe");
}
