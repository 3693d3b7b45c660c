// Example demonstrating TreeParser on fragmented input, and the Writer

use picobencode::{DecodeError, Dictionary, TreeParser, Value, Writer};

fn describe(value: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Integer(i) => println!("{pad}{i}"),
        Value::ByteString(bytes) => println!("{pad}'{}'", String::from_utf8_lossy(bytes)),
        Value::List(items) => {
            println!("{pad}list ({} items)", items.len());
            for item in items {
                describe(item, indent + 1);
            }
        }
        Value::Dictionary(dictionary) => {
            println!("{pad}dictionary ({} fields)", dictionary.len());
            for field in dictionary {
                println!("{pad}  {}:", String::from_utf8_lossy(&field.key));
                describe(&field.value, indent + 2);
            }
        }
    }
}

fn main() -> Result<(), DecodeError> {
    // Build a message with the value model; keys are sorted on encode
    let message = Value::from(
        Dictionary::new()
            .with("y", Value::string("q"))
            .with("t", Value::string("aa"))
            .with("q", Value::string("ping"))
            .with("a", Value::from(Dictionary::new().with("id", Value::string("abcdefghij0123456789")))),
    );
    let encoded = message.encode();
    println!("Encoded: {}", String::from_utf8_lossy(&encoded));

    // The same bytes with the Writer, imperatively
    let mut writer = Writer::new();
    {
        let mut dictionary = writer.dictionary();
        dictionary
            .entry(b"a", |w| {
                let mut inner = w.dictionary();
                inner.entry(b"id", |w| w.push_byte_string(b"abcdefghij0123456789"));
            })
            .entry(b"q", |w| w.push_byte_string(b"ping"))
            .entry(b"t", |w| w.push_byte_string(b"aa"))
            .entry(b"y", |w| w.push_byte_string(b"q"));
    }
    assert_eq!(writer.as_bytes(), encoded.as_slice());

    // Feed it back three bytes at a time, as a socket might
    let mut parser = TreeParser::new();
    for chunk in encoded.chunks(3) {
        parser.append(chunk);
        match parser.try_parse_one() {
            Ok(value) => {
                println!("Decoded:");
                describe(&value, 1);
                assert_eq!(value, message);
            }
            Err(e) if e.is_recoverable() => continue,
            Err(e) => return Err(e),
        }
    }

    // Invalid input is reported, not coerced
    let mut parser = TreeParser::new();
    parser.append(b"d1:bi1e1:ai2ee");
    println!("Unsorted keys: {:?}", parser.try_parse_one());
    Ok(())
}
