// Example demonstrating PushParser with SAX-style event handling

use picobencode::{Event, PushParseError, PushParser, PushParserHandler};

/// Prints bencode events as they arrive, tracking which byte strings are keys
struct EventPrinter {
    /// One entry per open container: true for a dictionary expecting a key
    expecting_key: Vec<Option<bool>>,
    event_count: usize,
}

impl EventPrinter {
    fn new() -> Self {
        Self {
            expecting_key: Vec::new(),
            event_count: 0,
        }
    }

    fn indent_str(&self) -> String {
        "  ".repeat(self.expecting_key.len())
    }

    /// Called after every complete value; flips a parent dictionary back to keys.
    fn value_done(&mut self) {
        if let Some(Some(expecting)) = self.expecting_key.last_mut() {
            *expecting = true;
        }
    }
}

impl PushParserHandler<()> for EventPrinter {
    fn handle_event(&mut self, event: Event<'_>) -> Result<(), ()> {
        self.event_count += 1;
        match event {
            Event::Integer(value) => {
                println!("{}Integer: {}", self.indent_str(), value);
                self.value_done();
            }
            Event::ByteString(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                if let Some(Some(expecting)) = self.expecting_key.last_mut() {
                    if *expecting {
                        *expecting = false;
                        println!("{}Key: '{}'", self.indent_str(), text);
                        return Ok(());
                    }
                }
                println!("{}ByteString: '{}'", self.indent_str(), text);
                self.value_done();
            }
            Event::ListBegin => {
                println!("{}ListBegin", self.indent_str());
                self.expecting_key.push(None);
            }
            Event::DictionaryBegin => {
                println!("{}DictionaryBegin", self.indent_str());
                self.expecting_key.push(Some(true));
            }
            Event::ListEnd | Event::DictionaryEnd => {
                self.expecting_key.pop();
                println!("{}{:?}", self.indent_str(), event);
                self.value_done();
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), PushParseError<()>> {
    println!("PushParser Demo - SAX-style bencode processing");
    println!("==============================================");
    println!();

    // Chunk boundaries deliberately split tokens
    let chunks: [&[u8]; 5] = [
        b"d8:announce15:http://tr",
        b"acker/4:infod6:leng",
        b"thi1024e4:name8:file.b",
        b"in5:piecesl1:a1:b",
        b"eeei42e",
    ];

    let mut parser = PushParser::new(EventPrinter::new());
    for (index, chunk) in chunks.iter().enumerate() {
        println!("-- chunk {} ({} bytes)", index + 1, chunk.len());
        parser.receive::<()>(chunk)?;
    }
    parser.finish::<()>()?;

    let handler = parser.destroy();
    println!();
    println!("Processed {} events", handler.event_count);

    // Faults are fatal and carry the absolute stream offset
    let mut parser = PushParser::new(EventPrinter::new());
    match parser.receive::<()>(b"d1:bi1e1:ai2ee") {
        Err(PushParseError::Stream(error)) => println!("Rejected as expected: {error}"),
        other => println!("Unexpected result: {other:?}"),
    }
    Ok(())
}
