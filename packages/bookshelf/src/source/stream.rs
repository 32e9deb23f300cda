//! Incremental event source backed by the quick-xml pull parser.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{EventSource, MarkupHandler};
use crate::error::Result;
use crate::event::{Attributes, ParseFailure};

/// Streams events out of a `BufRead` without building a tree.
///
/// Records that close before a syntax error still reach the handler, which
/// makes this the source to use for truncated input.
pub struct StreamSource<R> {
    reader: Reader<R>,
}

impl<'a> StreamSource<&'a [u8]> {
    /// Source over in-memory text.
    #[must_use]
    pub fn from_text(xml: &'a str) -> Self {
        Self::from_reader(xml.as_bytes())
    }
}

impl StreamSource<BufReader<File>> {
    /// Open a file for streaming.
    ///
    /// # Errors
    /// Returns `CatalogError::Io` if the file cannot be opened. No handler
    /// has seen any event at that point.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> StreamSource<R> {
    pub fn from_reader(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(false);
        Self { reader }
    }
}

/// Names of the elements that are open at the current position.
#[derive(Default)]
struct OpenElements {
    names: Vec<String>,
    seen_root: bool,
}

impl OpenElements {
    fn push(&mut self, name: String) {
        self.seen_root = true;
        self.names.push(name);
    }

    /// A document has exactly one root element.
    fn check_element(&self, name: &str) -> std::result::Result<(), String> {
        if self.seen_root && self.names.is_empty() {
            return Err(format!("element <{name}> after the root element"));
        }
        Ok(())
    }

    /// Only whitespace may appear outside the root element.
    fn check_text(&self, text: &str) -> std::result::Result<(), String> {
        if self.names.is_empty() && !text.trim().is_empty() {
            return Err("text outside the root element".to_string());
        }
        Ok(())
    }
}

impl<R: BufRead> EventSource for StreamSource<R> {
    fn drive<H: MarkupHandler + ?Sized>(mut self, handler: &mut H) {
        handler.start_document();

        let mut buf = Vec::new();
        let mut open = OpenElements::default();

        loop {
            let event = match self.reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(err) => {
                    let offset = self.reader.error_position() as u64;
                    handler.parse_error(ParseFailure::new(err.to_string()).at(offset));
                    return;
                }
            };
            let offset = self.reader.buffer_position() as u64;

            match deliver(event, &mut open, handler) {
                Ok(true) => {}
                Ok(false) => break,
                Err(message) => {
                    handler.parse_error(ParseFailure::new(message).at(offset));
                    return;
                }
            }
            buf.clear();
        }

        let offset = self.reader.buffer_position() as u64;
        if let Some(name) = open.names.last() {
            handler.parse_error(
                ParseFailure::new(format!("unexpected end of document: <{name}> is not closed"))
                    .at(offset),
            );
            return;
        }
        if !open.seen_root {
            handler.parse_error(ParseFailure::new("document has no root element").at(offset));
            return;
        }

        handler.end_document();
    }
}

/// Forward one tokenizer event. Returns `Ok(false)` at end of input.
fn deliver<H: MarkupHandler + ?Sized>(
    event: Event<'_>,
    open: &mut OpenElements,
    handler: &mut H,
) -> std::result::Result<bool, String> {
    match event {
        Event::Start(start) => {
            let (name, attributes) = read_start(&start)?;
            open.check_element(&name)?;
            handler.start_element(&name, &attributes);
            open.push(name);
        }
        Event::Empty(start) => {
            let (name, attributes) = read_start(&start)?;
            open.check_element(&name)?;
            open.seen_root = true;
            handler.start_element(&name, &attributes);
            handler.end_element(&name);
        }
        Event::End(end) => {
            let name = decode(end.local_name().as_ref())?.to_string();
            open.names.pop();
            handler.end_element(&name);
        }
        Event::Text(text) => {
            let text = text.unescape().map_err(|e| e.to_string())?;
            open.check_text(&text)?;
            // Whitespace outside the root element is not content.
            if !text.is_empty() && !open.names.is_empty() {
                handler.characters(&text);
            }
        }
        Event::CData(data) => {
            let data = data.into_inner();
            let text = decode(&data)?;
            open.check_text(text)?;
            handler.characters(text);
        }
        Event::Eof => return Ok(false),
        // Declarations, comments, processing instructions and doctype carry
        // nothing the collector reads.
        _ => {}
    }
    Ok(true)
}

fn read_start(start: &BytesStart<'_>) -> std::result::Result<(String, Attributes), String> {
    let name = decode(start.local_name().as_ref())?.to_string();
    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = decode(attr.key.local_name().as_ref())?.to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.push(key, value.into_owned());
    }
    Ok((name, attributes))
}

fn decode(bytes: &[u8]) -> std::result::Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| format!("invalid UTF-8 in markup: {e}"))
}
