//! Event source that walks a parsed roxmltree document.

use roxmltree::{Document, Node, ParsingOptions};

use super::{EventSource, MarkupHandler};
use crate::event::{Attributes, ParseFailure};

/// Parses the whole text up front, then replays it as events.
///
/// A syntax error anywhere in the text is reported before any element
/// event, so a failed pass through this source yields no records.
#[derive(Debug, Clone)]
pub struct TreeSource {
    text: String,
}

impl TreeSource {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl EventSource for TreeSource {
    fn drive<H: MarkupHandler + ?Sized>(self, handler: &mut H) {
        handler.start_document();

        let mut options = ParsingOptions::default();
        options.allow_dtd = true;

        let doc = match Document::parse_with_options(&self.text, options) {
            Ok(doc) => doc,
            Err(err) => {
                handler.parse_error(ParseFailure::new(err.to_string()));
                return;
            }
        };

        for child in doc.root().children() {
            walk(child, handler);
        }

        handler.end_document();
    }
}

/// Deliver `node` and its subtree in document order.
fn walk<H: MarkupHandler + ?Sized>(node: Node<'_, '_>, handler: &mut H) {
    if node.is_element() {
        let name = node.tag_name().name();
        handler.start_element(name, &attributes_of(node));
        for child in node.children() {
            walk(child, handler);
        }
        handler.end_element(name);
    } else if node.is_text() {
        if let Some(text) = node.text() {
            handler.characters(text);
        }
    }
}

/// Attributes by local name. Namespace declarations are not included.
fn attributes_of(node: Node<'_, '_>) -> Attributes {
    node.attributes()
        .map(|attr| (attr.name(), attr.value()))
        .collect()
}
