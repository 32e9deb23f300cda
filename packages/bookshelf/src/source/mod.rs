//! Event sources that drive a [`MarkupHandler`].
//!
//! A source delivers events synchronously, in document order, one at a
//! time. For well-formed input that is one `start_document`, a well-nested
//! sequence of element and character events, then one `end_document`. For
//! malformed input the source delivers `parse_error` and stops.
//!
//! - [`StreamSource`]: incremental tokenizer over any `BufRead` (quick-xml).
//! - [`TreeSource`]: parses the whole text into a tree first (roxmltree),
//!   then walks it.
//! - [`EventReplay`]: delivers a recorded event list verbatim.

mod replay;
mod stream;
mod tree;

pub use replay::{EventRecorder, EventReplay};
pub use stream::StreamSource;
pub use tree::TreeSource;

use crate::event::{Attributes, MarkupEvent, ParseFailure};

/// Receiver of markup events, one entry point per event kind.
pub trait MarkupHandler {
    fn start_document(&mut self);

    fn end_document(&mut self);

    /// `name` is the element's local name.
    fn start_element(&mut self, name: &str, attributes: &Attributes);

    fn end_element(&mut self, name: &str);

    /// A chunk of character data. Chunks of one text run arrive in order.
    fn characters(&mut self, text: &str);

    /// Terminal failure of the current pass.
    fn parse_error(&mut self, failure: ParseFailure);

    /// Dispatch an owned event to the matching entry point.
    fn handle(&mut self, event: MarkupEvent) {
        match event {
            MarkupEvent::StartDocument => self.start_document(),
            MarkupEvent::EndDocument => self.end_document(),
            MarkupEvent::StartElement { name, attributes } => {
                self.start_element(&name, &attributes);
            }
            MarkupEvent::EndElement { name } => self.end_element(&name),
            MarkupEvent::Characters(text) => self.characters(&text),
            MarkupEvent::Error(failure) => self.parse_error(failure),
        }
    }
}

/// Something that can drive a handler through one complete pass.
pub trait EventSource {
    /// Deliver every event to `handler`, returning when the stream ends.
    fn drive<H: MarkupHandler + ?Sized>(self, handler: &mut H);
}
