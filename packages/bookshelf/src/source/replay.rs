//! Recorded event streams.

use super::{EventSource, MarkupHandler};
use crate::event::{Attributes, MarkupEvent, ParseFailure};

/// Delivers a fixed list of events verbatim.
///
/// Delivery stops after the first `Error` event, as a tokenizer would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventReplay {
    events: Vec<MarkupEvent>,
}

impl EventReplay {
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = MarkupEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Wrap `body` in `StartDocument` .. `EndDocument`.
    #[must_use]
    pub fn document(body: impl IntoIterator<Item = MarkupEvent>) -> Self {
        let mut events = vec![MarkupEvent::StartDocument];
        events.extend(body);
        events.push(MarkupEvent::EndDocument);
        Self { events }
    }

    #[must_use]
    pub fn events(&self) -> &[MarkupEvent] {
        &self.events
    }
}

impl FromIterator<MarkupEvent> for EventReplay {
    fn from_iter<I: IntoIterator<Item = MarkupEvent>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl EventSource for EventReplay {
    fn drive<H: MarkupHandler + ?Sized>(self, handler: &mut H) {
        for event in self.events {
            let stop = matches!(event, MarkupEvent::Error(_));
            handler.handle(event);
            if stop {
                break;
            }
        }
    }
}

/// Handler that records every event it receives.
///
/// Adjacent character chunks are kept separate, so a recording shows
/// exactly how a source split the text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecorder {
    events: Vec<MarkupEvent>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `source` to completion and return what it delivered.
    #[must_use]
    pub fn record<S: EventSource>(source: S) -> Vec<MarkupEvent> {
        let mut recorder = Self::new();
        source.drive(&mut recorder);
        recorder.events
    }
}

impl MarkupHandler for EventRecorder {
    fn start_document(&mut self) {
        self.events.push(MarkupEvent::StartDocument);
    }

    fn end_document(&mut self) {
        self.events.push(MarkupEvent::EndDocument);
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) {
        self.events.push(MarkupEvent::StartElement {
            name: name.to_string(),
            attributes: attributes.clone(),
        });
    }

    fn end_element(&mut self, name: &str) {
        self.events.push(MarkupEvent::end(name));
    }

    fn characters(&mut self, text: &str) {
        self.events.push(MarkupEvent::text(text));
    }

    fn parse_error(&mut self, failure: ParseFailure) {
        self.events.push(MarkupEvent::Error(failure));
    }
}
