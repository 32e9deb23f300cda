//! The record collector: turns markup events into catalog records.
//!
//! The collector's state is the pair (open record?, open field?):
//!
//! ```text
//!  idle ──<book>──▶ record-open ──<field>──▶ field-open
//!   ▲                 │   ▲                     │
//!   └────</book>──────┘   └──────</field>───────┘
//! ```
//!
//! Character data is kept only while a field is open. Anything the state
//! does not expect (a stray end tag, a record inside a record, a field
//! outside any record, price text that is not a number) is recovered
//! locally and recorded as a [`Warning`]. Only a parse error from the
//! source ends a pass early.

use std::mem;
use std::ops::Index;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::CollectorConfig;
use crate::event::{Attributes, ParseFailure};
use crate::source::{EventSource, MarkupHandler};
use crate::types::{Field, Record};

/// A recoverable anomaly seen during a pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    /// Price text that is not a decimal number; the price fell back to 0.
    #[error("record {record}: price '{text}' is not a decimal number, using 0")]
    InvalidPrice { record: usize, text: String },

    /// End tag of a field that is not the open field.
    #[error("end tag </{tag}> does not close an open field")]
    StrayFieldEnd { tag: String },

    /// End tag of a record while no record is open.
    #[error("end tag </{tag}> without an open record")]
    StrayRecordEnd { tag: String },

    /// Record start tag while a record is still open; ignored.
    #[error("<{tag}> inside an unfinished record, ignored")]
    NestedRecord { tag: String },

    /// Field start tag while no record is open; ignored.
    #[error("field <{tag}> outside any record, ignored")]
    FieldOutsideRecord { tag: String },
}

/// Builds [`Record`]s from one pass over an event stream.
///
/// A collector is not reentrant: run one pass at a time, and read the
/// results only after [`reset_and_run`](Self::reset_and_run) returns.
#[derive(Debug)]
pub struct RecordCollector {
    config: CollectorConfig,
    current: Option<Record>,
    open_field: Option<Field>,
    accumulator: String,
    output: Vec<Record>,
    warnings: Vec<Warning>,
    error: Option<ParseFailure>,
    started_at: Option<Instant>,
    last_duration: Duration,
}

impl RecordCollector {
    /// Collector with the default `<book>` configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CollectorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CollectorConfig) -> Self {
        Self {
            config,
            current: None,
            open_field: None,
            accumulator: String::new(),
            output: Vec::new(),
            warnings: Vec::new(),
            error: None,
            started_at: None,
            last_duration: Duration::ZERO,
        }
    }

    /// Clear all results, then drive `source` to completion.
    ///
    /// On return the pass is finished: `results()` holds every record closed
    /// before the stream ended, and `error()` is set if the source reported
    /// a parse error.
    ///
    /// The clock runs from `start_document` (or from this call, if the source
    /// never sends one) to `end_document` or `parse_error`, whichever comes
    /// first. A source that stops without either stops the clock here.
    pub fn reset_and_run<S: EventSource>(&mut self, source: S) {
        self.reset();
        self.started_at = Some(Instant::now());

        source.drive(self);

        self.stop_clock();
        tracing::info!(
            records = self.output.len(),
            warnings = self.warnings.len(),
            duration_ms = self.last_duration.as_secs_f64() * 1000.0,
            failed = self.error.is_some(),
            "Parse pass finished"
        );
    }

    /// Records of the most recent pass, in document order of their end tags.
    ///
    /// After a failed pass this is every record closed before the failure.
    #[must_use]
    pub fn results(&self) -> &[Record] {
        &self.output
    }

    /// Take the records of the most recent pass.
    #[must_use]
    pub fn into_results(self) -> Vec<Record> {
        self.output
    }

    /// Wall-clock time of the most recent pass.
    #[must_use]
    pub fn last_duration(&self) -> Duration {
        self.last_duration
    }

    /// The parse error that ended the most recent pass, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ParseFailure> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.output.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.output.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Vec<Record>, Vec<Warning>, Duration, Option<ParseFailure>) {
        (self.output, self.warnings, self.last_duration, self.error)
    }

    fn reset(&mut self) {
        self.current = None;
        self.open_field = None;
        self.accumulator.clear();
        self.output.clear();
        self.warnings.clear();
        self.error = None;
        self.started_at = None;
        self.last_duration = Duration::ZERO;
    }

    fn stop_clock(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.last_duration = started.elapsed();
        }
    }

    fn halted(&self) -> bool {
        self.error.is_some()
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "Recovered from unexpected markup");
        self.warnings.push(warning);
    }

    fn close_field(&mut self, field: Field) {
        let text = mem::take(&mut self.accumulator);
        let record_index = self.output.len();
        let Some(record) = self.current.as_mut() else {
            return;
        };
        if let Err(invalid) = record.assign(field, text) {
            self.warn(Warning::InvalidPrice {
                record: record_index,
                text: invalid.text,
            });
        }
    }
}

impl Default for RecordCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for RecordCollector {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.output[index]
    }
}

impl MarkupHandler for RecordCollector {
    fn start_document(&mut self) {
        if self.halted() {
            return;
        }
        self.started_at = Some(Instant::now());
    }

    fn end_document(&mut self) {
        if self.halted() {
            return;
        }
        self.stop_clock();
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) {
        if self.halted() {
            return;
        }

        if self.config.is_record_tag(name) {
            if self.current.is_some() {
                self.warn(Warning::NestedRecord {
                    tag: name.to_string(),
                });
                return;
            }
            let mut record = Record::new();
            if let Some(id) = attributes.get(self.config.id_attribute()) {
                record.id = id.to_string();
            }
            self.current = Some(record);
            return;
        }

        if let Some(field) = self.config.field_for(name) {
            if self.current.is_none() {
                self.warn(Warning::FieldOutsideRecord {
                    tag: name.to_string(),
                });
                return;
            }
            self.accumulator.clear();
            self.open_field = Some(field);
        }
    }

    fn end_element(&mut self, name: &str) {
        if self.halted() {
            return;
        }

        if self.config.is_record_tag(name) {
            let Some(record) = self.current.take() else {
                self.warn(Warning::StrayRecordEnd {
                    tag: name.to_string(),
                });
                return;
            };
            // A field left open by broken nesting is dropped, not assigned.
            self.open_field = None;
            self.accumulator.clear();
            tracing::debug!(index = self.output.len(), id = %record.id, "Record finished");
            self.output.push(record);
            return;
        }

        if let Some(field) = self.config.field_for(name) {
            match self.open_field {
                Some(open) if open == field && self.current.is_some() => {
                    self.open_field = None;
                    self.close_field(field);
                }
                _ => self.warn(Warning::StrayFieldEnd {
                    tag: name.to_string(),
                }),
            }
        }
    }

    fn characters(&mut self, text: &str) {
        if self.halted() || self.open_field.is_none() {
            return;
        }
        self.accumulator.push_str(text);
    }

    fn parse_error(&mut self, failure: ParseFailure) {
        if self.halted() {
            return;
        }
        tracing::warn!(error = %failure, records = self.output.len(), "Parse pass failed");
        self.stop_clock();
        self.current = None;
        self.open_field = None;
        self.accumulator.clear();
        self.error = Some(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MarkupEvent;
    use crate::source::EventReplay;

    fn run(events: Vec<MarkupEvent>) -> RecordCollector {
        let mut collector = RecordCollector::new();
        collector.reset_and_run(EventReplay::document(events));
        collector
    }

    fn field(tag: &str, text: &str) -> Vec<MarkupEvent> {
        vec![
            MarkupEvent::start(tag),
            MarkupEvent::text(text),
            MarkupEvent::end(tag),
        ]
    }

    fn book(id: &str, fields: Vec<Vec<MarkupEvent>>) -> Vec<MarkupEvent> {
        let mut events = vec![MarkupEvent::start_with("book", [("id", id)])];
        events.extend(fields.into_iter().flatten());
        events.push(MarkupEvent::end("book"));
        events
    }

    #[test]
    fn test_single_record() {
        let collector = run(book(
            "bk101",
            vec![
                field("author", "Gambardella, Matthew"),
                field("title", "XML Developer's Guide"),
                field("genre", "Computer"),
                field("price", "44.95"),
                field("publish_date", "2000-10-01"),
                field("description", "An in-depth look"),
            ],
        ));

        assert!(collector.error().is_none());
        assert!(collector.warnings().is_empty());
        assert_eq!(collector.len(), 1);
        assert_eq!(
            collector[0],
            Record {
                id: "bk101".to_string(),
                author: "Gambardella, Matthew".to_string(),
                title: "XML Developer's Guide".to_string(),
                genre: "Computer".to_string(),
                price: 44.95,
                publication_date: "2000-10-01".to_string(),
                description: "An in-depth look".to_string(),
            }
        );
    }

    #[test]
    fn test_records_in_document_order() {
        let mut events = book("a", vec![field("title", "First")]);
        events.extend(book("b", vec![field("title", "Second")]));
        events.extend(book("c", vec![]));
        let collector = run(events);

        let ids: Vec<&str> = collector.results().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(collector.get(1).map(|r| r.title.as_str()), Some("Second"));
        assert!(collector.get(3).is_none());
    }

    #[test]
    fn test_chunks_concatenated_without_separator() {
        let collector = run(vec![
            MarkupEvent::start("book"),
            MarkupEvent::start("title"),
            MarkupEvent::text("Midnight "),
            MarkupEvent::text("&"),
            MarkupEvent::text(" Rain"),
            MarkupEvent::end("title"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0].title, "Midnight & Rain");
    }

    #[test]
    fn test_whitespace_between_elements_discarded() {
        let collector = run(vec![
            MarkupEvent::text("\n  "),
            MarkupEvent::start("book"),
            MarkupEvent::text("\n    "),
            MarkupEvent::start("genre"),
            MarkupEvent::text("Fantasy"),
            MarkupEvent::end("genre"),
            MarkupEvent::text("\n    "),
            MarkupEvent::start("title"),
            MarkupEvent::text("Maeve Ascendant"),
            MarkupEvent::end("title"),
            MarkupEvent::text("\n  "),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0].genre, "Fantasy");
        assert_eq!(collector[0].title, "Maeve Ascendant");
    }

    #[test]
    fn test_unknown_child_text_joins_field() {
        let collector = run(vec![
            MarkupEvent::start("book"),
            MarkupEvent::start("description"),
            MarkupEvent::text("An "),
            MarkupEvent::start("em"),
            MarkupEvent::text("in-depth"),
            MarkupEvent::end("em"),
            MarkupEvent::text(" look"),
            MarkupEvent::end("description"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0].description, "An in-depth look");
        assert!(collector.warnings().is_empty());
    }

    #[test]
    fn test_unknown_element_outside_field_discarded() {
        let collector = run(vec![
            MarkupEvent::start("book"),
            MarkupEvent::start("isbn"),
            MarkupEvent::text("0-123"),
            MarkupEvent::end("isbn"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0], Record::new());
    }

    #[test]
    fn test_missing_id_stays_empty() {
        let collector = run(vec![MarkupEvent::start("book"), MarkupEvent::end("book")]);
        assert_eq!(collector[0].id, "");
    }

    #[test]
    fn test_invalid_price_warns_and_falls_back() {
        let collector = run(book("x", vec![field("price", "abc")]));
        assert!(collector.error().is_none());
        assert_eq!(collector[0].price, 0.0);
        assert_eq!(
            collector.warnings(),
            &[Warning::InvalidPrice {
                record: 0,
                text: "abc".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_price_is_silent() {
        let collector = run(vec![
            MarkupEvent::start("book"),
            MarkupEvent::start("price"),
            MarkupEvent::end("price"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0].price, 0.0);
        assert!(collector.warnings().is_empty());
    }

    #[test]
    fn test_stray_ends_do_not_alter_output() {
        let mut events = vec![MarkupEvent::end("book"), MarkupEvent::end("title")];
        events.extend(book("a", vec![field("title", "T")]));
        events.push(MarkupEvent::end("author"));
        let collector = run(events);

        assert!(collector.error().is_none());
        assert_eq!(collector.len(), 1);
        assert_eq!(collector[0].title, "T");
        assert_eq!(collector.warnings().len(), 3);
        assert!(matches!(
            collector.warnings()[0],
            Warning::StrayRecordEnd { .. }
        ));
    }

    #[test]
    fn test_mismatched_field_end_is_noop() {
        let collector = run(vec![
            MarkupEvent::start("book"),
            MarkupEvent::start("title"),
            MarkupEvent::text("T"),
            MarkupEvent::end("author"),
            MarkupEvent::end("title"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0].title, "T");
        assert_eq!(collector[0].author, "");
        assert_eq!(
            collector.warnings(),
            &[Warning::StrayFieldEnd {
                tag: "author".to_string()
            }]
        );
    }

    #[test]
    fn test_field_outside_record_ignored() {
        let collector = run(vec![
            MarkupEvent::start("title"),
            MarkupEvent::text("Loose"),
            MarkupEvent::end("title"),
            MarkupEvent::start("book"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector[0].title, "");
        assert!(matches!(
            collector.warnings()[0],
            Warning::FieldOutsideRecord { .. }
        ));
    }

    #[test]
    fn test_nested_record_ignored() {
        let collector = run(vec![
            MarkupEvent::start_with("book", [("id", "outer")]),
            MarkupEvent::start_with("book", [("id", "inner")]),
            MarkupEvent::end("book"),
            MarkupEvent::end("book"),
        ]);
        assert_eq!(collector.len(), 1);
        assert_eq!(collector[0].id, "outer");
        assert_eq!(collector.warnings().len(), 2);
    }

    #[test]
    fn test_parse_error_keeps_closed_records() {
        let mut events = vec![MarkupEvent::StartDocument];
        events.extend(book("done", vec![field("title", "Closed")]));
        events.push(MarkupEvent::start_with("book", [("id", "open")]));
        events.push(MarkupEvent::error("unexpected end of input"));
        let mut collector = RecordCollector::new();
        collector.reset_and_run(EventReplay::new(events));

        assert_eq!(collector.len(), 1);
        assert_eq!(collector[0].id, "done");
        assert_eq!(
            collector.error().map(|f| f.message.as_str()),
            Some("unexpected end of input")
        );
    }

    #[test]
    fn test_events_after_error_ignored() {
        let mut collector = RecordCollector::new();
        collector.parse_error(ParseFailure::new("broken"));
        collector.start_element("book", &Attributes::new());
        collector.end_element("book");
        collector.parse_error(ParseFailure::new("second"));

        assert!(collector.is_empty());
        assert_eq!(collector.error().map(|f| f.message.as_str()), Some("broken"));
    }

    #[test]
    fn test_reset_between_passes() {
        let mut collector = RecordCollector::new();
        collector.reset_and_run(EventReplay::new([
            MarkupEvent::StartDocument,
            MarkupEvent::start("book"),
            MarkupEvent::end("book"),
            MarkupEvent::error("boom"),
        ]));
        assert_eq!(collector.len(), 1);
        assert!(collector.error().is_some());

        collector.reset_and_run(EventReplay::document([]));
        assert!(collector.is_empty());
        assert!(collector.error().is_none());
        assert!(collector.warnings().is_empty());
    }

    #[test]
    fn test_custom_record_tag_and_alias() {
        let config = CollectorConfig::new()
            .with_record_tag("item")
            .unwrap()
            .with_field_tag("pubdate", Field::PublishDate)
            .unwrap();
        let mut collector = RecordCollector::with_config(config);
        collector.reset_and_run(EventReplay::document([
            MarkupEvent::start_with("item", [("id", "i1")]),
            MarkupEvent::start("pubdate"),
            MarkupEvent::text("2001-01-01"),
            MarkupEvent::end("pubdate"),
            MarkupEvent::end("item"),
            MarkupEvent::start("book"),
            MarkupEvent::end("book"),
        ]));

        assert_eq!(collector.len(), 1);
        assert_eq!(collector[0].id, "i1");
        assert_eq!(collector[0].publication_date, "2001-01-01");
    }

    #[test]
    fn test_duration_measured() {
        let collector = run(vec![MarkupEvent::start("catalog"), MarkupEvent::end("catalog")]);
        assert!(collector.last_duration() < Duration::from_secs(5));
    }

    /// Source that keeps working after its final event.
    struct LingeringSource {
        fail: bool,
    }

    const LINGER: Duration = Duration::from_millis(200);

    impl EventSource for LingeringSource {
        fn drive<H: MarkupHandler + ?Sized>(self, handler: &mut H) {
            handler.start_document();
            if self.fail {
                handler.parse_error(ParseFailure::new("bad"));
            } else {
                handler.end_document();
            }
            std::thread::sleep(LINGER);
        }
    }

    #[test]
    fn test_clock_stops_at_end_document() {
        let mut collector = RecordCollector::new();
        collector.reset_and_run(LingeringSource { fail: false });
        assert!(collector.error().is_none());
        assert!(collector.last_duration() < LINGER);
    }

    #[test]
    fn test_clock_stops_at_parse_error() {
        let mut collector = RecordCollector::new();
        collector.reset_and_run(LingeringSource { fail: true });
        assert!(collector.error().is_some());
        assert!(collector.last_duration() < LINGER);
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::InvalidPrice {
            record: 2,
            text: "n/a".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "record 2: price 'n/a' is not a decimal number, using 0"
        );
    }
}
