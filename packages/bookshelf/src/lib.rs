//! Bookshelf - Collect catalog records from a stream of XML events.
//!
//! A markup tokenizer delivers events (document start/end, element
//! start/end, character data, parse error) one at a time; the
//! [`RecordCollector`] turns them into a list of [`Record`]s, one per
//! `<book>` element, filled from the record's child elements.
//!
//! # Example
//!
//! ```
//! use bookshelf::{RecordCollector, StreamSource};
//!
//! let xml = r#"<catalog><book id="bk101"><price>44.95</price></book></catalog>"#;
//!
//! let mut collector = RecordCollector::new();
//! collector.reset_and_run(StreamSource::from_text(xml));
//!
//! assert_eq!(collector.results()[0].id, "bk101");
//! assert_eq!(collector.results()[0].price, 44.95);
//! assert!(collector.error().is_none());
//! ```
//!
//! # Architecture
//!
//! - [`types`]: The record and its fields
//! - [`event`]: Markup events, attributes, parse failures
//! - [`source`]: Handler and source traits, tokenizer adapters
//! - [`collector`]: The event-to-record state machine
//! - [`config`]: Record/field tag configuration and constants
//! - [`catalog`]: Parse a file or string in one call
//! - [`output`]: Text, YAML and JSON rendering
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod catalog;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod event;
pub mod output;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use catalog::{parse_file, parse_str, Backend, Catalog};
pub use collector::{RecordCollector, Warning};
pub use config::CollectorConfig;
pub use error::{CatalogError, Result};
pub use event::{Attributes, MarkupEvent, ParseFailure};
pub use source::{EventReplay, EventSource, MarkupHandler, StreamSource, TreeSource};
pub use types::{Field, Record};
