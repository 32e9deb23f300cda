//! Catalog service that ties sources and the collector together.

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;

use crate::collector::{RecordCollector, Warning};
use crate::config::CollectorConfig;
use crate::error::Result;
use crate::event::ParseFailure;
use crate::source::{EventSource, StreamSource, TreeSource};
use crate::types::Record;

/// Which tokenizer produces the event stream.
///
/// The two agree on well-formed documents without a DTD. Entities declared
/// in an internal DTD subset are expanded by `Tree` but rejected by `Stream`,
/// which only knows the predefined and numeric character references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Incremental pull parser; keeps records closed before a syntax error.
    #[default]
    Stream,
    /// Whole-document tree; a syntax error yields no records.
    Tree,
}

/// Outcome of one parse pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Records in document order.
    pub records: Vec<Record>,
    /// Recovered anomalies, in the order they were seen.
    pub warnings: Vec<Warning>,
    /// Wall-clock time of the pass.
    pub duration: Duration,
    /// Parse error that ended the pass early, if any.
    pub error: Option<ParseFailure>,
}

impl Catalog {
    /// Check if the pass reached the end of the document.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

impl From<RecordCollector> for Catalog {
    fn from(collector: RecordCollector) -> Self {
        let (records, warnings, duration, error) = collector.into_parts();
        Self {
            records,
            warnings,
            duration,
            error,
        }
    }
}

/// Run one pass of `source` through a fresh collector.
pub fn collect<S: EventSource>(source: S, config: &CollectorConfig) -> Catalog {
    let mut collector = RecordCollector::with_config(config.clone());
    collector.reset_and_run(source);
    Catalog::from(collector)
}

/// Parse catalog records from in-memory XML.
///
/// Malformed markup is not an error here: it is reported on the returned
/// catalog's `error` field, next to whatever records were closed before it.
///
/// # Examples
/// ```
/// use bookshelf::catalog::{parse_str, Backend};
/// use bookshelf::config::CollectorConfig;
///
/// let xml = r#"<catalog><book id="bk101"><title>XML Developer's Guide</title></book></catalog>"#;
/// let catalog = parse_str(xml, &CollectorConfig::default(), Backend::Stream);
///
/// assert!(catalog.is_complete());
/// assert_eq!(catalog.records[0].id, "bk101");
/// ```
pub fn parse_str(xml: &str, config: &CollectorConfig, backend: Backend) -> Catalog {
    match backend {
        Backend::Stream => collect(StreamSource::from_text(xml), config),
        Backend::Tree => collect(TreeSource::new(xml), config),
    }
}

/// Parse catalog records from a file.
///
/// # Errors
/// Returns `CatalogError::Io` if the file cannot be opened (or, for the
/// tree backend, read as UTF-8). Markup errors are reported on the catalog.
pub fn parse_file(path: &Path, config: &CollectorConfig, backend: Backend) -> Result<Catalog> {
    tracing::debug!(path = %path.display(), ?backend, "Parsing catalog file");
    let catalog = match backend {
        Backend::Stream => collect(StreamSource::open(path)?, config),
        Backend::Tree => collect(TreeSource::new(fs::read_to_string(path)?), config),
    };
    Ok(catalog)
}
