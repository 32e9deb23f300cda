//! Configuration constants and the collector's tag mapping.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CatalogError, Result};
use crate::types::Field;

/// Element name that delimits one record by default.
pub const DEFAULT_RECORD_TAG: &str = "book";

/// Attribute on the record element that carries the record identifier.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Price used when the price text is empty or not a number.
pub const PRICE_FALLBACK: f64 = 0.0;

/// Text wrap width for descriptions in plain-text output.
pub const TEXT_WRAP_WIDTH: usize = 80;

/// XML local name: no namespace prefix, no leading digit or punctuation.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex"));

/// Validate a tag or attribute name.
///
/// # Examples
/// ```
/// use bookshelf::config::validate_tag_name;
///
/// assert!(validate_tag_name("book").is_ok());
/// assert!(validate_tag_name("publish_date").is_ok());
/// assert!(validate_tag_name("x:book").is_err());
/// assert!(validate_tag_name("").is_err());
/// ```
pub fn validate_tag_name(tag: &str) -> Result<()> {
    if TAG_NAME_PATTERN.is_match(tag) {
        Ok(())
    } else {
        Err(CatalogError::InvalidTag(tag.to_string()))
    }
}

/// Which elements the collector treats as records and fields.
///
/// Tags are compared against element local names, so `<c:book>` matches a
/// record tag of `book`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    record_tag: String,
    id_attribute: String,
    fields: HashMap<String, Field>,
}

impl CollectorConfig {
    /// Default configuration: `<book id="...">` records with the six
    /// standard field elements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            record_tag: DEFAULT_RECORD_TAG.to_string(),
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            fields: Field::ALL
                .into_iter()
                .map(|field| (field.default_tag().to_string(), field))
                .collect(),
        }
    }

    /// Use a different record tag.
    ///
    /// # Errors
    /// `InvalidTag` for a malformed name, `ConflictingTag` if the tag is
    /// already mapped to a field.
    pub fn with_record_tag(mut self, tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        validate_tag_name(&tag)?;
        if self.fields.contains_key(&tag) {
            return Err(CatalogError::ConflictingTag(tag));
        }
        self.record_tag = tag;
        Ok(self)
    }

    /// Read the record identifier from a different attribute.
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_tag_name(&name)?;
        self.id_attribute = name;
        Ok(self)
    }

    /// Map an additional element name onto a field.
    ///
    /// Existing mappings are kept, so several tags may fill the same field.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::config::CollectorConfig;
    /// use bookshelf::types::Field;
    ///
    /// let config = CollectorConfig::new()
    ///     .with_field_tag("pubdate", Field::PublishDate)
    ///     .unwrap();
    /// assert_eq!(config.field_for("pubdate"), Some(Field::PublishDate));
    /// assert_eq!(config.field_for("publish_date"), Some(Field::PublishDate));
    /// ```
    pub fn with_field_tag(mut self, tag: impl Into<String>, field: Field) -> Result<Self> {
        let tag = tag.into();
        validate_tag_name(&tag)?;
        if tag == self.record_tag {
            return Err(CatalogError::ConflictingTag(tag));
        }
        self.fields.insert(tag, field);
        Ok(self)
    }

    #[must_use]
    pub fn record_tag(&self) -> &str {
        &self.record_tag
    }

    #[must_use]
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Check if a tag delimits a record.
    #[must_use]
    pub fn is_record_tag(&self, tag: &str) -> bool {
        self.record_tag == tag
    }

    /// The field a tag fills, if it is a configured field tag.
    #[must_use]
    pub fn field_for(&self, tag: &str) -> Option<Field> {
        self.fields.get(tag).copied()
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new()
    }
}
