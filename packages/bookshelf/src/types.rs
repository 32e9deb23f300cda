//! Core data types: the catalog record and the fields it is built from.

use serde::Serialize;
use thiserror::Error;

use crate::config::PRICE_FALLBACK;

/// A record field that can be filled from the text of a child element.
///
/// The `id` of a record comes from an attribute and is not a `Field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Author,
    Title,
    Genre,
    Price,
    PublishDate,
    Description,
}

impl Field {
    /// Every field, in the order they are usually listed.
    pub const ALL: [Field; 6] = [
        Field::Author,
        Field::Title,
        Field::Genre,
        Field::Price,
        Field::PublishDate,
        Field::Description,
    ];

    /// The element name this field is read from by default.
    #[must_use]
    pub fn default_tag(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Title => "title",
            Self::Genre => "genre",
            Self::Price => "price",
            Self::PublishDate => "publish_date",
            Self::Description => "description",
        }
    }

    /// Look up a field by its default element name.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::types::Field;
    ///
    /// assert_eq!(Field::from_tag("price"), Some(Field::Price));
    /// assert_eq!(Field::from_tag("isbn"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.default_tag() == tag)
    }
}

/// Price text that could not be read as a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("price '{text}' is not a decimal number")]
pub struct InvalidPrice {
    /// The rejected text, as accumulated.
    pub text: String,
}

/// One catalog item.
///
/// Text fields hold the character data of their element verbatim: no
/// trimming, no newline normalization. `publication_date` stays raw text;
/// see [`Record::published_on`] for a calendar view of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub author: String,
    pub title: String,
    pub genre: String,
    pub price: f64,
    pub publication_date: String,
    pub description: String,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with the given identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Store accumulated element text into `field`.
    ///
    /// Price text is coerced with [`parse_price`]. When that fails the price
    /// is set to the fallback value and the rejected text is returned as an
    /// error; the record is still updated. Empty price text takes the
    /// fallback without an error.
    pub fn assign(&mut self, field: Field, text: String) -> Result<(), InvalidPrice> {
        match field {
            Field::Author => self.author = text,
            Field::Title => self.title = text,
            Field::Genre => self.genre = text,
            Field::PublishDate => self.publication_date = text,
            Field::Description => self.description = text,
            Field::Price => {
                if text.trim().is_empty() {
                    self.price = PRICE_FALLBACK;
                    return Ok(());
                }
                match parse_price(&text) {
                    Some(price) => self.price = price,
                    None => {
                        self.price = PRICE_FALLBACK;
                        return Err(InvalidPrice { text });
                    }
                }
            }
        }
        Ok(())
    }

    /// The publication date as a calendar date, if it is in `YYYY-MM-DD` form.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::types::Record;
    ///
    /// let mut record = Record::new();
    /// record.publication_date = "2000-10-01".to_string();
    /// assert!(record.published_on().is_some());
    ///
    /// record.publication_date = "October 2000".to_string();
    /// assert!(record.published_on().is_none());
    /// ```
    #[must_use]
    pub fn published_on(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(self.publication_date.trim(), "%Y-%m-%d").ok()
    }
}

/// Parse price text as a finite decimal number.
///
/// Surrounding whitespace is ignored. Returns `None` for empty, non-numeric
/// or non-finite text (`inf` and `NaN` are rejected).
///
/// # Examples
/// ```
/// use bookshelf::types::parse_price;
///
/// assert_eq!(parse_price(" 44.95\n"), Some(44.95));
/// assert_eq!(parse_price("abc"), None);
/// assert_eq!(parse_price("inf"), None);
/// ```
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}
