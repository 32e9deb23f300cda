//! The markup event vocabulary shared by every event source.

use std::fmt;


/// Attributes of a start tag, in document order.
///
/// Values are opaque text: whatever unescaping the tokenizer performed is
/// kept, nothing more is done here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Value of the first attribute with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A tokenizer-reported syntax error, captured instead of propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Human-readable reason.
    pub message: String,
    /// Byte offset into the input, when the tokenizer reports one.
    pub offset: Option<u64>,
}

impl ParseFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    /// Attach the byte offset where the failure was detected.
    #[must_use]
    pub fn at(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} (at byte {})", self.message, offset),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// One structural notification about a markup document.
///
/// Element names are local names, without namespace prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent {
    StartDocument,
    EndDocument,
    StartElement { name: String, attributes: Attributes },
    EndElement { name: String },
    /// Character data; one element's text may arrive in several chunks.
    Characters(String),
    /// Terminal: no structural events follow.
    Error(ParseFailure),
}

impl MarkupEvent {
    /// Start tag without attributes.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self::StartElement {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Start tag with attributes.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::event::MarkupEvent;
    ///
    /// let event = MarkupEvent::start_with("book", [("id", "bk101")]);
    /// if let MarkupEvent::StartElement { attributes, .. } = event {
    ///     assert_eq!(attributes.get("id"), Some("bk101"));
    /// }
    /// ```
    #[must_use]
    pub fn start_with<K, V>(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::StartElement {
            name: name.into(),
            attributes: attributes.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn end(name: impl Into<String>) -> Self {
        Self::EndElement { name: name.into() }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Characters(text.into())
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ParseFailure::new(message))
    }
}
