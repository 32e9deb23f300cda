//! Rendering a catalog as text, YAML or JSON.

use clap::ValueEnum;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::TEXT_WRAP_WIDTH;
use crate::error::Result;
use crate::types::Record;

/// Output format for rendered catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
    Json,
}

/// Catalog representation for serialization.
#[derive(Debug, Serialize)]
struct CatalogDocument<'a> {
    records: &'a [Record],
    duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl<'a> From<&'a Catalog> for CatalogDocument<'a> {
    fn from(catalog: &'a Catalog) -> Self {
        Self {
            records: &catalog.records,
            duration_secs: catalog.duration.as_secs_f64(),
            error: catalog.error.as_ref().map(ToString::to_string),
            warnings: catalog.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Render in the requested format.
pub fn render(catalog: &Catalog, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(&catalog.records)),
        OutputFormat::Yaml => render_yaml(catalog),
        OutputFormat::Json => render_json(catalog),
    }
}

/// One `key: value` block per record, separated by blank lines.
///
/// Descriptions are wrapped at [`TEXT_WRAP_WIDTH`] columns.
///
/// # Examples
/// ```
/// use bookshelf::output::render_text;
/// use bookshelf::types::Record;
///
/// let text = render_text(&[Record::with_id("bk101")]);
/// assert!(text.starts_with("id: bk101\n"));
/// ```
#[must_use]
pub fn render_text(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&format!("id: {}\n", record.id));
        out.push_str(&format!("author: {}\n", record.author));
        out.push_str(&format!("title: {}\n", record.title));
        out.push_str(&format!("genre: {}\n", record.genre));
        out.push_str(&format!("price: {}\n", record.price));
        out.push_str(&format!("publish_date: {}\n", record.publication_date));
        let description = textwrap::fill(record.description.trim(), TEXT_WRAP_WIDTH);
        out.push_str(&format!("description: {description}\n\n"));
    }
    out
}

/// Serialize the catalog to YAML.
pub fn render_yaml(catalog: &Catalog) -> Result<String> {
    Ok(serde_yaml_ng::to_string(&CatalogDocument::from(catalog))?)
}

/// Serialize the catalog to pretty-printed JSON.
pub fn render_json(catalog: &Catalog) -> Result<String> {
    Ok(serde_json::to_string_pretty(&CatalogDocument::from(catalog))?)
}
