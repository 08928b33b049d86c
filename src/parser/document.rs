use std::path::{Path, PathBuf};

use anyhow::anyhow;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::attribute::{self, heading_text, own_text};
use crate::error::DocumentError;
use crate::output;
use crate::schema::Schema;

pub const DEFAULT_TITLE_SELECTOR: &str = r#"div[class*="markdown-module--main--1VRvj"] > h1"#;
pub const DEFAULT_CONTENT_SELECTOR: &str = r#"div[class*="markdown-module--content--1HSJ5"] > div"#;

const ATTRIBUTE_HEADING: &str = "h4";

/// Headings containing these mark annotation and auxiliary-line settings,
/// which have no flat schema form.
const EXCLUDED_MARKERS: &[&str] = &["💠", "Annotation"];

/// Compiled selectors locating the page title and the attribute container.
#[derive(Debug, Clone)]
pub struct PageLayout {
    title: Selector,
    content: Selector,
}

impl PageLayout {
    pub fn new(title: &str, content: &str) -> anyhow::Result<Self> {
        Ok(PageLayout {
            title: parse_selector(title)?,
            content: parse_selector(content)?,
        })
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        PageLayout::new(DEFAULT_TITLE_SELECTOR, DEFAULT_CONTENT_SELECTOR)
            .expect("built-in selectors are valid")
    }
}

fn parse_selector(selector: &str) -> anyhow::Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector `{}`: {}", selector, e))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// No content container or no attribute heading in it; nothing written.
    NoContent,
    Persisted { path: PathBuf, properties: usize },
}

/// Extract the schema of one page. `Ok(None)` when the page has no content
/// container or no attribute heading. A page whose headings are all dropped
/// still yields a schema with empty properties.
pub fn extract_schema(
    html: &str,
    name: &str,
    layout: &PageLayout,
) -> Result<Option<Schema>, DocumentError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&layout.title)
        .next()
        .and_then(own_text)
        .map(str::trim)
        .ok_or(DocumentError::MissingTitle)?;

    let Some(content) = document.select(&layout.content).next() else {
        debug!(name, "no content container");
        return Ok(None);
    };

    let headings: Vec<ElementRef<'_>> = attribute_headings(content).collect();
    if headings.is_empty() {
        debug!(name, "no attribute headings");
        return Ok(None);
    }

    let mut schema = Schema::new(title, name);
    for heading in headings {
        let Some(attr_name) = heading_text(heading) else {
            continue;
        };
        if EXCLUDED_MARKERS.iter().any(|m| attr_name.contains(m)) {
            debug!(name, attribute = attr_name, "skipping annotation attribute");
            continue;
        }
        if let Some(descriptor) = attribute::extract(heading, attr_name)? {
            schema.properties.insert(descriptor);
        }
    }

    Ok(Some(schema))
}

fn attribute_headings<'a>(content: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    content
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == ATTRIBUTE_HEADING)
}

/// Identifier of a page: its file name without extension.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read, extract and persist one page.
pub fn process_document(
    path: &Path,
    layout: &PageLayout,
    output_dir: &Path,
) -> Result<DocumentOutcome, DocumentError> {
    let html = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = document_name(path);

    match extract_schema(&html, &name, layout)? {
        None => Ok(DocumentOutcome::NoContent),
        Some(schema) => {
            let written = output::persist_schema(&schema, output_dir)?;
            Ok(DocumentOutcome::Persisted {
                path: written,
                properties: schema.properties.len(),
            })
        }
    }
}

// ── Tests ──
