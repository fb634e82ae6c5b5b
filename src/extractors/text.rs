// src/extractors/text.rs

// --- Imports ---
use scraper::{Html, Selector};
use std::collections::HashMap;

// --- Page layout anchors ---
// Containers of the three tables the pipeline reads. html5ever inserts the
// `tbody` that the served markup omits, so body rows are addressed through it.
const SHARE_SUMMARY_TABLE: &str = "#tab_con1 > div.first > table";
const ANALYSIS_TABLE: &str = "div.section.cop_analysis > div.sub_section > table";

// --- Data Structures ---

/// Tables of the item page that are addressed by (row, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRegion {
    /// Stock summary in the first tab panel (listed shares live here).
    ShareSummary,
    /// Header of the corporate-analysis table (fiscal-year labels).
    AnalysisHeader,
    /// Body of the corporate-analysis table (one metric per row).
    AnalysisBody,
}

/// Positional selector. Rows and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Element(&'static str),
    Cell {
        region: TableRegion,
        row: usize,
        column: usize,
    },
}

impl Position {
    pub fn cell(region: TableRegion, row: usize, column: usize) -> Self {
        Position::Cell { region, row, column }
    }

    /// Composes the CSS path addressing this position on the item page.
    pub fn css(&self) -> String {
        match *self {
            Position::Element(id) => format!("#{}", id),
            Position::Cell { region: TableRegion::ShareSummary, row, column } => format!(
                "{} > tbody > tr:nth-of-type({}) > td:nth-of-type({}) > em",
                SHARE_SUMMARY_TABLE, row, column
            ),
            Position::Cell { region: TableRegion::AnalysisHeader, row, column } => format!(
                "{} > thead > tr:nth-of-type({}) > th:nth-of-type({})",
                ANALYSIS_TABLE, row, column
            ),
            Position::Cell { region: TableRegion::AnalysisBody, row, column } => format!(
                "{} > tbody > tr:nth-of-type({}) > td:nth-of-type({})",
                ANALYSIS_TABLE, row, column
            ),
        }
    }
}

/// A parsed page that can be queried by position.
pub trait Document {
    /// Raw text of the node at `position`, or `None` when nothing matches.
    fn node_text(&self, position: &Position) -> Option<String>;
}

/// HTML-backed document. Malformed markup is tolerated by the parser.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(body: &str) -> Self {
        Self { html: Html::parse_document(body) }
    }
}

impl Document for HtmlDocument {
    fn node_text(&self, position: &Position) -> Option<String> {
        let css = position.css();
        let selector = match Selector::parse(&css) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("Could not compile selector '{}': {:?}", css, e);
                return None;
            }
        };

        let element = self.html.select(&selector).next()?;
        Some(element.text().collect::<String>())
    }
}

/// In-memory document keyed by position, for feeding the pipeline without HTML.
#[derive(Debug, Clone, Default)]
pub struct GridDocument {
    cells: HashMap<Position, String>,
}

impl GridDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, position: Position, text: impl Into<String>) -> Self {
        self.cells.insert(position, text.into());
        self
    }

    /// Fills columns 1.. of `row` with `texts`; `None` leaves the cell missing.
    pub fn with_row(mut self, region: TableRegion, row: usize, texts: &[Option<&str>]) -> Self {
        for (idx, text) in texts.iter().enumerate() {
            if let Some(text) = text {
                self.cells
                    .insert(Position::cell(region, row, idx + 1), (*text).to_string());
            }
        }
        self
    }
}

impl Document for GridDocument {
    fn node_text(&self, position: &Position) -> Option<String> {
        self.cells.get(position).cloned()
    }
}

/// Reads the text at `position` with whitespace and control characters removed.
/// A missing node or an empty result both come back as `None`.
pub fn extract_text<D: Document + ?Sized>(document: &D, position: &Position) -> Option<String> {
    let Some(raw) = document.node_text(position) else {
        tracing::trace!("No node at {:?}", position);
        return None;
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned)
}
