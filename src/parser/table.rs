//! Index table extraction
//!
//! Turns the index page into an ordered [`EntryList`]. Malformed rows never
//! abort extraction; they are dropped and reported as [`RowAnomaly`] values.

use scraper::{ElementRef, Html};
use std::fmt;

use crate::models::{Entry, EntryList};
use crate::parser::selectors::{LINK, ROW_CELL, TABLE_ROW};

/// Why a table row produced no entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyKind {
    /// Fewer than two data cells
    TooFewCells(usize),
    /// No anchor with an href in the first cell
    MissingLink,
    /// The href ends in `/`, so no file name can be derived
    EmptyDocumentName(String),
}

/// A dropped row, identified by position and label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAnomaly {
    /// Zero-based position among all table rows
    pub row: usize,
    pub name: String,
    pub kind: AnomalyKind,
}

impl fmt::Display for RowAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AnomalyKind::TooFewCells(n) => write!(f, "row {} has {n} cell(s)", self.row),
            AnomalyKind::MissingLink => {
                write!(f, "no document link for {:?} (row {})", self.name, self.row)
            }
            AnomalyKind::EmptyDocumentName(link) => write!(
                f,
                "link {link:?} for {:?} (row {}) has no file name",
                self.name, self.row
            ),
        }
    }
}

/// Result of parsing an index page
#[derive(Debug, Clone, Default)]
pub struct TableExtraction {
    pub entries: EntryList,
    pub anomalies: Vec<RowAnomaly>,
    /// Number of table rows seen
    pub rows: usize,
}

/// Extracts document entries from `<table>` rows
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl TableExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse `html` into entries, in row order
    ///
    /// A row becomes an entry when it has at least two cells and the first
    /// cell holds an anchor with an href. Cell text is trimmed; entities are
    /// decoded by the HTML parser.
    pub fn extract(&self, html: &str) -> TableExtraction {
        let document = Html::parse_document(html);

        let mut entries = Vec::new();
        let mut anomalies = Vec::new();
        let mut rows = 0;

        for (row, element) in document.select(&TABLE_ROW).enumerate() {
            rows += 1;
            match self.extract_row(element) {
                Ok(entry) => entries.push(entry),
                // Header rows use <th> only; nothing worth reporting
                Err((_, AnomalyKind::TooFewCells(0))) => {}
                Err((name, kind)) => {
                    let anomaly = RowAnomaly { row, name, kind };
                    match anomaly.kind {
                        AnomalyKind::TooFewCells(_) => tracing::debug!("Skipping row: {anomaly}"),
                        _ => tracing::warn!("Skipping row: {anomaly}"),
                    }
                    anomalies.push(anomaly);
                }
            }
        }

        TableExtraction {
            entries: EntryList::new(entries),
            anomalies,
            rows,
        }
    }

    fn extract_row(&self, row: ElementRef<'_>) -> Result<Entry, (String, AnomalyKind)> {
        let cells: Vec<ElementRef<'_>> = row.select(&ROW_CELL).collect();

        if cells.len() < 2 {
            let name = cells.first().map(|c| cell_text(*c)).unwrap_or_default();
            return Err((name, AnomalyKind::TooFewCells(cells.len())));
        }

        let name = cell_text(cells[0]);
        let description = cell_text(cells[1]);

        let link = cells[0]
            .select(&LINK)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| !href.is_empty());

        let Some(link) = link else {
            return Err((name, AnomalyKind::MissingLink));
        };

        match Entry::new(name.clone(), description, link) {
            Some(entry) => Ok(entry),
            None => Err((name, AnomalyKind::EmptyDocumentName(link.to_string()))),
        }
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
