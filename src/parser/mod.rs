//! HTML parsing and entry extraction
//!
//! This module handles parsing the index page and extracting one
//! [`Entry`](crate::models::Entry) per linked table row.

pub mod selectors;
pub mod table;

pub use table::{AnomalyKind, RowAnomaly, TableExtraction, TableExtractor};
