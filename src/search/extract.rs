//! Text extraction from stored documents
//!
//! Extractors are synchronous and CPU-bound; the search engine runs them on
//! the blocking pool.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;

use crate::utils::error::ExtractError;

/// How far into a file the `%PDF-` header may appear
const PDF_HEADER_WINDOW: usize = 1024;

/// Turns a stored document into plain text
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// PDF text extraction via `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if !looks_like_pdf(bytes) {
            return Err(ExtractError::Unsupported("missing %PDF header".to_string()));
        }
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|payload| ExtractError::Aborted(panic_message(payload.as_ref())))?
            .map_err(|e| ExtractError::Unsupported(e.to_string()))
    }
}

/// Documents that are already UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| ExtractError::Unsupported(format!("not UTF-8 text: {e}")))
    }
}

/// Picks PDF or plain-text extraction from the file contents
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoExtractor {
    pdf: PdfTextExtractor,
    text: PlainTextExtractor,
}

impl TextExtractor for AutoExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if looks_like_pdf(bytes) {
            self.pdf.extract_text(bytes)
        } else {
            self.text.extract_text(bytes)
        }
    }
}

/// Which extractor the search stage uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// PDF only; anything else is an extraction failure
    #[default]
    Pdf,
    /// PDF when the `%PDF-` header is present, UTF-8 text otherwise
    Auto,
}

impl ExtractorKind {
    pub fn build(self) -> Arc<dyn TextExtractor> {
        match self {
            Self::Pdf => Arc::new(PdfTextExtractor),
            Self::Auto => Arc::new(AutoExtractor::default()),
        }
    }
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown extractor {other:?} (pdf, auto)")),
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(PDF_HEADER_WINDOW)]
        .windows(5)
        .any(|w| w == b"%PDF-")
}
