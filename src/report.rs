//! Search report rendering
//!
//! The text report prints one block per matching document and nothing for
//! the rest; failures only show up in the logs. The JSON report carries
//! every outcome with its status.

use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{SearchOutcome, SearchStatus, SearchSummary};

/// Default block template for a matching document
const MATCH_TEMPLATE: &str = include_str!("../templates/match.hbs");

const TEMPLATE_NAME: &str = "match";

/// Separator between the matching lines of one document
pub const LINE_SEPARATOR: &str = " | ";

#[derive(Debug, Serialize)]
struct MatchView<'a> {
    name: &'a str,
    description: &'a str,
    document: &'a str,
    lines: String,
    term: &'a str,
}

/// Human-readable report, one block per matching document
pub struct TextReport<'r> {
    handlebars: Handlebars<'r>,
}

impl<'r> TextReport<'r> {
    /// Report using the built-in template
    pub fn new() -> Result<Self> {
        let mut handlebars = Self::engine();
        handlebars
            .register_template_string(TEMPLATE_NAME, MATCH_TEMPLATE)
            .map_err(|e| Error::with_source("Failed to register match template", e))?;
        Ok(Self { handlebars })
    }

    /// Report using a custom template file
    ///
    /// The template sees `name`, `description`, `document`, `lines` and `term`.
    pub fn with_template(template_path: &Path) -> Result<Self> {
        let mut handlebars = Self::engine();
        handlebars
            .register_template_file(TEMPLATE_NAME, template_path)
            .map_err(|e| {
                Error::with_source(
                    format!("Failed to register template {}", template_path.display()),
                    e,
                )
            })?;
        Ok(Self { handlebars })
    }

    fn engine() -> Handlebars<'r> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Plain text output, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
    }

    /// Render one outcome; `None` unless it is a match
    pub fn render_outcome(&self, outcome: &SearchOutcome<'_>, term: &str) -> Result<Option<String>> {
        let SearchStatus::Matched { lines } = &outcome.status else {
            return Ok(None);
        };

        let view = MatchView {
            name: &outcome.entry.name,
            description: &outcome.entry.description,
            document: &outcome.entry.document_name,
            lines: lines.join(LINE_SEPARATOR),
            term,
        };

        Ok(Some(self.handlebars.render(TEMPLATE_NAME, &view)?))
    }

    /// Render all matching outcomes, in the order given
    ///
    /// Returns an empty string when nothing matched.
    pub fn render(&self, outcomes: &[SearchOutcome<'_>], term: &str) -> Result<String> {
        let mut blocks = Vec::new();
        for outcome in outcomes {
            if let Some(block) = self.render_outcome(outcome, term)? {
                blocks.push(block);
            }
        }
        Ok(blocks.join("\n"))
    }
}

/// Machine-readable report with every outcome
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub term: &'a str,
    pub generated_at: DateTime<Utc>,
    pub summary: SearchSummary,
    pub outcomes: &'a [SearchOutcome<'a>],
}

impl<'a> JsonReport<'a> {
    pub fn new(term: &'a str, outcomes: &'a [SearchOutcome<'a>]) -> Self {
        Self {
            term,
            generated_at: Utc::now(),
            summary: SearchSummary::from_outcomes(outcomes),
            outcomes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
