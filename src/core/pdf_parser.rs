//! Structural PDF extraction.
//!
//! Text comes from [`pdf_extract`]. Tables in these documents are laid out
//! with spaces, so a table row is a text line split on runs of two or more
//! spaces (or tabs). Both views are kept; interpretation happens in the
//! time extractor.

use crate::domain::model::ParsedDocument;
use crate::domain::ports::DocumentParser;
use crate::utils::error::{EtlError, Result};
use crate::utils::text::clean_text;
use regex::Regex;
use std::sync::LazyLock;

static CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+|\s{2,}").expect("valid regex"));

/// [`DocumentParser`] backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextParser;

impl DocumentParser for PdfTextParser {
    fn parse(&self, name: &str, bytes: &[u8]) -> Result<ParsedDocument> {
        let pages =
            pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| EtlError::ParseError {
                document: name.to_string(),
                message: format!("failed to extract text from PDF: {e}"),
            })?;

        tracing::debug!("Extracted {} page(s) of text from {}", pages.len(), name);

        let document = structure_text(&pages.join("\n"));
        if document.is_empty() {
            return Err(EtlError::ParseError {
                document: name.to_string(),
                message: "document contains no extractable text".to_string(),
            });
        }
        Ok(document)
    }
}

/// Splits raw text into cleaned lines and cell rows. Blank lines are
/// dropped; a row is kept only when it has at least two cells.
pub fn structure_text(text: &str) -> ParsedDocument {
    let mut document = ParsedDocument::default();

    for raw in text.lines() {
        let line = clean_text(raw);
        if line.is_empty() {
            continue;
        }

        let cells: Vec<String> = CELL_SEPARATOR
            .split(raw.trim())
            .map(clean_text)
            .filter(|cell| !cell.is_empty())
            .collect();
        if cells.len() >= 2 {
            document.rows.push(cells);
        }

        document.lines.push(line);
    }

    document
}
