//! Page selection expressions
//!
//! A selection expression is what a user types to pick pages:
//! `1-10 & even`, `!(5-7)`, `3n+1`, `2, 4, 9-12`. Page numbers are 1-based in
//! the expression and 0-based in the resolved [`IndexSequence`].
//!
//! - [`lexer`]: tokenizer shared by the parser and the composition helpers
//! - [`parse`]: recursive-descent parser producing a [`Selection`] tree
//! - [`resolve`]: parse + evaluate in one call
//! - [`compose`]: incremental text helpers used by selection UIs

pub mod compose;
mod eval;
pub mod lexer;
mod parser;

pub use compose::{
    SelectionOperator, append_expression, every_nth_expression, first_n_expression,
    insert_operator_smart, last_n_expression, range_expression,
};
pub use parser::{Parity, Selection, parse};

use crate::types::{IndexSequence, PageIndex, ParseError};
use indexmap::IndexSet;

/// Resolve `expression` against a document with `total_pages` pages.
///
/// An empty expression selects every page in order. Pages outside the
/// document are dropped silently; malformed input is an error.
pub fn resolve(expression: &str, total_pages: usize) -> Result<IndexSequence, ParseError> {
    if expression.trim().is_empty() {
        return Ok((0..total_pages).collect());
    }
    let selection = parse(expression)?;
    Ok(selection.evaluate(total_pages).into_iter().collect())
}

/// Resolution result that tolerates malformed input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPreview {
    pub pages: IndexSequence,
    /// Set when the expression did not parse and the comma-separated
    /// fallback was used instead
    pub warning: Option<String>,
}

/// Resolve for live previews.
///
/// When the expression does not parse, the input is read as a plain list of
/// numbers and ranges separated by commas, and a warning names the first
/// entry that could not be understood.
pub fn resolve_with_diagnostics(expression: &str, total_pages: usize) -> SelectionPreview {
    match resolve(expression, total_pages) {
        Ok(pages) => SelectionPreview {
            pages,
            warning: None,
        },
        Err(err) => {
            log::debug!("selection fallback: {err}");
            let entries: Vec<&str> = expression
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .collect();

            let mut pages = IndexSet::new();
            for entry in &entries {
                pages.extend(parse_csv_entry(entry, total_pages).unwrap_or_default());
            }

            let warning = match entries
                .iter()
                .find(|entry| parse_csv_entry(entry, total_pages).is_none())
            {
                Some(bad) => format!(
                    "Malformed expression at: '{bad}'. Falling back to CSV interpretation."
                ),
                None => "Malformed expression. Falling back to CSV interpretation.".to_string(),
            };

            SelectionPreview {
                pages: pages.into_iter().collect(),
                warning: Some(warning),
            }
        }
    }
}

/// A single number or `a-b` range; `None` when the entry is anything else
fn parse_csv_entry(entry: &str, total_pages: usize) -> Option<Vec<PageIndex>> {
    let selection = match entry.split_once('-') {
        Some((start, end)) => {
            let start = parse_page_number(start)?;
            let end = parse_page_number(end)?;
            let (start, end) = if start <= end {
                (start, end)
            } else {
                (end, start)
            };
            Selection::Range { start, end }
        }
        None => Selection::Page(parse_page_number(entry)?),
    };
    Some(selection.evaluate(total_pages).into_iter().collect())
}

fn parse_page_number(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(text.parse().unwrap_or(u64::MAX))
}
