use std::fmt;
use thiserror::Error;

/// Zero-based position of a page in the source document
pub type PageIndex = usize;

/// Ordered list of page indices; duplicates are allowed
pub type IndexSequence = Vec<PageIndex>;

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Unknown transform mode: {0}")]
    UnknownTransformMode(String),
    #[error("Source document could not be read: {0}")]
    SourceCorrupt(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PageError>;

/// A selection expression that could not be parsed.
///
/// `fragment` is the offending part of the input, starting at byte `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub fragment: String,
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let fragment = source
            .get(offset..)
            .map(|rest| rest.split_whitespace().next().unwrap_or(""))
            .unwrap_or("")
            .to_string();
        Self {
            fragment,
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragment.is_empty() {
            write!(f, "Invalid page selection: {} at end of input", self.message)
        } else {
            write!(
                f,
                "Invalid page selection: {} at '{}' (offset {})",
                self.message, self.fragment, self.offset
            )
        }
    }
}

impl std::error::Error for ParseError {}

/// Summary of a reorganization before any document is written
#[derive(Debug, Clone, PartialEq)]
pub struct ReorganizeStatistics {
    /// Pages in the source document
    pub source_pages: usize,
    /// Pages written across all output documents
    pub output_pages: usize,
    /// Number of output documents
    pub output_documents: usize,
    /// Indices in the sequence that fall outside the source
    pub skipped_indices: usize,
    /// Output pages that repeat an earlier page
    pub duplicated_pages: usize,
}
