//! Error types for the catalog store, persistence and metadata search.

use thiserror::Error;

use crate::models::Category;

/// Why a catalog mutation was rejected. State is never changed when one of
/// these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("duplicate item \"{title}\" by {author} already in {category}")]
    Duplicate {
        title: String,
        author: String,
        category: Category,
    },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("no item with id {id} in {category}")]
    NotFound { id: u64, category: Category },
    #[error("no item with id {0}")]
    UnknownId(u64),
    #[error("cannot move {category} entry {from} -> {to} (len {len})")]
    IndexOutOfRange {
        category: Category,
        from: usize,
        to: usize,
        len: usize,
    },
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Failures reading or writing the on-disk library and settings.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata lookup failures. None of these touch catalog state.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
    #[error("an OMDb API key is required for movie search")]
    MissingApiKey,
    #[error("search timed out")]
    Timeout,
}

impl SearchError {
    /// Whether showing a "try again" affordance makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Network(_) | SearchError::Timeout => true,
            SearchError::HttpStatus(status) => {
                status.is_server_error() || status.as_u16() == 429
            }
            _ => false,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
