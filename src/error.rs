//! Typed errors for the scan pipeline.
//!
//! Library code returns these; `main` wraps them in `anyhow` at the edge.

use thiserror::Error;

/// Failure of a content source (tree listing or file fetch).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A manifest whose content could not be read as its format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ManifestErrorKind {
    #[error("fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

/// One manifest file that contributed nothing because of an error.
#[derive(Debug, Error)]
#[error("{path}: {kind}")]
pub struct ManifestError {
    pub path: String,
    #[source]
    pub kind: ManifestErrorKind,
}

impl ManifestError {
    pub fn new(path: impl Into<String>, kind: impl Into<ManifestErrorKind>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
        }
    }
}

/// A scan that produced no report at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to list repository tree for {repository}: {source}")]
    TreeListing {
        repository: String,
        #[source]
        source: SourceError,
    },
}
