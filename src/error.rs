//! Error types for template analysis, catalog loading and applying renames.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from analysing an example filename or compiling a matcher or render template.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Could not identify a country or language code in '{0}'")]
    NoIdentifier(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("Pattern '{0}' has no named capture group 'code'")]
    MissingCapture(String),

    #[error("Render template '{template}' {reason}")]
    InvalidTemplate { template: String, reason: &'static str },
}

/// Errors from reading the catalog source.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog entry '{country}': {reason}")]
    InvalidEntry { country: String, reason: String },
}

/// What went wrong for a single file while applying a rename plan.
#[derive(Error, Debug)]
pub enum ApplyErrorKind {
    #[error("Destination file already exists")]
    DestinationExists,

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// A failed or skipped rename for one plan entry.
#[derive(Error, Debug)]
#[error("{original} -> {proposed}: {kind}")]
pub struct ApplyError {
    pub original: String,
    pub proposed: String,
    #[source]
    pub kind: ApplyErrorKind,
}

impl ApplyError {
    /// True when the file was skipped because the destination was taken.
    #[must_use]
    pub const fn is_collision(&self) -> bool {
        matches!(self.kind, ApplyErrorKind::DestinationExists)
    }
}
