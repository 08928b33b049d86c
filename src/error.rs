use std::path::PathBuf;

use thiserror::Error;

/// Why a single documentation page was abandoned. None of these stop the run.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("page has no top-level heading")]
    MissingTitle,

    #[error("attribute `{attribute}` has a metadata block without a type marker")]
    MissingTypeMarker { attribute: String },

    #[error("another page named `{name}` was already written from {}", first.display())]
    DuplicateName { name: String, first: PathBuf },

    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::Read { .. } => "read",
            DocumentError::MissingTitle => "missing-title",
            DocumentError::MissingTypeMarker { .. } => "missing-type-marker",
            DocumentError::DuplicateName { .. } => "duplicate-name",
            DocumentError::Serialize(_) => "serialize",
            DocumentError::Write { .. } => "write",
        }
    }
}
