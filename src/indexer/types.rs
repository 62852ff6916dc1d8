//! Indexer type definitions.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{
    Catalog,
    CatalogError,
};
use crate::config::MatcherError;
use crate::types::SourcePosition;

/// A catalog loaded from the workspace.
#[derive(Debug, Clone)]
pub struct IndexedCatalog {
    pub path: PathBuf,
    /// `language` attribute of the catalog, or the language detected from the path.
    pub language: Option<String>,
    pub catalog: Arc<Catalog>,
    /// Text the catalog was parsed from, for diagnostic positions.
    pub text: Arc<str>,
}

/// A translation file that was found but could not be loaded.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: Arc<IndexerError>,
}

impl LoadFailure {
    /// Where parsing stopped, for XML and structure errors.
    #[must_use]
    pub fn position(&self) -> Option<SourcePosition> {
        match &*self.error {
            IndexerError::Catalog {
                source:
                    CatalogError::Xml { position, .. } | CatalogError::Structure { position, .. },
                ..
            } => Some(*position),
            _ => None,
        }
    }

    /// The error without the file name and position.
    #[must_use]
    pub fn message(&self) -> String {
        match &*self.error {
            IndexerError::Catalog { source: CatalogError::Xml { source, .. }, .. } => {
                source.to_string()
            }
            IndexerError::Catalog { source: CatalogError::Structure { message, .. }, .. } => {
                message.clone()
            }
            IndexerError::Catalog { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum IndexerError {
    /// The workspace root is missing or not a directory
    #[error("Not a directory: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error(transparent)]
    Matcher(#[from] MatcherError),
    /// A catalog file could not be read or parsed
    #[error("Failed to load {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
    /// A parse task panicked or was cancelled
    #[error("Indexing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
