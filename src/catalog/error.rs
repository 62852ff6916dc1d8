use thiserror::Error;

use crate::types::SourcePosition;

/// Defines errors that may occur while loading or writing a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Error when failing to read or write a catalog file
    #[error("Failed to access catalog file: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not well-formed XML
    #[error("Malformed XML at {position}: {source}")]
    Xml {
        /// Byte offset where the reader stopped
        offset: usize,
        position: SourcePosition,
        #[source]
        source: quick_xml::Error,
    },
    /// The XML is well-formed but does not follow the `.ts` layout
    #[error("Invalid catalog at {position}: {message}")]
    Structure { offset: usize, position: SourcePosition, message: String },
    /// The root element is not `<TS>`
    #[error("Not a Qt Linguist catalog: root element is <{0}>")]
    NotACatalog(String),
    /// Serialized output is not valid UTF-8
    #[error("Serialized catalog is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
