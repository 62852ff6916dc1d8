//! Discovery and concurrent loading of catalogs in a workspace.

mod types;
mod workspace;

pub use types::{
    IndexedCatalog,
    IndexerError,
    LoadFailure,
};
pub use workspace::WorkspaceIndexer;
