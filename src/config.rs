//! Workspace settings (`.ts-catalog.json`).
/// Settings file loader
mod loader;
/// Settings manager
mod manager;
/// Translation file pattern matcher
mod matcher;
/// Settings types and validation
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use types::{
    CatalogSettings,
    ConfigError,
    DiagnosticsConfig,
    IndexingConfig,
    Severity,
    TranslationFilesConfig,
    ValidationError,
};
