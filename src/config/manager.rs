//! Holds the validated settings of one workspace.

use std::path::PathBuf;

use super::{
    CatalogSettings,
    ConfigError,
    FileMatcher,
    MatcherError,
    loader,
};

/// Loads, validates and hands out settings.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Current settings
    current_settings: CatalogSettings,

    /// Workspace root path
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: CatalogSettings::default(), workspace_root: None }
    }

    /// Loads settings for a workspace.
    ///
    /// Without a root, or without a settings file, the defaults are used.
    ///
    /// # Errors
    /// - File read error
    /// - Parse error
    /// - Validation error
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!(workspace_root = ?workspace_root, "Loading settings");

        let settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(CatalogSettings::default, |ws| {
                tracing::debug!(settings = ?ws, "Loaded workspace settings");
                ws
            })
        } else {
            CatalogSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!(settings = ?self.current_settings, "Settings loaded successfully");

        Ok(())
    }

    /// Replaces the settings after validating them.
    pub fn update_settings(&mut self, new_settings: CatalogSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &CatalogSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }

    /// Builds a matcher for the current settings rooted at `workspace_root`.
    pub fn file_matcher(&self, workspace_root: PathBuf) -> Result<FileMatcher, MatcherError> {
        FileMatcher::new(workspace_root, &self.current_settings)
    }
}
