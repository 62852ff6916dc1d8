//! Settings file loading.

use std::path::Path;

use super::{
    CatalogSettings,
    ConfigError,
};

/// Settings file name looked up at the workspace root.
pub const CONFIG_FILE_NAME: &str = ".ts-catalog.json";

/// Loads settings from the workspace.
///
/// Looks for `.ts-catalog.json`. Comments and trailing commas are allowed.
///
/// # Returns
/// - `Ok(Some(settings))`: the file exists and was parsed
/// - `Ok(None)`: no settings file
/// - `Err(ConfigError)`: read or parse failure
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<CatalogSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(config_path = %config_path.display(), "Configuration file not found");
        return Ok(None);
    }

    tracing::debug!(config_path = %config_path.display(), "Loading configuration");

    let content = std::fs::read_to_string(&config_path)?;
    parse_settings(&content).map(Some)
}

/// Parses the settings file content. An empty document yields the defaults.
pub(super) fn parse_settings(content: &str) -> Result<CatalogSettings, ConfigError> {
    let value = jsonc_parser::parse_to_serde_value(content, &jsonc_parser::ParseOptions::default())
        .map_err(|e| ConfigError::SyntaxError(e.to_string()))?;

    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(CatalogSettings::default()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::Severity;

    /// `load_from_workspace`: settings file present
    #[rstest]
    fn test_load_from_workspace_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{
            // Croatian first
            "primaryLanguages": ["hr", "de"],
            "diagnostics": { "unfinished": "off", },
        }"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let result = load_from_workspace(temp_dir.path());

        let settings = result.unwrap().unwrap();
        assert_that!(settings.primary_languages, some(elements_are![eq("hr"), eq("de")]));
        assert_that!(settings.diagnostics.unfinished, eq(Severity::Off));
    }

    /// `load_from_workspace`: no settings file
    #[rstest]
    fn test_load_from_workspace_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[rstest]
    #[case::missing_value("{\"excludePatterns\": }")]
    #[case::unclosed("{\"excludePatterns\": [")]
    fn test_load_from_workspace_invalid_json(#[case] content: &str) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), content).unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::SyntaxError(_))));
    }

    #[rstest]
    fn test_parse_settings_wrong_type() {
        let result = parse_settings(r#"{"indexing": {"numThreads": "four"}}"#);

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[rstest]
    fn test_parse_settings_empty_document() {
        let settings = parse_settings("// nothing configured\n").unwrap();

        assert_eq!(settings, CatalogSettings::default());
    }
}
