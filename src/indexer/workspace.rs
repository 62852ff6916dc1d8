//! Workspace-wide catalog discovery and loading.
use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use futures::StreamExt;
use ignore::WalkBuilder;
use tokio::sync::RwLock;

use crate::catalog::language::{
    detect_language_from_path,
    normalize_language_code,
    primary_subtag,
};
use crate::catalog::{
    CatalogError,
    Translator,
    TranslatorSet,
    parse_catalog,
};
use crate::config::{
    ConfigManager,
    FileMatcher,
};
use crate::indexer::types::{
    IndexedCatalog,
    IndexerError,
    LoadFailure,
};

/// Catalogs of one workspace, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceIndexer {
    /// Loaded catalogs by absolute path
    catalogs: Arc<RwLock<HashMap<PathBuf, IndexedCatalog>>>,
    /// Files that failed to load, by absolute path
    failures: Arc<RwLock<HashMap<PathBuf, Arc<IndexerError>>>>,
}

impl WorkspaceIndexer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalogs: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Finds and loads every catalog in the workspace.
    ///
    /// Files are loaded concurrently, at most `indexing.numThreads` at a
    /// time. Files that fail to load are logged, skipped and kept in
    /// [`Self::failures`].
    ///
    /// Returns the number of catalogs loaded.
    ///
    /// # Errors
    /// - The workspace path is not a directory
    /// - The configured patterns are invalid
    pub async fn index_workspace(
        &self,
        workspace_path: &Path,
        config_manager: &ConfigManager,
    ) -> Result<usize, IndexerError> {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");
        if !workspace_path.is_dir() {
            return Err(IndexerError::InvalidPath(workspace_path.to_path_buf()));
        }

        let matcher = config_manager.file_matcher(workspace_path.to_path_buf())?;
        let num_threads = config_manager.get_settings().indexing.effective_num_threads();
        let files = Self::find_translation_files(&matcher);
        tracing::debug!(files = files.len(), num_threads, "Found translation files");

        let results: Vec<_> = futures::stream::iter(files)
            .map(|file| async move {
                let result = Self::load_file(&file).await;
                (file, result)
            })
            .buffer_unordered(num_threads)
            .collect()
            .await;

        let mut loaded = 0;
        let mut catalogs = self.catalogs.write().await;
        let mut failures = self.failures.write().await;
        for (file, result) in results {
            match result {
                Ok(Some(entry)) => {
                    failures.remove(&file);
                    catalogs.insert(file, entry);
                    loaded += 1;
                }
                Ok(None) => {
                    failures.remove(&file);
                }
                Err(e) => {
                    tracing::warn!(file_path = %file.display(), "{e}");
                    catalogs.remove(&file);
                    failures.insert(file, Arc::new(e));
                }
            }
        }

        tracing::info!(catalogs = loaded, failed = failures.len(), "Workspace indexed");
        Ok(loaded)
    }

    /// Loads (or reloads) a single catalog.
    ///
    /// Returns `false` when the file is not a Qt catalog, e.g. a TypeScript
    /// source that shares the `.ts` extension.
    ///
    /// # Errors
    /// The file cannot be read or parsed
    pub async fn index_file(&self, file_path: &Path) -> Result<bool, IndexerError> {
        let loaded = Self::load_file(file_path).await?;
        self.failures.write().await.remove(file_path);
        let Some(entry) = loaded else {
            return Ok(false);
        };
        self.catalogs.write().await.insert(file_path.to_path_buf(), entry);
        Ok(true)
    }

    /// Forgets a catalog, e.g. after the file was deleted.
    pub async fn remove_file(&self, file_path: &Path) -> bool {
        self.failures.write().await.remove(file_path);
        self.catalogs.write().await.remove(file_path).is_some()
    }

    /// Reads and parses one file. Parsing runs on the blocking pool.
    async fn load_file(file_path: &Path) -> Result<Option<IndexedCatalog>, IndexerError> {
        let path = file_path.to_path_buf();
        let text = tokio::fs::read_to_string(file_path)
            .await
            .map_err(|e| IndexerError::Catalog { path: path.clone(), source: e.into() })?;

        if !text.trim_start().starts_with('<') {
            tracing::debug!(file_path = %file_path.display(), "Skipping file that is not XML");
            return Ok(None);
        }

        let text: Arc<str> = Arc::from(text);
        let parse_text = Arc::clone(&text);
        let parsed = tokio::task::spawn_blocking(move || parse_catalog(&parse_text)).await?;
        let catalog = match parsed {
            Ok(catalog) => catalog,
            // Another XML format that happens to use the extension.
            Err(CatalogError::NotACatalog(root)) => {
                tracing::debug!(file_path = %file_path.display(), root = %root, "Skipping non-catalog XML");
                return Ok(None);
            }
            Err(source) => return Err(IndexerError::Catalog { path, source }),
        };

        let language = catalog
            .language
            .clone()
            .filter(|language| !language.is_empty())
            .or_else(|| detect_language_from_path(file_path));
        tracing::debug!(
            file_path = %file_path.display(),
            language = ?language,
            messages = catalog.message_count(),
            "Loaded catalog"
        );

        Ok(Some(IndexedCatalog { path, language, catalog: Arc::new(catalog), text }))
    }

    /// Walks the workspace, honoring `.gitignore` and `excludePatterns`.
    fn find_translation_files(matcher: &FileMatcher) -> Vec<PathBuf> {
        let workspace_path = matcher.workspace_root().to_path_buf();
        let walk_matcher = matcher.clone();
        let mut found_files = Vec::new();

        for result in WalkBuilder::new(&workspace_path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                entry
                    .path()
                    .strip_prefix(walk_matcher.workspace_root())
                    .map_or(true, |relative| !walk_matcher.is_excluded_relative(relative))
            })
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if matcher.is_translation_file(entry.path()) {
                found_files.push(entry.path().to_path_buf());
            }
        }

        found_files.sort();
        found_files
    }

    #[must_use]
    pub async fn get(&self, file_path: &Path) -> Option<IndexedCatalog> {
        self.catalogs.read().await.get(file_path).cloned()
    }

    #[must_use]
    pub async fn len(&self) -> usize {
        self.catalogs.read().await.len()
    }

    #[must_use]
    pub async fn is_empty(&self) -> bool {
        self.catalogs.read().await.is_empty()
    }

    /// All catalogs, ordered by path.
    #[must_use]
    pub async fn catalogs(&self) -> Vec<IndexedCatalog> {
        let mut catalogs: Vec<_> = self.catalogs.read().await.values().cloned().collect();
        catalogs.sort_by(|a, b| a.path.cmp(&b.path));
        catalogs
    }

    /// Files that failed to load during indexing, ordered by path.
    #[must_use]
    pub async fn failures(&self) -> Vec<LoadFailure> {
        let mut failures: Vec<_> = self
            .failures
            .read()
            .await
            .iter()
            .map(|(path, error)| LoadFailure { path: path.clone(), error: Arc::clone(error) })
            .collect();
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        failures
    }

    /// Distinct catalog languages, sorted.
    #[must_use]
    pub async fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .catalogs
            .read()
            .await
            .values()
            .filter_map(|entry| entry.language.clone())
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }

    /// Picks the language to translate into.
    ///
    /// An explicit `requested` language wins; otherwise the first entry of
    /// `primary_languages` that some catalog provides, otherwise the first
    /// indexed language.
    #[must_use]
    pub async fn select_language(
        &self,
        requested: Option<&str>,
        primary_languages: Option<&[String]>,
    ) -> Option<String> {
        if let Some(requested) = requested {
            return Some(requested.to_string());
        }

        let languages = self.languages().await;
        primary_languages
            .into_iter()
            .flatten()
            .find(|primary| languages.iter().any(|language| language_matches(language, primary)))
            .cloned()
            .or_else(|| languages.into_iter().next())
    }

    /// Translators for every catalog in `language`, ordered by path.
    #[must_use]
    pub async fn translator_set(&self, language: &str) -> TranslatorSet {
        self.catalogs()
            .await
            .into_iter()
            .filter(|entry| entry.language.as_deref().is_some_and(|l| language_matches(l, language)))
            .map(|entry| {
                let translator = Translator::new(entry.catalog);
                match entry.language {
                    Some(language) if translator.language().is_none() => {
                        translator.with_language(language)
                    }
                    _ => translator,
                }
            })
            .collect()
    }
}

/// `hr_HR` matches `hr_HR` and `hr`; `hr` does not match `hr_HR` requests.
fn language_matches(catalog_language: &str, requested: &str) -> bool {
    let catalog_language = normalize_language_code(catalog_language);
    let requested = normalize_language_code(requested);
    catalog_language == requested
        || (!requested.contains('_') && primary_subtag(&catalog_language) == requested)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::{
        CatalogSettings,
        IndexingConfig,
    };

    fn catalog_xml(language: Option<&str>, translation: &str) -> String {
        let language = language.map(|l| format!(r#" language="{l}""#)).unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1"{language}>
<context>
    <name>UIActionPool</name>
    <message>
        <source>&amp;Close</source>
        <translation>{translation}</translation>
    </message>
</context>
</TS>
"#
        )
    }

    fn workspace() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("nls")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();

        fs::write(root.join("nls/VirtualBox_hr.ts"), catalog_xml(Some("hr_HR"), "Zatvori"))
            .unwrap();
        fs::write(root.join("nls/VirtualBox_de.ts"), catalog_xml(None, "Schließen")).unwrap();
        fs::write(root.join("nls/VirtualBox_fr.ts"), "<TS><context>").unwrap();
        fs::write(root.join("src/main.ts"), "export const x: number = 1;\n").unwrap();
        fs::write(root.join("src/icon.ts"), "<svg></svg>").unwrap();
        fs::write(root.join("node_modules/pkg/qt_hr.ts"), catalog_xml(Some("hr"), "X")).unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_index_workspace_loads_catalogs_and_skips_others() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();

        let loaded = indexer.index_workspace(temp_dir.path(), &ConfigManager::new()).await.unwrap();

        assert_that!(loaded, eq(2));
        let paths: Vec<PathBuf> = indexer.catalogs().await.into_iter().map(|c| c.path).collect();
        assert_that!(
            paths,
            elements_are![
                eq(&temp_dir.path().join("nls/VirtualBox_de.ts")),
                eq(&temp_dir.path().join("nls/VirtualBox_hr.ts"))
            ]
        );
    }

    #[tokio::test]
    async fn test_language_from_attribute_or_path() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();
        indexer.index_workspace(temp_dir.path(), &ConfigManager::new()).await.unwrap();

        let hr = indexer.get(&temp_dir.path().join("nls/VirtualBox_hr.ts")).await.unwrap();
        let de = indexer.get(&temp_dir.path().join("nls/VirtualBox_de.ts")).await.unwrap();

        assert_that!(hr.language.as_deref(), some(eq("hr_HR")));
        assert_that!(de.language.as_deref(), some(eq("de")));
        assert_that!(indexer.languages().await, elements_are![eq("de"), eq("hr_HR")]);
    }

    #[tokio::test]
    async fn test_index_workspace_records_failures() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();
        let broken = temp_dir.path().join("nls/VirtualBox_fr.ts");

        indexer.index_workspace(temp_dir.path(), &ConfigManager::new()).await.unwrap();

        let failures = indexer.failures().await;
        assert_that!(failures, len(eq(1)));
        assert_that!(failures[0].path, eq(&broken));
        assert_that!(failures[0].position(), some(anything()));
        assert!(matches!(*failures[0].error, IndexerError::Catalog { .. }));

        fs::write(&broken, catalog_xml(Some("fr"), "Fermer")).unwrap();
        let loaded = indexer.index_workspace(temp_dir.path(), &ConfigManager::new()).await.unwrap();

        assert_that!(loaded, eq(3));
        assert_that!(indexer.failures().await, is_empty());
    }

    #[tokio::test]
    async fn test_index_workspace_with_single_thread() {
        let temp_dir = workspace();
        let mut config_manager = ConfigManager::new();
        config_manager
            .update_settings(CatalogSettings {
                indexing: IndexingConfig { num_threads: Some(1) },
                ..CatalogSettings::default()
            })
            .unwrap();
        let indexer = WorkspaceIndexer::new();

        let loaded = indexer.index_workspace(temp_dir.path(), &config_manager).await.unwrap();

        assert_that!(loaded, eq(2));
    }

    #[tokio::test]
    async fn test_index_workspace_invalid_path() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = WorkspaceIndexer::new();

        let result =
            indexer.index_workspace(&temp_dir.path().join("missing"), &ConfigManager::new()).await;

        assert!(matches!(result, Err(IndexerError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_index_file_reports_parse_errors() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();

        let broken = indexer.index_file(&temp_dir.path().join("nls/VirtualBox_fr.ts")).await;
        let typescript = indexer.index_file(&temp_dir.path().join("src/main.ts")).await;

        assert!(matches!(broken, Err(IndexerError::Catalog { .. })));
        assert!(matches!(typescript, Ok(false)));
        assert!(indexer.is_empty().await);
    }

    #[tokio::test]
    async fn test_index_file_and_remove_file() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();
        let path = temp_dir.path().join("nls/VirtualBox_hr.ts");

        assert!(indexer.index_file(&path).await.unwrap());
        assert_eq!(indexer.len().await, 1);

        fs::write(&path, catalog_xml(Some("hr_HR"), "Zatvori prozor")).unwrap();
        assert!(indexer.index_file(&path).await.unwrap());
        let set = indexer.translator_set("hr").await;
        assert_eq!(set.translate("UIActionPool", "&Close", None), "Zatvori prozor");

        assert!(indexer.remove_file(&path).await);
        assert!(!indexer.remove_file(&path).await);
        assert!(indexer.is_empty().await);
    }

    #[tokio::test]
    async fn test_translator_set_by_language() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();
        indexer.index_workspace(temp_dir.path(), &ConfigManager::new()).await.unwrap();

        let hr = indexer.translator_set("hr").await;
        let de = indexer.translator_set("de_DE").await;

        assert_eq!(hr.translate("UIActionPool", "&Close", None), "Zatvori");
        assert_that!(hr.len(), eq(1));
        assert_that!(de.is_empty(), eq(true));
    }

    #[tokio::test]
    async fn test_select_language() {
        let temp_dir = workspace();
        let indexer = WorkspaceIndexer::new();
        indexer.index_workspace(temp_dir.path(), &ConfigManager::new()).await.unwrap();
        let primary = vec!["ja".to_string(), "hr".to_string()];

        assert_that!(indexer.select_language(Some("fr"), Some(primary.as_slice())).await, some(eq("fr")));
        assert_that!(indexer.select_language(None, Some(primary.as_slice())).await, some(eq("hr")));
        assert_that!(indexer.select_language(None, None).await, some(eq("de")));
        assert_that!(WorkspaceIndexer::new().select_language(None, None).await, none());
    }

    #[rstest]
    #[case("hr_HR", "hr", true)]
    #[case("hr_HR", "hr-hr", true)]
    #[case("hr", "hr_HR", false)]
    #[case("pt_BR", "pt_PT", false)]
    #[case("de", "hr", false)]
    fn test_language_matches(#[case] catalog: &str, #[case] requested: &str, #[case] expected: bool) {
        assert_eq!(language_matches(catalog, requested), expected);
    }
}
