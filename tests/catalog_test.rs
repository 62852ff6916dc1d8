//! End-to-end tests against a Linguist catalog fixture.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::path::{
    Path,
    PathBuf,
};

use googletest::prelude::*;
use pretty_assertions::assert_eq;
use rstest::{
    fixture,
    rstest,
};
use tempfile::TempDir;
use ts_catalog::catalog::{
    Catalog,
    CatalogError,
    PluralRule,
    Translator,
    load_catalog_file,
    parse_catalog,
    write_catalog,
};
use ts_catalog::check::{
    DiagnosticKind,
    check_catalog,
    has_errors,
};
use ts_catalog::config::{
    ConfigManager,
    DiagnosticsConfig,
};
use ts_catalog::indexer::WorkspaceIndexer;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_path() -> PathBuf {
    fixtures_dir().join("nls/VirtualBox_hr.ts")
}

#[fixture]
fn catalog() -> Catalog {
    load_catalog_file(&fixture_path()).unwrap()
}

#[fixture]
fn translator(catalog: Catalog) -> Translator {
    Translator::new(catalog)
}

#[rstest]
#[case("UIActionPool", "&Close", None, "&Zatvori")]
#[case("UIActionPool", "Take Sn&apshot...", None, "Napravi sn&imku...")]
#[case("UIActionPool", "Open", Some("verb"), "Otvori")]
#[case("UISnapshotPane", "Taking Snapshot", None, "Stvaranje snimke")]
fn lookup_known_key_returns_translation(
    translator: Translator,
    #[case] context: &str,
    #[case] source: &str,
    #[case] comment: Option<&str>,
    #[case] expected: &str,
) {
    assert_eq!(translator.translate(context, source, comment), expected);
}

#[rstest]
#[case::unknown_source("UIActionPool", "&Quit", None)]
#[case::unknown_context("UIWizardNewVM", "&Close", None)]
#[case::unfinished("UIMachineSettingsSystem", "Processor(s):", None)]
#[case::vanished("UISnapshotPane", "Restore Snapshot", None)]
#[case::comment_without_plain_entry("UIActionPool", "Open", Some("noun"))]
fn lookup_falls_back_to_source(
    translator: Translator,
    #[case] context: &str,
    #[case] source: &str,
    #[case] comment: Option<&str>,
) {
    assert_eq!(translator.translate(context, source, comment), source);
}

#[rstest]
#[case(1, "prije 1 dan")]
#[case(2, "prije 2 dana")]
#[case(5, "prije 5 dana")]
#[case(11, "prije 11 dana")]
#[case(21, "prije 21 dan")]
#[case(104, "prije 104 dana")]
fn numerus_lookup_uses_croatian_rule(translator: Translator, #[case] n: i64, #[case] expected: &str) {
    assert_eq!(translator.translate_plural("UIMediumManager", "%n day(s) ago", None, n), expected);
}

#[rstest]
fn unfinished_numerus_falls_back_to_source(translator: Translator) {
    assert_eq!(
        translator.translate_plural("UIMediumManager", "%n medium(s) inaccessible", None, 1),
        "1 medium(s) inaccessible"
    );
}

#[rstest]
fn numerus_form_count_matches_language(catalog: Catalog) {
    let rule = PluralRule::for_language(catalog.language.as_deref().unwrap());
    assert_that!(rule.form_count(), eq(3));

    for (_, message) in catalog.messages().filter(|(_, m)| m.numerus) {
        assert_eq!(message.translation.numerus_forms().map(<[String]>::len), Some(3));
    }
}

#[rstest]
fn keys_are_unique(catalog: Catalog) {
    let diagnostics = check_catalog(&catalog, None, None, &DiagnosticsConfig::default());

    assert!(diagnostics.iter().all(|d| d.kind != DiagnosticKind::DuplicateKey));
}

#[rstest]
fn check_reports_unfinished_with_positions() {
    let text = std::fs::read_to_string(fixture_path()).unwrap();
    let catalog = parse_catalog(&text).unwrap();

    let diagnostics = check_catalog(&catalog, None, Some(&text), &DiagnosticsConfig::default());

    let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "29:5: information [unfinished]: Unfinished translation for \"Processor(s):\"",
            "48:5: information [unfinished]: Unfinished translation for \"%n medium(s) inaccessible\"",
        ]
    );
    assert!(!has_errors(&diagnostics));
}

#[rstest]
fn format_is_byte_identical_for_linguist_layout(catalog: Catalog) {
    let original = std::fs::read_to_string(fixture_path()).unwrap();

    assert_eq!(write_catalog(&catalog).unwrap(), original);
}

#[rstest]
fn round_trip_preserves_entries(catalog: Catalog) {
    let reparsed = parse_catalog(&write_catalog(&catalog).unwrap()).unwrap();

    assert_eq!(reparsed, catalog);
    assert_that!(reparsed.message_count(), eq(10));
}

#[rstest]
fn crlf_catalog_reads_like_lf_catalog(catalog: Catalog) {
    let original = std::fs::read_to_string(fixture_path()).unwrap();

    let crlf = parse_catalog(&original.replace('\n', "\r\n")).unwrap();

    assert_eq!(crlf, catalog);
    assert_eq!(write_catalog(&crlf).unwrap(), original);
}

#[rstest]
fn crlf_multi_line_message_is_found_and_formatted() {
    let lf = "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<!DOCTYPE TS>
<TS version=\"2.1\" language=\"hr_HR\">
<context>
    <name>UIVMInformationDialog</name>
    <message>
        <source>Line one
Line two</source>
        <translation>Prvi redak
Drugi redak</translation>
    </message>
</context>
</TS>
";

    let catalog = parse_catalog(&lf.replace('\n', "\r\n")).unwrap();
    let translator = Translator::new(catalog.clone());

    assert_eq!(
        translator.translate("UIVMInformationDialog", "Line one\nLine two", None),
        "Prvi redak\nDrugi redak"
    );
    assert_eq!(write_catalog(&catalog).unwrap(), lf);
}

#[rstest]
fn malformed_catalog_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken_hr.ts");
    std::fs::write(
        &path,
        "<TS>\n<context>\n    <name>UIActionPool</name>\n    <message><source>A</message>\n</context>\n</TS>\n",
    )
    .unwrap();

    let error = load_catalog_file(&path).unwrap_err();

    assert!(matches!(error, CatalogError::Xml { .. }), "{error}");
    assert_that!(error.to_string(), starts_with("Malformed XML at 4:"));
}

#[tokio::test]
async fn indexer_loads_fixture_workspace() {
    let indexer = WorkspaceIndexer::new();

    let loaded = indexer.index_workspace(&fixtures_dir(), &ConfigManager::new()).await.unwrap();

    assert_eq!(loaded, 1);
    assert_eq!(indexer.languages().await, vec!["hr_HR".to_string()]);
    let translators = indexer.translator_set("hr").await;
    assert_eq!(translators.translate("UIActionPool", "&Close", None), "&Zatvori");
    assert_eq!(translators.translate("UIActionPool", "&Quit", None), "&Quit");
}
