//! Language code handling for catalogs.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// ISO 639 primary language subtags Qt ships or accepts translations for.
static LANGUAGE_SUBTAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "af", "am", "ar", "as", "ast", "az", "be", "bg", "bn", "bo", "br", "bs", "ca", "cs", "cy",
        "da", "de", "dz", "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fil", "fj", "fo", "fr",
        "fy", "ga", "gd", "gl", "gn", "gu", "he", "hi", "hr", "hu", "hy", "id", "is", "it", "ja",
        "jv", "ka", "kk", "km", "kn", "ko", "kok", "ky", "lb", "ln", "lo", "lt", "lv", "mi", "mk",
        "ml", "mn", "mo", "mr", "ms", "mt", "my", "na", "nb", "ne", "nl", "nn", "no", "oc", "om",
        "or", "pa", "pl", "ps", "pt", "qu", "ro", "ru", "rw", "sa", "sd", "se", "sh", "si", "sk",
        "sl", "sq", "sr", "su", "sv", "sw", "syr", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn",
        "tr", "ts", "tt", "ug", "uk", "ur", "uz", "vi", "wa", "xh", "yo", "za", "zh", "zu",
    ]
    .into_iter()
    .collect()
});

/// Normalize language code (lowercase and replace - with _)
#[must_use]
pub fn normalize_language_code(code: &str) -> String {
    code.trim().to_lowercase().replace('-', "_")
}

/// Returns the primary language subtag of a normalized code (`hr_hr` -> `hr`).
#[must_use]
pub fn primary_subtag(normalized: &str) -> &str {
    normalized.split('_').next().unwrap_or_default()
}

/// Returns true if `code` starts with a known primary language subtag and
/// its remaining subtags look like script or region subtags.
#[must_use]
pub fn is_language_code(code: &str) -> bool {
    let normalized = normalize_language_code(code);
    let mut parts = normalized.split('_');
    let Some(primary) = parts.next() else {
        return false;
    };
    if !LANGUAGE_SUBTAGS.contains(primary) {
        return false;
    }

    parts.all(|part| {
        let is_region = (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
            || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()));
        let is_script = part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic());
        is_region || is_script
    })
}

/// Detect language from a catalog file path heuristically.
///
/// Qt projects name catalogs `<app>_<lang>.ts` (`VirtualBox_hr.ts`,
/// `qt_pt_BR.ts`) or keep one directory per language. The file stem is
/// split on `_` and `-`, and the longest trailing run of parts that forms a
/// language code wins. Parent directories are tried next, innermost first.
///
/// # Examples
/// - `nls/VirtualBox_hr.ts` → `hr`
/// - `translations/qt_pt_BR.ts` → `pt_BR`
/// - `i18n/de/app.ts` → `de`
#[must_use]
pub fn detect_language_from_path(file_path: &Path) -> Option<String> {
    if let Some(stem) = file_path.file_stem().map(|s| s.to_string_lossy())
        && let Some(language) = detect_language_suffix(&stem)
    {
        return Some(language);
    }

    file_path
        .parent()?
        .components()
        .rev()
        .map(|component| component.as_os_str().to_string_lossy())
        .find(|name| is_language_code(name))
        .map(|name| name.to_string())
}

/// Finds a language code at the end of a `_`/`-` separated name.
fn detect_language_suffix(stem: &str) -> Option<String> {
    let separators: Vec<usize> = stem
        .char_indices()
        .filter(|(_, c)| matches!(c, '_' | '-'))
        .map(|(index, _)| index)
        .collect();

    // Candidate start offsets from the widest tail to the narrowest, whole
    // stem first.
    let starts = std::iter::once(0).chain(separators.iter().map(|index| index + 1));
    starts
        .filter_map(|start| stem.get(start..))
        .filter(|tail| !tail.is_empty())
        .find(|tail| is_language_code(tail))
        .map(str::to_string)
}
