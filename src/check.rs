//! Catalog validation.
//!
//! Reports duplicate keys, numerus form counts that do not match the
//! catalog language, unfinished translations and placeholders dropped by a
//! translation. Each kind is reported with the severity configured in
//! [`DiagnosticsConfig`].

use std::collections::{
    BTreeSet,
    HashMap,
};

use crate::catalog::{
    Catalog,
    Message,
    MessageKey,
    PluralRule,
    TranslationState,
    TranslationText,
    primary_variant,
};
use crate::config::{
    DiagnosticsConfig,
    Severity,
};
use crate::types::SourcePosition;

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DuplicateKey,
    NumerusForms,
    Unfinished,
    MissingPlaceholder,
}

impl DiagnosticKind {
    /// Stable identifier, e.g. for machine-readable output.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DuplicateKey => "duplicate-key",
            Self::NumerusForms => "numerus-forms",
            Self::Unfinished => "unfinished",
            Self::MissingPlaceholder => "missing-placeholder",
        }
    }

    /// Configured severity for this kind.
    #[must_use]
    pub const fn severity(self, config: &DiagnosticsConfig) -> Severity {
        match self {
            Self::DuplicateKey => config.duplicate_keys,
            Self::NumerusForms => config.numerus_forms,
            Self::Unfinished => config.unfinished,
            Self::MissingPlaceholder => config.missing_placeholders,
        }
    }
}

/// A problem found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub key: MessageKey,
    pub message: String,
    /// Start of the `<message>` element, when the catalog text is known.
    pub position: Option<SourcePosition>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(position) = self.position {
            write!(f, "{position}: ")?;
        }
        write!(f, "{} [{}]: {}", self.severity, self.kind.code(), self.message)
    }
}

/// Returns true if any diagnostic has [`Severity::Error`].
#[must_use]
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// A `%1`..`%99` argument or the `%n` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Placeholder {
    /// `%1`..`%99`
    Arg(u8),
    /// `%n`
    Count,
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arg(number) => write!(f, "%{number}"),
            Self::Count => f.write_str("%n"),
        }
    }
}

/// Collects placeholders; the `L` (localized) modifier is ignored.
fn placeholders(text: &str) -> BTreeSet<Placeholder> {
    let mut found = BTreeSet::new();
    let mut rest = text;

    while let Some(index) = rest.find('%') {
        rest = rest.get(index + 1..).unwrap_or_default();
        let body = rest.strip_prefix('L').unwrap_or(rest);

        if body.starts_with('n') {
            found.insert(Placeholder::Count);
            continue;
        }

        let digits: String = body.chars().take(2).take_while(char::is_ascii_digit).collect();
        if let Ok(number) = digits.parse::<u8>()
            && number > 0
        {
            found.insert(Placeholder::Arg(number));
        }
    }

    found
}

/// Walks one catalog and collects diagnostics.
struct Checker<'a> {
    /// Severities per kind.
    config: &'a DiagnosticsConfig,
    /// Catalog text for positions.
    source_text: Option<&'a str>,
    /// Plural rule of the catalog language; `None` skips the form count check.
    plural_rule: Option<PluralRule>,
    /// Collected so far, in document order per check.
    diagnostics: Vec<Diagnostic>,
}

impl Checker<'_> {
    /// Position of the `<message>` start tag.
    fn position(&self, message: &Message) -> Option<SourcePosition> {
        Some(SourcePosition::from_offset(self.source_text?, message.offset?))
    }

    /// Records a diagnostic unless its kind is turned off.
    fn report(&mut self, kind: DiagnosticKind, context: &str, message: &Message, text: String) {
        let severity = kind.severity(self.config);
        if !severity.is_enabled() {
            return;
        }
        self.diagnostics.push(Diagnostic {
            kind,
            severity,
            key: MessageKey::new(context, message.source.as_str(), message.comment_str()),
            message: text,
            position: self.position(message),
        });
    }

    /// Reports every repeated key after its first occurrence.
    fn check_duplicates(&mut self, catalog: &Catalog) {
        let mut seen: HashMap<MessageKey, Option<SourcePosition>> = HashMap::new();

        for (context, message) in catalog.messages() {
            let key = MessageKey::new(context, message.source.as_str(), message.comment_str());
            if let Some(first) = seen.get(&key) {
                let text = first.map_or_else(
                    || format!("Duplicate message {key}"),
                    |first| format!("Duplicate message {key}, first defined at {first}"),
                );
                self.report(DiagnosticKind::DuplicateKey, context, message, text);
            } else {
                seen.insert(key, self.position(message));
            }
        }
    }

    /// Per-message checks. Vanished and obsolete messages are skipped.
    fn check_message(&mut self, context: &str, message: &Message) {
        let state = message.translation.state;
        if matches!(state, TranslationState::Vanished | TranslationState::Obsolete) {
            return;
        }

        if let (Some(rule), Some(forms)) = (self.plural_rule, message.translation.numerus_forms())
            && forms.len() != rule.form_count()
        {
            self.report(
                DiagnosticKind::NumerusForms,
                context,
                message,
                format!(
                    "Expected {} plural forms for {:?}, found {}",
                    rule.form_count(),
                    message.source,
                    forms.len()
                ),
            );
        }

        if !message.is_translated() {
            let what = if state == TranslationState::Unfinished { "Unfinished" } else { "Empty" };
            self.report(
                DiagnosticKind::Unfinished,
                context,
                message,
                format!("{what} translation for {:?}", message.source),
            );
            return;
        }

        self.check_placeholders(context, message);
    }

    /// Numbered arguments must survive in every non-empty form; `%n` must
    /// appear in at least one form, since a singular form may spell the
    /// number out.
    fn check_placeholders(&mut self, context: &str, message: &Message) {
        let expected = placeholders(&message.source);
        if expected.is_empty() {
            return;
        }

        let forms: Vec<&str> = match &message.translation.text {
            TranslationText::Single(text) => vec![primary_variant(text)],
            TranslationText::Numerus(forms) => {
                forms.iter().map(|form| primary_variant(form)).filter(|f| !f.is_empty()).collect()
            }
        };
        let found: Vec<BTreeSet<Placeholder>> = forms.iter().map(|f| placeholders(f)).collect();

        let missing: Vec<String> = expected
            .iter()
            .filter(|placeholder| match placeholder {
                Placeholder::Count => !found.iter().any(|f| f.contains(placeholder)),
                Placeholder::Arg(_) => found.iter().any(|f| !f.contains(placeholder)),
            })
            .map(ToString::to_string)
            .collect();

        if !missing.is_empty() {
            self.report(
                DiagnosticKind::MissingPlaceholder,
                context,
                message,
                format!("Translation of {:?} is missing {}", message.source, missing.join(", ")),
            );
        }
    }
}

/// Checks a catalog.
///
/// `language` overrides the catalog's `language` attribute for the plural
/// form check; with neither, the check is skipped. `source_text` is the text
/// the catalog was parsed from and is only used for positions.
#[must_use]
pub fn check_catalog(
    catalog: &Catalog,
    language: Option<&str>,
    source_text: Option<&str>,
    config: &DiagnosticsConfig,
) -> Vec<Diagnostic> {
    let language = language.or(catalog.language.as_deref()).filter(|l| !l.is_empty());
    let mut checker = Checker {
        config,
        source_text,
        plural_rule: language.map(PluralRule::for_language),
        diagnostics: Vec::new(),
    };

    checker.check_duplicates(catalog);
    for (context, message) in catalog.messages() {
        checker.check_message(context, message);
    }

    tracing::debug!(
        language = ?language,
        diagnostics = checker.diagnostics.len(),
        "Checked catalog"
    );
    checker.diagnostics
}
