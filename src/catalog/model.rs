//! In-memory representation of a Qt Linguist `.ts` catalog.

/// A parsed `.ts` catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    /// `version` attribute of the `<TS>` root (e.g. "2.1").
    pub version: Option<String>,
    /// Target language (e.g. "hr_HR").
    pub language: Option<String>,
    /// Source language (e.g. "en_US").
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

/// A group of messages belonging to one UI class or dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,
    /// Context-level comment (legacy, rarely used).
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

/// Identity of a message within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    /// Disambiguation comment; empty when absent.
    pub comment: String,
}

impl MessageKey {
    #[must_use]
    pub fn new(
        context: impl Into<String>,
        source: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self { context: context.into(), source: source.into(), comment: comment.into() }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.comment.is_empty() {
            write!(f, "{}::{:?}", self.context, self.source)
        } else {
            write!(f, "{}::{:?} ({})", self.context, self.source, self.comment)
        }
    }
}

/// A single translatable string.
///
/// Equality ignores `offset`, which only describes where the message was read from.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Optional `id` attribute (id-based translations).
    pub id: Option<String>,
    /// `numerus="yes"`: the translation holds plural forms.
    pub numerus: bool,
    pub locations: Vec<Location>,
    pub source: String,
    pub old_source: Option<String>,
    /// Disambiguation comment.
    pub comment: Option<String>,
    pub old_comment: Option<String>,
    /// Comment for translators extracted from the code.
    pub extra_comment: Option<String>,
    /// Comment written by the translator.
    pub translator_comment: Option<String>,
    pub translation: Translation,
    /// Byte offset of the `<message>` start tag in the file it was parsed from.
    pub offset: Option<usize>,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.numerus == other.numerus
            && self.locations == other.locations
            && self.source == other.source
            && self.old_source == other.old_source
            && self.comment == other.comment
            && self.old_comment == other.old_comment
            && self.extra_comment == other.extra_comment
            && self.translator_comment == other.translator_comment
            && self.translation == other.translation
    }
}

impl Eq for Message {}

impl Message {
    /// Disambiguation comment, or `""` when absent.
    #[must_use]
    pub fn comment_str(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }

    /// Whether lookups should use this message's translation.
    ///
    /// Unfinished, vanished and obsolete translations are treated as absent,
    /// as are translations without any non-empty text.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.translation.state.is_finished() && !self.translation.is_empty()
    }
}

/// Source code reference of a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub filename: Option<String>,
    /// Line number as written; relative line numbers start with `+`/`-`.
    pub line: Option<String>,
}

/// The `type` attribute of a `<translation>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TranslationState {
    #[default]
    Finished,
    Unfinished,
    /// The source string no longer exists in the code.
    Vanished,
    Obsolete,
}

impl TranslationState {
    /// Parses the `type` attribute value. Unknown values are `None`.
    #[must_use]
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "vanished" => Some(Self::Vanished),
            "obsolete" => Some(Self::Obsolete),
            _ => None,
        }
    }

    /// Attribute value for serialization; `None` for finished translations.
    #[must_use]
    pub const fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Separates length variants inside one translated string, as Qt does.
///
/// The first variant is the longest and is the one shown by default.
pub const LENGTH_VARIANT_SEPARATOR: char = '\u{9c}';

/// Translated text of a message.
///
/// Strings may hold several length variants joined by
/// [`LENGTH_VARIANT_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationText {
    Single(String),
    /// Ordered `<numerusform>` children.
    Numerus(Vec<String>),
}

impl Default for TranslationText {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

/// Returns the first length variant of a translated string.
#[must_use]
pub fn primary_variant(text: &str) -> &str {
    text.split(LENGTH_VARIANT_SEPARATOR).next().unwrap_or_default()
}

/// The `<translation>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub state: TranslationState,
    pub text: TranslationText,
}

impl Translation {
    /// Finished single-string translation.
    #[must_use]
    pub fn finished(text: impl Into<String>) -> Self {
        Self { state: TranslationState::Finished, text: TranslationText::Single(text.into()) }
    }

    /// Unfinished single-string translation.
    #[must_use]
    pub fn unfinished(text: impl Into<String>) -> Self {
        Self {
            state: TranslationState::Unfinished,
            text: TranslationText::Single(text.into()),
        }
    }

    /// Finished numerus translation.
    #[must_use]
    pub fn numerus<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: TranslationState::Finished,
            text: TranslationText::Numerus(forms.into_iter().map(Into::into).collect()),
        }
    }

    /// Primary text of a single translation, or of the first plural form.
    #[must_use]
    pub fn primary(&self) -> &str {
        match &self.text {
            TranslationText::Single(text) => primary_variant(text),
            TranslationText::Numerus(forms) => forms.first().map_or("", |f| primary_variant(f)),
        }
    }

    /// Plural forms, or `None` for a single translation.
    #[must_use]
    pub fn numerus_forms(&self) -> Option<&[String]> {
        match &self.text {
            TranslationText::Numerus(forms) => Some(forms),
            TranslationText::Single(_) => None,
        }
    }

    /// True when every text or form is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.text {
            TranslationText::Single(text) => text.is_empty(),
            TranslationText::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }
}

impl Catalog {
    /// Iterates over every message with its context name.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|context| context.messages.iter().map(|m| (context.name.as_str(), m)))
    }

    /// Total number of messages across all contexts.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Finds a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("unfinished", Some(TranslationState::Unfinished))]
    #[case("vanished", Some(TranslationState::Vanished))]
    #[case("obsolete", Some(TranslationState::Obsolete))]
    #[case("finished", None)]
    #[case("", None)]
    fn test_translation_state_from_attribute(
        #[case] value: &str,
        #[case] expected: Option<TranslationState>,
    ) {
        assert_that!(TranslationState::from_attribute(value), eq(expected));
    }

    #[googletest::test]
    fn test_is_translated() {
        let mut message = Message {
            source: "Taking Snapshot".to_string(),
            translation: Translation::finished("Stvaranje snimke"),
            ..Message::default()
        };
        expect_that!(message.is_translated(), eq(true));

        message.translation = Translation::unfinished("Stvaranje snimke");
        expect_that!(message.is_translated(), eq(false));

        message.translation = Translation::finished("");
        expect_that!(message.is_translated(), eq(false));

        message.translation = Translation::numerus(["", "", ""]);
        expect_that!(message.is_translated(), eq(false));
    }

    #[googletest::test]
    fn test_primary_skips_length_variants() {
        let single = Translation::finished("Dugački naslov\u{9c}Naslov");
        expect_that!(single.primary(), eq("Dugački naslov"));

        let numerus = Translation::numerus(["%n stroj\u{9c}%n", "%n stroja", "%n strojeva"]);
        expect_that!(numerus.primary(), eq("%n stroj"));

        expect_that!(Translation::numerus(Vec::<String>::new()).primary(), eq(""));
    }

    #[googletest::test]
    fn test_message_key_display() {
        expect_that!(MessageKey::new("Ctx", "Open", "").to_string(), eq("Ctx::\"Open\""));
        expect_that!(
            MessageKey::new("Ctx", "Open", "verb").to_string(),
            eq("Ctx::\"Open\" (verb)")
        );
    }

    #[googletest::test]
    fn test_catalog_messages_iterates_all_contexts() {
        let catalog = Catalog {
            contexts: vec![
                Context {
                    name: "A".to_string(),
                    messages: vec![Message::default(), Message::default()],
                    ..Context::default()
                },
                Context {
                    name: "B".to_string(),
                    messages: vec![Message::default()],
                    ..Context::default()
                },
            ],
            ..Catalog::default()
        };

        let names: Vec<&str> = catalog.messages().map(|(ctx, _)| ctx).collect();
        expect_that!(names, elements_are![eq(&"A"), eq(&"A"), eq(&"B")]);
        expect_that!(catalog.message_count(), eq(3));
        expect_that!(catalog.context("B").map(|c| c.messages.len()), some(eq(1)));
        expect_that!(catalog.context("C"), none());
    }
}
