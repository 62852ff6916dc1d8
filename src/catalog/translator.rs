//! Message lookup over loaded catalogs.
//!
//! A lookup key is `(context, source, comment)`. Lookups never fail: when a
//! message is missing, empty, or not finished, the source string is returned.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::{
    Catalog,
    Message,
    TranslationText,
    primary_variant,
};
use super::plural::PluralRule;

/// Position of a message inside [`Catalog::contexts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MessageIndex {
    /// Index into `Catalog::contexts`.
    context: usize,
    /// Index into `Context::messages`.
    message: usize,
}

/// `source -> [(comment, position)]` for one context.
type SourceIndex = HashMap<String, Vec<(String, MessageIndex)>>;

/// Read-only lookup table built from one catalog.
///
/// Cheap to share: the catalog sits behind an [`Arc`] and nothing is mutated
/// after construction, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Arc<Catalog>,
    /// Target language; drives `plural_rule`.
    language: Option<String>,
    plural_rule: PluralRule,
    /// `context -> source -> [(comment, position)]`
    index: HashMap<String, SourceIndex>,
}

impl Translator {
    /// Builds the lookup index. The plural rule comes from the catalog's
    /// `language` attribute.
    #[must_use]
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        let catalog = catalog.into();
        let mut index: HashMap<String, SourceIndex> = HashMap::new();

        for (context_index, context) in catalog.contexts.iter().enumerate() {
            let sources = index.entry(context.name.clone()).or_default();
            for (message_index, message) in context.messages.iter().enumerate() {
                sources.entry(message.source.clone()).or_default().push((
                    message.comment_str().to_string(),
                    MessageIndex { context: context_index, message: message_index },
                ));
            }
        }

        let language = catalog.language.clone().filter(|language| !language.is_empty());
        let plural_rule = PluralRule::for_language(language.as_deref().unwrap_or_default());

        Self { catalog, language, plural_rule, index }
    }

    /// Overrides the language, e.g. when the catalog has no `language`
    /// attribute and the language was detected from the file name.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.plural_rule = PluralRule::for_language(&language);
        self.language = Some(language);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub const fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// Resolves an index entry.
    fn message_at(&self, index: MessageIndex) -> Option<&Message> {
        self.catalog.contexts.get(index.context)?.messages.get(index.message)
    }

    /// Finds the first message stored under the exact key, translated or not.
    #[must_use]
    pub fn find(&self, context: &str, source: &str, comment: &str) -> Option<&Message> {
        self.candidates(context, source, comment).next()
    }

    /// Messages stored under the exact key, in document order.
    fn candidates<'s>(
        &'s self,
        context: &str,
        source: &str,
        comment: &str,
    ) -> impl Iterator<Item = &'s Message> {
        self.index
            .get(context)
            .and_then(|sources| sources.get(source))
            .into_iter()
            .flatten()
            .filter(move |(candidate, _)| candidate.as_str() == comment)
            .filter_map(|(_, index)| self.message_at(*index))
    }

    /// Finds a usable (finished, non-empty) message.
    ///
    /// A miss with a non-empty comment is retried with an empty comment.
    fn find_translated(&self, context: &str, source: &str, comment: &str) -> Option<&Message> {
        let exact = self.candidates(context, source, comment).find(|m| m.is_translated());
        if exact.is_some() || comment.is_empty() {
            return exact;
        }
        self.candidates(context, source, "").find(|m| m.is_translated())
    }

    /// Returns the translated text without falling back to the source.
    ///
    /// For numerus messages `n` selects the plural form; without `n` the
    /// first form is used. A form index past the stored forms uses the last
    /// form. `%n` is not substituted.
    #[must_use]
    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: Option<i64>,
    ) -> Option<&str> {
        let message = self.find_translated(context, source, comment.unwrap_or_default())?;

        let text = match &message.translation.text {
            TranslationText::Single(text) => primary_variant(text),
            TranslationText::Numerus(forms) => {
                let index = n.map_or(0, |n| self.plural_rule.form_index(n));
                let form = forms.get(index).or_else(|| forms.last())?;
                primary_variant(form)
            }
        };

        (!text.is_empty()).then_some(text)
    }

    /// Translates a string, falling back to `source`.
    #[must_use]
    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> Cow<'a, str> {
        self.lookup(context, source, comment, None).map_or_else(
            || {
                tracing::trace!(context, source, "No translation, using source text");
                Cow::Borrowed(source)
            },
            Cow::Borrowed,
        )
    }

    /// Translates a string with a count, falling back to `source`.
    ///
    /// `%n` (and `%Ln`) in the result are replaced by `n`.
    #[must_use]
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: i64,
    ) -> String {
        let text = self.lookup(context, source, comment, Some(n)).unwrap_or(source);
        substitute_count(text, n)
    }
}

/// Replaces `%n` and `%Ln` with the decimal count.
#[must_use]
pub fn substitute_count(text: &str, n: i64) -> String {
    text.replace("%Ln", &n.to_string()).replace("%n", &n.to_string())
}

/// Ordered chain of translators, e.g. an application catalog in front of a
/// toolkit catalog. Earlier translators take priority.
#[derive(Debug, Clone, Default)]
pub struct TranslatorSet {
    /// Highest priority first.
    translators: Vec<Translator>,
}

impl TranslatorSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { translators: Vec::new() }
    }

    /// Adds a translator with lower priority than the ones already added.
    pub fn push(&mut self, translator: Translator) {
        self.translators.push(translator);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.translators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    /// First translated text among the translators.
    #[must_use]
    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: Option<i64>,
    ) -> Option<&str> {
        self.translators.iter().find_map(|t| t.lookup(context, source, comment, n))
    }

    /// See [`Translator::translate`].
    #[must_use]
    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> Cow<'a, str> {
        self.lookup(context, source, comment, None).map_or_else(
            || {
                tracing::trace!(context, source, "No translation, using source text");
                Cow::Borrowed(source)
            },
            Cow::Borrowed,
        )
    }

    /// See [`Translator::translate_plural`].
    #[must_use]
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: i64,
    ) -> String {
        substitute_count(self.lookup(context, source, comment, Some(n)).unwrap_or(source), n)
    }
}

impl FromIterator<Translator> for TranslatorSet {
    fn from_iter<I: IntoIterator<Item = Translator>>(iter: I) -> Self {
        Self { translators: iter.into_iter().collect() }
    }
}
