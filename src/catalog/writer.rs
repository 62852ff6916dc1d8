//! Serializer producing `.ts` documents in the layout Qt Linguist writes.

use std::io::Write;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{
    BytesDecl,
    BytesEnd,
    BytesStart,
    BytesText,
    Event,
};

use super::error::CatalogError;
use super::model::{
    Catalog,
    Context,
    LENGTH_VARIANT_SEPARATOR,
    Message,
    Translation,
    TranslationText,
};

/// Indentation of `<context>` children.
const CONTEXT_INDENT: &str = "\n    ";
/// Indentation of `<message>` children.
const MESSAGE_INDENT: &str = "\n        ";
/// Indentation of `<numerusform>` elements.
const FORM_INDENT: &str = "\n            ";

/// Serialize a catalog to a `.ts` document.
///
/// Parsing the output with [`super::parse_catalog`] yields an equal catalog.
pub fn write_catalog(catalog: &Catalog) -> Result<String, CatalogError> {
    let mut writer = CatalogWriter { inner: Writer::new(Vec::new()) };
    writer.catalog(catalog)?;
    Ok(String::from_utf8(writer.inner.into_inner())?)
}

/// Serialize a catalog into a file.
///
/// # Errors
/// Returns error if serialization or the file write fails.
pub fn save_catalog_file(catalog: &Catalog, file_path: &Path) -> Result<(), CatalogError> {
    let document = write_catalog(catalog)?;
    std::fs::write(file_path, document)?;
    tracing::debug!(file_path = %file_path.display(), "Saved catalog");
    Ok(())
}

/// Thin wrapper adding the `.ts` element vocabulary to a quick-xml writer.
struct CatalogWriter<W: Write> {
    /// Underlying event writer.
    inner: Writer<W>,
}

impl<W: Write> CatalogWriter<W> {
    /// Writes text without escaping.
    fn raw(&mut self, text: &str) -> std::io::Result<()> {
        self.inner.write_event(Event::Text(BytesText::from_escaped(text)))
    }

    /// Declaration, doctype and the `<TS>` element.
    fn catalog(&mut self, catalog: &Catalog) -> std::io::Result<()> {
        self.inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.raw("\n")?;
        self.inner.write_event(Event::DocType(BytesText::from_escaped("TS")))?;
        self.raw("\n")?;

        let mut root = BytesStart::new("TS");
        if let Some(version) = &catalog.version {
            root.push_attribute(("version", version.as_str()));
        }
        if let Some(language) = &catalog.language {
            root.push_attribute(("language", language.as_str()));
        }
        if let Some(source_language) = &catalog.source_language {
            root.push_attribute(("sourcelanguage", source_language.as_str()));
        }
        self.inner.write_event(Event::Start(root))?;
        self.raw("\n")?;

        for context in &catalog.contexts {
            self.context(context)?;
        }

        self.inner.write_event(Event::End(BytesEnd::new("TS")))?;
        self.raw("\n")
    }

    /// One `<context>` with its messages.
    fn context(&mut self, context: &Context) -> std::io::Result<()> {
        self.inner.write_event(Event::Start(BytesStart::new("context")))?;
        self.raw(CONTEXT_INDENT)?;
        self.text_element("name", &context.name)?;
        if let Some(comment) = &context.comment {
            self.raw(CONTEXT_INDENT)?;
            self.text_element("comment", comment)?;
        }

        for message in &context.messages {
            self.raw(CONTEXT_INDENT)?;
            self.message(message)?;
        }

        self.raw("\n")?;
        self.inner.write_event(Event::End(BytesEnd::new("context")))?;
        self.raw("\n")
    }

    /// One `<message>` and its children.
    fn message(&mut self, message: &Message) -> std::io::Result<()> {
        let mut start = BytesStart::new("message");
        if let Some(id) = &message.id {
            start.push_attribute(("id", id.as_str()));
        }
        if message.numerus {
            start.push_attribute(("numerus", "yes"));
        }
        self.inner.write_event(Event::Start(start))?;

        for location in &message.locations {
            let mut element = BytesStart::new("location");
            if let Some(filename) = &location.filename {
                element.push_attribute(("filename", filename.as_str()));
            }
            if let Some(line) = &location.line {
                element.push_attribute(("line", line.as_str()));
            }
            self.raw(MESSAGE_INDENT)?;
            self.inner.write_event(Event::Empty(element))?;
        }

        self.raw(MESSAGE_INDENT)?;
        self.text_element("source", &message.source)?;

        let optional = [
            ("oldsource", &message.old_source),
            ("comment", &message.comment),
            ("oldcomment", &message.old_comment),
            ("extracomment", &message.extra_comment),
            ("translatorcomment", &message.translator_comment),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                self.raw(MESSAGE_INDENT)?;
                self.text_element(name, value)?;
            }
        }

        self.raw(MESSAGE_INDENT)?;
        self.translation(&message.translation)?;

        self.raw(CONTEXT_INDENT)?;
        self.inner.write_event(Event::End(BytesEnd::new("message")))
    }

    /// `<translation>` with its state and forms.
    fn translation(&mut self, translation: &Translation) -> std::io::Result<()> {
        let mut start = BytesStart::new("translation");
        if let Some(state) = translation.state.as_attribute() {
            start.push_attribute(("type", state));
        }

        match &translation.text {
            TranslationText::Single(text) => {
                if text.contains(LENGTH_VARIANT_SEPARATOR) {
                    start.push_attribute(("variants", "yes"));
                }
                self.inner.write_event(Event::Start(start))?;
                self.variant_content(text)?;
            }
            TranslationText::Numerus(forms) => {
                self.inner.write_event(Event::Start(start))?;
                for form in forms {
                    self.raw(FORM_INDENT)?;
                    let mut element = BytesStart::new("numerusform");
                    if form.contains(LENGTH_VARIANT_SEPARATOR) {
                        element.push_attribute(("variants", "yes"));
                    }
                    self.inner.write_event(Event::Start(element))?;
                    self.variant_content(form)?;
                    self.inner.write_event(Event::End(BytesEnd::new("numerusform")))?;
                }
                if !forms.is_empty() {
                    self.raw(MESSAGE_INDENT)?;
                }
            }
        }

        self.inner.write_event(Event::End(BytesEnd::new("translation")))
    }

    /// Writes a string, splitting length variants into `<lengthvariant>` elements.
    fn variant_content(&mut self, text: &str) -> std::io::Result<()> {
        if !text.contains(LENGTH_VARIANT_SEPARATOR) {
            return self.text(text);
        }

        for variant in text.split(LENGTH_VARIANT_SEPARATOR) {
            self.inner.write_event(Event::Start(BytesStart::new("lengthvariant")))?;
            self.text(variant)?;
            self.inner.write_event(Event::End(BytesEnd::new("lengthvariant")))?;
        }
        Ok(())
    }

    /// `<name>text</name>`
    fn text_element(&mut self, name: &str, text: &str) -> std::io::Result<()> {
        self.inner.write_event(Event::Start(BytesStart::new(name)))?;
        self.text(text)?;
        self.inner.write_event(Event::End(BytesEnd::new(name)))
    }

    /// Writes escaped text. Control characters XML 1.0 cannot carry are
    /// written as `<byte value="xHH"/>`.
    fn text(&mut self, text: &str) -> std::io::Result<()> {
        let mut chunk_start = 0;
        for (index, ch) in text.char_indices() {
            if is_xml_char(ch) {
                continue;
            }
            if let Some(chunk) = text.get(chunk_start..index) {
                self.escaped(chunk)?;
            }
            let mut byte = BytesStart::new("byte");
            byte.push_attribute(("value", format!("x{:x}", u32::from(ch)).as_str()));
            self.inner.write_event(Event::Empty(byte))?;
            chunk_start = index + ch.len_utf8();
        }
        if let Some(chunk) = text.get(chunk_start..) {
            self.escaped(chunk)?;
        }
        Ok(())
    }

    /// Writes text with `<`, `>`, `&`, quotes escaped.
    fn escaped(&mut self, chunk: &str) -> std::io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.inner.write_event(Event::Text(BytesText::new(chunk)))
    }
}

/// Characters written verbatim. Everything else, `\r` included, becomes a
/// `<byte>` element.
const fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\u{20}'..='\u{d7ff}' | '\u{e000}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}
