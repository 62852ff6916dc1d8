//! Reader for the Qt Linguist `.ts` XML format.

use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{
    BytesStart,
    Event,
};

use super::error::CatalogError;
use super::model::{
    Catalog,
    Context,
    LENGTH_VARIANT_SEPARATOR,
    Location,
    Message,
    Translation,
    TranslationState,
    TranslationText,
};
use crate::types::SourcePosition;

/// Parse a `.ts` document.
///
/// Whitespace inside text elements is kept verbatim, except that `\r\n` and
/// lone `\r` line ends read as `\n`. Unknown elements are skipped; malformed
/// XML fails with [`CatalogError::Xml`].
///
/// # Examples
/// ```
/// use ts_catalog::catalog::parse_catalog;
///
/// let catalog = parse_catalog(
///     r#"<?xml version="1.0" encoding="utf-8"?>
/// <!DOCTYPE TS>
/// <TS version="2.1" language="hr_HR">
/// <context>
///     <name>UIActionPool</name>
///     <message>
///         <source>&amp;Close</source>
///         <translation>&amp;Zatvori</translation>
///     </message>
/// </context>
/// </TS>"#,
/// )
/// .unwrap();
///
/// assert_eq!(catalog.language.as_deref(), Some("hr_HR"));
/// assert_eq!(catalog.contexts[0].messages[0].translation.primary(), "&Zatvori");
/// ```
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    CatalogParser::new(text).parse()
}

/// Read and parse a `.ts` file.
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid catalog.
pub fn load_catalog_file(file_path: &Path) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(file_path)?;
    let catalog = parse_catalog(&content)?;
    tracing::debug!(
        file_path = %file_path.display(),
        contexts = catalog.contexts.len(),
        messages = catalog.message_count(),
        "Loaded catalog"
    );
    Ok(catalog)
}

/// Event-driven parser state.
struct CatalogParser<'a> {
    /// Full document, kept for offset to position conversion.
    text: &'a str,
    reader: Reader<&'a [u8]>,
}

/// Collects the body of a `<translation>` element.
#[derive(Default)]
struct TranslationBody {
    /// Direct text content.
    text: String,
    /// `<lengthvariant>` children.
    variants: Vec<String>,
    /// `<numerusform>` children.
    forms: Vec<String>,
}

impl<'a> CatalogParser<'a> {
    /// Reader over `text` that keeps whitespace.
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        Self { text, reader }
    }

    /// Current byte offset of the reader.
    fn offset(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    /// Line and column of a byte offset.
    fn position(&self, offset: usize) -> SourcePosition {
        SourcePosition::from_offset(self.text, offset)
    }

    /// Wraps a reader error with the current position.
    fn xml_error(&self, source: quick_xml::Error) -> CatalogError {
        let offset = self.offset();
        CatalogError::Xml { offset, position: self.position(offset), source }
    }

    /// Error for well-formed XML that is not a valid catalog.
    fn structure_error(&self, offset: usize, message: impl Into<String>) -> CatalogError {
        CatalogError::Structure { offset, position: self.position(offset), message: message.into() }
    }

    /// Reads the next event together with the offset it starts at.
    fn next_event(&mut self) -> Result<(usize, Event<'a>), CatalogError> {
        let offset = self.offset();
        let event = self.reader.read_event().map_err(|e| self.xml_error(e))?;
        Ok((offset, event))
    }

    /// Consumes an element and all of its children.
    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<(), CatalogError> {
        tracing::trace!(
            element = %String::from_utf8_lossy(start.name().as_ref()),
            "Skipping unknown element"
        );
        self.reader.read_to_end(start.name()).map_err(|e| self.xml_error(e))?;
        Ok(())
    }

    /// Unescaped value of an attribute.
    fn attribute(&self, start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, CatalogError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.xml_error(e.into()))?;
            if attr.key.as_ref() == name {
                return self.character_data(&attr.value).map(Some);
            }
        }
        Ok(None)
    }

    /// Decodes raw character data: line ends are normalized, then entity and
    /// character references are resolved.
    fn character_data(&self, raw: &[u8]) -> Result<String, CatalogError> {
        let decoded = self.reader.decoder().decode(raw).map_err(|e| self.xml_error(e.into()))?;
        let normalized = normalize_line_ends(&decoded);
        Ok(unescape(&normalized).map_err(|e| self.xml_error(e.into()))?.into_owned())
    }

    /// Parses the whole document.
    fn parse(mut self) -> Result<Catalog, CatalogError> {
        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Start(start) => {
                    Self::ensure_root(&start)?;
                    let catalog = self.parse_ts(&start)?;
                    return self.finish(catalog);
                }
                Event::Empty(start) => {
                    Self::ensure_root(&start)?;
                    let catalog = self.ts_attributes(&start)?;
                    return self.finish(catalog);
                }
                Event::Eof => {
                    return Err(self.structure_error(offset, "document has no root element"));
                }
                _ => {}
            }
        }
    }

    /// Reads the rest of the document after the root element closed.
    ///
    /// Only whitespace, comments and processing instructions may follow.
    fn finish(mut self, catalog: Catalog) -> Result<Catalog, CatalogError> {
        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Eof => return Ok(catalog),
                Event::Text(e) if e.iter().all(u8::is_ascii_whitespace) => {}
                Event::Comment(_) | Event::PI(_) => {}
                _ => {
                    return Err(self.structure_error(offset, "content after the root element"));
                }
            }
        }
    }

    /// Rejects documents whose root is not `<TS>`.
    fn ensure_root(start: &BytesStart<'_>) -> Result<(), CatalogError> {
        if start.name().as_ref() == b"TS" {
            Ok(())
        } else {
            Err(CatalogError::NotACatalog(String::from_utf8_lossy(start.name().as_ref()).into()))
        }
    }

    /// Catalog with the root attributes and no contexts.
    fn ts_attributes(&self, start: &BytesStart<'_>) -> Result<Catalog, CatalogError> {
        Ok(Catalog {
            version: self.attribute(start, b"version")?,
            language: self.attribute(start, b"language")?,
            source_language: self.attribute(start, b"sourcelanguage")?,
            contexts: Vec::new(),
        })
    }

    /// Reads `<context>` elements up to `</TS>`.
    fn parse_ts(&mut self, start: &BytesStart<'_>) -> Result<Catalog, CatalogError> {
        let mut catalog = self.ts_attributes(start)?;

        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Start(e) if e.name().as_ref() == b"context" => {
                    catalog.contexts.push(self.parse_context()?);
                }
                Event::Start(e) => self.skip_element(&e)?,
                Event::End(_) => return Ok(catalog),
                Event::Eof => return Err(self.structure_error(offset, "unexpected end of file")),
                _ => {}
            }
        }
    }

    /// Reads one `<context>` after its start tag.
    fn parse_context(&mut self) -> Result<Context, CatalogError> {
        let mut context = Context::default();
        let mut has_name = false;

        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => {
                        context.name = self.read_text()?;
                        has_name = true;
                    }
                    b"comment" => context.comment = Some(self.read_text()?),
                    b"message" => context.messages.push(self.parse_message(&e, offset)?),
                    _ => self.skip_element(&e)?,
                },
                Event::Empty(e) if e.name().as_ref() == b"message" => {
                    let id = self.attribute(&e, b"id")?;
                    if id.is_none() {
                        return Err(self.missing_source(offset));
                    }
                    context.messages.push(Message { id, offset: Some(offset), ..Message::default() });
                }
                Event::End(_) => {
                    if !has_name {
                        return Err(self.structure_error(offset, "<context> without <name>"));
                    }
                    return Ok(context);
                }
                Event::Eof => return Err(self.structure_error(offset, "unexpected end of file")),
                _ => {}
            }
        }
    }

    /// Reads one `<message>` after its start tag.
    fn parse_message(
        &mut self,
        start: &BytesStart<'_>,
        message_offset: usize,
    ) -> Result<Message, CatalogError> {
        let mut message = Message {
            id: self.attribute(start, b"id")?,
            numerus: self.attribute(start, b"numerus")?.as_deref() == Some("yes"),
            offset: Some(message_offset),
            ..Message::default()
        };
        let mut has_source = false;

        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"source" => {
                        message.source = self.read_text()?;
                        has_source = true;
                    }
                    b"oldsource" => message.old_source = Some(self.read_text()?),
                    b"comment" => message.comment = Some(self.read_text()?),
                    b"oldcomment" => message.old_comment = Some(self.read_text()?),
                    b"extracomment" => message.extra_comment = Some(self.read_text()?),
                    b"translatorcomment" => message.translator_comment = Some(self.read_text()?),
                    b"translation" => {
                        message.translation = self.parse_translation(&e, message.numerus)?;
                    }
                    b"location" => {
                        message.locations.push(self.location(&e)?);
                        self.skip_element(&e)?;
                    }
                    _ => self.skip_element(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"location" => message.locations.push(self.location(&e)?),
                    b"source" => has_source = true,
                    b"comment" => message.comment = Some(String::new()),
                    b"translation" => {
                        message.translation = Translation {
                            state: self.translation_state(&e)?,
                            text: if message.numerus {
                                TranslationText::Numerus(Vec::new())
                            } else {
                                TranslationText::Single(String::new())
                            },
                        };
                    }
                    _ => {}
                },
                Event::End(_) => {
                    if !has_source && message.id.is_none() {
                        return Err(self.missing_source(message_offset));
                    }
                    return Ok(message);
                }
                Event::Eof => return Err(self.structure_error(offset, "unexpected end of file")),
                _ => {}
            }
        }
    }

    /// Error for a `<message>` that cannot be looked up.
    fn missing_source(&self, offset: usize) -> CatalogError {
        self.structure_error(offset, "<message> without <source> or id")
    }

    /// `<location filename="..." line="..."/>`
    fn location(&self, start: &BytesStart<'_>) -> Result<Location, CatalogError> {
        Ok(Location {
            filename: self.attribute(start, b"filename")?,
            line: self.attribute(start, b"line")?,
        })
    }

    /// `type` attribute of `<translation>`.
    fn translation_state(&self, start: &BytesStart<'_>) -> Result<TranslationState, CatalogError> {
        Ok(self
            .attribute(start, b"type")?
            .and_then(|value| {
                let state = TranslationState::from_attribute(&value);
                if state.is_none() {
                    tracing::debug!(value = %value, "Unknown translation type, treating as finished");
                }
                state
            })
            .unwrap_or_default())
    }

    /// Reads one `<translation>` after its start tag.
    fn parse_translation(
        &mut self,
        start: &BytesStart<'_>,
        numerus: bool,
    ) -> Result<Translation, CatalogError> {
        let state = self.translation_state(start)?;
        let mut body = TranslationBody::default();

        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"numerusform" => body.forms.push(self.read_text()?),
                    b"lengthvariant" => body.variants.push(self.read_text()?),
                    _ => self.skip_element(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"numerusform" => body.forms.push(String::new()),
                    b"lengthvariant" => body.variants.push(String::new()),
                    b"byte" => body.text.push(self.byte_char(&e, offset)?),
                    _ => {}
                },
                Event::Text(e) => body.text.push_str(&self.character_data(&e)?),
                Event::CData(e) => {
                    body.text.push_str(&normalize_line_ends(&String::from_utf8_lossy(&e)));
                }
                Event::End(_) => break,
                Event::Eof => return Err(self.structure_error(offset, "unexpected end of file")),
                _ => {}
            }
        }

        let text = if numerus || !body.forms.is_empty() {
            TranslationText::Numerus(body.forms)
        } else if body.variants.is_empty() {
            TranslationText::Single(body.text)
        } else {
            TranslationText::Single(body.variants.join(&LENGTH_VARIANT_SEPARATOR.to_string()))
        };

        Ok(Translation { state, text })
    }

    /// Reads the text content of the element just opened, up to its end tag.
    ///
    /// `<lengthvariant>` children are joined with the length variant
    /// separator.
    fn read_text(&mut self) -> Result<String, CatalogError> {
        let mut text = String::new();
        let mut variants: Vec<String> = Vec::new();

        loop {
            let (offset, event) = self.next_event()?;
            match event {
                Event::Text(e) => text.push_str(&self.character_data(&e)?),
                Event::CData(e) => {
                    text.push_str(&normalize_line_ends(&String::from_utf8_lossy(&e)));
                }
                Event::Empty(e) if e.name().as_ref() == b"byte" => {
                    text.push(self.byte_char(&e, offset)?);
                }
                Event::Empty(e) if e.name().as_ref() == b"lengthvariant" => {
                    variants.push(String::new());
                }
                Event::Start(e) if e.name().as_ref() == b"lengthvariant" => {
                    variants.push(self.read_text()?);
                }
                Event::Start(e) => {
                    return Err(self.structure_error(
                        offset,
                        format!(
                            "unexpected <{}> inside text",
                            String::from_utf8_lossy(e.name().as_ref())
                        ),
                    ));
                }
                Event::End(_) => break,
                Event::Eof => return Err(self.structure_error(offset, "unexpected end of file")),
                _ => {}
            }
        }

        if variants.is_empty() {
            Ok(text)
        } else {
            Ok(variants.join(&LENGTH_VARIANT_SEPARATOR.to_string()))
        }
    }

    /// Decodes `<byte value="x1b"/>` (hex with `x` prefix, otherwise decimal).
    fn byte_char(&self, start: &BytesStart<'_>, offset: usize) -> Result<char, CatalogError> {
        let value = self
            .attribute(start, b"value")?
            .ok_or_else(|| self.structure_error(offset, "<byte> without value"))?;

        let code = value.strip_prefix('x').map_or_else(
            || value.parse::<u32>().ok(),
            |hex| u32::from_str_radix(hex, 16).ok(),
        );

        code.and_then(char::from_u32)
            .ok_or_else(|| self.structure_error(offset, format!("invalid byte value '{value}'")))
    }
}

/// Replaces `\r\n` and lone `\r` with `\n`.
fn normalize_line_ends(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
