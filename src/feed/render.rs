use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::types::{Feed, FeedType, SerializationError};
use super::{atom, rss};
use crate::util::find_invalid_xml_char;

/// Output formatting knobs. Nothing here changes the document's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces per nesting level; 0 writes the document on a single line.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Serializes `feed` to the XML dialect named by its feed type.
///
/// Rendering is a pure function of the feed: no clock is read and
/// identical feeds produce byte-identical documents. Data the dialect has no
/// element for is reported as [`SerializationError::Unrepresentable`] rather
/// than dropped.
///
/// # Errors
///
/// - [`SerializationError::InvalidCharacter`] if any text holds a character
///   XML 1.0 forbids
/// - [`SerializationError::Unrepresentable`] if an entry does not fit the dialect
/// - [`SerializationError::Xml`] if the writer fails
pub fn render(feed: &Feed, options: &RenderOptions) -> Result<String, SerializationError> {
    check_characters(feed)?;

    let mut sink = XmlSink::new(options.indent);
    sink.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    match feed.feed_type() {
        FeedType::Rss090 => rss::write_rss090(&mut sink, feed)?,
        FeedType::Rss093 => rss::write_rss093(&mut sink, feed)?,
        FeedType::Atom03 => atom::write_atom03(&mut sink, feed)?,
    }

    let xml = sink.finish()?;
    tracing::debug!(
        feed_type = %feed.feed_type(),
        entries = feed.entries().len(),
        bytes = xml.len(),
        "Rendered feed"
    );
    Ok(xml)
}

pub(crate) fn unrepresentable(dialect: FeedType, reason: String) -> SerializationError {
    SerializationError::Unrepresentable { dialect, reason }
}

fn check_text(text: &str, field: impl FnOnce() -> String) -> Result<(), SerializationError> {
    match find_invalid_xml_char(text) {
        Some(ch) => Err(SerializationError::InvalidCharacter { field: field(), ch }),
        None => Ok(()),
    }
}

fn check_characters(feed: &Feed) -> Result<(), SerializationError> {
    let meta = feed.metadata();
    check_text(meta.title(), || "title".into())?;
    check_text(meta.link(), || "link".into())?;
    check_text(meta.description(), || "description".into())?;

    for (i, entry) in feed.entries().iter().enumerate() {
        check_text(&entry.title, || format!("entries[{i}].title"))?;
        if let Some(link) = &entry.link {
            check_text(link, || format!("entries[{i}].link"))?;
        }
        for (j, author) in entry.authors.iter().enumerate() {
            check_text(author, || format!("entries[{i}].authors[{j}]"))?;
        }
        if let Some(summary) = &entry.summary {
            check_text(summary, || format!("entries[{i}].summary"))?;
        }
        for (j, content) in entry.contents.iter().enumerate() {
            check_text(&content.mime_type, || format!("entries[{i}].contents[{j}].type"))?;
            // base64 output is pure ASCII whatever the input
            if content.mode != super::ContentMode::Base64 {
                check_text(&content.value, || format!("entries[{i}].contents[{j}].value"))?;
            }
        }
    }
    Ok(())
}

/// Thin wrapper over the quick-xml event writer used by the dialect writers.
pub(crate) struct XmlSink {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlSink {
    fn new(indent: usize) -> Self {
        let writer = if indent == 0 {
            Writer::new(Cursor::new(Vec::new()))
        } else {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', indent)
        };
        Self { writer }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), SerializationError> {
        self.writer
            .write_event(event)
            .map_err(|e| SerializationError::Xml(e.to_string()))
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SerializationError> {
        let mut start = BytesStart::new(name);
        start.extend_attributes(attrs.iter().copied());
        self.write(Event::Start(start))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), SerializationError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SerializationError> {
        let mut empty = BytesStart::new(name);
        empty.extend_attributes(attrs.iter().copied());
        self.write(Event::Empty(empty))
    }

    /// `<name attrs>text</name>` with `text` escaped.
    pub(crate) fn element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), SerializationError> {
        self.start(name, attrs)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// `<name attrs>markup</name>` with `markup` written verbatim. The caller
    /// is responsible for checking `markup` is well-formed.
    pub(crate) fn raw_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        markup: &str,
    ) -> Result<(), SerializationError> {
        self.start(name, attrs)?;
        self.write(Event::Text(BytesText::from_escaped(markup)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String, SerializationError> {
        let bytes = self.writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| SerializationError::Xml(e.to_string()))
    }
}
