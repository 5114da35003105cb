//! Atom 0.3 writer.

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sha2::{Digest, Sha256};

use super::render::{unrepresentable, XmlSink};
use super::types::{Content, ContentMode, Feed, FeedEntry, FeedType, SerializationError};

const ATOM_03_NS: &str = "http://purl.org/atom/ns#";

pub(crate) fn write_atom03(sink: &mut XmlSink, feed: &Feed) -> Result<(), SerializationError> {
    for (index, entry) in feed.entries().iter().enumerate() {
        check_entry(index, entry)?;
    }

    let meta = feed.metadata();
    sink.start("feed", &[("xmlns", ATOM_03_NS), ("version", "0.3")])?;
    sink.element("title", &[], meta.title())?;
    write_link(sink, meta.link())?;
    if !meta.description().is_empty() {
        sink.element("tagline", &[], meta.description())?;
    }
    // Derived from the entries so rendering never reads the clock
    if let Some(modified) = feed.entries().iter().filter_map(FeedEntry::latest_timestamp).max() {
        sink.element("modified", &[], &w3c_date(modified))?;
    }

    for (index, entry) in feed.entries().iter().enumerate() {
        write_entry(sink, meta.link(), index, entry)?;
    }

    sink.end("feed")
}

fn check_entry(index: usize, entry: &FeedEntry) -> Result<(), SerializationError> {
    if entry.authors.len() > 1 {
        return Err(unrepresentable(
            FeedType::Atom03,
            format!("{} authors in entry {index} (at most one)", entry.authors.len()),
        ));
    }
    for content in entry.contents.iter().filter(|c| c.mode == ContentMode::Xml) {
        check_well_formed(&content.value).map_err(|reason| {
            unrepresentable(
                FeedType::Atom03,
                format!("malformed inline XML content in entry {index}: {reason}"),
            )
        })?;
    }
    Ok(())
}

fn write_entry(
    sink: &mut XmlSink,
    feed_link: &str,
    index: usize,
    entry: &FeedEntry,
) -> Result<(), SerializationError> {
    sink.start("entry", &[])?;
    sink.element("title", &[], &entry.title)?;
    if let Some(link) = &entry.link {
        write_link(sink, link)?;
    }
    if let Some(author) = entry.author() {
        sink.start("author", &[])?;
        sink.element("name", &[], author)?;
        sink.end("author")?;
    }
    sink.element("id", &[], &entry_id(feed_link, index, entry))?;
    if let Some(issued) = entry.published {
        sink.element("issued", &[], &w3c_date(issued))?;
    }
    if let Some(modified) = entry.updated {
        sink.element("modified", &[], &w3c_date(modified))?;
    }
    if let Some(summary) = &entry.summary {
        sink.element("summary", &[], summary)?;
    }
    for content in &entry.contents {
        write_content(sink, content)?;
    }
    sink.end("entry")
}

fn write_link(sink: &mut XmlSink, href: &str) -> Result<(), SerializationError> {
    sink.empty(
        "link",
        &[("rel", "alternate"), ("type", "text/html"), ("href", href)],
    )
}

fn write_content(sink: &mut XmlSink, content: &Content) -> Result<(), SerializationError> {
    let attrs = [
        ("type", content.mime_type.as_str()),
        ("mode", content.mode.as_str()),
    ];
    match content.mode {
        ContentMode::Escaped => sink.element("content", &attrs, &content.value),
        ContentMode::Base64 => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(content.value.as_bytes());
            sink.element("content", &attrs, &encoded)
        }
        ContentMode::Xml => sink.raw_element("content", &attrs, &content.value),
    }
}

fn w3c_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The entry's id: its link when it has one, otherwise a digest of the feed
/// link, the entry's position, title and publication time. Entries may share
/// a title, so the position keeps derived ids unique within the feed.
fn entry_id(feed_link: &str, index: usize, entry: &FeedEntry) -> String {
    if let Some(link) = entry.link.as_deref().map(str::trim) {
        if !link.is_empty() {
            return link.to_string();
        }
    }

    let input = format!(
        "{}|{}|{}|{}",
        feed_link,
        index,
        entry.title,
        entry
            .published
            .map(|p| p.timestamp().to_string())
            .unwrap_or_default()
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("urn:sha256:{:x}", hash)
}

/// Checks that an inline XML fragment can be embedded as-is.
///
/// A fragment may hold several top-level elements and text, but every
/// element must be closed, entities must be the XML builtins, and prolog
/// constructs (declarations, doctypes) are rejected.
fn check_well_formed(fragment: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(fragment);
    let mut depth: usize = 0;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                check_attributes(&e, &reader)?;
                depth += 1;
            }
            Event::Empty(e) => check_attributes(&e, &reader)?,
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "closing tag without an opening tag".to_string())?;
            }
            Event::Text(t) => {
                // SEC-002: only the five builtin entities resolve; anything else errors
                t.unescape().map_err(|e| e.to_string())?;
            }
            Event::Decl(_) | Event::DocType(_) => {
                return Err("declarations are not allowed in inline content".to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(format!("{depth} unclosed element(s)"))
    }
}

fn check_attributes(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<(), String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        attr.decode_and_unescape_value(reader.decoder())
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}
