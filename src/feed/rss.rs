//! RSS 0.9 and RSS 0.93 writers.

use chrono::{DateTime, Utc};

use super::render::{unrepresentable, XmlSink};
use super::types::{ContentMode, Feed, FeedEntry, FeedMetadata, FeedType, SerializationError};

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const RSS_090_NS: &str = "http://my.netscape.com/rdf/simple/0.9/";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Writes an RSS 0.9 (RDF) document. Items are siblings of `channel` and
/// carry nothing but a title and a link.
pub(crate) fn write_rss090(sink: &mut XmlSink, feed: &Feed) -> Result<(), SerializationError> {
    for (index, entry) in feed.entries().iter().enumerate() {
        check_rss090_entry(index, entry)?;
    }

    sink.start("rdf:RDF", &[("xmlns:rdf", RDF_NS), ("xmlns", RSS_090_NS)])?;
    sink.start("channel", &[])?;
    write_channel_fields(sink, feed.metadata())?;
    sink.end("channel")?;

    for entry in feed.entries() {
        sink.start("item", &[])?;
        sink.element("title", &[], &entry.title)?;
        if let Some(link) = &entry.link {
            sink.element("link", &[], link)?;
        }
        sink.end("item")?;
    }

    sink.end("rdf:RDF")
}

fn check_rss090_entry(index: usize, entry: &FeedEntry) -> Result<(), SerializationError> {
    if entry.link.as_deref().map_or(true, |l| l.trim().is_empty()) {
        return Err(unrepresentable(
            FeedType::Rss090,
            format!("entry {index} without a link (items require one)"),
        ));
    }

    let unsupported = [
        ("authors", !entry.authors.is_empty()),
        ("summary", entry.summary.is_some()),
        ("contents", !entry.contents.is_empty()),
        ("published date", entry.published.is_some()),
        ("updated date", entry.updated.is_some()),
    ];
    match unsupported.iter().find(|(_, present)| *present) {
        Some((what, _)) => Err(unrepresentable(
            FeedType::Rss090,
            format!("the {what} of entry {index}"),
        )),
        None => Ok(()),
    }
}

/// Writes an RSS 0.93 document. Authors go out as Dublin Core creators
/// since RSS 0.9x has no author element.
pub(crate) fn write_rss093(sink: &mut XmlSink, feed: &Feed) -> Result<(), SerializationError> {
    let items = feed
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| Rss093Item::from_entry(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    sink.start("rss", &[("version", "0.93"), ("xmlns:dc", DC_NS)])?;
    sink.start("channel", &[])?;
    write_channel_fields(sink, feed.metadata())?;

    for item in &items {
        sink.start("item", &[])?;
        sink.element("title", &[], &item.entry.title)?;
        if let Some(link) = &item.entry.link {
            sink.element("link", &[], link)?;
        }
        if let Some(description) = item.description {
            sink.element("description", &[], description)?;
        }
        if let Some(date) = item.pub_date {
            sink.element("pubDate", &[], &date.to_rfc2822())?;
        }
        for author in &item.entry.authors {
            sink.element("dc:creator", &[], author)?;
        }
        sink.end("item")?;
    }

    sink.end("channel")?;
    sink.end("rss")
}

/// An entry checked against what an RSS 0.93 item can hold.
struct Rss093Item<'a> {
    entry: &'a FeedEntry,
    description: Option<&'a str>,
    pub_date: Option<DateTime<Utc>>,
}

impl<'a> Rss093Item<'a> {
    fn from_entry(index: usize, entry: &'a FeedEntry) -> Result<Self, SerializationError> {
        if let Some(content) = entry.contents.iter().find(|c| c.mode != ContentMode::Escaped) {
            return Err(unrepresentable(
                FeedType::Rss093,
                format!("{} content in entry {index}", content.mode.as_str()),
            ));
        }
        if let Some(content) = entry.contents.iter().find(|c| !is_description_type(&c.mime_type)) {
            return Err(unrepresentable(
                FeedType::Rss093,
                format!("{} content in entry {index}", content.mime_type),
            ));
        }

        let mut bodies = entry
            .summary
            .as_deref()
            .into_iter()
            .chain(entry.contents.iter().map(|c| c.value.as_str()));
        let description = bodies.next();
        if bodies.next().is_some() {
            return Err(unrepresentable(
                FeedType::Rss093,
                format!("more than one description body in entry {index}"),
            ));
        }

        let pub_date = match (entry.published, entry.updated) {
            (Some(published), Some(updated)) if published != updated => {
                return Err(unrepresentable(
                    FeedType::Rss093,
                    format!("separate published and updated dates in entry {index}"),
                ));
            }
            (published, updated) => published.or(updated),
        };

        Ok(Self {
            entry,
            description,
            pub_date,
        })
    }
}

/// An item description is plain text or escaped HTML; other media types
/// would lose their type on the way out.
fn is_description_type(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("text/plain") || essence.eq_ignore_ascii_case("text/html")
}

fn write_channel_fields(sink: &mut XmlSink, meta: &FeedMetadata) -> Result<(), SerializationError> {
    sink.element("title", &[], meta.title())?;
    sink.element("link", &[], meta.link())?;
    sink.element("description", &[], meta.description())
}
