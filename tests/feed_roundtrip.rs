//! Integration tests for the build → render → re-parse cycle.
//!
//! Each test maps a small list of domain objects into a feed, renders it, and
//! parses the XML back with quick-xml to check that what readers see matches
//! what was built.

use feedsmith::feed::{
    Content, ContentMode, FeedBuilder, FeedEntry, FeedError, FeedType, SerializationError,
};
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone)]
struct Customer {
    id: u32,
    name: &'static str,
}

fn customers() -> Vec<Customer> {
    vec![Customer { id: 1, name: "A" }, Customer { id: 2, name: "B" }]
}

fn customer_entry(customer: Customer) -> anyhow::Result<FeedEntry> {
    Ok(FeedEntry::new(format!("new customer! {}", customer.name))
        .with_author("Josh")
        .with_content(Content::new(
            "text/plain",
            ContentMode::Escaped,
            format!(
                "this is a description for the new customer added, {}",
                customer.name
            ),
        )))
}

// ============================================================================
// Atom 0.3 re-parsing
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct ParsedEntry {
    title: String,
    author: Option<String>,
    content: Option<String>,
    content_type: Option<String>,
    content_mode: Option<String>,
}

#[derive(Debug, Default)]
struct ParsedFeed {
    title: Option<String>,
    description: Option<String>,
    entries: Vec<ParsedEntry>,
}

fn parse_atom(xml: &str) -> ParsedFeed {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut feed = ParsedFeed::default();

    loop {
        match reader.read_event().expect("rendered feed should be well-formed") {
            Event::Start(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                if name == "entry" {
                    feed.entries.push(ParsedEntry::default());
                }
                if name == "content" {
                    let entry = feed.entries.last_mut().expect("content outside entry");
                    for attr in e.attributes() {
                        let attr = attr.unwrap();
                        let value = attr
                            .decode_and_unescape_value(reader.decoder())
                            .unwrap()
                            .into_owned();
                        match attr.key.as_ref() {
                            b"type" => entry.content_type = Some(value),
                            b"mode" => entry.content_mode = Some(value),
                            _ => {}
                        }
                    }
                }
                path.push(name);
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().unwrap().into_owned();
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                match segments.as_slice() {
                    ["feed", "title"] => feed.title = Some(text),
                    ["feed", "tagline"] => feed.description = Some(text),
                    ["feed", "entry", rest @ ..] => {
                        let entry = feed.entries.last_mut().unwrap();
                        match rest {
                            ["title"] => entry.title = text,
                            ["author", "name"] => entry.author = Some(text),
                            ["content"] => entry.content = Some(text),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    feed
}

#[test]
fn test_atom_render_round_trip() {
    let builder = FeedBuilder::new();
    let feed = builder
        .build_feed(
            FeedType::Atom03,
            "title",
            "https://adobe.com",
            "a description",
            customers(),
            customer_entry,
        )
        .unwrap();

    let xml = builder.render(&feed).unwrap();
    let parsed = parse_atom(&xml);

    assert_eq!(parsed.title.as_deref(), Some("title"));
    assert_eq!(parsed.description.as_deref(), Some("a description"));
    assert_eq!(parsed.entries.len(), 2, "there should be two entries!");
    assert_eq!(
        parsed.entries[0],
        ParsedEntry {
            title: "new customer! A".into(),
            author: Some("Josh".into()),
            content: Some("this is a description for the new customer added, A".into()),
            content_type: Some("text/plain".into()),
            content_mode: Some("escaped".into()),
        }
    );
    assert_eq!(parsed.entries[1].title, "new customer! B");
}

#[test]
fn test_atom_round_trip_preserves_special_characters() {
    let builder = FeedBuilder::new();
    let feed = builder
        .build_feed(
            FeedType::Atom03,
            "Fish & Chips <daily>",
            "https://example.com/?a=1&b=2",
            "\"quoted\" & 'single'",
            ["<script>alert(1)</script>"],
            |s: &str| -> anyhow::Result<FeedEntry> {
                Ok(FeedEntry::new(s).with_content(Content::text(s)))
            },
        )
        .unwrap();

    let parsed = parse_atom(&builder.render(&feed).unwrap());
    assert_eq!(parsed.title.as_deref(), Some("Fish & Chips <daily>"));
    assert_eq!(parsed.description.as_deref(), Some("\"quoted\" & 'single'"));
    assert_eq!(parsed.entries[0].title, "<script>alert(1)</script>");
    assert_eq!(
        parsed.entries[0].content.as_deref(),
        Some("<script>alert(1)</script>")
    );
}

// ============================================================================
// RSS 0.93 re-parsing
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct ParsedItem {
    title: String,
    link: Option<String>,
    description: Option<String>,
    creators: Vec<String>,
}

#[derive(Debug, Default)]
struct ParsedChannel {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    items: Vec<ParsedItem>,
}

fn parse_rss093(xml: &str) -> ParsedChannel {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut channel = ParsedChannel::default();

    loop {
        match reader.read_event().expect("rendered feed should be well-formed") {
            Event::Start(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                if name == "rss" {
                    let version = e
                        .try_get_attribute("version")
                        .unwrap()
                        .map(|a| a.unescape_value().unwrap().into_owned());
                    assert_eq!(version.as_deref(), Some("0.93"));
                }
                if name == "item" {
                    channel.items.push(ParsedItem::default());
                }
                path.push(name);
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().unwrap().into_owned();
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                match segments.as_slice() {
                    ["rss", "channel", "title"] => channel.title = Some(text),
                    ["rss", "channel", "link"] => channel.link = Some(text),
                    ["rss", "channel", "description"] => channel.description = Some(text),
                    ["rss", "channel", "item", rest @ ..] => {
                        let item = channel.items.last_mut().unwrap();
                        match rest {
                            ["title"] => item.title = text,
                            ["link"] => item.link = Some(text),
                            ["description"] => item.description = Some(text),
                            ["dc:creator"] => item.creators.push(text),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    channel
}

#[test]
fn test_rss093_render_round_trip() {
    let builder = FeedBuilder::new();
    let feed = builder
        .build_feed(
            FeedType::Rss093,
            "title",
            "  https://adobe.com  ",
            "a description",
            customers(),
            |c: Customer| -> anyhow::Result<FeedEntry> {
                Ok(FeedEntry::new(format!("new customer! {}", c.name))
                    .with_link(format!("https://adobe.com/customers/{}", c.id))
                    .with_author("Josh")
                    .with_summary(format!("customer number {}", c.id)))
            },
        )
        .unwrap();

    let parsed = parse_rss093(&builder.render(&feed).unwrap());

    assert_eq!(parsed.title.as_deref(), Some("title"));
    assert_eq!(parsed.link.as_deref(), Some("https://adobe.com"));
    assert_eq!(parsed.description.as_deref(), Some("a description"));
    assert_eq!(parsed.items.len(), 2);
    assert_eq!(
        parsed.items[0],
        ParsedItem {
            title: "new customer! A".into(),
            link: Some("https://adobe.com/customers/1".into()),
            description: Some("customer number 1".into()),
            creators: vec!["Josh".into()],
        }
    );
    assert_eq!(parsed.items[1].title, "new customer! B");
    assert_eq!(
        parsed.items[1].link.as_deref(),
        Some("https://adobe.com/customers/2")
    );
}

#[test]
fn test_rss090_render_is_well_formed() {
    let builder = FeedBuilder::new();
    let feed = builder
        .build_feed_str(
            "rss_0.9",
            "title",
            "https://adobe.com",
            "a description",
            customers(),
            |c: Customer| -> anyhow::Result<FeedEntry> {
                Ok(FeedEntry::new(c.name).with_link(format!("https://adobe.com/c/{}", c.id)))
            },
        )
        .unwrap();
    let xml = builder.render(&feed).unwrap();

    let mut reader = Reader::from_str(&xml);
    let mut items = 0;
    loop {
        match reader.read_event().expect("well-formed RSS 0.9") {
            Event::Start(e) if e.name().as_ref() == b"item" => items += 1,
            Event::Eof => break,
            _ => {}
        }
    }
    assert_eq!(items, 2);
}

// ============================================================================
// Failure cases end-to-end
// ============================================================================

#[test]
fn test_same_feed_renders_identically() {
    let builder = FeedBuilder::new();
    let feed = builder
        .build_feed(
            FeedType::Atom03,
            "title",
            "https://adobe.com",
            "a description",
            customers(),
            customer_entry,
        )
        .unwrap();
    assert_eq!(builder.render(&feed).unwrap(), builder.render(&feed).unwrap());
}

#[test]
fn test_atom_entry_with_two_authors_fails_to_render() {
    let builder = FeedBuilder::new();
    let feed = builder
        .build_feed(
            FeedType::Atom03,
            "title",
            "https://adobe.com",
            "",
            customers(),
            |c: Customer| customer_entry(c).map(|e| e.with_author("Ada")),
        )
        .unwrap();

    let err = builder.render(&feed).unwrap_err();
    assert!(matches!(
        err,
        SerializationError::Unrepresentable {
            dialect: FeedType::Atom03,
            ..
        }
    ));
}

#[test]
fn test_same_entries_render_in_rss093_but_not_rss090() {
    let builder = FeedBuilder::new();
    let build = |feed_type| {
        builder
            .build_feed(
                feed_type,
                "title",
                "https://adobe.com",
                "",
                customers(),
                customer_entry,
            )
            .unwrap()
    };

    assert!(builder.render(&build(FeedType::Rss093)).is_ok());
    assert!(matches!(
        builder.render(&build(FeedType::Rss090)),
        Err(SerializationError::Unrepresentable { .. })
    ));
}

#[test]
fn test_failing_mapper_returns_no_feed() {
    let result = FeedBuilder::new().build_feed(
        FeedType::Atom03,
        "title",
        "https://adobe.com",
        "",
        vec![
            Customer { id: 1, name: "A" },
            Customer { id: 2, name: "" },
            Customer { id: 3, name: "C" },
        ],
        |c: Customer| {
            if c.name.is_empty() {
                anyhow::bail!("customer {} has no name", c.id);
            }
            customer_entry(c)
        },
    );

    match result {
        Err(FeedError::Mapping { index, source }) => {
            assert_eq!(index, 1);
            assert_eq!(source.to_string(), "customer 2 has no name");
        }
        other => panic!("expected a mapping error, got {other:?}"),
    }
}
