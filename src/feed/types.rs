use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::util::{validate_link, LinkError};

/// Boxed cause carried by [`FeedError::Mapping`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Error Types
// ============================================================================

/// Malformed or missing feed metadata, detected before any item is mapped.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    #[error("The {0} must not be blank")]
    EmptyField(&'static str),

    /// The feed link is not an absolute, hierarchical URI.
    #[error("Invalid feed link '{link}': {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: LinkError,
    },
}

/// The feed cannot be written in the requested dialect.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The dialect identifier is not one of the supported feed types.
    #[error("Unknown feed dialect: {0:?} (expected rss_0.9, rss_0.93 or atom_0.3)")]
    UnknownDialect(String),

    /// The feed holds data the dialect has no element for.
    #[error("{dialect} cannot represent {reason}")]
    Unrepresentable { dialect: FeedType, reason: String },

    /// A text field contains a character XML 1.0 cannot carry.
    #[error("Invalid XML character {ch:?} in {field}")]
    InvalidCharacter { field: String, ch: char },

    /// The XML writer failed.
    #[error("XML write error: {0}")]
    Xml(String),
}

/// Errors surfaced by [`FeedBuilder`](super::FeedBuilder).
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid feed metadata: {0}")]
    Validation(#[from] ValidationError),

    /// The caller's mapper failed; no feed was produced.
    #[error("Failed to map item at index {index}: {source}")]
    Mapping {
        index: usize,
        #[source]
        source: BoxError,
    },

    #[error("Failed to serialize feed: {0}")]
    Serialization(#[from] SerializationError),
}

// ============================================================================
// Dialects
// ============================================================================

/// Supported feed dialects.
///
/// The string identifiers (`rss_0.9`, `rss_0.93`, `atom_0.3`) are accepted by
/// [`FromStr`], serde and the CLI. All three match them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedType {
    #[serde(rename = "rss_0.9")]
    Rss090,
    #[serde(rename = "rss_0.93")]
    Rss093,
    #[serde(rename = "atom_0.3")]
    Atom03,
}

impl FeedType {
    pub const ALL: [FeedType; 3] = [FeedType::Rss090, FeedType::Rss093, FeedType::Atom03];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedType::Rss090 => "rss_0.9",
            FeedType::Rss093 => "rss_0.93",
            FeedType::Atom03 => "atom_0.3",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedType {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SerializationError::UnknownDialect(s.to_string()))
    }
}

// ============================================================================
// Feed Metadata
// ============================================================================

/// Channel-level data of a feed. Only constructible through [`FeedMetadata::new`],
/// so a value of this type always has a non-blank title and a valid link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    feed_type: FeedType,
    title: String,
    link: String,
    description: String,
}

impl FeedMetadata {
    pub fn new(
        feed_type: FeedType,
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        let link = link.into().trim().to_string();

        if title.is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        if link.is_empty() {
            return Err(ValidationError::EmptyField("link"));
        }
        validate_link(&link).map_err(|source| ValidationError::InvalidLink {
            link: link.clone(),
            source,
        })?;

        // Stored trimmed: the rendered link is exactly the validated one
        Ok(Self {
            feed_type,
            title,
            link,
            description: description.into(),
        })
    }

    pub fn feed_type(&self) -> FeedType {
        self.feed_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// Entries
// ============================================================================

/// How a content body is encoded inside the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Written as escaped character data.
    #[default]
    Escaped,
    /// Base64-encoded on output.
    Base64,
    /// Embedded inline as XML; must be well-formed.
    Xml,
}

impl ContentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentMode::Escaped => "escaped",
            ContentMode::Base64 => "base64",
            ContentMode::Xml => "xml",
        }
    }
}

/// One content block of an entry: `(mime type, mode, body)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type", default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub mode: ContentMode,
    pub value: String,
}

fn default_mime_type() -> String {
    "text/plain".to_string()
}

impl Content {
    pub fn new(mime_type: impl Into<String>, mode: ContentMode, value: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            mode,
            value: value.into(),
        }
    }

    /// Escaped `text/plain` content.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(default_mime_type(), ContentMode::Escaped, value)
    }
}

/// A single feed entry, produced by the caller's mapper for one source item.
///
/// Deserializes from JSON records such as
/// `{"title": "...", "authors": ["Josh"], "contents": [{"type": "text/plain", "value": "..."}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    /// The first author, if any.
    pub fn author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Latest of the published/updated timestamps.
    pub(crate) fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.published.max(self.updated)
    }
}

// ============================================================================
// Feed
// ============================================================================

/// A built feed: validated metadata plus entries in source-item order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    metadata: FeedMetadata,
    entries: Vec<FeedEntry>,
}

impl Feed {
    pub fn new(metadata: FeedMetadata, entries: Vec<FeedEntry>) -> Self {
        Self { metadata, entries }
    }

    pub fn metadata(&self) -> &FeedMetadata {
        &self.metadata
    }

    pub fn feed_type(&self) -> FeedType {
        self.metadata.feed_type
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }
}
