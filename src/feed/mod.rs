//! Feed building and rendering.
//!
//! Callers hand [`FeedBuilder`] a list of their own domain objects plus a
//! mapper that turns one object into one [`FeedEntry`]; the builder validates
//! the channel metadata, maps the items in order, and renders the resulting
//! [`Feed`] as XML.
//!
//! # Dialects
//!
//! - [`FeedType::Rss090`] (`rss_0.9`) - RDF-based RSS, items with title and link
//! - [`FeedType::Rss093`] (`rss_0.93`) - classic RSS, authors as `dc:creator`
//! - [`FeedType::Atom03`] (`atom_0.3`) - Atom 0.3 with typed content blocks
//!
//! Data a dialect has no element for is rejected with
//! [`SerializationError::Unrepresentable`], never silently dropped.
//!
//! # Architecture
//!
//! - [`builder`] - metadata validation and sequential/parallel mapping
//! - `render` - shared XML writer and character checks
//! - `rss` / `atom` - per-dialect document layout
//! - [`types`] - value types and the error taxonomy

mod atom;
pub mod builder;
pub mod render;
mod rss;
pub mod types;

pub use builder::{EntryMapper, FeedBuilder};
pub use render::{render, RenderOptions};
pub use types::{
    BoxError, Content, ContentMode, Feed, FeedEntry, FeedError, FeedMetadata, FeedType,
    SerializationError, ValidationError,
};
