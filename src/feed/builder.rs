use rayon::prelude::*;

use super::render::{render, RenderOptions};
use super::types::{
    BoxError, Feed, FeedEntry, FeedError, FeedMetadata, FeedType, SerializationError,
    ValidationError,
};

/// Turns one source item into one feed entry.
///
/// Implemented for every `Fn(T) -> Result<FeedEntry, E>` closure, so callers
/// rarely implement it by hand. Mappers should be free of side effects:
/// [`FeedBuilder::build_feed`] calls them once per item in input order and
/// stops at the first failure, but [`FeedBuilder::build_feed_parallel`] calls
/// them concurrently, in no particular order, and for every item.
pub trait EntryMapper<T> {
    type Error: Into<BoxError>;

    fn map_entry(&self, item: T) -> Result<FeedEntry, Self::Error>;
}

impl<T, F, E> EntryMapper<T> for F
where
    F: Fn(T) -> Result<FeedEntry, E>,
    E: Into<BoxError>,
{
    type Error = E;

    fn map_entry(&self, item: T) -> Result<FeedEntry, E> {
        self(item)
    }
}

/// Builds feeds from caller domain objects and renders them to XML.
///
/// The builder holds only render options; it is cheap to clone, `Send + Sync`,
/// and independent builds share no state.
///
/// # Example
///
/// ```
/// use feedsmith::feed::{Content, FeedBuilder, FeedEntry, FeedType};
///
/// struct Customer { name: &'static str }
///
/// let customers = vec![Customer { name: "A" }, Customer { name: "B" }];
/// let builder = FeedBuilder::new();
/// let feed = builder
///     .build_feed(
///         FeedType::Atom03,
///         "Customers",
///         "https://example.com",
///         "New sign-ups",
///         customers,
///         |c: Customer| -> anyhow::Result<FeedEntry> {
///             Ok(FeedEntry::new(format!("new customer! {}", c.name))
///                 .with_author("Josh")
///                 .with_content(Content::text(format!("welcome, {}", c.name))))
///         },
///     )
///     .unwrap();
///
/// assert_eq!(feed.entries().len(), 2);
/// let xml = builder.render(&feed).unwrap();
/// assert!(xml.contains("<title>new customer! B</title>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeedBuilder {
    options: RenderOptions,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Builds a feed by mapping each item, in order, to an entry.
    ///
    /// Metadata is validated before the mapper runs, so a blank title or an
    /// invalid link never costs a mapper call.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Validation`] for a blank title or link, or a link that
    ///   is not an absolute URL
    /// - [`FeedError::Mapping`] with the index of the first item whose mapper
    ///   call failed; no feed is returned
    pub fn build_feed<T, M>(
        &self,
        feed_type: FeedType,
        title: &str,
        link: &str,
        description: &str,
        items: impl IntoIterator<Item = T>,
        mapper: M,
    ) -> Result<Feed, FeedError>
    where
        M: EntryMapper<T>,
    {
        let metadata = FeedMetadata::new(feed_type, title, link, description)?;

        let entries = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                mapper
                    .map_entry(item)
                    .map_err(|e| mapping_error(index, e.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            feed_type = %feed_type,
            entries = entries.len(),
            "Built feed"
        );
        Ok(Feed::new(metadata, entries))
    }

    /// Like [`build_feed`](Self::build_feed) with the dialect given as its
    /// identifier (`rss_0.9`, `rss_0.93`, `atom_0.3`).
    ///
    /// # Errors
    ///
    /// In addition to the errors of `build_feed`: a blank identifier is a
    /// [`ValidationError`], an unrecognized one is
    /// [`SerializationError::UnknownDialect`]. Both are reported before any
    /// item is mapped.
    pub fn build_feed_str<T, M>(
        &self,
        feed_type: &str,
        title: &str,
        link: &str,
        description: &str,
        items: impl IntoIterator<Item = T>,
        mapper: M,
    ) -> Result<Feed, FeedError>
    where
        M: EntryMapper<T>,
    {
        if feed_type.trim().is_empty() {
            return Err(ValidationError::EmptyField("feed type").into());
        }
        let feed_type: FeedType = feed_type.parse()?;
        self.build_feed(feed_type, title, link, description, items, mapper)
    }

    /// Builds a feed, mapping items on the rayon thread pool.
    ///
    /// Entries come out in item order regardless of which mapper call
    /// finishes first. Every item is mapped even when one fails; the error
    /// reported is the one with the lowest index, the same one
    /// [`build_feed`](Self::build_feed) would report.
    pub fn build_feed_parallel<T, M>(
        &self,
        feed_type: FeedType,
        title: &str,
        link: &str,
        description: &str,
        items: Vec<T>,
        mapper: M,
    ) -> Result<Feed, FeedError>
    where
        T: Send,
        M: EntryMapper<T> + Sync,
        M::Error: Send,
    {
        let metadata = FeedMetadata::new(feed_type, title, link, description)?;

        let results: Vec<Result<FeedEntry, M::Error>> = items
            .into_par_iter()
            .map(|item| mapper.map_entry(item))
            .collect();

        let mut entries = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            entries.push(result.map_err(|e| mapping_error(index, e.into()))?);
        }

        tracing::debug!(
            feed_type = %feed_type,
            entries = entries.len(),
            threads = rayon::current_num_threads(),
            "Built feed in parallel"
        );
        Ok(Feed::new(metadata, entries))
    }

    /// Renders `feed` with this builder's options. See [`render`].
    pub fn render(&self, feed: &Feed) -> Result<String, SerializationError> {
        render(feed, &self.options)
    }
}

fn mapping_error(index: usize, source: BoxError) -> FeedError {
    tracing::debug!(index, error = %source, "Entry mapper failed");
    FeedError::Mapping { index, source }
}
