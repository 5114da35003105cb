//! Build RSS and Atom feeds from arbitrary domain objects.
//!
//! ```
//! use feedsmith::feed::{FeedBuilder, FeedEntry, FeedType};
//!
//! let posts = ["Hello", "World"];
//! let builder = FeedBuilder::new();
//! let feed = builder
//!     .build_feed(
//!         FeedType::Rss093,
//!         "Blog",
//!         "https://example.com",
//!         "Posts",
//!         posts,
//!         |title: &str| -> anyhow::Result<FeedEntry> { Ok(FeedEntry::new(title)) },
//!     )
//!     .unwrap();
//! let xml = builder.render(&feed).unwrap();
//! assert!(xml.contains("<title>World</title>"));
//! ```

pub mod config;
pub mod feed;
pub mod util;
