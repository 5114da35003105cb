use thiserror::Error;
use url::Url;

/// Errors that can occur while validating a feed link.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The link could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The link is an opaque URI (`mailto:`, `urn:`) rather than a locator.
    #[error("Not a hierarchical URL: {0}")]
    NotHierarchical(String),
}

/// Validates a feed link.
///
/// Feed readers resolve entry links and follow the channel link, so the
/// link must be an absolute URL with an authority part. Any scheme is
/// accepted; relative references and opaque URIs are rejected.
///
/// # Examples
///
/// ```
/// use feedsmith::util::validate_link;
///
/// let url = validate_link("https://example.com/feed.xml").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_link("/relative/feed.xml").is_err());
/// assert!(validate_link("mailto:josh@example.com").is_err());
/// ```
pub fn validate_link(link: &str) -> Result<Url, LinkError> {
    let url = Url::parse(link.trim())?;

    if url.cannot_be_a_base() {
        return Err(LinkError::NotHierarchical(link.to_owned()));
    }

    Ok(url)
}
