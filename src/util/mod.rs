//! Utility functions shared by the feed builder and the CLI.
//!
//! - **Link validation**: feed links must be absolute, hierarchical URLs
//! - **XML text checks**: detect characters XML 1.0 cannot carry
//! - **Atomic writes**: write rendered feeds without leaving partial files
//!
//! # Examples
//!
//! ```
//! use feedsmith::util::{find_invalid_xml_char, validate_link};
//!
//! let url = validate_link("https://example.com/feed.xml").unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! assert_eq!(find_invalid_xml_char("ok"), None);
//! ```

mod fs;
mod text;
mod url_validator;

pub use fs::write_atomic;
pub use text::{find_invalid_xml_char, is_xml_char};
pub use url_validator::{validate_link, LinkError};
