//! Feed normalization: RSS 2.0 and Atom documents into typed models.
//!
//! The engine is synchronous and performs no I/O. Raw text goes through the
//! element tree in [`tree`], then through the mapper for the dialect its
//! root element names:
//!
//! - [`rss`] - `rss/channel` into a [`Channel`](crate::model::Channel)
//! - [`atom`] - `feed` into a [`Feed`](crate::model::Feed)
//! - [`shared`] - link, category, person, text, image, enclosure and the
//!   other substructures both dialects (or RSS alone) reuse
//! - [`datetime`] - RFC 822 dates with symbolic zones
//!
//! Retrieval over HTTP lives in the separate fetch adapter
//! ([`fetch_document`]).
//!
//! # Example
//!
//! ```
//! use sift::feed::parse;
//! use sift::model::Document;
//!
//! let xml = r#"<rss version="2.0"><channel>
//!   <title>Example</title><link>http://example.com/</link>
//!   <description>An example channel</description>
//! </channel></rss>"#;
//!
//! let document = parse(xml).unwrap();
//! assert!(matches!(document, Document::Rss(_)));
//! assert_eq!(document.title(), "Example");
//! ```

pub mod atom;
pub mod datetime;
mod error;
mod fetcher;
pub mod rss;
pub mod shared;
pub mod tree;

pub use atom::parse_atom;
pub use datetime::{parse_rfc3339, parse_rfc822, DateTimeError};
pub use error::ParseError;
pub use fetcher::{build_client, fetch_document, validate_url, FetchError};
pub use rss::parse_rss;
pub use tree::{Element, TreeError};

use crate::model::Document;

/// Parses a document of either dialect, chosen by its root element.
///
/// # Errors
///
/// - [`ParseError::TreeStructure`] - the text is not well-formed XML
/// - [`ParseError::UnsupportedFormat`] - the root is neither `rss` nor `feed`
/// - [`ParseError::MissingRequiredField`] - a document-level required
///   field is absent
pub fn parse(content: &str) -> Result<Document, ParseError> {
    let root = Element::parse(content)?;

    match root.name() {
        "rss" => rss::map_rss(&root).map(Document::Rss),
        "feed" => atom::map_atom(&root).map(Document::Atom),
        other => Err(ParseError::UnsupportedFormat(other.to_string())),
    }
}
