//! Typed, immutable results of feed parsing.
//!
//! Values are only constructed by the mappers in [`crate::feed`]; callers
//! read them through accessors. Every type derives `Serialize` so the CLI
//! can emit JSON.

mod atom;
mod rss;
mod shared;

use serde::Serialize;

pub use atom::{Entry, Feed, Generator};
pub use rss::{Channel, Cloud, Day, Item, Itunes, Protocol, TextInput};
pub use shared::{Category, Enclosure, Guid, Image, Link, Person, Relation, Source, Text, TextType};

/// A parsed syndication document of either dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "document", rename_all = "lowercase")]
pub enum Document {
    Rss(Channel),
    Atom(Feed),
}

impl Document {
    /// Channel or feed title as plain text.
    pub fn title(&self) -> &str {
        match self {
            Document::Rss(channel) => channel.title(),
            Document::Atom(feed) => feed.title().value(),
        }
    }

    /// Number of items or entries.
    pub fn len(&self) -> usize {
        match self {
            Document::Rss(channel) => channel.items().len(),
            Document::Atom(feed) => feed.entries().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
