use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::{Category, Link, Person, Text};

/// Software that produced an Atom feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generator {
    pub(crate) value: String,
    pub(crate) uri: Option<String>,
    pub(crate) version: Option<String>,
}

impl Generator {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub(crate) id: String,
    pub(crate) title: Text,
    pub(crate) updated: Option<DateTime<Utc>>,
    pub(crate) published: Option<DateTime<Utc>>,
    pub(crate) authors: Vec<Person>,
    pub(crate) links: Vec<Link>,
    pub(crate) categories: Vec<Category>,
    pub(crate) contributors: Vec<Person>,
    pub(crate) rights: Option<Text>,
    pub(crate) summary: Option<Text>,
    pub(crate) content: Option<Text>,
}

impl Entry {
    /// Universally unique, permanent identifier of the entry.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &Text {
        &self.title
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn contributors(&self) -> &[Person] {
        &self.contributors
    }

    pub fn rights(&self) -> Option<&Text> {
        self.rights.as_ref()
    }

    pub fn summary(&self) -> Option<&Text> {
        self.summary.as_ref()
    }

    pub fn content(&self) -> Option<&Text> {
        self.content.as_ref()
    }
}

/// The Atom `feed` record with its entries in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    pub(crate) id: String,
    pub(crate) title: Text,
    pub(crate) updated: Option<DateTime<Utc>>,
    pub(crate) authors: Vec<Person>,
    pub(crate) links: Vec<Link>,
    pub(crate) categories: Vec<Category>,
    pub(crate) contributors: Vec<Person>,
    pub(crate) generator: Option<Generator>,
    pub(crate) icon: Option<String>,
    pub(crate) logo: Option<String>,
    pub(crate) rights: Option<Text>,
    pub(crate) subtitle: Option<Text>,
    pub(crate) entries: Vec<Entry>,
}

impl Feed {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &Text {
        &self.title
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn contributors(&self) -> &[Person] {
        &self.contributors
    }

    pub fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    /// Small square image identifying the feed.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Larger image, twice as wide as tall.
    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    pub fn rights(&self) -> Option<&Text> {
        self.rights.as_ref()
    }

    pub fn subtitle(&self) -> Option<&Text> {
        self.subtitle.as_ref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}
