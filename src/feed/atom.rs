use chrono::{DateTime, Utc};

use super::datetime::parse_rfc3339;
use super::error::ParseError;
use super::shared::{degrade, parse_atom_category, parse_link, parse_person, parse_text};
use super::tree::Element;
use crate::model::{Category, Entry, Feed, Generator, Link, Person, Text};

/// Parses an Atom 1.0 document.
///
/// The feed needs an `id` and a `title`; an entry lacking either is
/// skipped and the rest of the feed is still returned.
pub fn parse_atom(content: &str) -> Result<Feed, ParseError> {
    let root = Element::parse(content)?;
    map_atom(&root)
}

pub(crate) fn map_atom(root: &Element) -> Result<Feed, ParseError> {
    if root.name() != "feed" {
        return Err(ParseError::UnsupportedFormat(root.name().to_string()));
    }

    let mut builder = FeedBuilder::default();
    let mut entry_index = 0;

    for child in root.children() {
        let path = format!("feed/{}", child.name());
        match child.name() {
            "entry" => {
                let entry_path = format!("feed/entry[{entry_index}]");
                entry_index += 1;
                match map_entry(child, &entry_path) {
                    Ok(entry) => builder.entries.push(entry),
                    Err(e) => tracing::warn!(error = %e, "Skipping Atom entry"),
                }
            }
            "generator" => builder.generator = Some(parse_generator(child)),
            "icon" => builder.icon = Some(child.text()),
            "logo" => builder.logo = Some(child.text()),
            "subtitle" => builder.subtitle = Some(parse_text(child)),
            _ => builder.common.accept(child, &path),
        }
    }

    let feed = builder.build()?;
    tracing::debug!(id = %feed.id, entries = feed.entries.len(), "Mapped Atom feed");
    Ok(feed)
}

fn map_entry(element: &Element, path: &str) -> Result<Entry, ParseError> {
    let mut builder = EntryBuilder::default();

    for child in element.children() {
        let child_path = format!("{path}/{}", child.name());
        match child.name() {
            "published" => builder.published = timestamp(child, &child_path),
            "summary" => builder.summary = Some(parse_text(child)),
            "content" => builder.content = Some(parse_text(child)),
            _ => builder.common.accept(child, &child_path),
        }
    }

    builder.build(path)
}

/// `generator`: product name in the text, optional `uri` and `version`.
fn parse_generator(element: &Element) -> Generator {
    Generator {
        value: element.text(),
        uri: element.attr("uri").map(str::to_string),
        version: element.attr("version").map(str::to_string),
    }
}

/// RFC 3339 timestamp that degrades to absent when unparsable.
fn timestamp(element: &Element, path: &str) -> Option<DateTime<Utc>> {
    degrade(
        parse_rfc3339(&element.text())
            .map_err(|_| ParseError::malformed(path, "an RFC 3339 timestamp")),
    )
}

/// Keeps a repeated child that parsed, logs and drops one that did not.
fn push_valid<T>(into: &mut Vec<T>, parsed: Result<T, ParseError>) {
    match parsed {
        Ok(value) => into.push(value),
        Err(e) => tracing::warn!(error = %e, "Skipping malformed Atom element"),
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Children shared by `feed` and `entry`.
#[derive(Default)]
struct CommonFields {
    id: Option<String>,
    title: Option<Text>,
    updated: Option<DateTime<Utc>>,
    authors: Vec<Person>,
    links: Vec<Link>,
    categories: Vec<Category>,
    contributors: Vec<Person>,
    rights: Option<Text>,
}

impl CommonFields {
    fn accept(&mut self, child: &Element, path: &str) {
        match child.name() {
            // Repeated singletons: the first usable occurrence wins.
            "id" if self.id.is_none() => self.id = Some(child.text()),
            "title" if self.title.is_none() => self.title = Some(parse_text(child)),
            "updated" if self.updated.is_none() => self.updated = timestamp(child, path),
            "author" => push_valid(&mut self.authors, parse_person(child, path)),
            "contributor" => push_valid(&mut self.contributors, parse_person(child, path)),
            "link" => push_valid(&mut self.links, parse_link(child, path)),
            "category" => push_valid(&mut self.categories, parse_atom_category(child, path)),
            "rights" if self.rights.is_none() => self.rights = Some(parse_text(child)),
            _ => {}
        }
    }
}

fn require<T>(value: Option<T>, path: &str, name: &str) -> Result<T, ParseError> {
    value.ok_or_else(|| ParseError::missing(format!("{path}/{name}")))
}

#[derive(Default)]
struct FeedBuilder {
    common: CommonFields,
    generator: Option<Generator>,
    icon: Option<String>,
    logo: Option<String>,
    subtitle: Option<Text>,
    entries: Vec<Entry>,
}

impl FeedBuilder {
    fn build(self) -> Result<Feed, ParseError> {
        let common = self.common;
        Ok(Feed {
            id: require(common.id, "feed", "id")?,
            title: require(common.title, "feed", "title")?,
            updated: common.updated,
            authors: common.authors,
            links: common.links,
            categories: common.categories,
            contributors: common.contributors,
            generator: self.generator,
            icon: self.icon,
            logo: self.logo,
            rights: common.rights,
            subtitle: self.subtitle,
            entries: self.entries,
        })
    }
}

#[derive(Default)]
struct EntryBuilder {
    common: CommonFields,
    published: Option<DateTime<Utc>>,
    summary: Option<Text>,
    content: Option<Text>,
}

impl EntryBuilder {
    fn build(self, path: &str) -> Result<Entry, ParseError> {
        let common = self.common;
        Ok(Entry {
            id: require(common.id, path, "id")?,
            title: require(common.title, path, "title")?,
            updated: common.updated,
            published: self.published,
            authors: common.authors,
            links: common.links,
            categories: common.categories,
            contributors: common.contributors,
            rights: common.rights,
            summary: self.summary,
            content: self.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Relation, TextType};
    use pretty_assertions::assert_eq;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <title type="html">Example &lt;b&gt;Feed&lt;/b&gt;</title>
  <subtitle>A subtitle.</subtitle>
  <updated>2003-12-13T18:30:02Z</updated>
  <link href="http://example.org/" rel="alternate"/>
  <link href="http://example.org/feed" rel="self" length="12"/>
  <author><name>John Doe</name><email>johndoe@example.com</email></author>
  <generator uri="http://example.com/gen" version="1.0">Generator</generator>
  <icon>http://example.org/icon.png</icon>
  <entry>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <title>Atom-Powered Robots Run Amok</title>
    <updated>2003-12-13T18:30:02+01:00</updated>
    <published>not a date</published>
    <category term="robots" scheme="http://example.org/tags" label="Robots"/>
    <summary>Some text.</summary>
    <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p>Hi <em>there</em></p></div></content>
  </entry>
</feed>"#;

    #[test]
    fn test_feed_fields() {
        let feed = parse_atom(FEED).unwrap();

        assert_eq!(feed.id(), "urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6");
        assert_eq!(feed.title().value(), "Example <b>Feed</b>");
        assert_eq!(feed.title().text_type(), TextType::Html);
        assert_eq!(feed.subtitle().map(Text::text_type), Some(TextType::Plain));
        assert_eq!(
            feed.updated().map(|t| t.to_rfc3339()),
            Some("2003-12-13T18:30:02+00:00".to_string())
        );
        assert_eq!(feed.links().len(), 2);
        assert_eq!(feed.links()[1].relation(), Some(Relation::SelfLink));
        assert_eq!(feed.links()[1].length(), Some(12));
        assert_eq!(feed.authors()[0].email(), Some("johndoe@example.com"));

        let generator = feed.generator().unwrap();
        assert_eq!(generator.value(), "Generator");
        assert_eq!(generator.version(), Some("1.0"));
        assert_eq!(feed.icon(), Some("http://example.org/icon.png"));
        assert_eq!(feed.logo(), None);
    }

    #[test]
    fn test_entry_fields() {
        let feed = parse_atom(FEED).unwrap();
        let entry = &feed.entries()[0];

        assert_eq!(entry.title().value(), "Atom-Powered Robots Run Amok");
        assert_eq!(
            entry.updated().map(|t| t.to_rfc3339()),
            Some("2003-12-13T17:30:02+00:00".to_string())
        );
        assert_eq!(entry.published(), None);
        assert_eq!(entry.categories()[0].label(), Some("Robots"));

        let content = entry.content().unwrap();
        assert_eq!(content.text_type(), TextType::Xhtml);
        assert_eq!(content.value(), "<p>Hi <em>there</em></p>");
    }

    #[test]
    fn test_entry_without_id_is_skipped() {
        let xml = r#"<feed><id>f</id><title>F</title>
<entry><title>No id</title></entry>
<entry><id>2</id><title>Kept</title></entry>
</feed>"#;
        let feed = parse_atom(xml).unwrap();
        assert_eq!(feed.entries().len(), 1);
        assert_eq!(feed.entries()[0].id(), "2");
    }

    #[test]
    fn test_bad_link_and_person_are_dropped() {
        let xml = r#"<feed><id>f</id><title>F</title>
<link rel="self"/><link href="http://x" rel="bogus"/>
<author><email>a@b</email></author><contributor><name>C</name></contributor>
<category scheme="s"/>
</feed>"#;
        let feed = parse_atom(xml).unwrap();
        assert_eq!(feed.links().len(), 1);
        assert_eq!(feed.links()[0].relation(), None);
        assert!(feed.authors().is_empty());
        assert_eq!(feed.contributors()[0].name(), "C");
        assert!(feed.categories().is_empty());
    }

    #[test]
    fn test_later_singletons_do_not_overwrite() {
        let xml = r#"<feed><id>f</id><title>F</title>
<updated>2003-12-13T18:30:02Z</updated><updated>junk</updated>
<rights>First</rights><rights>Second</rights>
<entry><id>e</id><title>E</title><updated>junk</updated><updated>2004-01-01T00:00:00Z</updated></entry>
</feed>"#;
        let feed = parse_atom(xml).unwrap();
        assert_eq!(
            feed.updated().map(|t| t.to_rfc3339()),
            Some("2003-12-13T18:30:02+00:00".to_string())
        );
        assert_eq!(feed.rights().map(Text::value), Some("First"));
        assert_eq!(
            feed.entries()[0].updated().map(|t| t.to_rfc3339()),
            Some("2004-01-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_first_id_wins() {
        let feed = parse_atom("<feed><id>one</id><id>two</id><title>t</title></feed>").unwrap();
        assert_eq!(feed.id(), "one");
    }

    #[test]
    fn test_missing_title_fails_document() {
        assert_eq!(
            parse_atom("<feed><id>x</id></feed>"),
            Err(ParseError::MissingRequiredField("feed/title".to_string()))
        );
    }

    #[test]
    fn test_rss_root_rejected() {
        assert_eq!(
            parse_atom("<rss/>"),
            Err(ParseError::UnsupportedFormat("rss".to_string()))
        );
    }
}
