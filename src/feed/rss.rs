use chrono::{DateTime, Utc};

use super::datetime::{parse_rfc822, DateTimeError};
use super::error::ParseError;
use super::shared::{
    degrade, optional_number, optional_text, parse_category, parse_cloud, parse_enclosure,
    parse_guid, parse_image, parse_link, parse_source, parse_text_input, required_text,
};
use super::tree::Element;
use crate::model::{Channel, Day, Item, Itunes, Link, Relation};

pub(crate) const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

const CHANNEL_PATH: &str = "rss/channel";

/// Parses an RSS 2.0 document.
///
/// Fails only when the tree cannot be built, the root is not `<rss>`, or
/// the channel lacks `title`, `link` or `description`. Every other defect
/// drops the affected field and keeps going.
pub fn parse_rss(content: &str) -> Result<Channel, ParseError> {
    let root = Element::parse(content)?;
    map_rss(&root)
}

pub(crate) fn map_rss(root: &Element) -> Result<Channel, ParseError> {
    if root.name() != "rss" {
        return Err(ParseError::UnsupportedFormat(root.name().to_string()));
    }

    let channel = root
        .child("channel")
        .ok_or_else(|| ParseError::missing(CHANNEL_PATH))?;

    let title = required_text(channel, "title", CHANNEL_PATH)?;
    let link = required_text(channel, "link", CHANNEL_PATH)?;
    let description = required_text(channel, "description", CHANNEL_PATH)?;

    let mut items = Vec::new();
    let mut categories = Vec::new();
    for child in channel.children() {
        match child.name() {
            "item" => items.push(map_item(child, items.len())),
            "category" => categories.push(parse_category(child)),
            _ => {}
        }
    }

    let mapped = Channel {
        title,
        link,
        description,
        language: optional_text(channel, "language"),
        copyright: optional_text(channel, "copyright"),
        managing_editor: optional_text(channel, "managingEditor"),
        web_master: optional_text(channel, "webMaster"),
        pub_date: date_field(channel, "pubDate", CHANNEL_PATH),
        last_build_date: date_field(channel, "lastBuildDate", CHANNEL_PATH),
        categories,
        generator: optional_text(channel, "generator"),
        docs: optional_text(channel, "docs"),
        cloud: channel
            .child("cloud")
            .and_then(|cloud| degrade(parse_cloud(cloud, "rss/channel/cloud"))),
        ttl: optional_number(
            optional_text(channel, "ttl").as_deref(),
            "rss/channel/ttl",
        ),
        image: channel
            .child("image")
            .and_then(|image| degrade(parse_image(image, "rss/channel/image"))),
        text_input: channel
            .child("textInput")
            .or_else(|| channel.child("textinput"))
            .and_then(|input| degrade(parse_text_input(input, "rss/channel/textInput"))),
        skip_hours: channel.child("skipHours").map(skip_hours).unwrap_or_default(),
        skip_days: channel.child("skipDays").map(skip_days).unwrap_or_default(),
        items,
        atom_link: declared_prefix(root, ATOM_NAMESPACE)
            .and_then(|prefix| embedded_atom_link(channel, prefix)),
        itunes: declared_prefix(root, ITUNES_NAMESPACE).map(|prefix| itunes(channel, prefix)),
    };

    tracing::debug!(
        title = %mapped.title,
        items = mapped.items.len(),
        "Mapped RSS channel"
    );
    Ok(mapped)
}

/// Maps one `item`. Nothing inside an item is required, so a defective
/// substructure only costs that field, never the item or its siblings.
fn map_item(item: &Element, index: usize) -> Item {
    let path = format!("{CHANNEL_PATH}/item[{index}]");

    Item {
        title: optional_text(item, "title"),
        link: optional_text(item, "link"),
        description: optional_text(item, "description"),
        author: optional_text(item, "author"),
        categories: item.children_named("category").map(parse_category).collect(),
        comments: optional_text(item, "comments"),
        enclosure: item
            .child("enclosure")
            .and_then(|enclosure| degrade(parse_enclosure(enclosure, &format!("{path}/enclosure")))),
        guid: item
            .child("guid")
            .map(|guid| parse_guid(guid, &format!("{path}/guid"))),
        pub_date: date_field(item, "pubDate", &path),
        source: item
            .child("source")
            .and_then(|source| degrade(parse_source(source, &format!("{path}/source")))),
    }
}

/// Prefix the root element binds to `uri` through an `xmlns:` declaration.
///
/// Extensions are keyed on this declaration rather than on element names:
/// a document that merely contains `<atom:link>` without declaring the Atom
/// namespace gets no embedded link.
pub(crate) fn declared_prefix<'a>(root: &'a Element, uri: &str) -> Option<&'a str> {
    root.attributes().find_map(|(key, value)| {
        key.strip_prefix("xmlns:")
            .filter(|prefix| !prefix.is_empty() && value == uri)
    })
}

/// The channel's `atom:link`, preferring the one that points at the feed itself.
fn embedded_atom_link(channel: &Element, prefix: &str) -> Option<Link> {
    let name = format!("{prefix}:link");
    let path = format!("{CHANNEL_PATH}/{name}");

    let links: Vec<Link> = channel
        .children_named(&name)
        .filter_map(|link| degrade(parse_link(link, &path)))
        .collect();

    let self_index = links
        .iter()
        .position(|link| link.relation() == Some(Relation::SelfLink))
        .unwrap_or(0);
    links.into_iter().nth(self_index)
}

fn itunes(channel: &Element, prefix: &str) -> Itunes {
    let field = |name: &str| optional_text(channel, &format!("{prefix}:{name}"));

    Itunes {
        new_feed_url: field("new-feed-url"),
        author: field("author"),
        summary: field("summary"),
        explicit: field("explicit").and_then(|raw| {
            match raw.to_ascii_lowercase().as_str() {
                "yes" | "true" | "explicit" => Some(true),
                "no" | "false" | "clean" => Some(false),
                _ => degrade(Err(ParseError::unknown(
                    format!("{CHANNEL_PATH}/{prefix}:explicit"),
                    raw.as_str(),
                ))),
            }
        }),
        image: channel
            .child(&format!("{prefix}:image"))
            .and_then(|image| image.attr("href"))
            .map(str::to_string),
    }
}

fn skip_hours(element: &Element) -> Vec<u8> {
    element
        .children_named("hour")
        .filter_map(|hour| {
            let path = "rss/channel/skipHours/hour";
            let parsed = super::shared::number::<u8>(&hour.text(), path)
                .and_then(|value| {
                    if value < 24 {
                        Ok(value)
                    } else {
                        Err(ParseError::malformed(path, "an hour between 0 and 23"))
                    }
                });
            degrade(parsed)
        })
        .collect()
}

/// Unrecognised day names are dropped rather than guessed.
fn skip_days(element: &Element) -> Vec<Day> {
    element
        .children_named("day")
        .filter_map(|day| {
            let name = day.text();
            let parsed = Day::from_name(&name)
                .ok_or_else(|| ParseError::unknown("rss/channel/skipDays/day", name));
            degrade(parsed)
        })
        .collect()
}

/// Optional RFC 822 date child; unparsable dates are treated as absent.
fn date_field(parent: &Element, name: &str, path: &str) -> Option<DateTime<Utc>> {
    let raw = optional_text(parent, name)?;
    let field_path = format!("{path}/{name}");

    let parsed = parse_rfc822(&raw).map_err(|e| match e {
        DateTimeError::UnknownZone(zone) => ParseError::unknown(field_path, zone),
        DateTimeError::Malformed(_) => ParseError::malformed(field_path, "an RFC 822 date"),
    });
    degrade(parsed)
}
