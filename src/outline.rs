//! Indented plain-text rendering of a parsed document.

use std::borrow::Cow;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::model::{Channel, Document, Feed, Link};

/// Renders the channel or feed header followed by one block per item or
/// entry. Feed-supplied text is stripped of control characters so it
/// cannot drive the terminal.
pub fn render(document: &Document) -> String {
    let mut out = String::new();
    match document {
        Document::Rss(channel) => render_channel(&mut out, channel),
        Document::Atom(feed) => render_feed(&mut out, feed),
    }
    out
}

fn render_channel(out: &mut String, channel: &Channel) {
    line(out, 0, "RSS", channel.title());
    line(out, 1, "link", channel.link());
    line(out, 1, "description", channel.description());
    opt(out, 1, "language", channel.language());
    date(out, 1, "published", channel.pub_date());
    date(out, 1, "last build", channel.last_build_date());
    if let Some(link) = channel.atom_link() {
        line(out, 1, "self", link.href());
    }
    if let Some(url) = channel.itunes().and_then(|itunes| itunes.new_feed_url()) {
        line(out, 1, "moved to", url);
    }
    if let Some(ttl) = channel.ttl() {
        line(out, 1, "ttl", &format!("{ttl} min"));
    }

    for (index, item) in channel.items().iter().enumerate() {
        let title = item.title().or(item.description()).unwrap_or("(untitled)");
        line(out, 1, &format!("item {}", index + 1), title);
        opt(out, 2, "link", item.link());
        opt(out, 2, "guid", item.guid().map(|guid| guid.value()));
        date(out, 2, "published", item.pub_date());
        if let Some(enclosure) = item.enclosure() {
            line(
                out,
                2,
                "enclosure",
                &format!("{} ({})", enclosure.url(), enclosure.media_type()),
            );
        }
    }
}

fn render_feed(out: &mut String, feed: &Feed) {
    line(out, 0, "Atom", feed.title().value());
    line(out, 1, "id", feed.id());
    opt(out, 1, "subtitle", feed.subtitle().map(|text| text.value()));
    date(out, 1, "updated", feed.updated());
    links(out, 1, feed.links());
    for author in feed.authors() {
        line(out, 1, "author", author.name());
    }

    for (index, entry) in feed.entries().iter().enumerate() {
        line(out, 1, &format!("entry {}", index + 1), entry.title().value());
        line(out, 2, "id", entry.id());
        date(out, 2, "updated", entry.updated());
        date(out, 2, "published", entry.published());
        links(out, 2, entry.links());
    }
}

fn links(out: &mut String, depth: usize, links: &[Link]) {
    for link in links {
        let label = match link.relation() {
            Some(relation) => format!("link ({})", relation.as_str()),
            None => "link".to_string(),
        };
        line(out, depth, &label, link.href());
    }
}

fn opt(out: &mut String, depth: usize, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        line(out, depth, label, value);
    }
}

fn date(out: &mut String, depth: usize, label: &str, value: Option<DateTime<Utc>>) {
    if let Some(value) = value {
        line(out, depth, label, &value.to_rfc3339());
    }
}

fn line(out: &mut String, depth: usize, label: &str, value: &str) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{:indent$}{label}: {}", "", sanitize(value), indent = depth * 2);
}

/// Drops control characters (ANSI escapes included) and folds line breaks
/// so each field stays on one line.
fn sanitize(value: &str) -> Cow<'_, str> {
    if !value.chars().any(char::is_control) {
        return Cow::Borrowed(value);
    }
    let folded: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\t' || c == '\r' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();
    Cow::Owned(folded)
}
