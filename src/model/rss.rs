use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::{Category, Enclosure, Guid, Image, Link, Source};

/// Transport used to register with an rssCloud server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    XmlRpc,
    Soap,
    HttpPost,
}

impl Protocol {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "xml-rpc" => Some(Protocol::XmlRpc),
            "soap" => Some(Protocol::Soap),
            "http-post" => Some(Protocol::HttpPost),
            _ => None,
        }
    }
}

/// rssCloud endpoint for lightweight publish-subscribe notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cloud {
    pub(crate) domain: String,
    pub(crate) port: u16,
    pub(crate) path: String,
    pub(crate) register_procedure: String,
    pub(crate) protocol: Protocol,
}

impl Cloud {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn register_procedure(&self) -> &str {
        &self.register_procedure
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }
}

/// A text input box displayed with the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInput {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) name: String,
    pub(crate) link: String,
}

impl TextInput {
    /// Label of the submit button.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Name of the text object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL of the script that processes the input.
    pub fn link(&self) -> &str {
        &self.link
    }
}

/// A weekday in GMT, as listed in `skipDays`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Matches an English weekday name case-sensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Monday" => Some(Day::Monday),
            "Tuesday" => Some(Day::Tuesday),
            "Wednesday" => Some(Day::Wednesday),
            "Thursday" => Some(Day::Thursday),
            "Friday" => Some(Day::Friday),
            "Saturday" => Some(Day::Saturday),
            "Sunday" => Some(Day::Sunday),
            _ => None,
        }
    }
}

/// Channel-level iTunes podcast extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Itunes {
    pub(crate) new_feed_url: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) summary: Option<String>,
    pub(crate) explicit: Option<bool>,
    pub(crate) image: Option<String>,
}

impl Itunes {
    /// Where the podcast has moved to.
    pub fn new_feed_url(&self) -> Option<&str> {
        self.new_feed_url.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn explicit(&self) -> Option<bool> {
        self.explicit
    }

    /// Artwork URL from `itunes:image/@href`.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

/// One RSS item. Every field is optional; well-formed feeds carry at least
/// a title or a description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    pub(crate) title: Option<String>,
    pub(crate) link: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) categories: Vec<Category>,
    pub(crate) comments: Option<String>,
    pub(crate) enclosure: Option<Enclosure>,
    pub(crate) guid: Option<Guid>,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) source: Option<Source>,
}

impl Item {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// The item synopsis.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Email address of the author.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// URL of a page for comments relating to the item.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn enclosure(&self) -> Option<&Enclosure> {
        self.enclosure.as_ref()
    }

    pub fn guid(&self) -> Option<&Guid> {
        self.guid.as_ref()
    }

    pub fn pub_date(&self) -> Option<DateTime<Utc>> {
        self.pub_date
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }
}

/// The `rss/channel` record with its items in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub(crate) title: String,
    pub(crate) link: String,
    pub(crate) description: String,
    pub(crate) language: Option<String>,
    pub(crate) copyright: Option<String>,
    pub(crate) managing_editor: Option<String>,
    pub(crate) web_master: Option<String>,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) last_build_date: Option<DateTime<Utc>>,
    pub(crate) categories: Vec<Category>,
    pub(crate) generator: Option<String>,
    pub(crate) docs: Option<String>,
    pub(crate) cloud: Option<Cloud>,
    pub(crate) ttl: Option<u32>,
    pub(crate) image: Option<Image>,
    pub(crate) text_input: Option<TextInput>,
    pub(crate) skip_hours: Vec<u8>,
    pub(crate) skip_days: Vec<Day>,
    pub(crate) items: Vec<Item>,
    pub(crate) atom_link: Option<Link>,
    pub(crate) itunes: Option<Itunes>,
}

impl Channel {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// URL of the website the channel corresponds to.
    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    pub fn managing_editor(&self) -> Option<&str> {
        self.managing_editor.as_deref()
    }

    pub fn web_master(&self) -> Option<&str> {
        self.web_master.as_deref()
    }

    pub fn pub_date(&self) -> Option<DateTime<Utc>> {
        self.pub_date
    }

    pub fn last_build_date(&self) -> Option<DateTime<Utc>> {
        self.last_build_date
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn generator(&self) -> Option<&str> {
        self.generator.as_deref()
    }

    /// URL of the documentation for the format.
    pub fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    pub fn cloud(&self) -> Option<&Cloud> {
        self.cloud.as_ref()
    }

    /// Minutes the channel may be cached before refreshing.
    pub fn ttl(&self) -> Option<u32> {
        self.ttl
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn text_input(&self) -> Option<&TextInput> {
        self.text_input.as_ref()
    }

    /// Hours (GMT, 0-23) aggregators may skip.
    pub fn skip_hours(&self) -> &[u8] {
        &self.skip_hours
    }

    pub fn skip_days(&self) -> &[Day] {
        &self.skip_days
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Embedded `atom:link`, only read when the root declares the Atom namespace.
    pub fn atom_link(&self) -> Option<&Link> {
        self.atom_link.as_ref()
    }

    /// iTunes block, only present when the root declares the iTunes namespace.
    pub fn itunes(&self) -> Option<&Itunes> {
        self.itunes.as_ref()
    }
}
