use serde::Serialize;

/// Encoding of an Atom text construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    #[default]
    Plain,
    Html,
    Xhtml,
}

impl TextType {
    /// Classifies a `type` attribute. Absent or unrecognised values are plain.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("html") => TextType::Html,
            Some("xhtml") => TextType::Xhtml,
            _ => TextType::Plain,
        }
    }
}

/// A value tagged with its [`TextType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub(crate) value: String,
    #[serde(rename = "type")]
    pub(crate) text_type: TextType,
}

impl Text {
    pub fn new(value: impl Into<String>, text_type: TextType) -> Self {
        Self {
            value: value.into(),
            text_type,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn text_type(&self) -> TextType {
        self.text_type
    }
}

/// An Atom person construct (`author`, `contributor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) uri: Option<String>,
}

impl Person {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

/// A category from either dialect.
///
/// RSS stores the term as element text and the taxonomy in `domain`; Atom
/// uses the `term`, `scheme` and `label` attributes. Both land here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub(crate) term: String,
    pub(crate) scheme: Option<String>,
    pub(crate) label: Option<String>,
}

impl Category {
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Categorisation taxonomy (`domain` in RSS, `scheme` in Atom).
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Human-readable label. Atom only.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Role of a link relative to the element that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// An alternate representation, such as the web page for an entry.
    Alternate,
    /// A media object such as an audio or video file.
    Enclosure,
    Related,
    /// The document itself.
    #[serde(rename = "self")]
    SelfLink,
    /// The original source, when it is not the publisher.
    Via,
}

impl Relation {
    /// Matches a `rel` token case-sensitively. Unknown tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "alternate" => Some(Relation::Alternate),
            "enclosure" => Some(Relation::Enclosure),
            "related" => Some(Relation::Related),
            "self" => Some(Relation::SelfLink),
            "via" => Some(Relation::Via),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Alternate => "alternate",
            Relation::Enclosure => "enclosure",
            Relation::Related => "related",
            Relation::SelfLink => "self",
            Relation::Via => "via",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub(crate) href: String,
    pub(crate) href_lang: Option<String>,
    pub(crate) length: Option<u64>,
    pub(crate) title: Option<String>,
    pub(crate) media_type: Option<String>,
    pub(crate) relation: Option<Relation>,
}

impl Link {
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn href_lang(&self) -> Option<&str> {
        self.href_lang.as_deref()
    }

    /// Size of the linked resource in bytes.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// MIME type of the linked resource.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn relation(&self) -> Option<Relation> {
        self.relation
    }
}

/// A GIF, JPEG or PNG image displayed with a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub(crate) url: String,
    pub(crate) title: String,
    pub(crate) link: String,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) description: Option<String>,
}

impl Image {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A media object attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enclosure {
    pub(crate) url: String,
    pub(crate) media_type: String,
    pub(crate) length: Option<u64>,
}

impl Enclosure {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size in bytes.
    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guid {
    pub(crate) value: String,
    pub(crate) is_permalink: bool,
}

impl Guid {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When false, the value may not be assumed to be a URL.
    pub fn is_permalink(&self) -> bool {
        self.is_permalink
    }
}

/// The RSS channel an item was republished from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub(crate) value: String,
    pub(crate) url: String,
}

impl Source {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
