//! Parsers for node shapes that recur across both dialects.
//!
//! Every parser takes the element positioned at the substructure plus the
//! path of that element (for error messages) and either returns the typed
//! value or a [`ParseError`] naming the missing or malformed piece. Whether
//! that error is fatal is decided by the caller.

use std::str::FromStr;

use super::error::ParseError;
use super::tree::Element;
use crate::model::{
    Category, Cloud, Enclosure, Guid, Image, Link, Person, Protocol, Relation, Source, Text,
    TextInput, TextType,
};

/// Text of the first child named `name`, if the child exists.
pub(crate) fn optional_text(parent: &Element, name: &str) -> Option<String> {
    parent.child(name).map(Element::text)
}

pub(crate) fn required_text(
    parent: &Element,
    name: &str,
    path: &str,
) -> Result<String, ParseError> {
    optional_text(parent, name).ok_or_else(|| ParseError::missing(format!("{path}/{name}")))
}

pub(crate) fn required_attr(
    element: &Element,
    name: &str,
    path: &str,
) -> Result<String, ParseError> {
    element
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| ParseError::missing(format!("{path}/@{name}")))
}

/// Parses a numeric value, reporting the location when it is not a number.
pub(crate) fn number<T: FromStr>(raw: &str, path: &str) -> Result<T, ParseError> {
    raw.trim()
        .parse()
        .map_err(|_| ParseError::malformed(path, "a non-negative integer"))
}

/// Numeric child or attribute that degrades to `None` when malformed.
pub(crate) fn optional_number<T: FromStr>(raw: Option<&str>, path: &str) -> Option<T> {
    raw.and_then(|raw| degrade(number(raw, path)))
}

/// Turns a field-level failure into "absent", leaving a trace of why.
pub(crate) fn degrade<T>(result: Result<T, ParseError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Treating optional field as absent");
            None
        }
    }
}

/// RSS `category`: term in the text, taxonomy in `domain`.
pub fn parse_category(element: &Element) -> Category {
    Category {
        term: element.text(),
        scheme: element.attr("domain").map(str::to_string),
        label: None,
    }
}

/// Atom `category`: `term` is required, `scheme` and `label` are not.
pub fn parse_atom_category(element: &Element, path: &str) -> Result<Category, ParseError> {
    Ok(Category {
        term: required_attr(element, "term", path)?,
        scheme: element.attr("scheme").map(str::to_string),
        label: element.attr("label").map(str::to_string),
    })
}

/// Atom `link` (also used for `atom:link` embedded in RSS).
///
/// A `rel` outside the known vocabulary leaves the relation empty; a
/// non-numeric `length` is dropped. Neither aborts the link.
pub fn parse_link(element: &Element, path: &str) -> Result<Link, ParseError> {
    let href = required_attr(element, "href", path)?;

    let relation = element.attr("rel").and_then(|rel| {
        let relation = Relation::from_token(rel);
        if relation.is_none() {
            tracing::debug!(
                error = %ParseError::unknown(format!("{path}/@rel"), rel),
                "Ignoring link relation"
            );
        }
        relation
    });

    Ok(Link {
        href,
        href_lang: element.attr("hreflang").map(str::to_string),
        length: optional_number(element.attr("length"), &format!("{path}/@length")),
        title: element.attr("title").map(str::to_string),
        media_type: element.attr("type").map(str::to_string),
        relation,
    })
}

/// Atom person construct (`author`, `contributor`).
pub fn parse_person(element: &Element, path: &str) -> Result<Person, ParseError> {
    Ok(Person {
        name: required_text(element, "name", path)?,
        email: optional_text(element, "email"),
        uri: optional_text(element, "uri"),
    })
}

/// Atom text construct. `type="xhtml"` keeps the markup of the wrapping
/// `div`'s content instead of flattening it to text.
pub fn parse_text(element: &Element) -> Text {
    let text_type = TextType::from_attr(element.attr("type"));

    let value = match text_type {
        TextType::Xhtml => {
            let wrapper = element
                .children()
                .find(|child| child.name() == "div" || child.name().ends_with(":div"));
            match wrapper.unwrap_or(element).inner_xml() {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::debug!(error = %e, "Falling back to text for xhtml content");
                    element.text()
                }
            }
        }
        TextType::Plain | TextType::Html => element.text(),
    };

    Text { value, text_type }
}

pub fn parse_image(element: &Element, path: &str) -> Result<Image, ParseError> {
    Ok(Image {
        url: required_text(element, "url", path)?,
        title: required_text(element, "title", path)?,
        link: required_text(element, "link", path)?,
        width: optional_number(
            optional_text(element, "width").as_deref(),
            &format!("{path}/width"),
        ),
        height: optional_number(
            optional_text(element, "height").as_deref(),
            &format!("{path}/height"),
        ),
        description: optional_text(element, "description"),
    })
}

pub fn parse_enclosure(element: &Element, path: &str) -> Result<Enclosure, ParseError> {
    Ok(Enclosure {
        url: required_attr(element, "url", path)?,
        media_type: required_attr(element, "type", path)?,
        length: optional_number(element.attr("length"), &format!("{path}/@length")),
    })
}

/// `isPermaLink` defaults to true when absent or unreadable.
pub fn parse_guid(element: &Element, path: &str) -> Guid {
    let is_permalink = match element.attr("isPermaLink").map(str::trim) {
        None => true,
        Some(flag) if flag.eq_ignore_ascii_case("true") => true,
        Some(flag) if flag.eq_ignore_ascii_case("false") => false,
        Some(flag) => {
            tracing::debug!(
                error = %ParseError::unknown(format!("{path}/@isPermaLink"), flag),
                "Assuming permalink guid"
            );
            true
        }
    };

    Guid {
        value: element.text(),
        is_permalink,
    }
}

pub fn parse_source(element: &Element, path: &str) -> Result<Source, ParseError> {
    Ok(Source {
        value: element.text(),
        url: required_attr(element, "url", path)?,
    })
}

/// rssCloud registration endpoint. Every attribute is required and the
/// protocol must be one of the known transports.
pub fn parse_cloud(element: &Element, path: &str) -> Result<Cloud, ParseError> {
    let port_path = format!("{path}/@port");
    let port = number(&required_attr(element, "port", path)?, &port_path)?;

    let raw_protocol = required_attr(element, "protocol", path)?;
    let protocol = Protocol::from_token(&raw_protocol)
        .ok_or_else(|| ParseError::unknown(format!("{path}/@protocol"), raw_protocol))?;

    Ok(Cloud {
        domain: required_attr(element, "domain", path)?,
        port,
        path: required_attr(element, "path", path)?,
        register_procedure: required_attr(element, "registerProcedure", path)?,
        protocol,
    })
}

pub fn parse_text_input(element: &Element, path: &str) -> Result<TextInput, ParseError> {
    Ok(TextInput {
        title: required_text(element, "title", path)?,
        description: required_text(element, "description", path)?,
        name: required_text(element, "name", path)?,
        link: required_text(element, "link", path)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(xml: &str) -> Element {
        Element::parse(xml).unwrap()
    }

    #[test]
    fn test_link_with_all_attributes() {
        let link = parse_link(
            &element(
                r#"<link href="https://example.com/a.mp3" hreflang="en" length="1024" title="Episode" type="audio/mpeg" rel="enclosure"/>"#,
            ),
            "feed/link",
        )
        .unwrap();

        assert_eq!(link.href(), "https://example.com/a.mp3");
        assert_eq!(link.href_lang(), Some("en"));
        assert_eq!(link.length(), Some(1024));
        assert_eq!(link.title(), Some("Episode"));
        assert_eq!(link.media_type(), Some("audio/mpeg"));
        assert_eq!(link.relation(), Some(Relation::Enclosure));
    }

    #[test]
    fn test_link_relation_self() {
        let link = parse_link(&element(r#"<link href="x" rel="self"/>"#), "l").unwrap();
        assert_eq!(link.relation(), Some(Relation::SelfLink));
    }

    #[test]
    fn test_link_without_rel_has_no_relation() {
        let link = parse_link(&element(r#"<link href="x"/>"#), "l").unwrap();
        assert_eq!(link.relation(), None);
    }

    #[test]
    fn test_link_unknown_or_miscased_rel_is_absent() {
        for rel in ["hub", "Self", "edit"] {
            let xml = format!(r#"<link href="x" rel="{rel}"/>"#);
            let link = parse_link(&element(&xml), "l").unwrap();
            assert_eq!(link.relation(), None, "rel {rel}");
        }
    }

    #[test]
    fn test_link_bad_length_dropped() {
        let link = parse_link(&element(r#"<link href="x" length="big"/>"#), "l").unwrap();
        assert_eq!(link.length(), None);
        assert_eq!(link.href(), "x");
    }

    #[test]
    fn test_link_missing_href() {
        assert_eq!(
            parse_link(&element(r#"<link rel="self"/>"#), "feed/link"),
            Err(ParseError::MissingRequiredField("feed/link/@href".to_string()))
        );
    }

    #[test]
    fn test_rss_category() {
        let category = parse_category(&element(
            r#"<category domain="http://www.fool.com/cusips">MSFT</category>"#,
        ));
        assert_eq!(category.term(), "MSFT");
        assert_eq!(category.scheme(), Some("http://www.fool.com/cusips"));
        assert_eq!(category.label(), None);
    }

    #[test]
    fn test_atom_category_requires_term() {
        let category = parse_atom_category(
            &element(r#"<category term="rust" scheme="tags" label="Rust"/>"#),
            "c",
        )
        .unwrap();
        assert_eq!(category.term(), "rust");
        assert_eq!(category.label(), Some("Rust"));

        assert!(parse_atom_category(&element(r#"<category label="x"/>"#), "c").is_err());
    }

    #[test]
    fn test_person() {
        let person = parse_person(
            &element("<author><name>Mark</name><email>m@example.org</email></author>"),
            "feed/author",
        )
        .unwrap();
        assert_eq!(person.name(), "Mark");
        assert_eq!(person.email(), Some("m@example.org"));
        assert_eq!(person.uri(), None);

        assert_eq!(
            parse_person(&element("<author><email>x</email></author>"), "feed/author"),
            Err(ParseError::MissingRequiredField("feed/author/name".to_string()))
        );
    }

    #[test]
    fn test_text_types() {
        let plain = parse_text(&element("<title>Hello</title>"));
        assert_eq!(plain, Text::new("Hello", TextType::Plain));

        let html = parse_text(&element(r#"<title type="html">&lt;b&gt;Hi&lt;/b&gt;</title>"#));
        assert_eq!(html, Text::new("<b>Hi</b>", TextType::Html));

        let other = parse_text(&element(r#"<title type="text/markdown">x</title>"#));
        assert_eq!(other.text_type(), TextType::Plain);
    }

    #[test]
    fn test_xhtml_text_keeps_markup_inside_div() {
        let text = parse_text(&element(
            r#"<summary type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">A <em>b</em></div></summary>"#,
        ));
        assert_eq!(text.text_type(), TextType::Xhtml);
        assert_eq!(text.value(), "A <em>b</em>");
    }

    #[test]
    fn test_image() {
        let image = parse_image(
            &element(
                "<image><url>http://x/i.png</url><title>T</title><link>http://x</link><width>88</width><height>tall</height></image>",
            ),
            "rss/channel/image",
        )
        .unwrap();
        assert_eq!(image.url(), "http://x/i.png");
        assert_eq!(image.width(), Some(88));
        assert_eq!(image.height(), None);
        assert_eq!(image.description(), None);

        assert_eq!(
            parse_image(&element("<image><url>u</url><title>t</title></image>"), "rss/channel/image"),
            Err(ParseError::MissingRequiredField("rss/channel/image/link".to_string()))
        );
    }

    #[test]
    fn test_enclosure() {
        let enclosure = parse_enclosure(
            &element(r#"<enclosure url="http://x/a.mp3" length="12216320" type="audio/mpeg"/>"#),
            "item/enclosure",
        )
        .unwrap();
        assert_eq!(enclosure.url(), "http://x/a.mp3");
        assert_eq!(enclosure.length(), Some(12_216_320));
        assert_eq!(enclosure.media_type(), "audio/mpeg");

        assert_eq!(
            parse_enclosure(&element(r#"<enclosure url="http://x/a.mp3"/>"#), "item/enclosure"),
            Err(ParseError::MissingRequiredField("item/enclosure/@type".to_string()))
        );
    }

    #[test]
    fn test_guid_permalink_flag() {
        let guid = parse_guid(&element(r#"<guid isPermaLink="false">abc</guid>"#), "g");
        assert_eq!(guid.value(), "abc");
        assert!(!guid.is_permalink());

        assert!(parse_guid(&element("<guid>http://x/1</guid>"), "g").is_permalink());
        assert!(parse_guid(&element(r#"<guid isPermaLink="maybe">x</guid>"#), "g").is_permalink());
    }

    #[test]
    fn test_source_requires_url() {
        let source = parse_source(
            &element(r#"<source url="http://www.tomalak.org/links2.xml">Tomalak's Realm</source>"#),
            "item/source",
        )
        .unwrap();
        assert_eq!(source.value(), "Tomalak's Realm");
        assert_eq!(source.url(), "http://www.tomalak.org/links2.xml");

        assert!(parse_source(&element("<source>x</source>"), "item/source").is_err());
    }

    #[test]
    fn test_cloud() {
        let cloud = parse_cloud(
            &element(
                r#"<cloud domain="rpc.sys.com" port="80" path="/RPC2" registerProcedure="pingMe" protocol="soap"/>"#,
            ),
            "rss/channel/cloud",
        )
        .unwrap();
        assert_eq!(cloud.domain(), "rpc.sys.com");
        assert_eq!(cloud.port(), 80);
        assert_eq!(cloud.path(), "/RPC2");
        assert_eq!(cloud.register_procedure(), "pingMe");
        assert_eq!(cloud.protocol(), Protocol::Soap);
    }

    #[test]
    fn test_cloud_rejects_unknown_protocol_and_bad_port() {
        let unknown = parse_cloud(
            &element(
                r#"<cloud domain="d" port="80" path="/" registerProcedure="p" protocol="carrier-pigeon"/>"#,
            ),
            "c",
        );
        assert_eq!(
            unknown,
            Err(ParseError::UnknownEnumValue {
                path: "c/@protocol".to_string(),
                raw: "carrier-pigeon".to_string(),
            })
        );

        let bad_port = parse_cloud(
            &element(
                r#"<cloud domain="d" port="eighty" path="/" registerProcedure="p" protocol="xml-rpc"/>"#,
            ),
            "c",
        );
        assert!(matches!(bad_port, Err(ParseError::MalformedValue { .. })));
    }

    #[test]
    fn test_text_input() {
        let input = parse_text_input(
            &element(
                "<textInput><title>Go</title><description>Search</description><name>q</name><link>http://x/s</link></textInput>",
            ),
            "rss/channel/textInput",
        )
        .unwrap();
        assert_eq!(input.title(), "Go");
        assert_eq!(input.name(), "q");
    }
}
