use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// SEC-003: Maximum element nesting accepted while building the tree.
/// Syndication documents are shallow; anything deeper is hostile or broken.
const MAX_DEPTH: usize = 256;

/// Errors produced while turning markup into an [`Element`] tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// SEC-003: Nesting depth exceeds safety limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// The tokenizer rejected the input.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Start and end tags do not pair up.
    #[error("unbalanced XML: {0}")]
    Unbalanced(String),

    /// The document holds no root element.
    #[error("document has no root element")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

/// An owned XML element: qualified name, attributes in source order, and
/// mixed child content in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            nodes: Vec::new(),
        }
    }

    /// Parses a complete document and returns its root element.
    ///
    /// Comments, processing instructions and the DOCTYPE are dropped.
    /// SEC-002: `quick-xml` never reads `<!ENTITY>` declarations, so custom
    /// entity references are kept verbatim instead of being expanded.
    pub fn parse(content: &str) -> Result<Element, TreeError> {
        let mut reader = Reader::from_str(content);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(TreeError::MaxDepthExceeded(MAX_DEPTH));
                    }
                    stack.push(start_element(&e, &reader));
                }
                Ok(Event::Empty(e)) => {
                    let element = start_element(&e, &reader);
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(e)) => {
                    let Some(element) = stack.pop() else {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(TreeError::Unbalanced(format!("stray end tag </{name}>")));
                    };
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = match e.unescape() {
                            Ok(text) => text.into_owned(),
                            Err(err) => {
                                tracing::debug!(element = %parent.name, error = %err, "Keeping unknown entities literal");
                                unescape_lenient(&String::from_utf8_lossy(&e)).into_owned()
                            }
                        };
                        parent.nodes.push(Node::Text(text));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.nodes.push(Node::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(TreeError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(TreeError::Unbalanced(format!(
                "<{}> is never closed",
                open.name
            )));
        }

        root.ok_or(TreeError::Empty)
    }

    /// Qualified tag name, prefix included (`atom:link`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children().filter(move |child| child.name == name)
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|child| child.name == name)
    }

    /// Resolves a slash-separated path such as `channel/image/url`,
    /// following the first match at every step.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// Own text and CDATA content, concatenated and trimmed.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes {
            if let Node::Text(chunk) = node {
                text.push_str(chunk);
            }
        }
        text.trim().to_string()
    }

    /// Serialises the element's content (text and child markup) back to XML.
    ///
    /// Used for Atom `type="xhtml"` constructs whose value is markup rather
    /// than text.
    pub fn inner_xml(&self) -> Result<String, TreeError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        let bytes = writer.into_inner().into_inner();
        let xml = String::from_utf8(bytes).map_err(|e| TreeError::Xml(e.to_string()))?;
        Ok(xml.trim().to_string())
    }
}

fn start_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Element {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(element = %name, error = %err, "Skipping malformed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.decode_and_unescape_value(reader.decoder()) {
            Ok(value) => value.into_owned(),
            Err(_) => unescape_lenient(&String::from_utf8_lossy(&attr.value)).into_owned(),
        };
        attributes.push((key, value));
    }

    Element::new(name, attributes)
}

/// Decodes predefined and numeric character references one at a time.
/// Anything else (`&nbsp;`, DTD-declared names) is kept verbatim, so one
/// unknown name does not leave its neighbours encoded.
fn unescape_lenient(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let reference = &tail[..=end];
        match escape::unescape(reference) {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => out.push_str(reference),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), TreeError> {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(TreeError::Unbalanced(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

fn write_err(e: impl std::fmt::Display) -> TreeError {
    TreeError::Xml(e.to_string())
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &Node) -> Result<(), TreeError> {
    match node {
        Node::Text(text) => writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_err),
        Node::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in &element.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }

            if element.nodes.is_empty() {
                return writer.write_event(Event::Empty(start)).map_err(write_err);
            }

            writer.write_event(Event::Start(start)).map_err(write_err)?;
            for child in &element.nodes {
                write_node(writer, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(element.name.as_str())))
                .map_err(write_err)
        }
    }
}
