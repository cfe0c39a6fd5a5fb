//! Minimal lossless XML element tree on top of quick-xml.
//!
//! GPX files carry metadata, waypoints and vendor extensions the merger
//! never looks at. Reading them into this tree and writing the tree back
//! keeps that content intact.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;
use thiserror::Error;

/// Errors from XML reading and writing.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Document has no root element")]
    Empty,

    #[error("XML write error: {0}")]
    Write(String),
}

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

/// An element with its qualified name, ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an element holding a single text node.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Look up an attribute by its qualified name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First direct child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local_name)
    }

    /// Concatenated text and CDATA content of this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }
}

/// Strip a `prefix:` from a qualified name.
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn malformed(reader: &Reader<&[u8]>, e: impl std::fmt::Display) -> XmlError {
    XmlError::Malformed {
        position: reader.buffer_position(),
        message: e.to_string(),
    }
}

fn decode(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::Encoding(e.to_string()))
}

fn element_from_start(reader: &Reader<&[u8]>, start: &BytesStart) -> Result<XmlElement, XmlError> {
    let mut element = XmlElement::new(decode(start.name().as_ref())?);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(reader, e))?;
        let key = decode(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(reader, e))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

/// Local name of the document's root element.
///
/// Stops reading as soon as the root start tag is seen.
pub fn root_local_name(content: &str) -> Result<String, XmlError> {
    let mut reader = Reader::from_str(content);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return decode(e.local_name().as_ref());
            }
            Ok(Event::Eof) => return Err(XmlError::Empty),
            Ok(_) => {}
            Err(e) => return Err(malformed(&reader, e)),
        }
    }
}

/// Parse a whole document into its root element.
///
/// Whitespace-only text is dropped; the XML declaration, processing
/// instructions and doctype are not kept.
pub fn parse_document(content: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    // Open elements, innermost last.
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| malformed(&reader, e))?;

        match event {
            Event::Start(ref e) => {
                stack.push(element_from_start(&reader, e)?);
            }
            Event::Empty(ref e) => {
                let element = element_from_start(&reader, e)?;
                match stack.last_mut() {
                    Some(parent) => parent.push(element),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end tags.
                let Some(element) = stack.pop() else {
                    return Err(malformed(&reader, "unexpected end tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(ref e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| malformed(&reader, err))?;
                    parent.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::CData(decode(&e.into_inner())?));
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Comment(decode(&e.into_inner())?));
                }
            }
            Event::Eof => {
                return Err(if stack.is_empty() {
                    XmlError::Empty
                } else {
                    malformed(&reader, "unexpected end of document")
                });
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

/// Serialize a root element as a standalone UTF-8 document.
pub fn write_document(root: &XmlElement) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    write_element(&mut writer, root)?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| XmlError::Encoding(e.to_string()))
}

/// Write one element and its subtree.
pub fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    for child in &element.children {
        let event = match child {
            XmlNode::Element(e) => {
                write_element(writer, e)?;
                continue;
            }
            XmlNode::Text(t) => Event::Text(BytesText::new(t)),
            XmlNode::CData(t) => Event::CData(BytesCData::new(t.as_str())),
            XmlNode::Comment(t) => Event::Comment(BytesText::from_escaped(t.as_str())),
        };
        writer
            .write_event(event)
            .map_err(|e| XmlError::Write(e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}
