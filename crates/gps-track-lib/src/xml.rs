//! Minimal element tree built from quick-xml events
//!
//! Element and attribute names are stored by local name, so namespace
//! prefixes such as `gpxtpx:` or `ns3:` never affect matching.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;

#[derive(Debug, Default, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    /// Value of the attribute with this local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children with this local name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First descendant with this local name, depth first
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    /// Text content with surrounding whitespace removed
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Text content as a finite number
    pub fn number(&self) -> Option<f64> {
        parse_number(self.text())
    }
}

/// Parse a finite decimal number, ignoring surrounding whitespace
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a whole document into its root element
pub(crate) fn parse(data: &[u8]) -> Result<Element, String> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) => open.push(element(e)?),
            Ok(Event::Empty(ref e)) => {
                let child = element(e)?;
                attach(&mut open, &mut root, child)?;
            }
            Ok(Event::End(_)) => {
                let closed = open.pop().ok_or("unbalanced end tag")?;
                attach(&mut open, &mut root, closed)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(current) = open.last_mut() {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(_) => {}
        }

        buf.clear();
    }

    if !open.is_empty() {
        return Err("unexpected end of document".to_string());
    }

    root.ok_or_else(|| "empty XML".to_string())
}

/// Local name of the first element in the document, if it is well-formed up to there
pub(crate) fn root_name(data: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return Some(local_name(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
        buf.clear();
    }
}

fn element(start: &BytesStart<'_>) -> Result<Element, String> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let value = attribute.unescape_value().map_err(|e| e.to_string())?;
        attributes.push((
            local_name(attribute.key.local_name().as_ref()).into_owned(),
            value.into_owned(),
        ));
    }

    Ok(Element {
        name: local_name(start.local_name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), String> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("unexpected second root element '{}'", element.name)),
    }
    Ok(())
}

fn local_name(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(raw)
}
