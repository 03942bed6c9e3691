// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Minimal XML element tree
///
/// Manifests are small, so they are read into a tree once with quick_xml and
/// walked by the section loader and menu builder. Text content is dropped;
/// every manifest format here is attribute-driven.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a whole document and return its root element
    pub fn parse(xml: &str) -> Result<XmlElement, String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let element = Self::from_start(e)
                        .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;
                    stack.push(element);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)
                        .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or("unbalanced end tag")?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    let pos = reader.buffer_position();
                    return Err(format!("XML parse error at byte {}: {}", pos, e));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(format!("unexpected EOF in {}", open.name));
        }

        root.ok_or_else(|| "document has no root element".to_string())
    }

    fn from_start(e: &BytesStart) -> Result<XmlElement, String> {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let mut attrs = Vec::new();

        for attr in e.attributes() {
            let attr = attr.map_err(|e| format!("attribute error: {}", e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()
                .map_err(|e| format!("attribute {} error: {}", key, e))?
                .into_owned();
            attrs.push((key, value));
        }

        Ok(XmlElement { name, attrs, children: Vec::new() })
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<(), String> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
            Ok(())
        } else if root.is_none() {
            *root = Some(element);
            Ok(())
        } else {
            Err(format!("second root element {}", element.name))
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, treating blank values as absent
    pub fn non_empty_attr(&self, key: &str) -> Option<&str> {
        self.attr(key).filter(|v| !v.trim().is_empty())
    }

    /// All descendant elements with the given name, in document order (self excluded)
    pub fn descendants_named(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_named(name, &mut found);
        }
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }
}
