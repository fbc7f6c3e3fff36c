//! Document validation and structural XML-to-JSON conversion.
//!
//! # Design
//! `DocumentParser` is the seam between the client and the XML library so
//! the client can be exercised with canned documents. `QuickXmlParser`
//! builds a small element tree with quick-xml and maps it onto
//! `serde_json::Value` structurally, never per field:
//!
//! - an element with no children becomes its trimmed text (`""` when empty)
//! - an element with children becomes an object keyed by child name
//! - repeated sibling names collect into an array; a single child is not
//!   wrapped
//! - text mixed with child elements is kept under `#text`
//! - attributes, comments, processing instructions and the XML
//!   declaration are dropped
//!
//! Values are never coerced to numbers: codes such as `"01"` and 13-digit
//! corporate numbers must survive unchanged.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Key used for text that sits next to child elements.
pub const TEXT_KEY: &str = "#text";

/// Validates and converts response documents.
pub trait DocumentParser: Send + Sync {
    /// `Ok` when `text` is a well-formed document, otherwise a diagnostic.
    fn validate(&self, text: &str) -> Result<(), String>;

    /// Structural conversion of a well-formed document.
    fn convert(&self, text: &str) -> Result<Value, String>;
}

/// `DocumentParser` backed by quick-xml.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickXmlParser;

impl DocumentParser for QuickXmlParser {
    fn validate(&self, text: &str) -> Result<(), String> {
        parse_tree(text).map(|_| ())
    }

    fn convert(&self, text: &str) -> Result<Value, String> {
        let root = parse_tree(text)?;
        let mut document = Map::new();
        let name = root.name.clone();
        document.insert(name, root.into_value());
        Ok(Value::Object(document))
    }
}

#[derive(Debug)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text);
        }

        let mut map = Map::new();
        for child in self.children {
            let name = child.name.clone();
            let value = child.into_value();
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        }
        if !self.text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Value::String(self.text));
        }
        Value::Object(map)
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_some() => Err(format!("second root element <{}>", element.name)),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err("text outside the root element".to_string()),
    }
}

fn parse_tree(text: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.is_empty() && root.is_some() {
                    return Err("content after the root element".to_string());
                }
                stack.push(Element::new(start.name().as_ref()));
            }
            Ok(Event::Empty(empty)) => {
                attach(&mut stack, &mut root, Element::new(empty.name().as_ref()))?;
            }
            Ok(Event::End(end)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without an open element".to_string())?;
                if element.name.as_bytes() != end.name().as_ref() {
                    return Err(format!("mismatched closing tag for <{}>", element.name));
                }
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(t)) => {
                let value = t.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &value)?;
            }
            Ok(Event::CData(c)) => {
                let value = String::from_utf8_lossy(&c.into_inner()).into_owned();
                push_text(&mut stack, &value)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!("at byte {}: {e}", reader.buffer_position()));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "no root element".to_string())
}
