//! Minimal element tree for the `<imposto>` block.
//!
//! The block carries no attributes or mixed content, so a name, an optional
//! text and ordered children are enough to read and write it.

use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::xml_utils::{XmlWriter, format_aliquota, format_quantidade, format_valor};
use crate::core::ImpostoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: Element) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn push_text(&mut self, name: &str, text: impl Into<String>) -> &mut Self {
        self.push(Element::with_text(name, text))
    }

    /// Monetary amount, two decimals.
    pub fn push_valor(&mut self, name: &str, value: Decimal) -> &mut Self {
        self.push_text(name, format_valor(value))
    }

    /// Percentage, four decimals.
    pub fn push_aliquota(&mut self, name: &str, value: Decimal) -> &mut Self {
        self.push_text(name, format_aliquota(value))
    }

    /// Quantity or per-unit value, four decimals.
    pub fn push_quantidade(&mut self, name: &str, value: Decimal) -> &mut Self {
        self.push_text(name, format_quantidade(value))
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Trimmed text of a direct child, if present and not empty.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.child(name)
            .and_then(|c| c.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn required_text(&self, name: &str) -> Result<&str, ImpostoError> {
        self.text_of(name)
            .ok_or_else(|| ImpostoError::missing(&self.name, name))
    }

    pub fn decimal(&self, name: &str) -> Result<Option<Decimal>, ImpostoError> {
        self.text_of(name)
            .map(|text| {
                Decimal::from_str(text).map_err(|_| ImpostoError::InvalidNumber {
                    field: name.to_string(),
                    value: text.to_string(),
                })
            })
            .transpose()
    }

    pub fn required_decimal(&self, name: &str) -> Result<Decimal, ImpostoError> {
        self.decimal(name)?
            .ok_or_else(|| ImpostoError::missing(&self.name, name))
    }

    /// Union of children; on a name present in both, `self` keeps its own.
    pub fn merge(&mut self, other: Element) {
        for child in other.children {
            if !self.has(&child.name) {
                self.children.push(child);
            }
        }
    }

    /// Union of children; on a name present in both, `other` replaces in place.
    pub fn merge_over(&mut self, other: Element) {
        for child in other.children {
            match self.children.iter_mut().find(|c| c.name == child.name) {
                Some(slot) => *slot = child,
                None => self.children.push(child),
            }
        }
    }

    pub fn to_xml(&self) -> Result<String, ImpostoError> {
        let mut w = XmlWriter::new();
        self.write(&mut w)?;
        w.into_string()
    }

    pub fn to_xml_pretty(&self) -> Result<String, ImpostoError> {
        let mut w = XmlWriter::indented();
        self.write(&mut w)?;
        w.into_string()
    }

    fn write(&self, w: &mut XmlWriter) -> Result<(), ImpostoError> {
        match (&self.text, self.children.is_empty()) {
            (Some(text), true) => {
                w.text_element(&self.name, text)?;
            }
            (None, true) => {
                w.empty_element(&self.name)?;
            }
            _ => {
                w.start_element(&self.name)?;
                for child in &self.children {
                    child.write(w)?;
                }
                w.end_element(&self.name)?;
            }
        }
        Ok(())
    }

    /// Parse a document or fragment; namespace prefixes are dropped.
    pub fn parse(xml: &str) -> Result<Element, ImpostoError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    stack.push(Element::new(name));
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    attach(&mut stack, &mut root, Element::new(name))?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| ImpostoError::Xml(format!("XML text error: {e}")))?;
                    if let Some(top) = stack.last_mut() {
                        top.text = Some(text.into_owned());
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text = Some(String::from_utf8_lossy(&e).into_owned());
                    }
                }
                Ok(Event::End(_)) => {
                    let done = stack
                        .pop()
                        .ok_or_else(|| ImpostoError::Xml("unbalanced closing tag".into()))?;
                    attach(&mut stack, &mut root, done)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ImpostoError::Xml(format!("XML parse error: {e}"))),
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ImpostoError::Xml("unexpected end of document".into()));
        }
        root.ok_or_else(|| ImpostoError::Xml("document has no root element".into()))
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ImpostoError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ImpostoError::Xml("more than one root element".into())),
    }
}
