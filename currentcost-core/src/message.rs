// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Line classification.
//!
//! Each line from the display unit is a single XML document with a `msg` root. A line
//! whose root has a direct `hist` child belongs to the hourly history burst, anything
//! else is a periodic reading.

use core::fmt::{self, Display};
use currentcost_error::{CurrentCostError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Owned XML element tree.
///
/// Attributes are not retained; the device dialect carries all data in child elements
/// and text. Text is the concatenation of the element's own text nodes, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All direct children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str())
    }

    /// Text of a child that must be present.
    ///
    /// `path` names the field in the error, e.g. `hist/type`.
    ///
    /// # Errors
    /// Returns [`CurrentCostError::MissingField`] when no such child exists.
    pub fn required_text(&self, name: &str, path: &str) -> Result<&str> {
        self.child_text(name)
            .ok_or_else(|| CurrentCostError::missing_field(path))
    }

    /// Parse a complete single-root XML document.
    ///
    /// # Errors
    /// Returns [`CurrentCostError::Parse`] for malformed XML, mismatched or unclosed
    /// tags, an empty document, or content after the root element.
    pub fn parse(line: &str) -> Result<Element> {
        let fail = |reason: String| CurrentCostError::parse(reason, line);

        let mut reader = Reader::from_str(line);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| fail(format!("{e} at position {}", reader.buffer_position())))?;

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(fail("content after root element".to_string()));
                    }
                    stack.push(Element::new(decode_name(start.name().as_ref(), line)?));
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(fail("content after root element".to_string()));
                    }
                    let element = Element::new(decode_name(start.name().as_ref(), line)?);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| fail("unexpected closing tag".to_string()))?;
                    let trimmed = element.text.trim();
                    if trimmed.len() != element.text.len() {
                        element.text = trimmed.to_string();
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| fail(format!("invalid text: {e}")))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(fail("text outside root element".to_string())),
                    }
                }
                Event::CData(data) => {
                    let data = core::str::from_utf8(&data)
                        .map_err(|e| fail(format!("invalid cdata: {e}")))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(data),
                        None => return Err(fail("cdata outside root element".to_string())),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(fail(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| fail("empty document".to_string()))
    }
}

fn decode_name(raw: &[u8], line: &str) -> Result<String> {
    core::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| CurrentCostError::parse(format!("invalid element name: {e}"), line))
}

/// The two message kinds emitted by the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Periodic,
    History,
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Periodic => f.write_str("periodic"),
            Self::History => f.write_str("history"),
        }
    }
}

/// A parsed line tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedMessage {
    pub kind: MessageKind,
    pub document: Element,
}

/// Parse one line and decide whether it is a periodic or a history message.
///
/// The line delimiter must already be stripped; a trailing carriage return is
/// tolerated. This function has no side effects.
///
/// # Errors
/// Returns [`CurrentCostError::Parse`] when the bytes are not UTF-8 or not a
/// well-formed single-root XML document.
///
/// # Example
///
/// ```
/// use currentcost_core::{classify, MessageKind};
///
/// let message = classify(b"<msg><src>CC128-v0.11</src><hist><type>1</type></hist></msg>\r").unwrap();
/// assert_eq!(message.kind, MessageKind::History);
/// ```
pub fn classify(raw: &[u8]) -> Result<ClassifiedMessage> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = core::str::from_utf8(raw).map_err(|e| {
        CurrentCostError::parse(
            format!("invalid utf-8: {e}"),
            String::from_utf8_lossy(raw).into_owned(),
        )
    })?;

    let document = Element::parse(line)?;
    let kind = if document.child("hist").is_some() {
        MessageKind::History
    } else {
        MessageKind::Periodic
    };

    tracing::trace!(%kind, bytes = raw.len(), "classified message");
    Ok(ClassifiedMessage { kind, document })
}
