//! Generic read-side tree.
//!
//! Decoders only need a node name, attribute lookup and first-child /
//! next-sibling navigation. [`Node`] captures that; [`Element`] is an owned
//! implementation that tests and callers without their own DOM can use.

use std::slice;

/// A node of an already-parsed attribute-tagged tree.
pub trait Node: Clone {
    /// Tag name.
    fn name(&self) -> &str;

    /// Attribute value by name.
    fn attribute(&self, name: &str) -> Option<&str>;

    fn first_child(&self) -> Option<Self>;

    fn next_sibling(&self) -> Option<Self>;

    /// Iterates over the direct children in document order.
    fn children(&self) -> Children<Self> {
        Children {
            next: self.first_child(),
        }
    }

    /// Returns the first child whose name matches `name`.
    fn child(&self, name: &str) -> Option<Self> {
        self.children().find(|c| c.is(name))
    }

    /// Tag names compare ASCII case-insensitively.
    fn is(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }
}

/// Iterator over the children of a [`Node`].
#[derive(Debug, Clone)]
pub struct Children<N> {
    next: Option<N>,
}

impl<N: Node> Iterator for Children<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let current = self.next.take()?;
        self.next = current.next_sibling();
        Some(current)
    }
}

/// An owned tree element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute, replacing an earlier value of the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Returns a [`Node`] handle rooted at this element.
    pub fn as_node(&self) -> ElementRef<'_> {
        ElementRef {
            siblings: slice::from_ref(self),
            index: 0,
        }
    }
}

/// Borrowed handle to an [`Element`] that knows its siblings.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    siblings: &'a [Element],
    index: usize,
}

impl<'a> ElementRef<'a> {
    /// Returns the element this handle points at.
    pub fn element(&self) -> &'a Element {
        &self.siblings[self.index]
    }
}

impl Node for ElementRef<'_> {
    fn name(&self) -> &str {
        &self.element().name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.element()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn first_child(&self) -> Option<Self> {
        let children = &self.element().children;
        (!children.is_empty()).then_some(ElementRef {
            siblings: children,
            index: 0,
        })
    }

    fn next_sibling(&self) -> Option<Self> {
        let index = self.index + 1;
        (index < self.siblings.len()).then_some(ElementRef {
            siblings: self.siblings,
            index,
        })
    }
}

#[cfg(feature = "xml")]
mod xml {
    use quick_xml::events::{BytesStart, Event};
    use quick_xml::Reader;

    use super::Element;
    use crate::error::DecodeError;

    fn malformed(reason: impl ToString) -> DecodeError {
        DecodeError::MalformedXml {
            reason: reason.to_string(),
        }
    }

    fn open(start: &BytesStart<'_>) -> Result<Element, DecodeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut element = Element::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(malformed)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(malformed)?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn close(
        stack: &mut Vec<Element>,
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<(), DecodeError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(malformed("more than one root element")),
        }
        Ok(())
    }

    impl Element {
        /// Parses an XML document into an owned tree.
        ///
        /// Only elements and attributes are kept; text, comments and
        /// processing instructions are dropped.
        pub fn parse_xml(xml: &str) -> Result<Element, DecodeError> {
            let mut reader = Reader::from_str(xml);
            let mut stack: Vec<Element> = Vec::new();
            let mut root: Option<Element> = None;

            loop {
                match reader.read_event() {
                    Ok(Event::Start(ref e)) => stack.push(open(e)?),
                    Ok(Event::Empty(ref e)) => {
                        let element = open(e)?;
                        close(&mut stack, &mut root, element)?;
                    }
                    Ok(Event::End(_)) => {
                        let element = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                        close(&mut stack, &mut root, element)?;
                    }
                    Ok(Event::Eof) => break,
                    Err(e) => return Err(malformed(e)),
                    _ => {}
                }
            }

            if !stack.is_empty() {
                return Err(malformed("unclosed element"));
            }
            root.ok_or_else(|| malformed("no root element"))
        }
    }
}
