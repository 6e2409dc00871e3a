//! Ordered XML element tree
//!
//! Documents are parsed into an owned tree so the loader can lift out the
//! parts it understands and leave everything else where it was. Writing the
//! tree back produces the same elements, attributes and text in the same
//! order.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::xml::diagnostics::{DocumentError, XmlSyntaxError};

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::push`]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`Element::set_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.name == name)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Follow a path of child names from this element
    pub fn path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    pub fn path_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for name in path {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Follow a path, creating any missing elements along the way
    pub fn path_or_insert(&mut self, path: &[&str]) -> &mut Element {
        let mut current = self;
        for name in path {
            if current.child(name).is_none() {
                current.push(Element::new(*name));
            }
            current = match current.child_mut(name) {
                Some(el) => el,
                None => unreachable!("child <{name}> was just inserted"),
            };
        }
        current
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Concatenated text of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }

    /// Text of the named child, if that child exists
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    /// Remove and return every child element, leaving text nodes behind
    pub fn take_elements(&mut self) -> Vec<Element> {
        let mut taken = Vec::new();
        self.children.retain_mut(|node| match node {
            Node::Element(el) => {
                taken.push(std::mem::take(el));
                false
            }
            Node::Text(_) => true,
        });
        taken
    }

    /// Remove and return every child element with the given name
    pub fn take_children_named(&mut self, name: &str) -> Vec<Element> {
        let mut taken = Vec::new();
        self.children.retain_mut(|node| match node {
            Node::Element(el) if el.name == name => {
                taken.push(std::mem::take(el));
                false
            }
            _ => true,
        });
        taken
    }

    /// Drop whitespace-only text between child elements
    fn strip_layout_whitespace(&mut self) {
        let has_elements = self.children.iter().any(|n| matches!(n, Node::Element(_)));
        if has_elements {
            self.children.retain(|node| match node {
                Node::Text(text) => !text.trim().is_empty(),
                Node::Element(_) => true,
            });
        }
    }
}

/// Parse a complete document into its root element
pub fn parse(source: &str, filename: &str) -> Result<Element, XmlSyntaxError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    let syntax = |message: String, offset: u64| {
        XmlSyntaxError::at_offset(message, source, filename, offset as usize)
    };

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => return Err(syntax(err.to_string(), reader.buffer_position() as u64)),
        };
        let offset = reader.buffer_position() as u64;

        match event {
            Event::Start(start) => {
                stack.push(open_element(&start).map_err(|m| syntax(m, offset))?);
            }
            Event::Empty(start) => {
                let el = open_element(&start).map_err(|m| syntax(m, offset))?;
                close_element(el, &mut stack, &mut root).map_err(|m| syntax(m, offset))?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| syntax("unexpected closing tag".to_string(), offset))?;
                close_element(el, &mut stack, &mut root).map_err(|m| syntax(m, offset))?;
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text)
                    .map_err(|_| syntax("invalid UTF-8 in text".to_string(), offset))?;
                let value = unescape(raw).map_err(|e| syntax(e.to_string(), offset))?;
                append_text(&mut stack, &value);
            }
            Event::CData(data) => {
                let raw = std::str::from_utf8(&data)
                    .map_err(|_| syntax("invalid UTF-8 in CDATA".to_string(), offset))?;
                append_text(&mut stack, raw);
            }
            Event::GeneralRef(reference) => {
                let name = std::str::from_utf8(&reference)
                    .map_err(|_| syntax("invalid UTF-8 in entity reference".to_string(), offset))?;
                let escaped = format!("&{name};");
                let value = unescape(&escaped).map_err(|e| syntax(e.to_string(), offset))?;
                append_text(&mut stack, &value);
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no document content
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(syntax(
            format!("unclosed element <{}>", open.name),
            source.len() as u64,
        ));
    }

    root.ok_or_else(|| syntax("document has no root element".to_string(), 0))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, String> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())
        .map_err(|_| "invalid UTF-8 in element name".to_string())?;
    let mut el = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|_| "invalid UTF-8 in attribute name".to_string())?;
        let raw = std::str::from_utf8(attr.value.as_ref())
            .map_err(|_| format!("invalid UTF-8 in attribute `{key}`"))?;
        let value = unescape(raw).map_err(|e| e.to_string())?;
        el.attributes.push((key.to_string(), value.into_owned()));
    }

    Ok(el)
}

fn close_element(
    mut el: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), String> {
    el.strip_layout_whitespace();
    match stack.last_mut() {
        Some(parent) => {
            parent.push(el);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        None => Err(format!("second root element <{}>", el.name)),
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    // Text outside the root element is layout only
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

/// Serialize a document with an XML declaration and three-space indentation
pub fn write_document(root: &Element) -> Result<Vec<u8>, DocumentError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 3);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(write_error)
}

fn write_error(err: impl std::fmt::Display) -> DocumentError {
    DocumentError::Write(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = parse(
            "<Root A=\"1\"><Child>hello</Child><Child>world</Child><Other/></Root>",
            "test.cpml",
        )
        .unwrap();

        assert_eq!(root.name, "Root");
        assert_eq!(root.attr("A"), Some("1"));
        let texts: Vec<String> = root.elements_named("Child").map(Element::text).collect();
        assert_eq!(texts, vec!["hello", "world"]);
        assert!(root.child("Other").is_some());
    }

    #[test]
    fn test_entities_are_resolved() {
        let root = parse(
            "<Root Note=\"a &amp; b\"><T>x &lt; y &#65;</T></Root>",
            "test.cpml",
        )
        .unwrap();

        assert_eq!(root.attr("Note"), Some("a & b"));
        assert_eq!(root.child_text("T").unwrap(), "x < y A");
    }

    #[test]
    fn test_layout_whitespace_is_dropped_but_text_kept() {
        let root = parse(
            "<Root>\n   <Content>  padded  </Content>\n</Root>",
            "test.cpml",
        )
        .unwrap();

        assert_eq!(root.children.len(), 1);
        assert_eq!(root.child_text("Content").unwrap(), "  padded  ");
    }

    #[test]
    fn test_mismatched_tag_is_an_error() {
        let err = parse("<Root><A></B></Root>", "bad.cpml").unwrap_err();
        assert!(!err.message().is_empty());
    }

    #[test]
    fn test_unclosed_document_is_an_error() {
        let err = parse("<Root><A>", "bad.cpml").unwrap_err();
        assert!(err.message().contains("Root") || err.message().contains('A'));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(parse("", "empty.cpml").is_err());
    }

    #[test]
    fn test_write_then_parse_preserves_tree() {
        let root = Element::new("Root")
            .with_attr("Id", "GPU_1")
            .with_child(Element::new("Content").with_text("a < b & \"c\""))
            .with_child(Element::new("Empty"));

        let bytes = write_document(&root).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml"));

        let reparsed = parse(&text, "roundtrip.cpml").unwrap();
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_path_or_insert_creates_missing() {
        let mut root = Element::new("Root");
        root.path_or_insert(&["A", "B"]).set_attr("X", "1");
        assert_eq!(root.path(&["A", "B"]).unwrap().attr("X"), Some("1"));

        // Existing elements are reused
        root.path_or_insert(&["A", "B"]).set_attr("Y", "2");
        assert_eq!(root.path(&["A"]).unwrap().elements().count(), 1);
    }

    #[test]
    fn test_take_children_named() {
        let mut root = Element::new("Root")
            .with_child(Element::new("Keep"))
            .with_child(Element::new("Drop").with_text("1"))
            .with_child(Element::new("Drop").with_text("2"));

        let taken = root.take_children_named("Drop");
        assert_eq!(taken.len(), 2);
        assert_eq!(root.elements().count(), 1);
        assert_eq!(taken[1].text(), "2");
    }
}
