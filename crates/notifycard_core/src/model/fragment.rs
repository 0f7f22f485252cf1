//! Owned markup tree for sanitized notification content.
//!
//! # Responsibility
//! - Represent parsed markup independently of any rendering surface.
//! - Serialize back to markup with text and attribute values escaped.
//!
//! # Invariants
//! - Attribute keys are unique per element (`BTreeMap`).
//! - Serialization is deterministic for equal trees.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "img", "source"];

/// One node of a markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Concatenated descendant text, like DOM `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(value) => out.push_str(value),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(value) => out.push_str(&escape_text(value)),
            Self::Element(element) => element.write_html(out),
        }
    }
}

/// Element node with a lowercase tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        out.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

/// Ordered top-level nodes of one parsed notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serializes the fragment back to markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    /// Concatenated text of the whole fragment.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }

    /// Depth-first, parent-before-children walk over all elements.
    pub fn elements(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Node> = self.nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if let Node::Element(element) = node {
                found.push(element);
                stack.extend(element.children.iter().rev());
            }
        }
        found
    }
}

/// Escapes text content for inclusion between tags.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Element, Fragment, Node};

    #[test]
    fn serializes_void_elements_without_closing_tag() {
        let fragment = Fragment::new(vec![
            Node::text("a"),
            Element::new("br").into(),
            Element::new("img").with_attr("src", "x.png").into(),
        ]);
        assert_eq!(fragment.to_html(), r#"a<br><img src="x.png">"#);
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let fragment = Fragment::new(vec![Element::new("span")
            .with_attr("title", "say \"hi\" & go")
            .with_child(Node::text("<b>1 & 2</b>"))
            .into()]);
        assert_eq!(
            fragment.to_html(),
            r#"<span title="say &quot;hi&quot; &amp; go">&lt;b&gt;1 &amp; 2&lt;/b&gt;</span>"#
        );
    }

    #[test]
    fn text_content_flattens_descendants() {
        let fragment = Fragment::new(vec![
            Element::new("b")
                .with_child(Node::text("bold "))
                .with_child(Element::new("i").with_child(Node::text("nested")).into())
                .into(),
            Node::text(" tail"),
        ]);
        assert_eq!(fragment.text_content(), "bold nested tail");
    }

    #[test]
    fn elements_walk_parent_before_children() {
        let fragment = Fragment::new(vec![
            Element::new("div")
                .with_child(Element::new("span").into())
                .into(),
            Element::new("b").into(),
        ]);
        let tags: Vec<&str> = fragment.elements().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["div", "span", "b"]);
    }
}
