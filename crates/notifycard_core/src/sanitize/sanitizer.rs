//! Allow-list sanitizer over an owned parse tree.
//!
//! # Responsibility
//! - Parse untrusted notification markup the way `innerHTML` would.
//! - Keep allow-listed elements, strip every other attribute.
//! - Flatten disallowed elements to their text content.
//!
//! # Invariants
//! - No element outside `ALLOWED_TAGS` survives.
//! - No attribute outside `ALLOWED_ATTRS` or starting with `on` survives.
//! - Flattened content is stored as text and never re-parsed as markup.
//! - Adjacent text siblings are merged so serialized output re-parses to the
//!   same tree (idempotence).

use crate::model::fragment::{Element, Fragment, Node};
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, ParseOpts, QualName};
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::collections::BTreeMap;

/// Tags kept by the sanitizer.
pub const ALLOWED_TAGS: &[&str] = &[
    "ha-alert",
    "blockquote",
    "font",
    "img",
    "video",
    "source",
    "strong",
    "b",
    "i",
    "br",
    "a",
    "div",
    "span",
];

/// Attributes kept on allowed tags.
pub const ALLOWED_ATTRS: &[&str] = &[
    "alert-type",
    "color",
    "src",
    "controls",
    "preload",
    "type",
    "class",
    "style",
    "href",
];

/// Reserved event-handler attribute prefix, rejected even when allow-listed.
pub const EVENT_HANDLER_PREFIX: &str = "on";

/// Nesting depth past which parsed elements are flattened to text.
pub const MAX_DEPTH: usize = 256;

/// Counts of what one sanitizer pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub flattened_elements: usize,
    pub removed_attributes: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.flattened_elements == 0 && self.removed_attributes == 0
    }
}

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(tag))
}

/// Both checks must pass: allow-listed and not an event handler.
pub fn is_allowed_attr(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    ALLOWED_ATTRS.contains(&lowered.as_str()) && !lowered.starts_with(EVENT_HANDLER_PREFIX)
}

/// Parses and sanitizes markup. Never fails.
pub fn sanitize_html(input: &str) -> Fragment {
    sanitize_html_with_report(input).0
}

/// Parses and sanitizes markup, also reporting what was removed.
pub fn sanitize_html_with_report(input: &str) -> (Fragment, SanitizeReport) {
    let parsed = parse_markup(input);
    let (fragment, report) = sanitize_fragment_with_report(parsed);
    debug!(
        "event=sanitize module=sanitize status=ok input_len={} nodes={} flattened={} removed_attrs={}",
        input.len(),
        fragment.nodes.len(),
        report.flattened_elements,
        report.removed_attributes
    );
    (fragment, report)
}

/// Sanitizes an already-built fragment.
pub fn sanitize_fragment(fragment: Fragment) -> Fragment {
    sanitize_fragment_with_report(fragment).0
}

pub fn sanitize_fragment_with_report(fragment: Fragment) -> (Fragment, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let nodes = sanitize_nodes(fragment.nodes, false, &mut report);
    (Fragment::new(nodes), report)
}

/// An `<a>` start tag closes any open `<a>`, so a nested anchor cannot
/// survive reparsing. Flattening it keeps sanitized output a fixed point.
fn is_nested_anchor(tag: &str, in_anchor: bool) -> bool {
    in_anchor && tag.eq_ignore_ascii_case("a")
}

fn sanitize_nodes(nodes: Vec<Node>, in_anchor: bool, report: &mut SanitizeReport) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let cleaned = match node {
            Node::Text(value) => Node::Text(value),
            Node::Element(element)
                if !is_allowed_tag(&element.tag) || is_nested_anchor(&element.tag, in_anchor) =>
            {
                report.flattened_elements += 1;
                Node::Text(Node::Element(element).text_content())
            }
            Node::Element(element) => {
                Node::Element(sanitize_element(element, in_anchor, report))
            }
        };
        push_merged(&mut out, cleaned);
    }
    out
}

fn sanitize_element(element: Element, in_anchor: bool, report: &mut SanitizeReport) -> Element {
    let Element {
        tag,
        attrs,
        children,
    } = element;

    let mut kept = BTreeMap::new();
    for (name, value) in attrs {
        if is_allowed_attr(&name) {
            kept.entry(name.to_ascii_lowercase()).or_insert(value);
        } else {
            report.removed_attributes += 1;
        }
    }

    let tag = tag.to_ascii_lowercase();
    let children = sanitize_nodes(children, in_anchor || tag == "a", report);
    Element {
        tag,
        attrs: kept,
        children,
    }
}

fn push_merged(out: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(value) if value.is_empty() => {}
        Node::Text(value) => match out.last_mut() {
            Some(Node::Text(previous)) => previous.push_str(&value),
            _ => out.push(Node::Text(value)),
        },
        element => out.push(element),
    }
}

/// Parses markup as the children of a `<div>`, like assigning `innerHTML`.
///
/// Comments, doctypes and processing instructions are dropped. Elements nested
/// deeper than `MAX_DEPTH` become text.
pub fn parse_markup(input: &str) -> Fragment {
    let context = QualName::new(None, ns!(html), local_name!("div"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
        .one(input);

    // Fragment parsing wraps the content in a synthetic <html> root.
    let document = dom.document;
    let top: Vec<Handle> = document.children.borrow().iter().cloned().collect();
    let roots: Vec<Handle> = match top.as_slice() {
        [root] if is_html_root(root) => root.children.borrow().iter().cloned().collect(),
        _ => top,
    };

    let mut nodes = Vec::with_capacity(roots.len());
    for handle in &roots {
        if let Some(node) = convert(handle, 0) {
            push_merged(&mut nodes, node);
        }
    }
    Fragment::new(nodes)
}

fn is_html_root(handle: &Handle) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if &*name.local == "html")
}

fn convert(handle: &Handle, depth: usize) -> Option<Node> {
    match &handle.data {
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            if depth >= MAX_DEPTH {
                return Some(Node::Text(flatten_handle(handle)));
            }
            let mut element = Element::new(name.local.to_string());
            for attr in attrs.borrow().iter() {
                element
                    .attrs
                    .entry(attr.name.local.to_string())
                    .or_insert_with(|| attr.value.to_string());
            }
            for child in handle.children.borrow().iter() {
                if let Some(node) = convert(child, depth + 1) {
                    push_merged(&mut element.children, node);
                }
            }
            Some(Node::Element(element))
        }
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}

fn flatten_handle(handle: &Handle) -> String {
    let mut out = String::new();
    let mut stack = vec![handle.clone()];
    while let Some(node) = stack.pop() {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => {
                stack.extend(node.children.borrow().iter().rev().cloned());
            }
            _ => {}
        }
    }
    out
}
