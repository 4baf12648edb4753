//! Read-only tree model of rendered content.
//!
//! A [`Node`] is a detached, owned snapshot of a rendered element: its tag,
//! its rendered text, its attributes and its element children. Snapshots are
//! built from a parsed `scraper` document with [`Node::from_element`], or by
//! hand with the builder methods (handy in tests).

use std::collections::BTreeMap;

use scraper::{ElementRef, node::Node as DomNode};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// The closed set of tags the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `<p>`
    Paragraph,
    /// `<div>`
    Division,
    /// `<blockquote>`
    BlockQuote,
    /// `<pre>`
    Preformatted,
    /// `<img>`
    Image,
    /// Anything else. Ignored by extraction.
    Other,
}

impl Tag {
    /// Classify a tag name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" => Self::Paragraph,
            "div" => Self::Division,
            "blockquote" => Self::BlockQuote,
            "pre" => Self::Preformatted,
            "img" => Self::Image,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// An owned, rendered element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Element name, lowercase when built from a document.
    pub tag: String,
    /// Rendered text of the element and all its descendants.
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    /// Element children in document order.
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Snapshot a parsed element and its whole subtree.
    pub fn from_element(el: ElementRef<'_>) -> Self {
        let value = el.value();

        let attributes = value
            .attrs()
            .map(|(name, val)| (name.to_string(), val.to_string()))
            .collect();

        let children = el.children().filter_map(ElementRef::wrap).map(Self::from_element).collect();

        Self {
            tag: value.name().to_ascii_lowercase(),
            text: rendered_text(el),
            attributes,
            children,
        }
    }

    /// Classified tag of this node.
    pub fn kind(&self) -> Tag {
        Tag::from_name(&self.tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Every descendant element in document (pre-order) order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator over a node's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Elements rendered on their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section",
    "table", "tr", "ul",
];

/// Elements whose content is never rendered.
const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "noscript"];

/// Text the way a browser reports it for an element: descendant text in
/// order, block elements on their own lines, `<br>` as a line break, and
/// script-like content left out.
fn rendered_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut pending_break = false;
    render_children(el, &mut out, &mut pending_break);
    out
}

fn render_children(el: ElementRef<'_>, out: &mut String, pending_break: &mut bool) {
    for child in el.children() {
        match child.value() {
            DomNode::Text(text) => {
                if *pending_break && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                *pending_break = false;
                out.push_str(text);
            }
            DomNode::Element(e) => {
                let name = e.name().to_ascii_lowercase();
                if HIDDEN_TAGS.contains(&name.as_str()) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name.as_str());
                *pending_break |= block;
                render_children(child_el, out, pending_break);
                *pending_break |= block;
            }
            _ => {}
        }
    }
}
