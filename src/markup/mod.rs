/*!
 * Owned markup tree for help-archive pages and navigation files.
 *
 * Pages are parsed into an arena of nodes addressed by `NodeId`. Every node keeps the
 * exact source text it came from, so serializing a tree that was not modified gives back
 * the input byte for byte. The only mutations are `replace_text` and `set_attribute`;
 * both escape what they write, so translated text can never open or close a tag.
 *
 * - `tokenizer`: lenient lexer that never fails
 * - `entities`: character reference decoding and escaping
 */

use std::borrow::Cow;
use std::fmt;

use crate::errors::MarkupError;

pub mod entities;
pub mod tokenizer;

pub use self::tokenizer::{Attribute, Quote};
use self::tokenizer::{Token, Tokenizer};

/// Elements that never have content or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Index of a node inside its `MarkupTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element with its original start and end tags
#[derive(Debug, Clone)]
pub struct Element {
    /// Lowercased element name used for matching
    name: String,
    /// Name as written in the source
    tag_name: String,
    start_tag: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
    /// `None` when the element was closed implicitly or never closed
    end_tag: Option<String>,
    modified: bool,
}

impl Element {
    /// Lowercased element name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Decoded value of an attribute, matching the name case-insensitively
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.value.as_deref())
            .map(entities::decode)
    }

    fn render_start_tag(&self) -> String {
        let mut tag = format!("<{}", self.tag_name);
        for attribute in &self.attributes {
            tag.push(' ');
            tag.push_str(&attribute.name);
            if let Some(value) = &attribute.value {
                let quote = match attribute.quote {
                    Quote::Single => '\'',
                    Quote::Double | Quote::None => '"',
                };
                tag.push('=');
                tag.push(quote);
                tag.push_str(value);
                tag.push(quote);
            }
        }
        if self.self_closing {
            tag.push_str(" /");
        }
        tag.push('>');
        tag
    }
}

/// What a node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The root; holds the top-level nodes
    Document,
    Element(Element),
    /// Raw text, character references still escaped
    Text(String),
    Comment(String),
    /// Doctype, processing instruction or CDATA section
    Declaration(String),
    /// Markup kept as-is without interpretation (unmatched end tags)
    Verbatim(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed document that exclusively owns all of its nodes
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<Node>,
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

impl MarkupTree {
    const ROOT: NodeId = NodeId(0);

    /// Parse markup into a tree. Parsing never fails; malformed input ends up as text.
    pub fn parse(source: &str) -> Self {
        let mut tree = Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut open: Vec<NodeId> = vec![Self::ROOT];

        for token in Tokenizer::new(source) {
            match token {
                Token::Text(text) => {
                    tree.append(current(&open), NodeKind::Text(text.to_string()));
                }
                Token::Comment(comment) => {
                    tree.append(current(&open), NodeKind::Comment(comment.to_string()));
                }
                Token::Declaration(declaration) => {
                    tree.append(current(&open), NodeKind::Declaration(declaration.to_string()));
                }
                Token::StartTag {
                    raw,
                    name,
                    attributes,
                    self_closing,
                } => {
                    let lower = name.to_ascii_lowercase();
                    tree.close_implied(&mut open, &lower);
                    let is_void = self_closing || VOID_ELEMENTS.contains(&lower.as_str());
                    let element = Element {
                        name: lower,
                        tag_name: name.to_string(),
                        start_tag: raw.to_string(),
                        attributes,
                        self_closing,
                        end_tag: None,
                        modified: false,
                    };
                    let id = tree.append(current(&open), NodeKind::Element(element));
                    if !is_void {
                        open.push(id);
                    }
                }
                Token::EndTag { raw, name } => {
                    let lower = name.to_ascii_lowercase();
                    let position = open
                        .iter()
                        .rposition(|id| tree.element(*id).is_some_and(|e| e.name == lower));
                    match position {
                        Some(position) => {
                            if let NodeKind::Element(element) = &mut tree.nodes[open[position].0].kind {
                                element.end_tag = Some(raw.to_string());
                            }
                            open.truncate(position);
                        }
                        None => {
                            tree.append(current(&open), NodeKind::Verbatim(raw.to_string()));
                        }
                    }
                }
            }
        }

        tree
    }

    /// Pop elements that a new start tag ends implicitly (`<li>` after `<li>` and friends).
    /// Keeps unclosed list items in navigation files from nesting without bound.
    fn close_implied(&self, open: &mut Vec<NodeId>, name: &str) {
        let (closes, boundaries): (&[&str], &[&str]) = match name {
            "li" => (&["li"], &["ul", "ol", "menu", "dir"]),
            "dt" | "dd" => (&["dt", "dd"], &["dl"]),
            "tr" => (&["tr"], &["table", "thead", "tbody", "tfoot"]),
            "td" | "th" => (&["td", "th"], &["tr", "table"]),
            "option" => (&["option"], &["select", "datalist"]),
            _ => return,
        };

        for position in (1..open.len()).rev() {
            let Some(element) = self.element(open[position]) else {
                return;
            };
            if closes.contains(&element.name.as_str()) {
                open.truncate(position);
                return;
            }
            if boundaries.contains(&element.name.as_str()) {
                return;
            }
        }
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Name of the element directly containing `id`, if any
    pub fn parent_element_name(&self, id: NodeId) -> Option<&str> {
        self.parent(id)
            .and_then(|parent| self.element(parent))
            .map(Element::name)
    }

    /// All nodes below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        result
    }

    /// Every text node in document order
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|id| matches!(self.kind(*id), NodeKind::Text(_)))
            .collect()
    }

    /// Every element with the given (case-insensitive) name, in document order
    pub fn elements_named(&self, name: &str) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| e.name.eq_ignore_ascii_case(name)))
            .collect()
    }

    /// Decoded content of a text node
    pub fn text(&self, id: NodeId) -> Result<Cow<'_, str>, MarkupError> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(raw) => Ok(entities::decode(raw)),
            _ => Err(MarkupError::NotATextNode(id.0)),
        }
    }

    /// Replace the content of a text node. The text is escaped on the way in.
    pub fn replace_text(&mut self, id: NodeId, text: &str) -> Result<(), MarkupError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(raw) => {
                *raw = entities::escape_text(text);
                Ok(())
            }
            _ => Err(MarkupError::NotATextNode(id.0)),
        }
    }

    /// Set (or add) an attribute on an element; only that start tag is re-rendered
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), MarkupError> {
        let NodeKind::Element(element) = &mut self.nodes[id.0].kind else {
            return Err(MarkupError::NotAnElement(id.0));
        };

        let escaped = entities::escape_attribute(value);
        match element
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(attribute) => {
                attribute.value = Some(escaped);
                attribute.quote = Quote::Double;
            }
            None => element.attributes.push(Attribute {
                name: name.to_string(),
                value: Some(escaped),
                quote: Quote::Double,
            }),
        }
        element.modified = true;

        Ok(())
    }

    /// Write the tree back out as markup
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![Step::Enter(Self::ROOT)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let node = &self.nodes[id.0];
                    match &node.kind {
                        NodeKind::Document => {}
                        NodeKind::Element(element) => {
                            if element.modified {
                                out.push_str(&element.render_start_tag());
                            } else {
                                out.push_str(&element.start_tag);
                            }
                            stack.push(Step::Exit(id));
                        }
                        NodeKind::Text(s)
                        | NodeKind::Comment(s)
                        | NodeKind::Declaration(s)
                        | NodeKind::Verbatim(s) => out.push_str(s),
                    }
                    stack.extend(node.children.iter().rev().map(|child| Step::Enter(*child)));
                }
                Step::Exit(id) => {
                    if let Some(end_tag) = self.element(id).and_then(|e| e.end_tag.as_deref()) {
                        out.push_str(end_tag);
                    }
                }
            }
        }

        out
    }
}

impl fmt::Display for MarkupTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn current(open: &[NodeId]) -> NodeId {
    open.last().copied().unwrap_or(MarkupTree::ROOT)
}
