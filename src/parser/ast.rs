//! Markup tree types
//!
//! A document is a single owned tree of [`Node`]s. Children are owned by their
//! parent and there are no back-references, so splicing an included subtree can
//! never introduce a cycle.

use std::collections::BTreeMap;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Attribute map, ordered so iteration is deterministic
pub type Attributes = BTreeMap<String, String>;

/// Preorder position of a node in the final (post-include) tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One element of the markup tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Preorder id, assigned by [`Node::assign_ids`]
    pub id: NodeId,
    /// Tag name, e.g. `mj-section`
    pub tag: String,
    /// Attributes exactly as written in the markup (entities decoded)
    pub attributes: Attributes,
    /// Child elements in document order
    pub children: Vec<Node>,
    /// Inner content: verbatim markup for whitespace-preserving kinds,
    /// collapsed text for everything else
    pub content: String,
    /// Attribute map after the cascade; `None` until then
    pub resolved: Option<Attributes>,
    /// Location in the file this node was parsed from
    pub span: Span,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            content: String::new(),
            resolved: None,
            span: 0..0,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Raw attribute as written in the markup
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Resolved attribute value; empty values count as unset
    pub fn get(&self, name: &str) -> Option<&str> {
        self.resolved
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Resolved attribute value, or `default` when unset
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Classes from the resolved `css-class` attribute
    pub fn css_classes(&self) -> impl Iterator<Item = &str> {
        self.get("css-class").unwrap_or("").split_whitespace()
    }

    /// Number the tree in preorder, starting at 0 for `self`
    pub fn assign_ids(&mut self) {
        fn visit(node: &mut Node, next: &mut usize) {
            node.id = NodeId(*next);
            *next += 1;
            for child in &mut node.children {
                visit(child, next);
            }
        }
        let mut next = 0;
        visit(self, &mut next);
    }

    /// Visit every node in preorder
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Find a node by id
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Depth of the deepest descendant (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }
}
