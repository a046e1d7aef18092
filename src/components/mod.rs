//! Component registry
//!
//! Every tag the compiler understands is a [`Component`]: it owns the tag's
//! default attributes, how it splits width among its children, the CSS rules
//! its markup needs and the markup itself. Shared stages dispatch through the
//! [`ComponentRegistry`] and never branch on tag names.

mod accordion;
mod body;
mod carousel;
mod content;
mod head;
mod navbar;
mod social;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::warn;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations, Part, StyleSheet};
use crate::layout::{Frame, Layout};
use crate::parser::{Node, Span};
use crate::renderer::{escape_attr, HeadMetadata, HtmlConfig};

/// Broad role of a component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Lays out child components (section, column, ...)
    Container,
    /// Renders content inside a column cell (text, image, ...)
    Content,
    /// Document structure consumed by earlier stages (head, attributes, ...)
    Structural,
}

/// What a component sees while declaring its CSS rules
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub frame: Frame,
    /// Width from `mj-breakpoint`, e.g. `480px`
    pub breakpoint: &'a str,
}

/// One component kind
pub trait Component: Send + Sync {
    fn tag(&self) -> &'static str;

    fn family(&self) -> Family;

    /// Intrinsic defaults; empty values mean "unset"
    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Keys copied from the parent when still unset after the cascade
    fn inheritable(&self) -> &'static [&'static str] {
        &[]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[]
    }

    fn required(&self) -> &'static [&'static str] {
        &[]
    }

    /// Keep the element body verbatim (it holds HTML, not components)
    fn preserves_whitespace(&self) -> bool {
        false
    }

    /// Part that receives `css-class`, and with it author CSS
    fn class_part(&self) -> Part {
        match self.family() {
            Family::Content => "cell",
            _ => "outer",
        }
    }

    /// Whether child elements are components (false for `mj-attributes`)
    fn children_are_components(&self) -> bool {
        true
    }

    /// Whether a column wraps this kind in a `<tr><td>` cell
    fn needs_cell(&self) -> bool {
        self.family() == Family::Content
    }

    /// Frames for the children, one per child
    fn child_frames(&self, node: &Node, frame: &Frame) -> Vec<Frame> {
        (0..node.children.len()).map(|i| frame.child(i)).collect()
    }

    fn declared_css_rules(&self, _node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        Vec::new()
    }

    /// Feed document-level metadata (title, fonts, ...)
    fn contribute_head(&self, _node: &Node, _head: &mut HeadMetadata) {}

    /// Produce this node's HTML; must not perform I/O
    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String;
}

/// Tag to component table, read-only once shared
#[derive(Clone)]
pub struct ComponentRegistry {
    components: HashMap<&'static str, Arc<dyn Component>>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.components.keys().collect();
        tags.sort();
        f.debug_struct("ComponentRegistry").field("tags", &tags).finish()
    }
}

impl Default for ComponentRegistry {
    /// Registry with every built-in component
    fn default() -> Self {
        let mut registry = Self::empty();
        for component in head::components()
            .into_iter()
            .chain(body::components())
            .chain(content::components())
            .chain(social::components())
            .chain(navbar::components())
            .chain(accordion::components())
            .chain(carousel::components())
        {
            registry.register(component);
        }
        registry
    }
}

impl ComponentRegistry {
    /// Registry with no components
    pub fn empty() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Shared default registry, built on first use
    pub fn global() -> &'static ComponentRegistry {
        static GLOBAL: OnceLock<ComponentRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ComponentRegistry::default)
    }

    /// Add or replace a component, returning the one it replaced
    pub fn register(&mut self, component: Arc<dyn Component>) -> Option<Arc<dyn Component>> {
        self.components.insert(component.tag(), component)
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, component: Arc<dyn Component>) -> Self {
        self.register(component);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&dyn Component> {
        self.components.get(tag).map(|c| c.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.components.contains_key(tag)
    }

    pub fn preserves_whitespace(&self, tag: &str) -> bool {
        self.get(tag).is_some_and(|c| c.preserves_whitespace())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.components.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

/// A tag with no registered component
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown component <{tag}>")]
pub struct UnknownComponentError {
    pub tag: String,
    pub span: Span,
}

/// Check every tag against the registry.
///
/// Strict mode fails on the first unknown tag; otherwise unknown nodes are
/// dropped with a warning. Children of non-component containers (attribute
/// blocks) are not checked.
pub fn check_tree(
    root: &mut Node,
    registry: &ComponentRegistry,
    strict: bool,
) -> Result<(), UnknownComponentError> {
    if !registry.contains(&root.tag) {
        return Err(UnknownComponentError {
            tag: root.tag.clone(),
            span: root.span.clone(),
        });
    }
    check_children(root, registry, strict)
}

fn check_children(
    node: &mut Node,
    registry: &ComponentRegistry,
    strict: bool,
) -> Result<(), UnknownComponentError> {
    let descend = registry
        .get(&node.tag)
        .is_some_and(|c| c.children_are_components());
    if !descend {
        return Ok(());
    }

    let mut i = 0;
    while i < node.children.len() {
        if !registry.contains(&node.children[i].tag) {
            let child = &node.children[i];
            if strict {
                return Err(UnknownComponentError {
                    tag: child.tag.clone(),
                    span: child.span.clone(),
                });
            }
            warn!(tag = %child.tag, parent = %node.tag, "skipping unknown component");
            node.children.remove(i);
            continue;
        }
        check_children(&mut node.children[i], registry, strict)?;
        i += 1;
    }
    Ok(())
}

/// Visit every component node in preorder, skipping attribute-block contents
pub fn walk_components<'a>(
    node: &'a Node,
    registry: &'a ComponentRegistry,
    f: &mut impl FnMut(&'a Node, &'a dyn Component),
) {
    let Some(component) = registry.get(&node.tag) else {
        return;
    };
    f(node, component);
    if component.children_are_components() {
        for child in &node.children {
            walk_components(child, registry, f);
        }
    }
}

/// Everything a component may read while rendering, borrowed for one call
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub registry: &'a ComponentRegistry,
    pub layout: &'a Layout,
    pub styles: &'a StyleSheet,
    pub head: &'a HeadMetadata,
    pub config: &'a HtmlConfig,
}

impl RenderContext<'_> {
    pub fn render_node(&self, node: &Node) -> String {
        match self.registry.get(&node.tag) {
            Some(component) => component.render(node, self),
            None => String::new(),
        }
    }

    pub fn render_children(&self, node: &Node) -> String {
        node.children.iter().map(|c| self.render_node(c)).collect()
    }

    /// Children as table rows, content kinds wrapped in their cell
    pub fn render_cells(&self, node: &Node) -> String {
        let mut out = String::new();
        for child in &node.children {
            let needs_cell = self
                .registry
                .get(&child.tag)
                .is_some_and(|c| c.needs_cell());
            if !needs_cell {
                out.push_str(&self.render_node(child));
                continue;
            }
            out.push_str(&format!(
                "<tr><td{}{}{}{}>{}</td></tr>",
                attr("align", child.get("align")),
                attr("vertical-align", child.get("vertical-align")),
                self.class_attr(child, &[]),
                self.style(child, "cell"),
                self.render_node(child)
            ));
        }
        out
    }

    /// ` style="..."` for a part, or nothing when it has no declarations
    pub fn style(&self, node: &Node, part: Part) -> String {
        let css = self
            .styles
            .inline(node.id, part)
            .map(|d| d.to_inline(self.config.css_minify))
            .unwrap_or_default();
        if css.is_empty() {
            String::new()
        } else {
            format!(" style=\"{}\"", escape_attr(&css))
        }
    }

    /// ` class="..."` from `extra` plus the node's `css-class`, and ` id` from `css-id`
    pub fn class_attr(&self, node: &Node, extra: &[&str]) -> String {
        let classes: Vec<&str> = extra
            .iter()
            .copied()
            .filter(|c| !c.is_empty())
            .chain(node.css_classes())
            .collect();
        let mut out = String::new();
        if !classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_attr(&classes.join(" "))));
        }
        out.push_str(&attr("id", node.get("css-id")));
        out
    }

    pub fn frame(&self, node: &Node) -> Frame {
        self.layout.frame(node.id)
    }
}

/// ` name="value"` when the value is present and non-empty
pub(crate) fn attr(name: &str, value: Option<&str>) -> String {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => format!(" {}=\"{}\"", name, escape_attr(v)),
        None => String::new(),
    }
}

/// Cell styles shared by every content kind
pub(crate) fn cell_rule(node: &Node) -> CssRule {
    CssRule::element(
        node.id,
        "cell",
        Declarations::new()
            .with_opt("background", node.get("container-background-color"))
            .with("font-size", "0px")
            .with_opt("padding", node.get("padding"))
            .with_opt("padding-top", node.get("padding-top"))
            .with_opt("padding-right", node.get("padding-right"))
            .with_opt("padding-bottom", node.get("padding-bottom"))
            .with_opt("padding-left", node.get("padding-left"))
            .with("word-break", "break-word"),
    )
}

/// `480px` → `479px`, for `max-width` queries just under the breakpoint
pub(crate) fn lower_breakpoint(breakpoint: &str) -> String {
    match crate::layout::parse_px(breakpoint) {
        Some(px) => crate::layout::format_px(px - 1.0),
        None => breakpoint.to_string(),
    }
}

const ALIGN: AttrType = AttrType::Enum(&["left", "center", "right"]);
const VERTICAL_ALIGN: AttrType = AttrType::Enum(&["top", "middle", "bottom"]);
const LENGTH: AttrType = AttrType::Unit(&["px", "%"]);
const PX: AttrType = AttrType::Unit(&["px"]);
const DIRECTION: AttrType = AttrType::Enum(&["ltr", "rtl"]);


#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_registry() {
        let registry = ComponentRegistry::global();
        assert_eq!(registry.len(), 33);
        for tag in ["mjml", "mj-section", "mj-text", "mj-carousel-image", "mj-class"] {
            assert!(registry.contains(tag), "{tag} should be registered");
        }
        assert!(registry.preserves_whitespace("mj-text"));
        assert!(!registry.preserves_whitespace("mj-section"));
        assert!(!registry.preserves_whitespace("mj-unknown"));
    }

    #[test]
    fn test_tags_match_registration_keys() {
        let registry = ComponentRegistry::default();
        for tag in registry.tags() {
            assert_eq!(registry.get(tag).map(|c| c.tag()), Some(tag));
        }
    }

    #[derive(Debug)]
    struct Banner;

    impl Component for Banner {
        fn tag(&self) -> &'static str {
            "mj-banner"
        }

        fn family(&self) -> Family {
            Family::Content
        }

        fn render(&self, node: &Node, _ctx: &RenderContext<'_>) -> String {
            format!("<marquee>{}</marquee>", node.content)
        }
    }

    #[test]
    fn test_register_custom_component() {
        let registry = ComponentRegistry::default().with(Arc::new(Banner));
        assert_eq!(registry.len(), 34);
        assert_eq!(registry.get("mj-banner").map(|c| c.family()), Some(Family::Content));
        assert_eq!(registry.get("mj-banner").map(|c| c.class_part()), Some("cell"));
    }

    #[test]
    fn test_check_tree_lenient_drops_unknown() {
        let mut root =
            parser::parse("<mjml><mj-body><mj-foo/><mj-section><mj-bar/></mj-section></mj-body></mjml>")
                .unwrap();
        check_tree(&mut root, ComponentRegistry::global(), false).unwrap();
        let body = &root.children[0];
        assert_eq!(body.children.len(), 1);
        assert_eq!(body.children[0].tag, "mj-section");
        assert!(body.children[0].children.is_empty());
    }

    #[test]
    fn test_check_tree_strict_fails() {
        let mut root = parser::parse("<mjml><mj-body><mj-foo/></mj-body></mjml>").unwrap();
        let err = check_tree(&mut root, ComponentRegistry::global(), true).unwrap_err();
        assert_eq!(err.tag, "mj-foo");
        assert_eq!(err.span, 15..24);
    }

    #[test]
    fn test_check_tree_ignores_attribute_blocks() {
        let mut root = parser::parse(
            "<mjml><mj-head><mj-attributes><mj-anything color=\"red\"/></mj-attributes></mj-head></mjml>",
        )
        .unwrap();
        check_tree(&mut root, ComponentRegistry::global(), true).unwrap();
    }

    #[test]
    fn test_lower_breakpoint() {
        assert_eq!(lower_breakpoint("480px"), "479px");
        assert_eq!(lower_breakpoint("30em"), "30em");
    }
}
