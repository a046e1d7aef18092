//! Document structure and head components

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{parse_stylesheet, CssRule};
use crate::layout::parse_px;
use crate::parser::lexer::decode_entities;
use crate::parser::{collapse_whitespace, Node};
use crate::renderer::HeadMetadata;

use super::{Component, Family, RenderContext, RuleContext, DIRECTION, PX};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(Mjml),
        Arc::new(MjHead),
        Arc::new(MjTitle),
        Arc::new(MjPreview),
        Arc::new(MjFont),
        Arc::new(MjBreakpoint),
        Arc::new(MjStyle),
        Arc::new(MjAttributes),
        Arc::new(MjAll),
        Arc::new(MjClass),
    ]
}

/// Document root
struct Mjml;

impl Component for Mjml {
    fn tag(&self) -> &'static str {
        "mjml"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[("dir", DIRECTION)]
    }

    fn contribute_head(&self, node: &Node, head: &mut HeadMetadata) {
        if let Some(lang) = node.get("lang") {
            head.language = Some(lang.to_string());
        }
        if let Some(dir) = node.get("dir") {
            head.direction = Some(dir.to_string());
        }
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        node.children
            .iter()
            .filter(|c| c.tag == "mj-body")
            .map(|c| ctx.render_node(c))
            .collect()
    }
}

struct MjHead;

impl Component for MjHead {
    fn tag(&self) -> &'static str {
        "mj-head"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

struct MjTitle;

impl Component for MjTitle {
    fn tag(&self) -> &'static str {
        "mj-title"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn contribute_head(&self, node: &Node, head: &mut HeadMetadata) {
        head.title = collapse_whitespace(&decode_entities(&node.content));
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

/// Hidden preview text shown by mail clients next to the subject
struct MjPreview;

impl Component for MjPreview {
    fn tag(&self) -> &'static str {
        "mj-preview"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn contribute_head(&self, node: &Node, head: &mut HeadMetadata) {
        head.preview = collapse_whitespace(&decode_entities(&node.content));
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

struct MjFont;

impl Component for MjFont {
    fn tag(&self) -> &'static str {
        "mj-font"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn required(&self) -> &'static [&'static str] {
        &["name", "href"]
    }

    fn contribute_head(&self, node: &Node, head: &mut HeadMetadata) {
        if let (Some(name), Some(href)) = (node.get("name"), node.get("href")) {
            head.add_font(name, href);
        }
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

struct MjBreakpoint;

impl Component for MjBreakpoint {
    fn tag(&self) -> &'static str {
        "mj-breakpoint"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[("width", PX)]
    }

    fn contribute_head(&self, node: &Node, head: &mut HeadMetadata) {
        if let Some(width) = node.get("width").filter(|w| parse_px(w).is_some()) {
            head.breakpoint = width.to_string();
        }
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

/// Author CSS; `inline="inline"` inlines what it can
struct MjStyle;

impl Component for MjStyle {
    fn tag(&self) -> &'static str {
        "mj-style"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[("inline", AttrType::Enum(&["inline"]))]
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let inline = node.get("inline") == Some("inline");
        parse_stylesheet(&node.content, inline, node.id)
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

/// Container of attribute rules; read by the cascade
struct MjAttributes;

impl Component for MjAttributes {
    fn tag(&self) -> &'static str {
        "mj-attributes"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn children_are_components(&self) -> bool {
        false
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

struct MjAll;

impl Component for MjAll {
    fn tag(&self) -> &'static str {
        "mj-all"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

struct MjClass;

impl Component for MjClass {
    fn tag(&self) -> &'static str {
        "mj-class"
    }

    fn family(&self) -> Family {
        Family::Structural
    }

    fn children_are_components(&self) -> bool {
        false
    }

    fn render(&self, _node: &Node, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentRegistry;
    use crate::parser;

    fn head_of(source: &str) -> HeadMetadata {
        let mut root = parser::parse(source).unwrap();
        crate::cascade::resolve(&mut root, ComponentRegistry::global()).unwrap();
        HeadMetadata::collect(&root, ComponentRegistry::global())
    }

    #[test]
    fn test_head_metadata() {
        let head = head_of(
            r##"<mjml lang="en" dir="rtl"><mj-head>
                <mj-title>  Monthly   news </mj-title>
                <mj-preview>Read me</mj-preview>
                <mj-breakpoint width="320px"/>
                <mj-font name="Raleway" href="https://fonts.example/raleway"/>
            </mj-head><mj-body width="500px" background-color="#eee"/></mjml>"##,
        );
        assert_eq!(head.title, "Monthly news");
        assert_eq!(head.preview, "Read me");
        assert_eq!(head.breakpoint, "320px");
        assert_eq!(head.body_width, 500.0);
        assert_eq!(head.background_color.as_deref(), Some("#eeeeee"));
        assert_eq!(head.language.as_deref(), Some("en"));
        assert_eq!(head.direction.as_deref(), Some("rtl"));
        assert!(head.fonts.iter().any(|f| f.name == "Raleway"));
    }

    #[test]
    fn test_title_and_preview_entities_decoded() {
        let head = head_of(
            "<mjml><mj-head><mj-title>Fish &amp; Chips</mj-title><mj-preview>1 &lt; 2</mj-preview></mj-head></mjml>",
        );
        assert_eq!(head.title, "Fish & Chips");
        assert_eq!(head.preview, "1 < 2");
    }

    #[test]
    fn test_style_rules_from_content() {
        let mut root = parser::parse(
            r#"<mjml><mj-head><mj-style inline="inline">.a { color: red }</mj-style><mj-style>.b:hover { color: blue }</mj-style></mj-head></mjml>"#,
        )
        .unwrap();
        crate::cascade::resolve(&mut root, ComponentRegistry::global()).unwrap();
        let ctx = RuleContext {
            frame: Default::default(),
            breakpoint: "480px",
        };
        let head = &root.children[0];
        let inline = MjStyle.declared_css_rules(&head.children[0], &ctx);
        assert!(inline[0].is_inlinable());
        let other = MjStyle.declared_css_rules(&head.children[1], &ctx);
        assert!(!other[0].is_inlinable());
    }
}
