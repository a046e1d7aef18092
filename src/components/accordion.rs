//! Collapsible accordion built on the checkbox hack

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations};
use crate::parser::{collapse_whitespace, Node};
use crate::renderer::escape_attr;

use super::content::DEFAULT_FONT;
use super::{cell_rule, Component, Family, RenderContext, RuleContext, VERTICAL_ALIGN};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(MjAccordion),
        Arc::new(MjAccordionElement),
        Arc::new(MjAccordionTitle),
        Arc::new(MjAccordionText),
    ]
}

/// Keys an accordion hands down to its elements and their title/text
const SHARED: &[&str] = &[
    "border",
    "font-family",
    "icon-align",
    "icon-height",
    "icon-position",
    "icon-unwrapped-alt",
    "icon-unwrapped-url",
    "icon-width",
    "icon-wrapped-alt",
    "icon-wrapped-url",
];

const ACCORDION_CSS: &[&str] = &[
    "noinput.mj-accordion-checkbox { display:block !important; }",
    concat!(
        "@media yahoo, only screen and (min-width:0) { ",
        ".mj-accordion-element { display:block; } ",
        "input.mj-accordion-checkbox, .mj-accordion-less { display:none !important; } ",
        "input.mj-accordion-checkbox+* .mj-accordion-title { cursor:pointer; touch-action:manipulation; -webkit-user-select:none; -moz-user-select:none; user-select:none; } ",
        "input.mj-accordion-checkbox+* .mj-accordion-content { overflow:hidden; display:none; } ",
        "input.mj-accordion-checkbox+* .mj-accordion-more { display:block !important; } ",
        "input.mj-accordion-checkbox:checked+* .mj-accordion-content { display:block; } ",
        "input.mj-accordion-checkbox:checked+* .mj-accordion-more { display:none !important; } ",
        "input.mj-accordion-checkbox:checked+* .mj-accordion-less { display:block !important; } ",
        "}"
    ),
    ".moz-text-html input.mj-accordion-checkbox+* .mj-accordion-title { cursor:auto; touch-action:auto; -webkit-user-select:auto; -moz-user-select:auto; user-select:auto; }",
    ".moz-text-html input.mj-accordion-checkbox+* .mj-accordion-content { overflow:hidden; display:block; }",
    ".moz-text-html input.mj-accordion-checkbox+* .mj-accordion-ico { display:none; }",
];

const TABLE: &str = r#" cellspacing="0" cellpadding="0""#;

struct MjAccordion;

impl Component for MjAccordion {
    fn tag(&self) -> &'static str {
        "mj-accordion"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("border", "2px solid black"),
            ("font-family", DEFAULT_FONT),
            ("icon-align", "middle"),
            ("icon-height", "32px"),
            ("icon-position", "right"),
            ("icon-unwrapped-alt", "-"),
            ("icon-unwrapped-url", "https://i.imgur.com/w4uTygT.png"),
            ("icon-width", "32px"),
            ("icon-wrapped-alt", "+"),
            ("icon-wrapped-url", "https://i.imgur.com/bIXv1bk.png"),
            ("padding", "10px 25px"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("container-background-color", AttrType::Color),
            ("icon-align", VERTICAL_ALIGN),
            ("icon-position", AttrType::Enum(&["left", "right"])),
            ("padding", AttrType::Boxed),
        ]
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let mut rules = vec![
            cell_rule(node),
            CssRule::element(
                node.id,
                "table",
                Declarations::new()
                    .with("width", "100%")
                    .with("border-collapse", "collapse")
                    .with_opt("border", node.get("border"))
                    .with("border-bottom", "none")
                    .with_opt("font-family", node.get("font-family")),
            ),
        ];
        rules.extend(ACCORDION_CSS.iter().map(|text| CssRule::verbatim(node.id, *text)));
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!(
            "<table{}{}{}><tbody>{}</tbody></table>",
            TABLE,
            ctx.class_attr(node, &["mj-accordion"]),
            ctx.style(node, "table"),
            ctx.render_children(node)
        )
    }
}

/// One title/text pair with its own checkbox
struct MjAccordionElement;

impl Component for MjAccordionElement {
    fn tag(&self) -> &'static str {
        "mj-accordion-element"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn inheritable(&self) -> &'static [&'static str] {
        SHARED
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[("background-color", AttrType::Color)]
    }

    fn class_part(&self) -> &'static str {
        "label"
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        vec![
            CssRule::element(node.id, "td", Declarations::new().with("padding", "0px")),
            CssRule::element(
                node.id,
                "label",
                Declarations::new()
                    .with("font-size", "13px")
                    .with_opt("font-family", node.get("font-family")),
            ),
            CssRule::element(node.id, "checkbox", Declarations::new().with("display", "none")),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let section = |tag: &str| node.child(tag).map(|c| ctx.render_node(c)).unwrap_or_default();
        format!(
            concat!(
                "<tr><td{td}><label{class}{label}>",
                r#"<input class="mj-accordion-checkbox" type="checkbox"{checkbox}>"#,
                r#"<div><div class="mj-accordion-title">{title}</div>"#,
                r#"<div class="mj-accordion-content">{text}</div></div>"#,
                "</label></td></tr>"
            ),
            td = ctx.style(node, "td"),
            class = ctx.class_attr(node, &["mj-accordion-element"]),
            label = ctx.style(node, "label"),
            checkbox = ctx.style(node, "checkbox"),
            title = section("mj-accordion-title"),
            text = section("mj-accordion-text"),
        )
    }
}

struct MjAccordionTitle;

impl MjAccordionTitle {
    fn icon(node: &Node, ctx: &RenderContext<'_>) -> String {
        let img = |url: &str, alt: &str, class: &str| {
            format!(
                r#"<img src="{}" alt="{}" class="{}"{}>"#,
                escape_attr(node.get(url).unwrap_or("")),
                escape_attr(node.get(alt).unwrap_or("")),
                class,
                ctx.style(node, "img")
            )
        };
        format!(
            r#"<td class="mj-accordion-ico"{}>{}{}</td>"#,
            ctx.style(node, "icon"),
            img("icon-wrapped-url", "icon-wrapped-alt", "mj-accordion-more"),
            img("icon-unwrapped-url", "icon-unwrapped-alt", "mj-accordion-less"),
        )
    }
}

impl Component for MjAccordionTitle {
    fn tag(&self) -> &'static str {
        "mj-accordion-title"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[("font-size", "13px"), ("padding", "16px")]
    }

    fn inheritable(&self) -> &'static [&'static str] {
        &[
            "background-color",
            "border",
            "font-family",
            "icon-align",
            "icon-height",
            "icon-position",
            "icon-unwrapped-alt",
            "icon-unwrapped-url",
            "icon-width",
            "icon-wrapped-alt",
            "icon-wrapped-url",
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("color", AttrType::Color),
            ("padding", AttrType::Boxed),
        ]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let background = node.get("background-color");
        vec![
            CssRule::element(
                node.id,
                "table",
                Declarations::new()
                    .with("width", "100%")
                    .with_opt("border-bottom", node.get("border")),
            ),
            CssRule::element(
                node.id,
                "cell",
                Declarations::new()
                    .with("width", "100%")
                    .with_opt("background-color", background)
                    .with_opt("color", node.get("color"))
                    .with_opt("font-size", node.get("font-size"))
                    .with_opt("font-family", node.get("font-family"))
                    .with_opt("font-weight", node.get("font-weight"))
                    .with_opt("padding", node.get("padding")),
            ),
            CssRule::element(
                node.id,
                "icon",
                Declarations::new()
                    .with("padding", "16px")
                    .with_opt("background", background)
                    .with_opt("vertical-align", node.get("icon-align")),
            ),
            CssRule::element(
                node.id,
                "img",
                Declarations::new()
                    .with("display", "none")
                    .with_opt("width", node.get("icon-width"))
                    .with_opt("height", node.get("icon-height")),
            ),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let title = format!(
            "<td{}{}> {} </td>",
            ctx.class_attr(node, &[]),
            ctx.style(node, "cell"),
            collapse_whitespace(&node.content)
        );
        let icon = Self::icon(node, ctx);
        let row = if node.get("icon-position") == Some("left") {
            icon + &title
        } else {
            title + &icon
        };
        format!(
            "<table{}{}><tbody><tr>{}</tr></tbody></table>",
            TABLE,
            ctx.style(node, "table"),
            row
        )
    }
}

struct MjAccordionText;

impl Component for MjAccordionText {
    fn tag(&self) -> &'static str {
        "mj-accordion-text"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("color", "#000000"),
            ("font-size", "13px"),
            ("line-height", "1"),
            ("padding", "16px"),
        ]
    }

    fn inheritable(&self) -> &'static [&'static str] {
        &["background-color", "border", "font-family"]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("color", AttrType::Color),
            ("padding", AttrType::Boxed),
        ]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        vec![
            CssRule::element(
                node.id,
                "table",
                Declarations::new()
                    .with("width", "100%")
                    .with_opt("border-bottom", node.get("border")),
            ),
            CssRule::element(
                node.id,
                "cell",
                Declarations::new()
                    .with_opt("background", node.get("background-color"))
                    .with_opt("font-size", node.get("font-size"))
                    .with_opt("font-family", node.get("font-family"))
                    .with_opt("font-weight", node.get("font-weight"))
                    .with_opt("letter-spacing", node.get("letter-spacing"))
                    .with_opt("line-height", node.get("line-height"))
                    .with_opt("color", node.get("color"))
                    .with_opt("padding", node.get("padding")),
            ),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!(
            "<table{}{}><tbody><tr><td{}{}> {} </td></tr></tbody></table>",
            TABLE,
            ctx.style(node, "table"),
            ctx.class_attr(node, &[]),
            ctx.style(node, "cell"),
            collapse_whitespace(&node.content)
        )
    }
}
