//! Content components rendered inside column cells

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations};
use crate::layout::units::padding_of;
use crate::layout::{format_number, format_px, parse_px, to_pixels};
use crate::parser::Node;
use crate::renderer::escape_attr;

use super::{
    attr, cell_rule, lower_breakpoint, Component, Family, RenderContext, RuleContext, ALIGN,
    LENGTH, PX, VERTICAL_ALIGN,
};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(MjText),
        Arc::new(MjImage),
        Arc::new(MjButton),
        Arc::new(MjDivider),
        Arc::new(MjSpacer),
        Arc::new(MjTable),
        Arc::new(MjRaw),
    ]
}

pub(super) const DEFAULT_FONT: &str = "Ubuntu, Helvetica, Arial, sans-serif";

const PRESENTATION: &str =
    r#" border="0" cellpadding="0" cellspacing="0" role="presentation""#;

const TEXT_ALIGN: AttrType = AttrType::Enum(&["left", "right", "center", "justify"]);

/// Typography shared by text-like parts; `align` maps to `text-align`
pub(super) fn typography(node: &Node) -> Declarations {
    Declarations::new()
        .with_opt("font-family", node.get("font-family"))
        .with_opt("font-size", node.get("font-size"))
        .with_opt("font-style", node.get("font-style"))
        .with_opt("font-weight", node.get("font-weight"))
        .with_opt("letter-spacing", node.get("letter-spacing"))
        .with_opt("line-height", node.get("line-height"))
        .with_opt("text-decoration", node.get("text-decoration"))
        .with_opt("text-transform", node.get("text-transform"))
        .with_opt("color", node.get("color"))
}

/// Width inside the cell's horizontal padding
fn content_width(node: &Node, ctx_width: f64) -> f64 {
    (ctx_width - padding_of(node, "padding").horizontal()).max(0.0)
}

struct MjText;

impl Component for MjText {
    fn tag(&self) -> &'static str {
        "mj-text"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "left"),
            ("color", "#000000"),
            ("font-family", DEFAULT_FONT),
            ("font-size", "13px"),
            ("line-height", "1"),
            ("padding", "10px 25px"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", TEXT_ALIGN),
            ("color", AttrType::Color),
            ("container-background-color", AttrType::Color),
            ("font-size", PX),
            ("height", PX),
            ("padding", AttrType::Boxed),
        ]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let text = typography(node)
            .with_opt("text-align", node.get("align"))
            .with_opt("height", node.get("height"));
        vec![cell_rule(node), CssRule::element(node.id, "text", text)]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!("<div{}>{}</div>", ctx.style(node, "text"), node.content.trim())
    }
}

struct MjImage;

impl MjImage {
    /// Rendered pixel width: the attribute, capped by the cell
    fn width(node: &Node, frame_width: f64) -> f64 {
        let available = content_width(node, frame_width);
        node.get("width")
            .and_then(parse_px)
            .map_or(available, |w| w.min(available))
    }

    fn fluid(node: &Node) -> bool {
        node.get("fluid-on-mobile") == Some("true")
    }
}

impl Component for MjImage {
    fn tag(&self) -> &'static str {
        "mj-image"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "center"),
            ("border", "0"),
            ("height", "auto"),
            ("padding", "10px 25px"),
            ("target", "_blank"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("container-background-color", AttrType::Color),
            ("fluid-on-mobile", AttrType::Enum(&["true", "false"])),
            ("height", AttrType::Unit(&["px", "auto"])),
            ("padding", AttrType::Boxed),
            ("width", PX),
        ]
    }

    fn required(&self) -> &'static [&'static str] {
        &["src"]
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let width = Self::width(node, ctx.frame.width);
        let img = Declarations::new()
            .with_opt("border", node.get("border"))
            .with_opt("border-radius", node.get("border-radius"))
            .with("display", "block")
            .with("outline", "none")
            .with("text-decoration", "none")
            .with_opt("height", node.get("height"))
            .with_opt("max-height", node.get("max-height"))
            .with("width", "100%")
            .with("font-size", "13px");

        let mut rules = vec![
            cell_rule(node),
            CssRule::element(
                node.id,
                "table",
                Declarations::new()
                    .with("border-collapse", "collapse")
                    .with("border-spacing", "0px"),
            ),
            CssRule::element(
                node.id,
                "td",
                Declarations::new().with("width", format_px(width)),
            ),
            CssRule::element(node.id, "img", img),
        ];
        if Self::fluid(node) {
            rules.push(CssRule::verbatim(
                node.id,
                format!(
                    "@media only screen and (max-width:{}) {{ table.mj-full-width-mobile {{ width: 100% !important; }} td.mj-full-width-mobile {{ width: auto !important; }} }}",
                    lower_breakpoint(ctx.breakpoint)
                ),
            ));
        }
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let width = Self::width(node, ctx.frame(node).width);
        let height = match node.get("height") {
            Some(h) if h != "auto" => parse_px(h).map(format_number),
            _ => Some("auto".to_string()),
        };
        let fluid = if Self::fluid(node) {
            r#" class="mj-full-width-mobile""#
        } else {
            ""
        };

        let img = format!(
            r#"<img alt="{}"{}{}{} src="{}"{}{} width="{}">"#,
            escape_attr(node.get("alt").unwrap_or("")),
            attr("height", height.as_deref()),
            ctx.style(node, "img"),
            attr("srcset", node.get("srcset")),
            escape_attr(node.get("src").unwrap_or("")),
            attr("title", node.get("title")),
            attr("usemap", node.get("usemap")),
            format_number(width.floor())
        );
        let content = match node.get("href") {
            Some(href) => format!(
                r#"<a href="{}"{}{}{}>{}</a>"#,
                escape_attr(href),
                attr("target", node.get("target")),
                attr("rel", node.get("rel")),
                attr("name", node.get("name")),
                img
            ),
            None => img,
        };

        format!(
            "<table{}{}{}><tbody><tr><td{}{}>{}</td></tr></tbody></table>",
            PRESENTATION,
            fluid,
            ctx.style(node, "table"),
            fluid,
            ctx.style(node, "td"),
            content
        )
    }
}

/// Call-to-action link styled as a button; a `<p>` when there is no `href`
struct MjButton;

impl Component for MjButton {
    fn tag(&self) -> &'static str {
        "mj-button"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "center"),
            ("background-color", "#414141"),
            ("border", "none"),
            ("border-radius", "3px"),
            ("color", "#ffffff"),
            ("font-family", DEFAULT_FONT),
            ("font-size", "13px"),
            ("font-weight", "normal"),
            ("inner-padding", "10px 25px"),
            ("line-height", "120%"),
            ("padding", "10px 25px"),
            ("target", "_blank"),
            ("text-decoration", "none"),
            ("text-transform", "none"),
            ("vertical-align", "middle"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("background-color", AttrType::Color),
            ("color", AttrType::Color),
            ("container-background-color", AttrType::Color),
            ("font-size", PX),
            ("inner-padding", AttrType::Boxed),
            ("padding", AttrType::Boxed),
            ("vertical-align", VERTICAL_ALIGN),
            ("width", LENGTH),
        ]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let background = node.get("background-color");
        let link = typography(node)
            .with("display", "inline-block")
            .with_opt("width", node.get("width"))
            .with_opt("background", background)
            .with("margin", "0")
            .with_opt("padding", node.get("inner-padding"))
            .with_opt("border-radius", node.get("border-radius"));

        vec![
            cell_rule(node),
            CssRule::element(
                node.id,
                "table",
                Declarations::new()
                    .with("border-collapse", "separate")
                    .with_opt("width", node.get("width"))
                    .with("line-height", "100%"),
            ),
            CssRule::element(
                node.id,
                "td",
                Declarations::new()
                    .with_opt("border", node.get("border"))
                    .with_opt("border-radius", node.get("border-radius"))
                    .with("cursor", "auto")
                    .with_opt("font-style", node.get("font-style"))
                    .with_opt("height", node.get("height"))
                    .with_opt("text-align", node.get("text-align"))
                    .with_opt("background", background),
            ),
            CssRule::element(node.id, "link", link),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let label = node.content.trim();
        let inner = match node.get("href") {
            Some(href) => format!(
                r#"<a href="{}"{}{}{}>{}</a>"#,
                escape_attr(href),
                attr("rel", node.get("rel")),
                attr("target", node.get("target")),
                ctx.style(node, "link"),
                label
            ),
            None => format!("<p{}>{}</p>", ctx.style(node, "link"), label),
        };
        format!(
            r#"<table{}{}><tbody><tr><td align="center"{} role="presentation"{}{}>{}</td></tr></tbody></table>"#,
            PRESENTATION,
            ctx.style(node, "table"),
            attr("bgcolor", node.get("background-color")),
            ctx.style(node, "td"),
            attr("valign", node.get("vertical-align")),
            inner
        )
    }
}

struct MjDivider;

impl Component for MjDivider {
    fn tag(&self) -> &'static str {
        "mj-divider"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "center"),
            ("border-color", "#000000"),
            ("border-style", "solid"),
            ("border-width", "4px"),
            ("padding", "10px 25px"),
            ("width", "100%"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("border-color", AttrType::Color),
            ("border-width", PX),
            ("container-background-color", AttrType::Color),
            ("padding", AttrType::Boxed),
            ("width", LENGTH),
        ]
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let border = [
            node.get_or("border-style", "solid"),
            node.get_or("border-width", "4px"),
            node.get_or("border-color", "#000000"),
        ]
        .join(" ");
        let margin = match node.get("align") {
            Some("left") => "0px",
            Some("right") => "0px 0px 0px auto",
            _ => "0px auto",
        };
        vec![
            cell_rule(node),
            CssRule::element(
                node.id,
                "line",
                Declarations::new()
                    .with("border-top", border)
                    .with("font-size", "1px")
                    .with("margin", margin)
                    .with_opt("width", node.get("width")),
            ),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!("<p{}></p>", ctx.style(node, "line"))
    }
}

struct MjSpacer;

impl Component for MjSpacer {
    fn tag(&self) -> &'static str {
        "mj-spacer"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[("height", "20px")]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("container-background-color", AttrType::Color),
            ("height", LENGTH),
            ("padding", AttrType::Boxed),
        ]
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let height = node.get("height");
        vec![
            cell_rule(node),
            CssRule::element(
                node.id,
                "space",
                Declarations::new()
                    .with_opt("height", height)
                    .with_opt("line-height", height),
            ),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!("<div{}>&#8202;</div>", ctx.style(node, "space"))
    }
}

/// Author HTML table rows inside a styled `<table>`
struct MjTable;

impl Component for MjTable {
    fn tag(&self) -> &'static str {
        "mj-table"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "left"),
            ("border", "none"),
            ("cellpadding", "0"),
            ("cellspacing", "0"),
            ("color", "#000000"),
            ("font-family", DEFAULT_FONT),
            ("font-size", "13px"),
            ("line-height", "22px"),
            ("padding", "10px 25px"),
            ("table-layout", "auto"),
            ("width", "100%"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("cellpadding", AttrType::Integer),
            ("cellspacing", AttrType::Integer),
            ("color", AttrType::Color),
            ("container-background-color", AttrType::Color),
            ("padding", AttrType::Boxed),
            ("table-layout", AttrType::Enum(&["auto", "fixed", "initial", "inherit"])),
            ("width", AttrType::Unit(&["px", "%", "auto"])),
        ]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let table = Declarations::new()
            .with_opt("color", node.get("color"))
            .with_opt("font-family", node.get("font-family"))
            .with_opt("font-size", node.get("font-size"))
            .with_opt("line-height", node.get("line-height"))
            .with_opt("table-layout", node.get("table-layout"))
            .with_opt("width", node.get("width"))
            .with_opt("border", node.get("border"));
        vec![cell_rule(node), CssRule::element(node.id, "table", table)]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let width = node.get("width").map(|w| match w {
            "auto" => "auto".to_string(),
            w => match to_pixels(w, ctx.frame(node).width) {
                Some(_) if w.ends_with('%') => w.to_string(),
                Some(px) => format_number(px),
                None => w.to_string(),
            },
        });
        format!(
            r#"<table{}{}{} border="0"{}{}>{}</table>"#,
            attr("cellpadding", node.get("cellpadding")),
            attr("cellspacing", node.get("cellspacing")),
            attr("role", node.get("role")),
            ctx.style(node, "table"),
            attr("width", width.as_deref()),
            node.content.trim()
        )
    }
}

/// Verbatim HTML, never wrapped in a cell
struct MjRaw;

impl Component for MjRaw {
    fn tag(&self) -> &'static str {
        "mj-raw"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn render(&self, node: &Node, _ctx: &RenderContext<'_>) -> String {
        node.content.clone()
    }
}
