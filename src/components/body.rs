//! Body and layout containers

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations};
use crate::layout::units::{horizontal_borders, padding_of};
use crate::layout::{format_px, normalize_widths, parse_px, Frame, WidthSpec};
use crate::parser::Node;
use crate::renderer::HeadMetadata;

use super::{
    attr, Component, Family, RenderContext, RuleContext, ALIGN, DIRECTION, LENGTH, PX,
    VERTICAL_ALIGN,
};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(MjBody),
        Arc::new(Section {
            tag: "mj-section",
        }),
        Arc::new(Section {
            tag: "mj-wrapper",
        }),
        Arc::new(MjColumn),
        Arc::new(MjGroup),
        Arc::new(MjHero),
    ]
}

const PRESENTATION: &str =
    r#" border="0" cellpadding="0" cellspacing="0" role="presentation""#;

/// Background declarations for `background-color` / `background-url`
fn background(node: &Node) -> Declarations {
    let color = node.get("background-color");
    let Some(url) = node.get("background-url") else {
        return Declarations::new()
            .with_opt("background", color)
            .with_opt("background-color", color);
    };

    let position = node.get_or("background-position", "top center");
    let size = node.get_or("background-size", "auto");
    let repeat = node.get_or("background-repeat", "repeat");
    let image = format!("url('{url}')");
    let shorthand = [color.unwrap_or(""), &image, position, "/", size, repeat]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Declarations::new()
        .with("background", shorthand)
        .with("background-position", position)
        .with("background-repeat", repeat)
        .with("background-size", size)
}

/// Border and padding declarations, shorthand first then per-side overrides
fn box_edges(node: &Node, decls: Declarations, prefixes: &[&str]) -> Declarations {
    let mut decls = decls;
    for prefix in prefixes {
        decls = decls.with_opt(prefix, node.get(prefix));
        for side in ["top", "right", "bottom", "left"] {
            let name = format!("{prefix}-{side}");
            if let Some(value) = node.get(&name) {
                decls.set(name, value);
            }
        }
    }
    decls
}

/// Whether any padding attribute is set on the node
fn has_padding(node: &Node) -> bool {
    ["padding", "padding-top", "padding-right", "padding-bottom", "padding-left"]
        .iter()
        .any(|name| node.has(name))
}

fn is_column(node: &Node) -> bool {
    node.tag == "mj-column" || node.tag == "mj-group"
}

/// Frames for a row of columns sharing `width` pixels.
///
/// Columns and groups split the row; anything else gets the whole width.
fn column_frames(node: &Node, width: f64) -> Vec<Frame> {
    let specs: Vec<Option<WidthSpec>> = node
        .children
        .iter()
        .filter(|c| is_column(c))
        .map(|c| c.get("width").and_then(WidthSpec::parse))
        .collect();
    let mut widths = normalize_widths(&specs, width).into_iter();

    node.children
        .iter()
        .enumerate()
        .map(|(index, child)| {
            let spec = if is_column(child) { widths.next() } else { None };
            Frame {
                width: spec.map_or(width, |s| s.pixels(width)),
                column: spec,
                index,
            }
        })
        .collect()
}

/// Width left inside padding and borders
fn inner_width(node: &Node, frame: &Frame) -> f64 {
    (frame.width - padding_of(node, "padding").horizontal() - horizontal_borders(node, "border"))
        .max(0.0)
}

/// Responsive width for a column or group above the breakpoint
fn width_media_rule(node: &Node, spec: WidthSpec, breakpoint: &str) -> CssRule {
    CssRule::media(
        node.id,
        &format!("only screen and (min-width:{breakpoint})"),
        &format!(".{}", spec.class_name()),
        &Declarations::new()
            .with("width", format!("{} !important", spec.css_value()))
            .with("max-width", spec.css_value()),
    )
}

fn column_spec(frame: &Frame) -> WidthSpec {
    frame.column.unwrap_or(WidthSpec::Percent(100.0))
}

struct MjBody;

impl Component for MjBody {
    fn tag(&self) -> &'static str {
        "mj-body"
    }

    fn family(&self) -> Family {
        Family::Container
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[("width", "600px")]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[("width", PX), ("background-color", AttrType::Color)]
    }

    fn contribute_head(&self, node: &Node, head: &mut HeadMetadata) {
        if let Some(width) = node.get("width").and_then(parse_px) {
            head.body_width = width;
        }
        head.background_color = node.get("background-color").map(str::to_string);
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        vec![CssRule::element(
            node.id,
            "outer",
            Declarations::new().with_opt("background-color", node.get("background-color")),
        )]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let lang = ctx.head.language.as_deref().unwrap_or(&ctx.config.language);
        let dir = ctx.head.direction.as_deref().unwrap_or(&ctx.config.direction);
        format!(
            "<div{}{}{}{}>{}</div>",
            ctx.class_attr(node, &[]),
            ctx.style(node, "outer"),
            attr("lang", Some(lang)),
            attr("dir", Some(dir)),
            ctx.render_children(node)
        )
    }
}

/// A full-width row: `mj-section`, or `mj-wrapper` grouping sections
struct Section {
    tag: &'static str,
}

impl Component for Section {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn family(&self) -> Family {
        Family::Container
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("background-position", "top center"),
            ("background-repeat", "repeat"),
            ("background-size", "auto"),
            ("direction", "ltr"),
            ("padding", "20px 0"),
            ("text-align", "center"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("background-repeat", AttrType::Enum(&["repeat", "no-repeat"])),
            ("direction", DIRECTION),
            ("full-width", AttrType::Enum(&["full-width", "false"])),
            ("padding", AttrType::Boxed),
            ("text-align", ALIGN),
        ]
    }

    fn child_frames(&self, node: &Node, frame: &Frame) -> Vec<Frame> {
        column_frames(node, inner_width(node, frame))
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let full_width = node.get("full-width") == Some("full-width");
        let radius = node.get("border-radius");
        let mut rules = Vec::new();

        let mut outer = Declarations::new();
        if full_width {
            let mut full = background(node).with("width", "100%");
            full = full.with_opt("border-radius", radius);
            rules.push(CssRule::element(node.id, "full", full));
        } else {
            outer = background(node);
        }
        outer = outer
            .with("margin", "0px auto")
            .with("max-width", format_px(ctx.frame.width))
            .with_opt("border-radius", radius);
        rules.push(CssRule::element(node.id, "outer", outer));

        let mut table = Declarations::new().with("width", "100%");
        if !full_width {
            table.overlay(&background(node));
        }
        rules.push(CssRule::element(
            node.id,
            "table",
            table.with_opt("border-radius", radius),
        ));

        let cell = box_edges(node, Declarations::new(), &["border"])
            .with_opt("direction", node.get("direction"))
            .with("font-size", "0px");
        let cell = box_edges(node, cell, &["padding"]).with_opt("text-align", node.get("text-align"));
        rules.push(CssRule::element(node.id, "cell", cell));
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let table = format!(
            r#"<table align="center"{}{}{}><tbody><tr><td{}>{}</td></tr></tbody></table>"#,
            PRESENTATION,
            attr("background", node.get("background-url")),
            ctx.style(node, "table"),
            ctx.style(node, "cell"),
            ctx.render_children(node)
        );
        let outer = format!(
            "<div{}{}>{}</div>",
            ctx.class_attr(node, &[]),
            ctx.style(node, "outer"),
            table
        );

        if node.get("full-width") == Some("full-width") {
            format!(
                r#"<table align="center"{}{}{}><tbody><tr><td>{}</td></tr></tbody></table>"#,
                PRESENTATION,
                attr("background", node.get("background-url")),
                ctx.style(node, "full"),
                outer
            )
        } else {
            outer
        }
    }
}

struct MjColumn;

impl MjColumn {
    fn edges(node: &Node, decls: Declarations) -> Declarations {
        box_edges(node, decls, &["border"]).with_opt("border-radius", node.get("border-radius"))
    }
}

impl Component for MjColumn {
    fn tag(&self) -> &'static str {
        "mj-column"
    }

    fn family(&self) -> Family {
        Family::Container
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[("direction", "ltr"), ("vertical-align", "top")]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("direction", DIRECTION),
            ("inner-background-color", AttrType::Color),
            ("padding", AttrType::Boxed),
            ("vertical-align", VERTICAL_ALIGN),
            ("width", LENGTH),
        ]
    }

    fn child_frames(&self, node: &Node, frame: &Frame) -> Vec<Frame> {
        let width = inner_width(node, frame);
        (0..node.children.len())
            .map(|i| Frame::with_width(width).child(i))
            .collect()
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let spec = column_spec(&ctx.frame);
        let vertical_align = node.get("vertical-align");
        let mut rules = vec![
            CssRule::element(
                node.id,
                "outer",
                Declarations::new()
                    .with("font-size", "0px")
                    .with("text-align", "left")
                    .with_opt("direction", node.get("direction"))
                    .with("display", "inline-block")
                    .with_opt("vertical-align", vertical_align)
                    .with("width", "100%"),
            ),
            width_media_rule(node, spec, ctx.breakpoint),
        ];

        if has_padding(node) {
            let gutter = Self::edges(
                node,
                Declarations::new().with_opt("background-color", node.get("background-color")),
            );
            let gutter =
                box_edges(node, gutter, &["padding"]).with_opt("vertical-align", vertical_align);
            rules.push(CssRule::element(node.id, "gutter", gutter));
            rules.push(CssRule::element(
                node.id,
                "table",
                Declarations::new()
                    .with_opt("background-color", node.get("inner-background-color"))
                    .with_opt("border", node.get("inner-border"))
                    .with_opt("border-radius", node.get("inner-border-radius")),
            ));
        } else {
            let table = Self::edges(
                node,
                Declarations::new().with_opt("background-color", node.get("background-color")),
            )
            .with_opt("vertical-align", vertical_align);
            rules.push(CssRule::element(node.id, "table", table));
        }
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let class = column_spec(&ctx.frame(node)).class_name();
        let table = format!(
            r#"<table{}{} width="100%"><tbody>{}</tbody></table>"#,
            PRESENTATION,
            ctx.style(node, "table"),
            ctx.render_cells(node)
        );
        let body = if has_padding(node) {
            format!(
                r#"<table{} width="100%"><tbody><tr><td{}>{}</td></tr></tbody></table>"#,
                PRESENTATION,
                ctx.style(node, "gutter"),
                table
            )
        } else {
            table
        };
        format!(
            "<div{}{}>{}</div>",
            ctx.class_attr(node, &[class.as_str()]),
            ctx.style(node, "outer"),
            body
        )
    }
}

/// Columns that never stack on small screens
struct MjGroup;

impl Component for MjGroup {
    fn tag(&self) -> &'static str {
        "mj-group"
    }

    fn family(&self) -> Family {
        Family::Container
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[("direction", "ltr")]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("direction", DIRECTION),
            ("vertical-align", VERTICAL_ALIGN),
            ("width", LENGTH),
        ]
    }

    fn child_frames(&self, node: &Node, frame: &Frame) -> Vec<Frame> {
        column_frames(node, frame.width)
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        vec![
            CssRule::element(
                node.id,
                "outer",
                Declarations::new()
                    .with("font-size", "0")
                    .with("line-height", "0")
                    .with("text-align", "left")
                    .with("display", "inline-block")
                    .with("width", "100%")
                    .with_opt("direction", node.get("direction"))
                    .with_opt("vertical-align", node.get("vertical-align"))
                    .with_opt("background-color", node.get("background-color")),
            ),
            width_media_rule(node, column_spec(&ctx.frame), ctx.breakpoint),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let class = column_spec(&ctx.frame(node)).class_name();
        format!(
            "<div{}{}>{}</div>",
            ctx.class_attr(node, &[class.as_str()]),
            ctx.style(node, "outer"),
            ctx.render_children(node)
        )
    }
}

/// Full-width banner with a background image
struct MjHero;

impl Component for MjHero {
    fn tag(&self) -> &'static str {
        "mj-hero"
    }

    fn family(&self) -> Family {
        Family::Container
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("background-color", "#ffffff"),
            ("background-position", "center center"),
            ("height", "0px"),
            ("mode", "fixed-height"),
            ("padding", "0px"),
            ("vertical-align", "top"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("height", PX),
            ("mode", AttrType::Enum(&["fixed-height", "fluid-height"])),
            ("padding", AttrType::Boxed),
            ("vertical-align", VERTICAL_ALIGN),
        ]
    }

    fn child_frames(&self, node: &Node, frame: &Frame) -> Vec<Frame> {
        let width = inner_width(node, frame);
        (0..node.children.len())
            .map(|i| Frame::with_width(width).child(i))
            .collect()
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let color = node.get("background-color");
        let position = node.get_or("background-position", "center center");
        let hero_background = match node.get("background-url") {
            Some(url) => Declarations::new()
                .with(
                    "background",
                    format!(
                        "{} url('{url}') no-repeat {position} / cover",
                        color.unwrap_or("")
                    )
                    .trim()
                    .to_string(),
                )
                .with("background-position", position)
                .with("background-repeat", "no-repeat"),
            None => Declarations::new().with_opt("background", color),
        };

        let mut hero = box_edges(node, hero_background, &["padding"])
            .with_opt("vertical-align", node.get("vertical-align"));
        if node.get("mode") == Some("fixed-height") {
            let height = node.get("height").and_then(parse_px).unwrap_or(0.0);
            let content = (height - padding_of(node, "padding").vertical()).max(0.0);
            hero = hero.with("height", format_px(content));
        }

        let inner = inner_width(node, &ctx.frame);
        vec![
            CssRule::element(
                node.id,
                "outer",
                Declarations::new()
                    .with("margin", "0 auto")
                    .with("max-width", format_px(ctx.frame.width)),
            ),
            CssRule::element(node.id, "table", Declarations::new().with("width", "100%")),
            CssRule::element(node.id, "hero", hero),
            CssRule::element(
                node.id,
                "inner",
                Declarations::new()
                    .with("margin", "0px auto")
                    .with("max-width", format_px(inner)),
            ),
            CssRule::element(node.id, "content", Declarations::new().with("width", "100%")),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!(
            concat!(
                "<div{class}{outer}>",
                r#"<table align="center"{pres}{table}><tbody><tr>"#,
                "<td{background}{hero}>",
                "<div{inner}><table{pres}{content}><tbody>{cells}</tbody></table></div>",
                "</td></tr></tbody></table></div>"
            ),
            class = ctx.class_attr(node, &[]),
            outer = ctx.style(node, "outer"),
            pres = PRESENTATION,
            table = ctx.style(node, "table"),
            background = attr("background", node.get("background-url")),
            hero = ctx.style(node, "hero"),
            inner = ctx.style(node, "inner"),
            content = ctx.style(node, "content"),
            cells = ctx.render_cells(node),
        )
    }
}
