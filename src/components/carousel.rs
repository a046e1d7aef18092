//! Image carousel driven by radio inputs and sibling selectors

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations};
use crate::layout::units::padding_of;
use crate::layout::{format_number, format_px, parse_px, Frame};
use crate::parser::Node;
use crate::renderer::escape_attr;

use super::{attr, cell_rule, Component, Family, RenderContext, RuleContext, ALIGN, PX};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![Arc::new(MjCarousel), Arc::new(MjCarouselImage)]
}

const IMAGE_TAG: &str = "mj-carousel-image";

/// Widest automatic thumbnail
const MAX_THUMBNAIL_WIDTH: f64 = 110.0;

struct MjCarousel;

impl MjCarousel {
    /// Class prefix, unique per document and stable across runs
    fn carousel_id(node: &Node) -> String {
        format!("mj-carousel-{}", node.id.0)
    }

    fn images(node: &Node) -> impl Iterator<Item = &Node> {
        node.children.iter().filter(|c| c.tag == IMAGE_TAG)
    }

    fn thumbnails_visible(node: &Node) -> bool {
        node.get("thumbnails") != Some("hidden")
    }

    fn icon_width(node: &Node) -> String {
        format_number(node.get("icon-width").and_then(parse_px).unwrap_or(44.0))
    }

    fn inner_width(node: &Node, frame: &Frame) -> f64 {
        (frame.width - padding_of(node, "padding").horizontal()).max(0.0)
    }

    fn thumbnail_width(node: &Node, frame: &Frame, count: usize) -> String {
        match node.get("tb-width") {
            Some(width) => width.to_string(),
            None => {
                let share = Self::inner_width(node, frame) / count.max(1) as f64;
                format_px(share.min(MAX_THUMBNAIL_WIDTH))
            }
        }
    }

    /// Head rules that switch slides, arrows and thumbnails for `count` images
    fn interaction_css(node: &Node, count: usize) -> Vec<String> {
        let cid = Self::carousel_id(node);
        let siblings = |n: usize| "+*".repeat(n);
        let block = |selectors: Vec<String>, body: &str| {
            format!("{} {{ {} }}", selectors.join(", "), body)
        };
        let checked = |i: usize, target: &str| {
            format!(
                ".{cid}-radio-{i}:checked{}+.mj-carousel-content {target}",
                siblings(count - i)
            )
        };

        let mut css = vec![
            ".mj-carousel { -webkit-user-select:none; -moz-user-select:none; user-select:none; }"
                .to_string(),
            format!(
                ".{cid}-icons-cell {{ display:table-cell !important; width:{}px !important; }}",
                Self::icon_width(node)
            ),
            ".mj-carousel-radio, .mj-carousel-next, .mj-carousel-previous { display:none !important; }"
                .to_string(),
            ".mj-carousel-thumbnail, .mj-carousel-next, .mj-carousel-previous { touch-action:manipulation; }"
                .to_string(),
            block(
                (0..count)
                    .map(|level| {
                        format!(
                            ".{cid}-radio:checked{}+.mj-carousel-content .mj-carousel-image",
                            siblings(level)
                        )
                    })
                    .collect(),
                "display:none !important;",
            ),
            block(
                (1..=count)
                    .map(|i| checked(i, &format!(".mj-carousel-image-{i}")))
                    .collect(),
                "display:block !important;",
            ),
        ];

        let mut navigation = vec![
            ".mj-carousel-previous-icons".to_string(),
            ".mj-carousel-next-icons".to_string(),
        ];
        navigation.extend(
            (1..=count).map(|i| checked(i, &format!(".mj-carousel-next-{}", i % count + 1))),
        );
        navigation.extend(
            (1..=count)
                .map(|i| checked(i, &format!(".mj-carousel-previous-{}", (i + count - 2) % count + 1))),
        );
        css.push(block(navigation, "display:block !important;"));

        if !Self::thumbnails_visible(node) {
            return css;
        }

        if let Some(color) = node.get("tb-selected-border-color") {
            css.push(block(
                (1..=count)
                    .map(|i| checked(i, &format!(".{cid}-thumbnail-{i}")))
                    .collect(),
                &format!("border-color:{color} !important;"),
            ));
        }
        css.push(block(
            (1..=count)
                .map(|i| checked(i, &format!(".{cid}-thumbnail")))
                .collect(),
            "display:inline-block !important;",
        ));
        css.push(
            ".mj-carousel-image img+div, .mj-carousel-thumbnail img+div { display:none !important; }"
                .to_string(),
        );
        css.push(block(
            (0..count)
                .rev()
                .map(|level| {
                    format!(
                        ".{cid}-thumbnail:hover{}+.mj-carousel-main .mj-carousel-image",
                        siblings(level)
                    )
                })
                .collect(),
            "display:none !important;",
        ));
        if let Some(color) = node.get("tb-hover-border-color") {
            css.push(format!(
                ".mj-carousel-thumbnail:hover {{ border-color:{color} !important; }}"
            ));
        }
        css.push(block(
            (1..=count)
                .map(|i| {
                    format!(
                        ".{cid}-thumbnail-{i}:hover{}+.mj-carousel-main .mj-carousel-image-{i}",
                        siblings(count - i)
                    )
                })
                .collect(),
            "display:block !important;",
        ));
        css
    }

    fn radios(node: &Node, ctx: &RenderContext<'_>, count: usize) -> String {
        let cid = Self::carousel_id(node);
        (1..=count)
            .map(|i| {
                format!(
                    r#"<input class="mj-carousel-radio {cid}-radio {cid}-radio-{i}"{} type="radio" name="mj-carousel-radio-{}" id="{cid}-radio-{i}"{}>"#,
                    if i == 1 { r#" checked="checked""# } else { "" },
                    node.id.0,
                    ctx.style(node, "radio")
                )
            })
            .collect()
    }

    fn thumbnails(node: &Node, ctx: &RenderContext<'_>) -> String {
        if !Self::thumbnails_visible(node) {
            return String::new();
        }
        let cid = Self::carousel_id(node);
        let images: Vec<&Node> = Self::images(node).collect();
        let width = Self::thumbnail_width(node, &ctx.frame(node), images.len());
        let width = parse_px(&width).map(format_number).unwrap_or(width);

        images
            .iter()
            .enumerate()
            .map(|(n, image)| {
                let i = n + 1;
                let src = image.get("thumbnails-src").or_else(|| image.get("src"));
                format!(
                    concat!(
                        r##"<a{style} href="#{i}" target="_blank" class="mj-carousel-thumbnail {cid}-thumbnail {cid}-thumbnail-{i}">"##,
                        r#"<label for="{cid}-radio-{i}"><img{img} src="{src}" alt="{alt}" width="{width}"></label></a>"#
                    ),
                    style = ctx.style(image, "thumbnail"),
                    i = i,
                    cid = cid,
                    img = ctx.style(node, "thumbnail-img"),
                    src = escape_attr(src.unwrap_or("")),
                    alt = escape_attr(image.get("alt").unwrap_or("")),
                    width = width,
                )
            })
            .collect()
    }

    fn icons(node: &Node, ctx: &RenderContext<'_>, count: usize, direction: &str) -> String {
        let cid = Self::carousel_id(node);
        let src = match direction {
            "previous" => node.get("left-icon"),
            _ => node.get("right-icon"),
        };
        let width = Self::icon_width(node);
        let labels: String = (1..=count)
            .map(|i| {
                format!(
                    r#"<label for="{cid}-radio-{i}" class="mj-carousel-{direction} mj-carousel-{direction}-{i}"><img src="{}" alt="{direction}"{} width="{width}"></label>"#,
                    escape_attr(src.unwrap_or("")),
                    ctx.style(node, "icon-img"),
                )
            })
            .collect();
        format!(
            r#"<td class="{cid}-icons-cell"{}><div class="mj-carousel-{direction}-icons"{}>{labels}</div></td>"#,
            ctx.style(node, "icons-cell"),
            ctx.style(node, "icons"),
        )
    }
}

impl Component for MjCarousel {
    fn tag(&self) -> &'static str {
        "mj-carousel"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "center"),
            ("border-radius", "6px"),
            ("icon-width", "44px"),
            ("left-icon", "https://i.imgur.com/xTh3hln.png"),
            ("right-icon", "https://i.imgur.com/os7o9kz.png"),
            ("tb-border", "2px solid transparent"),
            ("tb-border-radius", "6px"),
            ("tb-hover-border-color", "#fead0d"),
            ("tb-selected-border-color", "#cccccc"),
            ("thumbnails", "visible"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("container-background-color", AttrType::Color),
            ("icon-width", PX),
            ("padding", AttrType::Boxed),
            ("tb-hover-border-color", AttrType::Color),
            ("tb-selected-border-color", AttrType::Color),
            ("tb-width", PX),
            ("thumbnails", AttrType::Enum(&["visible", "hidden"])),
        ]
    }

    fn child_frames(&self, node: &Node, frame: &Frame) -> Vec<Frame> {
        let width = Self::inner_width(node, frame);
        let mut position = 0;
        node.children
            .iter()
            .map(|child| {
                let index = position;
                if child.tag == IMAGE_TAG {
                    position += 1;
                }
                Frame::with_width(width).child(index)
            })
            .collect()
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let count = Self::images(node).count();
        let mut rules = vec![cell_rule(node)];
        if count == 0 {
            return rules;
        }

        let hidden = || {
            Declarations::new()
                .with("display", "none")
                .with("mso-hide", "all")
        };
        rules.extend([
            CssRule::element(node.id, "radio", hidden()),
            CssRule::element(
                node.id,
                "content",
                Declarations::new()
                    .with("display", "table")
                    .with("width", "100%")
                    .with("table-layout", "fixed")
                    .with("text-align", "center")
                    .with("font-size", "0px"),
            ),
            CssRule::element(
                node.id,
                "main",
                Declarations::new()
                    .with("caption-side", "top")
                    .with("display", "table-caption")
                    .with("table-layout", "fixed")
                    .with("width", "100%"),
            ),
            CssRule::element(
                node.id,
                "icons-cell",
                hidden().with("font-size", "0px").with("padding", "0px"),
            ),
            CssRule::element(node.id, "icons", hidden()),
            CssRule::element(
                node.id,
                "icon-img",
                Declarations::new()
                    .with("display", "block")
                    .with("width", format!("{}px", Self::icon_width(node)))
                    .with("height", "auto"),
            ),
            CssRule::element(
                node.id,
                "images-cell",
                Declarations::new().with("padding", "0px"),
            ),
            CssRule::element(
                node.id,
                "thumbnail-img",
                Declarations::new()
                    .with("display", "block")
                    .with("width", "100%")
                    .with("height", "auto"),
            ),
        ]);

        let thumbnail_width = Self::thumbnail_width(node, &ctx.frame, count);
        rules.extend(Self::images(node).map(|image| {
            CssRule::element(
                image.id,
                "thumbnail",
                Declarations::new()
                    .with_opt("border", node.get("tb-border"))
                    .with_opt("border-radius", node.get("tb-border-radius"))
                    .with("display", "inline-block")
                    .with("overflow", "hidden")
                    .with("width", thumbnail_width.as_str()),
            )
        }));
        rules.extend(
            Self::interaction_css(node, count)
                .into_iter()
                .map(|text| CssRule::verbatim(node.id, text)),
        );
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let count = Self::images(node).count();
        if count == 0 {
            return String::new();
        }
        let cid = Self::carousel_id(node);
        let slides: String = Self::images(node).map(|image| ctx.render_node(image)).collect();

        format!(
            concat!(
                r#"<div class="mj-carousel">{radios}"#,
                r#"<div class="mj-carousel-content {cid}-content"{content}>{thumbnails}"#,
                r#"<table{main} border="0" cellpadding="0" cellspacing="0" width="100%" role="presentation" class="mj-carousel-main"><tbody><tr>"#,
                r#"{previous}<td{images_cell}><div class="mj-carousel-images">{slides}</div></td>{next}"#,
                "</tr></tbody></table></div></div>"
            ),
            radios = Self::radios(node, ctx, count),
            cid = cid,
            content = ctx.style(node, "content"),
            thumbnails = Self::thumbnails(node, ctx),
            main = ctx.style(node, "main"),
            previous = Self::icons(node, ctx, count, "previous"),
            images_cell = ctx.style(node, "images-cell"),
            slides = slides,
            next = Self::icons(node, ctx, count, "next"),
        )
    }
}

/// One slide; only the first is visible before any interaction
struct MjCarouselImage;

impl Component for MjCarouselImage {
    fn tag(&self) -> &'static str {
        IMAGE_TAG
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[("target", "_blank")]
    }

    fn inheritable(&self) -> &'static [&'static str] {
        &["border-radius", "tb-border", "tb-border-radius"]
    }

    fn required(&self) -> &'static [&'static str] {
        &["src"]
    }

    fn class_part(&self) -> &'static str {
        "slide"
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let mut rules = vec![CssRule::element(
            node.id,
            "img",
            Declarations::new()
                .with_opt("border-radius", node.get("border-radius"))
                .with("display", "block")
                .with("width", format_px(ctx.frame.width))
                .with("max-width", "100%")
                .with("height", "auto"),
        )];
        if ctx.frame.index > 0 {
            rules.push(CssRule::element(
                node.id,
                "slide",
                Declarations::new()
                    .with("display", "none")
                    .with("mso-hide", "all"),
            ));
        }
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let frame = ctx.frame(node);
        let position = format!("mj-carousel-image-{}", frame.index + 1);
        let img = format!(
            r#"<img{} src="{}" alt="{}"{} width="{}" border="0">"#,
            attr("title", node.get("title")),
            escape_attr(node.get("src").unwrap_or("")),
            escape_attr(node.get("alt").unwrap_or("")),
            ctx.style(node, "img"),
            format_number(frame.width.floor())
        );
        let content = match node.get("href") {
            Some(href) => format!(
                r#"<a href="{}"{}{}>{}</a>"#,
                escape_attr(href),
                attr("rel", node.get("rel")),
                attr("target", node.get("target")),
                img
            ),
            None => img,
        };
        format!(
            "<div{}{}>{}</div>",
            ctx.class_attr(node, &["mj-carousel-image", position.as_str()]),
            ctx.style(node, "slide"),
            content
        )
    }
}
