//! Social sharing icons

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations};
use crate::layout::{format_number, parse_px};
use crate::parser::Node;
use crate::renderer::escape_attr;

use super::content::DEFAULT_FONT;
use super::{attr, cell_rule, Component, Family, RenderContext, RuleContext, ALIGN, LENGTH};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![Arc::new(MjSocial), Arc::new(MjSocialElement)]
}

const PRESENTATION: &str =
    r#" border="0" cellpadding="0" cellspacing="0" role="presentation""#;

const ICON_BASE: &str = "https://www.mailjet.com/images/theme/v1/icons/ico-social";

/// Built-in networks: name, icon background colour, share URL template
const NETWORKS: &[(&str, &str, &str)] = &[
    ("facebook", "#3b5998", "https://www.facebook.com/sharer/sharer.php?u=[[URL]]"),
    ("twitter", "#55acee", "https://twitter.com/intent/tweet?url=[[URL]]"),
    ("x", "#000000", "https://twitter.com/intent/tweet?url=[[URL]]"),
    ("google", "#dc4e41", "https://plus.google.com/share?url=[[URL]]"),
    (
        "pinterest",
        "#bd081c",
        "https://pinterest.com/pin/create/button/?url=[[URL]]&media=&description=",
    ),
    (
        "linkedin",
        "#0077b5",
        "https://www.linkedin.com/shareArticle?mini=true&url=[[URL]]&title=&summary=&source=",
    ),
    ("tumblr", "#35465c", "https://www.tumblr.com/widgets/share/tool?canonicalUrl=[[URL]]"),
    ("xing", "#296366", "https://www.xing.com/app/user?op=share&url=[[URL]]"),
    ("github", "#000000", "[[URL]]"),
    ("instagram", "#3f729b", "[[URL]]"),
    ("web", "#4BADE9", "[[URL]]"),
    ("snapchat", "#FFFA54", "[[URL]]"),
    ("youtube", "#EB3323", "[[URL]]"),
    ("vimeo", "#53B4E7", "[[URL]]"),
    ("medium", "#000000", "[[URL]]"),
    ("soundcloud", "#EF7F31", "[[URL]]"),
    ("dribbble", "#EA4C89", "[[URL]]"),
    ("tiktok", "#000000", "[[URL]]"),
    ("whatsapp", "#25D366", "https://api.whatsapp.com/send?text=[[URL]]"),
];

/// A known network, with `-noshare` meaning "link directly, do not share"
#[derive(Debug, Clone, Copy, PartialEq)]
struct Network {
    name: &'static str,
    color: &'static str,
    share: &'static str,
    no_share: bool,
}

impl Network {
    fn lookup(name: &str) -> Option<Self> {
        let (base, no_share) = match name.strip_suffix("-noshare") {
            Some(base) => (base, true),
            None => (name, false),
        };
        NETWORKS
            .iter()
            .find(|(n, _, _)| *n == base)
            .map(|&(name, color, share)| Network {
                name,
                color,
                share,
                no_share,
            })
    }

    fn icon(&self) -> String {
        let file = match self.name {
            "google" => "google-plus",
            name => name,
        };
        format!("{ICON_BASE}/{file}.png")
    }

    fn href(&self, url: &str) -> String {
        if self.no_share {
            url.to_string()
        } else {
            self.share.replace("[[URL]]", url)
        }
    }
}

fn network_of(node: &Node) -> Option<Network> {
    node.get("name").and_then(Network::lookup)
}

/// Link target of an element: the share URL for known networks
fn element_href(node: &Node) -> Option<String> {
    let href = node.get("href")?;
    Some(match network_of(node) {
        Some(network) => network.href(href),
        None => href.to_string(),
    })
}

struct MjSocial;

impl MjSocial {
    fn vertical(node: &Node) -> bool {
        node.get("mode") == Some("vertical")
    }
}

impl Component for MjSocial {
    fn tag(&self) -> &'static str {
        "mj-social"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "center"),
            ("border-radius", "3px"),
            ("color", "#333333"),
            ("font-family", DEFAULT_FONT),
            ("font-size", "13px"),
            ("icon-size", "20px"),
            ("inner-padding", "4px"),
            ("line-height", "22px"),
            ("mode", "horizontal"),
            ("padding", "10px 25px"),
            ("text-decoration", "none"),
            ("text-padding", "4px 4px 4px 0"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("color", AttrType::Color),
            ("container-background-color", AttrType::Color),
            ("icon-size", LENGTH),
            ("inner-padding", AttrType::Boxed),
            ("mode", AttrType::Enum(&["horizontal", "vertical"])),
            ("padding", AttrType::Boxed),
            ("text-padding", AttrType::Boxed),
        ]
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let table = if Self::vertical(node) {
            Declarations::new().with("margin", "0px")
        } else {
            Declarations::new()
                .with("float", "none")
                .with("display", "inline-table")
        };
        vec![cell_rule(node), CssRule::element(node.id, "table", table)]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let align = attr("align", node.get("align"));
        if Self::vertical(node) {
            return format!(
                "<table{}{}><tbody>{}</tbody></table>",
                PRESENTATION,
                ctx.style(node, "table"),
                ctx.render_children(node)
            );
        }
        node.children
            .iter()
            .map(|child| {
                format!(
                    "<table{}{}{}><tbody>{}</tbody></table>",
                    align,
                    PRESENTATION,
                    ctx.style(node, "table"),
                    ctx.render_node(child)
                )
            })
            .collect()
    }
}

/// One network icon with an optional label
struct MjSocialElement;

impl Component for MjSocialElement {
    fn tag(&self) -> &'static str {
        "mj-social-element"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("padding", "4px"),
            ("target", "_blank"),
            ("vertical-align", "middle"),
        ]
    }

    fn inheritable(&self) -> &'static [&'static str] {
        &[
            "align",
            "border-radius",
            "color",
            "font-family",
            "font-size",
            "font-style",
            "font-weight",
            "icon-height",
            "icon-padding",
            "icon-size",
            "inner-padding",
            "line-height",
            "text-decoration",
            "text-padding",
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("background-color", AttrType::Color),
            ("color", AttrType::Color),
            ("icon-size", LENGTH),
            ("padding", AttrType::Boxed),
        ]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn class_part(&self) -> &'static str {
        "row"
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let background = node
            .get("background-color")
            .or_else(|| network_of(node).map(|n| n.color));
        let icon_size = node.get("icon-size");
        let radius = node.get("border-radius");

        vec![
            CssRule::element(
                node.id,
                "td",
                Declarations::new()
                    .with_opt("padding", node.get("padding"))
                    .with_opt("vertical-align", node.get("vertical-align")),
            ),
            CssRule::element(
                node.id,
                "icon",
                Declarations::new()
                    .with_opt("background", background)
                    .with_opt("border-radius", radius)
                    .with_opt("width", icon_size),
            ),
            CssRule::element(
                node.id,
                "icon-cell",
                Declarations::new()
                    .with_opt("padding", node.get("icon-padding"))
                    .with("font-size", "0")
                    .with_opt("height", node.get("icon-height").or(icon_size))
                    .with("vertical-align", "middle")
                    .with_opt("width", icon_size),
            ),
            CssRule::element(
                node.id,
                "img",
                Declarations::new()
                    .with_opt("border-radius", radius)
                    .with("display", "block"),
            ),
            CssRule::element(
                node.id,
                "text",
                Declarations::new()
                    .with("vertical-align", "middle")
                    .with_opt("padding", node.get("text-padding")),
            ),
            CssRule::element(
                node.id,
                "link",
                Declarations::new()
                    .with_opt("color", node.get("color"))
                    .with_opt("font-size", node.get("font-size"))
                    .with_opt("font-weight", node.get("font-weight"))
                    .with_opt("font-style", node.get("font-style"))
                    .with_opt("font-family", node.get("font-family"))
                    .with_opt("line-height", node.get("line-height"))
                    .with_opt("text-decoration", node.get("text-decoration")),
            ),
        ]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let href = element_href(node);
        let src = node
            .get("src")
            .map(str::to_string)
            .or_else(|| network_of(node).map(|n| n.icon()))
            .unwrap_or_default();
        let size = node
            .get("icon-size")
            .and_then(parse_px)
            .map(format_number);
        let height = node
            .get("icon-height")
            .and_then(parse_px)
            .map(format_number)
            .or_else(|| size.clone());

        let img = format!(
            r#"<img alt="{}"{} src="{}"{}{}{}>"#,
            escape_attr(node.get("alt").unwrap_or("")),
            attr("height", height.as_deref()),
            escape_attr(&src),
            ctx.style(node, "img"),
            attr("title", node.get("title")),
            attr("width", size.as_deref()),
        );
        let link = |inner: &str, style: &str| match &href {
            Some(href) => format!(
                r#"<a href="{}"{}{}{}>{}</a>"#,
                escape_attr(href),
                attr("rel", node.get("rel")),
                style,
                attr("target", node.get("target")),
                inner
            ),
            None => inner.to_string(),
        };

        let mut row = format!(
            r#"<td{}><table{}{}><tbody><tr><td{}>{}</td></tr></tbody></table></td>"#,
            ctx.style(node, "td"),
            PRESENTATION,
            ctx.style(node, "icon"),
            ctx.style(node, "icon-cell"),
            link(&img, "")
        );
        let label = node.content.trim();
        if !label.is_empty() {
            let style = ctx.style(node, "link");
            row.push_str(&format!(
                "<td{}>{}</td>",
                ctx.style(node, "text"),
                link(label, &style)
            ));
        }
        format!("<tr{}{}>{}</tr>", ctx.class_attr(node, &[]), ctx.style(node, "row"), row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::{find, part, render, resolved, rules_of};
    use pretty_assertions::assert_eq;

    fn social(inner: &str, attrs: &str) -> String {
        format!(
            "<mjml><mj-body><mj-section><mj-column><mj-social{attrs}>{inner}</mj-social></mj-column></mj-section></mj-body></mjml>"
        )
    }

    #[test]
    fn test_network_lookup() {
        let facebook = Network::lookup("facebook").unwrap();
        assert_eq!(
            facebook.href("https://example.com"),
            "https://www.facebook.com/sharer/sharer.php?u=https://example.com"
        );
        let direct = Network::lookup("facebook-noshare").unwrap();
        assert_eq!(direct.href("https://example.com"), "https://example.com");
        assert_eq!(
            Network::lookup("google").unwrap().icon(),
            "https://www.mailjet.com/images/theme/v1/icons/ico-social/google-plus.png"
        );
        assert!(Network::lookup("myspace").is_none());
    }

    #[test]
    fn test_element_inherits_from_social() {
        let root = resolved(&social(
            r#"<mj-social-element name="twitter" href="https://example.com">Tweet</mj-social-element>"#,
            r#" icon-size="30px" font-size="15px""#,
        ));
        let element = find(&root, "mj-social-element");
        assert_eq!(element.get("icon-size"), Some("30px"));
        assert_eq!(element.get("font-size"), Some("15px"));
        assert_eq!(element.get("color"), Some("#333333"));

        let rules = rules_of(&root, "mj-social-element");
        assert_eq!(part(&rules, "icon").get("background"), Some("#55acee"));
        assert_eq!(part(&rules, "icon-cell").get("height"), Some("30px"));
    }

    #[test]
    fn test_horizontal_wraps_each_element() {
        let html = render(&social(
            r#"<mj-social-element name="facebook" href="https://example.com"/><mj-social-element name="github" href="https://github.com/me">Code</mj-social-element>"#,
            "",
        ));
        assert_eq!(html.matches("display:inline-table").count(), 2);
        assert!(html.contains(r#"href="https://www.facebook.com/sharer/sharer.php?u=https://example.com""#));
        assert!(html.contains(r#"src="https://www.mailjet.com/images/theme/v1/icons/ico-social/github.png""#));
        assert!(html.contains(">Code</a></td>"));
    }

    #[test]
    fn test_vertical_single_table() {
        let html = render(&social(
            r#"<mj-social-element name="web" src="https://example.com/i.png"/><mj-social-element name="web"/>"#,
            r#" mode="vertical""#,
        ));
        assert!(!html.contains("inline-table"));
        assert!(html.contains(r#"src="https://example.com/i.png""#));
    }
}
