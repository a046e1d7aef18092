//! Navigation bar with an optional hamburger menu

use std::sync::Arc;

use crate::cascade::AttrType;
use crate::css::{CssRule, Declarations};
use crate::parser::Node;
use crate::renderer::escape_attr;

use super::content::DEFAULT_FONT;
use super::{
    attr, cell_rule, lower_breakpoint, Component, Family, RenderContext, RuleContext, ALIGN,
};

pub(super) fn components() -> Vec<Arc<dyn Component>> {
    vec![Arc::new(MjNavbar), Arc::new(MjNavbarLink)]
}

struct MjNavbar;

impl MjNavbar {
    fn hamburger(node: &Node) -> bool {
        node.get("hamburger") == Some("hamburger")
    }

    /// Checkbox id, unique per document and stable across runs
    fn menu_id(node: &Node) -> String {
        format!("mj-menu-{}", node.id.0)
    }

    fn menu_css(breakpoint: &str) -> [String; 2] {
        let checkbox = r#".mj-menu-checkbox[type="checkbox"]"#;
        [
            "noinput.mj-menu-checkbox { display:block !important; max-height:none !important; visibility:visible !important; }"
                .to_string(),
            format!(
                concat!(
                    "@media only screen and (max-width:{bp}) {{ ",
                    "{cb}~.mj-inline-links {{ display:none !important; }} ",
                    "{cb}:checked~.mj-inline-links, {cb}~.mj-menu-trigger {{ display:block !important; max-width:none !important; max-height:none !important; font-size:inherit !important; }} ",
                    "{cb}~.mj-inline-links>a {{ display:block !important; }} ",
                    "{cb}:checked~.mj-menu-trigger .mj-menu-icon-close {{ display:block !important; }} ",
                    "{cb}:checked~.mj-menu-trigger .mj-menu-icon-open {{ display:none !important; }} ",
                    "}}"
                ),
                bp = lower_breakpoint(breakpoint),
                cb = checkbox
            ),
        ]
    }
}

impl Component for MjNavbar {
    fn tag(&self) -> &'static str {
        "mj-navbar"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("align", "center"),
            ("ico-align", "center"),
            ("ico-close", "&#8855;"),
            ("ico-color", "#000000"),
            ("ico-font-family", DEFAULT_FONT),
            ("ico-font-size", "30px"),
            ("ico-line-height", "30px"),
            ("ico-open", "&#9776;"),
            ("ico-padding", "10px"),
            ("ico-text-decoration", "none"),
            ("ico-text-transform", "uppercase"),
        ]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[
            ("align", ALIGN),
            ("container-background-color", AttrType::Color),
            ("hamburger", AttrType::Enum(&["hamburger"])),
            ("ico-align", ALIGN),
            ("ico-color", AttrType::Color),
            ("ico-padding", AttrType::Boxed),
        ]
    }

    fn declared_css_rules(&self, node: &Node, ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let mut rules = vec![
            cell_rule(node),
            CssRule::element(
                node.id,
                "links",
                Declarations::new().with_opt("text-align", node.get("align")),
            ),
        ];
        if !Self::hamburger(node) {
            return rules;
        }

        rules.push(CssRule::element(
            node.id,
            "checkbox",
            Declarations::new()
                .with("display", "none !important")
                .with("max-height", "0")
                .with("visibility", "hidden"),
        ));
        rules.push(CssRule::element(
            node.id,
            "trigger",
            Declarations::new()
                .with("display", "none")
                .with("max-height", "0px")
                .with("max-width", "0px")
                .with("font-size", "0px")
                .with("overflow", "hidden"),
        ));
        rules.push(CssRule::element(
            node.id,
            "label",
            Declarations::new()
                .with("display", "block")
                .with("cursor", "pointer")
                .with("mso-hide", "all")
                .with("user-select", "none")
                .with_opt("color", node.get("ico-color"))
                .with_opt("font-size", node.get("ico-font-size"))
                .with_opt("font-family", node.get("ico-font-family"))
                .with_opt("text-transform", node.get("ico-text-transform"))
                .with_opt("text-decoration", node.get("ico-text-decoration"))
                .with_opt("line-height", node.get("ico-line-height"))
                .with_opt("padding", node.get("ico-padding")),
        ));
        rules.push(CssRule::element(
            node.id,
            "open",
            Declarations::new().with("mso-hide", "all"),
        ));
        rules.push(CssRule::element(
            node.id,
            "close",
            Declarations::new()
                .with("display", "none")
                .with("mso-hide", "all"),
        ));
        rules.extend(
            Self::menu_css(ctx.breakpoint)
                .into_iter()
                .map(|text| CssRule::verbatim(node.id, text)),
        );
        rules
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        let links = format!(
            r#"<div class="mj-inline-links"{}>{}</div>"#,
            ctx.style(node, "links"),
            ctx.render_children(node)
        );
        if !Self::hamburger(node) {
            return links;
        }

        let id = Self::menu_id(node);
        format!(
            concat!(
                r#"<input type="checkbox" id="{id}" class="mj-menu-checkbox"{checkbox}>"#,
                r#"<div class="mj-menu-trigger"{trigger}>"#,
                r#"<label for="{id}" class="mj-menu-label"{label}{align}>"#,
                r#"<span class="mj-menu-icon-open"{open}> {ico_open} </span>"#,
                r#"<span class="mj-menu-icon-close"{close}> {ico_close} </span>"#,
                "</label></div>{links}"
            ),
            id = id,
            checkbox = ctx.style(node, "checkbox"),
            trigger = ctx.style(node, "trigger"),
            label = ctx.style(node, "label"),
            align = attr("align", node.get("ico-align")),
            open = ctx.style(node, "open"),
            ico_open = node.get("ico-open").unwrap_or_default(),
            close = ctx.style(node, "close"),
            ico_close = node.get("ico-close").unwrap_or_default(),
            links = links,
        )
    }
}

struct MjNavbarLink;

impl MjNavbarLink {
    /// `href` prefixed with the navbar's `base-url` when it is relative
    fn href(node: &Node) -> String {
        let href = node.get_or("href", "#");
        match node.get("base-url") {
            Some(base) if !href.starts_with("http") && !href.starts_with('#') => {
                format!("{base}{href}")
            }
            _ => href.to_string(),
        }
    }
}

impl Component for MjNavbarLink {
    fn tag(&self) -> &'static str {
        "mj-navbar-link"
    }

    fn family(&self) -> Family {
        Family::Content
    }

    fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("color", "#000000"),
            ("font-family", DEFAULT_FONT),
            ("font-size", "13px"),
            ("font-weight", "normal"),
            ("href", "#"),
            ("line-height", "22px"),
            ("padding", "15px 10px"),
            ("target", "_blank"),
            ("text-decoration", "none"),
            ("text-transform", "uppercase"),
        ]
    }

    fn inheritable(&self) -> &'static [&'static str] {
        &["base-url"]
    }

    fn attribute_types(&self) -> &'static [(&'static str, AttrType)] {
        &[("color", AttrType::Color), ("padding", AttrType::Boxed)]
    }

    fn preserves_whitespace(&self) -> bool {
        true
    }

    fn class_part(&self) -> &'static str {
        "link"
    }

    fn needs_cell(&self) -> bool {
        false
    }

    fn declared_css_rules(&self, node: &Node, _ctx: &RuleContext<'_>) -> Vec<CssRule> {
        let link = super::content::typography(node)
            .with("display", "inline-block")
            .with_opt("padding", node.get("padding"))
            .with_opt("padding-top", node.get("padding-top"))
            .with_opt("padding-right", node.get("padding-right"))
            .with_opt("padding-bottom", node.get("padding-bottom"))
            .with_opt("padding-left", node.get("padding-left"));
        vec![CssRule::element(node.id, "link", link)]
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        format!(
            r#"<a{} href="{}"{}{}{}> {} </a>"#,
            ctx.class_attr(node, &["mj-link"]),
            escape_attr(&Self::href(node)),
            attr("rel", node.get("rel")),
            attr("target", node.get("target")),
            ctx.style(node, "link"),
            node.content.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::{find, render, resolved};
    use pretty_assertions::assert_eq;

    fn navbar(attrs: &str, links: &str) -> String {
        format!(
            "<mjml><mj-body><mj-section><mj-column><mj-navbar{attrs}>{links}</mj-navbar></mj-column></mj-section></mj-body></mjml>"
        )
    }

    #[test]
    fn test_base_url_prefixes_relative_links() {
        let root = resolved(&navbar(
            r#" base-url="https://example.com""#,
            r##"<mj-navbar-link href="/about">About</mj-navbar-link><mj-navbar-link href="#top">Top</mj-navbar-link><mj-navbar-link href="https://other.org">Out</mj-navbar-link>"##,
        ));
        let bar = find(&root, "mj-navbar");
        let hrefs: Vec<String> = bar.children.iter().map(MjNavbarLink::href).collect();
        assert_eq!(
            hrefs,
            vec!["https://example.com/about", "#top", "https://other.org"]
        );
    }

    #[test]
    fn test_plain_links() {
        let html = render(&navbar("", r#"<mj-navbar-link href="/a">A</mj-navbar-link>"#));
        assert!(html.contains(r#"<div class="mj-inline-links" style="text-align:center;"><a class="mj-link" href="/a" target="_blank" style="display:inline-block;"#));
        assert!(html.contains("> A </a></div>"));
        assert!(!html.contains("mj-menu-checkbox"));
    }

    #[test]
    fn test_hamburger_menu() {
        let html = render(&navbar(
            r#" hamburger="hamburger""#,
            r#"<mj-navbar-link href="/a">A</mj-navbar-link>"#,
        ));
        let root = resolved(&navbar(r#" hamburger="hamburger""#, ""));
        let id = MjNavbar::menu_id(find(&root, "mj-navbar"));
        assert!(html.contains(&format!(r#"<input type="checkbox" id="{id}" class="mj-menu-checkbox""#)));
        assert!(html.contains(&format!(r#"<label for="{id}" class="mj-menu-label""#)));
        assert!(html.contains("> &#9776; </span>"));
        assert!(html.contains("noinput.mj-menu-checkbox"));
        assert!(html.contains("@media only screen and (max-width:479px)"));
    }
}
