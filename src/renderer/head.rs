//! Document metadata gathered from head components

use std::collections::BTreeSet;

use tracing::warn;

use crate::components::{walk_components, ComponentRegistry};
use crate::layout::DEFAULT_BODY_WIDTH;
use crate::parser::Node;

/// Breakpoint used when the document declares none
pub const DEFAULT_BREAKPOINT: &str = "480px";

/// Fonts linked automatically when a rendered `font-family` names them
const BUILTIN_FONTS: &[(&str, &str)] = &[
    (
        "Open Sans",
        "https://fonts.googleapis.com/css?family=Open+Sans:300,400,500,700",
    ),
    (
        "Droid Sans",
        "https://fonts.googleapis.com/css?family=Droid+Sans:300,400,500,700",
    ),
    (
        "Lato",
        "https://fonts.googleapis.com/css?family=Lato:300,400,500,700",
    ),
    (
        "Roboto",
        "https://fonts.googleapis.com/css?family=Roboto:300,400,500,700",
    ),
    (
        "Ubuntu",
        "https://fonts.googleapis.com/css?family=Ubuntu:300,400,500,700",
    ),
];

/// A web font that can be linked from the head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontLink {
    pub name: String,
    pub href: String,
}

/// Document-level settings contributed by components
#[derive(Debug, Clone, PartialEq)]
pub struct HeadMetadata {
    pub title: String,
    pub preview: String,
    pub breakpoint: String,
    /// Built-in fonts first, then declared ones; a declaration replaces a
    /// built-in of the same name
    pub fonts: Vec<FontLink>,
    pub body_width: f64,
    pub background_color: Option<String>,
    /// `lang` / `dir` from the root element, overriding the configuration
    pub language: Option<String>,
    pub direction: Option<String>,
}

impl Default for HeadMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            preview: String::new(),
            breakpoint: DEFAULT_BREAKPOINT.to_string(),
            fonts: BUILTIN_FONTS
                .iter()
                .map(|(name, href)| FontLink {
                    name: name.to_string(),
                    href: href.to_string(),
                })
                .collect(),
            body_width: DEFAULT_BODY_WIDTH,
            background_color: None,
            language: None,
            direction: None,
        }
    }
}

impl HeadMetadata {
    /// Let every component contribute, in document order
    pub fn collect(root: &Node, registry: &ComponentRegistry) -> Self {
        let mut head = HeadMetadata::default();
        walk_components(root, registry, &mut |node, component| {
            component.contribute_head(node, &mut head);
        });
        head
    }

    /// Declare a font, replacing any earlier one with the same name
    pub fn add_font(&mut self, name: &str, href: &str) {
        let link = FontLink {
            name: name.trim().to_string(),
            href: href.trim().to_string(),
        };
        match self.fonts.iter_mut().find(|f| f.name == link.name) {
            Some(existing) => *existing = link,
            None => self.fonts.push(link),
        }
    }

    /// Known fonts whose name appears in a `font-family` of `html`
    pub fn used_fonts(&self, html: &str) -> Vec<&FontLink> {
        let families = font_families(html);
        let used: Vec<&FontLink> = self
            .fonts
            .iter()
            .filter(|f| families.contains(&f.name))
            .collect();

        let builtin = |name: &str| BUILTIN_FONTS.iter().any(|(b, _)| *b == name);
        for font in self.fonts.iter().filter(|f| !builtin(&f.name)) {
            if !families.contains(&font.name) {
                warn!(font = %font.name, "declared font is not used, skipping");
            }
        }
        used
    }
}

/// Every family named in `font-family` declarations of `html`
pub fn font_families(html: &str) -> BTreeSet<String> {
    let mut families = BTreeSet::new();
    let mut rest = html;
    while let Some(start) = rest.find("font-family:") {
        rest = &rest[start + "font-family:".len()..];
        let end = rest
            .find(|c: char| c == ';' || c == '"' || c == '}' || c == '>')
            .unwrap_or(rest.len());
        for family in rest[..end].split(',') {
            let family = family
                .trim()
                .trim_matches(|c: char| c == '\'' || c == '"')
                .replace("&#39;", "")
                .replace("&quot;", "");
            let family = family.trim();
            if !family.is_empty() {
                families.insert(family.to_string());
            }
        }
        rest = &rest[end..];
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_families() {
        let html = r#"<div style="font-family:'Open Sans', Ubuntu, sans-serif;color:red">x</div><p style="font-family:Lato">"#;
        let families = font_families(html);
        assert!(families.contains("Open Sans"));
        assert!(families.contains("Ubuntu"));
        assert!(families.contains("Lato"));
        assert!(!families.contains("color:red"));
    }

    #[test]
    fn test_used_fonts_filters_and_orders() {
        let mut head = HeadMetadata::default();
        head.add_font("Raleway", "https://fonts.example/raleway");
        head.add_font("Roboto", "https://fonts.example/roboto");

        let used: Vec<_> = head
            .used_fonts(r#"<div style="font-family:Raleway, Roboto, Arial"></div>"#)
            .into_iter()
            .map(|f| f.href.as_str())
            .collect();
        assert_eq!(
            used,
            vec!["https://fonts.example/roboto", "https://fonts.example/raleway"]
        );
    }

    #[test]
    fn test_defaults() {
        let head = HeadMetadata::default();
        assert_eq!(head.breakpoint, "480px");
        assert_eq!(head.body_width, 600.0);
        assert_eq!(head.fonts.len(), 5);
    }
}
