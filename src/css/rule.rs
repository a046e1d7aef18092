//! CSS rule and declaration types

use std::cmp::Ordering;
use std::fmt;

use crate::parser::NodeId;

/// Named element slot inside one component's output (e.g. a column's `"table"`)
pub type Part = &'static str;

/// Properties in the order they are written into `style` attributes.
///
/// Properties not listed here follow in alphabetical order.
const PROPERTY_ORDER: &[&str] = &[
    "display",
    "position",
    "float",
    "caption-side",
    "direction",
    "table-layout",
    "border-collapse",
    "border-spacing",
    "width",
    "min-width",
    "max-width",
    "height",
    "max-height",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "border-color",
    "border-radius",
    "outline",
    "background",
    "background-color",
    "background-image",
    "background-position",
    "background-repeat",
    "background-size",
    "cursor",
    "overflow",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "line-height",
    "text-align",
    "text-decoration",
    "text-transform",
    "color",
    "vertical-align",
    "word-break",
    "opacity",
    "visibility",
    "mso-hide",
];

fn property_rank(property: &str) -> usize {
    PROPERTY_ORDER
        .iter()
        .position(|p| *p == property)
        .unwrap_or(PROPERTY_ORDER.len())
}

fn canonical_cmp(a: &str, b: &str) -> Ordering {
    property_rank(a).cmp(&property_rank(b)).then_with(|| a.cmp(b))
}

/// Ordered property/value list; setting an existing property replaces its value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations(Vec<(String, String)>);

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property, value)),
        }
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, property: &str, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Set `property` only when a non-empty value is present
    pub fn with_opt(mut self, property: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.set(property, v);
        }
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Apply `other` on top of `self`, property by property
    pub fn overlay(&mut self, other: &Declarations) {
        for (p, v) in &other.0 {
            self.set(p.clone(), v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Serialize for a `style` attribute, in canonical property order
    pub fn to_inline(&self, minify: bool) -> String {
        let mut sorted: Vec<&(String, String)> = self.0.iter().collect();
        sorted.sort_by(|a, b| canonical_cmp(&a.0, &b.0));

        let parts: Vec<String> = sorted
            .iter()
            .map(|(p, v)| {
                if minify {
                    format!("{}:{}", p, minify_value(v))
                } else {
                    format!("{}:{};", p, v)
                }
            })
            .collect();

        if minify {
            parts.join(";")
        } else {
            parts.concat()
        }
    }

    /// Serialize as the body of a stylesheet block, in written order
    pub fn to_block(&self) -> String {
        self.0
            .iter()
            .map(|(p, v)| format!("{}:{};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn minify_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(", ", ",")
}

/// CSS specificity as (ids, classes, tags); compared lexicographically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Count ids, classes (plus attributes and pseudo-classes) and element
    /// names in a selector. The highest-weighted comma-separated branch wins.
    pub fn of_selector(selector: &str) -> Self {
        selector
            .split(',')
            .map(Self::of_branch)
            .max()
            .unwrap_or_default()
    }

    fn of_branch(branch: &str) -> Self {
        let mut spec = Specificity::default();
        let mut chars = branch.trim().chars().peekable();
        let mut at_compound_start = true;

        while let Some(c) = chars.next() {
            match c {
                '#' => {
                    spec.0 += 1;
                    skip_ident(&mut chars);
                    at_compound_start = false;
                }
                '.' => {
                    spec.1 += 1;
                    skip_ident(&mut chars);
                    at_compound_start = false;
                }
                '[' => {
                    spec.1 += 1;
                    for c in chars.by_ref() {
                        if c == ']' {
                            break;
                        }
                    }
                    at_compound_start = false;
                }
                ':' => {
                    if chars.peek() == Some(&':') {
                        chars.next();
                        spec.2 += 1;
                    } else {
                        spec.1 += 1;
                    }
                    skip_ident(&mut chars);
                    at_compound_start = false;
                }
                ' ' | '>' | '+' | '~' => at_compound_start = true,
                '*' => at_compound_start = false,
                c if at_compound_start && (c.is_ascii_alphabetic() || c == '_') => {
                    spec.2 += 1;
                    skip_ident(&mut chars);
                    at_compound_start = false;
                }
                _ => {}
            }
        }
        spec
    }
}

fn skip_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            chars.next();
        } else {
            break;
        }
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

/// One simple selector inside an inlinable compound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Component tag, e.g. `mj-text`
    Tag(String),
    /// Matches a class in the node's `css-class`
    Class(String),
    /// Matches the node's `css-id`
    Id(String),
}

impl SimpleSelector {
    fn specificity(&self) -> Specificity {
        match self {
            SimpleSelector::Tag(_) => Specificity(0, 0, 1),
            SimpleSelector::Class(_) => Specificity(0, 1, 0),
            SimpleSelector::Id(_) => Specificity(1, 0, 0),
        }
    }
}

/// What a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exactly one element: the given part of the origin node
    Element(Part),
    /// Every node matching all simple selectors
    Compound(Vec<SimpleSelector>),
    /// Rule text emitted verbatim into the head stylesheet
    Head(String),
}

/// A styling rule declared by a component or parsed from author CSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: Selector,
    pub declarations: Declarations,
    pub specificity: Specificity,
    /// Declaration order, assigned by the collector
    pub order: usize,
    pub origin: NodeId,
}

impl CssRule {
    /// Inline style for `part` of the node `origin`
    pub fn element(origin: NodeId, part: Part, declarations: Declarations) -> Self {
        Self {
            selector: Selector::Element(part),
            declarations,
            specificity: Specificity::default(),
            order: 0,
            origin,
        }
    }

    /// Inlinable rule applied to every matching node
    pub fn compound(origin: NodeId, parts: Vec<SimpleSelector>, declarations: Declarations) -> Self {
        let specificity = parts.iter().fold(Specificity::default(), |acc, s| {
            let s = s.specificity();
            Specificity(acc.0 + s.0, acc.1 + s.1, acc.2 + s.2)
        });
        Self {
            selector: Selector::Compound(parts),
            declarations,
            specificity,
            order: 0,
            origin,
        }
    }

    /// `selector { declarations }` in the head stylesheet
    pub fn head_block(origin: NodeId, selector: &str, declarations: &Declarations) -> Self {
        let text = format!("{} {{ {} }}", selector.trim(), declarations.to_block());
        Self::head(origin, Specificity::of_selector(selector), text)
    }

    /// A block wrapped in `@media <query>`
    pub fn media(origin: NodeId, query: &str, selector: &str, declarations: &Declarations) -> Self {
        let text = format!(
            "@media {} {{ {} {{ {} }} }}",
            query.trim(),
            selector.trim(),
            declarations.to_block()
        );
        Self::head(origin, Specificity::of_selector(selector), text)
    }

    /// Head text that is emitted exactly as given
    pub fn verbatim(origin: NodeId, text: impl Into<String>) -> Self {
        Self::head(origin, Specificity::default(), text.into())
    }

    fn head(origin: NodeId, specificity: Specificity, text: String) -> Self {
        Self {
            selector: Selector::Head(text),
            declarations: Declarations::new(),
            specificity,
            order: 0,
            origin,
        }
    }

    /// Whether the rule ends up in a `style` attribute
    pub fn is_inlinable(&self) -> bool {
        !matches!(self.selector, Selector::Head(_))
    }

    /// Merge key: higher specificity wins, later order wins ties
    pub fn precedence(&self) -> (Specificity, usize) {
        (self.specificity, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_order() {
        let decls = Declarations::new()
            .with("color", "#000000")
            .with("zoom", "1")
            .with("font-family", "Ubuntu, Helvetica")
            .with("animation", "none")
            .with("padding", "10px");
        assert_eq!(
            decls.to_inline(false),
            "padding:10px;font-family:Ubuntu, Helvetica;color:#000000;animation:none;zoom:1;"
        );
    }

    #[test]
    fn test_minified_inline() {
        let decls = Declarations::new()
            .with("font-family", "Ubuntu,   Helvetica, Arial")
            .with("color", "red");
        assert_eq!(decls.to_inline(true), "font-family:Ubuntu,Helvetica,Arial;color:red");
    }

    #[test]
    fn test_with_opt_skips_empty() {
        let decls = Declarations::new()
            .with_opt("color", None)
            .with_opt("background", Some(""))
            .with_opt("width", Some("10px"));
        assert_eq!(decls.len(), 1);
        assert_eq!(decls.get("width"), Some("10px"));
    }

    #[test]
    fn test_overlay_replaces_in_place() {
        let mut base = Declarations::new().with("color", "red").with("width", "1px");
        base.overlay(&Declarations::new().with("color", "blue").with("height", "2px"));
        let pairs: Vec<_> = base.iter().collect();
        assert_eq!(pairs, vec![("color", "blue"), ("width", "1px"), ("height", "2px")]);
    }

    #[test]
    fn test_specificity_of_selector() {
        assert_eq!(Specificity::of_selector("mj-text"), Specificity(0, 0, 1));
        assert_eq!(Specificity::of_selector(".a.b"), Specificity(0, 2, 0));
        assert_eq!(Specificity::of_selector("#x .y a:hover"), Specificity(1, 2, 1));
        assert_eq!(Specificity::of_selector("p, #id"), Specificity(1, 0, 0));
        assert_eq!(
            Specificity::of_selector(".mj-menu-checkbox[type=\"checkbox\"] ~ .mj-inline-links"),
            Specificity(0, 3, 0)
        );
    }

    #[test]
    fn test_specificity_ordering() {
        assert!(Specificity(1, 0, 0) > Specificity(0, 9, 9));
        assert!(Specificity(0, 1, 0) > Specificity(0, 0, 9));
    }

    #[test]
    fn test_compound_specificity_sums() {
        let rule = CssRule::compound(
            NodeId(0),
            vec![
                SimpleSelector::Tag("mj-text".into()),
                SimpleSelector::Class("a".into()),
                SimpleSelector::Id("b".into()),
            ],
            Declarations::new(),
        );
        assert_eq!(rule.specificity, Specificity(1, 1, 1));
        assert!(rule.is_inlinable());
    }

    #[test]
    fn test_media_text() {
        let rule = CssRule::media(
            NodeId(3),
            "only screen and (min-width:480px)",
            ".mj-column-per-50",
            &Declarations::new()
                .with("width", "50% !important")
                .with("max-width", "50%"),
        );
        assert_eq!(
            rule.selector,
            Selector::Head(
                "@media only screen and (min-width:480px) { .mj-column-per-50 { width:50% !important; max-width:50%; } }"
                    .to_string()
            )
        );
        assert!(!rule.is_inlinable());
    }
}
