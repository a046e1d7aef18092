//! Tree-wide rule collection and merging

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::components::{walk_components, ComponentRegistry, RuleContext};
use crate::layout::Layout;
use crate::parser::{Node, NodeId};

use super::rule::{CssRule, Declarations, Part, Selector, SimpleSelector};

/// Merged styles for one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    inline: HashMap<(NodeId, Part), Declarations>,
    head: Vec<String>,
}

impl StyleSheet {
    /// Inline declarations for one element
    pub fn inline(&self, id: NodeId, part: Part) -> Option<&Declarations> {
        self.inline.get(&(id, part))
    }

    /// Head rules, deduplicated, in first-seen order
    pub fn head_rules(&self) -> &[String] {
        &self.head
    }

    /// The head stylesheet text (without the `<style>` wrapper)
    pub fn head_css(&self, minify: bool) -> String {
        if minify {
            self.head
                .iter()
                .map(|r| minify_css(r))
                .collect::<Vec<_>>()
                .concat()
        } else {
            self.head.join("\n")
        }
    }
}

/// Gather every rule the components declare, in document preorder.
///
/// Each rule gets its position as `order`.
pub fn collect(
    root: &Node,
    registry: &ComponentRegistry,
    layout: &Layout,
    breakpoint: &str,
) -> Vec<CssRule> {
    let mut rules = Vec::new();
    walk_components(root, registry, &mut |node, component| {
        let ctx = RuleContext {
            frame: layout.frame(node.id),
            breakpoint,
        };
        rules.extend(component.declared_css_rules(node, &ctx));
    });

    for (order, rule) in rules.iter_mut().enumerate() {
        rule.order = order;
    }
    debug!(rules = rules.len(), "collected css rules");
    rules
}

/// Fold rules into per-element inline styles and a head stylesheet.
///
/// Inlinable rules are applied in ascending (specificity, order), so for any
/// property the most specific rule wins and later rules win ties.
pub fn merge(rules: Vec<CssRule>, root: &Node, registry: &ComponentRegistry) -> StyleSheet {
    let mut sheet = StyleSheet::default();
    let (mut inlinable, head): (Vec<CssRule>, Vec<CssRule>) =
        rules.into_iter().partition(CssRule::is_inlinable);

    let mut seen = HashSet::new();
    let mut head = head;
    head.sort_by_key(|r| r.order);
    for rule in head {
        if let Selector::Head(text) = rule.selector {
            if seen.insert(text.clone()) {
                sheet.head.push(text);
            }
        }
    }

    inlinable.sort_by_key(CssRule::precedence);
    let targets = match_targets(&inlinable, root, registry);

    for (rule, targets) in inlinable.iter().zip(targets) {
        for key in targets {
            sheet
                .inline
                .entry(key)
                .or_default()
                .overlay(&rule.declarations);
        }
    }

    sheet
}

fn match_targets(
    rules: &[CssRule],
    root: &Node,
    registry: &ComponentRegistry,
) -> Vec<Vec<(NodeId, Part)>> {
    let has_compounds = rules
        .iter()
        .any(|r| matches!(r.selector, Selector::Compound(_)));

    let mut candidates: Vec<(&Node, Part)> = Vec::new();
    if has_compounds {
        walk_components(root, registry, &mut |node, component| {
            candidates.push((node, component.class_part()));
        });
    }

    rules
        .iter()
        .map(|rule| match &rule.selector {
            Selector::Element(part) => vec![(rule.origin, *part)],
            Selector::Compound(parts) => candidates
                .iter()
                .filter(|(node, _)| matches_compound(node, parts))
                .map(|(node, part)| (node.id, *part))
                .collect(),
            Selector::Head(_) => Vec::new(),
        })
        .collect()
}

fn matches_compound(node: &Node, parts: &[SimpleSelector]) -> bool {
    parts.iter().all(|part| match part {
        SimpleSelector::Tag(tag) => node.tag == *tag,
        SimpleSelector::Class(class) => node.css_classes().any(|c| c == class.as_str()),
        SimpleSelector::Id(id) => node.get("css-id") == Some(id.as_str()),
    })
}

fn minify_css(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let chars: Vec<char> = collapsed.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            let tight = |ch: Option<char>| matches!(ch, Some('{' | '}' | ';' | ','));
            if tight(prev) || tight(next) {
                continue;
            }
        }
        out.push(c);
    }
    out.replace(";}", "}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::rule::Specificity;
    use crate::parser::Attributes;
    use pretty_assertions::assert_eq;

    fn resolved(mut node: Node, pairs: &[(&str, &str)]) -> Node {
        let mut attrs = Attributes::new();
        for (k, v) in pairs {
            attrs.insert(k.to_string(), v.to_string());
        }
        node.resolved = Some(attrs);
        node
    }

    fn body_with_text(pairs: &[(&str, &str)]) -> Node {
        let text = resolved(Node::new("mj-text"), pairs);
        let mut root = Node::new("mjml").with_child(Node::new("mj-body").with_child(text));
        root.assign_ids();
        root
    }

    fn ordered(mut rules: Vec<CssRule>) -> Vec<CssRule> {
        for (i, r) in rules.iter_mut().enumerate() {
            r.order = i;
        }
        rules
    }

    #[test]
    fn test_specificity_beats_order() {
        let root = body_with_text(&[("css-class", "a"), ("css-id", "main")]);
        let text = NodeId(2);
        let rules = ordered(vec![
            CssRule::compound(
                NodeId(0),
                vec![SimpleSelector::Id("main".into())],
                Declarations::new().with("color", "green"),
            ),
            CssRule::compound(
                NodeId(0),
                vec![SimpleSelector::Class("a".into())],
                Declarations::new().with("color", "blue"),
            ),
            CssRule::compound(
                NodeId(0),
                vec![SimpleSelector::Tag("mj-text".into())],
                Declarations::new().with("color", "red").with("margin", "0"),
            ),
            CssRule::element(text, "cell", Declarations::new().with("color", "black")),
        ]);

        let sheet = merge(rules, &root, ComponentRegistry::global());
        let decls = sheet.inline(text, "cell").unwrap();
        assert_eq!(decls.get("color"), Some("green"));
        assert_eq!(decls.get("margin"), Some("0"));
    }

    #[test]
    fn test_later_wins_at_equal_specificity() {
        let root = body_with_text(&[("css-class", "a b")]);
        let rules = ordered(vec![
            CssRule::compound(
                NodeId(0),
                vec![SimpleSelector::Class("a".into())],
                Declarations::new().with("color", "blue"),
            ),
            CssRule::compound(
                NodeId(0),
                vec![SimpleSelector::Class("b".into())],
                Declarations::new().with("color", "red"),
            ),
        ]);
        let sheet = merge(rules, &root, ComponentRegistry::global());
        assert_eq!(sheet.inline(NodeId(2), "cell").unwrap().get("color"), Some("red"));
    }

    #[test]
    fn test_unmatched_compound_is_ignored() {
        let root = body_with_text(&[("css-class", "a")]);
        let rules = ordered(vec![CssRule::compound(
            NodeId(0),
            vec![
                SimpleSelector::Tag("mj-button".into()),
                SimpleSelector::Class("a".into()),
            ],
            Declarations::new().with("color", "blue"),
        )]);
        let sheet = merge(rules, &root, ComponentRegistry::global());
        assert!(sheet.inline(NodeId(2), "cell").is_none());
    }

    #[test]
    fn test_head_rules_deduplicated_in_order() {
        let root = body_with_text(&[]);
        let rules = ordered(vec![
            CssRule::verbatim(NodeId(0), ".b { color:red; }"),
            CssRule::verbatim(NodeId(0), ".a { color:red; }"),
            CssRule::verbatim(NodeId(2), ".b { color:red; }"),
        ]);
        let sheet = merge(rules, &root, ComponentRegistry::global());
        assert_eq!(sheet.head_rules(), [".b { color:red; }", ".a { color:red; }"]);
        assert_eq!(sheet.head_css(true), ".b{color:red}.a{color:red}");
    }

    #[test]
    fn test_minify_keeps_media_query_spacing() {
        let text = "@media only screen and (min-width:480px) { .x { width:50% !important; } }";
        assert_eq!(
            minify_css(text),
            "@media only screen and (min-width:480px){.x{width:50% !important}}"
        );
    }

    #[test]
    fn test_element_specificity_is_zero() {
        let rule = CssRule::element(NodeId(1), "cell", Declarations::new());
        assert_eq!(rule.specificity, Specificity(0, 0, 0));
    }
}
