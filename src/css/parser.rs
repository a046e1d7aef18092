//! Minimal author stylesheet reader for `mj-style` content
//!
//! Only what inlining needs: top-level rules are split into selector and
//! declarations, at-rule blocks are kept whole. Rules whose every selector is
//! a compound of `mj-*` tags, classes and ids can be inlined; everything else
//! goes to the head stylesheet.

use tracing::debug;

use crate::parser::NodeId;

use super::rule::{CssRule, Declarations, SimpleSelector};

/// At-rules whose block is kept verbatim in the head
const KEPT_AT_RULES: &[&str] = &[
    "media",
    "font-face",
    "keyframes",
    "-webkit-keyframes",
    "supports",
];

/// Split author CSS into rules.
///
/// With `inline` set, inlinable rules become compound rules; otherwise every
/// rule is emitted into the head.
pub fn parse_stylesheet(css: &str, inline: bool, origin: NodeId) -> Vec<CssRule> {
    let css = strip_comments(css);
    let mut rules = Vec::new();
    let mut rest = css.trim_start();

    while !rest.is_empty() {
        if let Some(at) = rest.strip_prefix('@') {
            let name: String = at
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            let brace = rest.find('{');
            let semi = rest.find(';');

            match (brace, semi) {
                (Some(b), Some(s)) if s < b => {
                    debug!(at_rule = %name, "dropping statement at-rule");
                    rest = rest[s + 1..].trim_start();
                }
                (None, Some(s)) => {
                    debug!(at_rule = %name, "dropping statement at-rule");
                    rest = rest[s + 1..].trim_start();
                }
                (Some(b), _) => {
                    let end = matching_brace(rest, b).unwrap_or(rest.len());
                    let block = &rest[..end];
                    if KEPT_AT_RULES.contains(&name.as_str()) {
                        rules.push(CssRule::verbatim(origin, collapse(block)));
                    } else {
                        debug!(at_rule = %name, "dropping unsupported at-rule block");
                    }
                    rest = rest[end..].trim_start();
                }
                (None, None) => break,
            }
            continue;
        }

        let Some(open) = rest.find('{') else {
            break;
        };
        let selector = rest[..open].trim();
        let close = rest[open..]
            .find('}')
            .map(|i| open + i)
            .unwrap_or(rest.len());
        let body = rest.get(open + 1..close).unwrap_or("");
        let declarations = parse_declarations(body);
        rest = rest.get(close + 1..).unwrap_or("").trim_start();

        if selector.is_empty() || declarations.is_empty() {
            continue;
        }

        let compounds: Option<Vec<Vec<SimpleSelector>>> = if inline {
            selector.split(',').map(parse_compound).collect()
        } else {
            None
        };

        match compounds {
            Some(compounds) => {
                for parts in compounds {
                    rules.push(CssRule::compound(origin, parts, declarations.clone()));
                }
            }
            None => rules.push(CssRule::head_block(
                origin,
                &collapse(selector),
                &declarations,
            )),
        }
    }

    rules
}

/// Parse `prop: value; ...` into declarations, lowercasing property names
pub fn parse_declarations(body: &str) -> Declarations {
    let mut declarations = Declarations::new();
    for item in split_declarations(body) {
        let Some((property, value)) = item.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        declarations.set(property, value);
    }
    declarations
}

/// Split on `;` outside parentheses and quoted strings, so values such as
/// `url(data:image/png;base64,...)` stay whole
fn split_declarations(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                items.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&body[start..]);
    items
}

/// Parse one selector as an inlinable compound (`mj-text.a#b`), or `None`
fn parse_compound(selector: &str) -> Option<Vec<SimpleSelector>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut rest = selector;

    let tag_len = rest
        .find(|c: char| c == '.' || c == '#')
        .unwrap_or(rest.len());
    if tag_len > 0 {
        let tag = &rest[..tag_len];
        if !tag.starts_with("mj-") || !is_ident(tag) {
            return None;
        }
        parts.push(SimpleSelector::Tag(tag.to_string()));
        rest = &rest[tag_len..];
    }

    while let Some(kind) = rest.chars().next() {
        let body = &rest[1..];
        let len = body
            .find(|c: char| c == '.' || c == '#')
            .unwrap_or(body.len());
        let name = &body[..len];
        if !is_ident(name) {
            return None;
        }
        parts.push(match kind {
            '.' => SimpleSelector::Class(name.to_string()),
            _ => SimpleSelector::Id(name.to_string()),
        });
        rest = &body[len..];
    }

    Some(parts)
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte offset just past the `}` matching the `{` at `open`
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::rule::{Selector, Specificity};
    use pretty_assertions::assert_eq;

    fn head_texts(rules: &[CssRule]) -> Vec<&str> {
        rules
            .iter()
            .filter_map(|r| match &r.selector {
                Selector::Head(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_inline_rules_become_compounds() {
        let rules = parse_stylesheet(
            ".red { color: red; } mj-text.big, #hero { font-size: 20px }",
            true,
            NodeId(1),
        );
        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules[0].selector,
            Selector::Compound(vec![SimpleSelector::Class("red".into())])
        );
        assert_eq!(rules[1].specificity, Specificity(0, 1, 1));
        assert_eq!(rules[2].specificity, Specificity(1, 0, 0));
        assert_eq!(rules[2].declarations.get("font-size"), Some("20px"));
    }

    #[test]
    fn test_non_inlinable_selectors_go_to_head() {
        let rules = parse_stylesheet(
            "a:hover { color: blue } p { margin: 0 } .x .y { color: red }",
            true,
            NodeId(1),
        );
        assert_eq!(
            head_texts(&rules),
            vec![
                "a:hover { color:blue; }",
                "p { margin:0; }",
                ".x .y { color:red; }"
            ]
        );
    }

    #[test]
    fn test_head_mode_keeps_everything_in_head() {
        let rules = parse_stylesheet(".red { color: red }", false, NodeId(1));
        assert_eq!(head_texts(&rules), vec![".red { color:red; }"]);
    }

    #[test]
    fn test_at_rules() {
        let css = r#"
            @charset "utf-8";
            @import url(foo.css);
            /* comment { } */
            @media (max-width: 480px) {
                .a { color: red; }
            }
            .b { color: blue }
        "#;
        let rules = parse_stylesheet(css, true, NodeId(0));
        assert_eq!(
            head_texts(&rules),
            vec!["@media (max-width: 480px) { .a { color: red; } }"]
        );
        assert_eq!(rules.len(), 2);
        assert!(rules[1].is_inlinable());
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations(" COLOR : red ; ; background: url(a.png) ; bogus ");
        let pairs: Vec<_> = decls.iter().collect();
        assert_eq!(pairs, vec![("color", "red"), ("background", "url(a.png)")]);
    }

    #[test]
    fn test_semicolons_inside_values() {
        let decls = parse_declarations(
            "background-image: url(data:image/png;base64,AAA=); font-family: 'A;B', serif; color: red",
        );
        let pairs: Vec<_> = decls.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("background-image", "url(data:image/png;base64,AAA=)"),
                ("font-family", "'A;B', serif"),
                ("color", "red"),
            ]
        );
    }
}
