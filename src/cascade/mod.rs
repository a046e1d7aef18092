//! Attribute cascade
//!
//! Every node's final attribute map is built top-down from five layers, later
//! layers overriding earlier ones key by key:
//!
//! 1. the component's intrinsic defaults,
//! 2. `mj-all` rules, then rules for the node's tag,
//! 3. `mj-class` rules for each listed class, in listed order, each followed by
//!    its overrides for this tag,
//! 4. attributes written on the node,
//! 5. inheritable keys still unset, copied from the parent's resolved map.
//!
//! Empty values never override and count as unset.

pub mod rules;
pub mod values;

use thiserror::Error;
use tracing::debug;

use crate::components::ComponentRegistry;
use crate::parser::{Attributes, Node, Span};

pub use rules::{AttributeRule, RuleSelector, RuleSet};
pub use values::{expand_short_hex, AttrType};

/// An attribute is missing or has an invalid value
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid attribute '{attribute}' on <{tag}>: {reason}")]
pub struct AttributeError {
    pub tag: String,
    pub attribute: String,
    pub reason: String,
    pub span: Span,
}

impl AttributeError {
    pub(crate) fn new(node: &Node, attribute: &str, reason: impl Into<String>) -> Self {
        Self {
            tag: node.tag.clone(),
            attribute: attribute.to_string(),
            reason: reason.into(),
            span: node.span.clone(),
        }
    }
}

/// Resolve attributes for every node of the tree in place
pub fn resolve(root: &mut Node, registry: &ComponentRegistry) -> Result<(), AttributeError> {
    let rules = RuleSet::from_tree(root)?;
    debug!(rules = rules.len(), "resolving attributes");
    resolve_node(root, None, &rules, registry)
}

fn resolve_node(
    node: &mut Node,
    parent: Option<&Attributes>,
    rules: &RuleSet,
    registry: &ComponentRegistry,
) -> Result<(), AttributeError> {
    let component = registry.get(&node.tag);
    let mut attrs = Attributes::new();

    if let Some(component) = component {
        overlay(
            &mut attrs,
            component
                .default_attributes()
                .iter()
                .map(|(k, v)| (*k, *v)),
        );
    }

    for layer in rules.tag_defaults(&node.tag) {
        overlay(&mut attrs, pairs(layer));
    }

    if let Some(classes) = node.attribute("mj-class") {
        for class in classes.split_whitespace() {
            for layer in rules.class_rules(class, &node.tag) {
                overlay(&mut attrs, pairs(layer));
            }
        }
    }

    overlay(
        &mut attrs,
        pairs(&node.attributes).filter(|(k, _)| *k != "mj-class"),
    );

    if let (Some(component), Some(parent)) = (component, parent) {
        for key in component.inheritable() {
            let unset = attrs.get(*key).map_or(true, |v| v.is_empty());
            if let Some(value) = parent.get(*key).filter(|v| !v.is_empty()) {
                if unset {
                    attrs.insert(key.to_string(), value.clone());
                }
            }
        }
    }

    for (key, value) in attrs.iter_mut() {
        if key.ends_with("color") {
            if let Some(expanded) = expand_short_hex(value) {
                *value = expanded;
            }
        }
    }

    if let Some(component) = component {
        validate(node, &attrs, component.required(), component.attribute_types())?;
    }

    let descend = component.map_or(true, |c| c.children_are_components());
    if descend {
        for child in &mut node.children {
            resolve_node(child, Some(&attrs), rules, registry)?;
        }
    }

    node.resolved = Some(attrs);
    Ok(())
}

fn pairs(attrs: &Attributes) -> impl Iterator<Item = (&str, &str)> {
    attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

fn overlay<'a>(attrs: &mut Attributes, layer: impl Iterator<Item = (&'a str, &'a str)>) {
    for (key, value) in layer {
        if !value.is_empty() {
            attrs.insert(key.to_string(), value.to_string());
        }
    }
}

fn validate(
    node: &Node,
    attrs: &Attributes,
    required: &[&str],
    types: &[(&str, AttrType)],
) -> Result<(), AttributeError> {
    for name in required {
        if attrs.get(*name).map_or(true, |v| v.trim().is_empty()) {
            return Err(AttributeError::new(node, name, "missing required attribute"));
        }
    }
    for (name, ty) in types {
        if let Some(value) = attrs.get(*name).filter(|v| !v.is_empty()) {
            ty.check(value)
                .map_err(|reason| AttributeError::new(node, name, reason))?;
        }
    }
    Ok(())
}
