//! Attribute rules declared in `mj-attributes`

use crate::parser::{Attributes, Node};

use super::AttributeError;

pub const ATTRIBUTES_TAG: &str = "mj-attributes";
pub const ALL_TAG: &str = "mj-all";
pub const CLASS_TAG: &str = "mj-class";

/// Which nodes a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSelector {
    /// `mj-all`: every node
    All,
    /// Default attributes for one tag
    Tag(String),
    /// `mj-class name="..."`, applied to nodes listing the class in `mj-class`
    Class(String),
    /// A tag element nested in an `mj-class`: applies to class members of that tag
    ClassTag { class: String, tag: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRule {
    pub selector: RuleSelector,
    pub attributes: Attributes,
    /// Position in document order, for stable tie-breaking
    pub source_index: usize,
}

/// Every attribute rule of a document, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<AttributeRule>,
}

impl RuleSet {
    /// Extract rules from every `mj-attributes` block under `mj-head`
    pub fn from_tree(root: &Node) -> Result<Self, AttributeError> {
        let mut set = RuleSet::default();
        for head in root.children.iter().filter(|c| c.tag == "mj-head") {
            for block in head.children.iter().filter(|c| c.tag == ATTRIBUTES_TAG) {
                for entry in &block.children {
                    set.add_entry(entry)?;
                }
            }
        }
        Ok(set)
    }

    fn add_entry(&mut self, entry: &Node) -> Result<(), AttributeError> {
        match entry.tag.as_str() {
            ALL_TAG => self.push(RuleSelector::All, entry.attributes.clone()),
            CLASS_TAG => {
                let name = entry
                    .attribute("name")
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        AttributeError::new(entry, "name", "missing required attribute")
                    })?
                    .to_string();

                let mut attributes = entry.attributes.clone();
                attributes.remove("name");
                self.push(RuleSelector::Class(name.clone()), attributes);

                for nested in &entry.children {
                    self.push(
                        RuleSelector::ClassTag {
                            class: name.clone(),
                            tag: nested.tag.clone(),
                        },
                        nested.attributes.clone(),
                    );
                }
            }
            tag => self.push(RuleSelector::Tag(tag.to_string()), entry.attributes.clone()),
        }
        Ok(())
    }

    fn push(&mut self, selector: RuleSelector, attributes: Attributes) {
        let source_index = self.rules.len();
        self.rules.push(AttributeRule {
            selector,
            attributes,
            source_index,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `mj-all` rules, then rules for `tag`, each group in source order
    pub fn tag_defaults<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Attributes> + 'a {
        let all = self
            .rules
            .iter()
            .filter(|r| r.selector == RuleSelector::All);
        let for_tag = self
            .rules
            .iter()
            .filter(move |r| matches!(&r.selector, RuleSelector::Tag(t) if t == tag));
        all.chain(for_tag).map(|r| &r.attributes)
    }

    /// The rule for `class`, then its overrides for `tag`
    pub fn class_rules<'a>(
        &'a self,
        class: &'a str,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a Attributes> + 'a {
        let base = self
            .rules
            .iter()
            .filter(move |r| matches!(&r.selector, RuleSelector::Class(c) if c == class));
        let overrides = self.rules.iter().filter(move |r| {
            matches!(&r.selector, RuleSelector::ClassTag { class: c, tag: t } if c == class && t == tag)
        });
        base.chain(overrides).map(|r| &r.attributes)
    }
}
