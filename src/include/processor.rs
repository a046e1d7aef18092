//! Include splicing - replaces `mj-include` markers with resolved subtrees

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::components::ComponentRegistry;
use crate::error::ParseError;
use crate::parser::{self, Node, ParseLimits, Span, ROOT_TAG};

use super::resolver::{normalize_reference, IncludeResolver, IncludeType, ResolverContext};
use super::resolver::NotFoundError;

/// Tag of the include marker
pub const INCLUDE_TAG: &str = "mj-include";

/// Errors raised while splicing includes; every variant carries the chain of
/// references that led to it (outermost first)
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("<mj-include> found but no include resolver is configured")]
    NoResolver { chain: Vec<String>, span: Span },

    #[error("<mj-include> is missing the required 'path' attribute{}", format_chain(chain))]
    MissingPath { chain: Vec<String>, span: Span },

    #[error("unsupported include type '{kind}' for '{path}'{}", format_chain(chain))]
    UnsupportedType {
        path: String,
        kind: String,
        chain: Vec<String>,
    },

    #[error("include failed{}: {source}", format_chain(chain))]
    NotFound {
        chain: Vec<String>,
        #[source]
        source: NotFoundError,
    },

    #[error("circular include detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("include depth limit of {limit} exceeded: {}", chain.join(" -> "))]
    DepthExceeded { limit: usize, chain: Vec<String> },

    #[error("failed to parse included file '{path}'{}: {source}", format_chain(chain))]
    Parse {
        path: String,
        chain: Vec<String>,
        #[source]
        source: ParseError,
    },
}

impl IncludeError {
    /// References from the top document down to the failing include
    pub fn chain(&self) -> &[String] {
        match self {
            IncludeError::NoResolver { chain, .. }
            | IncludeError::MissingPath { chain, .. }
            | IncludeError::UnsupportedType { chain, .. }
            | IncludeError::NotFound { chain, .. }
            | IncludeError::Cycle { chain }
            | IncludeError::DepthExceeded { chain, .. }
            | IncludeError::Parse { chain, .. } => chain,
        }
    }
}

fn format_chain(chain: &[String]) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!(" (via {})", chain.join(" -> "))
    }
}

/// Settings for include resolution
#[derive(Debug, Clone, Copy)]
pub struct IncludeOptions<'a> {
    /// Registry used to parse fetched markup
    pub registry: &'a ComponentRegistry,
    pub limits: ParseLimits,
    /// Deepest allowed include nesting
    pub max_depth: usize,
}

/// Reference chain of the include currently being expanded
#[derive(Debug, Default)]
struct IncludeContext {
    chain: Vec<String>,
    visiting: HashSet<String>,
}

impl IncludeContext {
    fn current(&self) -> Option<&str> {
        self.chain.last().map(|s| s.as_str())
    }

    fn chain_with(&self, reference: &str) -> Vec<String> {
        let mut chain = self.chain.clone();
        chain.push(reference.to_string());
        chain
    }

    fn start_resolving(&mut self, reference: &str) {
        self.chain.push(reference.to_string());
        self.visiting.insert(reference.to_string());
    }

    fn done_resolving(&mut self, reference: &str) {
        self.chain.pop();
        self.visiting.remove(reference);
    }
}

/// Replace every `mj-include` in the tree with the content it references.
///
/// Markers are replaced in place, keeping sibling order. Ids are reassigned
/// afterwards.
pub fn resolve_includes(
    mut root: Node,
    resolver: Option<&dyn IncludeResolver>,
    options: &IncludeOptions<'_>,
) -> Result<Node, IncludeError> {
    let mut splicer = Splicer {
        resolver,
        options,
        ctx: IncludeContext::default(),
    };
    splicer.expand_children(&mut root)?;
    root.assign_ids();
    Ok(root)
}

struct Splicer<'r, 'o> {
    resolver: Option<&'r dyn IncludeResolver>,
    options: &'o IncludeOptions<'o>,
    ctx: IncludeContext,
}

impl Splicer<'_, '_> {
    fn expand_children(&mut self, node: &mut Node) -> Result<(), IncludeError> {
        if !node.children.iter().any(contains_include) {
            return Ok(());
        }

        let children = std::mem::take(&mut node.children);
        for mut child in children {
            if child.tag == INCLUDE_TAG {
                let spliced = self.include(&child, &node.tag)?;
                node.children.extend(spliced);
            } else {
                self.expand_children(&mut child)?;
                node.children.push(child);
            }
        }
        Ok(())
    }

    fn include(&mut self, marker: &Node, parent_tag: &str) -> Result<Vec<Node>, IncludeError> {
        let resolver = self.resolver.ok_or_else(|| IncludeError::NoResolver {
            chain: self.ctx.chain.clone(),
            span: marker.span.clone(),
        })?;

        let path = marker
            .attribute("path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| IncludeError::MissingPath {
                chain: self.ctx.chain.clone(),
                span: marker.span.clone(),
            })?;

        let reference = normalize_reference(self.ctx.current(), path.trim());
        let kind = marker.attribute("type").unwrap_or("mjml");
        let include_type = IncludeType::parse(kind).ok_or_else(|| IncludeError::UnsupportedType {
            path: reference.clone(),
            kind: kind.to_string(),
            chain: self.ctx.chain.clone(),
        })?;

        if self.ctx.visiting.contains(&reference) {
            return Err(IncludeError::Cycle {
                chain: self.ctx.chain_with(&reference),
            });
        }
        if self.ctx.chain.len() >= self.options.max_depth {
            return Err(IncludeError::DepthExceeded {
                limit: self.options.max_depth,
                chain: self.ctx.chain_with(&reference),
            });
        }

        let resolver_ctx = ResolverContext {
            including_path: self.ctx.current().map(str::to_string),
            include_type,
            depth: self.ctx.chain.len() + 1,
        };
        debug!(path = %reference, depth = resolver_ctx.depth, "resolving include");
        let text = resolver
            .resolve(&reference, &resolver_ctx)
            .map_err(|source| IncludeError::NotFound {
                chain: self.ctx.chain_with(&reference),
                source,
            })?;

        match include_type {
            IncludeType::Html => Ok(vec![Node::new("mj-raw")
                .with_content(text)
                .with_span(marker.span.clone())]),
            IncludeType::Css | IncludeType::CssInline => {
                let mut style = Node::new("mj-style")
                    .with_content(text)
                    .with_span(marker.span.clone());
                if include_type == IncludeType::CssInline
                    || marker.attribute("css-inline") == Some("inline")
                {
                    style = style.with_attribute("inline", "inline");
                }
                Ok(vec![style])
            }
            IncludeType::Mjml => {
                let source = wrap_fragment(&text, parent_tag);
                let mut document = parser::parse_with(
                    &source,
                    self.options.registry,
                    &self.options.limits,
                )
                .map_err(|source| IncludeError::Parse {
                    path: reference.clone(),
                    chain: self.ctx.chain_with(&reference),
                    source,
                })?;

                self.ctx.start_resolving(&reference);
                let expanded = self.expand_children(&mut document);
                self.ctx.done_resolving(&reference);
                expanded?;

                Ok(splice_section(document, parent_tag))
            }
        }
    }
}

fn contains_include(node: &Node) -> bool {
    node.tag == INCLUDE_TAG || node.children.iter().any(contains_include)
}

/// Fragments without an `<mjml>` root are wrapped so they parse as a document
fn wrap_fragment(text: &str, parent_tag: &str) -> String {
    if text.trim_start().starts_with(&format!("<{ROOT_TAG}")) {
        return text.to_string();
    }
    let section = if parent_tag == "mj-head" {
        "mj-head"
    } else {
        "mj-body"
    };
    format!("<{ROOT_TAG}><{section}>{text}</{section}></{ROOT_TAG}>")
}

/// Pick the children of the included document that belong under `parent_tag`
fn splice_section(mut document: Node, parent_tag: &str) -> Vec<Node> {
    let wanted = if parent_tag == "mj-head" {
        "mj-head"
    } else {
        "mj-body"
    };
    match document.children.iter().position(|c| c.tag == wanted) {
        Some(idx) => document.children.swap_remove(idx).children,
        None => Vec::new(),
    }
}
