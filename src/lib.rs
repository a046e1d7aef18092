//! mjml-render - compile MJML responsive email markup to HTML
//!
//! This library provides a parser, include resolver, attribute cascade, CSS
//! inliner and component renderer for MJML documents.
//!
//! # Example
//!
//! ```rust
//! use mjml_render::render;
//!
//! let html = render("<mjml><mj-body><mj-section><mj-column><mj-text>Hi</mj-text></mj-column></mj-section></mj-body></mjml>").unwrap();
//! assert!(html.starts_with("<!doctype html>"));
//! assert!(html.contains("Hi"));
//! ```

pub mod cascade;
pub mod components;
pub mod config;
pub mod css;
pub mod error;
pub mod include;
pub mod layout;
pub mod parser;
pub mod renderer;

pub use cascade::AttributeError;
pub use components::{Component, ComponentRegistry, UnknownComponentError};
pub use config::{ConfigError, ConfigFile};
pub use error::ParseError;
pub use include::{
    CachingIncludeResolver, CompositeIncludeResolver, FileSystemIncludeResolver, IncludeError,
    IncludeResolver, MapIncludeResolver, PrefixRoutingIncludeResolver,
};
pub use parser::{parse, Node, ParseLimits};
pub use renderer::HtmlConfig;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use components::RenderContext;
use include::IncludeOptions;
use layout::Layout;
use parser::Span;
use renderer::HeadMetadata;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while splicing includes
    #[error("include error: {0}")]
    Include(#[from] IncludeError),

    /// A tag with no registered component, in strict mode
    #[error("unknown component <{tag}>")]
    UnknownComponent { tag: String, span: Span },

    /// A required attribute is missing or a value is invalid
    #[error("attribute error: {0}")]
    Attribute(#[from] AttributeError),
}

impl From<UnknownComponentError> for RenderError {
    fn from(err: UnknownComponentError) -> Self {
        RenderError::UnknownComponent {
            tag: err.tag,
            span: err.span,
        }
    }
}

impl RenderError {
    /// Byte range of the offending markup in the top-level document, if known
    pub fn span(&self) -> Option<&Span> {
        match self {
            RenderError::Parse(e) => Some(e.span()),
            RenderError::UnknownComponent { span, .. } => Some(span),
            RenderError::Attribute(e) => Some(&e.span),
            RenderError::Include(_) => None,
        }
    }
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// HTML output configuration
    pub output: HtmlConfig,
    /// Input size and nesting limits
    pub limits: ParseLimits,
    /// Deepest allowed include nesting
    pub max_include_depth: usize,
    /// Fail on unknown tags instead of skipping them
    pub strict: bool,
    /// Where `mj-include` content comes from; includes fail without one
    pub include_resolver: Option<Arc<dyn IncludeResolver>>,
    /// Component set; the built-in registry when unset
    pub registry: Option<Arc<ComponentRegistry>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: HtmlConfig::default(),
            limits: ParseLimits::default(),
            max_include_depth: 50,
            strict: false,
            include_resolver: None,
            registry: None,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML output configuration
    pub fn with_output(mut self, config: HtmlConfig) -> Self {
        self.output = config;
        self
    }

    /// Set the parse limits
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Limit how deeply includes may nest
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Enable or disable strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve `mj-include` references with `resolver`
    ///
    /// ```rust
    /// use mjml_render::{render_with_config, MapIncludeResolver, RenderConfig};
    ///
    /// let resolver = MapIncludeResolver::new().with(
    ///     "footer.mjml",
    ///     "<mj-section><mj-column><mj-divider/></mj-column></mj-section>",
    /// );
    /// let config = RenderConfig::new().with_include_resolver(resolver);
    /// let html = render_with_config(
    ///     r#"<mjml><mj-body><mj-include path="footer.mjml"/></mj-body></mjml>"#,
    ///     &config,
    /// ).unwrap();
    /// assert!(html.contains("mj-column-per-100"));
    /// ```
    pub fn with_include_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.include_resolver = Some(Arc::new(resolver));
        self
    }

    /// Use a shared resolver
    pub fn with_shared_include_resolver(mut self, resolver: Arc<dyn IncludeResolver>) -> Self {
        self.include_resolver = Some(resolver);
        self
    }

    /// Render with a custom component registry
    pub fn with_registry(mut self, registry: Arc<ComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Minify inline styles and the head stylesheet
    pub fn with_css_minify(mut self, minify: bool) -> Self {
        self.output.css_minify = minify;
        self
    }

    /// Value of `<html lang>` unless the document sets one
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.output.language = language.into();
        self
    }

    /// Value of `<html dir>` unless the document sets one
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.output.direction = direction.into();
        self
    }

    fn registry(&self) -> &ComponentRegistry {
        self.registry
            .as_deref()
            .unwrap_or_else(|| ComponentRegistry::global())
    }
}

/// Render MJML markup to HTML with default configuration
///
/// This is the main entry point for the library. It parses the markup,
/// resolves attributes and styles, and assembles the HTML document.
///
/// # Example
///
/// ```rust
/// use mjml_render::render;
///
/// let html = render(r#"
///     <mjml>
///       <mj-body>
///         <mj-section>
///           <mj-column><mj-text>Left</mj-text></mj-column>
///           <mj-column><mj-text>Right</mj-text></mj-column>
///         </mj-section>
///       </mj-body>
///     </mjml>
/// "#).unwrap();
///
/// assert!(html.contains("mj-column-per-50"));
/// assert!(html.contains("Left"));
/// assert!(html.contains("Right"));
/// ```
pub fn render(markup: &str) -> Result<String, RenderError> {
    render_with_config(markup, &RenderConfig::default())
}

/// Render MJML markup to HTML with custom configuration
///
/// # Example
///
/// ```rust
/// use mjml_render::{render_with_config, MapIncludeResolver, RenderConfig};
///
/// let config = RenderConfig::new()
///     .with_language("en")
///     .with_include_resolver(
///         MapIncludeResolver::new().with("header.mjml", "<mj-text>Header</mj-text>"),
///     );
///
/// let html = render_with_config(
///     r#"<mjml><mj-body><mj-section><mj-column><mj-include path="header.mjml"/></mj-column></mj-section></mj-body></mjml>"#,
///     &config,
/// ).unwrap();
/// assert!(html.contains(r#"<html lang="en""#));
/// assert!(html.contains("Header"));
/// ```
pub fn render_with_config(markup: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let registry = config.registry();

    // Parse and splice includes before any styling decision
    let root = parser::parse_with(markup, registry, &config.limits)?;
    debug!(bytes = markup.len(), "parsed document");
    let options = IncludeOptions {
        registry,
        limits: config.limits,
        max_depth: config.max_include_depth,
    };
    let mut root =
        include::resolve_includes(root, config.include_resolver.as_deref(), &options)?;

    components::check_tree(&mut root, registry, config.strict)?;
    root.assign_ids();

    cascade::resolve(&mut root, registry)?;
    debug!("resolved attributes");

    let head = HeadMetadata::collect(&root, registry);
    let layout = Layout::compute(&root, registry, head.body_width);

    let rules = css::collect(&root, registry, &layout, &head.breakpoint);
    let styles = css::merge(rules, &root, registry);
    debug!(head_rules = styles.head_rules().len(), "merged styles");

    let ctx = RenderContext {
        registry,
        layout: &layout,
        styles: &styles,
        head: &head,
        config: &config.output,
    };
    let html = renderer::render_document(&root, &ctx);
    debug!(bytes = html.len(), "rendered document");
    Ok(html)
}
