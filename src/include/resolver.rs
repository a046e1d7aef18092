//! Include resolver collaborators

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use thiserror::Error;

/// How included content is spliced into the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeType {
    /// MJML markup, parsed and spliced as elements (the default)
    Mjml,
    /// Raw HTML, wrapped in an `mj-raw`
    Html,
    /// CSS, wrapped in an `mj-style`
    Css,
    /// Shorthand for `type="css" css-inline="inline"`
    CssInline,
}

impl IncludeType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mjml" => Some(IncludeType::Mjml),
            "html" => Some(IncludeType::Html),
            "css" => Some(IncludeType::Css),
            "css-inline" => Some(IncludeType::CssInline),
            _ => None,
        }
    }
}

/// What the resolver knows about the include being fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverContext {
    /// Reference of the file containing the marker (`None` for the top document)
    pub including_path: Option<String>,
    pub include_type: IncludeType,
    /// Nesting depth of this include (1 for includes in the top document)
    pub depth: usize,
}

/// The resolver could not produce content for a reference
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot resolve '{path}': {reason}")]
pub struct NotFoundError {
    pub path: String,
    pub reason: String,
}

impl NotFoundError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Fetches the text behind an include reference.
///
/// `path` is already normalised relative to the document root (see
/// [`normalize_reference`]). Implementations may block; they are shared across
/// threads, so they must be `Send + Sync`.
pub trait IncludeResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, path: &str, ctx: &ResolverContext) -> Result<String, NotFoundError>;
}

/// Join `path` onto the directory of `including` and fold `.`/`..` segments.
///
/// Leading `..` segments that climb above the root are kept, so resolvers can
/// reject them.
pub fn normalize_reference(including: Option<&str>, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !path.starts_with('/') {
        if let Some(parent) = including.and_then(|p| p.rsplit_once('/')).map(|(dir, _)| dir) {
            segments.extend(parent.split('/').filter(|s| !s.is_empty()));
        }
    }

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Reads includes from files below a base directory
#[derive(Debug, Clone)]
pub struct FileSystemIncludeResolver {
    base: PathBuf,
}

impl FileSystemIncludeResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl IncludeResolver for FileSystemIncludeResolver {
    fn resolve(&self, path: &str, _ctx: &ResolverContext) -> Result<String, NotFoundError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(NotFoundError::new(path, "path escapes the include root"));
        }

        let full = self.base.join(relative);
        std::fs::read_to_string(&full)
            .map_err(|e| NotFoundError::new(path, format!("{} ({})", e, full.display())))
    }
}

/// Serves includes from an in-memory map
#[derive(Debug, Clone, Default)]
pub struct MapIncludeResolver {
    entries: HashMap<String, String>,
}

impl MapIncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style
    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.entries
            .insert(normalize_reference(None, &path.into()), content.into());
    }
}

impl IncludeResolver for MapIncludeResolver {
    fn resolve(&self, path: &str, _ctx: &ResolverContext) -> Result<String, NotFoundError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| NotFoundError::new(path, "no such entry"))
    }
}

/// Tries several resolvers in order; the first success wins
#[derive(Debug, Clone, Default)]
pub struct CompositeIncludeResolver {
    resolvers: Vec<Arc<dyn IncludeResolver>>,
}

impl CompositeIncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: Arc<dyn IncludeResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

impl IncludeResolver for CompositeIncludeResolver {
    fn resolve(&self, path: &str, ctx: &ResolverContext) -> Result<String, NotFoundError> {
        let mut reasons = Vec::new();
        for resolver in &self.resolvers {
            match resolver.resolve(path, ctx) {
                Ok(content) => return Ok(content),
                Err(e) => reasons.push(e.reason),
            }
        }
        if reasons.is_empty() {
            reasons.push("no resolvers configured".to_string());
        }
        Err(NotFoundError::new(path, reasons.join("; ")))
    }
}

/// Routes references to resolvers by path prefix
///
/// Prefixes are matched against the normalised reference in insertion order;
/// the matched prefix is stripped before delegating.
#[derive(Debug, Clone, Default)]
pub struct PrefixRoutingIncludeResolver {
    routes: Vec<(String, Arc<dyn IncludeResolver>)>,
    fallback: Option<Arc<dyn IncludeResolver>>,
}

impl PrefixRoutingIncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: impl Into<String>, resolver: Arc<dyn IncludeResolver>) -> Self {
        self.routes.push((prefix.into(), resolver));
        self
    }

    /// Resolver for references no prefix matches
    pub fn fallback(mut self, resolver: Arc<dyn IncludeResolver>) -> Self {
        self.fallback = Some(resolver);
        self
    }
}

impl IncludeResolver for PrefixRoutingIncludeResolver {
    fn resolve(&self, path: &str, ctx: &ResolverContext) -> Result<String, NotFoundError> {
        for (prefix, resolver) in &self.routes {
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                return resolver.resolve(rest, ctx);
            }
        }
        match &self.fallback {
            Some(resolver) => resolver.resolve(path, ctx),
            None => Err(NotFoundError::new(path, "no resolver matches this prefix")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: String,
    including_path: Option<String>,
    include_type: IncludeType,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    content: String,
    expires_at: Instant,
}

/// Remembers successful lookups of another resolver
///
/// Entries live for `ttl`. When `max_entries` is reached, expired entries are
/// dropped first, then the oldest quarter. Failures are never cached.
#[derive(Debug)]
pub struct CachingIncludeResolver {
    delegate: Arc<dyn IncludeResolver>,
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CachingIncludeResolver {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
    pub const DEFAULT_MAX_ENTRIES: usize = 256;

    pub fn new(delegate: Arc<dyn IncludeResolver>) -> Self {
        Self {
            delegate,
            ttl: Self::DEFAULT_TTL,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Capacity of the cache; values below 1 are raised to 1
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drop every entry cached for `path`, whatever the including file
    pub fn invalidate(&self, path: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| key.path != path);
    }

    fn evict(entries: &mut HashMap<CacheKey, CacheEntry>, max_entries: usize, now: Instant) {
        if entries.len() < max_entries {
            return;
        }
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() < max_entries {
            return;
        }

        let mut by_age: Vec<(CacheKey, Instant)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.expires_at))
            .collect();
        by_age.sort_by_key(|(_, expires_at)| *expires_at);
        let count = (entries.len() / 4).max(1);
        for (key, _) in by_age.into_iter().take(count) {
            entries.remove(&key);
        }
    }
}

impl IncludeResolver for CachingIncludeResolver {
    fn resolve(&self, path: &str, ctx: &ResolverContext) -> Result<String, NotFoundError> {
        let key = CacheKey {
            path: path.to_string(),
            including_path: ctx.including_path.clone(),
            include_type: ctx.include_type,
        };
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(&key).filter(|e| e.expires_at > now) {
                return Ok(entry.content.clone());
            }
        }

        let content = self.delegate.resolve(path, ctx)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Self::evict(&mut entries, self.max_entries, now);
        entries.insert(
            key,
            CacheEntry {
                content: content.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx() -> ResolverContext {
        ResolverContext {
            including_path: None,
            include_type: IncludeType::Mjml,
            depth: 1,
        }
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference(None, "./header.mjml"), "header.mjml");
        assert_eq!(
            normalize_reference(Some("partials/a.mjml"), "b.mjml"),
            "partials/b.mjml"
        );
        assert_eq!(
            normalize_reference(Some("partials/a.mjml"), "../b.mjml"),
            "b.mjml"
        );
        assert_eq!(normalize_reference(Some("partials/a.mjml"), "/b.mjml"), "b.mjml");
        assert_eq!(normalize_reference(None, "../../etc/passwd"), "../../etc/passwd");
    }

    #[test]
    fn test_map_resolver() {
        let resolver = MapIncludeResolver::new().with("./a.mjml", "<mj-text>A</mj-text>");
        assert_eq!(
            resolver.resolve("a.mjml", &ctx()).unwrap(),
            "<mj-text>A</mj-text>"
        );
        assert!(resolver.resolve("b.mjml", &ctx()).is_err());
    }

    #[test]
    fn test_composite_first_success_wins() {
        let first: Arc<dyn IncludeResolver> = Arc::new(MapIncludeResolver::new().with("a", "one"));
        let second: Arc<dyn IncludeResolver> =
            Arc::new(MapIncludeResolver::new().with("a", "two").with("b", "three"));
        let composite = CompositeIncludeResolver::new().with(first).with(second);

        assert_eq!(composite.resolve("a", &ctx()).unwrap(), "one");
        assert_eq!(composite.resolve("b", &ctx()).unwrap(), "three");
        let err = composite.resolve("c", &ctx()).unwrap_err();
        assert_eq!(err.path, "c");
    }

    #[test]
    fn test_file_system_rejects_traversal() {
        let resolver = FileSystemIncludeResolver::new(std::env::temp_dir());
        let err = resolver.resolve("../secret.mjml", &ctx()).unwrap_err();
        assert!(err.reason.contains("escapes"));
    }

    #[test]
    fn test_file_system_reads_below_base() {
        let dir = std::env::temp_dir().join(format!("mjml-render-fs-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("partials")).unwrap();
        std::fs::write(dir.join("partials/header.mjml"), "<mj-text>Hi</mj-text>").unwrap();

        let resolver = FileSystemIncludeResolver::new(&dir);
        let content = resolver.resolve("partials/header.mjml", &ctx()).unwrap();
        assert_eq!(content, "<mj-text>Hi</mj-text>");
        assert!(resolver.resolve("partials/missing.mjml", &ctx()).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_include_type_names() {
        assert_eq!(IncludeType::parse("css-inline"), Some(IncludeType::CssInline));
        assert_eq!(IncludeType::parse("css"), Some(IncludeType::Css));
        assert_eq!(IncludeType::parse("json"), None);
    }

    #[test]
    fn test_prefix_routing_strips_prefix() {
        let shared: Arc<dyn IncludeResolver> =
            Arc::new(MapIncludeResolver::new().with("footer.mjml", "shared footer"));
        let local: Arc<dyn IncludeResolver> =
            Arc::new(MapIncludeResolver::new().with("shared/footer.mjml", "local footer"));
        let routing = PrefixRoutingIncludeResolver::new()
            .route("shared/", shared)
            .fallback(local);

        assert_eq!(routing.resolve("shared/footer.mjml", &ctx()).unwrap(), "shared footer");
        assert!(routing.resolve("header.mjml", &ctx()).is_err());
    }

    #[test]
    fn test_prefix_routing_without_fallback() {
        let routing = PrefixRoutingIncludeResolver::new()
            .route("a/", Arc::new(MapIncludeResolver::new().with("x", "X")));
        assert_eq!(routing.resolve("a/x", &ctx()).unwrap(), "X");
        let err = routing.resolve("b/x", &ctx()).unwrap_err();
        assert_eq!(err.path, "b/x");
    }

    /// Counts how often it is asked for content
    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl IncludeResolver for Counting {
        fn resolve(&self, path: &str, _ctx: &ResolverContext) -> Result<String, NotFoundError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path.starts_with("missing") {
                return Err(NotFoundError::new(path, "no such entry"));
            }
            Ok(format!("content of {path}"))
        }
    }

    #[test]
    fn test_caching_serves_repeat_lookups() {
        let counting = Arc::new(Counting::default());
        let cache = CachingIncludeResolver::new(counting.clone());

        assert_eq!(cache.resolve("a.mjml", &ctx()).unwrap(), "content of a.mjml");
        assert_eq!(cache.resolve("a.mjml", &ctx()).unwrap(), "content of a.mjml");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        cache.invalidate("a.mjml");
        assert!(cache.is_empty());
        cache.resolve("a.mjml", &ctx()).unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_caching_keys_on_context_and_skips_failures() {
        let counting = Arc::new(Counting::default());
        let cache = CachingIncludeResolver::new(counting.clone());
        let css = ResolverContext {
            include_type: IncludeType::Css,
            ..ctx()
        };

        cache.resolve("a", &ctx()).unwrap();
        cache.resolve("a", &css).unwrap();
        assert_eq!(cache.len(), 2);

        assert!(cache.resolve("missing", &ctx()).is_err());
        assert!(cache.resolve("missing", &ctx()).is_err());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_caching_expiry_and_capacity() {
        let counting = Arc::new(Counting::default());
        let expired = CachingIncludeResolver::new(counting.clone()).with_ttl(Duration::ZERO);
        expired.resolve("a", &ctx()).unwrap();
        expired.resolve("a", &ctx()).unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);

        let small = CachingIncludeResolver::new(counting).with_max_entries(2);
        for path in ["a", "b", "c", "d"] {
            small.resolve(path, &ctx()).unwrap();
        }
        assert!(small.len() <= 2);
        small.invalidate_all();
        assert!(small.is_empty());
    }
}
