//! Include resolution
//!
//! `<mj-include path="..."/>` markers are replaced by the content they point at
//! before any attribute is resolved, so included markup behaves exactly as if
//! it had been written inline.
//!
//! # Example
//!
//! ```text
//! <mj-body>
//!   <mj-include path="partials/header.mjml" />
//!   <mj-include path="footer.html" type="html" />
//! </mj-body>
//! ```
//!
//! Fetching is delegated to an [`IncludeResolver`]; the processor owns cycle
//! detection and the depth limit.

mod processor;
mod resolver;

pub use processor::{resolve_includes, IncludeError, IncludeOptions, INCLUDE_TAG};
pub use resolver::{
    normalize_reference, CachingIncludeResolver, CompositeIncludeResolver,
    FileSystemIncludeResolver, IncludeResolver, IncludeType, MapIncludeResolver, NotFoundError,
    PrefixRoutingIncludeResolver, ResolverContext,
};
