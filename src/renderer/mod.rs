//! HTML renderer
//!
//! Components render the body; this module collects head metadata and
//! assembles the final document around it.

pub mod config;
pub mod head;
mod html;

pub use config::HtmlConfig;
pub use head::{FontLink, HeadMetadata, DEFAULT_BREAKPOINT};
pub use html::{escape_attr, escape_html, render_document, DocumentBuilder};
