//! Parser for MJML markup

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{collapse_whitespace, parse, parse_with, ParseLimits, ROOT_TAG};
