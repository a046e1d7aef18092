//! Tree builder using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::components::ComponentRegistry;
use crate::error::{ParseError, Position};
use crate::parser::ast::{Attributes, Node};
use crate::parser::lexer::{self, Token};

/// Tag every document must start with
pub const ROOT_TAG: &str = "mjml";

/// Input limits applied while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Largest accepted input, in bytes
    pub max_input_size: usize,
    /// Deepest accepted element nesting
    pub max_nesting_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_size: 1_048_576,
            max_nesting_depth: 100,
        }
    }
}

/// Child content of an element before it is folded into a [`Node`]
#[derive(Debug, Clone)]
enum Content {
    Element(Node),
    Text(String),
    Raw(String),
}

/// Parse a document using the default component registry and limits
pub fn parse(input: &str) -> Result<Node, ParseError> {
    parse_with(input, ComponentRegistry::global(), &ParseLimits::default())
}

/// Parse a document
///
/// The registry decides which tags keep their body verbatim. The returned
/// tree has preorder ids assigned and no resolved attributes yet.
pub fn parse_with(
    input: &str,
    registry: &ComponentRegistry,
    limits: &ParseLimits,
) -> Result<Node, ParseError> {
    if input.len() > limits.max_input_size {
        return Err(ParseError::limit(
            input,
            0..0,
            format!(
                "input is {} bytes, larger than the maximum of {} bytes",
                input.len(),
                limits.max_input_size
            ),
        ));
    }

    let len = input.len();
    let tokens = lexer::lex(
        input,
        |tag| registry.preserves_whitespace(tag),
        limits.max_nesting_depth,
    )?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    let mut root = document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(|e| ParseError::from_rich(e, input))
                .unwrap_or_else(|| ParseError::syntax(input, 0..0, "invalid document"))
        })?;

    if root.tag != ROOT_TAG {
        return Err(ParseError::InvalidRoot {
            found: root.tag,
            position: Position::of(input, root.span.start),
            span: root.span,
        });
    }

    root.assign_ids();
    Ok(root)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Node, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let blank = select! {
        Token::Text(t) if t.trim().is_empty() => (),
    }
    .repeated();

    let attribute = select! { Token::Name(n) => n }
        .then_ignore(just(Token::Equals))
        .then(select! { Token::Value(v) => v }.labelled("quoted attribute value"))
        .map_with(|(name, value), e| (name, value, e.span()));

    let element = recursive(|element| {
        let content = choice((
            element.map(Content::Element),
            select! {
                Token::Text(t) => Content::Text(t),
                Token::Raw(r) => Content::Raw(r),
            },
        ));

        let close = select! { Token::CloseTag(n) => n }
            .map_with(|name, e| (name, e.span()))
            .then_ignore(just(Token::TagEnd));

        let body = choice((
            just(Token::SelfClose).to(None),
            just(Token::TagEnd)
                .ignore_then(content.repeated().collect::<Vec<_>>())
                .then(close)
                .map(Some),
        ));

        select! { Token::OpenTag(n) => n }
            .then(attribute.clone().repeated().collect::<Vec<_>>())
            .then(body)
            .try_map(|((tag, attrs), body), span: SimpleSpan| {
                build_node(tag, attrs, body, span_range(&span))
            })
            .boxed()
    });

    blank
        .clone()
        .ignore_then(element)
        .then_ignore(blank)
        .then_ignore(end())
}

type ParsedAttribute = (String, String, SimpleSpan);
type ParsedBody = Option<(Vec<Content>, (String, SimpleSpan))>;

fn build_node<'a>(
    tag: String,
    attrs: Vec<ParsedAttribute>,
    body: ParsedBody,
    span: std::ops::Range<usize>,
) -> Result<Node, Rich<'a, Token>> {
    let mut attributes = Attributes::new();
    for (name, value, attr_span) in attrs {
        if attributes.contains_key(&name) {
            return Err(Rich::custom(
                attr_span,
                format!("duplicate attribute '{}' on <{}>", name, tag),
            ));
        }
        attributes.insert(name, value);
    }

    let mut node = Node::new(tag).with_span(span);
    node.attributes = attributes;

    let Some((contents, (close_name, close_span))) = body else {
        return Ok(node);
    };

    if close_name != node.tag {
        return Err(Rich::custom(
            close_span,
            format!(
                "mismatched closing tag: expected </{}>, found </{}>",
                node.tag, close_name
            ),
        ));
    }

    let mut text = String::new();
    let mut raw = String::new();
    for item in contents {
        match item {
            Content::Element(child) => node.children.push(child),
            Content::Text(t) => {
                text.push_str(&t);
                text.push(' ');
            }
            Content::Raw(r) => raw.push_str(&r),
        }
    }

    node.content = if raw.is_empty() {
        collapse_whitespace(&text)
    } else {
        raw
    };
    Ok(node)
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
