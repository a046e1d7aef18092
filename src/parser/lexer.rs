//! Lexer for MJML markup using logos
//!
//! Markup needs two token sets: between tags everything is text, inside a tag
//! we need names, `=`, quoted values and the closing `>` / `/>`. The driver in
//! [`lex`] switches between them with [`Lexer::morph`].
//!
//! Whitespace-preserving components (`mj-text`, `mj-raw`, ...) hold arbitrary
//! HTML. Their body is captured verbatim as a single [`Token::Raw`] by scanning
//! ahead for the matching close tag, so inner HTML never reaches the grammar.

use logos::{Lexer, Logos};

use crate::error::ParseError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens consumed by the grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name`
    OpenTag(String),
    /// `</name`
    CloseTag(String),
    /// Attribute name inside a tag
    Name(String),
    /// `=`
    Equals,
    /// Quoted attribute value, entities decoded
    Value(String),
    /// `>`
    TagEnd,
    /// `/>`
    SelfClose,
    /// Text between tags, entities decoded
    Text(String),
    /// Verbatim content (CDATA, or the body of a whitespace-preserving tag)
    Raw(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken {
    #[regex(r"[^<]+")]
    Text,

    #[token("<!--", comment)]
    Comment,

    #[token("<![CDATA[", cdata)]
    CData,

    #[regex(r"<\?[^?]*\?>")]
    Declaration,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9_:.-]*")]
    CloseStart,

    #[regex(r"<[a-zA-Z][a-zA-Z0-9_:.-]*")]
    OpenStart,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagToken {
    #[regex(r"[a-zA-Z_:][a-zA-Z0-9_:.-]*")]
    Name,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,
}

fn comment(lex: &mut Lexer<ContentToken>) -> bool {
    skip_past(lex, "-->")
}

fn cdata(lex: &mut Lexer<ContentToken>) -> bool {
    skip_past(lex, "]]>")
}

fn skip_past(lex: &mut Lexer<ContentToken>, terminator: &str) -> bool {
    match lex.remainder().find(terminator) {
        Some(idx) => {
            lex.bump(idx + terminator.len());
            true
        }
        None => false,
    }
}

/// Lex markup into tokens with spans
///
/// `preserves_whitespace` decides which tags have their body captured verbatim.
/// `max_depth` bounds element nesting so pathological input fails early.
pub fn lex(
    input: &str,
    preserves_whitespace: impl Fn(&str) -> bool,
    max_depth: usize,
) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    let mut content = ContentToken::lexer(input);
    let mut depth = 0usize;

    while let Some(result) = content.next() {
        let span = content.span();
        let slice = content.slice();
        let token = match result {
            Ok(tok) => tok,
            Err(()) => {
                return Err(ParseError::syntax(
                    input,
                    span,
                    "unexpected '<' (tag names must start with a letter)",
                ))
            }
        };

        match token {
            ContentToken::Text => tokens.push((Token::Text(decode_entities(slice)), span)),
            ContentToken::CData => {
                let inner = &slice["<![CDATA[".len()..slice.len() - "]]>".len()];
                tokens.push((Token::Raw(inner.to_string()), span));
            }
            ContentToken::Comment | ContentToken::Declaration => {}
            ContentToken::CloseStart => {
                tokens.push((Token::CloseTag(slice[2..].to_string()), span));
                depth = depth.saturating_sub(1);
                let (next, _) = lex_tag(content.morph(), input, &mut tokens)?;
                content = next;
            }
            ContentToken::OpenStart => {
                let name = slice[1..].to_string();
                tokens.push((Token::OpenTag(name.clone()), span.clone()));
                let (next, self_closed) = lex_tag(content.morph(), input, &mut tokens)?;
                content = next;
                if self_closed {
                    continue;
                }

                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::limit(
                        input,
                        span,
                        format!("element nesting exceeds the maximum depth of {max_depth}"),
                    ));
                }

                if preserves_whitespace(&name) {
                    let rest = content.remainder();
                    if let Some(idx) = find_close_tag(rest, &name) {
                        let start = content.span().end;
                        if idx > 0 {
                            tokens.push((Token::Raw(rest[..idx].to_string()), start..start + idx));
                        }
                        content.bump(idx);
                    }
                }
            }
        }
    }

    Ok(tokens)
}

/// Lex the inside of a tag up to and including `>` or `/>`.
///
/// Returns the lexer morphed back to content mode and whether the tag was
/// self-closing. An unterminated tag simply runs out of tokens; the grammar
/// reports it.
fn lex_tag<'s>(
    mut tag: Lexer<'s, TagToken>,
    input: &str,
    tokens: &mut Vec<(Token, Span)>,
) -> Result<(Lexer<'s, ContentToken>, bool), ParseError> {
    let mut self_closed = false;
    while let Some(result) = tag.next() {
        let span = tag.span();
        let slice = tag.slice();
        match result {
            Ok(TagToken::Name) => tokens.push((Token::Name(slice.to_string()), span)),
            Ok(TagToken::Equals) => tokens.push((Token::Equals, span)),
            Ok(TagToken::DoubleQuoted) | Ok(TagToken::SingleQuoted) => {
                let inner = &slice[1..slice.len() - 1];
                tokens.push((Token::Value(decode_entities(inner)), span));
            }
            Ok(TagToken::End) => {
                tokens.push((Token::TagEnd, span));
                break;
            }
            Ok(TagToken::SelfClose) => {
                tokens.push((Token::SelfClose, span));
                self_closed = true;
                break;
            }
            Err(()) => {
                return Err(ParseError::syntax(
                    input,
                    span,
                    "invalid attribute syntax (values must be quoted)",
                ))
            }
        }
    }
    Ok((tag.morph(), self_closed))
}

/// Offset of the `</name` that closes a verbatim body, if any
fn find_close_tag(rest: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    let mut from = 0;
    while let Some(found) = rest[from..].find(&needle) {
        let idx = from + found;
        let after = &rest[idx + needle.len()..];
        match after.chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => return Some(idx),
            _ => from = idx + needle.len(),
        }
    }
    None
}

/// Decode the predefined XML entities and numeric character references.
///
/// Unknown named entities are left untouched so HTML-only entities such as
/// `&nbsp;` survive into the output.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => numeric_reference(entity),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
