//! Directive scanning: `{{...}}` spans to a flat token stream, plus
//! per-family pairing of block starts with their ends.
//!
//! Loops pair only against `for`/`endfor` and conditionals only against
//! `if`/`endif`. Each family keeps its own stack, so a start is closed by
//! the nearest end of its family that is not claimed by a nested start of
//! the same family.

use std::ops::Range;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// What a well-formed `{{...}}` span asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind<'a> {
    Variable { path: &'a str },
    ForStart { var: &'a str, path: &'a str },
    ForEnd,
    IfStart { path: &'a str },
    IfEnd,
}

/// Block families that nest independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Loop,
    Conditional,
}

impl DirectiveKind<'_> {
    pub fn family(&self) -> Option<Family> {
        match self {
            DirectiveKind::Variable { .. } => None,
            DirectiveKind::ForStart { .. } | DirectiveKind::ForEnd => Some(Family::Loop),
            DirectiveKind::IfStart { .. } | DirectiveKind::IfEnd => Some(Family::Conditional),
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(
            self,
            DirectiveKind::ForStart { .. } | DirectiveKind::IfStart { .. }
        )
    }

    pub fn is_end(&self) -> bool {
        matches!(self, DirectiveKind::ForEnd | DirectiveKind::IfEnd)
    }
}

/// A directive together with the byte range of its raw `{{...}}` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: DirectiveKind<'a>,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Directive(Directive<'a>),
}

/// First directive in a buffer and, for block starts, its matching end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch<'a> {
    pub start: Directive<'a>,
    pub end: Option<Directive<'a>>,
}

/// Split `src` into literal text and directives.
///
/// A `{{...}}` span whose body is not a recognised directive stays part of
/// the surrounding text. Adjacent literal pieces are merged.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(rel) = src[cursor..].find(OPEN) {
        let open = cursor + rel;
        let body_start = open + OPEN.len();
        let Some(close_rel) = src[body_start..].find(CLOSE) else {
            break;
        };
        let body_end = body_start + close_rel;
        let span_end = body_end + CLOSE.len();

        match parse_directive(&src[body_start..body_end]) {
            Some(kind) => {
                if open > text_start {
                    tokens.push(Token::Text(&src[text_start..open]));
                }
                tokens.push(Token::Directive(Directive {
                    kind,
                    span: open..span_end,
                }));
                text_start = span_end;
                cursor = span_end;
            }
            None => cursor = open + 1,
        }
    }

    if text_start < src.len() {
        tokens.push(Token::Text(&src[text_start..]));
    }
    tokens
}

/// Pair every block start with its end, per family.
///
/// The returned vector is parallel to `tokens`: a paired start holds the
/// position of its end and vice versa. Text, variables, unterminated starts
/// and stray ends hold `None`. Any ordered selection of tokens can be paired,
/// not only a whole buffer.
pub fn pair_blocks<'t, 'a: 't>(
    tokens: impl IntoIterator<Item = &'t Token<'a>>,
) -> Vec<Option<usize>> {
    let mut partners = Vec::new();
    let mut loops: Vec<usize> = Vec::new();
    let mut conditionals: Vec<usize> = Vec::new();

    for (idx, token) in tokens.into_iter().enumerate() {
        partners.push(None);
        let Token::Directive(directive) = token else {
            continue;
        };
        let stack = match directive.kind.family() {
            Some(Family::Loop) => &mut loops,
            Some(Family::Conditional) => &mut conditionals,
            None => continue,
        };

        if directive.kind.is_start() {
            stack.push(idx);
        } else if let Some(open) = stack.pop() {
            partners[open] = Some(idx);
            partners[idx] = Some(open);
        }
    }

    partners
}

/// Locate the first directive in `src` and, if it opens a block, the end
/// directive that closes it.
pub fn find_first(src: &str) -> Option<DirectiveMatch<'_>> {
    let tokens = tokenize(src);
    let partners = pair_blocks(&tokens);

    let (idx, start) = tokens.iter().enumerate().find_map(|(i, t)| match t {
        Token::Directive(d) => Some((i, d.clone())),
        Token::Text(_) => None,
    })?;

    let end = if start.kind.is_start() {
        partners[idx].and_then(|j| match &tokens[j] {
            Token::Directive(d) => Some(d.clone()),
            Token::Text(_) => None,
        })
    } else {
        None
    };

    Some(DirectiveMatch { start, end })
}

fn parse_directive(body: &str) -> Option<DirectiveKind<'_>> {
    let words: Vec<&str> = body.split_whitespace().collect();
    match words.as_slice() {
        ["endfor"] => Some(DirectiveKind::ForEnd),
        ["endif"] => Some(DirectiveKind::IfEnd),
        ["for", var, "in", path] if is_identifier(var) && is_path(path) => {
            Some(DirectiveKind::ForStart { var: *var, path: *path })
        }
        ["if", path] if is_path(path) => Some(DirectiveKind::IfStart { path: *path }),
        [path] if is_path(path) => Some(DirectiveKind::Variable { path: *path }),
        _ => None,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_word_char)
}

fn is_path(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_word_char(c) || c == '.')
}
