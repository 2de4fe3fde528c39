//! Generic template renderer: variables, conditionals and loops.
//!
//! A template is scanned once into tokens. Rendering then works on positions
//! in that token stream: conditionals are spliced first, loops are expanded
//! after, and every loop body goes through the same two steps per item with
//! the loop variable bound. Text produced by a substitution is written
//! straight to the output and is never scanned again, so data can't inject
//! directives.
//!
//! Pending bodies live on an explicit stack, so nesting depth is limited by
//! memory rather than by the thread's stack.

use tracing::{debug, trace};

use super::resolver::Scope;
use super::scanner::{DirectiveKind, Token, pair_blocks, tokenize};
use super::value::Context;

/// Render `template` against `context`.
///
/// Never fails: absent variables render as `""`, unterminated blocks and
/// stray end directives are emitted verbatim, and a loop over anything
/// other than a list produces no output.
pub fn render(template: &str, context: &Context) -> String {
    let tokens = tokenize(template);
    evaluate(template, &tokens, context)
}

/// Reusable renderer holding a scanned template.
///
/// Useful when the same template is rendered against many contexts.
#[derive(Debug, Clone)]
pub struct Template<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> Template<'a> {
    pub fn parse(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn render(&self, context: &Context) -> String {
        evaluate(self.source, &self.tokens, context)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Conditionals still to be spliced.
    Conditionals,
    /// Only loops, variables and text remain.
    Loops,
}

/// A run of token positions waiting to be rendered.
struct Body<'a> {
    seq: Vec<usize>,
    scope: Scope<'a>,
    stage: Stage,
}

fn evaluate<'a>(src: &'a str, tokens: &[Token<'a>], context: &'a Context) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pending = vec![Body {
        seq: (0..tokens.len()).collect(),
        scope: Scope::new(context),
        stage: Stage::Conditionals,
    }];

    while let Some(Body { seq, scope, stage }) = pending.pop() {
        let seq = match stage {
            Stage::Conditionals => splice_conditionals(tokens, seq, &scope),
            Stage::Loops => seq,
        };
        let partners = pair_blocks(seq.iter().map(|&i| &tokens[i]));

        let mut pos = 0;
        while pos < seq.len() {
            let directive = match &tokens[seq[pos]] {
                Token::Text(text) => {
                    out.push_str(text);
                    pos += 1;
                    continue;
                }
                Token::Directive(d) => d,
            };

            match (directive.kind, partners[pos]) {
                (DirectiveKind::Variable { path }, _) => {
                    out.push_str(&scope.resolve_display(path));
                }
                (DirectiveKind::ForStart { var, path }, Some(end)) => {
                    // Stack order: iterations first, then whatever follows the loop.
                    pending.push(Body {
                        seq: seq[end + 1..].to_vec(),
                        scope: scope.clone(),
                        stage: Stage::Loops,
                    });
                    match scope.resolve(path).and_then(|v| v.as_list()) {
                        Some(items) => {
                            trace!(path, count = items.len(), "expanding loop");
                            let body = &seq[pos + 1..end];
                            for item in items.iter().rev() {
                                pending.push(Body {
                                    seq: body.to_vec(),
                                    scope: scope.bind(var, item),
                                    stage: Stage::Conditionals,
                                });
                            }
                        }
                        None => trace!(path, "loop source is not a list, skipping"),
                    }
                    break;
                }
                (kind, _) => {
                    let raw = &src[directive.span.clone()];
                    debug!(directive = raw, ?kind, "leaving unmatched block directive verbatim");
                    out.push_str(raw);
                }
            }
            pos += 1;
        }
    }

    out
}

/// Splice every conditional in `seq` that is not confined to a loop body.
///
/// A true conditional keeps its body and loses its markers; a false one is
/// dropped together with everything between its markers. A conditional
/// lying wholly inside a loop waits until the loop binds its variable, while
/// one that crosses a loop boundary is spliced here, after which the loop
/// pairs with whatever remains. Dropping a span can change how loops pair,
/// so passes repeat until one changes nothing.
fn splice_conditionals(
    tokens: &[Token<'_>],
    mut seq: Vec<usize>,
    scope: &Scope<'_>,
) -> Vec<usize> {
    loop {
        let partners = pair_blocks(seq.iter().map(|&i| &tokens[i]));
        let mut kept = Vec::with_capacity(seq.len());
        let mut closing = vec![false; seq.len()];
        let mut loop_end: Option<usize> = None;
        let mut changed = false;

        let mut pos = 0;
        while pos < seq.len() {
            if loop_end.is_some_and(|end| pos >= end) {
                loop_end = None;
            }
            let kind = match &tokens[seq[pos]] {
                Token::Directive(d) => Some(d.kind),
                Token::Text(_) => None,
            };

            match (kind, partners[pos]) {
                (Some(DirectiveKind::ForStart { .. }), Some(end)) => {
                    loop_end.get_or_insert(end);
                    kept.push(seq[pos]);
                }
                (Some(DirectiveKind::IfStart { path }), Some(end))
                    if loop_end.is_none_or(|outer| end > outer) =>
                {
                    changed = true;
                    if scope.is_truthy(path) {
                        closing[end] = true;
                    } else {
                        pos = end;
                    }
                }
                _ if closing[pos] => {}
                _ => kept.push(seq[pos]),
            }
            pos += 1;
        }

        if !changed {
            return kept;
        }
        seq = kept;
    }
}
