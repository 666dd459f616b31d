//! Folds a [`Token`] stream into the structured [`Cfi`] model.
//!
//! Parsing is lenient: malformed fragments leave the corresponding
//! [`Part`] fields unset instead of failing.

use crate::cfi::part::{Assertion, Cfi, CfiRange, IndirectPath, Part, Path, Side, Spatial};
use crate::cfi::token::{self, Token};
use crate::cfi::unwrap;
use std::iter::Peekable;

/// Name of the only interpreted assertion parameter.
const SIDE_PARAM: &str = "s";

/// Parses a CFI, with or without its `epubcfi(...)` envelope.
///
/// # Examples
/// ```
/// use epubcfi::cfi::{self, Cfi};
///
/// let cfi = cfi::parse("epubcfi(/6/4!/4/2,/1:0,/1:10)");
/// let Cfi::Range(range) = cfi else { unreachable!() };
///
/// assert_eq!(2, range.parent.len());
/// assert_eq!(Some(0), range.start[0][0].offset);
/// assert_eq!(Some(10), range.end[0][0].offset);
///
/// // Empty input produces an empty path rather than an error
/// assert_eq!(Cfi::Point(vec![Default::default()].into()), cfi::parse("epubcfi()"));
/// ```
pub fn parse(cfi: &str) -> Cfi {
    parse_tokens(token::tokenize(unwrap(cfi)))
}

/// Parses an already tokenized CFI body.
pub fn parse_tokens(tokens: Vec<Token>) -> Cfi {
    let mut segments = split(tokens, |token| matches!(token, Token::RangeSeparator)).into_iter();

    let first = segments.next().unwrap_or_default();
    match segments.next() {
        None => Cfi::Point(parse_indirect(first)),
        Some(start) => Cfi::Range(CfiRange {
            parent: parse_indirect(first),
            start: parse_indirect(start),
            end: parse_indirect(segments.next().unwrap_or_default()),
        }),
    }
}

/// Splits `tokens` into segments on every token matching `is_separator`,
/// discarding the separators.
///
/// Always yields at least one (possibly empty) segment.
fn split(tokens: Vec<Token>, is_separator: impl Fn(&Token) -> bool) -> Vec<Vec<Token>> {
    let mut segments = vec![Vec::new()];

    for token in tokens {
        if is_separator(&token) {
            segments.push(Vec::new());
        } else if let Some(segment) = segments.last_mut() {
            segment.push(token);
        }
    }
    segments
}

fn parse_indirect(tokens: Vec<Token>) -> IndirectPath {
    split(tokens, |token| matches!(token, Token::Indirection))
        .into_iter()
        .map(parse_path)
        .collect()
}

fn parse_path(tokens: Vec<Token>) -> Path {
    let mut parts: Vec<Part> = Vec::new();
    let mut tokens = tokens.into_iter().peekable();
    let mut after_step = false;

    while let Some(token) = tokens.next() {
        if let Token::Step(index) = token {
            parts.push(Part {
                index,
                ..Part::default()
            });
            after_step = true;
            continue;
        }
        // Anything preceding the first step has nothing to attach to
        let Some(part) = parts.last_mut() else {
            continue;
        };
        apply(part, token, after_step, &mut tokens);
        after_step = false;
    }
    Path(parts)
}

fn apply<I>(part: &mut Part, token: Token, after_step: bool, rest: &mut Peekable<I>)
where
    I: Iterator<Item = Token>,
{
    match token {
        Token::Offset(offset) => part.offset = offset,
        Token::Temporal(seconds) => part.temporal = Some(seconds),
        Token::Spatial(value) => {
            part.spatial = Some(match part.spatial {
                None => Spatial {
                    x: value,
                    y: f64::NAN,
                },
                Some(Spatial { x, y }) if y.is_nan() => Spatial { x, y: value },
                // Only the first pair is kept
                Some(spatial) => spatial,
            })
        }
        Token::Assertion(value) => {
            if part.id().is_some() {
                // An id suppresses the text of any later bracket
                while matches!(rest.peek(), Some(Token::Extension(_))) {
                    rest.next();
                }
                return;
            }
            let extended = matches!(rest.peek(), Some(Token::Extension(_)));

            if after_step && !extended && !value.is_empty() {
                part.assertion = Some(Assertion::Id(value));
            } else if extended || !value.is_empty() {
                part.push_text(value);
            }
        }
        Token::Extension(value) => part.push_text(value),
        Token::Parameter { name, value } => {
            if name == SIDE_PARAM {
                if let Some(side) = Side::from_param(&value) {
                    part.side = Some(side);
                }
            }
        }
        // Consumed by `parse_tokens` and `parse_indirect`
        Token::Step(_) | Token::Indirection | Token::RangeSeparator => {}
    }
}
