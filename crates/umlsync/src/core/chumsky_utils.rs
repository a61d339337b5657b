//! Shared chumsky parser utilities for the class notation

use chumsky::prelude::*;

/// Parse optional whitespace including newlines.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\n\r").repeated().ignored()
}

/// Parse inline whitespace only (spaces and tabs, no newlines).
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just(' ').or(just('\t')).repeated().ignored()
}

/// Parse a notation name: ASCII letters, digits and underscores
pub fn name<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
}

/// Parse a double-quoted token, returning the raw text between the quotes
pub fn quoted<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    just('"')
        .ignore_then(none_of("\"\n\r").repeated().to_slice())
        .then_ignore(just('"'))
        .map(|s: &str| s.to_string())
}
