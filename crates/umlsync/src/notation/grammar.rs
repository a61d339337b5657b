//! Chumsky grammar for the class notation
//!
//! The grammar only recognizes shapes. Symbols and multiplicity tokens are
//! returned as raw text; the parser resolves them against the injected
//! [`Lexicon`](crate::core::Lexicon).

use chumsky::prelude::*;
use chumsky::text::whitespace;

use crate::core::chumsky_utils::{inline_whitespace, name, optional_whitespace, quoted};

/// Symbol of a bare association awaiting its intermediate class
pub const BARE_ASSOCIATION: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClass {
    pub name: String,
    pub attributes: Vec<String>,
}

/// A relationship or bare association line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLink {
    pub from: String,
    pub from_multiplicity: Option<String>,
    pub symbol: String,
    pub to_multiplicity: Option<String>,
    pub to: String,
    pub label: Option<String>,
}

impl ParsedLink {
    pub fn is_bare(&self) -> bool {
        self.symbol == BARE_ASSOCIATION
    }
}

/// `(A, B) .. C`
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntermediate {
    pub class_a: String,
    pub class_b: String,
    pub intermediate: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Link(ParsedLink),
    Intermediate(ParsedIntermediate),
}

/// `class Name { ... }` or `class Name`, possibly spanning lines
pub fn class_block<'src>() -> impl Parser<'src, &'src str, ParsedClass> + Clone {
    let body = just('{')
        .ignore_then(none_of('}').repeated().to_slice())
        .then_ignore(just('}'))
        .map(|s: &str| {
            s.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

    text::keyword("class")
        .then_ignore(whitespace().at_least(1))
        .ignore_then(name())
        .then(optional_whitespace().ignore_then(body).or_not())
        .then_ignore(optional_whitespace())
        .then_ignore(end())
        .map(|(name, attributes)| ParsedClass {
            name,
            attributes: attributes.unwrap_or_default(),
        })
}

/// A single non-class line: intermediate, relationship or bare association
pub fn statement<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
    intermediate()
        .map(Statement::Intermediate)
        .or(link(symbol(true)).map(Statement::Link))
        .or(link(symbol(false)).map(Statement::Link))
}

fn intermediate<'src>() -> impl Parser<'src, &'src str, ParsedIntermediate> + Clone {
    let ws = inline_whitespace();

    just('(')
        .ignore_then(name().padded_by(ws.clone()))
        .then_ignore(just(','))
        .then(name().padded_by(ws.clone()))
        .then_ignore(just(')'))
        .then_ignore(ws.clone())
        .then_ignore(just(".."))
        .then_ignore(ws.clone())
        .then(name())
        .then_ignore(ws)
        .then_ignore(end())
        .map(|((class_a, class_b), intermediate)| ParsedIntermediate {
            class_a,
            class_b,
            intermediate,
        })
}

/// Arrow-like symbol text
///
/// An optional `o`/`x` head, a run of line characters and, when
/// `with_tail` is set, a trailing `o` followed by whitespace or a quote.
fn symbol<'src>(with_tail: bool) -> impl Parser<'src, &'src str, String> + Clone {
    let head = one_of("ox").or_not();
    let run = one_of("<|.*-#}^+>").repeated().at_least(1);
    let tail = just('o')
        .then_ignore(one_of(" \t\"").rewind())
        .filter(move |_| with_tail)
        .or_not();

    head.then(run)
        .then(tail)
        .to_slice()
        .map(|s: &str| s.to_string())
}

fn link<'src>(
    symbol: impl Parser<'src, &'src str, String> + Clone,
) -> impl Parser<'src, &'src str, ParsedLink> + Clone {
    let ws = inline_whitespace();

    let label = just(':')
        .ignore_then(any().repeated().to_slice())
        .map(|s: &str| s.trim().to_string())
        .or_not()
        .map(|label| label.filter(|s| !s.is_empty()));

    name()
        .then_ignore(ws.clone())
        .then(quoted().then_ignore(ws.clone()).or_not())
        .then(symbol)
        .then_ignore(ws.clone())
        .then(quoted().then_ignore(ws.clone()).or_not())
        .then(name())
        .then_ignore(ws)
        .then(label)
        .then_ignore(end())
        .map(
            |(((((from, from_multiplicity), symbol), to_multiplicity), to), label)| ParsedLink {
                from,
                from_multiplicity,
                symbol,
                to_multiplicity,
                to,
                label,
            },
        )
}
