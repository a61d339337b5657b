//! Injected lookup tables for relationship kinds and multiplicities
//!
//! The parser, printer and command layer never consult global tables.
//! They receive a [`Lexicon`] value, so alternative vocabularies can be
//! plugged in and each component stays independently testable.

use std::collections::HashMap;

use super::types::{Multiplicity, RelationshipKind};

/// One symbol accepted by the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub symbol: String,
    pub kind: RelationshipKind,
    /// The symbol points the other way round: `A --o B` is `B o-- A`
    pub reversed: bool,
}

/// Symbol and synonym table for relationship kinds
#[derive(Debug, Clone)]
pub struct KindTable {
    symbols: Vec<SymbolEntry>,
    synonyms: HashMap<String, RelationshipKind>,
}

impl KindTable {
    /// An empty table; symbols and synonyms must be registered
    pub fn empty() -> Self {
        Self {
            symbols: Vec::new(),
            synonyms: HashMap::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: &str, kind: RelationshipKind, reversed: bool) -> Self {
        self.symbols.push(SymbolEntry {
            symbol: symbol.to_string(),
            kind,
            reversed,
        });
        self
    }

    pub fn with_synonym(mut self, text: &str, kind: RelationshipKind) -> Self {
        self.synonyms.insert(fold_term(text), kind);
        self
    }

    /// Look up a notation symbol
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolEntry> {
        self.symbols.iter().find(|entry| entry.symbol == symbol)
    }

    /// Resolve free text: a symbol first, then a synonym
    ///
    /// Returns the kind and whether the endpoints must be swapped.
    pub fn resolve(&self, text: &str) -> Option<(RelationshipKind, bool)> {
        let trimmed = text.trim();
        if let Some(entry) = self.symbol(trimmed) {
            return Some((entry.kind, entry.reversed));
        }
        self.synonyms.get(&fold_term(trimmed)).map(|kind| (*kind, false))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.symbols.iter()
    }
}

impl Default for KindTable {
    fn default() -> Self {
        use RelationshipKind::*;

        let mut table = Self::empty();
        for kind in RelationshipKind::ALL {
            if kind.canonical() == kind {
                table = table.with_symbol(kind.symbol(), kind, false);
            }
        }

        table
            .with_symbol("--*", Composition, true)
            .with_symbol("--o", Aggregation, true)
            .with_symbol("<|..", Realization, true)
            .with_symbol("--|>", Generalization, true)
            .with_symbol("^--", Specialization, false)
            .with_symbol("#--", Association, false)
            .with_symbol("x--", Association, false)
            .with_symbol("}--", Association, false)
            .with_synonym("association", Association)
            .with_synonym("asociacion", Association)
            .with_synonym("link", Association)
            .with_synonym("directed association", DirectedAssociation)
            .with_synonym("asociacion directa", DirectedAssociation)
            .with_synonym("navigable", DirectedAssociation)
            .with_synonym("aggregation", Aggregation)
            .with_synonym("agregacion", Aggregation)
            .with_synonym("composition", Composition)
            .with_synonym("composicion", Composition)
            .with_synonym("generalization", Generalization)
            .with_synonym("inheritance", Generalization)
            .with_synonym("extends", Generalization)
            .with_synonym("herencia", Generalization)
            .with_synonym("specialization", Specialization)
            .with_synonym("especializacion", Specialization)
            .with_synonym("dependency", Dependency)
            .with_synonym("dependencia", Dependency)
            .with_synonym("realization", Realization)
            .with_synonym("implements", Realization)
            .with_synonym("realizacion", Realization)
            .with_synonym("nesting", Nesting)
            .with_synonym("nest", Nesting)
            .with_synonym("anidamiento", Nesting)
    }
}

/// Canonical tokens and synonyms for endpoint multiplicities
#[derive(Debug, Clone)]
pub struct MultiplicityTable {
    tokens: HashMap<String, Multiplicity>,
}

impl MultiplicityTable {
    pub fn empty() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    pub fn with_token(mut self, token: &str, multiplicity: Multiplicity) -> Self {
        self.tokens.insert(fold_term(token), multiplicity);
        self
    }

    /// Resolve a token; surrounding whitespace and quotes are ignored
    ///
    /// `Ok(None)` means the token was empty, `Err` carries the unknown text.
    pub fn resolve<'a>(&self, token: &'a str) -> Result<Option<Multiplicity>, &'a str> {
        let stripped = token.trim().trim_matches('"').trim();
        if stripped.is_empty() {
            return Ok(None);
        }
        self.tokens
            .get(&fold_term(stripped))
            .copied()
            .map(Some)
            .ok_or(stripped)
    }
}

impl Default for MultiplicityTable {
    fn default() -> Self {
        use Multiplicity::*;

        let mut table = Self::empty();
        for multiplicity in Multiplicity::ALL {
            table = table.with_token(multiplicity.token(), multiplicity);
        }

        table
            .with_token("1..1", Exactly1)
            .with_token("0..n", ZeroOrMany)
            .with_token("1..n", OneOrMany)
            .with_token("n", Many)
            .with_token("*..*", Many)
            .with_token("m..n", Many)
            .with_token("one", Exactly1)
            .with_token("uno", Exactly1)
            .with_token("optional", ZeroOrOne)
            .with_token("opcional", ZeroOrOne)
            .with_token("zero or one", ZeroOrOne)
            .with_token("cero a uno", ZeroOrOne)
            .with_token("zero or many", ZeroOrMany)
            .with_token("cero a muchos", ZeroOrMany)
            .with_token("one or many", OneOrMany)
            .with_token("one or more", OneOrMany)
            .with_token("uno a muchos", OneOrMany)
            .with_token("uno a uno", Exactly1)
            .with_token("1:1", Exactly1)
            .with_token("0:1", ZeroOrOne)
            .with_token("0:*", ZeroOrMany)
            .with_token("1:*", OneOrMany)
            .with_token("many", Many)
            .with_token("muchos", Many)
            .with_token("muchos a uno", Many)
            .with_token("muchos a muchos", Many)
    }
}

/// Both lookup tables, passed to every component that reads or writes text
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    pub kinds: KindTable,
    pub multiplicities: MultiplicityTable,
}

impl Lexicon {
    pub fn new(kinds: KindTable, multiplicities: MultiplicityTable) -> Self {
        Self {
            kinds,
            multiplicities,
        }
    }
}

/// Replace common Latin accented letters with their base letter
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Lookup key: accents folded, lowercase, words joined by single spaces
fn fold_term(text: &str) -> String {
    fold_accents(text)
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
