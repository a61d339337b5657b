//! Core type definitions for class diagrams
//!
//! Relationship kinds and endpoint multiplicities are closed enumerations.
//! Each has exactly one canonical token in the textual notation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of relationship between two classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Plain link: `--`
    Association,
    /// Navigable link: `-->`
    DirectedAssociation,
    /// Shared ownership: `o--`
    Aggregation,
    /// Exclusive ownership: `*--`
    Composition,
    /// Inheritance: `<|--`, with `--|>` read as the reversed form
    Generalization,
    /// Inheritance entered as `^--`; printed like Generalization
    Specialization,
    /// Usage: `..>`
    Dependency,
    /// Interface implementation: `..|>`
    Realization,
    /// Inner class: `--+`
    Nesting,
}

impl RelationshipKind {
    /// Every kind, in canonical table order
    pub const ALL: [RelationshipKind; 9] = [
        RelationshipKind::Association,
        RelationshipKind::DirectedAssociation,
        RelationshipKind::Aggregation,
        RelationshipKind::Composition,
        RelationshipKind::Generalization,
        RelationshipKind::Specialization,
        RelationshipKind::Dependency,
        RelationshipKind::Realization,
        RelationshipKind::Nesting,
    ];

    /// Canonical symbol emitted by the printer
    pub fn symbol(self) -> &'static str {
        match self {
            RelationshipKind::Association => "--",
            RelationshipKind::DirectedAssociation => "-->",
            RelationshipKind::Aggregation => "o--",
            RelationshipKind::Composition => "*--",
            RelationshipKind::Generalization => "<|--",
            RelationshipKind::Specialization => "<|--",
            RelationshipKind::Dependency => "..>",
            RelationshipKind::Realization => "..|>",
            RelationshipKind::Nesting => "--+",
        }
    }

    /// The kind a printed line parses back to
    ///
    /// Both inheritance kinds share `<|--`, which reads as Generalization.
    pub fn canonical(self) -> Self {
        match self {
            RelationshipKind::Specialization => RelationshipKind::Generalization,
            kind => kind,
        }
    }

    /// Inheritance kinds carry no multiplicities and never map to fields
    pub fn is_inheritance(self) -> bool {
        matches!(
            self,
            RelationshipKind::Generalization | RelationshipKind::Specialization
        )
    }

    /// Kinds that the cardinality resolver turns into persistence fields
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            RelationshipKind::Association
                | RelationshipKind::DirectedAssociation
                | RelationshipKind::Aggregation
                | RelationshipKind::Composition
        )
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Declared count constraint on a relationship endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    #[serde(rename = "1")]
    Exactly1,
    #[serde(rename = "0..1")]
    ZeroOrOne,
    #[serde(rename = "0..*")]
    ZeroOrMany,
    #[serde(rename = "1..*")]
    OneOrMany,
    #[serde(rename = "*")]
    Many,
}

impl Multiplicity {
    pub const ALL: [Multiplicity; 5] = [
        Multiplicity::Exactly1,
        Multiplicity::ZeroOrOne,
        Multiplicity::ZeroOrMany,
        Multiplicity::OneOrMany,
        Multiplicity::Many,
    ];

    /// Canonical token, without quotes
    pub fn token(self) -> &'static str {
        match self {
            Multiplicity::Exactly1 => "1",
            Multiplicity::ZeroOrOne => "0..1",
            Multiplicity::ZeroOrMany => "0..*",
            Multiplicity::OneOrMany => "1..*",
            Multiplicity::Many => "*",
        }
    }

    /// `*`, `0..*` and `1..*`
    pub fn is_many(self) -> bool {
        matches!(
            self,
            Multiplicity::Many | Multiplicity::ZeroOrMany | Multiplicity::OneOrMany
        )
    }

    pub fn is_exactly_one(self) -> bool {
        self == Multiplicity::Exactly1
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Relationship kind as held by the model
///
/// Editors and import adapters may hand over free text ("composicion",
/// "aggregation"). It is kept verbatim until the printer's cleaning pass
/// resolves it against the kind table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KindRef {
    Known(RelationshipKind),
    Unresolved(String),
}

impl KindRef {
    pub fn known(&self) -> Option<RelationshipKind> {
        match self {
            KindRef::Known(kind) => Some(*kind),
            KindRef::Unresolved(_) => None,
        }
    }

    /// Text shown to users: the canonical symbol or the raw synonym
    pub fn as_text(&self) -> &str {
        match self {
            KindRef::Known(kind) => kind.symbol(),
            KindRef::Unresolved(text) => text,
        }
    }
}

impl From<RelationshipKind> for KindRef {
    fn from(kind: RelationshipKind) -> Self {
        KindRef::Known(kind)
    }
}

impl From<String> for KindRef {
    fn from(text: String) -> Self {
        let trimmed = text.trim();
        RelationshipKind::ALL
            .into_iter()
            .find(|kind| kind.symbol() == trimmed)
            .map(KindRef::Known)
            .unwrap_or(KindRef::Unresolved(text))
    }
}

impl From<KindRef> for String {
    fn from(kind: KindRef) -> Self {
        kind.as_text().to_string()
    }
}

impl fmt::Display for KindRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_distinct_up_to_inheritance() {
        let mut symbols: Vec<_> = RelationshipKind::ALL.iter().map(|k| k.symbol()).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), RelationshipKind::ALL.len() - 1);
        assert_eq!(RelationshipKind::Generalization.symbol(), "<|--");
        assert_eq!(RelationshipKind::Specialization.symbol(), "<|--");
    }

    #[test]
    fn test_inheritance_text_reads_as_generalization() {
        assert_eq!(
            KindRef::from("<|--".to_string()),
            KindRef::Known(RelationshipKind::Generalization)
        );
        assert_eq!(
            RelationshipKind::Specialization.canonical(),
            RelationshipKind::Generalization
        );
        assert_eq!(RelationshipKind::Nesting.canonical(), RelationshipKind::Nesting);
    }

    #[test]
    fn test_structural_kinds() {
        assert!(RelationshipKind::Composition.is_structural());
        assert!(RelationshipKind::DirectedAssociation.is_structural());
        assert!(!RelationshipKind::Generalization.is_structural());
        assert!(!RelationshipKind::Dependency.is_structural());
        assert!(RelationshipKind::Specialization.is_inheritance());
    }

    #[test]
    fn test_multiplicity_tokens() {
        assert_eq!(Multiplicity::Exactly1.to_string(), "1");
        assert_eq!(Multiplicity::ZeroOrMany.to_string(), "0..*");
        assert!(Multiplicity::OneOrMany.is_many());
        assert!(Multiplicity::Many.is_many());
        assert!(!Multiplicity::ZeroOrOne.is_many());
        assert!(!Multiplicity::ZeroOrOne.is_exactly_one());
    }

    #[test]
    fn test_multiplicity_serde_uses_tokens() {
        let json = serde_json::to_string(&Multiplicity::ZeroOrMany).unwrap();
        assert_eq!(json, "\"0..*\"");
        let parsed: Multiplicity = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(parsed, Multiplicity::Exactly1);
    }

    #[test]
    fn test_kind_ref_from_text() {
        assert_eq!(
            KindRef::from("*--".to_string()),
            KindRef::Known(RelationshipKind::Composition)
        );
        assert_eq!(
            KindRef::from("composicion".to_string()),
            KindRef::Unresolved("composicion".to_string())
        );
        assert_eq!(KindRef::from(RelationshipKind::Nesting).as_text(), "--+");
    }
}
