//! Core error types for diagram processing
//!
//! `DiagramError` is returned when a mutation or command is rejected.
//! Malformed notation never produces an error; the codec and the resolver
//! report non-fatal findings as [`Diagnostic`] values instead.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors raised when the diagram model refuses a change
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Class already exists: {name}")]
    DuplicateClass { name: String },

    #[error("Unknown class: {name}")]
    UnknownClass { name: String },

    #[error("Invalid class name: '{name}' must start with an uppercase letter and contain only letters")]
    InvalidClassName { name: String },

    #[error("Reserved attribute name '{attribute}' in class {class}")]
    ReservedAttribute { class: String, attribute: String },

    #[error("Attribute '{attribute}' already exists in class {class}")]
    DuplicateAttribute { class: String, attribute: String },

    #[error("Attribute '{attribute}' does not exist in class {class}")]
    UnknownAttribute { class: String, attribute: String },

    #[error("Relationship already exists: {from} {symbol} {to}")]
    DuplicateRelationship {
        from: String,
        to: String,
        symbol: String,
    },

    #[error("No relationship between {from} and {to}")]
    UnknownRelationship { from: String, to: String },

    #[error("Association already exists: ({class_a}, {class_b}) .. {intermediate}")]
    DuplicateAssociation {
        class_a: String,
        class_b: String,
        intermediate: String,
    },

    #[error("Association not found: {target}")]
    UnknownAssociation { target: String },

    #[error("Class {name} cannot reference itself")]
    SelfReference { name: String },

    #[error("Invalid command: {message}")]
    InvalidCommand { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new invalid command error
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand {
            message: message.into(),
        }
    }

    /// Create a new unknown class error
    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass { name: name.into() }
    }
}

/// Category of a non-fatal finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A text span matched none of the recognized line shapes
    MalformedLine,
    /// A relationship or association names a class that does not exist
    DanglingReference,
    /// A free-text relationship kind is not in the kind table
    UnknownRelationshipKind,
    /// A quoted multiplicity token is not in the multiplicity table
    UnknownMultiplicity,
    /// One-to-one relationship without a foreign-key holder hint
    AmbiguousOwnership,
    /// Multiplicity combination outside the decision table
    UnhandledCardinality,
    /// An entry was suppressed because an equal one came first
    DuplicateEntry,
    /// Bare association line with no intermediate class line
    InformalPair,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedLine => "malformed-line",
            DiagnosticKind::DanglingReference => "dangling-reference",
            DiagnosticKind::UnknownRelationshipKind => "unknown-relationship-kind",
            DiagnosticKind::UnknownMultiplicity => "unknown-multiplicity",
            DiagnosticKind::AmbiguousOwnership => "ambiguous-ownership",
            DiagnosticKind::UnhandledCardinality => "unhandled-cardinality",
            DiagnosticKind::DuplicateEntry => "duplicate-entry",
            DiagnosticKind::InformalPair => "informal-pair",
        };
        write!(f, "{}", name)
    }
}

/// A recoverable finding surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// 1-based source line, when the finding comes from notation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {}: {}", self.kind, line, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Count diagnostics of one kind
pub fn count_kind(diagnostics: &[Diagnostic], kind: DiagnosticKind) -> usize {
    diagnostics.iter().filter(|d| d.kind == kind).count()
}
