//! Notation printer
//!
//! Output is deterministic: classes, relationships and associations are
//! written in insertion order after the cleaning pass.

use std::fmt::Write as _;

use anyhow::Result;
use tracing::{debug, span, Level};

use super::clean::clean;
use super::parser::ParserConfig;
use super::Report;
use crate::core::{Diagnostic, Lexicon, Multiplicity, Renderer};
use crate::model::{Association, ClassEntity, Diagram, Relationship};

pub const DOCUMENT_START: &str = "@startuml";
pub const DOCUMENT_END: &str = "@enduml";

/// Multiplicities written on the bare line of every association
const ASSOCIATION_MULTIPLICITIES: (Multiplicity, Multiplicity) =
    (Multiplicity::ZeroOrMany, Multiplicity::OneOrMany);

#[derive(Debug, Clone, Default)]
pub struct NotationPrinter {
    lexicon: Lexicon,
    config: ParserConfig,
}

impl NotationPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the cleaning pass this printer applies before emitting
    pub fn clean(&self, diagram: &Diagram) -> Report {
        clean(diagram, &self.lexicon, &self.config)
    }

    pub fn print(&self, diagram: &Diagram) -> String {
        self.print_with_diagnostics(diagram).0
    }

    /// Print and return what the cleaning pass dropped
    pub fn print_with_diagnostics(&self, diagram: &Diagram) -> (String, Vec<Diagnostic>) {
        let print_span = span!(Level::INFO, "print_notation", classes = diagram.classes.len());
        let _enter = print_span.enter();

        let Report {
            diagram: cleaned,
            diagnostics,
        } = self.clean(diagram);
        let text = emit(&cleaned);
        debug!(output_len = text.len(), "Printed notation");
        (text, diagnostics)
    }
}

impl Renderer<Diagram> for NotationPrinter {
    type Output = String;

    fn render(&self, diagram: &Diagram) -> Result<String> {
        Ok(self.print(diagram))
    }

    fn name(&self) -> &'static str {
        "plantuml-class"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn format(&self) -> &'static str {
        "plantuml"
    }
}

/// Write an already cleaned diagram
pub fn emit(diagram: &Diagram) -> String {
    let mut out = String::new();
    out.push_str(DOCUMENT_START);
    out.push('\n');

    for class in &diagram.classes {
        write_class(&mut out, class);
    }
    for relationship in &diagram.relationships {
        write_relationship(&mut out, relationship);
    }
    for association in &diagram.associations {
        write_association(&mut out, association);
    }

    out.push_str(DOCUMENT_END);
    out
}

fn write_class(out: &mut String, class: &ClassEntity) {
    let _ = writeln!(out, "class {} {{", class.name);
    for attribute in &class.attributes {
        let _ = writeln!(out, "  {}", attribute);
    }
    out.push_str("}\n");
}

fn write_relationship(out: &mut String, relationship: &Relationship) {
    out.push_str(&relationship.from);
    if let Some(multiplicity) = relationship.from_multiplicity {
        let _ = write!(out, " \"{}\"", multiplicity);
    }
    let _ = write!(out, " {}", relationship.kind);
    if let Some(multiplicity) = relationship.to_multiplicity {
        let _ = write!(out, " \"{}\"", multiplicity);
    }
    let _ = write!(out, " {}", relationship.to);
    if let Some(label) = &relationship.label {
        let _ = write!(out, " : {}", label);
    }
    out.push('\n');
}

fn write_association(out: &mut String, association: &Association) {
    let (a, b) = ASSOCIATION_MULTIPLICITIES;
    let _ = writeln!(
        out,
        "{} \"{}\" - \"{}\" {}",
        association.class_a, a, b, association.class_b
    );
    let _ = writeln!(
        out,
        "({}, {}) .. {}",
        association.class_a, association.class_b, association.intermediate
    );
}
