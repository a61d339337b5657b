//! Cleaning pass applied before printing
//!
//! `clean` turns any diagram into one the notation can express exactly.
//! It is idempotent, and parsing the printed text of a cleaned diagram
//! yields that same diagram.

use std::collections::HashSet;

use tracing::{debug, span, trace, warn, Level};

use super::parser::{is_class_header, is_degenerate, ParserConfig};
use super::Report;
use crate::core::{Diagnostic, DiagnosticKind, KindRef, Lexicon};
use crate::model::{Association, ClassEntity, Diagram, Relationship};

/// Names the grammar accepts: ASCII letters, digits and underscores
pub fn is_notation_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn clean(diagram: &Diagram, lexicon: &Lexicon, config: &ParserConfig) -> Report {
    let clean_span = span!(
        Level::DEBUG,
        "clean",
        classes = diagram.classes.len(),
        relationships = diagram.relationships.len(),
        associations = diagram.associations.len()
    );
    let _enter = clean_span.enter();

    let mut diagnostics = Vec::new();
    let classes = clean_classes(&diagram.classes, config, &mut diagnostics);
    let associations = clean_associations(&diagram.associations, &classes, config, &mut diagnostics);

    // Missing intermediate classes go first, in association order
    let mut all_classes: Vec<ClassEntity> = Vec::new();
    for association in &associations {
        let declared = classes.iter().any(|c| c.name == association.intermediate)
            || all_classes.iter().any(|c| c.name == association.intermediate);
        if !declared {
            trace!(name = %association.intermediate, "Materializing intermediate class");
            all_classes.push(ClassEntity::new(association.intermediate.clone()));
        }
    }
    all_classes.extend(classes);

    let relationships = clean_relationships(
        &diagram.relationships,
        &all_classes,
        lexicon,
        &mut diagnostics,
    );

    debug!(
        classes = all_classes.len(),
        relationships = relationships.len(),
        associations = associations.len(),
        dropped = diagnostics.len(),
        "Cleaned diagram"
    );

    Report {
        diagram: Diagram {
            classes: all_classes,
            relationships,
            associations,
        },
        diagnostics,
    }
}

fn clean_classes(
    classes: &[ClassEntity],
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ClassEntity> {
    let mut kept: Vec<ClassEntity> = Vec::new();

    for class in classes {
        if !is_notation_name(&class.name) {
            warn!(name = %class.name, "Dropping class with unprintable name");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedLine,
                format!("class name '{}' cannot be written in the notation", class.name),
            ));
            continue;
        }
        if config.is_reserved(&class.name) {
            continue;
        }
        if kept.iter().any(|c| c.name == class.name) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateEntry,
                format!("duplicate class {}", class.name),
            ));
            continue;
        }

        let mut attributes = Vec::with_capacity(class.attributes.len());
        for attribute in &class.attributes {
            let attribute = attribute.trim();
            if attribute.is_empty() {
                continue;
            }
            if attribute.contains(['}', '\n', '\r']) || is_class_header(attribute) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MalformedLine,
                    format!("attribute '{}' of {} cannot be written", attribute, class.name),
                ));
                continue;
            }
            attributes.push(attribute.to_string());
        }

        kept.push(ClassEntity {
            name: class.name.clone(),
            attributes,
        });
    }

    kept
}

fn clean_associations(
    associations: &[Association],
    classes: &[ClassEntity],
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Association> {
    let names: HashSet<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    let mut kept: Vec<Association> = Vec::new();

    for association in associations {
        if is_degenerate(association) {
            trace!(intermediate = %association.intermediate, "Dropping self association");
            continue;
        }
        let missing = [&association.class_a, &association.class_b]
            .into_iter()
            .find(|endpoint| !names.contains(endpoint.as_str()));
        if let Some(endpoint) = missing {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DanglingReference,
                format!(
                    "association {} references missing class {}",
                    association.intermediate, endpoint
                ),
            ));
            continue;
        }
        if !is_notation_name(&association.intermediate)
            || config.is_reserved(&association.intermediate)
        {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DanglingReference,
                format!("association uses unusable class {}", association.intermediate),
            ));
            continue;
        }
        if kept.iter().any(|a| a.intermediate == association.intermediate) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateEntry,
                format!("intermediate class {} is already used", association.intermediate),
            ));
            continue;
        }
        kept.push(association.clone());
    }

    kept
}

fn clean_relationships(
    relationships: &[Relationship],
    classes: &[ClassEntity],
    lexicon: &Lexicon,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Relationship> {
    let names: HashSet<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    let mut printer_keys = HashSet::new();
    let mut parser_keys = HashSet::new();
    let mut kept = Vec::new();

    for relationship in relationships {
        if relationship.is_self_reference() {
            trace!(class = %relationship.from, "Dropping self relationship");
            continue;
        }

        let printer_key = (
            &relationship.from,
            &relationship.to,
            relationship.kind.as_text(),
            relationship.from_multiplicity,
            relationship.to_multiplicity,
        );
        if !printer_keys.insert(printer_key) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateEntry,
                format!(
                    "duplicate relationship {} {} {}",
                    relationship.from, relationship.kind, relationship.to
                ),
            ));
            continue;
        }

        let (kind, reversed) = match &relationship.kind {
            KindRef::Known(kind) => (kind.canonical(), false),
            KindRef::Unresolved(text) => match lexicon.kinds.resolve(text) {
                Some((kind, reversed)) => (kind.canonical(), reversed),
                None => {
                    warn!(kind = %text, "Dropping relationship with unknown kind");
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnknownRelationshipKind,
                        format!(
                            "unknown relationship kind '{}' between {} and {}",
                            text, relationship.from, relationship.to
                        ),
                    ));
                    continue;
                }
            },
        };

        let mut cleaned = Relationship {
            from: relationship.from.clone(),
            to: relationship.to.clone(),
            kind: KindRef::Known(kind),
            label: relationship.label.as_deref().and_then(normalize_label),
            from_multiplicity: relationship.from_multiplicity,
            to_multiplicity: relationship.to_multiplicity,
        };
        if reversed {
            std::mem::swap(&mut cleaned.from, &mut cleaned.to);
            std::mem::swap(&mut cleaned.from_multiplicity, &mut cleaned.to_multiplicity);
        }

        if let Some(endpoint) = [&cleaned.from, &cleaned.to]
            .into_iter()
            .find(|endpoint| !names.contains(endpoint.as_str()))
        {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DanglingReference,
                format!("relationship references missing class {}", endpoint),
            ));
            continue;
        }

        let parser_key = (
            cleaned.from.clone(),
            cleaned.to.clone(),
            kind,
            cleaned.label.clone(),
        );
        if !parser_keys.insert(parser_key) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateEntry,
                format!("duplicate relationship {} {} {}", cleaned.from, kind, cleaned.to),
            ));
            continue;
        }

        kept.push(cleaned);
    }

    kept
}

/// Labels live on one line; blank labels are absent
fn normalize_label(label: &str) -> Option<String> {
    let single_line = label.replace(['\r', '\n'], " ");
    let trimmed = single_line.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
