//! Notation parser
//!
//! Best-effort extraction: unrecognized lines never abort the parse, they
//! are reported as diagnostics next to the reconstructed diagram.

use std::collections::HashSet;

use anyhow::Result;
use chumsky::Parser as _;
use tracing::{debug, info, span, trace, warn, Level};

use super::grammar::{self, ParsedClass, ParsedIntermediate, ParsedLink, Statement};
use super::Report;
use crate::core::{
    Database, Diagnostic, DiagnosticKind, KindRef, Lexicon, Multiplicity, Parser,
};
use crate::model::{Association, ClassEntity, Diagram, Relationship};

/// Class name generated by scaffolding tools and never shown to users
pub const DEFAULT_RESERVED_CLASS: &str = "Application";

/// Parser and printer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Class blocks with this name are filtered out
    pub reserved_class: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reserved_class: Some(DEFAULT_RESERVED_CLASS.to_string()),
        }
    }
}

impl ParserConfig {
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_class.as_deref() == Some(name)
    }
}

/// Parser for the class notation
#[derive(Debug, Clone, Default)]
pub struct NotationParser {
    lexicon: Lexicon,
    config: ParserConfig,
}

/// Non-class lines, classified in one pass
#[derive(Default)]
struct Candidates {
    intermediates: Vec<(usize, ParsedIntermediate)>,
    links: Vec<(usize, ParsedLink)>,
    bare_pairs: Vec<(usize, ParsedLink)>,
}

impl NotationParser {
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

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse text into a diagram plus diagnostics
    pub fn parse_report(&self, input: &str) -> Report {
        let parse_span = span!(Level::INFO, "parse_notation", input_len = input.len());
        let _enter = parse_span.enter();

        let text = input.replace("\r\n", "\n");
        let lines: Vec<&str> = text.lines().collect();
        let mut diagnostics = Vec::new();

        let (classes, candidate_lines) = self.split_class_blocks(&lines, &mut diagnostics);
        let mut diagram = Diagram::new();
        self.add_classes(&mut diagram, classes, &mut diagnostics);
        debug!(class_count = diagram.classes.len(), "Parsed class blocks");

        let candidates = classify(candidate_lines, &mut diagnostics);
        self.add_relationships(&mut diagram, candidates.links, &mut diagnostics);
        add_associations(
            &mut diagram,
            candidates.intermediates,
            candidates.bare_pairs,
            &mut diagnostics,
        );
        debug!(
            relationship_count = diagram.relationships.len(),
            association_count = diagram.associations.len(),
            "Parsed relationship lines"
        );

        let report = Report {
            diagram,
            diagnostics,
        };
        if report.malformed_lines() > 0 {
            warn!(count = report.malformed_lines(), "Skipped unrecognized lines");
        }
        info!("Parsing completed");
        report
    }

    /// Separate class blocks from the remaining candidate lines
    ///
    /// A header with `{` extends to the first line containing `}`; another
    /// class header before that leaves the block unterminated. When the
    /// gathered chunk is not a valid class block, only the header line is
    /// handed on as a candidate.
    fn split_class_blocks<'a>(
        &self,
        lines: &[&'a str],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Vec<(usize, ParsedClass)>, Vec<(usize, &'a str)>) {
        let mut classes = Vec::new();
        let mut candidates = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();
            if is_structural(line) {
                i += 1;
                continue;
            }
            if !is_class_header(line) {
                candidates.push((i + 1, line));
                i += 1;
                continue;
            }

            let last = if line.contains('{') {
                block_end(lines, i)
            } else {
                Some(i)
            };

            let parsed = last.and_then(|last| {
                let chunk = lines[i..=last].join("\n");
                let class = grammar::class_block().parse(chunk.trim()).into_result().ok();
                class.map(|class| (last, class))
            });

            match parsed {
                Some((last, class)) => {
                    trace!(name = %class.name, line = i + 1, "Class block");
                    classes.push((i + 1, class));
                    i = last + 1;
                }
                None => {
                    if line.contains('{') && last.is_none() {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::MalformedLine,
                                format!("unterminated class block: {}", line),
                            )
                            .at_line(i + 1),
                        );
                    } else {
                        candidates.push((i + 1, line));
                    }
                    i += 1;
                }
            }
        }

        (classes, candidates)
    }

    fn add_classes(
        &self,
        diagram: &mut Diagram,
        classes: Vec<(usize, ParsedClass)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for (line, class) in classes {
            if self.config.is_reserved(&class.name) {
                trace!(name = %class.name, "Skipping reserved class");
                continue;
            }
            let entity = ClassEntity::new(class.name).with_attributes(class.attributes);
            if let Err(err) = diagram.add_node(entity) {
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::DuplicateEntry, err.to_string()).at_line(line),
                );
            }
        }
    }

    fn add_relationships(
        &self,
        diagram: &mut Diagram,
        links: Vec<(usize, ParsedLink)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut seen = HashSet::new();

        for (line, link) in links {
            let Some(entry) = self.lexicon.kinds.symbol(&link.symbol) else {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::MalformedLine,
                        format!("unknown relationship symbol '{}'", link.symbol),
                    )
                    .at_line(line),
                );
                continue;
            };

            let from_multiplicity =
                self.multiplicity(link.from_multiplicity.as_deref(), line, diagnostics);
            let to_multiplicity =
                self.multiplicity(link.to_multiplicity.as_deref(), line, diagnostics);

            let (from, to, from_multiplicity, to_multiplicity) = if entry.reversed {
                (link.to, link.from, to_multiplicity, from_multiplicity)
            } else {
                (link.from, link.to, from_multiplicity, to_multiplicity)
            };

            if from == to {
                trace!(class = %from, line, "Dropping self relationship");
                continue;
            }

            let key = (from.clone(), to.clone(), entry.kind, link.label.clone());
            if !seen.insert(key) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateEntry,
                        format!("duplicate relationship {} {} {}", from, entry.kind, to),
                    )
                    .at_line(line),
                );
                continue;
            }

            for endpoint in [&from, &to] {
                if !diagram.has_class(endpoint) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::DanglingReference,
                            format!("relationship references undeclared class {}", endpoint),
                        )
                        .at_line(line),
                    );
                }
            }

            diagram.relationships.push(Relationship {
                from,
                to,
                kind: KindRef::Known(entry.kind),
                label: link.label,
                from_multiplicity,
                to_multiplicity,
            });
        }
    }

    fn multiplicity(
        &self,
        token: Option<&str>,
        line: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Multiplicity> {
        let token = token?;
        match self.lexicon.multiplicities.resolve(token) {
            Ok(multiplicity) => multiplicity,
            Err(unknown) => {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnknownMultiplicity,
                        format!("unknown multiplicity '{}'", unknown),
                    )
                    .at_line(line),
                );
                None
            }
        }
    }
}

impl Parser<Diagram> for NotationParser {
    /// Replace the database contents with the parsed diagram
    fn parse(&self, input: &str, database: &mut Diagram) -> Result<()> {
        *database = self.parse_report(input).diagram;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "plantuml-class"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn can_parse(&self, input: &str) -> bool {
        use crate::core::Detector;
        super::ClassNotationDetector::new().detect(input)
    }
}

/// Document markers, blank lines and `'` comments
fn is_structural(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('\'')
        || line.starts_with("@startuml")
        || line.starts_with("@enduml")
}

pub(crate) fn is_class_header(line: &str) -> bool {
    line.strip_prefix("class")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}

/// Index of the line closing the block opened at `start`
fn block_end(lines: &[&str], start: usize) -> Option<usize> {
    for (j, line) in lines.iter().enumerate().skip(start) {
        if j > start && is_class_header(line.trim()) {
            return None;
        }
        if line.contains('}') {
            return Some(j);
        }
    }
    None
}

fn classify(lines: Vec<(usize, &str)>, diagnostics: &mut Vec<Diagnostic>) -> Candidates {
    let mut candidates = Candidates::default();
    let statement = grammar::statement();

    for (line, text) in lines {
        match statement.parse(text).into_result() {
            Ok(Statement::Intermediate(parsed)) => {
                candidates.intermediates.push((line, parsed));
            }
            Ok(Statement::Link(link)) if link.is_bare() => {
                candidates.bare_pairs.push((line, link));
            }
            Ok(Statement::Link(link)) => candidates.links.push((line, link)),
            Err(_) => {
                trace!(line, text, "Unrecognized line");
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::MalformedLine,
                        format!("unrecognized line: {}", text),
                    )
                    .at_line(line),
                );
            }
        }
    }

    candidates
}

/// Pair intermediate lines with bare association lines
fn add_associations(
    diagram: &mut Diagram,
    intermediates: Vec<(usize, ParsedIntermediate)>,
    bare_pairs: Vec<(usize, ParsedLink)>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut matched = vec![false; bare_pairs.len()];

    for (line, parsed) in intermediates {
        let association = Association::new(parsed.class_a, parsed.class_b, parsed.intermediate);
        if is_degenerate(&association) {
            trace!(line, "Dropping self association");
            continue;
        }

        let pair = bare_pairs
            .iter()
            .position(|(_, bare)| association.connects(&bare.from, &bare.to));
        let Some(index) = pair else {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MalformedLine,
                    format!(
                        "intermediate class {} has no matching association line",
                        association.intermediate
                    ),
                )
                .at_line(line),
            );
            continue;
        };
        matched[index] = true;

        if diagram
            .associations
            .iter()
            .any(|a| a.intermediate == association.intermediate)
        {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DuplicateEntry,
                    format!("intermediate class {} is already used", association.intermediate),
                )
                .at_line(line),
            );
            continue;
        }
        diagram.associations.push(association);
    }

    for ((line, bare), matched) in bare_pairs.into_iter().zip(matched) {
        if !matched && bare.from != bare.to {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::InformalPair,
                    format!("association {} - {} has no intermediate class", bare.from, bare.to),
                )
                .at_line(line),
            );
        }
    }
}

/// Self association, or an intermediate class that is also an endpoint
pub(crate) fn is_degenerate(association: &Association) -> bool {
    association.class_a == association.class_b
        || association.intermediate == association.class_a
        || association.intermediate == association.class_b
}
