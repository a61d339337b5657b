//! umlsync - Keep a class-diagram model and its PlantUML notation in sync
//!
//! A library for parsing and printing a PlantUML class-diagram subset,
//! resolving relationship cardinalities into ORM mapping plans, and
//! coordinating edits between collaborating sessions.
//!
//! # Quick Start
//!
//! ```rust
//! let report = umlsync::parse(
//!     "@startuml\nclass User {\n  email\n}\nclass Order {\n}\nUser \"1\" --> \"0..*\" Order\n@enduml",
//! );
//! assert!(report.is_clean());
//!
//! let text = umlsync::print(&report.diagram);
//! assert!(text.starts_with("@startuml"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use umlsync::prelude::*;
//!
//! let parser = NotationParser::new();
//! let mut diagram = Diagram::new();
//! parser
//!     .parse("class User {\n}\nclass Order {\n}\nUser \"1\" --> \"0..*\" Order", &mut diagram)
//!     .unwrap();
//! assert_eq!(diagram.node_count(), 2);
//!
//! // Order refers to exactly one User
//! let resolution = CardinalityResolver::new().resolve(&diagram);
//! let order = resolution.plan.class("Order").unwrap();
//! assert_eq!(order.fields[0].field_name, "user");
//! assert_eq!(order.fields[0].join_column_name.as_deref(), Some("user_id"));
//! ```

pub mod core;
pub mod mapping;
pub mod model;
pub mod notation;
pub mod sync;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Database, Detector, Diagnostic, DiagnosticKind, DiagramError, Lexicon, Multiplicity,
        Parser, RelationshipKind, Renderer,
    };
    pub use crate::mapping::{
        CardinalityResolver, FieldSpec, JsonPlanEmitter, MappingPlan, OutlinePlanEmitter,
        OwnershipHints, Resolution, ResolverConfig,
    };
    pub use crate::model::{Association, ClassEntity, Diagram, Mutation, Relationship};
    pub use crate::notation::{
        ClassNotationDetector, NotationParser, NotationPrinter, ParserConfig, Report,
    };
    pub use crate::sync::{Broadcaster, Command, RenderSink, SyncCoordinator};
}

/// Parse class notation with the default lexicon
///
/// Never fails: unrecognized lines are reported as diagnostics.
///
/// # Example
/// ```rust
/// let report = umlsync::parse("class A {\n}\nnot a line");
/// assert_eq!(report.diagram.classes.len(), 1);
/// assert_eq!(report.malformed_lines(), 1);
/// ```
pub fn parse(input: &str) -> notation::Report {
    notation::NotationParser::new().parse_report(input)
}

/// Print a diagram as canonical class notation
///
/// # Example
/// ```rust
/// use umlsync::model::{ClassEntity, Diagram};
///
/// let mut diagram = Diagram::new();
/// diagram.add_class(ClassEntity::new("User").with_attribute("email")).unwrap();
/// assert_eq!(
///     umlsync::print(&diagram),
///     "@startuml\nclass User {\n  email\n}\n@enduml"
/// );
/// ```
pub fn print(diagram: &model::Diagram) -> String {
    notation::NotationPrinter::new().print(diagram)
}

/// Resolve a diagram into a mapping plan without ownership hints
pub fn resolve(diagram: &model::Diagram) -> mapping::Resolution {
    mapping::CardinalityResolver::new().resolve(diagram)
}
