//! Textual class notation codec
//!
//! A line-oriented PlantUML class-diagram subset:
//!
//! ```text
//! @startuml
//! class User {
//!   email
//! }
//! User "1" --> "0..*" Order : places
//! User "0..*" - "1..*" Role
//! (User, Role) .. UserRole
//! @enduml
//! ```

pub mod clean;
mod detector;
pub mod grammar;
mod parser;
mod printer;

pub use clean::clean;
pub use detector::ClassNotationDetector;
pub use parser::{NotationParser, ParserConfig, DEFAULT_RESERVED_CLASS};
pub use printer::{emit, NotationPrinter, DOCUMENT_END, DOCUMENT_START};

use serde::Serialize;

use crate::core::{count_kind, Diagnostic, DiagnosticKind};
use crate::model::Diagram;

/// A diagram together with the non-fatal findings produced while building it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub diagram: Diagram,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Lines that matched no recognized shape
    pub fn malformed_lines(&self) -> usize {
        count_kind(&self.diagnostics, DiagnosticKind::MalformedLine)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
