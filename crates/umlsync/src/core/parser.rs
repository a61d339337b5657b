//! Core parser trait for diagram notation

use anyhow::Result;

use super::Database;

/// Core trait for diagram parsers
///
/// This trait represents the parsing layer that converts diagram notation
/// into structured data.
///
/// # Example
/// ```
/// use umlsync::core::{Database, Parser};
/// use umlsync::model::Diagram;
/// use umlsync::notation::NotationParser;
///
/// let parser = NotationParser::new();
/// let mut diagram = Diagram::new();
/// parser.parse("class A {\n}\nclass B {\n}\nA --> B", &mut diagram).unwrap();
/// assert_eq!(diagram.edge_count(), 1);
/// ```
pub trait Parser<D: Database>: Send + Sync {
    /// Parse notation into the provided database
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input can be parsed by this parser
    fn can_parse(&self, input: &str) -> bool;
}
