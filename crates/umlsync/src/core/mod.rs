//! Core abstractions for diagram processing
//!
//! Traits shared by the notation codec and the mapping emitters, plus the
//! closed enumerations, lookup tables, errors and logging setup.

pub mod chumsky_utils;
mod database;
mod detector;
mod error;
pub mod lexicon;
pub mod logging;
mod parser;
mod renderer;
mod types;

pub use database::*;
pub use detector::*;
pub use error::*;
pub use lexicon::{KindTable, Lexicon, MultiplicityTable, SymbolEntry};
pub use logging::*;
pub use parser::*;
pub use renderer::*;
pub use types::*;
