//! Class-diagram model and its edit operations

mod diagram;
mod mutation;
pub mod naming;

pub use diagram::{Association, ClassEntity, Diagram, Relationship};
pub use mutation::{AssociationTarget, Mutation};
pub use naming::{normalize_class_name, validate_class_name, RESERVED_ATTRIBUTE};
