//! Persistence mapping: the cardinality resolver and its plan emitters

mod emitter;
pub mod hints;
pub mod plan;
pub mod resolver;

pub use emitter::{JsonPlanEmitter, OutlinePlanEmitter};
pub use hints::{OwnershipHints, PairHint};
pub use plan::{Cardinality, ClassPlan, ClassRole, FieldSpec, MaintenanceOp, MappingPlan, Resolution};
pub use resolver::{CardinalityResolver, ResolverConfig};
