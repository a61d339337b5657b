//! Core renderer trait
//!
//! Renderers turn a model value into an output document. The notation
//! printer renders a [`Diagram`](crate::model::Diagram); plan emitters render a
//! [`MappingPlan`](crate::mapping::MappingPlan).

use anyhow::Result;

/// Core trait for renderers and emitters
pub trait Renderer<D: ?Sized>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the input into the output format
    fn render(&self, input: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
