//! Plan emitters
//!
//! Template layers in other languages consume the JSON form. The outline
//! is for people reading a plan in a terminal.

use std::fmt::Write as _;

use anyhow::Result;

use super::plan::{Cardinality, ClassPlan, FieldSpec, MappingPlan};
use crate::core::Renderer;

/// Pretty-printed JSON of the whole plan
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPlanEmitter;

impl JsonPlanEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer<MappingPlan> for JsonPlanEmitter {
    type Output = String;

    fn render(&self, plan: &MappingPlan) -> Result<String> {
        Ok(serde_json::to_string_pretty(plan)?)
    }

    fn name(&self) -> &'static str {
        "json-plan"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

/// Indented plain-text summary, one line per attribute, field and operation
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlinePlanEmitter;

impl OutlinePlanEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer<MappingPlan> for OutlinePlanEmitter {
    type Output = String;

    fn render(&self, plan: &MappingPlan) -> Result<String> {
        let mut out = String::new();
        for class in &plan.classes {
            write_class(&mut out, class)?;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "outline-plan"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn format(&self) -> &'static str {
        "text"
    }
}

fn write_class(out: &mut String, class: &ClassPlan) -> std::fmt::Result {
    writeln!(out, "{} {}", class.role.label(), class.name)?;
    for attribute in &class.attributes {
        writeln!(out, "  attribute {}", attribute)?;
    }
    for field in &class.fields {
        write_field(out, field)?;
    }
    for op in &class.operations {
        writeln!(
            out,
            "  operation {}({}) via {}",
            op.name, op.target_class, op.join_table_name
        )?;
    }
    Ok(())
}

fn write_field(out: &mut String, field: &FieldSpec) -> std::fmt::Result {
    let target = match field.cardinality {
        Cardinality::Scalar => field.related_class.clone(),
        Cardinality::Collection => format!("{}[*]", field.related_class),
    };
    write!(out, "  field {}: {}", field.field_name, target)?;
    if field.owning_side {
        out.push_str(" owning");
    }
    if let Some(table) = &field.join_table_name {
        write!(out, " join_table={}", table)?;
    }
    if let Some(column) = &field.join_column_name {
        write!(out, " join_column={}", column)?;
    }
    if let Some(column) = &field.inverse_join_column_name {
        write!(out, " inverse_join_column={}", column)?;
    }
    if let Some(mapped_by) = &field.mapped_by {
        write!(out, " mapped_by={}", mapped_by)?;
    }
    out.push('\n');
    Ok(())
}
