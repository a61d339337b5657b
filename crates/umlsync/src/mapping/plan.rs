//! Mapping plan types consumed by template emitters

use serde::Serialize;

use crate::core::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Scalar,
    Collection,
}

/// How a class is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRole {
    Entity,
    /// Attribute-less intermediate class; only a join table is generated
    JoinTable,
    /// Intermediate class with attributes, generated as an entity of its own
    PromotedJoinEntity,
}

impl ClassRole {
    pub fn label(self) -> &'static str {
        match self {
            ClassRole::Entity => "entity",
            ClassRole::JoinTable => "join_table",
            ClassRole::PromotedJoinEntity => "promoted_join_entity",
        }
    }
}

/// One generated reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub related_class: String,
    pub field_name: String,
    pub cardinality: Cardinality,
    pub owning_side: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_column_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_join_column_name: Option<String>,
    /// Field on the owning side that maps this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
}

impl FieldSpec {
    /// Scalar reference that holds the foreign key
    pub fn owning_scalar(
        related_class: impl Into<String>,
        field_name: impl Into<String>,
        join_column: impl Into<String>,
    ) -> Self {
        Self {
            related_class: related_class.into(),
            field_name: field_name.into(),
            cardinality: Cardinality::Scalar,
            owning_side: true,
            join_column_name: Some(join_column.into()),
            join_table_name: None,
            inverse_join_column_name: None,
            mapped_by: None,
        }
    }

    /// Scalar back-reference mapped by the other side
    pub fn inverse_scalar(
        related_class: impl Into<String>,
        field_name: impl Into<String>,
        mapped_by: impl Into<String>,
    ) -> Self {
        Self {
            related_class: related_class.into(),
            field_name: field_name.into(),
            cardinality: Cardinality::Scalar,
            owning_side: false,
            join_column_name: None,
            join_table_name: None,
            inverse_join_column_name: None,
            mapped_by: Some(mapped_by.into()),
        }
    }

    /// Collection mapped by a scalar on the other side
    pub fn inverse_collection(
        related_class: impl Into<String>,
        field_name: impl Into<String>,
        mapped_by: impl Into<String>,
    ) -> Self {
        Self {
            cardinality: Cardinality::Collection,
            ..Self::inverse_scalar(related_class, field_name, mapped_by)
        }
    }

    /// Collection stored in a join table, owned by this side
    pub fn join_table_collection(
        related_class: impl Into<String>,
        field_name: impl Into<String>,
        join_table: impl Into<String>,
        join_column: impl Into<String>,
        inverse_join_column: impl Into<String>,
    ) -> Self {
        Self {
            related_class: related_class.into(),
            field_name: field_name.into(),
            cardinality: Cardinality::Collection,
            owning_side: true,
            join_column_name: Some(join_column.into()),
            join_table_name: Some(join_table.into()),
            inverse_join_column_name: Some(inverse_join_column.into()),
            mapped_by: None,
        }
    }

    /// Turn this into the inverse side mapped by `field`
    pub fn mapped_by(mut self, field: impl Into<String>) -> Self {
        self.owning_side = false;
        self.mapped_by = Some(field.into());
        self
    }

    pub fn is_collection(&self) -> bool {
        self.cardinality == Cardinality::Collection
    }
}

/// Association-maintenance operation such as `assignRolesToUser`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceOp {
    pub name: String,
    pub target_class: String,
    pub join_table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPlan {
    pub name: String,
    pub role: ClassRole,
    pub attributes: Vec<String>,
    pub fields: Vec<FieldSpec>,
    pub operations: Vec<MaintenanceOp>,
}

impl ClassPlan {
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            role: ClassRole::Entity,
            attributes,
            fields: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    pub fn fields_to<'a>(
        &'a self,
        related_class: &'a str,
    ) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.related_class == related_class)
    }
}

/// Per-class resolver output, in diagram class order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingPlan {
    pub classes: Vec<ClassPlan>,
}

impl MappingPlan {
    pub fn class(&self, name: &str) -> Option<&ClassPlan> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassPlan> {
        self.classes.iter_mut().find(|c| c.name == name)
    }

    /// Classes generated as entities (everything but plain join tables)
    pub fn entities(&self) -> impl Iterator<Item = &ClassPlan> {
        self.classes
            .iter()
            .filter(|c| c.role != ClassRole::JoinTable)
    }

    pub fn field_count(&self) -> usize {
        self.classes.iter().map(|c| c.fields.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub plan: MappingPlan,
    pub diagnostics: Vec<Diagnostic>,
}
