//! Cardinality resolver
//!
//! Turns relationships and associations into persistence fields. The
//! multiplicity written next to an endpoint counts instances of that
//! endpoint, so in `A "1" --> "0..*" B` every `B` refers to one `A`:
//! `B` holds the owning scalar and `A` the inverse collection.

use std::collections::HashSet;

use tracing::{debug, info, span, trace, warn, Level};

use super::hints::OwnershipHints;
use super::plan::{ClassPlan, ClassRole, FieldSpec, MaintenanceOp, MappingPlan, Resolution};
use crate::core::{Diagnostic, DiagnosticKind, KindRef, Lexicon, Multiplicity, RelationshipKind};
use crate::model::{Association, Diagram, Relationship};

/// Resolver settings
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    pub hints: OwnershipHints,
}

#[derive(Debug, Clone, Default)]
pub struct CardinalityResolver {
    lexicon: Lexicon,
    config: ResolverConfig,
}

/// Field name for a reference to `class`
pub fn field_name(class: &str) -> String {
    class.to_lowercase()
}

/// Field name for a collection of `class`
pub fn collection_name(class: &str) -> String {
    format!("{}s", class.to_lowercase())
}

/// Foreign-key column referencing `class`
pub fn join_column(class: &str) -> String {
    format!("{}_id", class.to_lowercase())
}

/// Synthesized join table of an attribute-less association
pub fn join_table(class_a: &str, class_b: &str) -> String {
    format!("{}_{}", class_a, class_b)
}

/// Join-table column referencing `class`
pub fn join_table_column(class: &str) -> String {
    format!("id_{}", class)
}

/// `assign<Target>sTo<Owner>`
pub fn maintenance_op_name(owner: &str, target: &str) -> String {
    format!("assign{}sTo{}", target, owner)
}

/// Resolved endpoints of one structural relationship
struct Link<'a> {
    from: &'a str,
    to: &'a str,
    from_multiplicity: Option<Multiplicity>,
    to_multiplicity: Option<Multiplicity>,
}

impl CardinalityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hints(mut self, hints: OwnershipHints) -> Self {
        self.config.hints = hints;
        self
    }

    pub fn resolve(&self, diagram: &Diagram) -> Resolution {
        let resolve_span = span!(
            Level::INFO,
            "resolve_mapping",
            classes = diagram.classes.len(),
            relationships = diagram.relationships.len(),
            associations = diagram.associations.len()
        );
        let _enter = resolve_span.enter();

        let mut plan = MappingPlan::default();
        let mut seen = HashSet::new();
        for class in &diagram.classes {
            if seen.insert(class.name.as_str()) {
                plan.classes
                    .push(ClassPlan::new(class.name.clone(), class.attributes.clone()));
            }
        }

        let mut diagnostics = Vec::new();
        for relationship in &diagram.relationships {
            self.resolve_relationship(diagram, relationship, &mut plan, &mut diagnostics);
        }
        for association in &diagram.associations {
            self.resolve_association(diagram, association, &mut plan, &mut diagnostics);
        }

        debug!(
            field_count = plan.field_count(),
            diagnostic_count = diagnostics.len(),
            "Resolved mapping plan"
        );
        info!("Resolution completed");
        Resolution { plan, diagnostics }
    }

    fn resolve_relationship(
        &self,
        diagram: &Diagram,
        relationship: &Relationship,
        plan: &mut MappingPlan,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let (kind, reversed) = match &relationship.kind {
            KindRef::Known(kind) => (*kind, false),
            KindRef::Unresolved(text) => match self.lexicon.kinds.resolve(text) {
                Some(resolved) => resolved,
                None => {
                    warn!(kind = %text, "Skipping relationship with unknown kind");
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnknownRelationshipKind,
                        format!(
                            "unknown relationship kind '{}' between {} and {}",
                            text, relationship.from, relationship.to
                        ),
                    ));
                    return;
                }
            },
        };

        if relationship.is_self_reference() {
            trace!(class = %relationship.from, "Skipping self relationship");
            return;
        }
        if let Some(missing) = [&relationship.from, &relationship.to]
            .into_iter()
            .find(|name| !diagram.has_class(name))
        {
            warn!(class = %missing, "Skipping relationship to missing class");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DanglingReference,
                format!(
                    "relationship {} {} {} references missing class {}",
                    relationship.from, kind, relationship.to, missing
                ),
            ));
            return;
        }
        if !kind.is_structural() {
            trace!(kind = %kind, "Kind produces no fields");
            return;
        }

        let link = if reversed {
            Link {
                from: &relationship.to,
                to: &relationship.from,
                from_multiplicity: relationship.to_multiplicity,
                to_multiplicity: relationship.from_multiplicity,
            }
        } else {
            Link {
                from: &relationship.from,
                to: &relationship.to,
                from_multiplicity: relationship.from_multiplicity,
                to_multiplicity: relationship.to_multiplicity,
            }
        };

        match (link.from_multiplicity, link.to_multiplicity) {
            (Some(f), Some(t)) if f.is_many() && t.is_exactly_one() => {
                many_to_one(plan, link.from, link.to, diagnostics);
            }
            (Some(f), Some(t)) if f.is_exactly_one() && t.is_many() => {
                many_to_one(plan, link.to, link.from, diagnostics);
            }
            (Some(Multiplicity::Exactly1), Some(Multiplicity::Exactly1)) => {
                self.one_to_one(plan, &link, kind, diagnostics);
            }
            (f, t) => {
                let token = |m: Option<Multiplicity>| m.map_or("", Multiplicity::token);
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnhandledCardinality,
                    format!(
                        "{} \"{}\" {} \"{}\" {}: no mapping rule, {} keeps a reference to {}",
                        link.from,
                        token(f),
                        kind,
                        token(t),
                        link.to,
                        link.to,
                        link.from
                    ),
                ));
                add_field(
                    plan,
                    link.to,
                    FieldSpec::owning_scalar(link.from, field_name(link.from), join_column(link.from)),
                    diagnostics,
                );
            }
        }
    }

    fn one_to_one(
        &self,
        plan: &mut MappingPlan,
        link: &Link<'_>,
        kind: RelationshipKind,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let holder = self
            .config
            .hints
            .owner(link.from, link.to)
            .filter(|holder| *holder == link.from || *holder == link.to);

        match holder {
            Some(holder) => {
                let other = if holder == link.from { link.to } else { link.from };
                add_field(
                    plan,
                    holder,
                    FieldSpec::owning_scalar(other, field_name(other), join_column(other)),
                    diagnostics,
                );
            }
            None => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::AmbiguousOwnership,
                    format!(
                        "one-to-one {} {} {} has no foreign-key holder; defaulting to {}",
                        link.from, kind, link.to, link.to
                    ),
                ));
                add_field(
                    plan,
                    link.to,
                    FieldSpec::owning_scalar(link.from, field_name(link.from), join_column(link.from)),
                    diagnostics,
                );
                add_field(
                    plan,
                    link.from,
                    FieldSpec::inverse_scalar(link.to, field_name(link.to), field_name(link.from)),
                    diagnostics,
                );
            }
        }
    }

    fn resolve_association(
        &self,
        diagram: &Diagram,
        association: &Association,
        plan: &mut MappingPlan,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let (a, b) = (association.class_a.as_str(), association.class_b.as_str());
        if a == b {
            trace!(class = a, "Skipping self association");
            return;
        }
        if let Some(missing) = [a, b].into_iter().find(|name| !diagram.has_class(name)) {
            warn!(class = missing, "Skipping association to missing class");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DanglingReference,
                format!(
                    "association {} references missing class {}",
                    association.intermediate, missing
                ),
            ));
            return;
        }

        let attribute_count = diagram
            .class(&association.intermediate)
            .map_or(0, |c| c.attributes.len());

        if attribute_count == 0 {
            let table = join_table(a, b);
            debug!(table = %table, "Association through join table");
            add_field(
                plan,
                a,
                FieldSpec::join_table_collection(
                    b,
                    collection_name(b),
                    &table,
                    join_table_column(a),
                    join_table_column(b),
                ),
                diagnostics,
            );
            add_field(
                plan,
                b,
                FieldSpec::join_table_collection(
                    a,
                    collection_name(a),
                    &table,
                    join_table_column(b),
                    join_table_column(a),
                )
                .mapped_by(collection_name(b)),
                diagnostics,
            );
            if let Some(class) = plan.class_mut(&association.intermediate) {
                class.role = ClassRole::JoinTable;
            }

            if let Some(endpoint) = self.config.hints.maintainer(a, b) {
                let target = if endpoint == a { b } else { a };
                if let Some(class) = plan.class_mut(endpoint) {
                    class.operations.push(MaintenanceOp {
                        name: maintenance_op_name(endpoint, target),
                        target_class: target.to_string(),
                        join_table_name: table,
                    });
                }
            }
        } else {
            debug!(
                intermediate = %association.intermediate,
                attribute_count,
                "Promoting intermediate class"
            );
            let intermediate = association.intermediate.as_str();
            if let Some(class) = plan.class_mut(intermediate) {
                class.role = ClassRole::PromotedJoinEntity;
            }
            for endpoint in [a, b] {
                add_field(
                    plan,
                    intermediate,
                    FieldSpec::owning_scalar(endpoint, field_name(endpoint), join_column(endpoint)),
                    diagnostics,
                );
            }
        }
    }
}

/// `many` holds the owning scalar, `one` the inverse collection
fn many_to_one(plan: &mut MappingPlan, many: &str, one: &str, diagnostics: &mut Vec<Diagnostic>) {
    let added = add_field(
        plan,
        many,
        FieldSpec::owning_scalar(one, field_name(one), join_column(one)),
        diagnostics,
    );
    if added {
        add_field(
            plan,
            one,
            FieldSpec::inverse_collection(many, collection_name(many), field_name(one)),
            diagnostics,
        );
    }
}

/// Push `field` unless the class already has a field of that name
fn add_field(
    plan: &mut MappingPlan,
    class: &str,
    field: FieldSpec,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let Some(class_plan) = plan.class_mut(class) else {
        warn!(class, "No plan for class");
        return false;
    };
    if class_plan.field(&field.field_name).is_some() {
        warn!(class, field = %field.field_name, "Skipping colliding field");
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::DuplicateEntry,
            format!(
                "{} already has a field named {}; another relationship to {} is ignored",
                class, field.field_name, field.related_class
            ),
        ));
        return false;
    }
    trace!(class, field = %field.field_name, "Adding field");
    class_plan.fields.push(field);
    true
}
