//! Structured editor commands
//!
//! Voice and form front-ends emit loosely typed JSON commands. This module
//! decodes them and turns each into a validated [`Mutation`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{DiagramError, Lexicon, Multiplicity, RelationshipKind};
use crate::model::{normalize_class_name, Association, AssociationTarget, Mutation, Relationship};

/// Command verb, accepted in English or Spanish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    AddTable,
    DeleteTable,
    AddAttribute,
    DeleteAttribute,
    AddRelationship,
    DeleteRelationship,
    AddAssociation,
    DeleteAssociation,
    ClearDiagram,
    ClearRelationships,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::AddTable,
        Action::DeleteTable,
        Action::AddAttribute,
        Action::DeleteAttribute,
        Action::AddRelationship,
        Action::DeleteRelationship,
        Action::AddAssociation,
        Action::DeleteAssociation,
        Action::ClearDiagram,
        Action::ClearRelationships,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::AddTable => "addTable",
            Action::DeleteTable => "deleteTable",
            Action::AddAttribute => "addAttribute",
            Action::DeleteAttribute => "deleteAttribute",
            Action::AddRelationship => "addRelationship",
            Action::DeleteRelationship => "deleteRelationship",
            Action::AddAssociation => "addAssociation",
            Action::DeleteAssociation => "deleteAssociation",
            Action::ClearDiagram => "clearDiagram",
            Action::ClearRelationships => "clearRelationships",
        }
    }

    pub fn spanish_name(self) -> &'static str {
        match self {
            Action::AddTable => "agregar_tabla",
            Action::DeleteTable => "eliminar_tabla",
            Action::AddAttribute => "agregar_atributo",
            Action::DeleteAttribute => "eliminar_atributo",
            Action::AddRelationship => "agregar_relacion",
            Action::DeleteRelationship => "eliminar_relacion",
            Action::AddAssociation => "agregar_asociacion",
            Action::DeleteAssociation => "eliminar_asociacion",
            Action::ClearDiagram => "limpiar_diagrama",
            Action::ClearRelationships => "limpiar_relaciones",
        }
    }
}

impl FromStr for Action {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.name() == trimmed || action.spanish_name() == trimmed)
            .ok_or_else(|| DiagramError::invalid_command(format!("unknown action '{}'", trimmed)))
    }
}

impl TryFrom<String> for Action {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.name().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One editor command as received over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_name: Option<String>,
    #[serde(
        rename = "class1Multiplicity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub class1_multiplicity: Option<String>,
    #[serde(
        rename = "class2Multiplicity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub class2_multiplicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_class: Option<String>,
}

impl Command {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            table_name: None,
            attribute_name: None,
            from_table: None,
            to_table: None,
            relationship_type: None,
            relationship_name: None,
            class1_multiplicity: None,
            class2_multiplicity: None,
            association_class: None,
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode either a single command object or an array of commands
    pub fn batch_from_json(json: &str) -> anyhow::Result<Vec<Self>> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(vec![serde_json::from_value(value)?])
        }
    }

    /// Translate into a model mutation
    ///
    /// Class names are normalized to PascalCase; relationship kinds and
    /// multiplicities go through the lexicon's synonym tables.
    pub fn to_mutation(&self, lexicon: &Lexicon) -> Result<Mutation, DiagramError> {
        debug!(action = %self.action, "Translating command");
        let mutation = match self.action {
            Action::AddTable => Mutation::AddClass {
                name: self.table()?,
                attributes: Vec::new(),
            },
            Action::DeleteTable => Mutation::RemoveClass { name: self.table()? },
            Action::AddAttribute => Mutation::AddAttribute {
                class: self.table()?,
                attribute: self.attribute()?,
            },
            Action::DeleteAttribute => Mutation::RemoveAttribute {
                class: self.table()?,
                attribute: self.attribute()?,
            },
            Action::AddRelationship => Mutation::AddRelationship(self.relationship(lexicon)?),
            Action::DeleteRelationship => {
                let (class_a, class_b) = self.endpoints()?;
                Mutation::RemoveRelationship { class_a, class_b }
            }
            Action::AddAssociation => {
                let (class_a, class_b) = self.endpoints()?;
                let intermediate = match non_empty(&self.association_class) {
                    Some(name) => normalize_class_name(name),
                    None => format!("{}{}", class_a, class_b),
                };
                Mutation::AddAssociation(Association::new(class_a, class_b, intermediate))
            }
            Action::DeleteAssociation => {
                let target = match non_empty(&self.association_class) {
                    Some(name) => AssociationTarget::Intermediate(normalize_class_name(name)),
                    None => {
                        let (class_a, class_b) = self.endpoints().map_err(|_| {
                            DiagramError::invalid_command(
                                "deleteAssociation needs associationClass or fromTable and toTable",
                            )
                        })?;
                        AssociationTarget::Pair(class_a, class_b)
                    }
                };
                Mutation::RemoveAssociation(target)
            }
            Action::ClearDiagram => Mutation::Clear,
            Action::ClearRelationships => Mutation::ClearRelationships,
        };
        Ok(mutation)
    }

    fn table(&self) -> Result<String, DiagramError> {
        non_empty(&self.table_name)
            .map(normalize_class_name)
            .ok_or_else(|| self.missing("tableName"))
    }

    fn attribute(&self) -> Result<String, DiagramError> {
        non_empty(&self.attribute_name)
            .map(|name| name.trim().to_string())
            .ok_or_else(|| self.missing("attributeName"))
    }

    fn endpoints(&self) -> Result<(String, String), DiagramError> {
        let from = non_empty(&self.from_table).ok_or_else(|| self.missing("fromTable"))?;
        let to = non_empty(&self.to_table).ok_or_else(|| self.missing("toTable"))?;
        Ok((normalize_class_name(from), normalize_class_name(to)))
    }

    fn relationship(&self, lexicon: &Lexicon) -> Result<Relationship, DiagramError> {
        let (mut from, mut to) = self.endpoints()?;
        let (kind, reversed) = match non_empty(&self.relationship_type) {
            Some(text) => lexicon.kinds.resolve(text).ok_or_else(|| {
                DiagramError::invalid_command(format!("unknown relationship type '{}'", text))
            })?,
            None => (RelationshipKind::Association, false),
        };

        let mut from_multiplicity = multiplicity(lexicon, &self.class1_multiplicity)?;
        let mut to_multiplicity = multiplicity(lexicon, &self.class2_multiplicity)?;
        if reversed {
            std::mem::swap(&mut from, &mut to);
            std::mem::swap(&mut from_multiplicity, &mut to_multiplicity);
        }
        if kind.is_inheritance() {
            from_multiplicity = None;
            to_multiplicity = None;
        }

        let mut relationship = Relationship::new(from, to, kind)
            .with_multiplicities(from_multiplicity, to_multiplicity);
        if let Some(label) = non_empty(&self.relationship_name) {
            relationship = relationship.with_label(label.trim());
        }
        Ok(relationship)
    }

    fn missing(&self, field: &str) -> DiagramError {
        DiagramError::invalid_command(format!("{} requires {}", self.action, field))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

fn multiplicity(
    lexicon: &Lexicon,
    token: &Option<String>,
) -> Result<Option<Multiplicity>, DiagramError> {
    match token {
        Some(token) => lexicon.multiplicities.resolve(token).map_err(|unknown| {
            DiagramError::invalid_command(format!("unknown multiplicity '{}'", unknown))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KindRef;

    fn command(json: &str) -> Command {
        Command::from_json(json).unwrap()
    }

    #[test]
    fn test_action_accepts_both_languages() {
        assert_eq!("addTable".parse::<Action>().unwrap(), Action::AddTable);
        assert_eq!(
            "eliminar_asociacion".parse::<Action>().unwrap(),
            Action::DeleteAssociation
        );
        assert!("generateDiagram".parse::<Action>().is_err());
    }

    #[test]
    fn test_add_table_normalizes_name() {
        let mutation = command(r#"{"action": "agregar_tabla", "tableName": "orden de compra"}"#)
            .to_mutation(&Lexicon::default())
            .unwrap();
        assert_eq!(
            mutation,
            Mutation::AddClass {
                name: "OrdenDeCompra".to_string(),
                attributes: vec![],
            }
        );
    }

    #[test]
    fn test_missing_table_name_is_rejected() {
        let err = command(r#"{"action": "addTable"}"#)
            .to_mutation(&Lexicon::default())
            .unwrap_err();
        assert!(err.to_string().contains("tableName"));
    }

    #[test]
    fn test_relationship_through_synonyms() {
        let mutation = command(
            r#"{
                "action": "addRelationship",
                "fromTable": "usuario",
                "toTable": "pedido",
                "relationshipType": "asociación",
                "class1Multiplicity": "uno",
                "class2Multiplicity": "muchos",
                "relationshipName": "realiza"
            }"#,
        )
        .to_mutation(&Lexicon::default())
        .unwrap();

        let Mutation::AddRelationship(relationship) = mutation else {
            panic!("expected a relationship");
        };
        assert_eq!(relationship.from, "Usuario");
        assert_eq!(relationship.to, "Pedido");
        assert_eq!(relationship.kind, KindRef::Known(RelationshipKind::Association));
        assert_eq!(relationship.from_multiplicity, Some(Multiplicity::Exactly1));
        assert_eq!(relationship.to_multiplicity, Some(Multiplicity::Many));
        assert_eq!(relationship.label.as_deref(), Some("realiza"));
    }

    #[test]
    fn test_inheritance_drops_multiplicities() {
        let mutation = command(
            r#"{"action": "addRelationship", "fromTable": "Perro", "toTable": "Animal",
                "relationshipType": "herencia", "class1Multiplicity": "1", "class2Multiplicity": "1"}"#,
        )
        .to_mutation(&Lexicon::default())
        .unwrap();
        let Mutation::AddRelationship(relationship) = mutation else {
            panic!("expected a relationship");
        };
        assert_eq!(relationship.kind, KindRef::Known(RelationshipKind::Generalization));
        assert_eq!(relationship.from_multiplicity, None);
        assert_eq!(relationship.to_multiplicity, None);
    }

    #[test]
    fn test_reversed_symbol_swaps_endpoints() {
        let mutation = command(
            r#"{"action": "addRelationship", "fromTable": "Wheel", "toTable": "Car",
                "relationshipType": "--*", "class1Multiplicity": "4..*"}"#,
        )
        .to_mutation(&Lexicon::default());
        assert!(matches!(mutation, Err(DiagramError::InvalidCommand { .. })));

        let mutation = command(
            r#"{"action": "addRelationship", "fromTable": "Wheel", "toTable": "Car",
                "relationshipType": "--*", "class1Multiplicity": "1..*", "class2Multiplicity": "1"}"#,
        )
        .to_mutation(&Lexicon::default())
        .unwrap();
        let Mutation::AddRelationship(relationship) = mutation else {
            panic!("expected a relationship");
        };
        assert_eq!(relationship.from, "Car");
        assert_eq!(relationship.to, "Wheel");
        assert_eq!(relationship.from_multiplicity, Some(Multiplicity::Exactly1));
        assert_eq!(relationship.to_multiplicity, Some(Multiplicity::OneOrMany));
    }

    #[test]
    fn test_unknown_relationship_type() {
        let err = command(
            r#"{"action": "addRelationship", "fromTable": "A", "toTable": "B", "relationshipType": "amistad"}"#,
        )
        .to_mutation(&Lexicon::default())
        .unwrap_err();
        assert!(err.to_string().contains("amistad"));
    }

    #[test]
    fn test_delete_association_by_pair_or_name() {
        let lexicon = Lexicon::default();
        let by_name = command(r#"{"action": "deleteAssociation", "associationClass": "matricula"}"#)
            .to_mutation(&lexicon)
            .unwrap();
        assert_eq!(
            by_name,
            Mutation::RemoveAssociation(AssociationTarget::Intermediate("Matricula".to_string()))
        );

        let by_pair = command(
            r#"{"action": "deleteAssociation", "fromTable": "curso", "toTable": "estudiante"}"#,
        )
        .to_mutation(&lexicon)
        .unwrap();
        assert_eq!(
            by_pair,
            Mutation::RemoveAssociation(AssociationTarget::Pair(
                "Curso".to_string(),
                "Estudiante".to_string()
            ))
        );

        assert!(command(r#"{"action": "deleteAssociation"}"#)
            .to_mutation(&lexicon)
            .is_err());
    }

    #[test]
    fn test_add_association_default_intermediate_name() {
        let mutation = command(r#"{"action": "addAssociation", "fromTable": "Student", "toTable": "Course"}"#)
            .to_mutation(&Lexicon::default())
            .unwrap();
        assert_eq!(
            mutation,
            Mutation::AddAssociation(Association::new("Student", "Course", "StudentCourse"))
        );
    }

    #[test]
    fn test_batch_decoding() {
        let single = Command::batch_from_json(r#"{"action": "clearDiagram"}"#).unwrap();
        assert_eq!(single, vec![Command::new(Action::ClearDiagram)]);

        let many = Command::batch_from_json(
            r#"[{"action": "limpiar_relaciones"}, {"action": "addTable", "tableName": "User"}]"#,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].action, Action::ClearRelationships);

        assert!(Command::batch_from_json(r#"{"action": "dance"}"#).is_err());
    }

    #[test]
    fn test_serializes_english_action() {
        let mut cmd = Command::new(Action::AddTable);
        cmd.table_name = Some("User".to_string());
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"action":"addTable","tableName":"User"}"#);
    }
}
