//! Diagram model
//!
//! Classes keep insertion order. Relationships and associations refer to
//! classes by name; dangling references may exist transiently and are
//! dropped by the printer's cleaning pass and skipped by the resolver.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::{Database, DiagramError, KindRef, Multiplicity};

/// A class with its ordered attribute names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl ClassEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// A typed, optionally labeled link between two classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: KindRef,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        rename = "class1Multiplicity",
        default,
        skip_serializing_if = "Option::is_none",
        with = "multiplicity_token"
    )]
    pub from_multiplicity: Option<Multiplicity>,
    #[serde(
        rename = "class2Multiplicity",
        default,
        skip_serializing_if = "Option::is_none",
        with = "multiplicity_token"
    )]
    pub to_multiplicity: Option<Multiplicity>,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: impl Into<KindRef>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: kind.into(),
            label: None,
            from_multiplicity: None,
            to_multiplicity: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_multiplicities(
        mut self,
        from: impl Into<Option<Multiplicity>>,
        to: impl Into<Option<Multiplicity>>,
    ) -> Self {
        self.from_multiplicity = from.into();
        self.to_multiplicity = to.into();
        self
    }

    pub fn is_self_reference(&self) -> bool {
        self.from == self.to
    }

    pub fn touches(&self, class: &str) -> bool {
        self.from == class || self.to == class
    }

    /// Same unordered pair of endpoints
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Many-to-many link between two classes carried by an intermediate class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    #[serde(rename = "class1")]
    pub class_a: String,
    #[serde(rename = "class2")]
    pub class_b: String,
    #[serde(rename = "associationClass")]
    pub intermediate: String,
}

impl Association {
    pub fn new(
        class_a: impl Into<String>,
        class_b: impl Into<String>,
        intermediate: impl Into<String>,
    ) -> Self {
        Self {
            class_a: class_a.into(),
            class_b: class_b.into(),
            intermediate: intermediate.into(),
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.class_a == a && self.class_b == b) || (self.class_a == b && self.class_b == a)
    }

    /// Any endpoint or the intermediate class has this name
    pub fn touches(&self, class: &str) -> bool {
        self.class_a == class || self.class_b == class || self.intermediate == class
    }
}

/// The complete model being synchronized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub classes: Vec<ClassEntity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the JSON shape produced by import adapters
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.relationships.is_empty() && self.associations.is_empty()
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntity> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassEntity> {
        self.classes.iter_mut().find(|c| c.name == name)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    /// Add a class, rejecting duplicate names
    pub fn add_class(&mut self, class: ClassEntity) -> Result<(), DiagramError> {
        if self.has_class(&class.name) {
            return Err(DiagramError::DuplicateClass { name: class.name });
        }
        self.classes.push(class);
        Ok(())
    }

    /// Add a relationship between existing classes
    ///
    /// Inheritance kinds carry no multiplicities; any given are discarded.
    pub fn add_relationship(&mut self, mut relationship: Relationship) -> Result<(), DiagramError> {
        if relationship.is_self_reference() {
            return Err(DiagramError::SelfReference {
                name: relationship.from,
            });
        }
        for endpoint in [&relationship.from, &relationship.to] {
            if !self.has_class(endpoint) {
                return Err(DiagramError::unknown_class(endpoint.as_str()));
            }
        }
        if relationship.kind.known().is_some_and(|k| k.is_inheritance()) {
            relationship.from_multiplicity = None;
            relationship.to_multiplicity = None;
        }
        let duplicate = self.relationships.iter().any(|r| {
            r.from == relationship.from && r.to == relationship.to && r.kind == relationship.kind
        });
        if duplicate {
            return Err(DiagramError::DuplicateRelationship {
                from: relationship.from,
                to: relationship.to,
                symbol: relationship.kind.to_string(),
            });
        }
        self.relationships.push(relationship);
        Ok(())
    }

    /// Remove a class together with every relationship and association
    /// that mentions it
    pub fn remove_class(&mut self, name: &str) -> Result<ClassEntity, DiagramError> {
        let index = self
            .classes
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DiagramError::unknown_class(name))?;
        self.relationships.retain(|r| !r.touches(name));
        self.associations.retain(|a| !a.touches(name));
        Ok(self.classes.remove(index))
    }
}

impl Database for Diagram {
    type Node = ClassEntity;
    type Edge = Relationship;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        Ok(self.add_class(node)?)
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        Ok(self.add_relationship(edge)?)
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.class(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.classes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.relationships.iter()
    }

    fn clear(&mut self) {
        self.classes.clear();
        self.relationships.clear();
        self.associations.clear();
    }

    fn node_count(&self) -> usize {
        self.classes.len()
    }

    fn edge_count(&self) -> usize {
        self.relationships.len()
    }
}

/// Multiplicities as optional tokens; empty strings and synonyms are
/// accepted on input
mod multiplicity_token {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use crate::core::{Multiplicity, MultiplicityTable};

    pub fn serialize<S>(value: &Option<Multiplicity>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Multiplicity>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(token) => MultiplicityTable::default()
                .resolve(&token)
                .map_err(|unknown| de::Error::custom(format!("unknown multiplicity '{}'", unknown))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelationshipKind;

    fn two_classes() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.add_class(ClassEntity::new("User")).unwrap();
        diagram.add_class(ClassEntity::new("Order")).unwrap();
        diagram
    }

    #[test]
    fn test_add_class_rejects_duplicates() {
        let mut diagram = two_classes();
        let err = diagram.add_class(ClassEntity::new("User")).unwrap_err();
        assert!(matches!(err, DiagramError::DuplicateClass { .. }));
        assert_eq!(diagram.node_count(), 2);
    }

    #[test]
    fn test_add_relationship_validates_endpoints() {
        let mut diagram = two_classes();
        let err = diagram
            .add_relationship(Relationship::new("User", "Ghost", RelationshipKind::Association))
            .unwrap_err();
        assert!(matches!(err, DiagramError::UnknownClass { .. }));

        let err = diagram
            .add_relationship(Relationship::new("User", "User", RelationshipKind::Association))
            .unwrap_err();
        assert!(matches!(err, DiagramError::SelfReference { .. }));
    }

    #[test]
    fn test_inheritance_drops_multiplicities() {
        let mut diagram = two_classes();
        diagram
            .add_relationship(
                Relationship::new("Order", "User", RelationshipKind::Generalization)
                    .with_multiplicities(Multiplicity::Exactly1, Multiplicity::Many),
            )
            .unwrap();
        assert_eq!(diagram.relationships[0].from_multiplicity, None);
        assert_eq!(diagram.relationships[0].to_multiplicity, None);
    }

    #[test]
    fn test_duplicate_relationship_rejected() {
        let mut diagram = two_classes();
        let rel = Relationship::new("User", "Order", RelationshipKind::Association);
        diagram.add_relationship(rel.clone()).unwrap();
        assert!(matches!(
            diagram.add_relationship(rel),
            Err(DiagramError::DuplicateRelationship { .. })
        ));
    }

    #[test]
    fn test_remove_class_cascades() {
        let mut diagram = two_classes();
        diagram.add_class(ClassEntity::new("Line")).unwrap();
        diagram
            .add_relationship(Relationship::new("User", "Order", RelationshipKind::Association))
            .unwrap();
        diagram
            .associations
            .push(Association::new("Order", "User", "Line"));

        diagram.remove_class("Order").unwrap();
        assert!(diagram.relationships.is_empty());
        assert!(diagram.associations.is_empty());
        assert!(diagram.has_class("Line"));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "classes": [{"name": "User", "attributes": ["email"]}, {"name": "Order"}],
            "relationships": [{
                "from": "User", "to": "Order", "type": "composicion",
                "name": "places", "class1Multiplicity": "1", "class2Multiplicity": ""
            }],
            "associations": [{"class1": "User", "class2": "Order", "associationClass": "Cart"}]
        }"#;
        let diagram = Diagram::from_json(json).unwrap();
        assert_eq!(diagram.classes[1].attributes.len(), 0);
        let rel = &diagram.relationships[0];
        assert_eq!(rel.kind, KindRef::Unresolved("composicion".to_string()));
        assert_eq!(rel.from_multiplicity, Some(Multiplicity::Exactly1));
        assert_eq!(rel.to_multiplicity, None);
        assert_eq!(diagram.associations[0].intermediate, "Cart");

        let out = diagram.to_json().unwrap();
        assert!(out.contains("\"class1Multiplicity\": \"1\""));
        assert!(out.contains("\"associationClass\": \"Cart\""));
        assert!(!out.contains("class2Multiplicity"));
    }

    #[test]
    fn test_json_rejects_unknown_multiplicity() {
        let json = r#"{"relationships": [{"from": "A", "to": "B", "type": "--", "class1Multiplicity": "7"}]}"#;
        assert!(Diagram::from_json(json).is_err());
    }
}
