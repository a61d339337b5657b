//! Explicit edit operations on a [`Diagram`]
//!
//! Every change an editor makes goes through [`Diagram::apply`], which
//! validates it and reports whether the model actually changed.

use tracing::{debug, warn};

use super::diagram::{Association, ClassEntity, Diagram, Relationship};
use super::naming::{validate_attribute, validate_class_name};
use crate::core::DiagramError;

/// How an association is addressed for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationTarget {
    /// By the name of its intermediate class
    Intermediate(String),
    /// By its endpoints, in either order
    Pair(String, String),
}

impl std::fmt::Display for AssociationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationTarget::Intermediate(name) => write!(f, "{}", name),
            AssociationTarget::Pair(a, b) => write!(f, "({}, {})", a, b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddClass {
        name: String,
        attributes: Vec<String>,
    },
    RemoveClass {
        name: String,
    },
    /// Creates the class when it does not exist yet
    AddAttribute {
        class: String,
        attribute: String,
    },
    RemoveAttribute {
        class: String,
        attribute: String,
    },
    AddRelationship(Relationship),
    /// Removes every relationship between the two classes, in either direction
    RemoveRelationship {
        class_a: String,
        class_b: String,
    },
    /// Creates the intermediate class when it does not exist yet
    AddAssociation(Association),
    /// Also removes the intermediate class
    RemoveAssociation(AssociationTarget),
    ClearRelationships,
    Clear,
    Replace(Diagram),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddClass { .. } => "add_class",
            Mutation::RemoveClass { .. } => "remove_class",
            Mutation::AddAttribute { .. } => "add_attribute",
            Mutation::RemoveAttribute { .. } => "remove_attribute",
            Mutation::AddRelationship(_) => "add_relationship",
            Mutation::RemoveRelationship { .. } => "remove_relationship",
            Mutation::AddAssociation(_) => "add_association",
            Mutation::RemoveAssociation(_) => "remove_association",
            Mutation::ClearRelationships => "clear_relationships",
            Mutation::Clear => "clear",
            Mutation::Replace(_) => "replace",
        }
    }
}

impl Diagram {
    /// Apply one mutation
    ///
    /// Returns `Ok(true)` when the diagram changed and `Ok(false)` for a
    /// no-op. A rejected mutation leaves the diagram untouched.
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, DiagramError> {
        debug!(mutation = mutation.name(), "Applying mutation");
        let result = match mutation {
            Mutation::AddClass { name, attributes } => self.apply_add_class(name, attributes),
            Mutation::RemoveClass { name } => self.remove_class(&name).map(|_| true),
            Mutation::AddAttribute { class, attribute } => {
                self.apply_add_attribute(&class, attribute)
            }
            Mutation::RemoveAttribute { class, attribute } => {
                self.apply_remove_attribute(&class, &attribute)
            }
            Mutation::AddRelationship(relationship) => {
                self.add_relationship(relationship).map(|_| true)
            }
            Mutation::RemoveRelationship { class_a, class_b } => {
                let before = self.relationships.len();
                self.relationships.retain(|r| !r.connects(&class_a, &class_b));
                if self.relationships.len() == before {
                    Err(DiagramError::UnknownRelationship {
                        from: class_a,
                        to: class_b,
                    })
                } else {
                    Ok(true)
                }
            }
            Mutation::AddAssociation(association) => self.apply_add_association(association),
            Mutation::RemoveAssociation(target) => self.apply_remove_association(target),
            Mutation::ClearRelationships => {
                let changed = !self.relationships.is_empty() || !self.associations.is_empty();
                self.relationships.clear();
                self.associations.clear();
                Ok(changed)
            }
            Mutation::Clear => {
                let changed = !self.is_empty();
                *self = Diagram::new();
                Ok(changed)
            }
            Mutation::Replace(diagram) => {
                let changed = *self != diagram;
                *self = diagram;
                Ok(changed)
            }
        };

        if let Err(err) = &result {
            warn!(error = %err, "Mutation rejected");
        }
        result
    }

    fn apply_add_class(&mut self, name: String, attributes: Vec<String>) -> Result<bool, DiagramError> {
        validate_class_name(&name)?;
        let mut class = ClassEntity::new(name);
        for attribute in attributes {
            let attribute = attribute.trim().to_string();
            validate_attribute(&class.name, &attribute)?;
            if class.has_attribute(&attribute) {
                return Err(DiagramError::DuplicateAttribute {
                    class: class.name,
                    attribute,
                });
            }
            class.attributes.push(attribute);
        }
        self.add_class(class)?;
        Ok(true)
    }

    fn apply_add_attribute(&mut self, class: &str, attribute: String) -> Result<bool, DiagramError> {
        let attribute = attribute.trim().to_string();
        validate_attribute(class, &attribute)?;
        match self.class_mut(class) {
            Some(entity) => {
                if entity.has_attribute(&attribute) {
                    return Err(DiagramError::DuplicateAttribute {
                        class: class.to_string(),
                        attribute,
                    });
                }
                entity.attributes.push(attribute);
                Ok(true)
            }
            None => {
                debug!(class, "Creating missing class for attribute");
                self.apply_add_class(class.to_string(), vec![attribute])
            }
        }
    }

    fn apply_remove_attribute(&mut self, class: &str, attribute: &str) -> Result<bool, DiagramError> {
        let entity = self
            .class_mut(class)
            .ok_or_else(|| DiagramError::unknown_class(class))?;
        let index = entity
            .attributes
            .iter()
            .position(|a| a == attribute)
            .ok_or_else(|| DiagramError::UnknownAttribute {
                class: class.to_string(),
                attribute: attribute.to_string(),
            })?;
        entity.attributes.remove(index);
        Ok(true)
    }

    fn apply_add_association(&mut self, association: Association) -> Result<bool, DiagramError> {
        if association.class_a == association.class_b {
            return Err(DiagramError::SelfReference {
                name: association.class_a,
            });
        }
        if association.intermediate == association.class_a
            || association.intermediate == association.class_b
        {
            return Err(DiagramError::SelfReference {
                name: association.intermediate,
            });
        }
        for endpoint in [&association.class_a, &association.class_b] {
            if !self.has_class(endpoint) {
                return Err(DiagramError::unknown_class(endpoint.as_str()));
            }
        }
        // An intermediate class carries exactly one association
        let duplicate = self
            .associations
            .iter()
            .any(|a| a.intermediate == association.intermediate);
        if duplicate {
            return Err(DiagramError::DuplicateAssociation {
                class_a: association.class_a,
                class_b: association.class_b,
                intermediate: association.intermediate,
            });
        }
        if !self.has_class(&association.intermediate) {
            validate_class_name(&association.intermediate)?;
            self.classes
                .push(ClassEntity::new(association.intermediate.clone()));
        }
        self.associations.push(association);
        Ok(true)
    }

    fn apply_remove_association(&mut self, target: AssociationTarget) -> Result<bool, DiagramError> {
        let index = self
            .associations
            .iter()
            .position(|a| match &target {
                AssociationTarget::Intermediate(name) => &a.intermediate == name,
                AssociationTarget::Pair(x, y) => a.connects(x, y),
            })
            .ok_or_else(|| DiagramError::UnknownAssociation {
                target: target.to_string(),
            })?;
        let association = self.associations.remove(index);
        if self.has_class(&association.intermediate) {
            self.remove_class(&association.intermediate)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelationshipKind;

    fn add_class(diagram: &mut Diagram, name: &str) {
        diagram
            .apply(Mutation::AddClass {
                name: name.to_string(),
                attributes: vec![],
            })
            .unwrap();
    }

    #[test]
    fn test_add_class_validates_name() {
        let mut diagram = Diagram::new();
        let err = diagram
            .apply(Mutation::AddClass {
                name: "user".to_string(),
                attributes: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidClassName { .. }));
        assert!(diagram.is_empty());
    }

    #[test]
    fn test_add_attribute_creates_missing_class() {
        let mut diagram = Diagram::new();
        let changed = diagram
            .apply(Mutation::AddAttribute {
                class: "Product".to_string(),
                attribute: "price".to_string(),
            })
            .unwrap();
        assert!(changed);
        assert_eq!(diagram.class("Product").unwrap().attributes, vec!["price"]);
    }

    #[test]
    fn test_reserved_and_duplicate_attributes() {
        let mut diagram = Diagram::new();
        add_class(&mut diagram, "Product");
        let add = |attribute: &str| Mutation::AddAttribute {
            class: "Product".to_string(),
            attribute: attribute.to_string(),
        };
        assert!(matches!(
            diagram.apply(add("id")),
            Err(DiagramError::ReservedAttribute { .. })
        ));
        diagram.apply(add("name")).unwrap();
        assert!(matches!(
            diagram.apply(add("name")),
            Err(DiagramError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_remove_attribute() {
        let mut diagram = Diagram::new();
        diagram
            .apply(Mutation::AddClass {
                name: "Product".to_string(),
                attributes: vec!["name".to_string(), "price".to_string()],
            })
            .unwrap();
        diagram
            .apply(Mutation::RemoveAttribute {
                class: "Product".to_string(),
                attribute: "name".to_string(),
            })
            .unwrap();
        assert_eq!(diagram.class("Product").unwrap().attributes, vec!["price"]);
        assert!(matches!(
            diagram.apply(Mutation::RemoveAttribute {
                class: "Product".to_string(),
                attribute: "name".to_string(),
            }),
            Err(DiagramError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_remove_relationship_by_unordered_pair() {
        let mut diagram = Diagram::new();
        add_class(&mut diagram, "User");
        add_class(&mut diagram, "Order");
        diagram
            .apply(Mutation::AddRelationship(Relationship::new(
                "User",
                "Order",
                RelationshipKind::Association,
            )))
            .unwrap();
        diagram
            .apply(Mutation::RemoveRelationship {
                class_a: "Order".to_string(),
                class_b: "User".to_string(),
            })
            .unwrap();
        assert!(diagram.relationships.is_empty());
        assert!(matches!(
            diagram.apply(Mutation::RemoveRelationship {
                class_a: "Order".to_string(),
                class_b: "User".to_string(),
            }),
            Err(DiagramError::UnknownRelationship { .. })
        ));
    }

    #[test]
    fn test_association_lifecycle() {
        let mut diagram = Diagram::new();
        add_class(&mut diagram, "Student");
        add_class(&mut diagram, "Course");
        diagram
            .apply(Mutation::AddAssociation(Association::new(
                "Student",
                "Course",
                "Enrollment",
            )))
            .unwrap();
        assert!(diagram.has_class("Enrollment"));

        assert!(matches!(
            diagram.apply(Mutation::AddAssociation(Association::new(
                "Course",
                "Student",
                "Enrollment",
            ))),
            Err(DiagramError::DuplicateAssociation { .. })
        ));

        diagram
            .apply(Mutation::RemoveAssociation(AssociationTarget::Pair(
                "Course".to_string(),
                "Student".to_string(),
            )))
            .unwrap();
        assert!(diagram.associations.is_empty());
        assert!(!diagram.has_class("Enrollment"));
    }

    #[test]
    fn test_association_requires_endpoints() {
        let mut diagram = Diagram::new();
        add_class(&mut diagram, "Student");
        let err = diagram
            .apply(Mutation::AddAssociation(Association::new(
                "Student",
                "Course",
                "Enrollment",
            )))
            .unwrap_err();
        assert!(matches!(err, DiagramError::UnknownClass { .. }));
        assert!(!diagram.has_class("Enrollment"));
    }

    #[test]
    fn test_noop_mutations_report_unchanged() {
        let mut diagram = Diagram::new();
        assert!(!diagram.apply(Mutation::Clear).unwrap());
        assert!(!diagram.apply(Mutation::ClearRelationships).unwrap());
        assert!(!diagram.apply(Mutation::Replace(Diagram::new())).unwrap());
        add_class(&mut diagram, "User");
        assert!(diagram.apply(Mutation::Clear).unwrap());
    }
}
