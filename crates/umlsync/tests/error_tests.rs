//! Tests for core error types and diagnostics

use umlsync::core::{Diagnostic, DiagnosticKind, DiagramError};
use umlsync::model::{Diagram, Mutation, Relationship};
use umlsync::RelationshipKind;

#[test]
fn test_duplicate_class_message() {
    let error = DiagramError::DuplicateClass {
        name: "User".to_string(),
    };
    assert_eq!(error.to_string(), "Class already exists: User");
}

#[test]
fn test_invalid_class_name_message() {
    let error = DiagramError::InvalidClassName {
        name: "user_1".to_string(),
    };
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("user_1"));
    assert!(error_msg.contains("uppercase"));
}

#[test]
fn test_duplicate_relationship_message() {
    let error = DiagramError::DuplicateRelationship {
        from: "A".to_string(),
        to: "B".to_string(),
        symbol: "-->".to_string(),
    };
    assert_eq!(error.to_string(), "Relationship already exists: A --> B");
}

#[test]
fn test_association_messages() {
    let duplicate = DiagramError::DuplicateAssociation {
        class_a: "Student".to_string(),
        class_b: "Course".to_string(),
        intermediate: "Enrollment".to_string(),
    };
    assert_eq!(
        duplicate.to_string(),
        "Association already exists: (Student, Course) .. Enrollment"
    );

    let unknown = DiagramError::UnknownAssociation {
        target: "Enrollment".to_string(),
    };
    assert!(unknown.to_string().contains("Enrollment"));
}

#[test]
fn test_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&DiagramError::invalid_command("x"));
}

#[test]
fn test_error_converts_into_anyhow() {
    fn fails() -> anyhow::Result<()> {
        Err(DiagramError::unknown_class("Ghost"))?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert!(err.to_string().contains("Ghost"));
    assert!(err.downcast_ref::<DiagramError>().is_some());
}

#[test]
fn test_rejected_mutations_return_errors() {
    let mut diagram = Diagram::new();
    let err = diagram
        .apply(Mutation::AddRelationship(Relationship::new(
            "A",
            "B",
            RelationshipKind::Association,
        )))
        .unwrap_err();
    assert!(matches!(err, DiagramError::UnknownClass { .. }));

    diagram
        .apply(Mutation::AddClass {
            name: "A".to_string(),
            attributes: vec![],
        })
        .unwrap();
    let err = diagram
        .apply(Mutation::AddRelationship(Relationship::new(
            "A",
            "A",
            RelationshipKind::Association,
        )))
        .unwrap_err();
    assert!(matches!(err, DiagramError::SelfReference { .. }));
}

#[test]
fn test_diagnostic_serializes_snake_case() {
    let diagnostic = Diagnostic::new(DiagnosticKind::DanglingReference, "B is missing").at_line(4);
    let json = serde_json::to_value(&diagnostic).unwrap();
    assert_eq!(json["kind"], "dangling_reference");
    assert_eq!(json["line"], 4);

    let without_line = Diagnostic::new(DiagnosticKind::InformalPair, "A - B");
    let json = serde_json::to_value(&without_line).unwrap();
    assert!(json.get("line").is_none());
}

#[test]
fn test_diagnostic_kind_display() {
    assert_eq!(DiagnosticKind::UnhandledCardinality.to_string(), "unhandled-cardinality");
    assert_eq!(DiagnosticKind::AmbiguousOwnership.to_string(), "ambiguous-ownership");
}
