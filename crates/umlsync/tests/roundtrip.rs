//! Round-trip properties of the notation codec

use proptest::prelude::*;
use umlsync::core::{count_kind, DiagnosticKind, KindRef, Lexicon, Multiplicity, RelationshipKind};
use umlsync::model::{Association, ClassEntity, Diagram, Relationship};
use umlsync::notation::{clean, NotationParser, NotationPrinter, ParserConfig};

const NAMES: [&str; 6] = ["User", "Order", "Role", "Product", "Invoice", "Tag"];
const ATTRIBUTES: [&str; 4] = ["name", "total", "created_at", "email: String"];
const LABELS: [&str; 3] = ["places", "owns", "belongs to"];
const KIND_TEXTS: [&str; 4] = ["composicion", "aggregation", "herencia", "friendship"];

fn cleaned(diagram: &Diagram) -> Diagram {
    clean(diagram, &Lexicon::default(), &ParserConfig::default()).diagram
}

fn roundtrip(diagram: &Diagram) -> Diagram {
    let text = NotationPrinter::new().print(diagram);
    NotationParser::new().parse_report(&text).diagram
}

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(str::to_string)
}

fn multiplicity() -> impl Strategy<Value = Option<Multiplicity>> {
    prop::option::of(prop::sample::select(Multiplicity::ALL.to_vec()))
}

fn kind() -> impl Strategy<Value = KindRef> {
    prop_oneof![
        3 => prop::sample::select(RelationshipKind::ALL.to_vec()).prop_map(KindRef::Known),
        1 => prop::sample::select(KIND_TEXTS.to_vec())
            .prop_map(|text| KindRef::Unresolved(text.to_string())),
    ]
}

fn class() -> impl Strategy<Value = ClassEntity> {
    (
        name(),
        prop::collection::vec(prop::sample::select(ATTRIBUTES.to_vec()), 0..3),
    )
        .prop_map(|(name, attributes)| ClassEntity::new(name).with_attributes(attributes))
}

fn relationship() -> impl Strategy<Value = Relationship> {
    (
        name(),
        name(),
        kind(),
        multiplicity(),
        multiplicity(),
        prop::option::of(prop::sample::select(LABELS.to_vec())),
    )
        .prop_map(|(from, to, kind, fm, tm, label)| {
            let mut relationship = Relationship::new(from, to, kind).with_multiplicities(fm, tm);
            relationship.label = label.map(str::to_string);
            relationship
        })
}

fn association() -> impl Strategy<Value = Association> {
    (name(), name(), name()).prop_map(|(a, b, c)| Association::new(a, b, c))
}

fn diagram() -> impl Strategy<Value = Diagram> {
    (
        prop::collection::vec(class(), 0..6),
        prop::collection::vec(relationship(), 0..8),
        prop::collection::vec(association(), 0..3),
    )
        .prop_map(|(classes, relationships, associations)| Diagram {
            classes,
            relationships,
            associations,
        })
}

proptest! {
    #[test]
    fn prop_roundtrip_up_to_cleaning(d in diagram()) {
        prop_assert_eq!(cleaned(&roundtrip(&d)), cleaned(&d));
    }

    #[test]
    fn prop_cleaning_is_idempotent(d in diagram()) {
        let once = cleaned(&d);
        prop_assert_eq!(cleaned(&once), once);
    }

    #[test]
    fn prop_self_relationships_never_survive(d in diagram()) {
        let text = NotationPrinter::new().print(&d);
        let parsed = NotationParser::new().parse_report(&text).diagram;
        prop_assert!(parsed.relationships.iter().all(|r| r.from != r.to));
        prop_assert!(parsed.associations.iter().all(|a| a.class_a != a.class_b));
    }

    #[test]
    fn prop_printing_is_deterministic(d in diagram()) {
        let printer = NotationPrinter::new();
        prop_assert_eq!(printer.print(&d), printer.print(&d.clone()));
    }
}

#[test]
fn test_self_relationship_in_text_is_excluded() {
    let report = NotationParser::new().parse_report("class X {\n}\nX -- X\nX \"1\" --> \"*\" X");
    assert!(report.diagram.relationships.is_empty());
}

#[test]
fn test_self_relationship_in_model_is_not_printed() {
    let diagram = Diagram {
        classes: vec![ClassEntity::new("X")],
        relationships: vec![Relationship::new("X", "X", RelationshipKind::Association)],
        associations: vec![],
    };
    assert_eq!(
        NotationPrinter::new().print(&diagram),
        "@startuml\nclass X {\n}\n@enduml"
    );
}

#[test]
fn test_duplicate_relationship_printed_once() {
    let relationship = Relationship::new("A", "B", RelationshipKind::Composition)
        .with_multiplicities(Multiplicity::Exactly1, Multiplicity::OneOrMany);
    let diagram = Diagram {
        classes: vec![ClassEntity::new("A"), ClassEntity::new("B")],
        relationships: vec![relationship.clone(), relationship],
        associations: vec![],
    };
    let (text, diagnostics) = NotationPrinter::new().print_with_diagnostics(&diagram);
    assert_eq!(text.matches("*--").count(), 1);
    assert_eq!(count_kind(&diagnostics, DiagnosticKind::DuplicateEntry), 1);
}

#[test]
fn test_duplicates_differing_only_in_label_keep_first() {
    let base = Relationship::new("A", "B", RelationshipKind::Association);
    let diagram = Diagram {
        classes: vec![ClassEntity::new("A"), ClassEntity::new("B")],
        relationships: vec![base.clone().with_label("first"), base.with_label("second")],
        associations: vec![],
    };
    let text = NotationPrinter::new().print(&diagram);
    assert!(text.contains("A -- B : first"));
    assert!(!text.contains("second"));
}

#[test]
fn test_unknown_kind_is_dropped_with_diagnostic() {
    let diagram = Diagram {
        classes: vec![ClassEntity::new("A"), ClassEntity::new("B")],
        relationships: vec![Relationship::new("A", "B", "friendship".to_string())],
        associations: vec![],
    };
    let (text, diagnostics) = NotationPrinter::new().print_with_diagnostics(&diagram);
    assert_eq!(text, "@startuml\nclass A {\n}\nclass B {\n}\n@enduml");
    assert_eq!(
        count_kind(&diagnostics, DiagnosticKind::UnknownRelationshipKind),
        1
    );
}
