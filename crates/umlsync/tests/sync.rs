//! Sync coordinator behavior across two sessions

use std::cell::RefCell;
use std::rc::Rc;

use umlsync::model::{Mutation, Relationship};
use umlsync::sync::{Broadcaster, Command, Discard, RenderSink, SyncCoordinator, SyncState};
use umlsync::RelationshipKind;

/// Shared outbox standing in for the network channel
#[derive(Clone, Default)]
struct Channel {
    sent: Rc<RefCell<Vec<String>>>,
}

impl Broadcaster for Channel {
    fn publish(&mut self, document: &str) {
        self.sent.borrow_mut().push(document.to_string());
    }
}

#[derive(Default)]
struct Preview {
    frames: Vec<String>,
}

impl RenderSink for Preview {
    fn render(&mut self, document: &str) {
        self.frames.push(document.to_string());
    }
}

fn add_class(name: &str) -> Mutation {
    Mutation::AddClass {
        name: name.to_string(),
        attributes: vec![],
    }
}

#[test]
fn test_two_sessions_converge_without_echo() {
    let alice_out = Channel::default();
    let bob_out = Channel::default();
    let mut alice = SyncCoordinator::new(alice_out.clone(), Preview::default());
    let mut bob = SyncCoordinator::new(bob_out.clone(), Preview::default());

    alice.apply_local(add_class("User")).unwrap();
    alice.apply_local(add_class("Order")).unwrap();
    alice
        .apply_local(Mutation::AddRelationship(
            Relationship::new("User", "Order", RelationshipKind::DirectedAssociation)
                .with_label("places"),
        ))
        .unwrap();
    assert_eq!(alice_out.sent.borrow().len(), 3);

    // Deliver every message to Bob
    let messages: Vec<String> = alice_out.sent.borrow().clone();
    for message in &messages {
        let report = bob.on_remote_update(message);
        assert!(report.is_clean());
    }

    assert!(bob_out.sent.borrow().is_empty());
    assert_eq!(bob.diagram(), alice.diagram());
    assert_eq!(bob.sink().frames, messages);
    assert_eq!(bob.state(), SyncState::Idle);
}

#[test]
fn test_remote_update_never_rebroadcast() {
    let out = Channel::default();
    let mut session = SyncCoordinator::new(out.clone(), Discard);

    let update = "@startuml\nclass A {\n}\nclass B {\n}\nA -- B\n@enduml";
    session.on_remote_update(update);
    session.on_remote_update(update);
    session.on_remote_update("@startuml\n@enduml");

    assert!(out.sent.borrow().is_empty());
    assert!(session.diagram().is_empty());
}

#[test]
fn test_commands_drive_local_edits() {
    let out = Channel::default();
    let mut session = SyncCoordinator::new(out.clone(), Discard);

    let commands = Command::batch_from_json(
        r#"[
            {"action": "agregar_tabla", "tableName": "estudiante"},
            {"action": "addTable", "tableName": "curso"},
            {"action": "addAttribute", "tableName": "curso", "attributeName": "titulo"},
            {"action": "agregar_asociacion", "fromTable": "estudiante", "toTable": "curso",
             "associationClass": "matricula"}
        ]"#,
    )
    .unwrap();
    for command in &commands {
        session.apply_command(command).unwrap();
    }

    assert_eq!(out.sent.borrow().len(), 4);
    let last = out.sent.borrow().last().cloned().unwrap();
    assert!(last.contains("(Estudiante, Curso) .. Matricula"));
    assert!(session.diagram().has_class("Matricula"));
}

#[test]
fn test_rejected_command_keeps_state() {
    let out = Channel::default();
    let mut session = SyncCoordinator::new(out.clone(), Discard);
    session.apply_local(add_class("User")).unwrap();

    let duplicate = Command::from_json(r#"{"action": "addTable", "tableName": "user"}"#).unwrap();
    assert!(session.apply_command(&duplicate).is_err());
    assert_eq!(out.sent.borrow().len(), 1);
    assert_eq!(session.diagram().classes.len(), 1);
}
