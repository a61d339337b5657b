//! Bidirectional synchronization between the model and its notation
//!
//! A local edit flows model → text → peers. A remote update flows
//! text → model and must not travel back out, otherwise two sessions would
//! bounce the same document between each other forever.

use tracing::{debug, span, trace, Level};

use super::command::Command;
use crate::core::DiagramError;
use crate::model::{Diagram, Mutation};
use crate::notation::{NotationParser, NotationPrinter, Report};

/// Outbound channel to the other sessions
pub trait Broadcaster {
    fn publish(&mut self, document: &str);
}

/// Preview surface that displays the current notation
pub trait RenderSink {
    fn render(&mut self, document: &str);
}

/// Collaborator that drops everything it receives
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl Broadcaster for Discard {
    fn publish(&mut self, _document: &str) {}
}

impl RenderSink for Discard {
    fn render(&mut self, _document: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// A remote document is being applied; nothing may be published
    SuppressingEcho,
}

/// Owns the diagram and serializes every change to it
pub struct SyncCoordinator<B: Broadcaster, R: RenderSink> {
    diagram: Diagram,
    parser: NotationParser,
    printer: NotationPrinter,
    broadcaster: B,
    sink: R,
    state: SyncState,
}

impl<B: Broadcaster, R: RenderSink> SyncCoordinator<B, R> {
    pub fn new(broadcaster: B, sink: R) -> Self {
        Self {
            diagram: Diagram::new(),
            parser: NotationParser::new(),
            printer: NotationPrinter::new(),
            broadcaster,
            sink,
            state: SyncState::Idle,
        }
    }

    pub fn with_parser(mut self, parser: NotationParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_printer(mut self, printer: NotationPrinter) -> Self {
        self.printer = printer;
        self
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Current notation of the diagram
    pub fn document(&self) -> String {
        self.printer.print(&self.diagram)
    }

    /// Apply an edit made in this session
    ///
    /// Publishes and renders the new document only when the diagram changed.
    pub fn apply_local(&mut self, mutation: Mutation) -> Result<bool, DiagramError> {
        let span = span!(Level::INFO, "apply_local", mutation = mutation.name());
        let _enter = span.enter();

        self.commit(mutation)
    }

    /// Decode a structured command and apply it as a local edit
    pub fn apply_command(&mut self, command: &Command) -> Result<bool, DiagramError> {
        let mutation = command.to_mutation(self.parser.lexicon())?;
        self.apply_local(mutation)
    }

    /// Apply a document received from another session
    ///
    /// The diagram is replaced by the parsed document and the received text
    /// is rendered as-is. Nothing is published.
    pub fn on_remote_update(&mut self, document: &str) -> Report {
        let span = span!(Level::INFO, "on_remote_update", bytes = document.len());
        let _enter = span.enter();

        self.state = SyncState::SuppressingEcho;
        let report = self.parser.parse_report(document);
        if let Err(err) = self.commit(Mutation::Replace(report.diagram.clone())) {
            debug!(error = %err, "Remote document rejected");
        }
        self.sink.render(document);
        self.state = SyncState::Idle;

        debug!(
            classes = report.diagram.classes.len(),
            diagnostics = report.diagnostics.len(),
            "Remote update applied"
        );
        report
    }

    fn commit(&mut self, mutation: Mutation) -> Result<bool, DiagramError> {
        let changed = self.diagram.apply(mutation)?;
        if !changed {
            trace!("Mutation left the diagram unchanged");
            return Ok(false);
        }

        match self.state {
            SyncState::Idle => {
                let document = self.printer.print(&self.diagram);
                self.broadcaster.publish(&document);
                self.sink.render(&document);
                trace!(bytes = document.len(), "Published local change");
            }
            SyncState::SuppressingEcho => {
                debug!("Suppressing echo of remote update");
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::Action;

    #[derive(Default)]
    struct Recorder {
        documents: Vec<String>,
    }

    impl Broadcaster for Recorder {
        fn publish(&mut self, document: &str) {
            self.documents.push(document.to_string());
        }
    }

    impl RenderSink for Recorder {
        fn render(&mut self, document: &str) {
            self.documents.push(document.to_string());
        }
    }

    fn coordinator() -> SyncCoordinator<Recorder, Recorder> {
        SyncCoordinator::new(Recorder::default(), Recorder::default())
    }

    fn add_class(name: &str) -> Mutation {
        Mutation::AddClass {
            name: name.to_string(),
            attributes: vec![],
        }
    }

    #[test]
    fn test_local_change_is_published_and_rendered() {
        let mut sync = coordinator();
        assert!(sync.apply_local(add_class("User")).unwrap());

        assert_eq!(sync.broadcaster().documents.len(), 1);
        assert_eq!(sync.sink().documents.len(), 1);
        assert!(sync.broadcaster().documents[0].contains("class User"));
        assert_eq!(sync.broadcaster().documents[0], sync.document());
    }

    #[test]
    fn test_rejected_and_noop_changes_emit_nothing() {
        let mut sync = coordinator();
        assert!(sync.apply_local(add_class("lowercase")).is_err());
        assert!(!sync.apply_local(Mutation::Clear).unwrap());
        assert!(sync.broadcaster().documents.is_empty());
        assert!(sync.sink().documents.is_empty());
    }

    #[test]
    fn test_remote_update_is_not_rebroadcast() {
        let mut sync = coordinator();
        let text = "@startuml\nclass A {\n}\nclass B {\n}\nA \"1\" --> \"0..*\" B\n@enduml";
        let report = sync.on_remote_update(text);

        assert!(report.is_clean());
        assert!(sync.broadcaster().documents.is_empty());
        assert_eq!(sync.sink().documents, vec![text.to_string()]);
        assert_eq!(sync.diagram().classes.len(), 2);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn test_local_change_after_remote_update_publishes_again() {
        let mut sync = coordinator();
        sync.on_remote_update("@startuml\nclass A {\n}\n@enduml");
        sync.apply_local(add_class("B")).unwrap();
        assert_eq!(sync.broadcaster().documents.len(), 1);
        assert!(sync.broadcaster().documents[0].contains("class A"));
    }

    #[test]
    fn test_apply_command() {
        let mut sync = coordinator();
        let mut command = Command::new(Action::AddTable);
        command.table_name = Some("producto".to_string());
        assert!(sync.apply_command(&command).unwrap());
        assert!(sync.diagram().has_class("Producto"));
    }
}
