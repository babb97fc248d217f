//! Core traits that decouple the dispatcher from any specific window manager,
//! event transport, or notification mechanism.
//!
//! Every concrete backend (i3 IPC, a process-spawning nagbar, a test
//! harness, …) implements one of these traits.  The
//! [`CustomDispatcher`](crate::dispatcher::CustomDispatcher) only depends on
//! these abstractions.

use crate::command::{CommandOutcome, Event};
use std::sync::mpsc;

/// Abstraction over a window manager that executes native commands.
///
/// An implementation might talk to i3 via IPC, or it might be a recording
/// stub used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Execute a native command string.
    ///
    /// The returned outcomes describe each command the window manager parsed
    /// out of `command`.  An `Err` means the command could not be delivered
    /// at all.
    fn run_command(&self, command: &str) -> Result<Vec<CommandOutcome>, Self::Error>;

    /// Return the name of the currently focused workspace, or `None` if no
    /// workspace is focused.
    fn focused_workspace(&self) -> Result<Option<String>, Self::Error>;
}

/// Displays a short message to the user.
///
/// Fire-and-forget: implementations must not block on the user dismissing
/// the message, and there is no way to report a failure back.
pub trait Notifier {
    fn show_message(&self, message: &str);
}

//  Event Source

/// A source of native window-manager [`Event`]s.
///
/// Implementations listen on some transport and forward decoded events into
/// the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Events are sent in the order the window manager emitted them.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Event`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Event>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    //  Mock WindowManager

    #[derive(Debug, Default)]
    struct MockWm {
        commands: RefCell<Vec<String>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    impl WindowManager for MockWm {
        type Error = MockError;

        fn run_command(&self, command: &str) -> Result<Vec<CommandOutcome>, MockError> {
            self.commands.borrow_mut().push(command.to_string());
            Ok(vec![CommandOutcome::ok()])
        }

        fn focused_workspace(&self) -> Result<Option<String>, MockError> {
            Ok(Some("1".into()))
        }
    }

    #[test]
    fn mock_wm_records_commands() {
        let wm = MockWm::default();
        let outcomes = wm.run_command("workspace 2").unwrap();
        assert_eq!(outcomes, vec![CommandOutcome::ok()]);
        assert_eq!(*wm.commands.borrow(), vec!["workspace 2".to_string()]);
    }

    //  Mock EventSource

    struct MockSource {
        events: Vec<Event>,
    }

    impl EventSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Event>) -> Result<(), MockError> {
            for event in self.events.drain(..) {
                let _ = sink.send(event);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_events_in_order() {
        let mut src = MockSource {
            events: vec![
                Event::WorkspaceFocus {
                    current: Some("2".into()),
                },
                Event::Binding {
                    command: "#workspace_toggle 1".into(),
                },
            ],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::WorkspaceFocus { .. }));
        assert!(matches!(events[1], Event::Binding { .. }));
    }
}
