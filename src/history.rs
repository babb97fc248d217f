//! Workspace visit history and the `workspace_toggle` custom command.
//!
//! Every workspace focus event pushes the newly focused workspace onto the
//! front of a bounded [`WorkspaceHistory`].  Binding
//!
//! ```text
//! bindsym $mod+Tab #workspace_toggle 1
//! ```
//!
//! then jumps back to the workspace at history offset `1`.
//!
//! # Offsets
//!
//! Offset `0` is the most recently recorded entry.  Because the focus event
//! for the current workspace arrives before any toggle is requested, offset
//! `0` is normally the workspace you are already on and offset `1` is the one
//! you came from.  Toggling removes the entry; switching to it records it
//! again at the front, so repeating `#workspace_toggle 1` alternates between
//! two workspaces.

use crate::command::{workspace_command, Event};
use crate::dispatcher::{Context, CustomDispatcher, HandlerError};
use crate::traits::{Notifier, WindowManager};
use log::debug;
use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Default number of remembered visits.
pub const DEFAULT_CAPACITY: usize = 10;

/// Name of the custom command registered by [`WorkspaceHistoryToggle`].
pub const TOGGLE_COMMAND: &str = "workspace_toggle";

/// Bounded list of visited workspace names, most recent first.
///
/// Entries are not deduplicated: each one is a separate visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for WorkspaceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl WorkspaceHistory {
    /// Create an empty history holding at most `capacity` entries
    /// (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a history whose only entry is `initial`, if any.
    pub fn seeded(capacity: usize, initial: Option<String>) -> Self {
        let mut history = Self::new(capacity);
        if let Some(name) = initial {
            history.record(name);
        }
        history
    }

    /// Record a visit at the front, evicting the oldest entry when full.
    pub fn record(&mut self, name: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(name.into());
    }

    /// Remove and return the entry at `offset`, or `None` if the history
    /// does not reach that far back.
    pub fn take(&mut self, offset: usize) -> Option<String> {
        self.entries.remove(offset)
    }

    pub fn get(&self, offset: usize) -> Option<&str> {
        self.entries.get(offset).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Record the newly focused workspace from a focus event.  Other events
    /// are ignored.
    pub fn on_workspace_focus(&mut self, event: &Event) {
        if let Event::WorkspaceFocus {
            current: Some(name),
        } = event
        {
            debug!("workspace history: visited {:?}", name);
            self.record(name.as_str());
        }
    }

    /// Parse and run a `workspace_toggle <offset>` statement.
    ///
    /// Integer offsets that are negative or too large to index the history
    /// are out of range like any other and issue nothing.
    pub fn on_toggle_command(&mut self, command: &str, ctx: &mut Context) -> Result<(), HandlerError> {
        match parse_toggle_offset(command)? {
            Some(offset) => {
                self.toggle(offset, ctx);
            }
            None => debug!("workspace history: offset in {:?} is out of range", command),
        }
        Ok(())
    }

    /// Switch back to the workspace at `offset`, removing it from the
    /// history.
    ///
    /// Out-of-range offsets are a silent no-op.  Returns whether a switch was
    /// issued.
    pub fn toggle(&mut self, offset: usize, ctx: &mut Context) -> bool {
        match self.take(offset) {
            Some(name) => {
                debug!("workspace history: toggling back {} to {:?}", offset, name);
                ctx.command(workspace_command(&name));
                true
            }
            None => {
                debug!(
                    "workspace history: offset {} beyond {} recorded entries",
                    offset,
                    self.len()
                );
                false
            }
        }
    }
}

/// Extract the offset from `"workspace_toggle <integer>"`.
///
/// Any optionally signed run of ASCII digits is an integer.  Returns
/// `Ok(None)` when that integer cannot be an index (negative, or wider than
/// `usize`).
fn parse_toggle_offset(command: &str) -> Result<Option<usize>, HandlerError> {
    let mut args = command.split_whitespace().skip(1);
    let arg = args.next().ok_or_else(|| {
        HandlerError::InvalidArgument(format!(
            "While parsing {} args, expected an int but got nothing",
            TOGGLE_COMMAND
        ))
    })?;

    let (negative, digits) = match arg.as_bytes().first() {
        Some(b'-') => (true, &arg[1..]),
        Some(b'+') => (false, &arg[1..]),
        _ => (false, arg),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HandlerError::InvalidArgument(format!(
            "While parsing {} args, expected an int but got '{}'",
            TOGGLE_COMMAND, arg
        )));
    }

    if negative && digits.bytes().any(|b| b != b'0') {
        return Ok(None);
    }
    Ok(digits.parse::<usize>().ok())
}

/// The workspace history feature, wired into a [`CustomDispatcher`].
///
/// Holds the history shared between the focus listener and the
/// `workspace_toggle` handler.
#[derive(Debug, Clone)]
pub struct WorkspaceHistoryToggle {
    history: Rc<RefCell<WorkspaceHistory>>,
}

impl WorkspaceHistoryToggle {
    /// Subscribe to focus events and register [`TOGGLE_COMMAND`].
    ///
    /// `initial` is the workspace focused at startup.
    pub fn install<W, N>(
        dispatcher: &mut CustomDispatcher<W, N>,
        initial: Option<String>,
        capacity: usize,
    ) -> Self
    where
        W: WindowManager,
        N: Notifier,
    {
        let history = Rc::new(RefCell::new(WorkspaceHistory::seeded(capacity, initial)));

        let listener_history = Rc::clone(&history);
        dispatcher.subscribe(move |event, _| listener_history.borrow_mut().on_workspace_focus(event));

        let handler_history = Rc::clone(&history);
        dispatcher.register(TOGGLE_COMMAND, move |command, ctx| {
            handler_history.borrow_mut().on_toggle_command(command, ctx)
        });

        Self { history }
    }

    /// Current history snapshot.
    pub fn history(&self) -> Ref<'_, WorkspaceHistory> {
        self.history.borrow()
    }
}
