//! Command strings and events shared by every component.
//!
//! A bound key in the i3 config can mix native and custom statements:
//!
//! ```text
//! bindsym $mod+Tab workspace back_and_forth; #workspace_toggle 1
//! ```
//!
//! Statements are separated by [`STATEMENT_SEPARATOR`].  A statement whose
//! first non-blank character is [`CUSTOM_MARKER`] is a *custom* statement and
//! is routed to a registered handler; everything else is passed to the window
//! manager unchanged.

use std::fmt;

/// Marks a statement as custom.  Stripped before handler lookup.
pub const CUSTOM_MARKER: char = '#';

/// Separates statements inside one command string.
pub const STATEMENT_SEPARATOR: char = ';';

/// One trimmed statement of a command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    /// Passed verbatim to the window manager.
    Native(&'a str),
    /// Custom statement with the marker already stripped, e.g.
    /// `"workspace_toggle 1"`.
    Custom(&'a str),
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Native(s) => write!(f, "{}", s),
            Statement::Custom(s) => write!(f, "{}{}", CUSTOM_MARKER, s),
        }
    }
}

/// Split `command` into statements, left to right.
///
/// Each piece is trimmed; empty pieces (a trailing `;`, `;;`) are skipped.
pub fn split_statements(command: &str) -> impl Iterator<Item = Statement<'_>> {
    command
        .split(STATEMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(CUSTOM_MARKER) {
            Some(custom) => Statement::Custom(custom.trim_start()),
            None => Statement::Native(s),
        })
}

/// The part of a bound command that i3 has not already executed.
///
/// i3 runs the whole binding itself before announcing it, treating a custom
/// statement as an error and skipping the rest.  Everything from the first
/// marker onwards therefore still needs handling.  Returns `None` when the
/// binding contains no marker at all.
pub fn unprocessed_tail(binding_command: &str) -> Option<&str> {
    binding_command
        .find(CUSTOM_MARKER)
        .map(|idx| &binding_command[idx..])
}

/// First whitespace-delimited token of a custom statement.
pub fn base_command(statement: &str) -> Option<&str> {
    statement.split_whitespace().next()
}

/// Native window-manager events the daemon reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key binding fired.  `command` is the full bound command text.
    Binding { command: String },

    /// Focus moved to another workspace.  `current` is the name of the newly
    /// focused workspace when the window manager reported one.
    WorkspaceFocus { current: Option<String> },

    /// The window manager is exiting or restarting.
    Shutdown,
}

/// Result of one native command as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Human-readable reason when `success` is false.
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Format the native command that focuses workspace `name`.
///
/// Quotes inside `name` are not escaped.
pub fn workspace_command(name: &str) -> String {
    format!("workspace \"{}\"", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(s: &str) -> Vec<Statement<'_>> {
        split_statements(s).collect()
    }

    #[test]
    fn mixed_statements_keep_order() {
        assert_eq!(
            split("workspace 3; #workspace_toggle 1"),
            vec![
                Statement::Native("workspace 3"),
                Statement::Custom("workspace_toggle 1"),
            ]
        );
    }

    #[test]
    fn custom_first_then_native() {
        assert_eq!(
            split("#show_history; workspace History"),
            vec![
                Statement::Custom("show_history"),
                Statement::Native("workspace History"),
            ]
        );
    }

    #[test]
    fn empty_statements_are_skipped() {
        assert_eq!(
            split(" ; nop;; #a ;"),
            vec![Statement::Native("nop"), Statement::Custom("a")]
        );
        assert!(split("").is_empty());
    }

    #[test]
    fn marker_only_counts_at_statement_start() {
        assert_eq!(
            split("exec echo '#not custom'"),
            vec![Statement::Native("exec echo '#not custom'")]
        );
    }

    #[test]
    fn unprocessed_tail_starts_at_first_marker() {
        assert_eq!(unprocessed_tail("workspace 1"), None);
        assert_eq!(unprocessed_tail("#a"), Some("#a"));
        assert_eq!(
            unprocessed_tail("nop; #a 1; workspace 2; #b"),
            Some("#a 1; workspace 2; #b")
        );
    }

    #[test]
    fn base_command_is_first_token() {
        assert_eq!(base_command("workspace_toggle 1"), Some("workspace_toggle"));
        assert_eq!(base_command("  spaced\targs "), Some("spaced"));
        assert_eq!(base_command("   "), None);
    }

    #[test]
    fn statement_display_restores_marker() {
        assert_eq!(Statement::Custom("x 1").to_string(), "#x 1");
        assert_eq!(Statement::Native("nop").to_string(), "nop");
    }

    #[test]
    fn workspace_command_quotes_name() {
        assert_eq!(workspace_command("2: web"), "workspace \"2: web\"");
    }
}
