//! **i3custom**: custom key-bindable commands for i3 and sway.
//!
//! Statements prefixed with `#` in a binding are routed to handlers
//! registered with the daemon instead of to the window manager, so native
//! and custom commands can be mixed freely:
//!
//! ```text
//! bindsym $mod+Tab workspace back_and_forth; #workspace_toggle 2
//! ```
//!
//! # Architecture
//!
//! The crate is organised around three traits:
//!
//! * [`traits::WindowManager`]: executes native commands and answers
//!   queries, so the dispatcher is not coupled to any specific IPC client.
//! * [`traits::EventSource`]: delivers native events (bindings, workspace
//!   focus) so the main loop is not coupled to any transport.
//! * [`traits::Notifier`]: shows error messages to the user.
//!
//! [`dispatcher::CustomDispatcher`] is the core.  Features such as
//! [`history::WorkspaceHistoryToggle`] register custom commands and event
//! listeners with it.  Concrete backends live in [`i3`] (IPC) and
//! [`notify`] (nagbar).

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod history;
pub mod i3;
pub mod notify;
pub mod traits;
