//! The custom-command dispatcher that sits between the window manager's event
//! stream and its command executor.
//!
//! [`CustomDispatcher`] owns the [`Registry`] of custom command handlers and
//! reacts to [`Event`]s by running event listeners, intercepting key
//! bindings, and routing each statement of a command string either to the
//! [`WindowManager`] or to a registered handler.
//!
//! Custom statements are written with a leading `#` in the i3 config.  Any of
//! the following binds the `show_history` custom command:
//!
//! ```text
//! bindsym $mod+h #show_history
//! bindsym $mod+h nop; #show_history
//! bindsym $mod+h workspace History; #show_history
//! bindsym $mod+h #show_history; workspace History
//! ```

use crate::command::{base_command, split_statements, unprocessed_tail, Event, Statement, CUSTOM_MARKER};
use crate::traits::{Notifier, WindowManager};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;

/// How deep follow-up commands may nest before the chain is aborted.
pub const MAX_FOLLOWUP_DEPTH: usize = 16;

/// Errors a custom command handler may return.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler could not parse its arguments.  Recovered and shown to
    /// the user.
    #[error("{0}")]
    InvalidArgument(String),

    /// The handler does not support the requested operation.  Recovered and
    /// shown to the user.
    #[error("{0}")]
    NotImplemented(String),

    /// Anything else.  Propagates out of the dispatcher.
    #[error("{0}")]
    Failed(String),
}

/// Possible errors from the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No handler is registered under the statement's command name.
    #[error("There is no handler registered for the command '{0}'")]
    CommandNotFound(String),

    /// The handler itself failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// The window manager could not be reached.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

impl DispatchError {
    /// Whether this error is an expected user mistake that should be shown
    /// to the user instead of aborting the event loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DispatchError::CommandNotFound(_)
                | DispatchError::Handler(HandlerError::InvalidArgument(_))
                | DispatchError::Handler(HandlerError::NotImplemented(_))
        )
    }
}

/// Follow-up commands queued by a handler or listener.
///
/// Queued commands are run through [`CustomDispatcher::execute`] once the
/// handler returns, so they may mix native and custom statements.
#[derive(Debug, Default)]
pub struct Context {
    pending: Vec<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `command` for execution after the current handler returns.
    pub fn command(&mut self, command: impl Into<String>) {
        self.pending.push(command.into());
    }

    /// Commands queued so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.pending
    }

    fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

/// A custom command handler.  Receives the full statement (command name and
/// arguments, marker stripped) and parses its own arguments.
pub type Handler = Box<dyn FnMut(&str, &mut Context) -> Result<(), HandlerError>>;

/// A listener for native window-manager events.
pub type Listener = Box<dyn FnMut(&Event, &mut Context)>;

/// Name → handler lookup table.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `handler` under `name`.  Returns `true` if an earlier handler
    /// was replaced.
    pub fn insert(&mut self, name: String, handler: Handler) -> bool {
        self.handlers.insert(name, handler).is_some()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Handler> {
        self.handlers.get_mut(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// What the event loop should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Routes command strings to the window manager or to custom handlers.
///
/// The dispatcher is generic over any [`WindowManager`] and [`Notifier`],
/// making it independent of i3 or any concrete notification mechanism.
///
/// # Typical usage
///
/// ```ignore
/// let mut dispatcher = CustomDispatcher::new(I3Wm::new(path), Nagbar::default());
/// dispatcher.register("hello", |_, ctx| {
///     ctx.command("exec notify-send hello");
///     Ok(())
/// });
/// dispatcher.execute("workspace 1; #hello")?;
/// ```
pub struct CustomDispatcher<W: WindowManager, N: Notifier> {
    wm: W,
    notifier: N,
    registry: Registry,
    listeners: Vec<Listener>,
    /// Nesting level of the follow-up batch currently running.
    depth: usize,
}

impl<W: WindowManager, N: Notifier> CustomDispatcher<W, N> {
    pub fn new(wm: W, notifier: N) -> Self {
        Self {
            wm,
            notifier,
            registry: Registry::new(),
            listeners: Vec::new(),
            depth: 0,
        }
    }

    /// Shared reference to the underlying window manager.
    pub fn wm(&self) -> &W {
        &self.wm
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Register `handler` for the custom command `name`, replacing any
    /// handler already registered under that name.
    ///
    /// A leading `#` on `name` is accepted and ignored.  Empty names are
    /// rejected with a warning.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&str, &mut Context) -> Result<(), HandlerError> + 'static,
    {
        let name = name.trim();
        let name = name.strip_prefix(CUSTOM_MARKER).unwrap_or(name).trim();
        if name.is_empty() {
            warn!("ignoring custom command registration with an empty name");
            return;
        }
        if self.registry.insert(name.to_string(), Box::new(handler)) {
            info!("replaced handler for custom command {:?}", name);
        } else {
            debug!("registered custom command {:?}", name);
        }
    }

    /// Add a listener that sees every native event, in registration order,
    /// before bindings are intercepted.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Event, &mut Context) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Names of all registered custom commands, sorted.
    pub fn registered(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Process a single native [`Event`].
    ///
    /// Only unrecoverable errors are returned; command-not-found and
    /// argument errors have already been shown to the user.
    pub fn handle(&mut self, event: Event) -> Result<Flow, DispatchError> {
        let mut ctx = Context::new();
        for listener in &mut self.listeners {
            listener(&event, &mut ctx);
        }
        self.run_followups(ctx)?;

        match event {
            Event::Binding { command } => self.on_binding_event(&command)?,
            Event::WorkspaceFocus { .. } => {}
            Event::Shutdown => {
                info!("window manager is shutting down");
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    /// React to a key binding that fired with `command` bound to it.
    ///
    /// The window manager has already run everything up to the first custom
    /// marker, so only the rest is executed here.
    pub fn on_binding_event(&mut self, command: &str) -> Result<(), DispatchError> {
        match unprocessed_tail(command) {
            Some(tail) => {
                debug!("binding {:?} has custom statements: {:?}", command, tail);
                self.execute(tail)
            }
            None => Ok(()),
        }
    }

    /// Execute every statement in `command`, left to right.
    ///
    /// Native statements go to the window manager verbatim.  Custom
    /// statements are routed through [`dispatch_custom`](Self::dispatch_custom);
    /// a recoverable failure is shown to the user and execution continues
    /// with the next statement.
    pub fn execute(&mut self, command: &str) -> Result<(), DispatchError> {
        for statement in split_statements(command) {
            match statement {
                Statement::Native(native) => self.run_native(native)?,
                Statement::Custom(custom) => match self.dispatch_custom(custom) {
                    Ok(()) => {}
                    Err(e) if e.is_recoverable() => {
                        warn!("{}: {}", statement, e);
                        self.notifier.show_message(&e.to_string());
                    }
                    Err(e) => return Err(e),
                },
            }
        }
        Ok(())
    }

    /// Invoke the handler registered for the first token of `statement`.
    ///
    /// `statement` has its marker already stripped.  Any commands the handler
    /// queued are executed after it returns.
    pub fn dispatch_custom(&mut self, statement: &str) -> Result<(), DispatchError> {
        let name = base_command(statement).unwrap_or_default();
        let handler = self
            .registry
            .get_mut(name)
            .ok_or_else(|| DispatchError::CommandNotFound(name.to_string()))?;

        debug!("custom command {:?}", statement);
        let mut ctx = Context::new();
        handler(statement, &mut ctx)?;
        self.run_followups(ctx)
    }

    fn run_native(&self, command: &str) -> Result<(), DispatchError> {
        debug!("native command {:?}", command);
        let outcomes = self
            .wm
            .run_command(command)
            .map_err(|e| DispatchError::WindowManager(e.to_string()))?;
        for outcome in outcomes.iter().filter(|o| !o.success) {
            warn!(
                "window manager rejected {:?}: {}",
                command,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }

    /// Execute commands queued on `ctx`.  A handler that keeps queueing
    /// itself fails once the chain is [`MAX_FOLLOWUP_DEPTH`] levels deep.
    fn run_followups(&mut self, mut ctx: Context) -> Result<(), DispatchError> {
        let commands = ctx.take();
        if commands.is_empty() {
            return Ok(());
        }
        if self.depth >= MAX_FOLLOWUP_DEPTH {
            return Err(HandlerError::Failed(format!(
                "follow-up commands nested more than {} levels deep",
                MAX_FOLLOWUP_DEPTH
            ))
            .into());
        }

        self.depth += 1;
        let result = commands.iter().try_for_each(|command| self.execute(command));
        self.depth -= 1;
        result
    }
}

//  Tests
