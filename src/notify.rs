//! [`Notifier`] implementation that launches an external program, by default
//! `i3-nagbar -m <message>`.

use crate::config::NotifierConfig;
use crate::traits::Notifier;
use log::{debug, error};
use std::process::{Command, Stdio};

/// Shows messages by spawning a nagbar-like program.
///
/// The child is reaped on a background thread, so
/// [`show_message`](Notifier::show_message) returns immediately.
#[derive(Debug, Clone)]
pub struct Nagbar {
    program: String,
    args: Vec<String>,
}

impl Default for Nagbar {
    fn default() -> Self {
        Self::new(&NotifierConfig::default())
    }
}

impl Nagbar {
    pub fn new(config: &NotifierConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// The process that would display `message`.
    fn command(&self, message: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        cmd
    }
}

impl Notifier for Nagbar {
    fn show_message(&self, message: &str) {
        debug!("showing message via {}: {}", self.program, message);
        match self.command(message).spawn() {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => error!("failed to launch {}: {}", self.program, e),
        }
    }
}
