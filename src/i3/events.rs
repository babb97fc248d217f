//! [`EventSource`] that subscribes to i3's event stream.
//!
//! A dedicated IPC connection is opened, `SUBSCRIBE` is sent for
//! [`SUBSCRIPTIONS`], and every event that arrives afterwards is decoded
//! into an [`Event`] and forwarded to the sink.

use super::protocol::{self, SUBSCRIBE, SUBSCRIPTIONS};
use super::I3Error;
use crate::command::Event;
use crate::traits::EventSource;
use log::{debug, info, warn};
use std::io::BufReader;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Listens to workspace, binding and shutdown events on the i3 socket.
pub struct I3EventSource {
    path: PathBuf,
}

impl I3EventSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn subscribe(&self, stream: &mut UnixStream) -> Result<(), I3Error> {
        let payload = serde_json::to_vec(&SUBSCRIPTIONS)
            .map_err(|e| I3Error(format!("encode subscription: {}", e)))?;
        protocol::write_message(stream, SUBSCRIBE, &payload)?;

        let reply = protocol::read_message(stream)?
            .ok_or_else(|| I3Error("connection closed before subscribe reply".into()))?;
        if reply.msg_type != SUBSCRIBE || !protocol::parse_subscribe_reply(&reply.payload)? {
            return Err(I3Error(format!("subscription to {:?} refused", SUBSCRIPTIONS)));
        }
        Ok(())
    }
}

impl EventSource for I3EventSource {
    type Error = I3Error;

    /// Subscribe and forward events until i3 closes the connection or the
    /// sink is dropped.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Event>) -> Result<(), Self::Error> {
        let mut stream = UnixStream::connect(&self.path)
            .map_err(|e| I3Error(format!("connect to {}: {}", self.path.display(), e)))?;
        self.subscribe(&mut stream)?;
        info!("subscribed to {:?} on {}", SUBSCRIPTIONS, self.path.display());

        let mut reader = BufReader::new(stream);
        while let Some(message) = protocol::read_message(&mut reader)? {
            if !message.is_event() {
                debug!("ignoring reply of type {}", message.msg_type);
                continue;
            }
            match protocol::parse_event(message.msg_type, &message.payload) {
                Ok(Some(event)) => {
                    debug!("received {:?}", event);
                    if sink.send(event).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("bad event of type {:#x}: {}", message.msg_type, e),
            }
        }

        warn!("i3 event stream ended");
        Ok(())
    }
}
