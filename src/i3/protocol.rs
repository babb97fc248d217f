//! The i3 IPC wire format.
//!
//! Every message, in both directions, is
//!
//! | Bytes | Content                                  |
//! |-------|------------------------------------------|
//! | 6     | magic string `i3-ipc`                    |
//! | 4     | payload length (native byte order)       |
//! | 4     | message type (native byte order)         |
//! | n     | JSON payload                             |
//!
//! Replies carry the type of the request they answer.  Events have the
//! high bit of the type set.

use super::I3Error;
use crate::command::{CommandOutcome, Event};
use serde::Deserialize;
use std::io::{ErrorKind, Read, Write};

pub const MAGIC: &[u8; 6] = b"i3-ipc";
pub const HEADER_LEN: usize = 14;

/// Largest payload accepted from the peer.
pub const MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

pub const RUN_COMMAND: u32 = 0;
pub const GET_WORKSPACES: u32 = 1;
pub const SUBSCRIBE: u32 = 2;

pub const EVENT_MASK: u32 = 1 << 31;
pub const EVENT_WORKSPACE: u32 = EVENT_MASK;
pub const EVENT_BINDING: u32 = EVENT_MASK | 5;
pub const EVENT_SHUTDOWN: u32 = EVENT_MASK | 6;

/// Event names passed to `SUBSCRIBE`.
pub const SUBSCRIPTIONS: [&str; 3] = ["workspace", "binding", "shutdown"];

/// A decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub msg_type: u32,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn is_event(&self) -> bool {
        self.msg_type & EVENT_MASK != 0
    }
}

/// Encode one message.
pub fn encode(msg_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    buf.extend_from_slice(&msg_type.to_ne_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Write one message to `w`.
pub fn write_message<W: Write>(w: &mut W, msg_type: u32, payload: &[u8]) -> Result<(), I3Error> {
    w.write_all(&encode(msg_type, payload))
        .map_err(|e| I3Error(format!("write: {}", e)))
}

/// Read one message from `r`.
///
/// Returns `Ok(None)` when the peer closed the connection.  Payloads longer
/// than [`MAX_PAYLOAD_LEN`] are rejected before anything is allocated.
pub fn read_message<R: Read>(r: &mut R) -> Result<Option<Message>, I3Error> {
    let mut header = [0u8; HEADER_LEN];
    match r.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(I3Error(format!("read: {}", e))),
    }
    if &header[..6] != MAGIC {
        return Err(I3Error(format!("bad magic: {:?}", &header[..6])));
    }
    let len = u32::from_ne_bytes([header[6], header[7], header[8], header[9]]) as usize;
    let msg_type = u32::from_ne_bytes([header[10], header[11], header[12], header[13]]);

    if len > MAX_PAYLOAD_LEN {
        return Err(I3Error(format!(
            "payload of {} bytes exceeds the {} byte limit",
            len, MAX_PAYLOAD_LEN
        )));
    }

    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)
        .map_err(|e| I3Error(format!("read payload: {}", e)))?;
    Ok(Some(Message { msg_type, payload }))
}

//  Minimal serde structs for the JSON we care about

/// One entry of a `RUN_COMMAND` reply.
#[derive(Deserialize)]
struct CommandReplyJson {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Subset of one entry of a `GET_WORKSPACES` reply.
#[derive(Deserialize)]
struct WorkspaceJson {
    name: String,
    focused: bool,
}

#[derive(Deserialize)]
struct SubscribeReplyJson {
    success: bool,
}

#[derive(Deserialize)]
struct NodeJson {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct WorkspaceEventJson {
    change: String,
    #[serde(default)]
    current: Option<NodeJson>,
}

#[derive(Deserialize)]
struct BindingJson {
    command: String,
}

#[derive(Deserialize)]
struct BindingEventJson {
    change: String,
    binding: BindingJson,
}

fn parse<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T, I3Error> {
    serde_json::from_slice(payload).map_err(|e| I3Error(format!("parse: {}", e)))
}

/// Decode a `RUN_COMMAND` reply.
pub fn parse_command_reply(payload: &[u8]) -> Result<Vec<CommandOutcome>, I3Error> {
    let replies: Vec<CommandReplyJson> = parse(payload)?;
    Ok(replies
        .into_iter()
        .map(|r| CommandOutcome {
            success: r.success,
            error: r.error,
        })
        .collect())
}

/// Decode a `GET_WORKSPACES` reply and return the focused workspace's name.
pub fn parse_focused_workspace(payload: &[u8]) -> Result<Option<String>, I3Error> {
    let workspaces: Vec<WorkspaceJson> = parse(payload)?;
    Ok(workspaces.into_iter().find(|w| w.focused).map(|w| w.name))
}

/// Decode a `SUBSCRIBE` reply.
pub fn parse_subscribe_reply(payload: &[u8]) -> Result<bool, I3Error> {
    let reply: SubscribeReplyJson = parse(payload)?;
    Ok(reply.success)
}

/// Translate an event message into an [`Event`].
///
/// Returns `Ok(None)` for events the daemon does not react to (other
/// workspace changes, unknown event types).
pub fn parse_event(msg_type: u32, payload: &[u8]) -> Result<Option<Event>, I3Error> {
    match msg_type {
        EVENT_WORKSPACE => {
            let ev: WorkspaceEventJson = parse(payload)?;
            if ev.change != "focus" {
                return Ok(None);
            }
            Ok(Some(Event::WorkspaceFocus {
                current: ev.current.and_then(|n| n.name),
            }))
        }
        EVENT_BINDING => {
            let ev: BindingEventJson = parse(payload)?;
            if ev.change != "run" {
                return Ok(None);
            }
            Ok(Some(Event::Binding {
                command: ev.binding.command,
            }))
        }
        EVENT_SHUTDOWN => Ok(Some(Event::Shutdown)),
        _ => Ok(None),
    }
}
