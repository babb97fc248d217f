//! [`WindowManager`] implementation backed by i3 IPC.

use super::protocol::{self, GET_WORKSPACES, RUN_COMMAND};
use super::I3Error;
use crate::command::CommandOutcome;
use crate::traits::WindowManager;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// i3-backed window manager.
///
/// No connection is held open; each method call opens a short-lived IPC
/// connection, sends one request and reads its reply.
#[derive(Debug, Clone)]
pub struct I3Wm {
    path: PathBuf,
}

impl I3Wm {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Send one request and return the reply payload.
    fn request(&self, msg_type: u32, payload: &[u8]) -> Result<Vec<u8>, I3Error> {
        let mut stream = UnixStream::connect(&self.path)
            .map_err(|e| I3Error(format!("connect to {}: {}", self.path.display(), e)))?;
        protocol::write_message(&mut stream, msg_type, payload)?;

        let reply = protocol::read_message(&mut stream)?
            .ok_or_else(|| I3Error("connection closed before reply".into()))?;
        if reply.msg_type != msg_type {
            return Err(I3Error(format!(
                "expected reply type {}, got {}",
                msg_type, reply.msg_type
            )));
        }
        Ok(reply.payload)
    }
}

impl WindowManager for I3Wm {
    type Error = I3Error;

    fn run_command(&self, command: &str) -> Result<Vec<CommandOutcome>, Self::Error> {
        let reply = self.request(RUN_COMMAND, command.as_bytes())?;
        protocol::parse_command_reply(&reply)
    }

    fn focused_workspace(&self) -> Result<Option<String>, Self::Error> {
        let reply = self.request(GET_WORKSPACES, b"")?;
        protocol::parse_focused_workspace(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("i3custom-wm-test-{}-{}.sock", std::process::id(), id))
    }

    /// Serve exactly one request with `reply`, forwarding the received
    /// request to `seen`.
    fn serve_once(path: &Path, reply_type: u32, reply: &'static [u8], seen: mpsc::Sender<(u32, Vec<u8>)>) {
        let _ = std::fs::remove_file(path);
        let listener = UnixListener::bind(path).expect("bind");
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = protocol::read_message(&mut stream).unwrap().unwrap();
            let _ = seen.send((request.msg_type, request.payload));
            protocol::write_message(&mut stream, reply_type, reply).unwrap();
        });
    }

    #[test]
    fn run_command_sends_text_and_parses_reply() {
        let path = tmp_socket_path();
        let (tx, rx) = mpsc::channel();
        serve_once(&path, RUN_COMMAND, br#"[{"success":true}]"#, tx);

        let wm = I3Wm::new(&path);
        let outcomes = wm.run_command("workspace \"2\"").unwrap();
        assert_eq!(outcomes, vec![CommandOutcome::ok()]);

        let (msg_type, payload) = rx.recv().unwrap();
        assert_eq!(msg_type, RUN_COMMAND);
        assert_eq!(payload, b"workspace \"2\"");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn focused_workspace_queries_workspaces() {
        let path = tmp_socket_path();
        let (tx, rx) = mpsc::channel();
        serve_once(
            &path,
            GET_WORKSPACES,
            br#"[{"name":"1","focused":false},{"name":"mail","focused":true}]"#,
            tx,
        );

        let wm = I3Wm::new(&path);
        assert_eq!(wm.focused_workspace().unwrap(), Some("mail".into()));
        assert_eq!(rx.recv().unwrap().0, GET_WORKSPACES);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mismatched_reply_type_is_error() {
        let path = tmp_socket_path();
        let (tx, _rx) = mpsc::channel();
        serve_once(&path, GET_WORKSPACES, b"[]", tx);

        let wm = I3Wm::new(&path);
        assert!(wm.run_command("nop").is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_error() {
        let wm = I3Wm::new(tmp_socket_path());
        let err = wm.run_command("nop").unwrap_err();
        assert!(err.to_string().contains("connect to"));
    }
}
