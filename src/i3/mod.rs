//! i3-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WindowManager`](crate::traits::WindowManager) and
//! [`EventSource`](crate::traits::EventSource) traits, powered by i3's IPC
//! socket.  sway speaks the same protocol, so everything here works there
//! too.
//!
//! Nothing outside this module should reference i3 directly.

pub mod events;
pub mod protocol;
pub mod wm;

use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors that can occur when talking to i3.
#[derive(Debug, thiserror::Error)]
#[error("i3 IPC error: {0}")]
pub struct I3Error(pub(crate) String);

/// Resolve the IPC socket path.
///
/// Uses `configured` when given, then `$I3SOCK`, then `$SWAYSOCK`, and
/// finally asks `i3 --get-socketpath`.
pub fn socket_path(configured: Option<&Path>) -> Result<PathBuf, I3Error> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    for var in ["I3SOCK", "SWAYSOCK"] {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                return Ok(PathBuf::from(value.trim()));
            }
        }
    }

    let output = Command::new("i3")
        .arg("--get-socketpath")
        .output()
        .map_err(|e| I3Error(format!("run i3 --get-socketpath: {}", e)))?;
    if !output.status.success() {
        return Err(I3Error(format!(
            "i3 --get-socketpath exited with {}",
            output.status
        )));
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        return Err(I3Error("i3 --get-socketpath printed nothing".into()));
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_wins() {
        let path = socket_path(Some(Path::new("/tmp/configured.sock"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/configured.sock"));
    }
}
