//! Entry point for the **i3custom** daemon.
//!
//! Subscribes to i3 events on a background thread and processes them one at
//! a time on the main thread, where the dispatcher and all feature state
//! live.

use i3custom::command::Event;
use i3custom::config::Config;
use i3custom::dispatcher::{CustomDispatcher, Flow};
use i3custom::history::WorkspaceHistoryToggle;
use i3custom::i3::events::I3EventSource;
use i3custom::i3::wm::I3Wm;
use i3custom::i3::I3Error;
use i3custom::notify::Nagbar;
use i3custom::traits::{EventSource, Notifier, WindowManager};
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Resolve the config directory (`$XDG_CONFIG_HOME/i3custom`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("i3custom")
}

/// Try to load the config from `$XDG_CONFIG_HOME/i3custom/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();

    let socket = match i3custom::i3::socket_path(config.socket_path.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            error!("cannot find the i3 IPC socket: {}", e);
            std::process::exit(1);
        }
    };
    info!("using IPC socket {}", socket.display());

    let wm = I3Wm::new(&socket);
    let initial = match wm.focused_workspace() {
        Ok(ws) => ws,
        Err(e) => {
            error!("failed to query the focused workspace: {}", e);
            std::process::exit(1);
        }
    };

    let mut dispatcher = CustomDispatcher::new(wm, Nagbar::new(&config.notifier));
    let _history = WorkspaceHistoryToggle::install(&mut dispatcher, initial, config.history.capacity);
    info!("custom commands: {}", dispatcher.registered().join(", "));

    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let source = spawn_event_source(socket, event_tx);

    if run_event_loop(dispatcher, event_rx) == Flow::Exit {
        return;
    }

    // The channel only closes once the source thread has returned.
    match source.join() {
        Ok(Ok(())) => info!("event source closed, exiting"),
        Ok(Err(e)) => {
            error!("event source error: {}", e);
            std::process::exit(1);
        }
        Err(_) => {
            error!("event source thread panicked");
            std::process::exit(1);
        }
    }
}

fn spawn_event_source(socket: PathBuf, tx: mpsc::Sender<Event>) -> JoinHandle<Result<(), I3Error>> {
    std::thread::spawn(move || I3EventSource::new(&socket).run(tx))
}

/// Handle events until the window manager shuts down or the event source
/// closes.  Unrecoverable dispatch errors end the process.
///
/// Returns [`Flow::Exit`] on shutdown and [`Flow::Continue`] when the event
/// channel closed.
fn run_event_loop<W: WindowManager, N: Notifier>(
    mut dispatcher: CustomDispatcher<W, N>,
    events: mpsc::Receiver<Event>,
) -> Flow {
    info!("i3custom running");
    for event in events {
        match dispatcher.handle(event) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => {
                info!("exiting");
                return Flow::Exit;
            }
            Err(e) => {
                error!("unrecoverable error: {}", e);
                std::process::exit(1);
            }
        }
    }
    Flow::Continue
}
