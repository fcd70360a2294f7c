//! IPC command types, global command bus, and Unix socket listener.
//!
//! Commands are parsed on the listener thread, pushed onto an async channel,
//! and drained by the app loop once per tick on the main thread. `status` is
//! answered directly from a snapshot the loop publishes every tick.

use async_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use crate::config::MAX_ROTATION_INTERVAL_SECS;
use crate::geometry::{Resolution, ViewportRect};
use crate::window::WindowStyleState;

/// A command destined for the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcCommand {
    ToggleChrome,
    /// `None` toggles.
    Fullscreen(Option<bool>),
    Next,
    Prev,
    /// Checked against the rotation by the main loop, not the listener.
    Show(usize),
    StartRotation,
    StopRotation,
    RotationInterval(Duration),
    Reapply,
    Quit,
}

struct IpcCommandBus {
    tx: Sender<IpcCommand>,
    rx: Receiver<IpcCommand>,
}

static IPC_COMMAND_BUS: OnceLock<IpcCommandBus> = OnceLock::new();

fn command_bus() -> &'static IpcCommandBus {
    IPC_COMMAND_BUS.get_or_init(|| {
        let (tx, rx) = async_channel::unbounded();
        IpcCommandBus { tx, rx }
    })
}

/// Returns a receiver for the app's drain loop.
pub fn subscribe_ipc_commands() -> Receiver<IpcCommand> {
    command_bus().rx.clone()
}

pub fn push_ipc_command(cmd: IpcCommand) {
    let _ = command_bus().tx.try_send(cmd);
}

pub fn socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("signage.sock")
}

// ---------------------------------------------------------------------------
// Status snapshot
// ---------------------------------------------------------------------------

/// Player state as of the last completed tick.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub target: Option<Resolution>,
    pub actual: Option<Resolution>,
    pub chrome: Option<WindowStyleState>,
    pub startup: String,
    pub viewport: Option<ViewportRect>,
    pub rotation_items: usize,
    pub rotation_current: Option<usize>,
    pub rotation_current_name: Option<String>,
    pub rotation_running: bool,
    pub rotation_interval: Duration,
    pub geometry_passes: usize,
    pub pulse_scale: f64,
}

static STATUS: OnceLock<Mutex<StatusSnapshot>> = OnceLock::new();

fn status_cell() -> &'static Mutex<StatusSnapshot> {
    STATUS.get_or_init(|| Mutex::new(StatusSnapshot::default()))
}

pub fn publish_status(snapshot: StatusSnapshot) {
    if let Ok(mut guard) = status_cell().lock() {
        *guard = snapshot;
    }
}

fn current_status() -> StatusSnapshot {
    status_cell()
        .lock()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

fn status_json(status: &StatusSnapshot) -> String {
    let resolution = |r: Option<Resolution>| {
        r.map(|r| serde_json::json!({"width": r.width, "height": r.height}))
    };
    let viewport = status.viewport.map(|v| {
        serde_json::json!({"x": v.x, "y": v.y, "width": v.width, "height": v.height})
    });
    serde_json::json!({
        "version": crate::VERSION,
        "running": true,
        "target": resolution(status.target),
        "actual": resolution(status.actual),
        "chrome": status.chrome.map(|c| c.to_string()),
        "startup": status.startup,
        "viewport": viewport,
        "geometry_passes": status.geometry_passes,
        "pulse_scale": status.pulse_scale,
        "rotation": {
            "items": status.rotation_items,
            "current": status.rotation_current,
            "current_name": status.rotation_current_name,
            "running": status.rotation_running,
            "interval_secs": status.rotation_interval.as_secs_f64(),
        },
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Request {
    Status,
    Command(IpcCommand),
}

fn parse_request(line: &str) -> Result<Request, String> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().unwrap_or("");
    let arg = tokens.next();

    let command = match verb {
        "status" => return Ok(Request::Status),
        "toggle-chrome" => IpcCommand::ToggleChrome,
        "fullscreen" => match arg {
            None => IpcCommand::Fullscreen(None),
            Some("on") => IpcCommand::Fullscreen(Some(true)),
            Some("off") => IpcCommand::Fullscreen(Some(false)),
            Some(other) => return Err(format!("ERR: fullscreen expects on|off, got '{}'", other)),
        },
        "next" => IpcCommand::Next,
        "prev" => IpcCommand::Prev,
        "show" => {
            let Some(arg) = arg else {
                return Err("ERR: show requires <index>".to_string());
            };
            match arg.parse() {
                Ok(index) => IpcCommand::Show(index),
                Err(_) => return Err(format!("ERR: invalid index '{}'", arg)),
            }
        }
        "start" => IpcCommand::StartRotation,
        "stop" => IpcCommand::StopRotation,
        "interval" => {
            let Some(arg) = arg else {
                return Err("ERR: interval requires <seconds>".to_string());
            };
            let secs = arg
                .parse::<f64>()
                .ok()
                .filter(|s| *s > 0.0 && *s <= MAX_ROTATION_INTERVAL_SECS)
                .and_then(|s| Duration::try_from_secs_f64(s).ok());
            match secs {
                Some(interval) => IpcCommand::RotationInterval(interval),
                None => {
                    return Err(format!(
                        "ERR: interval must be seconds in (0, {}], got '{}'",
                        MAX_ROTATION_INTERVAL_SECS, arg
                    ))
                }
            }
        }
        "reapply" => IpcCommand::Reapply,
        "quit" => IpcCommand::Quit,
        other => return Err(format!("ERR: unknown command '{}'", other)),
    };
    Ok(Request::Command(command))
}

/// Parses and dispatches a single IPC command string, returning a response.
pub fn handle_ipc_command(command: &str) -> String {
    match parse_request(command) {
        Ok(Request::Command(cmd)) => {
            push_ipc_command(cmd);
            "OK".to_string()
        }
        Ok(Request::Status) => status_json(&current_status()),
        Err(reply) => reply,
    }
}

// ---------------------------------------------------------------------------
// Unix socket listener
// ---------------------------------------------------------------------------

/// Starts the IPC listener on a Unix socket, spawning a background thread.
#[cfg(unix)]
pub fn start_ipc_listener(socket_path: &std::path::Path) -> std::io::Result<()> {
    use std::io::{BufRead, BufReader, Write};
    use std::os::unix::net::{UnixListener, UnixStream};

    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = match UnixListener::bind(socket_path) {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
            if UnixStream::connect(socket_path).is_ok() {
                eprintln!("Signage is already running.");
                std::process::exit(0);
            }
            let _ = std::fs::remove_file(socket_path);
            UnixListener::bind(socket_path)?
        }
        Err(err) => return Err(err),
    };
    log::info!("IPC listening on {:?}", socket_path);

    std::thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            let _ = reader.read_line(&mut line);
            let response = handle_ipc_command(&line);
            log::debug!("IPC '{}' -> {}", line.trim(), response);
            if let Ok(mut stream) = reader.into_inner().try_clone() {
                let _ = writeln!(stream, "{}", response);
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn start_ipc_listener(_socket_path: &std::path::Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "IPC requires Unix domain sockets",
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
