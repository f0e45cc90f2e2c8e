//! Per-launch session log.
//!
//! `init()` opens `Desk/desk.log` under the platform data directory
//! (`%APPDATA%`, `~/Library/Application Support`, or `$XDG_DATA_HOME` /
//! `~/.local/share`), dropping whatever the previous launch wrote. The
//! `log_info!`, `log_warn!` and `log_err!` macros append to it and do nothing
//! until `init()` has run.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

struct SessionLog {
    path: PathBuf,
    file: Mutex<File>,
}

static SESSION: OnceLock<SessionLog> = OnceLock::new();

/// Where this session is logging, once `init()` succeeded.
pub fn log_path() -> Option<&'static Path> {
    SESSION.get().map(|s| s.path.as_path())
}

/// Append one raw line. I/O errors are dropped.
pub fn write_line(line: &str) {
    let Some(session) = SESSION.get() else { return };
    if let Ok(mut file) = session.file.lock() {
        let _ = writeln!(file, "{}", line);
    }
}

pub fn write(level: &str, msg: &str) {
    write_line(&format_line(&timestamp(), level, msg));
}

fn format_line(ts: &str, level: &str, msg: &str) -> String {
    format!("{} {:<5} {}", ts, level, msg)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*))
    };
}

fn open_session(path: PathBuf) -> std::io::Result<SessionLog> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    Ok(SessionLog {
        path,
        file: Mutex::new(file),
    })
}

/// Open the session log and hook panics into it. Later calls are no-ops.
pub fn init() {
    if SESSION.get().is_some() {
        return;
    }
    let path = data_dir().join("Desk").join("desk.log");
    match open_session(path.clone()) {
        Ok(session) => {
            let _ = SESSION.set(session);
        }
        Err(e) => {
            eprintln!("Desk: cannot open log {}: {}", path.display(), e);
            return;
        }
    }

    write_line(&format!(
        "--- Desk {} session, unix time {} ---",
        env!("CARGO_PKG_VERSION"),
        unix_seconds().unwrap_or(0)
    ));

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write("PANIC", &info.to_string());
        previous_hook(info);
    }));
}

pub(crate) fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support");
        }
    }
    std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn unix_seconds() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

fn timestamp() -> String {
    unix_seconds().map_or_else(|| "--:--:--".to_string(), clock_string)
}

/// UTC wall clock, `HH:MM:SS`.
fn clock_string(secs: u64) -> String {
    let day = secs % 86_400;
    format!("{:02}:{:02}:{:02}", day / 3600, (day % 3600) / 60, day % 60)
}
