// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Launcher directives applied before the engine starts.
//!
//! These are the directives the host itself acts on rather than the engine:
//! `-conclearlog`, `-ignoresigint`, `-pidfile` and `-pingboost`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cmdline::CommandLine;
use crate::engine::EngineApi;

/// Console log the engine writes when `-condebug` is set.
pub const CONSOLE_LOG: &str = "qconsole.log";

/// How the host waits between server frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleStrategy {
    /// Sleep for one millisecond.
    #[default]
    Millisecond,
    /// Let the engine wait on its own network sockets.
    Engine,
    /// Sleep for one microsecond.
    Microsecond,
    /// Yield the rest of the time slice.
    Yield,
}

impl IdleStrategy {
    /// Strategy for a `-pingboost` value. Unknown or missing values sleep
    /// one millisecond.
    pub fn from_pingboost(value: Option<&str>) -> Self {
        match value.map(parse_leading_int) {
            Some(3) => Self::Engine,
            Some(4) => Self::Microsecond,
            Some(5) => Self::Yield,
            _ => Self::Millisecond,
        }
    }

    pub fn idle<E: EngineApi + ?Sized>(&self, engine: &mut E) {
        match self {
            Self::Millisecond => thread::sleep(Duration::from_millis(1)),
            Self::Engine => {
                if !engine.idle() {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            Self::Microsecond => thread::sleep(Duration::from_micros(1)),
            Self::Yield => thread::yield_now(),
        }
    }
}

/// What the launcher directives asked of the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchSettings {
    pub idle: IdleStrategy,
    /// Interrupts (signal or Ctrl+C on the console) are ignored.
    pub ignore_interrupt: bool,
    /// PID file written at startup.
    pub pid_file: Option<PathBuf>,
    /// Console log removed at startup.
    pub cleared_log: Option<PathBuf>,
}

/// Directives every run carries.
pub fn init_cmdline(cmdline: &mut CommandLine) {
    if cfg!(windows) {
        cmdline.set_param("-console");
    }
    cmdline.set_param("-steam");
}

/// Apply the launcher directives. Problems are reported to `out` and never
/// stop the launch.
pub fn process_cmdline_arguments<W: Write + ?Sized>(
    cmdline: &CommandLine,
    base_dir: &Path,
    interrupted: &Arc<AtomicBool>,
    out: &mut W,
) -> io::Result<LaunchSettings> {
    let cleared_log = conclearlog(cmdline, base_dir);
    let ignore_interrupt = cmdline.find_param("-ignoresigint");

    if let Err(e) = install_interrupt_handler(ignore_interrupt, Arc::clone(interrupted)) {
        if ignore_interrupt {
            writeln!(out, "WARNING! -ignoresigint: Failed to set signal handler.")?;
        }
        tracing::warn!("Failed to install interrupt handler: {}", e);
    }

    let pid_file = match pidfile_path(cmdline) {
        Some(path) => match write_pidfile(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                writeln!(out, "Warning: unable to open PID file ({})", path.display())?;
                tracing::warn!("Failed to write PID file {}: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    let idle = IdleStrategy::from_pingboost(cmdline.param_values("-pingboost"));
    tracing::debug!("Idle strategy: {:?}", idle);

    Ok(LaunchSettings {
        idle,
        ignore_interrupt,
        pid_file,
        cleared_log,
    })
}

/// Remove the console log when both `-condebug` (or `+condebug`) and
/// `-conclearlog` are present. Returns the removed file.
pub fn conclearlog(cmdline: &CommandLine, base_dir: &Path) -> Option<PathBuf> {
    if !(cmdline.find_param("[-\\+]condebug") && cmdline.find_param("-conclearlog")) {
        return None;
    }

    let path = if cfg!(windows) {
        base_dir.join(CONSOLE_LOG)
    } else {
        let game = cmdline.param_values("-game").filter(|game| !game.is_empty())?;
        base_dir.join(game).join(CONSOLE_LOG)
    };

    match fs::remove_file(&path) {
        Ok(()) => {
            tracing::info!("Removed {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::debug!("Could not remove {}: {}", path.display(), e);
            None
        }
    }
}

fn pidfile_path(cmdline: &CommandLine) -> Option<PathBuf> {
    cmdline
        .param_values("-pidfile")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

/// Write the process id followed by a newline, replacing any old contents.
pub fn write_pidfile(path: &Path) -> io::Result<()> {
    fs::write(path, format!("{}\n", std::process::id()))
}

/// Route process interrupts to `interrupted`, or swallow them when `ignore`
/// is set. Only one handler can be installed per process.
pub fn install_interrupt_handler(ignore: bool, interrupted: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if ignore {
            tracing::debug!("Interrupt ignored");
        } else {
            interrupted.store(true, Ordering::SeqCst);
        }
    })
}

/// `strtol`-style parse: leading whitespace, optional sign, then digits.
/// Anything unparseable is zero.
fn parse_leading_int(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    let magnitude = digits[..end].parse::<i64>().unwrap_or(0);

    if negative {
        -magnitude
    } else {
        magnitude
    }
}
