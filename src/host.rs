// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Server startup and the frame loop.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bootstrap::{self, IdleStrategy};
use crate::cmdline::CommandLine;
use crate::config::HostConfig;
use crate::console::{ConsoleBackend, ConsoleInput, TextConsole};
use crate::engine::{EngineApi, INTERFACE_DEDICATED_SERVER_API, INTERFACE_SYSTEM_BASE};
use crate::error::InterfaceError;
use crate::module::{HostedEngine, Module, ModuleHost};

/// Exit code for a clean shutdown.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when the engine module or its interfaces are unavailable.
pub const EXIT_FAILURE: i32 = -1;

/// Window title set once the console is up.
pub const CONSOLE_TITLE: &str = "dedhost";

/// Everything the frame loop needs besides the engine and console.
pub struct RunOptions {
    pub idle: IdleStrategy,
    pub ignore_interrupt: bool,
    pub interrupted: Arc<AtomicBool>,
}

/// Load `module`, start its engine with `cmdline` and serve until the engine
/// stops or an interrupt arrives. Returns the process exit code.
pub fn start<M, B>(
    module: M,
    backend: B,
    cmdline: &mut CommandLine,
    config: &HostConfig,
    interrupted: Arc<AtomicBool>,
) -> io::Result<i32>
where
    M: Module,
    B: ConsoleBackend,
{
    let mut console = TextConsole::new(backend, config.history_capacity, config.status_interval());
    let mut modules = ModuleHost::new(module);

    if !modules.load() {
        console.print("Unable to load engine module, image is corrupt.\n")?;
        return Ok(EXIT_FAILURE);
    }

    for name in [INTERFACE_DEDICATED_SERVER_API, INTERFACE_SYSTEM_BASE] {
        if let Err(e) = modules.interface(name) {
            report_interface_error(&mut console, name, &e)?;
            return Ok(EXIT_FAILURE);
        }
    }

    bootstrap::init_cmdline(cmdline);
    let base_dir = Path::new(&config.base_dir);
    let mut messages = Vec::new();
    let settings = bootstrap::process_cmdline_arguments(cmdline, base_dir, &interrupted, &mut messages)?;

    if !messages.is_empty() {
        console.print(&String::from_utf8_lossy(&messages))?;
    }

    let engine = match modules.engine() {
        Ok(engine) => engine,
        Err(e) => {
            report_interface_error(&mut console, INTERFACE_DEDICATED_SERVER_API, &e)?;
            return Ok(EXIT_FAILURE);
        }
    };

    tracing::info!("Starting engine with '{}'", cmdline.current());

    if !engine.init(&config.base_dir, cmdline.current()) {
        console.print("Failed to initialize engine API.\n")?;
    } else if let Err(e) = console.init() {
        tracing::error!("Console init failed: {}", e);
        console.print("Failed to initialize console.\n")?;
        engine.shutdown();
    } else {
        console.set_title(CONSOLE_TITLE)?;

        let options = RunOptions {
            idle: settings.idle,
            ignore_interrupt: settings.ignore_interrupt,
            interrupted,
        };

        let result = run_server(engine, &mut console, &options);
        engine.shutdown();
        result?;
    }

    console.terminate()?;
    modules.unload();

    Ok(EXIT_SUCCESS)
}

/// The frame loop. Forwards typed lines to the engine, shows its output and
/// keeps the status bar current until a frame reports the engine is done.
pub fn run_server<E, B>(engine: &mut E, console: &mut TextConsole<B>, options: &RunOptions) -> io::Result<()>
where
    E: HostedEngine + ?Sized,
    B: ConsoleBackend,
{
    loop {
        match console.get_line(&*engine)? {
            Some(ConsoleInput::Line(line)) if !line.is_empty() => {
                engine.add_console_text(&format!("{}\n", line));
            }
            Some(ConsoleInput::Interrupt) if !options.ignore_interrupt => {
                options.interrupted.store(true, Ordering::SeqCst);
            }
            _ => {}
        }

        flush_output(engine, console)?;
        console.update_status(&engine.status(), false)?;

        if options.interrupted.load(Ordering::SeqCst) {
            tracing::info!("Interrupted, stopping server");
            break;
        }

        options.idle.idle(engine);

        if !engine.run_frame() {
            break;
        }
    }

    flush_output(engine, console)
}

fn flush_output<E, B>(engine: &mut E, console: &mut TextConsole<B>) -> io::Result<()>
where
    E: HostedEngine + ?Sized,
    B: ConsoleBackend,
{
    match engine.take_output() {
        Some(output) => console.print(&output),
        None => Ok(()),
    }
}

fn report_interface_error<B: ConsoleBackend>(
    console: &mut TextConsole<B>,
    name: &str,
    error: &InterfaceError,
) -> io::Result<()> {
    tracing::error!("{}", error);
    console.print(&format!("Failed to retrieve \"{}\" interface.\n", name))
}
