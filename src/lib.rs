// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! dedhost - Dedicated server launcher library
//!
//! Loads an engine module, turns the process arguments into the engine's
//! canonical command line and runs the server frame loop behind an
//! interactive operator console.
//!
//! # Core Modules
//!
//! - [`cmdline`] - `-name` / `+name` / `@file` directive parsing and editing
//! - [`console`] - Line editor, history, tab completion and terminal backends
//! - [`module`] - Engine module loading and versioned interface lookup
//! - [`engine`] - Interfaces the host consumes from an engine
//! - [`bootstrap`] - Launcher directives (`-pidfile`, `-pingboost`, ...)
//! - [`host`] - Startup sequence and frame loop
//! - [`config`] - Host configuration file
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use dedhost::{console, host, BuiltinModule, CommandLine, HostConfig};
//!
//! let config = HostConfig::default();
//! let mut cmdline = CommandLine::from_args(std::env::args());
//! let interrupted = Arc::new(AtomicBool::new(false));
//!
//! let code = host::start(BuiltinModule::new(), console::detect(), &mut cmdline, &config, interrupted)?;
//! std::process::exit(code);
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod bootstrap;
pub mod cmdline;
pub mod colors;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod host;
pub mod module;
pub mod strings;

pub use cmdline::CommandLine;
pub use config::HostConfig;
pub use console::{ConsoleBackend, ConsoleInput, LineEditor, TextConsole};
pub use engine::{CommandSource, EngineApi, EngineStatus};
pub use error::{DirectiveError, InterfaceError};
pub use module::{BuiltinModule, Module, ModuleHost};
