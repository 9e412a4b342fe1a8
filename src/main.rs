// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dedhost::colors::{paint, ERROR, RED, WARNING, YELLOW};
use dedhost::host::{self, EXIT_FAILURE};
use dedhost::{console, BuiltinModule, CommandLine, HostConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host-level flags are long-only so engine directives like `-game` or `-h`
/// reach the engine untouched.
#[derive(Parser)]
#[command(name = "dedhost")]
#[command(version = VERSION)]
#[command(about = "Dedicated server launcher with an interactive console.")]
#[command(long_about = "dedhost - Dedicated server launcher\n\n\
Everything after the host flags is passed to the engine as directives:\n\
  -name [values]   engine option\n\
  +name [values]   console command run at startup\n\
  @file            read more directives from a parameter file")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Config file (default: ~/.dedhost/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Engine directives
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "DIRECTIVES")]
    directives: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", paint(RED, ERROR), e);
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = HostConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let program = std::env::args().next().unwrap_or_else(|| "dedhost".to_string());
    let mut cmdline = CommandLine::with_max_include_depth(config.max_include_depth);
    cmdline.create_from_args(std::iter::once(program).chain(cli.directives));

    for diagnostic in cmdline.diagnostics() {
        eprintln!("{} {}", paint(YELLOW, WARNING), diagnostic);
    }

    tracing::debug!("Command line: {}", cmdline);

    let interrupted = Arc::new(AtomicBool::new(false));
    let code = host::start(
        BuiltinModule::new(),
        console::detect(),
        &mut cmdline,
        &config,
        interrupted,
    )
    .context("Console I/O failed")?;

    Ok(code)
}

fn init_tracing(level: &str) {
    let level = tracing::Level::from_str(level).unwrap_or_else(|_| {
        eprintln!("{} Unknown log level '{}', using warn", paint(YELLOW, WARNING), level);
        tracing::Level::WARN
    });

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
