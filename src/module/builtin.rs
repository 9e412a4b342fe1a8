// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! In-process engine module.
//!
//! Lets the host run without a native engine: it keeps a map name and a
//! player limit, runs `+command` directives at startup and answers a small
//! set of console commands.

use std::collections::VecDeque;
use std::time::Instant;

use super::{HostedEngine, Module};
use crate::cmdline::tokenizer::tokens;
use crate::engine::{
    CommandSource, EngineApi, EngineStatus, INTERFACE_DEDICATED_SERVER_API, INTERFACE_SYSTEM_BASE,
};

/// Console commands understood by [`LocalEngine`], sorted.
pub const COMMANDS: &[&str] = &["cmdlist", "echo", "exit", "map", "maxplayers", "quit", "status"];

const DEFAULT_MAX_PLAYERS: u32 = 16;
const MAX_PLAYERS_LIMIT: u32 = 32;

/// Weight of the newest frame in the smoothed frame rate.
const FPS_SMOOTHING: f32 = 0.1;

/// The built-in module. Exports the server API and the command registry.
#[derive(Default)]
pub struct BuiltinModule {
    engine: Option<LocalEngine>,
}

impl BuiltinModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Module for BuiltinModule {
    fn name(&self) -> &str {
        "builtin"
    }

    fn load(&mut self) -> bool {
        self.engine.get_or_insert_with(LocalEngine::new);
        true
    }

    fn unload(&mut self) {
        self.engine = None;
    }

    fn exports(&self) -> &[&'static str] {
        &[INTERFACE_DEDICATED_SERVER_API, INTERFACE_SYSTEM_BASE]
    }

    fn engine(&mut self) -> Option<&mut dyn HostedEngine> {
        self.engine.as_mut().map(|engine| engine as &mut dyn HostedEngine)
    }
}

/// Minimal dedicated server engine.
#[derive(Debug)]
pub struct LocalEngine {
    base_dir: String,
    map: String,
    max_players: u32,
    pending: VecDeque<String>,
    output: String,
    running: bool,
    fps: f32,
    last_frame: Option<Instant>,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            base_dir: String::new(),
            map: String::new(),
            max_players: DEFAULT_MAX_PLAYERS,
            pending: VecDeque::new(),
            output: String::new(),
            running: false,
            fps: 0.0,
            last_frame: None,
        }
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one console command immediately.
    pub fn execute(&mut self, line: &str) {
        let line = line.trim();
        let (command, args) = match line.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (line, ""),
        };

        if command.is_empty() {
            return;
        }

        tracing::debug!("Executing '{}' with '{}'", command, args);

        match command.to_ascii_lowercase().as_str() {
            "map" => self.change_map(args),
            "maxplayers" => self.set_max_players(args),
            "echo" => self.print(args),
            "status" => {
                let status = self.status().to_string();
                self.print(&status);
            }
            "cmdlist" => {
                for command in COMMANDS {
                    self.print(command);
                }
                self.print(&format!("{} commands", COMMANDS.len()));
            }
            "quit" | "exit" => {
                self.print("Server shutting down");
                self.running = false;
            }
            _ => self.print(&format!("Unknown command \"{}\"", command)),
        }
    }

    fn change_map(&mut self, args: &str) {
        match args.split_whitespace().next() {
            Some(map) => {
                self.map = map.to_string();
                self.print(&format!("Changing map to {}", map));
            }
            None => self.print("map <mapname> : changes server to specified map"),
        }
    }

    fn set_max_players(&mut self, args: &str) {
        if args.is_empty() {
            let message = format!("\"maxplayers\" is \"{}\"", self.max_players);
            self.print(&message);
            return;
        }

        match args.parse::<u32>() {
            Ok(count) if (1..=MAX_PLAYERS_LIMIT).contains(&count) => self.max_players = count,
            _ => self.print(&format!("maxplayers must be between 1 and {}", MAX_PLAYERS_LIMIT)),
        }
    }

    fn print(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn update_fps(&mut self) {
        let now = Instant::now();

        if let Some(last) = self.last_frame {
            let elapsed = now.duration_since(last).as_secs_f32();
            if elapsed > 0.0 {
                let current = 1.0 / elapsed;
                self.fps = if self.fps == 0.0 {
                    current
                } else {
                    self.fps + (current - self.fps) * FPS_SMOOTHING
                };
            }
        }

        self.last_frame = Some(now);
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineApi for LocalEngine {
    fn init(&mut self, base_dir: &str, cmdline: &str) -> bool {
        self.base_dir = base_dir.to_string();
        self.running = true;

        for token in tokens(cmdline) {
            let (name, values) = token.split();
            if let Some(command) = name.strip_prefix('+') {
                self.execute(&format!("{} {}", command, values));
            }
        }

        tracing::info!(
            "Engine started in '{}' (map '{}', {} players)",
            self.base_dir,
            self.map,
            self.max_players
        );
        true
    }

    fn add_console_text(&mut self, text: &str) {
        self.pending
            .extend(text.lines().filter(|line| !line.trim().is_empty()).map(str::to_string));
    }

    fn run_frame(&mut self) -> bool {
        while let Some(line) = self.pending.pop_front() {
            self.execute(&line);
            if !self.running {
                break;
            }
        }

        self.update_fps();
        self.running
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            fps: self.fps,
            active_players: 0,
            max_players: self.max_players,
            map: self.map.clone(),
        }
    }

    fn take_output(&mut self) -> Option<String> {
        if self.output.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.output))
        }
    }

    fn shutdown(&mut self) {
        self.running = false;
        self.pending.clear();
        tracing::info!("Engine shut down");
    }
}

impl CommandSource for LocalEngine {
    fn command_matches(&self, prefix: &str) -> Vec<String> {
        COMMANDS.command_matches(prefix)
    }
}
