// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Interfaces the host consumes from an engine module.

use std::fmt;

/// Versioned name of the dedicated server API.
pub const INTERFACE_DEDICATED_SERVER_API: &str = "VENGINE_HLDS_API_VERSION002";

/// Versioned name of the command registry used for console completion.
pub const INTERFACE_SYSTEM_BASE: &str = "basesystem002";

/// Snapshot shown in the console status bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStatus {
    pub fps: f32,
    pub active_players: u32,
    pub max_players: u32,
    pub map: String,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {:.1} | Players: {}/{} | Map: {}",
            self.fps, self.active_players, self.max_players, self.map
        )
    }
}

/// The front-end API a dedicated server engine exposes to its host.
pub trait EngineApi {
    /// Initialize the engine with its base directory and the canonical
    /// command line. Returns false if the engine refuses to start.
    fn init(&mut self, base_dir: &str, cmdline: &str) -> bool;

    /// Queue operator console text. Lines end with `\n`.
    fn add_console_text(&mut self, text: &str);

    /// Run one server frame. Returns false once the engine wants to stop.
    fn run_frame(&mut self) -> bool;

    /// Current figures for the status bar.
    fn status(&self) -> EngineStatus;

    /// Console output produced since the last call, if any.
    fn take_output(&mut self) -> Option<String>;

    /// Engine-provided idle wait for `-pingboost 3`. Returns false if the
    /// engine has none and the host should fall back to its own sleep.
    fn idle(&mut self) -> bool {
        false
    }

    fn shutdown(&mut self);
}

/// Source of console completion candidates.
pub trait CommandSource {
    /// All known command names starting with `prefix`.
    fn command_matches(&self, prefix: &str) -> Vec<String>;
}

/// A fixed candidate list, mostly useful for embedding and tests.
impl CommandSource for [&str] {
    fn command_matches(&self, prefix: &str) -> Vec<String> {
        self.iter()
            .filter(|name| {
                name.len() >= prefix.len()
                    && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
            })
            .map(|name| name.to_string())
            .collect()
    }
}
