// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! ANSI colors for launcher messages on stderr.
//!
//! Only the launcher's own diagnostics are colored. The operator console
//! never is, since the line editor counts every byte it echoes.

use std::io::IsTerminal;

pub const RESET: &str = "\x1b[0m";

/// Errors that stop the launch.
pub const RED: &str = "\x1b[31m";

/// Problems the launch continues past.
pub const YELLOW: &str = "\x1b[33m";

pub const WARNING: &str = "[!]";
pub const ERROR: &str = "[X]";

/// `text` wrapped in `color` when stderr is a terminal.
pub fn paint(color: &str, text: &str) -> String {
    paint_if(std::io::stderr().is_terminal(), color, text)
}

fn paint_if(enabled: bool, color: &str, text: &str) -> String {
    if enabled {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}
