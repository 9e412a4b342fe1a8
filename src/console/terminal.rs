// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Console backends for a real terminal and for detached runs.

use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{self, SetTitle};

use super::keys::InputEvent;
use super::ConsoleBackend;

/// Width used when the terminal can't tell us.
pub const DEFAULT_WIDTH: usize = 80;

/// Narrower reports than this are treated as bogus.
const MIN_WIDTH: usize = 10;

/// Pick the backend for this process: the interactive terminal when stdin is
/// a tty, output only otherwise.
pub fn detect() -> Box<dyn ConsoleBackend> {
    if io::stdin().is_terminal() {
        Box::new(TerminalBackend::new())
    } else {
        tracing::debug!("stdin is not a terminal, console input disabled");
        Box::new(HeadlessBackend::new())
    }
}

/// Resolve the console width from what the terminal reported and the
/// `COLUMNS` environment variable.
pub fn resolve_width(reported: Option<u16>, columns: Option<&str>) -> usize {
    let width = match reported {
        Some(width) if width > 0 => usize::from(width),
        _ => columns
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0),
    };

    if width < MIN_WIDTH {
        DEFAULT_WIDTH
    } else {
        width
    }
}

/// Interactive terminal driven through crossterm raw mode.
pub struct TerminalBackend {
    stdout: Stdout,
    raw: bool,
    title: String,
}

impl TerminalBackend {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            raw: false,
            title: String::new(),
        }
    }
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for TerminalBackend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.raw {
            write_raw(&mut self.stdout, buf)?;
            Ok(buf.len())
        } else {
            self.stdout.write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl ConsoleBackend for TerminalBackend {
    fn init(&mut self) -> io::Result<()> {
        if !self.raw {
            terminal::enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.raw {
            self.raw = false;
            terminal::disable_raw_mode()?;
        }
        self.stdout.flush()
    }

    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = InputEvent::from_key_event(&key) {
                    return Ok(Some(input));
                }
            }
        }
        Ok(None)
    }

    fn width(&self) -> usize {
        let reported = terminal::size().ok().map(|(columns, _)| columns);
        let columns = std::env::var("COLUMNS").ok();
        resolve_width(reported, columns.as_deref())
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        execute!(self.stdout, SetTitle(title))
    }

    fn set_status(&mut self, status: &str) -> io::Result<()> {
        if self.title.is_empty() {
            execute!(self.stdout, SetTitle(status))
        } else {
            execute!(self.stdout, SetTitle(format!("{} - {}", self.title, status)))
        }
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if self.raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Output-only console for runs without a terminal on stdin.
pub struct HeadlessBackend<W: Write = Stdout> {
    out: W,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> HeadlessBackend<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for HeadlessBackend<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> ConsoleBackend for HeadlessBackend<W> {
    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        Ok(None)
    }

    fn width(&self) -> usize {
        DEFAULT_WIDTH
    }

    fn set_title(&mut self, _title: &str) -> io::Result<()> {
        Ok(())
    }

    fn set_status(&mut self, _status: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Raw mode leaves output post-processing off, so line feeds need an
/// explicit carriage return.
fn write_raw<W: Write + ?Sized>(out: &mut W, buf: &[u8]) -> io::Result<()> {
    for (index, chunk) in buf.split(|&byte| byte == b'\n').enumerate() {
        if index > 0 {
            out.write_all(b"\r\n")?;
        }
        out.write_all(chunk)?;
    }
    Ok(())
}
