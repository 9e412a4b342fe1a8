// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Operator console for the dedicated server.
//!
//! [`TextConsole`] ties a [`LineEditor`] to a [`ConsoleBackend`]. The host polls
//! it once per frame with [`TextConsole::get_line`]; pending input is consumed
//! without blocking and a finished line is handed back for the engine.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use dedhost::console::{self, ConsoleInput, TextConsole};
//!
//! let commands: &[&str] = &["map", "quit"];
//! let mut console = TextConsole::new(console::detect(), 255, Duration::from_millis(500));
//! console.init()?;
//!
//! loop {
//!     match console.get_line(commands)? {
//!         Some(ConsoleInput::Line(line)) => println!("Got: {}", line),
//!         Some(ConsoleInput::Interrupt) => break,
//!         None => std::thread::sleep(Duration::from_millis(1)),
//!     }
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod completer;
pub mod editor;
pub mod keys;
pub mod terminal;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::engine::{CommandSource, EngineStatus};

pub use completer::{complete, ColumnLayout, Completion};
pub use editor::{LineEditor, DEFAULT_HISTORY_CAPACITY};
pub use keys::{ByteDecoder, InputEvent};
pub use terminal::{detect, resolve_width, HeadlessBackend, TerminalBackend};

/// Default minimum time between status bar refreshes.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(500);

/// Platform side of the console: where input comes from and output goes.
pub trait ConsoleBackend: Write {
    /// Prepare the terminal for character-at-a-time input.
    fn init(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Restore the terminal.
    fn terminate(&mut self) -> io::Result<()> {
        self.flush()
    }

    /// Next pending input event. Must not block.
    fn poll_event(&mut self) -> io::Result<Option<InputEvent>>;

    /// Terminal width in columns.
    fn width(&self) -> usize;

    fn set_title(&mut self, title: &str) -> io::Result<()>;

    fn set_status(&mut self, status: &str) -> io::Result<()>;
}

impl<B: ConsoleBackend + ?Sized> ConsoleBackend for Box<B> {
    fn init(&mut self) -> io::Result<()> {
        (**self).init()
    }

    fn terminate(&mut self) -> io::Result<()> {
        (**self).terminate()
    }

    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        (**self).poll_event()
    }

    fn width(&self) -> usize {
        (**self).width()
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        (**self).set_title(title)
    }

    fn set_status(&mut self, status: &str) -> io::Result<()> {
        (**self).set_status(status)
    }
}

/// Something the operator finished typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// A submitted line, without the trailing newline.
    Line(String),
    /// Ctrl+C typed on the console.
    Interrupt,
}

/// Interactive console with line editing, history and completion.
pub struct TextConsole<B: ConsoleBackend> {
    backend: B,
    editor: LineEditor,
    history_capacity: usize,
    initialized: bool,
    status_interval: Duration,
    last_status: Option<Instant>,
}

impl<B: ConsoleBackend> TextConsole<B> {
    pub fn new(backend: B, history_capacity: usize, status_interval: Duration) -> Self {
        Self {
            backend,
            editor: LineEditor::with_history_capacity(history_capacity),
            history_capacity,
            initialized: false,
            status_interval,
            last_status: None,
        }
    }

    /// Prepare the backend. Calling it again is a no-op.
    pub fn init(&mut self) -> io::Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.backend.init()?;
        self.editor = LineEditor::with_history_capacity(self.history_capacity);
        self.last_status = None;
        self.initialized = true;

        tracing::debug!("Console initialized ({} columns)", self.backend.width());
        Ok(())
    }

    /// Restore the backend. Safe to call more than once.
    pub fn terminate(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }

        self.initialized = false;
        self.backend.terminate()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Consume pending input. Returns the line once Enter is pressed, or
    /// `None` if the operator is still typing or nothing was typed.
    pub fn get_line<C: CommandSource + ?Sized>(&mut self, commands: &C) -> io::Result<Option<ConsoleInput>> {
        if !self.initialized {
            return Ok(None);
        }

        let result = self.drain_input(commands);
        self.backend.flush()?;
        result
    }

    fn drain_input<C: CommandSource + ?Sized>(&mut self, commands: &C) -> io::Result<Option<ConsoleInput>> {
        while let Some(event) = self.backend.poll_event()? {
            let out = &mut self.backend;

            match event {
                InputEvent::Newline => {
                    let line = self.editor.receive_newline(out)?;
                    return Ok(Some(ConsoleInput::Line(line)));
                }
                InputEvent::Interrupt => return Ok(Some(ConsoleInput::Interrupt)),
                InputEvent::Char(character) => self.editor.receive_character(character, out)?,
                InputEvent::Backspace => self.editor.receive_backspace(out)?,
                InputEvent::Tab => {
                    let width = out.width();
                    self.editor.receive_tab(commands, width, out)?;
                }
                InputEvent::Up => self.editor.receive_up_arrow(out)?,
                InputEvent::Down => self.editor.receive_down_arrow(out)?,
                InputEvent::Left => self.editor.receive_left_arrow(out)?,
                InputEvent::Right => self.editor.receive_right_arrow(out)?,
                InputEvent::Home => self.editor.receive_home(out)?,
                InputEvent::End => self.editor.receive_end(out)?,
            }
        }

        Ok(None)
    }

    /// Write engine or host output to the console.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.backend.write_all(text.as_bytes())?;
        self.backend.flush()
    }

    pub fn width(&self) -> usize {
        self.backend.width()
    }

    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.backend.set_title(title)
    }

    pub fn set_status(&mut self, status: &str) -> io::Result<()> {
        self.backend.set_status(status)
    }

    /// Refresh the status bar, at most once per status interval unless
    /// `force` is set. Returns true if the status was written.
    pub fn update_status(&mut self, status: &EngineStatus, force: bool) -> io::Result<bool> {
        let now = Instant::now();

        if !force {
            if let Some(last) = self.last_status {
                if now.duration_since(last) < self.status_interval {
                    return Ok(false);
                }
            }
        }

        self.backend.set_status(&status.to_string())?;
        self.last_status = Some(now);
        Ok(true)
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: ConsoleBackend> Drop for TextConsole<B> {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            tracing::warn!("Failed to restore console: {}", e);
        }
    }
}
