// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Line editing state machine for the server console.
//!
//! [`LineEditor`] owns the line being typed, the cursor, and a bounded input
//! history. Every `receive_*` method applies one input event and echoes the
//! visible change to `out` using only backspaces and plain text, so it works on
//! any terminal that honours `\b`.
//!
//! All operations at a boundary (empty line, cursor at either end, nothing to
//! browse) are no-ops.

use std::collections::VecDeque;
use std::io::{self, Write};

use super::completer::{complete, Completion};
use super::keys::InputEvent;
use crate::engine::CommandSource;

/// Maximum history entries to keep.
pub const DEFAULT_HISTORY_CAPACITY: usize = 255;

/// Console input line with history.
#[derive(Debug, Clone)]
pub struct LineEditor {
    /// Line being edited.
    text: String,
    /// Live line saved when history browsing starts.
    saved_text: String,
    /// Submitted lines, oldest first.
    history: VecDeque<String>,
    /// Maximum number of history entries.
    capacity: usize,
    /// History entry shown; `history.len()` while editing the live line.
    browse_index: usize,
    /// Byte offset into `text`, always on a char boundary.
    cursor: usize,
}

impl LineEditor {
    /// Editor with the default history capacity.
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Editor keeping at most `capacity` history entries (at least one).
    pub fn with_history_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            text: String::new(),
            saved_text: String::new(),
            history: VecDeque::with_capacity(capacity),
            capacity,
            browse_index: 0,
            cursor: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn browse_index(&self) -> usize {
        self.browse_index
    }

    /// Submitted lines, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> + '_ {
        self.history.iter().map(String::as_str)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Returns true while an older history entry is displayed.
    pub fn is_browsing(&self) -> bool {
        self.browse_index != self.history.len()
    }

    /// Insert a printable ASCII character at the cursor. Anything else is
    /// ignored.
    pub fn receive_character<W: Write + ?Sized>(&mut self, character: char, out: &mut W) -> io::Result<()> {
        if !(character == ' ' || character.is_ascii_graphic()) {
            return Ok(());
        }

        self.text.insert(self.cursor, character);
        out.write_all(self.text[self.cursor..].as_bytes())?;
        self.cursor += character.len_utf8();

        // Put the terminal cursor back where the edit happened.
        let tail = self.text[self.cursor..].chars().count();
        write_backspaces(out, tail)
    }

    /// Insert every character of `text`.
    pub fn receive_text<W: Write + ?Sized>(&mut self, text: &str, out: &mut W) -> io::Result<()> {
        for character in text.chars() {
            self.receive_character(character, out)?;
        }
        Ok(())
    }

    /// Delete the character before the cursor.
    pub fn receive_backspace<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.cursor == 0 || self.text.is_empty() {
            return Ok(());
        }

        self.cursor = self.previous_boundary();
        self.text.remove(self.cursor);

        out.write_all(b"\x08")?;
        out.write_all(self.text[self.cursor..].as_bytes())?;
        out.write_all(b" ")?;

        let tail = self.text[self.cursor..].chars().count();
        write_backspaces(out, tail + 1)
    }

    /// Finish the line and return it.
    ///
    /// Non-empty lines are added to the history unless they repeat the most
    /// recent entry. The editor is left empty and out of browsing mode.
    pub fn receive_newline<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<String> {
        out.write_all(b"\n")?;

        let line = std::mem::take(&mut self.text);
        self.remember(&line);
        self.cursor = 0;
        self.browse_index = self.history.len();

        Ok(line)
    }

    /// Show the previous history entry. The first press saves the live line.
    pub fn receive_up_arrow<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.browse_index == 0 || self.history.is_empty() {
            return Ok(());
        }

        if self.browse_index == self.history.len() {
            self.saved_text = self.text.clone();
        }

        self.delete_typed_line(out)?;
        self.browse_index -= 1;
        self.text = self.history[self.browse_index].clone();
        self.show_line(out)
    }

    /// Show the next history entry, or the saved live line past the newest.
    pub fn receive_down_arrow<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.history.is_empty() || self.browse_index >= self.history.len() {
            return Ok(());
        }

        self.delete_typed_line(out)?;
        self.browse_index += 1;

        self.text = if self.browse_index == self.history.len() {
            self.saved_text.clone()
        } else {
            self.history[self.browse_index].clone()
        };

        self.show_line(out)
    }

    pub fn receive_left_arrow<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.cursor == 0 {
            return Ok(());
        }

        out.write_all(b"\x08")?;
        self.cursor = self.previous_boundary();
        Ok(())
    }

    pub fn receive_right_arrow<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(character) = self.text[self.cursor..].chars().next() else {
            return Ok(());
        };

        write!(out, "{}", character)?;
        self.cursor += character.len_utf8();
        Ok(())
    }

    pub fn receive_home<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        while self.cursor > 0 {
            self.receive_left_arrow(out)?;
        }
        Ok(())
    }

    pub fn receive_end<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        while self.cursor < self.text.len() {
            self.receive_right_arrow(out)?;
        }
        Ok(())
    }

    /// Apply a 3-byte `ESC x y` sequence. Unknown sequences are ignored.
    pub fn receive_escape_sequence<W: Write + ?Sized>(&mut self, sequence: [u8; 3], out: &mut W) -> io::Result<()> {
        match InputEvent::from_escape_sequence(sequence) {
            Some(InputEvent::Up) => self.receive_up_arrow(out),
            Some(InputEvent::Down) => self.receive_down_arrow(out),
            Some(InputEvent::Left) => self.receive_left_arrow(out),
            Some(InputEvent::Right) => self.receive_right_arrow(out),
            Some(InputEvent::Home) => self.receive_home(out),
            Some(InputEvent::End) => self.receive_end(out),
            _ => Ok(()),
        }
    }

    /// Complete the line against `commands`. See [`complete`] for the rules.
    pub fn receive_tab<C: CommandSource + ?Sized, W: Write + ?Sized>(
        &mut self,
        commands: &C,
        terminal_width: usize,
        out: &mut W,
    ) -> io::Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }

        let candidates = commands.command_matches(&self.text);

        match complete(&self.text, &candidates, terminal_width) {
            Completion::Unchanged => return Ok(()),
            Completion::Single { suffix } => {
                self.receive_end(out)?;
                self.text.push_str(&suffix);
                self.text.push(' ');
                out.write_all(suffix.as_bytes())?;
                out.write_all(b" ")?;
            }
            Completion::Multiple {
                candidates,
                common_prefix,
                layout,
            } => {
                self.delete_typed_line(out)?;
                out.write_all(b"\n")?;
                layout.render(&candidates, out)?;
                out.write_all(b"\n")?;
                self.text = common_prefix;
                out.write_all(self.text.as_bytes())?;
            }
        }

        self.cursor = self.text.len();
        Ok(())
    }

    /// Erase the displayed line from the terminal. The buffer is untouched
    /// and the cursor ends up at its end.
    pub fn delete_typed_line<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }

        self.receive_end(out)?;

        for _ in 0..self.text.chars().count() {
            out.write_all(b"\x08 \x08")?;
        }

        Ok(())
    }

    fn show_line<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        out.write_all(self.text.as_bytes())?;
        self.cursor = self.text.len();
        Ok(())
    }

    fn remember(&mut self, line: &str) {
        if line.is_empty() || self.history.back().is_some_and(|last| last == line) {
            return;
        }

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }

        self.history.push_back(line.to_string());
    }

    fn previous_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(index, _)| index)
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn write_backspaces<W: Write + ?Sized>(out: &mut W, count: usize) -> io::Result<()> {
    for _ in 0..count {
        out.write_all(b"\x08")?;
    }
    Ok(())
}
