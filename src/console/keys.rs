// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Primitive console input events.
//!
//! Backends turn whatever their platform delivers (crossterm key events, raw
//! terminal bytes) into [`InputEvent`]s; the line editor only ever sees these.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const ESC: u8 = 0x1B;

/// One editing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    Tab,
    Newline,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    /// Ctrl+C typed on the console.
    Interrupt,
}

impl InputEvent {
    /// Decode a 3-byte `ESC x y` sequence; only the last byte matters.
    ///
    /// ```
    /// use dedhost::console::InputEvent;
    ///
    /// assert_eq!(InputEvent::from_escape_sequence([0x1B, b'[', b'A']), Some(InputEvent::Up));
    /// assert_eq!(InputEvent::from_escape_sequence([0x1B, b'[', b'Z']), None);
    /// ```
    pub fn from_escape_sequence(sequence: [u8; 3]) -> Option<Self> {
        match sequence[2] {
            b'A' => Some(Self::Up),
            b'B' => Some(Self::Down),
            b'C' => Some(Self::Right),
            b'D' => Some(Self::Left),
            b'F' => Some(Self::End),
            b'H' => Some(Self::Home),
            _ => None,
        }
    }

    /// Map a crossterm key event. Releases and unsupported keys yield `None`.
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let control = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') if control => Some(Self::Interrupt),
            KeyCode::Char(_) if control => None,
            KeyCode::Char(c) => Some(Self::Char(c)),
            KeyCode::Enter => Some(Self::Newline),
            KeyCode::Backspace => Some(Self::Backspace),
            KeyCode::Tab => Some(Self::Tab),
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Home => Some(Self::Home),
            KeyCode::End => Some(Self::End),
            _ => None,
        }
    }
}

/// Decoder for a raw terminal byte stream.
///
/// Bytes are fed one at a time; escape sequences are buffered until all three
/// bytes arrived. `\r\n` counts as a single newline.
#[derive(Debug, Default)]
pub struct ByteDecoder {
    sequence: Vec<u8>,
    after_carriage_return: bool,
}

impl ByteDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning the event it completes, if any.
    pub fn feed(&mut self, byte: u8) -> Option<InputEvent> {
        if !self.sequence.is_empty() {
            self.sequence.push(byte);
            if self.sequence.len() < 3 {
                return None;
            }
            let sequence = [self.sequence[0], self.sequence[1], self.sequence[2]];
            self.sequence.clear();
            return InputEvent::from_escape_sequence(sequence);
        }

        let after_carriage_return = std::mem::take(&mut self.after_carriage_return);

        match byte {
            ESC => {
                self.sequence.push(byte);
                None
            }
            b'\n' if after_carriage_return => None,
            b'\n' => Some(InputEvent::Newline),
            b'\r' => {
                self.after_carriage_return = true;
                Some(InputEvent::Newline)
            }
            0x7F | 0x08 => Some(InputEvent::Backspace),
            b'\t' => Some(InputEvent::Tab),
            0x03 => Some(InputEvent::Interrupt),
            0x20..=0x7E => Some(InputEvent::Char(char::from(byte))),
            _ => None,
        }
    }

    /// Decode a whole buffer.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        bytes.iter().filter_map(|&byte| self.feed(byte)).collect()
    }
}
