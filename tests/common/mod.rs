//! Scripted terminal shared by the integration suites.
//!
//! Replays raw terminal bytes through [`ByteDecoder`] and records everything
//! written to it. The output buffer is shared so it can still be read after
//! the backend has been handed to the host.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

use dedhost::console::{ByteDecoder, ConsoleBackend, InputEvent};

#[derive(Default)]
pub struct ScriptedBackend {
    input: VecDeque<u8>,
    decoder: ByteDecoder,
    output: Rc<RefCell<Vec<u8>>>,
    width: usize,
    pub statuses: Vec<String>,
    pub title: String,
    pub initialized: bool,
}

impl ScriptedBackend {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Backend that will replay `script` once input is polled.
    pub fn with_script(script: &[u8]) -> Self {
        let mut backend = Self::new(80);
        backend.type_bytes(script);
        backend
    }

    pub fn type_bytes(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Handle on the output buffer.
    pub fn output(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.output)
    }

    /// Drain what has been written so far.
    pub fn take_output(&self) -> String {
        let bytes = std::mem::take(&mut *self.output.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for ScriptedBackend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ConsoleBackend for ScriptedBackend {
    fn init(&mut self) -> io::Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.initialized = false;
        Ok(())
    }

    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        while let Some(byte) = self.input.pop_front() {
            if let Some(event) = self.decoder.feed(byte) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn width(&self) -> usize {
        self.width
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        Ok(())
    }

    fn set_status(&mut self, status: &str) -> io::Result<()> {
        self.statuses.push(status.to_string());
        Ok(())
    }
}
