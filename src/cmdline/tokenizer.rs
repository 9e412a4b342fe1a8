// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Directive tokenizer.
//!
//! A directive starts at a `-`, `+` or `@` that sits at the start of the line
//! or right after whitespace, and runs up to the whitespace preceding the next
//! such start. Dashes or plus signs inside a value (`+map de_dust+2-@`) do not
//! split it because they are not preceded by whitespace.

use std::ops::Range;

use crate::strings::{is_space, trim};

/// Returns true for the three directive prefix characters.
#[inline]
pub fn is_prefix(byte: u8) -> bool {
    matches!(byte, b'-' | b'+' | b'@')
}

/// Returns true if `param` has the shape of a directive name: at least two
/// bytes and a directive prefix.
pub fn is_valid_param(param: &str) -> bool {
    param.len() > 1 && is_prefix(param.as_bytes()[0])
}

/// Prepare free-form input for tokenizing.
///
/// Trims the ends, drops form feeds and carriage returns, and turns newlines
/// into spaces so a directive file reads like one long command line.
pub fn normalize(input: &str) -> String {
    trim(input)
        .chars()
        .filter(|c| !matches!(c, '\x0C' | '\r'))
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// Split a directive into its name and values.
///
/// For `@` directives the name is `@` and the whole remainder is the value,
/// since file names may contain spaces. Malformed input yields two empty
/// strings.
pub fn split_param(param: &str) -> (&str, &str) {
    let param = trim(param);

    if !is_valid_param(param) {
        return ("", "");
    }

    if param.starts_with('@') {
        return ("@", trim(&param[1..]));
    }

    match param.bytes().position(is_space) {
        Some(space) => (trim(&param[..space]), trim(&param[space..])),
        None => (param, ""),
    }
}

/// One directive as found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte range in the scanned line, including the whitespace run that
    /// separates it from the previous directive.
    pub span: Range<usize>,
    /// The text covered by `span`.
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Name and values of this directive, see [`split_param`].
    pub fn split(&self) -> (&'a str, &'a str) {
        split_param(self.text)
    }
}

/// Iterate over the directives of an already normalized line.
pub fn tokens(line: &str) -> Tokens<'_> {
    Tokens { line, pos: 0 }
}

/// Iterator returned by [`tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Find where the next directive begins, returning the start of its
    /// leading whitespace and the index of its prefix character.
    fn find_start(&self) -> Option<(usize, usize)> {
        let bytes = self.line.as_bytes();
        let len = bytes.len();
        let mut index = self.pos;

        while index < len {
            if index == 0 && is_prefix(bytes[0]) {
                if len > 1 {
                    return Some((0, 0));
                }
                return None;
            }

            if is_space(bytes[index]) {
                let run_end = skip_spaces(bytes, index);
                if run_end + 1 < len && is_prefix(bytes[run_end]) {
                    return Some((index, run_end));
                }
                index = run_end;
            } else {
                index += 1;
            }
        }

        None
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let (start, prefix) = self.find_start()?;
        // A directive holds at least one byte after its prefix.
        let end = find_end(self.line.as_bytes(), prefix + 2);
        self.pos = end;

        Some(Token {
            span: start..end,
            text: &self.line[start..end],
        })
    }
}

fn skip_spaces(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && is_space(bytes[index]) {
        index += 1;
    }
    index
}

fn find_end(bytes: &[u8], from: usize) -> usize {
    let mut index = from;

    while index < bytes.len() {
        if is_space(bytes[index]) {
            let run_end = skip_spaces(bytes, index);
            if run_end < bytes.len() && is_prefix(bytes[run_end]) {
                return index;
            }
            index = run_end;
        } else {
            index += 1;
        }
    }

    bytes.len()
}
