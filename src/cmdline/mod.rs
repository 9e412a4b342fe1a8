// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Canonical engine command line.
//!
//! The host receives its engine directives as process arguments, possibly
//! spread over `@file` parameter files. [`CommandLine`] folds all of that into
//! one normalized string (`-game cstrike -port 27015 +map de_dust2`) that the
//! bootstrap code queries and edits before handing it to the engine.
//!
//! ## Example
//!
//! ```
//! use dedhost::CommandLine;
//!
//! let mut cmdline = CommandLine::new();
//! cmdline.create("hlds -game cstrike  +maxplayers 32\n+map de_dust2");
//! assert_eq!(cmdline.current(), "-game cstrike +maxplayers 32 +map de_dust2");
//!
//! cmdline.set_param_value("+maxplayers", 16);
//! assert_eq!(cmdline.param_values("+MAXPLAYERS"), Some("16"));
//! assert_eq!(cmdline.current(), "-game cstrike +map de_dust2 +maxplayers 16");
//! ```

pub mod tokenizer;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use regex::{Regex, RegexBuilder};

use crate::error::DirectiveError;
use crate::strings::{equal_ignore_case, trim};
use tokenizer::{is_valid_param, normalize, split_param, tokens};

/// Default bound on `@file` nesting.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// The normalized, order-preserving engine command line.
#[derive(Debug, Clone)]
pub struct CommandLine {
    /// Canonical `name[ values]` sequence.
    cmdline: String,
    /// Maximum number of nested `@file` expansions.
    max_include_depth: usize,
    /// Problems met during the last `create`, in order.
    diagnostics: Vec<DirectiveError>,
}

impl CommandLine {
    /// An empty command line.
    pub fn new() -> Self {
        Self::with_max_include_depth(DEFAULT_MAX_INCLUDE_DEPTH)
    }

    /// An empty command line with a custom `@file` nesting bound.
    pub fn with_max_include_depth(max_include_depth: usize) -> Self {
        Self {
            cmdline: String::new(),
            max_include_depth,
            diagnostics: Vec::new(),
        }
    }

    /// Build a command line from process arguments (the first one is the
    /// program name and is skipped).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cmdline = Self::new();
        cmdline.create_from_args(args);
        cmdline
    }

    /// Replace the command line with the directives found in `input`.
    ///
    /// `@file` directives are expanded in place. Files that cannot be read are
    /// skipped and reported through [`diagnostics`](Self::diagnostics).
    pub fn create(&mut self, input: &str) {
        self.cmdline.clear();
        self.diagnostics.clear();
        self.build(input, &mut Vec::new());
    }

    /// Replace the command line with process arguments, skipping the program
    /// name. Each argument is trimmed and empty ones are dropped.
    pub fn create_from_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();

        for arg in args.into_iter().skip(1) {
            append_trimmed(&mut joined, arg.as_ref());
        }

        self.create(&joined);
    }

    /// The canonical command line.
    pub fn current(&self) -> &str {
        &self.cmdline
    }

    /// Number of directives in the command line.
    pub fn count(&self) -> usize {
        tokens(&self.cmdline).count()
    }

    /// Problems met while expanding `@file` directives during the last
    /// [`create`](Self::create).
    pub fn diagnostics(&self) -> &[DirectiveError] {
        &self.diagnostics
    }

    /// Returns true if some directive name matches `pattern`.
    ///
    /// `pattern` is a case-insensitive regular expression that must match the
    /// whole name, prefix character included (`"[-+]condebug"`). Patterns that
    /// are not valid expressions, such as `"+map"`, match literally.
    pub fn find_param(&self, pattern: &str) -> bool {
        self.find(pattern).is_some()
    }

    /// Values of the first directive whose name matches `pattern`.
    ///
    /// A directive given without values yields `Some("")`.
    pub fn param_values(&self, pattern: &str) -> Option<&str> {
        self.find(pattern).map(|(_, values)| values)
    }

    /// Remove every directive named `name` (case-insensitive), together with
    /// its values.
    pub fn remove_param(&mut self, name: &str) {
        let name = trim(name);

        if name.is_empty() {
            return;
        }

        // Each removal shifts everything after it, so rescan until clean.
        loop {
            let found = tokens(&self.cmdline)
                .find(|token| equal_ignore_case(token.split().0, name))
                .map(|token| token.span);

            let Some(span) = found else {
                break;
            };

            // The first directive has no leading separator; take the trailing one.
            let end = if span.start == 0 {
                (span.end + 1).min(self.cmdline.len())
            } else {
                span.end
            };

            self.cmdline.replace_range(span.start..end, "");
        }
    }

    /// Set a directive without values, moving it to the end.
    ///
    /// Anything after the name in `name` is ignored. Malformed names are
    /// ignored. An `@file` name expands that file at the end of the line.
    pub fn set_param(&mut self, name: &str) {
        self.set_param_value(name, "");
    }

    /// Set a directive with values, moving it to the end.
    ///
    /// Accepts anything displayable, so `set_param_value("+maxplayers", 24)`
    /// works as well as string values. Malformed names are ignored.
    pub fn set_param_value<V: fmt::Display>(&mut self, name: &str, values: V) {
        let param = trim(name);

        if !is_valid_param(param) {
            return;
        }

        let (name, rest) = split_param(param);

        if name == "@" {
            self.include_file(rest, &mut Vec::new());
            return;
        }

        self.remove_param(name);
        append_trimmed(&mut self.cmdline, name);
        append_trimmed(&mut self.cmdline, &normalize(&values.to_string()));
    }

    fn find(&self, pattern: &str) -> Option<(&str, &str)> {
        let regex = compile_pattern(trim(pattern))?;

        tokens(&self.cmdline)
            .map(|token| token.split())
            .find(|(name, _)| !name.is_empty() && regex.is_match(name))
    }

    fn build(&mut self, input: &str, chain: &mut Vec<PathBuf>) {
        let line = normalize(input);

        for token in tokens(&line) {
            match token.split() {
                ("@", filename) => self.include_file(filename, chain),
                ("", _) => {}
                (name, values) => self.set_param_value(name, values),
            }
        }
    }

    /// Expand a parameter file in place. `chain` holds the files currently
    /// being expanded, outermost first.
    fn include_file(&mut self, filename: &str, chain: &mut Vec<PathBuf>) {
        let contents = match fs::read(filename) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::debug!("Cannot read parameter file '{}': {}", filename, e);
                self.report(DirectiveError::FileNotFound {
                    path: filename.to_string(),
                });
                return;
            }
        };

        let identity = fs::canonicalize(filename).unwrap_or_else(|_| PathBuf::from(filename));

        if chain.contains(&identity) {
            self.report(DirectiveError::CycleDetected { path: identity });
            return;
        }

        if chain.len() >= self.max_include_depth {
            self.report(DirectiveError::DepthExceeded {
                path: filename.to_string(),
                limit: self.max_include_depth,
            });
            return;
        }

        tracing::debug!("Expanding parameter file '{}'", filename);
        chain.push(identity);
        self.build(&contents, chain);
        chain.pop();
    }

    fn report(&mut self, error: DirectiveError) {
        tracing::debug!("{}", error);
        self.diagnostics.push(error);
    }
}

impl Default for CommandLine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cmdline)
    }
}

/// Append `piece` trimmed, separated by a single space. Empty pieces are
/// skipped.
fn append_trimmed(cmdline: &mut String, piece: &str) {
    let piece = trim(piece);

    if piece.is_empty() {
        return;
    }

    if !cmdline.is_empty() {
        cmdline.push(' ');
    }

    cmdline.push_str(piece);
}

/// Compile a whole-name, case-insensitive pattern, falling back to a literal
/// match when `pattern` is not a valid expression.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    let build = |source: &str| {
        RegexBuilder::new(&format!("^(?:{})$", source))
            .case_insensitive(true)
            .build()
    };

    match build(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::debug!("Pattern '{}' is not a regex ({}), matching literally", pattern, e);
            match build(&regex::escape(pattern)) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Invalid parameter pattern '{}': {}", pattern, e);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> CommandLine {
        let mut cmdline = CommandLine::new();
        cmdline.create(input);
        cmdline
    }

    #[test]
    fn test_create_normalizes_whitespace() {
        assert_eq!(parsed("  -x  \t\r\n  1  \n").current(), "-x 1");
        assert_eq!(parsed("hlds.exe -port  \r\n\x0C   27015\n").current(), "-port 27015");
        assert_eq!(
            parsed("hlds.exe -param\r\n\x0C value1\x0C\r\n  value2").current(),
            "-param value1   value2"
        );
    }

    #[test]
    fn test_create_drops_non_directives() {
        assert_eq!(parsed("").current(), "");
        assert_eq!(parsed("hlds.exe param1 value").current(), "");
        assert_eq!(parsed("hlds.exe param1 value \t\r\n -dev\x0C\r\n\x0C").current(), "-dev");
    }

    #[test]
    fn test_create_keeps_inner_prefix_characters() {
        assert_eq!(
            parsed("hlds-linux -dev -port 27015 +map de_dust+2-@\n").current(),
            "-dev -port 27015 +map de_dust+2-@"
        );
    }

    #[test]
    fn test_create_collapses_repeated_names() {
        assert_eq!(parsed("-a 1 -b 2 -A 3").current(), "-b 2 -A 3");
    }

    #[test]
    fn test_create_from_args() {
        let cmdline = CommandLine::from_args(["hlds.exe", " -game  ", "\tcstrike\r\n", ""]);
        assert_eq!(cmdline.current(), "-game cstrike");

        let cmdline = CommandLine::from_args(Vec::<String>::new());
        assert_eq!(cmdline.current(), "");

        let cmdline = CommandLine::from_args(["hlds.exe", "param value"]);
        assert_eq!(cmdline.current(), "");
    }

    #[test]
    fn test_count() {
        assert_eq!(parsed("-game cstrike -insecure +map de_dust2").count(), 3);
        assert_eq!(parsed("").count(), 0);
    }

    #[test]
    fn test_find_param_matches_whole_name() {
        let cmdline = parsed("-game CStrike -insecure +MaxPlayers 32 +sys_TicRate 1000");

        assert!(!cmdline.find_param(""));
        assert!(cmdline.find_param("\t\t -gAmE \r\n"));
        assert!(!cmdline.find_param("-gam"));
        assert!(!cmdline.find_param("CStrike"));
        assert_eq!(cmdline.param_values("-game"), Some("CStrike"));
        assert_eq!(cmdline.param_values("+sys_ticrate \r\n"), Some("1000"));
        assert_eq!(cmdline.param_values("\t\t +maxplayers"), Some("32"));
        assert_eq!(cmdline.param_values("-insecure"), Some(""));
        assert_eq!(cmdline.param_values("-missing"), None);
    }

    #[test]
    fn test_find_param_regex() {
        let cmdline = parsed("-dev +condebug -conclearlog");
        assert!(cmdline.find_param("[-\\+]condebug"));
        assert!(cmdline.find_param("-con.*"));
        assert!(!cmdline.find_param("(unclosed"));
    }

    #[test]
    fn test_remove_param() {
        let mut cmdline =
            parsed("-game CStrike -insecure -NoIPX -Bots +MaxPlayers 32 +map de_dust2-2x2 +sys_TicRate 1000");

        cmdline.remove_param("");
        assert_eq!(cmdline.count(), 7);

        cmdline.remove_param("-GAME");
        assert_eq!(
            cmdline.current(),
            "-insecure -NoIPX -Bots +MaxPlayers 32 +map de_dust2-2x2 +sys_TicRate 1000"
        );

        cmdline.remove_param("  \r\n\x0C+sys_ticrate   ");
        assert_eq!(cmdline.current(), "-insecure -NoIPX -Bots +MaxPlayers 32 +map de_dust2-2x2");

        cmdline.remove_param("-noipx\n \t");
        cmdline.remove_param("+maxplayers\r");
        assert_eq!(cmdline.current(), "-insecure -Bots +map de_dust2-2x2");

        cmdline.remove_param("-InSecurE");
        cmdline.remove_param("\t\r-bots \x0C");
        cmdline.remove_param("+mAp");
        assert_eq!(cmdline.current(), "");
    }

    #[test]
    fn test_remove_param_removes_every_occurrence() {
        let mut cmdline = CommandLine::new();
        cmdline.cmdline = "-x 1 -y -X 2 -x".to_string();

        cmdline.remove_param("-x");
        assert_eq!(cmdline.current(), "-y");
        assert!(!cmdline.find_param("-x"));
    }

    #[test]
    fn test_remove_param_is_exact() {
        let mut cmdline = parsed("-port 1 -portal 2");
        cmdline.remove_param("-port");
        assert_eq!(cmdline.current(), "-portal 2");

        cmdline.remove_param("-p.*");
        assert_eq!(cmdline.current(), "-portal 2");
    }

    #[test]
    fn test_set_param() {
        let mut cmdline = CommandLine::new();

        cmdline.set_param("");
        cmdline.set_param("bots");
        assert_eq!(cmdline.current(), "");

        cmdline.set_param("-bots");
        assert_eq!(cmdline.current(), "-bots");

        cmdline.set_param_value("+map", "de_dust2-2x2");
        cmdline.set_param_value("maxplayers", "33");
        assert_eq!(cmdline.current(), "-bots +map de_dust2-2x2");

        cmdline.set_param_value("+maxplayers", "32");
        assert_eq!(cmdline.current(), "-bots +map de_dust2-2x2 +maxplayers 32");

        cmdline.set_param_value("maxplayers", 24);
        cmdline.set_param_value("+maxplayers", 24);
        assert_eq!(cmdline.current(), "-bots +map de_dust2-2x2 +maxplayers 24");

        cmdline.set_param_value("+map", "cs_assault");
        assert_eq!(cmdline.current(), "-bots +maxplayers 24 +map cs_assault");
    }

    #[test]
    fn test_set_param_is_idempotent() {
        let mut once = parsed("-a 1 -b 2");
        once.set_param_value("-a", "7");

        let mut twice = parsed("-a 1 -b 2");
        twice.set_param_value("-a", "7");
        twice.set_param_value("-a", "7");

        assert_eq!(once.current(), twice.current());
        assert_eq!(once.current(), "-b 2 -a 7");
    }

    #[test]
    fn test_set_param_normalizes_values() {
        let mut cmdline = CommandLine::new();
        cmdline.set_param_value("-motd", "  hello\r\nworld\x0C ");
        assert_eq!(cmdline.current(), "-motd hello world");
        assert_eq!(cmdline.count(), 1);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let cmdline = parsed("-a 1 @/nonexistent/dedhost/params +b 2");
        assert_eq!(cmdline.current(), "-a 1 +b 2");
        assert_eq!(
            cmdline.diagnostics(),
            &[DirectiveError::FileNotFound {
                path: "/nonexistent/dedhost/params".to_string()
            }]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(parsed("-game valve").to_string(), "-game valve");
    }
}
