// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Tab completion for console commands.
//!
//! Deciding what a Tab press does is kept apart from drawing it: [`complete`]
//! looks at the typed prefix and the candidates from the engine's command
//! registry and returns a [`Completion`]; the line editor applies it.
//!
//! ## Example UX
//!
//! ```text
//! > he<Tab>
//! > help _
//!
//! > map<Tab>
//! map          map_list     maxplayers
//! > ma
//! ```

use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::strings::common_prefix_len;

/// Outcome of a Tab press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing matched; leave the line alone.
    Unchanged,
    /// Exactly one command matched; append `suffix` and a space.
    Single { suffix: String },
    /// Several commands matched; list them and narrow the line to
    /// `common_prefix` (lower case).
    Multiple {
        candidates: Vec<String>,
        common_prefix: String,
        layout: ColumnLayout,
    },
}

/// How a candidate listing is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Candidates per row, at least one.
    pub columns: usize,
    /// Display width of the longest candidate. Each entry is padded to this
    /// and followed by two spaces.
    pub longest: usize,
}

impl ColumnLayout {
    /// Fit as many columns as the terminal allows.
    pub fn fit(terminal_width: usize, longest: usize) -> Self {
        let columns = (terminal_width.saturating_sub(1) / (longest + 1)).max(1);
        Self { columns, longest }
    }

    /// Write `candidates` as a table, wrapping once a row is full. No newline
    /// is written after the last row.
    pub fn render<W: Write + ?Sized>(&self, candidates: &[String], out: &mut W) -> io::Result<()> {
        for (index, candidate) in candidates.iter().enumerate() {
            if index > 0 && index % self.columns == 0 {
                out.write_all(b"\n")?;
            }

            let padding = self.longest.saturating_sub(candidate.width());
            write!(out, "{}{:padding$}  ", candidate, "", padding = padding)?;
        }

        Ok(())
    }
}

/// Decide how to complete `prefix` given the matching `candidates`.
pub fn complete(prefix: &str, candidates: &[String], terminal_width: usize) -> Completion {
    match candidates {
        [] => Completion::Unchanged,
        [single] => Completion::Single {
            // Candidates are expected to start with the prefix; a shorter one
            // has nothing left to add.
            suffix: single.get(prefix.len()..).unwrap_or_default().to_string(),
        },
        _ => {
            let lowered: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();
            let longest = lowered.iter().map(|c| c.width()).max().unwrap_or(0);

            Completion::Multiple {
                common_prefix: common_prefix(&lowered),
                layout: ColumnLayout::fit(terminal_width, longest),
                candidates: lowered,
            }
        }
    }
}

/// Longest prefix shared by all of `candidates`, which must be lower case
/// already. Starts from the shortest candidate and narrows against each one.
fn common_prefix(candidates: &[String]) -> String {
    let Some(shortest) = candidates.iter().min_by_key(|c| c.len()) else {
        return String::new();
    };

    let mut common = shortest.clone();

    for candidate in candidates {
        let keep = common_prefix_len(&common, candidate);
        common.truncate(keep);
    }

    tracing::debug!("Completion narrowed {} candidates to '{}'", candidates.len(), common);
    common
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(complete("zz", &[], 80), Completion::Unchanged);
    }

    #[test]
    fn test_single_candidate() {
        assert_eq!(
            complete("he", &strings(&["help"]), 80),
            Completion::Single {
                suffix: "lp".to_string()
            }
        );
        assert_eq!(
            complete("help", &strings(&["help"]), 80),
            Completion::Single {
                suffix: String::new()
            }
        );
        assert_eq!(
            complete("helpme", &strings(&["help"]), 80),
            Completion::Single {
                suffix: String::new()
            }
        );
    }

    #[test]
    fn test_multiple_candidates_common_prefix() {
        match complete("m", &strings(&["map_foo", "map_bar"]), 80) {
            Completion::Multiple { common_prefix, .. } => assert_eq!(common_prefix, "map_"),
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[test]
    fn test_common_prefix_ignores_case() {
        match complete("s", &strings(&["SV_Gravity", "sv_GRAVITY_scale", "Sv_cheats"]), 80) {
            Completion::Multiple {
                common_prefix,
                candidates,
                ..
            } => {
                assert_eq!(common_prefix, "sv_");
                assert_eq!(candidates[0], "sv_gravity");
            }
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[test]
    fn test_common_prefix_can_be_a_whole_candidate() {
        match complete("ma", &strings(&["maxplayers", "map", "map_list"]), 80) {
            Completion::Multiple { common_prefix, .. } => assert_eq!(common_prefix, "ma"),
            other => panic!("unexpected completion: {:?}", other),
        }
        match complete("ma", &strings(&["map_list", "map"]), 80) {
            Completion::Multiple { common_prefix, .. } => assert_eq!(common_prefix, "map"),
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[test]
    fn test_layout_fit() {
        assert_eq!(ColumnLayout::fit(80, 9).columns, 7);
        assert_eq!(ColumnLayout::fit(20, 9).columns, 1);
        assert_eq!(ColumnLayout::fit(5, 9).columns, 1);
        assert_eq!(ColumnLayout::fit(0, 3).columns, 1);
    }

    #[test]
    fn test_layout_render_wraps_rows() {
        let layout = ColumnLayout { columns: 2, longest: 4 };
        let mut out = Vec::new();
        layout
            .render(&strings(&["map", "quit", "echo"]), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "map   quit  \necho  ");
    }
}
