// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! String helpers shared by the directive parser and the console.
//!
//! Whitespace here is the C locale set (space, `\t`, `\n`, `\v`, `\f`, `\r`),
//! which differs from [`char::is_ascii_whitespace`] in that it includes `\v`.

/// Bytes treated as whitespace by the directive tokenizer.
pub const WHITESPACE: &[char] = &[' ', '\t', '\n', '\x0B', '\x0C', '\r'];

/// Returns true if `byte` is one of [`WHITESPACE`].
#[inline]
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Trim leading and trailing whitespace.
///
/// # Examples
///
/// ```
/// use dedhost::strings::trim;
///
/// assert_eq!(trim("\t -game cstrike \x0B\r\n"), "-game cstrike");
/// ```
pub fn trim(input: &str) -> &str {
    input.trim_matches(WHITESPACE)
}

/// ASCII case-insensitive equality.
pub fn equal_ignore_case(lhs: &str, rhs: &str) -> bool {
    lhs.eq_ignore_ascii_case(rhs)
}

/// Length in bytes of the longest common prefix of `lhs` and `rhs`, always on
/// a char boundary of `lhs`.
pub fn common_prefix_len(lhs: &str, rhs: &str) -> usize {
    lhs.char_indices()
        .zip(rhs.chars())
        .find(|((_, a), b)| a != b)
        .map_or_else(|| lhs.len().min(rhs.len()), |((index, _), _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim("  \x0C\r\n-dev\x0B "), "-dev");
        assert_eq!(trim(""), "");
        assert_eq!(trim(" \t "), "");
        assert_eq!(trim("a  b"), "a  b");
    }

    #[test]
    fn test_equal_ignore_case() {
        assert!(equal_ignore_case("-GAME", "-game"));
        assert!(!equal_ignore_case("-game", "-games"));
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("map_foo", "map_bar"), 4);
        assert_eq!(common_prefix_len("map", "map_bar"), 3);
        assert_eq!(common_prefix_len("map_bar", "map"), 3);
        assert_eq!(common_prefix_len("abc", "xyz"), 0);
        assert_eq!(common_prefix_len("ñu", "ño"), 2);
    }
}
