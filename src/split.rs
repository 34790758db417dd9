// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Command line tokenizer.
//!
//! Lines are split with POSIX shell quoting rules (`shell_words`):
//!
//! - `"..."` and `'...'` group text into a single token (quotes are dropped)
//! - quoted text can be glued to plain text: `a"b c"` -> `ab c`
//! - a backslash escapes the next character outside quotes
//! - `""` yields an empty token
//! - a word starting with `#` starts a comment that runs to the end of line
//!
//! A line that does not parse (unterminated quote, trailing backslash) is
//! split on whitespace instead, with quote characters kept as typed.

/// Split a command line into tokens.
///
/// # Example
///
/// ```
/// use cmdtree::split::tokenize;
///
/// assert_eq!(tokenize(r#"echo "hello world" x"#), vec!["echo", "hello world", "x"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!("Failed to parse {:?} ({}), splitting on whitespace", line, e);
            line.split_whitespace().map(str::to_string).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(tokenize("net show all"), vec!["net", "show", "all"]);
        assert_eq!(tokenize("  ping\t  1  "), vec!["ping", "1"]);
    }

    #[test]
    fn test_empty_lines() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t ").is_empty());
    }

    #[test]
    fn test_quoted_tokens() {
        assert_eq!(tokenize(r#"say "hello world""#), vec!["say", "hello world"]);
        assert_eq!(tokenize("say 'it is \"ok\"'"), vec!["say", "it is \"ok\""]);
        assert_eq!(tokenize(r#"a"b c"d"#), vec!["ab cd"]);
    }

    #[test]
    fn test_empty_quotes_make_empty_token() {
        assert_eq!(tokenize(r#"set name """#), vec!["set", "name", ""]);
        assert_eq!(tokenize("set name ''"), vec!["set", "name", ""]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(tokenize(r"one\ token"), vec!["one token"]);
        assert_eq!(tokenize(r#""a \"quoted\" word""#), vec![r#"a "quoted" word"#]);
        // backslash is literal inside single quotes
        assert_eq!(tokenize(r"'c:\dir'"), vec![r"c:\dir"]);
    }

    #[test]
    fn test_comment_word_ends_line() {
        assert_eq!(tokenize("ping # note"), vec!["ping"]);
        assert_eq!(tokenize("tag a#b"), vec!["tag", "a#b"]);
    }

    #[test]
    fn test_unparsable_line_splits_on_whitespace() {
        assert_eq!(tokenize(r#"echo "open ended"#), vec!["echo", "\"open", "ended"]);
        assert_eq!(tokenize(r"trailing \"), vec!["trailing", "\\"]);
    }
}
