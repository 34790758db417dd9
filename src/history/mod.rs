// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Per-session command history.
//!
//! [`History`] is a bounded ring of past command lines with a navigation
//! cursor for previous/next recall. Persistence across sessions is delegated
//! to a [`HistoryStorage`] backend (see [`storage`]).
//!
//! ```
//! use cmdtree::History;
//!
//! let mut history = History::new(2);
//! history.new_command("a");
//! history.new_command("b");
//! history.new_command("c");
//!
//! assert_eq!(history.previous("typing"), "c");
//! assert_eq!(history.previous("c"), "b");
//! // already at the oldest kept entry: the line is left as it is
//! assert_eq!(history.previous("b edited"), "b edited");
//! assert_eq!(history.next(), "c");
//! assert_eq!(history.next(), "typing");
//! ```

pub mod storage;

use std::collections::VecDeque;
use std::io::{self, Write};

pub use storage::{FileHistoryStorage, HistoryStorage, VolatileHistoryStorage};

/// Default number of entries kept by a session.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Bounded command history with previous/next navigation.
#[derive(Debug, Clone)]
pub struct History {
    /// Maximum number of stored entries
    max_size: usize,
    /// Stored entries (oldest at front)
    entries: VecDeque<String>,
    /// Navigation cursor; `entries.len()` is the live position
    cursor: usize,
    /// Line being edited when navigation started
    live: String,
    /// Commands entered during this session (oldest first)
    session_commands: VecDeque<String>,
}

impl History {
    /// Create an empty history keeping at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: VecDeque::new(),
            cursor: 0,
            live: String::new(),
            session_commands: VecDeque::new(),
        }
    }

    /// Maximum number of stored entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    fn push_bounded(buffer: &mut VecDeque<String>, max_size: usize, line: &str) {
        if max_size == 0 {
            return;
        }
        buffer.push_back(line.to_string());
        while buffer.len() > max_size {
            buffer.pop_front();
        }
    }

    fn reset_navigation(&mut self) {
        self.cursor = self.entries.len();
        self.live.clear();
    }

    /// Record a newly entered command line.
    ///
    /// Evicts the oldest entry when full and moves the cursor back to the
    /// live position.
    pub fn new_command(&mut self, line: &str) {
        Self::push_bounded(&mut self.entries, self.max_size, line);
        Self::push_bounded(&mut self.session_commands, self.max_size, line);
        self.reset_navigation();
    }

    /// Step towards older entries.
    ///
    /// `current_line` is remembered when leaving the live position so that
    /// [`next`](History::next) can restore it. With no older entry left the
    /// cursor stays put and `current_line` is returned unchanged.
    pub fn previous(&mut self, current_line: &str) -> String {
        if self.entries.is_empty() || self.cursor == 0 {
            return current_line.to_string();
        }
        if self.cursor >= self.entries.len() {
            self.live = current_line.to_string();
        }
        self.cursor -= 1;
        self.entries[self.cursor].clone()
    }

    /// Step towards newer entries, ending on the saved live line.
    pub fn next(&mut self) -> String {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        match self.entries.get(self.cursor) {
            Some(entry) => entry.clone(),
            None => self.live.clone(),
        }
    }

    /// Seed the history with commands from persistent storage.
    ///
    /// Loaded commands are recallable but are not reported by
    /// [`commands`](History::commands).
    pub fn load_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for cmd in commands {
            Self::push_bounded(&mut self.entries, self.max_size, cmd.as_ref());
        }
        self.reset_navigation();
    }

    /// Commands entered during this session, oldest first.
    pub fn commands(&self) -> Vec<String> {
        self.session_commands.iter().cloned().collect()
    }

    /// Print the stored entries, oldest first.
    pub fn show(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.entries.is_empty() {
            return writeln!(out, "No command history.");
        }
        writeln!(out, "Command history:")?;
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(out, "  {:3}  {}", i + 1, entry)?;
        }
        Ok(())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(max: usize, lines: &[&str]) -> History {
        let mut history = History::new(max);
        for line in lines {
            history.new_command(line);
        }
        history
    }

    #[test]
    fn test_eviction_is_fifo() {
        let history = filled(3, &["a", "b", "c", "d", "e"]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["c", "d", "e"]);
    }

    #[test]
    fn test_previous_stops_at_oldest() {
        let mut history = filled(10, &["one", "two", "three"]);
        assert_eq!(history.previous(""), "three");
        assert_eq!(history.previous("three"), "two");
        assert_eq!(history.previous("two"), "one");
        // the displayed line comes back, so recall stays on the oldest entry
        assert_eq!(history.previous("one"), "one");
        assert_eq!(history.previous("one"), "one");
        assert_eq!(history.next(), "two");
    }

    #[test]
    fn test_previous_at_oldest_keeps_edited_line() {
        let mut history = filled(10, &["one", "two"]);
        assert_eq!(history.previous("draft"), "two");
        assert_eq!(history.previous("two"), "one");
        assert_eq!(history.previous("one edited"), "one edited");
        assert_eq!(history.next(), "two");
        assert_eq!(history.next(), "draft");
    }

    #[test]
    fn test_next_returns_live_line() {
        let mut history = filled(10, &["one", "two"]);
        assert_eq!(history.previous("draft"), "two");
        assert_eq!(history.previous("two"), "one");
        assert_eq!(history.next(), "two");
        assert_eq!(history.next(), "draft");
        assert_eq!(history.next(), "draft");
    }

    #[test]
    fn test_previous_on_empty_history() {
        let mut history = History::new(5);
        assert_eq!(history.previous("draft"), "draft");
        assert_eq!(history.next(), "");
    }

    #[test]
    fn test_new_command_resets_cursor() {
        let mut history = filled(10, &["one", "two"]);
        history.previous("");
        history.previous("");
        history.new_command("three");
        assert_eq!(history.previous(""), "three");
    }

    #[test]
    fn test_loaded_commands_are_not_session_commands() {
        let mut history = History::new(10);
        history.load_commands(["old1", "old2"]);
        history.new_command("new1");
        assert_eq!(history.len(), 3);
        assert_eq!(history.commands(), vec!["new1"]);
        assert_eq!(history.previous(""), "new1");
        assert_eq!(history.previous(""), "old2");
    }

    #[test]
    fn test_zero_size_history_stores_nothing() {
        let mut history = History::new(0);
        history.new_command("x");
        assert!(history.is_empty());
        assert!(history.commands().is_empty());
    }

    #[test]
    fn test_show() {
        let history = filled(10, &["ping", "net show"]);
        let mut out = Vec::new();
        history.show(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Command history:\n    1  ping\n    2  net show\n"
        );
    }
}
