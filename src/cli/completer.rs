// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Rustyline helper backed by the command tree.
//!
//! Completion candidates are whole lines ("net show"), so a candidate always
//! replaces the text from the start of the line up to the cursor.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result};

use crate::session::CompletionScope;

/// Tab completion and inline hints for a session.
#[derive(Debug, Default)]
pub struct ShellCompleter {
    /// Menus to complete against; refreshed before every read
    scope: Option<CompletionScope>,
}

impl ShellCompleter {
    /// Create a completer with nothing to complete yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the menus completion runs against.
    pub fn set_scope(&mut self, scope: CompletionScope) {
        self.scope = Some(scope);
    }

    fn candidates(&self, line: &str, pos: usize) -> Vec<String> {
        let Some(scope) = &self.scope else {
            return Vec::new();
        };
        let typed = line.get(..pos).unwrap_or(line);
        scope.complete(typed)
    }

    fn get_completions(&self, line: &str, pos: usize) -> Vec<Pair> {
        self.candidates(line, pos)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect()
    }

    /// Remainder of the only candidate that extends the line, if there is one.
    fn get_hint(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }
        let typed = line.trim_start();
        let mut candidates = self.candidates(line, line.len());
        if candidates.len() != 1 {
            return None;
        }
        let candidate = candidates.remove(0);
        candidate
            .strip_prefix(typed)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>)> {
        Ok((0, self.get_completions(line, pos)))
    }
}

impl Hinter for ShellCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        // Only show hint if cursor is at end of line
        if pos < line.len() {
            return None;
        }
        self.get_hint(line)
    }
}

impl Highlighter for ShellCompleter {}

impl Validator for ShellCompleter {}

impl Helper for ShellCompleter {}
