// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Line sources for a local session.
//!
//! - [`InteractiveInput`]: rustyline editor with tab completion, hints and
//!   arrow-key history
//! - [`SimpleInput`]: plain stdin reader for non-interactive environments
//! - [`ScriptInput`]: lines read from any buffered reader, without a prompt

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, EditMode, Editor};

use super::completer::ShellCompleter;
use crate::session::Session;

/// Where a local session gets its lines from.
pub trait InputSource {
    /// Read the next line for `session`.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self, session: &Session<'_>) -> Result<Option<String>>;
}

/// Interactive input handler with tab completion and history.
///
/// Arrow-key recall shows the session's own [`History`](crate::History):
/// the editor's history is rebuilt from it before every read, so both always
/// hold the same entries.
pub struct InteractiveInput {
    /// Rustyline editor with our completer
    editor: Editor<ShellCompleter, DefaultHistory>,
}

impl InteractiveInput {
    /// Create a new interactive input handler keeping `history_size` lines
    /// for arrow-key recall.
    pub fn new(history_size: usize) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(false)
            .history_ignore_dups(false)?
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .auto_add_history(false)
            .max_history_size(history_size)?
            .build();

        let mut editor = Editor::with_config(config).context("Failed to create input editor")?;

        editor.set_helper(Some(ShellCompleter::new()));

        // Bind Tab to complete
        editor.bind_sequence(
            rustyline::KeyEvent::new('\t', rustyline::Modifiers::NONE),
            rustyline::Cmd::Complete,
        );

        Ok(Self { editor })
    }
}

/// Replace the editor history with `entries`, oldest first.
fn sync_history<'h, H: rustyline::history::History>(
    history: &mut H,
    entries: impl IntoIterator<Item = &'h str>,
) -> Result<()> {
    history.clear().context("Failed to clear input history")?;
    for entry in entries {
        history.add(entry).context("Failed to add history entry")?;
    }
    Ok(())
}

impl InputSource for InteractiveInput {
    fn read_line(&mut self, session: &Session<'_>) -> Result<Option<String>> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_scope(session.completion_scope());
        }
        if let Err(e) = sync_history(self.editor.history_mut(), session.history().entries()) {
            tracing::debug!("Failed to sync input history: {:#}", e);
        }

        match self.editor.readline(&session.prompt_text()) {
            Ok(line) => Ok(Some(line)),
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl+C - drop the line, keep the session
                Ok(Some(String::new()))
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl+D - signal exit
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!("Input error: {}", e)),
        }
    }
}

/// Simple input for non-interactive environments (fallback).
pub struct SimpleInput {
    reader: std::io::BufReader<std::io::Stdin>,
}

impl SimpleInput {
    /// Create a new simple input handler.
    pub fn new() -> Self {
        Self {
            reader: std::io::BufReader::new(std::io::stdin()),
        }
    }
}

impl Default for SimpleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for SimpleInput {
    fn read_line(&mut self, session: &Session<'_>) -> Result<Option<String>> {
        print!("{}", session.prompt_text());
        std::io::stdout().flush()?;

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(None), // EOF
            Ok(_) => Ok(Some(line.trim_end().to_string())),
            Err(e) => Err(anyhow::anyhow!("Input error: {}", e)),
        }
    }
}

/// Lines from a reader, fed without a prompt.
pub struct ScriptInput<R> {
    lines: std::io::Lines<R>,
}

impl<R: BufRead> ScriptInput<R> {
    /// Read lines from `reader` until it is exhausted.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> InputSource for ScriptInput<R> {
    fn read_line(&mut self, _session: &Session<'_>) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => Ok(Some(line.context("Failed to read script line")?)),
            None => Ok(None),
        }
    }
}
