// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! The root controller shared by every session.
//!
//! A [`Shell`] owns the root menu of the command tree and the persistent
//! history backend, and carries the hooks that apply to all sessions: the
//! exit action and the error handler.
//!
//! ```
//! use std::io::Write;
//! use cmdtree::{Menu, Session, Shell};
//!
//! let root = Menu::new("demo", "Demo commands");
//! root.insert(
//!     "hello",
//!     |out: &mut dyn Write, name: String| -> anyhow::Result<()> {
//!         writeln!(out, "hello {}", name)?;
//!         Ok(())
//!     },
//!     "Say hello",
//! );
//!
//! let mut shell = Shell::new(root);
//! shell.set_exit_action(|out: &mut dyn Write| {
//!     let _ = writeln!(out, "bye");
//! });
//!
//! let mut output = Vec::new();
//! {
//!     let mut session = Session::new(&shell, &mut output);
//!     session.feed("hello world");
//!     session.feed("exit");
//! }
//! assert_eq!(String::from_utf8(output).unwrap(), "hello world\nbye\n");
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::config::ShellConfig;
use crate::error::format_handler_error;
use crate::history::storage::{HistoryStorage, VolatileHistoryStorage};
use crate::menu::Menu;

/// Hook run when a session exits.
pub type ExitAction = Box<dyn Fn(&mut dyn Write)>;

/// Hook run when a command handler fails; receives the command line.
pub type ErrorHandler = Box<dyn Fn(&mut dyn Write, &str, &anyhow::Error)>;

/// Root controller: command tree, history backend and shared hooks.
pub struct Shell {
    root: Rc<Menu>,
    history_storage: RefCell<Box<dyn HistoryStorage>>,
    exit_action: Option<ExitAction>,
    error_handler: Option<ErrorHandler>,
}

impl Shell {
    /// Create a shell with in-memory history.
    pub fn new(root: Rc<Menu>) -> Self {
        Self::with_history_storage(root, Box::new(VolatileHistoryStorage::default()))
    }

    /// Create a shell with the given history backend.
    pub fn with_history_storage(root: Rc<Menu>, storage: Box<dyn HistoryStorage>) -> Self {
        Self {
            root,
            history_storage: RefCell::new(storage),
            exit_action: None,
            error_handler: None,
        }
    }

    /// Create a shell with the history backend described by `config`.
    pub fn from_config(root: Rc<Menu>, config: &ShellConfig) -> Self {
        Self::with_history_storage(root, config.history_storage())
    }

    /// Set the action run every time a session exits.
    pub fn set_exit_action(&mut self, action: impl Fn(&mut dyn Write) + 'static) {
        self.exit_action = Some(Box::new(action));
    }

    /// Set the handler called when a command handler returns an error.
    ///
    /// Without one, the error message is printed on the session output.
    pub fn set_error_handler(
        &mut self,
        handler: impl Fn(&mut dyn Write, &str, &anyhow::Error) + 'static,
    ) {
        self.error_handler = Some(Box::new(handler));
    }

    /// Root of the command tree.
    pub fn root_menu(&self) -> &Rc<Menu> {
        &self.root
    }

    pub(crate) fn run_exit_action(&self, out: &mut dyn Write) {
        if let Some(action) = &self.exit_action {
            action(out);
        }
    }

    pub(crate) fn handle_error(&self, out: &mut dyn Write, cmd: &str, err: &anyhow::Error) {
        match &self.error_handler {
            Some(handler) => handler(out, cmd, err),
            None => {
                if let Err(e) = writeln!(out, "{}", format_handler_error(err)) {
                    tracing::warn!("Failed to report command error: {}", e);
                }
            }
        }
    }

    pub(crate) fn stored_commands(&self) -> Vec<String> {
        match self.history_storage.borrow().commands() {
            Ok(commands) => commands,
            Err(e) => {
                tracing::warn!("Failed to load history: {:#}", e);
                Vec::new()
            }
        }
    }

    pub(crate) fn store_commands(&self, commands: &[String]) {
        if let Err(e) = self.history_storage.borrow_mut().store(commands) {
            tracing::warn!("Failed to persist history: {:#}", e);
        }
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("root", &self.root)
            .field("exit_action", &self.exit_action.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}
