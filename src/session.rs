// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! A user session on a [`Shell`].
//!
//! The session owns the output sink, the per-session history and the current
//! menu pointer. It turns raw input lines into dispatches over the command
//! tree and reports misses, handler errors and panics on its output.
//!
//! Lines are tried against a session-wide scope first (`help`, `exit`,
//! `history`), then against the current menu, which delegates upwards on a
//! miss.
//!
//! ## Example
//!
//! ```
//! use std::io::Write;
//! use cmdtree::{Menu, Session, Shell};
//!
//! let root = Menu::new("cli", "Root menu");
//! root.insert(
//!     "add",
//!     |out: &mut dyn Write, a: i32, b: i32| -> anyhow::Result<()> {
//!         writeln!(out, "{}", a + b)?;
//!         Ok(())
//!     },
//!     "Add two numbers",
//! );
//! let shell = Shell::new(root);
//!
//! let mut output = Vec::new();
//! {
//!     let mut session = Session::new(&shell, &mut output);
//!     session.feed("add 2 3");
//!     session.feed("add two 3");
//! }
//! assert_eq!(String::from_utf8(output).unwrap(), "5\nwrong command: add two 3\n");
//! ```

use std::cell::Cell;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use anyhow::Result;

use crate::command::{Command, CommandHandle};
use crate::history::History;
use crate::menu::Menu;
use crate::shell::Shell;
use crate::split::tokenize;

/// Menus a line is completed against: the session-wide scope and the menu
/// the user is in.
///
/// Holds no borrow of the session, so line editors can keep one around
/// between reads.
#[derive(Debug, Clone)]
pub struct CompletionScope {
    global: Rc<Menu>,
    current: Rc<Menu>,
}

impl CompletionScope {
    /// Sorted, deduplicated completions for a partial line.
    pub fn complete(&self, line: &str) -> Vec<String> {
        let line = line.trim_start();
        let mut result = self.global.scope_completions(line);
        result.extend(self.current.scope_completions(line));
        result.sort();
        result.dedup();
        result
    }
}

/// Session-wide command driving the session itself (`help`, `exit`, ...).
struct SessionCommand {
    name: &'static str,
    description: &'static str,
    enabled: Cell<bool>,
    action: fn(&mut Session<'_>) -> Result<()>,
}

impl SessionCommand {
    fn new(
        name: &'static str,
        description: &'static str,
        action: fn(&mut Session<'_>) -> Result<()>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name,
            description,
            enabled: Cell::new(true),
            action,
        })
    }
}

impl Command for SessionCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn exec(&self, tokens: &[String], session: &mut Session<'_>) -> Result<bool> {
        if !self.is_enabled() || tokens.len() != 1 || tokens[0] != self.name {
            return Ok(false);
        }
        (self.action)(session)?;
        Ok(true)
    }

    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        writeln!(out, " - {}\n\t{}", self.name, self.description)
    }
}

fn help_builtin(session: &mut Session<'_>) -> Result<()> {
    session.help()?;
    Ok(())
}

fn exit_builtin(session: &mut Session<'_>) -> Result<()> {
    session.exit();
    Ok(())
}

fn history_builtin(session: &mut Session<'_>) -> Result<()> {
    session.show_history()?;
    Ok(())
}

/// One user's interaction with a [`Shell`].
pub struct Session<'a> {
    shell: &'a Shell,
    current: Weak<Menu>,
    global_menu: Rc<Menu>,
    out: Box<dyn Write + 'a>,
    exit_action: Option<Box<dyn Fn(&mut dyn Write) + 'a>>,
    history: History,
    exited: bool,
}

impl<'a> Session<'a> {
    /// Start a session with the default history size.
    pub fn new(shell: &'a Shell, out: impl Write + 'a) -> Self {
        Self::with_history_size(shell, out, crate::history::DEFAULT_HISTORY_SIZE)
    }

    /// Start a session keeping at most `history_size` entries.
    ///
    /// The history is seeded from the shell's persistent storage.
    pub fn with_history_size(shell: &'a Shell, out: impl Write + 'a, history_size: usize) -> Self {
        let global_menu = Menu::new("", "Session commands");
        global_menu.insert_command(SessionCommand::new("help", "This help message", help_builtin));
        global_menu.insert_command(SessionCommand::new("exit", "Quit the session", exit_builtin));
        global_menu.insert_command(SessionCommand::new(
            "history",
            "Show the history",
            history_builtin,
        ));

        let mut history = History::new(history_size);
        history.load_commands(shell.stored_commands());

        Self {
            shell,
            current: Rc::downgrade(shell.root_menu()),
            global_menu,
            out: Box::new(out),
            exit_action: None,
            history,
            exited: false,
        }
    }

    /// Output sink of this session.
    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Menu the user is currently in.
    ///
    /// Falls back to the root menu if the current one no longer exists.
    pub fn current_menu(&self) -> Rc<Menu> {
        self.current
            .upgrade()
            .unwrap_or_else(|| Rc::clone(self.shell.root_menu()))
    }

    /// Make `menu` the current menu.
    pub fn set_current(&mut self, menu: &Rc<Menu>) {
        self.current = Rc::downgrade(menu);
    }

    /// Register a session-wide command that takes no arguments.
    ///
    /// Session-wide commands are matched before the current menu is searched.
    pub fn insert_global(
        &mut self,
        name: &'static str,
        description: &'static str,
        action: fn(&mut Session<'_>) -> Result<()>,
    ) -> CommandHandle {
        self.global_menu
            .insert_command(SessionCommand::new(name, description, action))
    }

    /// Process one input line.
    pub fn feed(&mut self, line: &str) {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return;
        }

        self.history.new_command(line);

        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(&tokens))) {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                tracing::debug!("No command matched {:?}", line);
                self.report(format_args!("wrong command: {}", line));
            }
            Ok(Err(e)) => {
                tracing::debug!("Command {:?} failed: {:#}", line, e);
                self.shell.handle_error(&mut *self.out, line, &e);
            }
            Err(_) => {
                tracing::warn!("Handler panicked on {:?}", line);
                self.report(format_args!(
                    "Unknown fault caught handling command line \"{}\"",
                    line
                ));
            }
        }
    }

    fn dispatch(&mut self, tokens: &[String]) -> Result<bool> {
        let global = Rc::clone(&self.global_menu);
        if global.scan_cmds(tokens, self)? {
            return Ok(true);
        }
        let current = self.current_menu();
        current.scan_cmds(tokens, self)
    }

    fn report(&mut self, message: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", message) {
            tracing::warn!("Failed to write to session output: {}", e);
        }
    }

    /// End the session.
    ///
    /// Runs the session exit action, then the shell's, then hands the
    /// commands entered in this session to the history storage. Only the
    /// first call has any effect.
    pub fn exit(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;

        if let Some(action) = &self.exit_action {
            action(&mut *self.out);
        }
        self.shell.run_exit_action(&mut *self.out);
        self.shell.store_commands(&self.history.commands());
        tracing::debug!("Session exited");
    }

    /// Whether [`exit`](Session::exit) has run.
    pub fn is_exited(&self) -> bool {
        self.exited
    }

    /// Set the action run when this session exits, before the shell's.
    pub fn set_exit_action(&mut self, action: impl Fn(&mut dyn Write) + 'a) {
        self.exit_action = Some(Box::new(action));
    }

    /// Print the commands available from the current menu.
    pub fn help(&mut self) -> io::Result<()> {
        writeln!(self.out, "Commands available:")?;
        self.global_menu.main_help(&mut *self.out)?;
        self.current_menu().main_help(&mut *self.out)
    }

    /// Print the prompt of the current menu.
    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}> ", self.current_menu().prompt())?;
        self.out.flush()
    }

    /// Prompt text of the current menu, for drivers that draw it themselves.
    pub fn prompt_text(&self) -> String {
        format!("{}> ", self.current_menu().prompt())
    }

    /// Print the session history.
    pub fn show_history(&mut self) -> io::Result<()> {
        self.history.show(&mut *self.out)
    }

    /// Recall the previous history entry.
    pub fn previous_cmd(&mut self, current_line: &str) -> String {
        self.history.previous(current_line)
    }

    /// Recall the next history entry.
    pub fn next_cmd(&mut self) -> String {
        self.history.next()
    }

    /// Completion candidates for a partial line, sorted and deduplicated.
    pub fn completions(&self, line: &str) -> Vec<String> {
        self.completion_scope().complete(line)
    }

    /// Snapshot of the menus completion currently runs against.
    pub fn completion_scope(&self) -> CompletionScope {
        CompletionScope {
            global: Rc::clone(&self.global_menu),
            current: self.current_menu(),
        }
    }

    /// Session history.
    pub fn history(&self) -> &History {
        &self.history
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.current_menu().name().to_string())
            .field("history", &self.history.len())
            .field("exited", &self.exited)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn run(shell: &Shell, lines: &[&str]) -> String {
        let mut out = Vec::new();
        {
            let mut session = Session::new(shell, &mut out);
            for line in lines {
                session.feed(line);
            }
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_line_is_ignored() {
        let shell = Shell::new(Menu::named("cli"));
        let mut out = Vec::new();
        let mut session = Session::new(&shell, &mut out);
        session.feed("   ");
        assert!(session.history().is_empty());
        drop(session);
        assert!(out.is_empty());
    }

    #[test]
    fn test_wrong_command_is_recorded() {
        let shell = Shell::new(Menu::named("cli"));
        let mut out = Vec::new();
        let mut session = Session::new(&shell, &mut out);
        session.feed("nope 1");
        assert_eq!(session.history().entries().collect::<Vec<_>>(), vec!["nope 1"]);
        drop(session);
        assert_eq!(String::from_utf8(out).unwrap(), "wrong command: nope 1\n");
    }

    #[test]
    fn test_help_lists_global_then_current() {
        let root = Menu::new("cli", "Root");
        root.insert("ping", ok, "Ping");
        let shell = Shell::new(root);
        assert_eq!(
            run(&shell, &["help"]),
            "Commands available:\n \
             - help\n\tThis help message\n \
             - exit\n\tQuit the session\n \
             - history\n\tShow the history\n \
             - ping\n\tPing\n"
        );
    }

    #[test]
    fn test_builtins_reject_arguments() {
        let shell = Shell::new(Menu::named("cli"));
        assert_eq!(run(&shell, &["help me"]), "wrong command: help me\n");
    }

    #[test]
    fn test_prompt_follows_current_menu() {
        let root = Menu::new("cli", "Root");
        root.insert_menu(Menu::named("cfg"));
        let shell = Shell::new(root);
        let mut out = Vec::new();
        {
            let mut session = Session::new(&shell, &mut out);
            session.prompt().unwrap();
            session.feed("cfg");
            session.prompt().unwrap();
            assert_eq!(session.prompt_text(), "cfg> ");
        }
        assert_eq!(String::from_utf8(out).unwrap(), "cli> cfg> ");
    }

    #[test]
    fn test_completions_include_builtins() {
        let root = Menu::new("cli", "Root");
        root.insert("history-clear", ok, "Clear");
        let shell = Shell::new(root);
        let session = Session::new(&shell, Vec::new());
        assert_eq!(session.completions("  hi"), vec!["history", "history-clear"]);
        assert_eq!(session.completions("e"), vec!["exit"]);
    }

    #[test]
    fn test_exit_runs_once() {
        let root = Menu::named("cli");
        let mut shell = Shell::new(root);
        shell.set_exit_action(|out: &mut dyn Write| {
            let _ = writeln!(out, "shell bye");
        });
        let mut out = Vec::new();
        {
            let mut session = Session::new(&shell, &mut out);
            session.set_exit_action(|out: &mut dyn Write| {
                let _ = writeln!(out, "session bye");
            });
            session.feed("exit");
            assert!(session.is_exited());
            session.exit();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "session bye\nshell bye\n");
    }

    #[test]
    fn test_insert_global() {
        fn where_action(session: &mut Session<'_>) -> Result<()> {
            let name = session.current_menu().name().to_string();
            writeln!(session.output(), "in {}", name)?;
            Ok(())
        }

        let shell = Shell::new(Menu::named("cli"));
        let mut out = Vec::new();
        {
            let mut session = Session::new(&shell, &mut out);
            let handle = session.insert_global("where", "Show the current menu", where_action);
            session.feed("where");
            handle.remove();
            session.feed("where");
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "in cli\nwrong command: where\n"
        );
    }

    #[test]
    fn test_current_menu_falls_back_to_root() {
        let root = Menu::new("cli", "Root");
        let shell = Shell::new(Rc::clone(&root));
        let cfg = Menu::named("cfg");
        let mut session = Session::new(&shell, Vec::new());
        session.set_current(&cfg);
        assert_eq!(session.current_menu().name(), "cfg");
        drop(cfg);
        assert!(Rc::ptr_eq(&session.current_menu(), &root));
    }
}
