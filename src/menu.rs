// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Menus: the composite nodes of the command tree.
//!
//! A [`Menu`] is both a namespace holding child commands and a command
//! itself: typing its name alone enters the menu, typing its name followed by
//! more tokens dispatches to its children.
//!
//! ## Example
//!
//! ```
//! use std::io::Write;
//! use cmdtree::Menu;
//!
//! let root = Menu::new("cli", "Root menu");
//! let net = Menu::new("net", "Network commands");
//! root.insert_menu(net.clone());
//!
//! net.insert(
//!     "show",
//!     |out: &mut dyn Write| -> anyhow::Result<()> {
//!         writeln!(out, "eth0 up")?;
//!         Ok(())
//!     },
//!     "Show interfaces",
//! );
//!
//! assert_eq!(root.scope_completions("net sh"), vec!["net show"]);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};
use std::rc::{Rc, Weak};

use anyhow::Result;

use crate::command::{completions, Command, CommandHandle, IntoCommand, Registry};
use crate::session::Session;

/// Description given to menus created without one.
pub const DEFAULT_MENU_DESCRIPTION: &str = "(menu)";

/// Composite node of the command tree.
pub struct Menu {
    name: String,
    description: String,
    enabled: Cell<bool>,
    /// Delegation target on a miss; not an ownership edge.
    parent: RefCell<Weak<Menu>>,
    this: Weak<Menu>,
    cmds: Registry,
}

impl Menu {
    /// Create a new menu.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        let description = description.into();
        Rc::new_cyclic(|this| Self {
            name,
            description,
            enabled: Cell::new(true),
            parent: RefCell::new(Weak::new()),
            this: this.clone(),
            cmds: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Create a new menu with the default description.
    pub fn named(name: impl Into<String>) -> Rc<Self> {
        Self::new(name, DEFAULT_MENU_DESCRIPTION)
    }

    /// Register a handler as a leaf command.
    ///
    /// Typed handlers (`Fn(&mut dyn Write, A1, ..., An)`) and freeform
    /// handlers (`Fn(&mut dyn Write, Vec<String>)`) are both accepted.
    pub fn insert<M>(
        &self,
        name: impl Into<String>,
        handler: impl IntoCommand<M>,
        help: impl Into<String>,
    ) -> CommandHandle {
        self.insert_command(handler.into_command(name.into(), help.into(), Vec::new()))
    }

    /// Register a handler with display names for its parameters.
    ///
    /// The names replace the type tags in help output.
    pub fn insert_with_params<M>(
        &self,
        name: impl Into<String>,
        params: &[&str],
        handler: impl IntoCommand<M>,
        help: impl Into<String>,
    ) -> CommandHandle {
        let params = params.iter().map(|p| p.to_string()).collect();
        self.insert_command(handler.into_command(name.into(), help.into(), params))
    }

    /// Append an already built command.
    pub fn insert_command(&self, cmd: Rc<dyn Command>) -> CommandHandle {
        if self.cmds.borrow().iter().any(|c| c.name() == cmd.name()) {
            tracing::debug!(
                "Menu '{}' already has a command named '{}', the earlier one shadows it",
                self.name,
                cmd.name()
            );
        }
        let handle = CommandHandle::new(&cmd, &self.cmds);
        self.cmds.borrow_mut().push(cmd);
        handle
    }

    /// Append a submenu, making this menu its parent.
    pub fn insert_menu(&self, menu: Rc<Menu>) -> CommandHandle {
        *menu.parent.borrow_mut() = self.this.clone();
        self.insert_command(menu)
    }

    /// Parent menu, if any.
    pub fn parent(&self) -> Option<Rc<Menu>> {
        self.parent.borrow().upgrade()
    }

    /// Menu description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Text shown in the session prompt while this menu is current.
    pub fn prompt(&self) -> &str {
        &self.name
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.cmds.borrow().len()
    }

    /// Whether the menu has no children.
    pub fn is_empty(&self) -> bool {
        self.cmds.borrow().is_empty()
    }

    /// Snapshot of the children, so handlers may add or remove commands while
    /// a dispatch is walking the registry.
    fn commands(&self) -> Vec<Rc<dyn Command>> {
        self.cmds.borrow().clone()
    }

    /// Dispatch a line typed while this menu is current.
    ///
    /// Every child is tried first. On a miss the parent's [`Command::exec`] is
    /// tried with the same tokens, so an ancestor only matches when the line
    /// starts with that ancestor's name.
    pub fn scan_cmds(&self, tokens: &[String], session: &mut Session<'_>) -> Result<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }
        for cmd in self.commands() {
            if cmd.exec(tokens, session)? {
                return Ok(true);
            }
        }
        match self.parent() {
            Some(parent) => parent.exec(tokens, session),
            None => Ok(false),
        }
    }

    /// Help for this menu's scope: every child, then the parent's entry.
    pub fn main_help(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        for cmd in self.commands() {
            cmd.help(out)?;
        }
        if let Some(parent) = self.parent() {
            parent.help(out)?;
        }
        Ok(())
    }

    /// Completions for a line typed while this menu is current.
    pub fn scope_completions(&self, line: &str) -> Vec<String> {
        let mut result = completions(&self.commands(), line);
        if let Some(parent) = self.parent() {
            result.extend(parent.complete(line));
        }
        result
    }
}

impl Command for Menu {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn exec(&self, tokens: &[String], session: &mut Session<'_>) -> Result<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }
        let Some((first, rest)) = tokens.split_first() else {
            return Ok(false);
        };
        if *first != self.name {
            return Ok(false);
        }

        if rest.is_empty() {
            if let Some(this) = self.this.upgrade() {
                tracing::debug!("Entering menu '{}'", self.name);
                session.set_current(&this);
            }
            return Ok(true);
        }

        for cmd in self.commands() {
            if cmd.exec(rest, session)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        writeln!(out, " - {}\n\t{}", self.name, self.description)
    }

    /// The menu name itself when it extends `line`; when `line` already
    /// starts with the menu name, the children's completions prefixed with it.
    fn complete(&self, line: &str) -> Vec<String> {
        if !self.is_enabled() {
            return Vec::new();
        }
        if let Some(rest) = line.strip_prefix(self.name.as_str()) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let rest = rest.trim_start();
                return completions(&self.commands(), rest)
                    .into_iter()
                    .map(|c| format!("{} {}", self.name, c))
                    .collect();
            }
        }
        if self.name.starts_with(line) {
            vec![self.name.clone()]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self.commands().iter().map(|c| c.name().to_string()).collect();
        f.debug_struct("Menu")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .field("children", &children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn help_text(menu: &Menu) -> String {
        let mut out = Vec::new();
        menu.main_help(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_tree() -> (Rc<Menu>, Rc<Menu>) {
        let root = Menu::new("cli", "Root");
        root.insert("ping", noop, "Ping");
        let net = Menu::new("net", "Network");
        net.insert("show", noop, "Show interfaces");
        net.insert("set", |_out: &mut dyn Write, _v: String| -> Result<()> { Ok(()) }, "Set value");
        root.insert_menu(Rc::clone(&net));
        (root, net)
    }

    #[test]
    fn test_insert_sets_parent() {
        let (root, net) = sample_tree();
        assert!(root.parent().is_none());
        assert!(Rc::ptr_eq(&net.parent().unwrap(), &root));
        assert_eq!(root.len(), 2);
        assert_eq!(net.prompt(), "net");
    }

    #[test]
    fn test_completion_prefix_and_recursion() {
        let (root, _net) = sample_tree();
        assert_eq!(root.scope_completions("ne"), vec!["net"]);
        assert_eq!(root.scope_completions("net sh"), vec!["net show"]);
        let mut all = root.scope_completions("net ");
        all.sort();
        assert_eq!(all, vec!["net set", "net show"]);
    }

    #[test]
    fn test_completion_requires_word_boundary() {
        let (root, _net) = sample_tree();
        assert!(root.scope_completions("network s").is_empty());
    }

    #[test]
    fn test_submenu_completions_include_parent() {
        let (_root, net) = sample_tree();
        let mut items = net.scope_completions("");
        items.sort();
        // children plus the parent's name
        assert_eq!(items, vec!["cli", "set", "show"]);
        assert_eq!(net.scope_completions("cli p"), vec!["cli ping"]);
    }

    #[test]
    fn test_main_help_lists_children_then_parent() {
        let (_root, net) = sample_tree();
        assert_eq!(
            help_text(&net),
            " - show\n\tShow interfaces\n - set <string>\n\tSet value\n - cli\n\tRoot\n"
        );
    }

    #[test]
    fn test_disabled_menu_is_invisible() {
        let (root, net) = sample_tree();
        net.set_enabled(false);
        assert!(root.scope_completions("ne").is_empty());
        assert!(!help_text(&root).contains("net"));
        assert!(help_text(&net).is_empty());
    }

    #[test]
    fn test_named_menu_default_description() {
        let menu = Menu::named("cfg");
        assert_eq!(menu.description(), DEFAULT_MENU_DESCRIPTION);
        assert!(menu.is_empty());
    }
}
