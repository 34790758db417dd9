// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Commands: the units a [`Menu`](crate::menu::Menu) tree is built from.
//!
//! This module provides:
//! - The [`Command`] trait shared by leaf commands and menus
//! - Typed and freeform leaf commands ([`leaf`])
//! - Typed parameter parsing ([`param`])
//! - Revocable handles returned on registration ([`handle`])

pub mod handle;
pub mod leaf;
pub mod param;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use anyhow::Result;

use crate::session::Session;

pub use handle::CommandHandle;
pub use leaf::{Freeform, FreeformCommand, IntoCommand, Typed, TypedCommand, TypedHandler};
pub use param::{select, Param, LIST_OF_STRINGS_TAG};

/// Ordered child registry of a menu.
///
/// Shared so that handles can hold a weak reference to it.
pub type Registry = Rc<RefCell<Vec<Rc<dyn Command>>>>;

/// A node of the command tree.
///
/// Implementations must treat a disabled command as invisible: no match in
/// [`exec`](Command::exec), no output from [`help`](Command::help) and no
/// entries from [`complete`](Command::complete).
pub trait Command {
    /// Name the command is matched against.
    fn name(&self) -> &str;

    /// Whether the command is currently enabled.
    fn is_enabled(&self) -> bool;

    /// Enable or disable the command.
    fn set_enabled(&self, enabled: bool);

    /// Try to execute the tokenized line.
    ///
    /// Returns `Ok(false)` when the line does not match this command and
    /// `Err` only when a matched handler failed.
    fn exec(&self, tokens: &[String], session: &mut Session<'_>) -> Result<bool>;

    /// Write the help entry of this command.
    fn help(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Completion candidates for a partial line.
    fn complete(&self, line: &str) -> Vec<String> {
        if self.is_enabled() && self.name().starts_with(line) {
            vec![self.name().to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Collect the completions of every command in a registry.
pub fn completions(cmds: &[Rc<dyn Command>], line: &str) -> Vec<String> {
    cmds.iter().flat_map(|cmd| cmd.complete(line)).collect()
}

/// Write a help entry in the common ` - name <params>\n\tdescription` layout.
pub(crate) fn write_help_entry<'p>(
    out: &mut dyn Write,
    name: &str,
    params: impl IntoIterator<Item = &'p str>,
    description: &str,
) -> io::Result<()> {
    write!(out, " - {}", name)?;
    for param in params {
        write!(out, " {}", param)?;
    }
    writeln!(out, "\n\t{}", description)
}

/// Parameter labels for help output: user supplied names win over type tags.
pub(crate) fn param_labels(param_desc: &[String], type_tags: &[&'static str]) -> Vec<String> {
    if param_desc.is_empty() {
        type_tags.iter().map(|tag| tag.to_string()).collect()
    } else {
        param_desc.iter().map(|desc| format!("<{}>", desc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_help_entry() {
        let mut out = Vec::new();
        write_help_entry(&mut out, "add", ["<int>", "<int>"], "Add two numbers").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), " - add <int> <int>\n\tAdd two numbers\n");
    }

    #[test]
    fn test_param_labels_prefer_descriptions() {
        let tags = ["<int>", "<string>"];
        assert_eq!(param_labels(&[], &tags), vec!["<int>", "<string>"]);
        let names = vec!["port".to_string(), "host".to_string()];
        assert_eq!(param_labels(&names, &tags), vec!["<port>", "<host>"]);
    }
}
