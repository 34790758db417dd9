// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Local terminal driver for a [`Session`].
//!
//! This module provides:
//! - Tab completion and hints over the command tree
//! - Interactive, plain and scripted line sources
//! - The read/feed loop tying a line source to a session
//!
//! ## Example
//!
//! ```no_run
//! use cmdtree::cli::{run, InteractiveInput};
//! use cmdtree::{Menu, Session, Shell};
//!
//! let shell = Shell::new(Menu::new("cli", "Root menu"));
//! let mut session = Session::new(&shell, std::io::stdout());
//! let mut input = InteractiveInput::new(100)?;
//! run(&mut session, &mut input)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod completer;
pub mod input;

use anyhow::Result;

use crate::session::Session;

// Re-export commonly used types
pub use completer::ShellCompleter;
pub use input::{InputSource, InteractiveInput, ScriptInput, SimpleInput};

/// Feed lines from `input` into `session` until the session exits or the
/// input ends.
///
/// End of input exits the session, so exit hooks and history persistence
/// run either way.
pub fn run(session: &mut Session<'_>, input: &mut dyn InputSource) -> Result<()> {
    while !session.is_exited() {
        match input.read_line(session) {
            Ok(Some(line)) => session.feed(&line),
            Ok(None) => {
                tracing::debug!("End of input");
                session.exit();
            }
            Err(e) => {
                session.exit();
                return Err(e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Menu, Shell};
    use std::cell::RefCell;
    use std::io::{Cursor, Write};
    use std::rc::Rc;

    #[test]
    fn test_run_stops_at_exit() {
        let calls = Rc::new(RefCell::new(0));
        let root = Menu::new("cli", "Root");
        let counter = Rc::clone(&calls);
        root.insert(
            "tick",
            move |_out: &mut dyn Write| -> anyhow::Result<()> {
                *counter.borrow_mut() += 1;
                Ok(())
            },
            "Count",
        );
        let shell = Shell::new(root);
        let mut session = Session::new(&shell, Vec::new());
        let mut input = ScriptInput::new(Cursor::new("tick\ntick\nexit\ntick\n"));

        run(&mut session, &mut input).unwrap();
        assert!(session.is_exited());
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_run_exits_at_end_of_input() {
        let shell = Shell::new(Menu::named("cli"));
        let mut session = Session::new(&shell, Vec::new());
        let mut input = ScriptInput::new(Cursor::new("help\n"));

        run(&mut session, &mut input).unwrap();
        assert!(session.is_exited());
        assert_eq!(session.history().commands(), vec!["help"]);
    }
}
