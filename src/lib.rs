// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! cmdtree - hierarchical interactive command shells
//!
//! Build a tree of menus and typed commands, then feed it text lines from a
//! session. Arguments are parsed into the handler's parameter types, menus
//! can be entered and left, and every session gets help, completion and a
//! bounded history that can be persisted across runs.
//!
//! # Core Modules
//!
//! - [`menu`] - Menu nodes: registration, dispatch, help and completion
//! - [`command`] - The [`Command`] trait, leaf commands, parameters and handles
//! - [`session`] - Line processing, prompt, builtins and exit hooks
//! - [`shell`] - Root controller shared by sessions
//! - [`history`] - Per-session history and persistence backends
//! - [`split`] - Command line tokenizer
//! - [`config`] - JSON configuration file
//! - [`cli`] - Local terminal driver (rustyline)
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use cmdtree::{Menu, Session, Shell};
//!
//! let root = Menu::new("cli", "Root menu");
//! let cfg = Menu::new("cfg", "Configuration");
//! cfg.insert(
//!     "set",
//!     |out: &mut dyn Write, key: String, value: i64| -> anyhow::Result<()> {
//!         writeln!(out, "{} = {}", key, value)?;
//!         Ok(())
//!     },
//!     "Set a value",
//! );
//! root.insert_menu(cfg);
//!
//! let shell = Shell::new(root);
//! let mut output = Vec::new();
//! {
//!     let mut session = Session::new(&shell, &mut output);
//!     session.feed("cfg");
//!     session.feed("set retries 3");
//! }
//! assert_eq!(String::from_utf8(output).unwrap(), "retries = 3\n");
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod menu;
pub mod session;
pub mod shell;
pub mod split;

pub use command::{Command, CommandHandle, IntoCommand, Param};
pub use config::ShellConfig;
pub use error::ShellError;
pub use history::{FileHistoryStorage, History, HistoryStorage, VolatileHistoryStorage};
pub use menu::Menu;
pub use session::{CompletionScope, Session};
pub use shell::Shell;
pub use split::tokenize;
