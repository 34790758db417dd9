// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Errors raised by the shell itself.
//!
//! Handler failures travel as [`anyhow::Error`]; [`ShellError`] covers the
//! conditions the library detects on its own.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Errors detected by the shell library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// Another process held the history lock for too long.
    LockTimeout { path: PathBuf, waited: Duration },
    /// A configuration value is out of range.
    InvalidConfig(String),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockTimeout { path, waited } => write!(
                f,
                "Timed out waiting for lock on {:?} after {:?}. Another session may be saving its history.",
                path, waited
            ),
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {}

/// Default diagnostic printed when a handler fails and no error handler is
/// installed.
pub fn format_handler_error(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
