// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! History persistence backends.
//!
//! A backend hands the initial command list to new sessions and receives the
//! commands each session entered when it exits. Both backends append on
//! store and keep only the newest `max_size` commands.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::error::ShellError;

/// Default number of commands kept by a backend.
pub const DEFAULT_MAX_STORED: usize = 1000;

/// Default timeout for acquiring the history file lock
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Retry interval when waiting for lock acquisition
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Storage shared by every session of a shell.
pub trait HistoryStorage {
    /// Append the commands of a finished session.
    fn store(&mut self, commands: &[String]) -> Result<()>;

    /// Commands to seed a new session with, oldest first.
    fn commands(&self) -> Result<Vec<String>>;
}

/// History kept in memory for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct VolatileHistoryStorage {
    max_size: usize,
    commands: VecDeque<String>,
}

impl VolatileHistoryStorage {
    /// Create an empty storage keeping at most `max_size` commands.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            commands: VecDeque::new(),
        }
    }
}

impl Default for VolatileHistoryStorage {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STORED)
    }
}

impl HistoryStorage for VolatileHistoryStorage {
    fn store(&mut self, commands: &[String]) -> Result<()> {
        self.commands.extend(commands.iter().cloned());
        while self.commands.len() > self.max_size {
            self.commands.pop_front();
        }
        Ok(())
    }

    fn commands(&self) -> Result<Vec<String>> {
        Ok(self.commands.iter().cloned().collect())
    }
}

/// History persisted in a text file, one command per line.
///
/// Writes take an exclusive lock on a sibling `.lock` file and replace the
/// history file through a temp file + rename, so concurrent sessions (even in
/// different processes) never interleave partial writes.
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    path: PathBuf,
    max_size: usize,
}

impl FileHistoryStorage {
    /// Create a storage backed by `path`, keeping at most `max_size` commands.
    pub fn new(path: impl Into<PathBuf>, max_size: usize) -> Self {
        Self {
            path: path.into(),
            max_size,
        }
    }

    /// Path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Acquire an exclusive lock with timeout.
    ///
    /// The lock is released when the returned file is dropped.
    fn acquire_exclusive_lock_with_timeout(path: &Path, timeout: Duration) -> Result<File> {
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file: {:?}", path))?;

        let start = Instant::now();
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(lock_file),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        return Err(ShellError::LockTimeout {
                            path: path.to_path_buf(),
                            waited: timeout,
                        }
                        .into());
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to acquire exclusive lock on {:?}", path));
                }
            }
        }
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {:?}", self.path))?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn keep_newest(&self, mut lines: Vec<String>) -> Vec<String> {
        if lines.len() > self.max_size {
            lines.drain(..lines.len() - self.max_size);
        }
        lines
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn store(&mut self, commands: &[String]) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let _lock_guard = Self::acquire_exclusive_lock_with_timeout(&self.lock_path(), LOCK_TIMEOUT)?;

        let mut lines = self.read_lines()?;
        // a line break inside a command would split it on reload
        lines.extend(commands.iter().map(|c| c.replace(['\r', '\n'], " ")));
        let lines = self.keep_newest(lines);

        let temp_path = self.path.with_extension("tmp");
        {
            let mut temp_file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;
            for line in &lines {
                writeln!(temp_file, "{}", line).with_context(|| "Failed to write to temp file")?;
            }
            temp_file
                .sync_all()
                .with_context(|| "Failed to sync temp file to disk")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to rename temp file to history file: {:?} -> {:?}", temp_path, self.path)
        })?;

        tracing::debug!("Stored {} history entries in {:?}", lines.len(), self.path);
        Ok(())
    }

    fn commands(&self) -> Result<Vec<String>> {
        let lines = self.read_lines()?;
        Ok(self.keep_newest(lines))
    }
}
