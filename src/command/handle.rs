// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Revocable handles to registered commands.
//!
//! A [`CommandHandle`] is returned whenever a command is inserted into a
//! menu. It only holds weak references, to the command and to the registry
//! that owns it, so it never keeps a torn down subtree alive and every
//! operation quietly does nothing once either referent is gone.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{Command, Registry};

#[derive(Clone)]
struct Descriptor {
    cmd: Weak<dyn Command>,
    registry: Weak<RefCell<Vec<Rc<dyn Command>>>>,
}

/// Weak, revocable capability over a registered command.
///
/// A default handle refers to nothing and ignores every call.
#[derive(Clone, Default)]
pub struct CommandHandle {
    descriptor: Option<Descriptor>,
}

impl CommandHandle {
    pub(crate) fn new(cmd: &Rc<dyn Command>, registry: &Registry) -> Self {
        Self {
            descriptor: Some(Descriptor {
                cmd: Rc::downgrade(cmd),
                registry: Rc::downgrade(registry),
            }),
        }
    }

    fn command(&self) -> Option<Rc<dyn Command>> {
        self.descriptor.as_ref().and_then(|d| d.cmd.upgrade())
    }

    /// Make the command visible again to dispatch, help and completion.
    pub fn enable(&self) {
        if let Some(cmd) = self.command() {
            cmd.set_enabled(true);
        }
    }

    /// Hide the command from dispatch, help and completion.
    pub fn disable(&self) {
        if let Some(cmd) = self.command() {
            cmd.set_enabled(false);
        }
    }

    /// Remove the command from its owning registry.
    ///
    /// The entry is located by identity, so another command with the same
    /// name is left untouched. Removing twice is a no-op.
    pub fn remove(&self) {
        let Some(descriptor) = &self.descriptor else {
            return;
        };
        let (Some(cmd), Some(registry)) = (descriptor.cmd.upgrade(), descriptor.registry.upgrade()) else {
            return;
        };

        let mut cmds = registry.borrow_mut();
        if let Some(pos) = cmds
            .iter()
            .position(|c| std::ptr::addr_eq(Rc::as_ptr(c), Rc::as_ptr(&cmd)))
        {
            let removed = cmds.remove(pos);
            tracing::debug!("Removed command '{}'", removed.name());
        }
    }

    /// Whether the command still exists.
    pub fn is_alive(&self) -> bool {
        self.command().is_some()
    }
}

impl std::fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.command() {
            Some(cmd) => write!(f, "CommandHandle({})", cmd.name()),
            None => write!(f, "CommandHandle(<gone>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::IntoCommand;
    use std::io::Write;

    fn noop() -> Rc<dyn Command> {
        let handler = |_out: &mut dyn Write| -> anyhow::Result<()> { Ok(()) };
        handler.into_command("noop".into(), String::new(), Vec::new())
    }

    #[test]
    fn test_default_handle_is_inert() {
        let handle = CommandHandle::default();
        handle.enable();
        handle.disable();
        handle.remove();
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_toggle_and_remove_by_identity() {
        let registry: Registry = Rc::new(RefCell::new(Vec::new()));
        let first = noop();
        let second = noop();
        registry.borrow_mut().push(Rc::clone(&first));
        registry.borrow_mut().push(Rc::clone(&second));
        let handle = CommandHandle::new(&second, &registry);

        handle.disable();
        assert!(!second.is_enabled());
        handle.enable();
        assert!(second.is_enabled());

        handle.remove();
        assert_eq!(registry.borrow().len(), 1);
        assert!(Rc::ptr_eq(&registry.borrow()[0], &first));

        // still alive through `second`, but no longer in the registry
        handle.remove();
        assert_eq!(registry.borrow().len(), 1);
    }

    #[test]
    fn test_handle_outlives_registry() {
        let cmd = noop();
        let registry: Registry = Rc::new(RefCell::new(vec![Rc::clone(&cmd)]));
        let handle = CommandHandle::new(&cmd, &registry);
        drop(registry);
        handle.remove();
        handle.disable();
        assert!(!cmd.is_enabled());

        drop(cmd);
        assert!(!handle.is_alive());
        handle.enable();
        handle.remove();
    }
}
