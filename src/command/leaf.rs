// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Leaf commands.
//!
//! Two shapes of handler are accepted when registering a command:
//!
//! - **typed**: `Fn(&mut dyn Write, A1, ..., An) -> anyhow::Result<()>` where
//!   every `Ai` is a [`Param`]. The command matches only lines with exactly
//!   `n` arguments that all convert to their parameter type.
//! - **freeform**: `Fn(&mut dyn Write, Vec<String>) -> anyhow::Result<()>`.
//!   The command matches on its name and receives every remaining token.
//!
//! The shape is picked from the handler's signature through the marker
//! parameter of [`IntoCommand`]; `Vec<String>` is not a [`Param`], so a
//! handler always fits exactly one shape.
//!
//! ## Example
//!
//! ```
//! use std::io::Write;
//! use cmdtree::command::{Command, IntoCommand};
//!
//! let add = |out: &mut dyn Write, a: i32, b: i32| -> anyhow::Result<()> {
//!     writeln!(out, "{}", a + b)?;
//!     Ok(())
//! };
//! let cmd = add.into_command("add".into(), "Add two numbers".into(), Vec::new());
//! assert_eq!(cmd.name(), "add");
//! ```

use std::cell::Cell;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::rc::Rc;

use anyhow::Result;

use super::param::{select, Param, LIST_OF_STRINGS_TAG};
use super::{param_labels, write_help_entry, Command};
use crate::session::Session;

/// A handler taking a fixed list of typed arguments.
///
/// Implemented for closures and functions of up to eight [`Param`] arguments
/// after the output sink.
pub trait TypedHandler<Args>: 'static {
    /// Help tags of the parameters, in declaration order.
    fn type_tags() -> Vec<&'static str>;

    /// Number of arguments the handler takes.
    fn arity() -> usize {
        Self::type_tags().len()
    }

    /// Convert `tokens` left to right and invoke the handler.
    ///
    /// Returns `None` without invoking anything as soon as one token fails to
    /// convert. `tokens.len()` must equal [`arity`](TypedHandler::arity).
    fn bind_and_call(&self, out: &mut dyn Write, tokens: &[String]) -> Option<Result<()>>;
}

macro_rules! impl_typed_handler {
    ($($arg:ident $var:ident),*) => {
        impl<F $(, $arg)*> TypedHandler<($($arg,)*)> for F
        where
            F: Fn(&mut dyn Write $(, $arg)*) -> Result<()> + 'static,
            $($arg: Param,)*
        {
            fn type_tags() -> Vec<&'static str> {
                vec![$(<$arg as Param>::type_tag()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn bind_and_call(&self, out: &mut dyn Write, tokens: &[String]) -> Option<Result<()>> {
                debug_assert_eq!(tokens.len(), Self::arity(), "binder called with wrong arity");
                let mut tokens = tokens.iter();
                $(let $var = select::<$arg>(tokens.next()?)?;)*
                Some((self)(out $(, $var)*))
            }
        }
    };
}

impl_typed_handler!();
impl_typed_handler!(A1 a1);
impl_typed_handler!(A1 a1, A2 a2);
impl_typed_handler!(A1 a1, A2 a2, A3 a3);
impl_typed_handler!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_typed_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_typed_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_typed_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_typed_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// Marker for typed handlers.
pub struct Typed<Args>(PhantomData<fn() -> Args>);

/// Marker for freeform handlers.
pub enum Freeform {}

/// Conversion of a handler into a boxed command.
///
/// `Marker` only exists to keep the typed and freeform implementations apart;
/// callers never name it.
pub trait IntoCommand<Marker> {
    /// Build the command.
    fn into_command(
        self,
        name: String,
        description: String,
        param_desc: Vec<String>,
    ) -> Rc<dyn Command>;
}

impl<F, Args> IntoCommand<Typed<Args>> for F
where
    F: TypedHandler<Args>,
    Args: 'static,
{
    fn into_command(
        self,
        name: String,
        description: String,
        param_desc: Vec<String>,
    ) -> Rc<dyn Command> {
        Rc::new(TypedCommand::<F, Args>::new(name, self, description, param_desc))
    }
}

impl<F> IntoCommand<Freeform> for F
where
    F: Fn(&mut dyn Write, Vec<String>) -> Result<()> + 'static,
{
    fn into_command(
        self,
        name: String,
        description: String,
        param_desc: Vec<String>,
    ) -> Rc<dyn Command> {
        Rc::new(FreeformCommand::new(name, self, description, param_desc))
    }
}

/// Command with a fixed number of typed arguments.
pub struct TypedCommand<F, Args> {
    name: String,
    description: String,
    param_desc: Vec<String>,
    enabled: Cell<bool>,
    func: F,
    _args: PhantomData<fn() -> Args>,
}

impl<F, Args> TypedCommand<F, Args>
where
    F: TypedHandler<Args>,
{
    /// Create a new typed command.
    pub fn new(
        name: impl Into<String>,
        func: F,
        description: impl Into<String>,
        param_desc: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_desc,
            enabled: Cell::new(true),
            func,
            _args: PhantomData,
        }
    }
}

impl<F, Args> Command for TypedCommand<F, Args>
where
    F: TypedHandler<Args>,
    Args: 'static,
{
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
        if !self.is_enabled() || tokens.len() != F::arity() + 1 {
            return Ok(false);
        }
        if tokens[0] != self.name {
            return Ok(false);
        }

        match self.func.bind_and_call(session.output(), &tokens[1..]) {
            Some(result) => result.map(|()| true),
            None => {
                tracing::debug!("Arguments of '{}' did not convert, skipping", self.name);
                Ok(false)
            }
        }
    }

    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let labels = param_labels(&self.param_desc, &F::type_tags());
        write_help_entry(out, &self.name, labels.iter().map(String::as_str), &self.description)
    }
}

/// Command receiving every token after its name.
pub struct FreeformCommand<F> {
    name: String,
    description: String,
    param_desc: Vec<String>,
    enabled: Cell<bool>,
    func: F,
}

impl<F> FreeformCommand<F>
where
    F: Fn(&mut dyn Write, Vec<String>) -> Result<()> + 'static,
{
    /// Create a new freeform command.
    pub fn new(
        name: impl Into<String>,
        func: F,
        description: impl Into<String>,
        param_desc: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_desc,
            enabled: Cell::new(true),
            func,
        }
    }
}

impl<F> Command for FreeformCommand<F>
where
    F: Fn(&mut dyn Write, Vec<String>) -> Result<()> + 'static,
{
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
        match tokens.split_first() {
            Some((first, rest)) if *first == self.name => {
                (self.func)(session.output(), rest.to_vec())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let labels = param_labels(&self.param_desc, &[LIST_OF_STRINGS_TAG]);
        write_help_entry(out, &self.name, labels.iter().map(String::as_str), &self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn help_of(cmd: &dyn Command) -> String {
        let mut out = Vec::new();
        cmd.help(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_typed_arity_and_tags() {
        fn add(out: &mut dyn Write, a: i32, b: f64) -> Result<()> {
            writeln!(out, "{}", a as f64 + b)?;
            Ok(())
        }
        fn tags_of<F: TypedHandler<A>, A>(_: &F) -> (usize, Vec<&'static str>) {
            (F::arity(), F::type_tags())
        }
        assert_eq!(tags_of(&add), (2, vec!["<int>", "<double>"]));
    }

    #[test]
    fn test_bind_stops_on_first_failure() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&calls);
        let handler = move |_out: &mut dyn Write, a: u8, b: String| -> Result<()> {
            seen.borrow_mut().push((a, b));
            Ok(())
        };

        let mut sink = Vec::new();
        let tokens = vec!["300".to_string(), "x".to_string()];
        assert!(handler.bind_and_call(&mut sink, &tokens).is_none());
        assert!(calls.borrow().is_empty());

        let tokens = vec!["7".to_string(), "x".to_string()];
        assert!(handler.bind_and_call(&mut sink, &tokens).unwrap().is_ok());
        assert_eq!(*calls.borrow(), vec![(7, "x".to_string())]);
    }

    #[test]
    fn test_typed_help_uses_tags_or_names() {
        let handler = |_out: &mut dyn Write, _port: u16, _host: String| -> Result<()> { Ok(()) };
        let cmd = handler.into_command("connect".into(), "Open a connection".into(), Vec::new());
        assert_eq!(help_of(&*cmd), " - connect <unsigned short> <string>\n\tOpen a connection\n");

        let cmd = handler.into_command(
            "connect".into(),
            "Open a connection".into(),
            vec!["port".into(), "host".into()],
        );
        assert_eq!(help_of(&*cmd), " - connect <port> <host>\n\tOpen a connection\n");
    }

    #[test]
    fn test_freeform_help_and_disable() {
        let handler = |_out: &mut dyn Write, _args: Vec<String>| -> Result<()> { Ok(()) };
        let cmd = handler.into_command("echo".into(), "Print the arguments".into(), Vec::new());
        assert_eq!(help_of(&*cmd), " - echo <list of strings>\n\tPrint the arguments\n");
        assert_eq!(cmd.complete("ec"), vec!["echo"]);

        cmd.set_enabled(false);
        assert!(help_of(&*cmd).is_empty());
        assert!(cmd.complete("ec").is_empty());
    }
}
