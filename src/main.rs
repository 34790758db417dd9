// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::rc::Rc;

use cmdtree::cli::{InputSource, InteractiveInput, ScriptInput, SimpleInput};
use cmdtree::{Menu, Session, Shell, ShellConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes following sysexits.h conventions
mod exit_codes {
    /// General error - unspecified error
    pub const ERROR: i32 = 1;
    /// Configuration error - invalid or missing config
    pub const CONFIG: i32 = 78;
}

use exit_codes::*;

#[derive(Parser)]
#[command(name = "cmdtree")]
#[command(version = VERSION)]
#[command(about = "Demo shell for the cmdtree command tree library.")]
#[command(long_about = "cmdtree - hierarchical interactive command shell\n\n\
    Interactive shell:   cmdtree\n\
    Run a script:        cmdtree --script commands.txt\n\
    No saved history:    cmdtree --no-persist\n\n\
    Type 'help' inside the shell to list the available commands.")]
struct Cli {
    /// History file (default: ~/.cmdtree/history.txt)
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Do not load or save history across runs
    #[arg(long)]
    no_persist: bool,

    /// Number of history entries kept per session
    #[arg(long)]
    history_size: Option<usize>,

    /// Feed lines from a file instead of the terminal
    #[arg(long)]
    script: Option<PathBuf>,

    /// Quiet mode: only errors are logged
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose mode: detailed output for debugging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Merge command line overrides into the loaded config.
fn effective_config(cli: &Cli) -> Result<ShellConfig> {
    let mut config = ShellConfig::load()?;
    if let Some(path) = &cli.history_file {
        config.history_file = Some(path.clone());
    }
    if cli.no_persist {
        config.persist_history = false;
    }
    if let Some(size) = cli.history_size {
        config.history_size = size;
    }
    config.validate()?;
    Ok(config)
}

/// Sample command tree exercising typed, freeform and nested commands.
fn build_demo_tree() -> Rc<Menu> {
    let root = Menu::new("cli", "Demo root menu");

    root.insert(
        "hello",
        |out: &mut dyn Write| -> Result<()> {
            writeln!(out, "Hello, world")?;
            Ok(())
        },
        "Print hello world",
    );
    root.insert_with_params(
        "answer",
        &["value"],
        |out: &mut dyn Write, x: i32| -> Result<()> {
            writeln!(out, "The answer is: {}", x)?;
            Ok(())
        },
        "Print the number given",
    );
    root.insert(
        "add",
        |out: &mut dyn Write, a: f64, b: f64| -> Result<()> {
            writeln!(out, "{}", a + b)?;
            Ok(())
        },
        "Add two numbers",
    );
    root.insert(
        "reverse",
        |out: &mut dyn Write, text: String| -> Result<()> {
            let reversed: String = text.chars().rev().collect();
            writeln!(out, "{}", reversed)?;
            Ok(())
        },
        "Print the string reversed",
    );
    root.insert(
        "sort",
        |out: &mut dyn Write, mut words: Vec<String>| -> Result<()> {
            words.sort();
            writeln!(out, "{}", words.join(" "))?;
            Ok(())
        },
        "Print the words sorted alphabetically",
    );
    root.insert(
        "cat",
        |out: &mut dyn Write, path: String| -> Result<()> {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            write!(out, "{}", content)?;
            Ok(())
        },
        "Print a file",
    );

    let sub = Menu::new("sub", "A submenu");
    sub.insert(
        "hello",
        |out: &mut dyn Write| -> Result<()> {
            writeln!(out, "Hello from the submenu")?;
            Ok(())
        },
        "Print hello from the submenu",
    );
    let demo = sub.insert(
        "demo",
        |out: &mut dyn Write| -> Result<()> {
            writeln!(out, "This command can be switched off")?;
            Ok(())
        },
        "Print a demo string",
    );
    let on = demo.clone();
    sub.insert(
        "demo-on",
        move |_out: &mut dyn Write| -> Result<()> {
            on.enable();
            Ok(())
        },
        "Enable the demo command",
    );
    sub.insert(
        "demo-off",
        move |_out: &mut dyn Write| -> Result<()> {
            demo.disable();
            Ok(())
        },
        "Disable the demo command",
    );

    let subsub = Menu::named("deep");
    subsub.insert(
        "hello",
        |out: &mut dyn Write, name: String| -> Result<()> {
            writeln!(out, "Hello, {}, from the deep menu", name)?;
            Ok(())
        },
        "Greet someone from the deep menu",
    );
    sub.insert_menu(subsub);
    root.insert_menu(sub);

    root
}

fn run(cli: &Cli) -> Result<()> {
    let config = effective_config(cli)?;
    tracing::debug!("Using config: {:?}", config);

    let mut shell = Shell::from_config(build_demo_tree(), &config);
    shell.set_exit_action(|out: &mut dyn Write| {
        let _ = writeln!(out, "Goodbye");
    });

    let mut session = Session::with_history_size(&shell, io::stdout(), config.history_size);

    let mut input: Box<dyn InputSource> = match &cli.script {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open script: {:?}", path))?;
            Box::new(ScriptInput::new(BufReader::new(file)))
        }
        None if io::stdin().is_terminal() => Box::new(InteractiveInput::new(config.history_size)?),
        None => Box::new(SimpleInput::new()),
    };

    cmdtree::cli::run(&mut session, input.as_mut())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("[!] {:#}", e);
        let code = match e.downcast_ref::<cmdtree::ShellError>() {
            Some(cmdtree::ShellError::InvalidConfig(_)) => CONFIG,
            _ => ERROR,
        };
        std::process::exit(code);
    }
}
