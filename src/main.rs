//! EDAI CLI
//!
//! Opens one file, runs the interactive menus and exits with the session's
//! status code.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::debug;

use edai::cli::{commands, Cli};
use edai::error::EXIT_FATAL;
use edai::menu::TerminalPrompter;
use edai::{EdaiError, ExitStatus, ToolConfig, Toolbox, EDAI_VERSION};

fn main() -> ExitCode {
    // Warnings only by default; the menus own the terminal.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    println!("EDAI v{}", EDAI_VERSION);

    match run(cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            debug!("{:#}", e);
            ExitCode::from(report(&e))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    let tool_config = ToolConfig::from_env();
    tool_config.preflight()?;
    let tools = Toolbox::system(&tool_config);

    let stdin = io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), io::stdout());

    let status = commands::run(cli.path.as_deref(), &tools, &mut prompter)
        .context("EDAI session failed")?;
    Ok(status)
}

/// Print the error for the user and pick the exit code.
fn report(e: &anyhow::Error) -> u8 {
    match e.chain().find_map(|cause| cause.downcast_ref::<EdaiError>()) {
        Some(edai) => {
            eprintln!("{}", edai);
            if let Some(hint) = edai.recovery_suggestion() {
                eprintln!("{}", hint);
            }
            edai.exit_code()
        }
        None => {
            eprintln!("{:#}", e);
            EXIT_FATAL
        }
    }
}
