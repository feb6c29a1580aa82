//! Command modules for tmc-cli
//!
//! Each submodule handles a specific CLI subcommand.

pub mod easter_egg;
pub mod login;

use anyhow::Result;
use colored::Colorize;
use console::Term;

/// Prompt the user for input with a message
pub fn prompt_input(message: &str) -> Result<String> {
    print!("{}", message.cyan());
    std::io::Write::flush(&mut std::io::stdout())?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt for a secret without echoing it back
pub fn prompt_password(message: &str) -> Result<String> {
    let term = Term::stdout();
    term.write_str(&message.cyan().to_string())?;
    Ok(term.read_secure_line()?)
}
