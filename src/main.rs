use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod color;
mod commands;
mod config;
mod engine;
mod error;
mod orchestrator;
mod printer;
mod progress;
mod result;
mod terminal;
mod workdir;

use config::Config;
use printer::PrintOptions;

#[derive(Parser)]
#[command(name = "tmc")]
#[command(about = "Run TMC exercise tests from the command line")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "debug", "tmc=info")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run local exercise tests
    Test {
        /// Exercise directories (defaults to the current exercise or course)
        exercises: Vec<String>,
        /// Show all test results
        #[arg(short, long)]
        all: bool,
        /// Show detailed error messages
        #[arg(short, long)]
        details: bool,
    },
    /// Login to TMC server
    Login {
        /// TMC username
        #[arg(short, long)]
        user: Option<String>,
        /// Password for the user
        #[arg(short, long)]
        password: Option<String>,
        /// Address for TMC server
        #[arg(short, long)]
        server: Option<String>,
    },
    #[command(hide = true)]
    EasterEgg {
        #[arg(short)]
        a: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is reserved for test reports
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = ?err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Test {
            exercises,
            all,
            details,
        } => {
            let config = Config::load_or_default();
            let options = PrintOptions {
                show_all: all,
                show_details: details,
            };
            commands::test::execute(&config, &exercises, options, cli.no_color)
        }
        Commands::Login {
            user,
            password,
            server,
        } => commands::login::execute(user, password, server).await,
        Commands::EasterEgg { a } => {
            commands::easter_egg::execute(a);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_test_command() {
        let cli = Cli::parse_from(["tmc", "test", "-a", "-d", "part01", "part02"]);
        match cli.command {
            Commands::Test {
                exercises,
                all,
                details,
            } => {
                assert_eq!(exercises, vec!["part01", "part02"]);
                assert!(all);
                assert!(details);
            }
            _ => panic!("expected test command"),
        }
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.no_color);
    }

    #[test]
    fn test_parse_login_command() {
        let cli = Cli::parse_from([
            "tmc",
            "--no-color",
            "login",
            "-u",
            "student",
            "-s",
            "https://example.org",
        ]);
        match cli.command {
            Commands::Login {
                user,
                password,
                server,
            } => {
                assert_eq!(user.as_deref(), Some("student"));
                assert!(password.is_none());
                assert_eq!(server.as_deref(), Some("https://example.org"));
            }
            _ => panic!("expected login command"),
        }
        assert!(cli.no_color);
    }
}
