//! Login command - Verify and save TMC credentials

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    api::TmcClient,
    commands::{prompt_input, prompt_password},
    config::{get_config_path, Config},
    error::ApiError,
};

/// Login to a TMC server. Returns whether the credentials were saved.
pub async fn execute(
    user: Option<String>,
    password: Option<String>,
    server: Option<String>,
) -> Result<bool> {
    let mut config = Config::load()?;
    if config.is_authenticated() {
        tracing::info!("replacing saved credentials");
    }

    let username = match user {
        Some(u) => u,
        None => prompt_input("username: ")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt_password("password: ")?,
    };
    let server_address = server.unwrap_or_else(|| config.server_address.clone());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!("Connecting to {server_address}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let verified = verify(&server_address, &username, &password).await;
    spinner.finish_and_clear();

    if let Err(message) = verified {
        println!("{}", message.red());
        return Ok(false);
    }

    config.server_address = server_address;
    config.username = Some(username);
    config.password = Some(password);
    if let Err(err) = config.save() {
        tracing::error!(error = ?err, "saving settings failed");
        println!("{}", "Login failed.".red());
        return Ok(false);
    }
    tracing::debug!(path = ?get_config_path().ok(), "settings saved");

    println!("{}", "Login successful.".green());
    Ok(true)
}

/// Contact the server with the credentials; the error is the line shown to
/// the user.
async fn verify(server_address: &str, username: &str, password: &str) -> Result<(), String> {
    let result = match TmcClient::new(server_address) {
        Ok(client) => client.list_courses(username, password).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(courses) => {
            tracing::debug!(
                courses = ?courses.iter().map(|c| c.display_name()).collect::<Vec<_>>(),
                "credentials accepted"
            );
            Ok(())
        }
        Err(ApiError::Unauthorized) => Err("Incorrect username or password.".to_string()),
        Err(err) => {
            tracing::error!(error = ?err, server = server_address, "unable to connect to server");
            Err(format!("Unable to connect to server {server_address}"))
        }
    }
}
