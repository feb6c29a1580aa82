use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::color::Color;

const APP_NAME: &str = "tmc-cli";

pub const DEFAULT_SERVER_ADDRESS: &str = "https://tmc.mooc.fi";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Color of the passed share of test result bars.
    pub passed_tests_left: Color,
    /// Color of the failed share of test result bars.
    pub passed_tests_right: Color,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            username: None,
            password: None,
            passed_tests_left: Color::Green,
            passed_tests_right: Color::Red,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config: Config = confy::load(APP_NAME, None)?;
        Ok(config)
    }

    /// Settings for commands that only work locally.
    ///
    /// Never creates the config file, and a missing or unreadable file falls
    /// back to the defaults.
    pub fn load_or_default() -> Self {
        match get_config_path() {
            Ok(path) => Self::read_or_default(&path),
            Err(err) => {
                tracing::warn!(error = %err, "cannot locate config file, using defaults");
                Self::default()
            }
        }
    }

    fn read_or_default(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        match confy::load_path(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "ignoring unreadable config file"
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        confy::store(APP_NAME, None, self)?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Bar colors for this invocation, or no colors at all.
    pub fn bar_colors(&self, colors_enabled: bool) -> (Color, Color) {
        if colors_enabled {
            (self.passed_tests_left, self.passed_tests_right)
        } else {
            (Color::None, Color::None)
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let config_path = confy::get_configuration_file_path(APP_NAME, None)?;
    Ok(config_path)
}
