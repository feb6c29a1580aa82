use std::{fmt, str::FromStr};

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Color tokens accepted in the configuration file.
///
/// `None` is the no-color sentinel: painting with it returns the text
/// untouched, which is what piped output and the tests rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    None,
}

impl Color {
    /// Wrap `text` in the escape sequences of this color.
    pub fn paint(self, text: &str) -> String {
        match self.to_colored() {
            Some(color) => text.color(color).to_string(),
            None => text.to_string(),
        }
    }

    fn to_colored(self) -> Option<colored::Color> {
        match self {
            Color::Black => Some(colored::Color::Black),
            Color::Red => Some(colored::Color::Red),
            Color::Green => Some(colored::Color::Green),
            Color::Yellow => Some(colored::Color::Yellow),
            Color::Blue => Some(colored::Color::Blue),
            Color::Magenta => Some(colored::Color::Magenta),
            Color::Cyan => Some(colored::Color::Cyan),
            Color::White => Some(colored::Color::White),
            Color::None => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
            Color::None => "none",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" | "purple" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            "none" | "" => Ok(Color::None),
            other => Err(format!("unknown color '{other}'")),
        }
    }
}
