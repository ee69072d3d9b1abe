use std::env;

use crate::buffer::BLOCK_SIZE;

pub const PROMPT: &str = "> ";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Presentation and buffering settings for a driver run.
#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    pub color: bool,
    pub block_size: usize,
}

impl Config {
    /// Defaults, with color turned off when `NO_COLOR` is set to anything
    /// non-empty.
    pub fn from_env() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        Self {
            color: !no_color,
            ..Self::default()
        }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn prompt_text(&self) -> String {
        if self.color {
            format!("{GREEN}{}{RESET}", self.prompt)
        } else {
            self.prompt.clone()
        }
    }

    pub fn error_line(&self, message: &str) -> String {
        if self.color {
            format!("{RED}error: {message}{RESET}")
        } else {
            format!("error: {message}")
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            color: true,
            block_size: BLOCK_SIZE,
        }
    }
}
