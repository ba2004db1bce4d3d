//! Terminal styling for CLI output.
//!
//! Semantic helpers (`success`, `error`, `path`, ...) keep the command handlers
//! free of raw color calls and honour `--color`.

use std::fmt::Display;
use std::io::IsTerminal;

use owo_colors::OwoColorize;

use crate::cli::ColorOption;
use crate::executor::ExecutionState;

/// Color scheme shared by every command handler.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Resolve `--color` against the terminal the output goes to.
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => std::io::stdout().is_terminal(),
    };

    Self { enabled }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint(&self, text: impl Display, style: impl FnOnce(&dyn Display) -> String) -> String {
    if self.enabled { style(&text) } else { text.to_string() }
  }

  pub fn success(&self, text: impl Display) -> String {
    self.paint(text, |t| t.green().to_string())
  }

  pub fn error(&self, text: impl Display) -> String {
    self.paint(text, |t| t.bright_red().bold().to_string())
  }

  pub fn warning(&self, text: impl Display) -> String {
    self.paint(text, |t| t.yellow().to_string())
  }

  pub fn info(&self, text: impl Display) -> String {
    self.paint(text, |t| t.cyan().to_string())
  }

  pub fn emphasis(&self, text: impl Display) -> String {
    self.paint(text, |t| t.bright_white().bold().to_string())
  }

  /// URLs and page locators.
  pub fn link(&self, text: impl Display) -> String {
    self.paint(text, |t| t.blue().underline().to_string())
  }

  pub fn path(&self, text: impl Display) -> String {
    self.paint(text, |t| t.magenta().to_string())
  }

  pub fn number(&self, text: impl Display) -> String {
    self.paint(text, |t| t.bright_blue().to_string())
  }

  pub fn code(&self, text: impl Display) -> String {
    self.paint(text, |t| t.bright_green().to_string())
  }

  pub fn dimmed(&self, text: impl Display) -> String {
    self.paint(text, |t| t.dimmed().to_string())
  }

  /// Progress counters such as `03/10`.
  pub fn progress(&self, text: impl Display) -> String {
    self.paint(text, |t| t.bright_cyan().to_string())
  }

  /// Style `text` with the color matching a page outcome.
  pub fn for_state(&self, state: ExecutionState, text: impl Display) -> String {
    match state {
      ExecutionState::Completed => self.success(text),
      ExecutionState::Failed => self.error(text),
      ExecutionState::Queued | ExecutionState::Running => self.info(text),
    }
  }
}
