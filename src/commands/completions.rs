//! `page-transformer completions <SHELL>`.

use std::io;

use clap::{CommandFactory, ValueEnum};
use clap_complete::{Shell as CompletionShell, generate};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

impl From<Shell> for CompletionShell {
  fn from(shell: Shell) -> Self {
    match shell {
      Shell::Bash => Self::Bash,
      Shell::Zsh => Self::Zsh,
      Shell::Fish => Self::Fish,
      Shell::Powershell => Self::PowerShell,
      Shell::Elvish => Self::Elvish,
    }
  }
}

/// Write the completion script for `shell` to stdout.
pub(crate) fn handle_completions_command(shell: Shell) {
  let mut cmd = Cli::command();
  let bin_name = cmd.get_name().to_string();
  generate(CompletionShell::from(shell), &mut cmd, bin_name, &mut io::stdout());
}
