//! `page-transformer mapping check`.

use std::process;

use clap::Subcommand;

use crate::cli::{Cli, exit_code};
use crate::color::ColorScheme;
use crate::mapping::{MappingRuleSet, MappingSources, UnmappedPolicy};

#[derive(Debug, Subcommand)]
pub enum MappingCommand {
  /// Load the configured mapping files and summarise them
  Check,
}

pub(crate) fn handle_mapping_command(subcommand: &MappingCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    MappingCommand::Check => {
      let sources = cli.mapping.sources();
      match sources.load() {
        Ok(rules) => print_summary(&sources, &rules, colors),
        Err(e) => {
          eprintln!("{} {e}", colors.error("✗"));
          process::exit(exit_code::MAPPING);
        }
      }
    }
  }
}

fn print_summary(sources: &MappingSources, rules: &MappingRuleSet, colors: &ColorScheme) {
  let origin = |file: &Option<std::path::PathBuf>| match file {
    Some(path) => colors.path(path.display()),
    None => colors.dimmed("built-in"),
  };

  println!("{}", colors.emphasis("Mapping definitions"));
  println!(
    "  {:<12} {:>4}  {}",
    "Web parts",
    colors.number(rules.web_part_mapping_count()),
    origin(&sources.web_part_mapping_file)
  );
  println!(
    "  {:<12} {:>4}  {}",
    "Layouts",
    colors.number(rules.layout_mapping_count()),
    origin(&sources.web_part_mapping_file)
  );
  println!(
    "  {:<12} {:>4}  {}",
    "Users",
    colors.number(rules.user_mapping_count()),
    origin(&sources.user_mapping_file)
  );
  println!(
    "  {:<12} {:>4}  {}",
    "URLs",
    colors.number(rules.url_mapping_count()),
    origin(&sources.url_mapping_file)
  );

  let policy = match rules.unmapped_policy() {
    UnmappedPolicy::Drop => "drop",
    UnmappedPolicy::Placeholder => "placeholder",
  };
  println!("  {:<12} {policy}", "Unmapped");
  println!("{} {}", colors.success("✓"), colors.success("Mapping definitions are valid"));
}
