//! `page-transformer version`: crate version, build metadata, and the size of
//! the built-in mapping table.

use serde::Serialize;

use crate::color::ColorScheme;
use crate::mapping::MappingRuleSet;

#[derive(Debug, Serialize)]
struct BuildInfo {
  version: &'static str,
  git_commit: &'static str,
  build_timestamp: String,
  target: &'static str,
  rust_version: &'static str,
  builtin_web_part_mappings: usize,
  builtin_layout_mappings: usize,
}

impl BuildInfo {
  fn collect() -> Self {
    let builtin = MappingRuleSet::builtin();
    Self {
      version: env!("CARGO_PKG_VERSION"),
      git_commit: env!("GIT_HASH"),
      build_timestamp: format_timestamp(env!("BUILD_TIMESTAMP")),
      target: env!("TARGET"),
      rust_version: env!("RUSTC_VERSION"),
      builtin_web_part_mappings: builtin.web_part_mapping_count(),
      builtin_layout_mappings: builtin.layout_mapping_count(),
    }
  }
}

/// Print version information.
///
/// # Arguments
/// * `json` - Emit a JSON document instead of colored text.
/// * `short` - Print only the semantic version.
/// * `colors` - Shared color scheme.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  if short {
    println!("{}", env!("CARGO_PKG_VERSION"));
    return;
  }

  let info = BuildInfo::collect();
  if json {
    match serde_json::to_string_pretty(&info) {
      Ok(text) => println!("{text}"),
      Err(e) => eprintln!("{} {e}", colors.error("Error:")),
    }
    return;
  }

  println!("{} {}", colors.emphasis("page-transformer"), colors.number(info.version));
  let rows = [
    ("Git commit", colors.code(info.git_commit)),
    ("Built", colors.dimmed(&info.build_timestamp)),
    ("Target", info.target.to_string()),
    ("Rust version", info.rust_version.to_string()),
    (
      "Mappings",
      format!(
        "{} web parts, {} layouts built in",
        colors.number(info.builtin_web_part_mappings),
        colors.number(info.builtin_layout_mappings)
      ),
    ),
  ];
  for (label, value) in rows {
    println!("{}: {value}", colors.emphasis(label));
  }
}

/// Unix build timestamp rendered as UTC; non-numeric input is returned as is.
fn format_timestamp(timestamp: &str) -> String {
  timestamp
    .parse::<i64>()
    .ok()
    .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
    .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    .unwrap_or_else(|| timestamp.to_string())
}
