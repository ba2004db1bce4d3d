//! `page-transformer auth test|show`.
//!
//! `test` opens a session on each configured site and asks for the current
//! user; `show` prints where each side's credentials come from without making
//! network calls.

use std::process;

use clap::Subcommand;

use super::{SiteRole, connect_or_exit, resolve_credential, site_host};
use crate::cli::{Cli, exit_code};
use crate::color::ColorScheme;
use crate::platform::SiteApi;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
  /// Verify credentials against the API
  Test {
    /// Only check one side
    #[arg(long, value_enum)]
    side: Option<SiteRole>,
  },
  /// Show the detected credential configuration
  Show {
    #[arg(long, value_enum)]
    side: Option<SiteRole>,
  },
}

fn roles(side: Option<SiteRole>) -> Vec<SiteRole> {
  match side {
    Some(role) => vec![role],
    None => vec![SiteRole::Source, SiteRole::Target],
  }
}

/// Dispatch `auth` subcommands.
///
/// # Arguments
/// * `subcommand` - Auth-specific variant to execute.
/// * `cli` - Parsed CLI settings carrying site URLs and credentials.
/// * `colors` - Shared color scheme.
pub(crate) async fn handle_auth_command(subcommand: &AuthCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    AuthCommand::Test { side } => {
      let mut failed = false;
      for role in roles(*side) {
        failed |= !test_site(role, cli, colors).await;
      }
      if failed {
        process::exit(exit_code::CREDENTIALS);
      }
    }
    AuthCommand::Show { side } => {
      for role in roles(*side) {
        show_site(role, cli, colors);
      }
    }
  }
}

/// Returns whether the session could be verified.
async fn test_site(role: SiteRole, cli: &Cli, colors: &ColorScheme) -> bool {
  let Some(site_url) = role.site_url(cli) else {
    eprintln!(
      "{} No {} site URL (use --{}-url)",
      colors.error("✗"),
      role.label(),
      role.label()
    );
    return false;
  };

  println!("{} Testing {} site {}", colors.info("→"), role.label(), colors.link(site_url));
  let client = connect_or_exit(role, site_url, cli, colors);

  match client.current_user().await {
    Ok(user) => {
      println!("{} Authenticated as {}", colors.success("✓"), colors.emphasis(&user.display_name));
      println!("  {}: {}", colors.dimmed("Login"), user.login);
      if let Some(email) = user.email {
        println!("  {}: {}", colors.dimmed("Email"), email);
      }
      true
    }
    Err(e) => {
      eprintln!("{} Authentication against {} failed: {e}", colors.error("✗"), role.label());
      eprintln!(
        "  {}",
        colors.dimmed("Run 'page-transformer auth show' to see the detected configuration")
      );
      false
    }
  }
}

fn show_site(role: SiteRole, cli: &Cli, colors: &ColorScheme) {
  println!("{}", colors.emphasis(format!("{} site", capitalize(role.label()))));

  let Some(site_url) = role.site_url(cli) else {
    println!("  {}: {}", colors.emphasis("URL"), colors.dimmed("(not set)"));
    println!(
      "  {} set --{}-url or PAGE_TRANSFORMER_{}_URL\n",
      colors.warning("⚠"),
      role.label(),
      role.label().to_uppercase()
    );
    return;
  };
  println!("  {}: {}", colors.emphasis("URL"), colors.link(site_url));

  match resolve_credential(role, site_url, cli) {
    Ok((credential, origin)) => {
      let method = if credential.username.is_some() { "on-premises" } else { "modern (token)" };
      println!("  {}: {}", colors.emphasis("Authentication"), method);
      if let Some(user) = &credential.username {
        println!("  {}: {}", colors.emphasis("User"), user);
      }
      println!("  {}: {}", colors.emphasis("Secret"), colors.dimmed(credential.masked_secret()));
      println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(origin));
      println!("  {} {}\n", colors.success("✓"), colors.success("Credentials configured"));
    }
    Err(e) => {
      println!("  {} {e}", colors.warning("⚠"));
      if let Some(host) = site_host(site_url) {
        println!("  Add to ~/.netrc:");
        println!("    machine {host}");
        println!("      login <user>");
        println!("      password <password or token>");
      }
      println!();
    }
  }
}

fn capitalize(text: &str) -> String {
  let mut chars = text.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
