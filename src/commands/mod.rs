//! CLI subcommand handlers and the session helpers they share.

pub mod auth;
pub mod completions;
pub mod mapping;
pub mod template;
pub mod transform;
pub mod version;

use std::process;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use url::Url;

use crate::cli::{Cli, exit_code};
use crate::color::ColorScheme;
use crate::credentials::{Credential, CredentialsProvider, ENV_PREFIX, EnvProvider, NetrcProvider, first_match};
use crate::platform::SiteClient;

/// Which side of a transformation a site plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SiteRole {
  Source,
  Target,
}

impl SiteRole {
  pub fn label(self) -> &'static str {
    match self {
      Self::Source => "source",
      Self::Target => "target",
    }
  }

  /// URL of this side's site, if configured.
  pub fn site_url(self, cli: &Cli) -> Option<&str> {
    match self {
      Self::Source => cli.sites.source_url.as_deref(),
      Self::Target => cli.sites.effective_target_url(),
    }
  }

  fn explicit(self, cli: &Cli) -> (Option<&str>, Option<&str>) {
    match self {
      Self::Source => (cli.sites.source_user.as_deref(), cli.sites.source_token.as_deref()),
      Self::Target => (cli.sites.target_user.as_deref(), cli.sites.target_token.as_deref()),
    }
  }

  /// Name of the flag carrying this side's secret.
  pub fn token_flag(self) -> String {
    format!("--{}-token", self.label())
  }
}

/// Host component of a site URL, used for `.netrc` lookups.
pub(crate) fn site_host(site_url: &str) -> Option<String> {
  Url::parse(site_url).ok()?.host_str().map(str::to_string)
}

/// Resolve the credential for one side.
///
/// Explicit flags (or their environment variables) win, then the shared
/// environment variables, then `~/.netrc`.
///
/// # Returns
/// The credential and a description of where it came from.
///
/// # Errors
/// Returns an error when no source provides a secret for the site.
pub(crate) fn resolve_credential(role: SiteRole, site_url: &str, cli: &Cli) -> Result<(Credential, String)> {
  let (user, token) = role.explicit(cli);
  if let Some(token) = token {
    let credential = Credential {
      username: user.map(str::to_string),
      secret: token.to_string(),
    };
    return Ok((credential, "command-line flag or environment".to_string()));
  }

  let host = site_host(site_url).with_context(|| format!("Invalid site URL: {site_url}"))?;
  let env = EnvProvider::new(ENV_PREFIX);
  let netrc = NetrcProvider::new();
  let providers: [&dyn CredentialsProvider; 2] = [&env, &netrc];
  match first_match(&providers, &host)? {
    Some((mut credential, origin)) => {
      if let Some(user) = user {
        credential.username = Some(user.to_string());
      }
      Ok((credential, origin))
    }
    None => bail!(
      "No {} credentials for {host}. Provide {}, set {ENV_PREFIX}_TOKEN, or add {host} to ~/.netrc",
      role.label(),
      role.token_flag()
    ),
  }
}

/// Open an authenticated session on `site_url`, exiting the process when that
/// is impossible (code 2 for missing credentials, 1 otherwise).
pub(crate) fn connect_or_exit(role: SiteRole, site_url: &str, cli: &Cli, colors: &ColorScheme) -> SiteClient {
  let credential = match resolve_credential(role, site_url, cli) {
    Ok((credential, _)) => credential,
    Err(e) => {
      eprintln!("{} {e}", colors.error("✗"));
      process::exit(exit_code::CREDENTIALS);
    }
  };

  match SiteClient::new(
    site_url,
    credential.authenticator(),
    cli.performance.timeout,
    cli.performance.rate_limit,
  ) {
    Ok(client) => client,
    Err(e) => {
      eprintln!("{} Failed to create {} client: {e:#}", colors.error("✗"), role.label());
      process::exit(1);
    }
  }
}
