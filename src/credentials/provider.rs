//! Credential provider abstraction and the environment-backed provider.

use super::{Credential, CredentialError};

/// A source of credentials keyed by host name.
pub trait CredentialsProvider {
  /// Look up credentials for `host`.
  ///
  /// # Returns
  /// `Ok(None)` when this provider has nothing for the host, so the next
  /// provider in line can be asked.
  ///
  /// # Errors
  /// Returns an error when the backing store exists but cannot be read.
  fn get_credentials(&self, host: &str) -> Result<Option<Credential>, CredentialError>;

  /// Human-readable name shown by `auth show`.
  fn describe(&self) -> String;
}

/// Reads `{PREFIX}_USER` and `{PREFIX}_TOKEN` for every host.
///
/// A token without a user is a bearer token; a token with a user is treated as
/// that user's password.
#[derive(Debug, Clone)]
pub struct EnvProvider {
  prefix: String,
}

impl EnvProvider {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self { prefix: prefix.into() }
  }

  fn var(&self, suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{suffix}", self.prefix))
      .ok()
      .filter(|value| !value.trim().is_empty())
  }
}

impl CredentialsProvider for EnvProvider {
  fn get_credentials(&self, _host: &str) -> Result<Option<Credential>, CredentialError> {
    Ok(self.var("TOKEN").map(|secret| Credential {
      username: self.var("USER"),
      secret,
    }))
  }

  fn describe(&self) -> String {
    format!("environment ({}_USER / {}_TOKEN)", self.prefix, self.prefix)
  }
}

/// Ask each provider in turn and return the first hit.
///
/// # Returns
/// The credential and the description of the provider that supplied it.
pub fn first_match(
  providers: &[&dyn CredentialsProvider],
  host: &str,
) -> Result<Option<(Credential, String)>, CredentialError> {
  for provider in providers {
    if let Some(credential) = provider.get_credentials(host)? {
      return Ok(Some((credential, provider.describe())));
    }
  }
  Ok(None)
}
