//! Credential values and lookup errors shared by every provider.

use std::sync::Arc;

use thiserror::Error;

use crate::platform::{Authenticator, ModernAuth, OnPremisesAuth};

/// Secret used to open a session on one site.
///
/// A credential with a user name authenticates on-premises style (user name
/// and password); a bare secret is sent as a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
  pub username: Option<String>,
  pub secret: String,
}

impl Credential {
  pub fn token(secret: impl Into<String>) -> Self {
    Self {
      username: None,
      secret: secret.into(),
    }
  }

  pub fn password(username: impl Into<String>, secret: impl Into<String>) -> Self {
    Self {
      username: Some(username.into()),
      secret: secret.into(),
    }
  }

  /// Session authentication matching this credential.
  pub fn authenticator(&self) -> Arc<dyn Authenticator> {
    match &self.username {
      Some(username) => Arc::new(OnPremisesAuth::new(username.clone(), self.secret.clone())),
      None => Arc::new(ModernAuth::new(self.secret.clone())),
    }
  }

  /// Secret with everything but the first characters hidden.
  pub fn masked_secret(&self) -> String {
    let visible = if self.secret.chars().count() > 8 { 4 } else { 0 };
    let head: String = self.secret.chars().take(visible).collect();
    format!("{head}{}", "*".repeat(self.secret.chars().count() - visible))
  }
}

/// Failure while looking up credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
  #[error("home directory not set; cannot locate .netrc")]
  HomeNotSet,
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_authenticator_variant_follows_username() {
    assert_eq!(Credential::token("abc").authenticator().label(), "modern");
    assert_eq!(Credential::password("svc", "pw").authenticator().label(), "on-premises");
  }

  #[test]
  fn test_masked_secret() {
    assert_eq!(Credential::token("short").masked_secret(), "*****");
    assert_eq!(Credential::token("0123456789").masked_secret(), "0123******");
  }
}
