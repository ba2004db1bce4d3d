//! Session authentication variants.
//!
//! A [`SiteClient`](super::SiteClient) is built with exactly one
//! [`Authenticator`]; everything after construction only asks it for the
//! `Authorization` header value.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Produces the `Authorization` header for every request of a session.
pub trait Authenticator: Send + Sync + fmt::Debug {
  /// Header value to send with each request.
  fn authorization_header(&self) -> String;

  /// Short label used in logs (`modern`, `on-premises`).
  fn label(&self) -> &'static str;
}

/// Token-based authentication for cloud tenants.
pub struct ModernAuth {
  token: String,
}

impl ModernAuth {
  pub fn new(token: impl Into<String>) -> Self {
    Self { token: token.into() }
  }
}

impl fmt::Debug for ModernAuth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ModernAuth").field("token", &"***").finish()
  }
}

impl Authenticator for ModernAuth {
  fn authorization_header(&self) -> String {
    format!("Bearer {}", self.token)
  }

  fn label(&self) -> &'static str {
    "modern"
  }
}

/// User name and password authentication for on-premises farms (Basic).
pub struct OnPremisesAuth {
  username: String,
  password: String,
}

impl OnPremisesAuth {
  pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password: password.into(),
    }
  }
}

impl fmt::Debug for OnPremisesAuth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OnPremisesAuth")
      .field("username", &self.username)
      .field("password", &"***")
      .finish()
  }
}

impl Authenticator for OnPremisesAuth {
  fn authorization_header(&self) -> String {
    let credentials = format!("{}:{}", self.username, self.password);
    format!("Basic {}", BASE64.encode(credentials.as_bytes()))
  }

  fn label(&self) -> &'static str {
    "on-premises"
  }
}
