//! `~/.netrc` credential lookup.

use std::path::PathBuf;

use super::{Credential, CredentialError, CredentialsProvider};

/// Reads credentials from a `.netrc` file (`$HOME/.netrc` unless a path is
/// given).
#[derive(Debug, Clone, Default)]
pub struct NetrcProvider {
  path: Option<PathBuf>,
}

impl NetrcProvider {
  pub fn new() -> Self {
    Self::default()
  }

  /// Read a specific file instead of `$HOME/.netrc`.
  pub fn with_path(path: impl Into<PathBuf>) -> Self {
    Self { path: Some(path.into()) }
  }

  fn resolve_path(&self) -> Result<PathBuf, CredentialError> {
    match &self.path {
      Some(path) => Ok(path.clone()),
      None => {
        let home = std::env::var_os("HOME").ok_or(CredentialError::HomeNotSet)?;
        Ok(PathBuf::from(home).join(".netrc"))
      }
    }
  }
}

impl CredentialsProvider for NetrcProvider {
  fn get_credentials(&self, host: &str) -> Result<Option<Credential>, CredentialError> {
    let path = self.resolve_path()?;
    if !path.exists() {
      return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| CredentialError::Io {
      path: path.display().to_string(),
      source,
    })?;
    Ok(parse_netrc(&content, host))
  }

  fn describe(&self) -> String {
    match &self.path {
      Some(path) => path.display().to_string(),
      None => "~/.netrc".to_string(),
    }
  }
}

#[derive(Default)]
struct Entry {
  machine: Option<String>,
  login: Option<String>,
  password: Option<String>,
}

impl Entry {
  fn into_credential(self) -> Option<Credential> {
    Some(Credential {
      username: self.login,
      secret: self.password?,
    })
  }
}

/// Find the entry for `host`, falling back to a `default` entry.
///
/// Tokens are whitespace separated, so both the one-line and the multi-line
/// forms are accepted. `macdef` bodies and `#` comment lines are skipped.
fn parse_netrc(content: &str, host: &str) -> Option<Credential> {
  let mut entries: Vec<Entry> = Vec::new();
  let mut in_macro = false;

  for line in content.lines() {
    let trimmed = line.trim();
    if in_macro {
      in_macro = !trimmed.is_empty();
      continue;
    }
    if trimmed.starts_with('#') {
      continue;
    }

    let mut tokens = trimmed.split_whitespace();
    while let Some(token) = tokens.next() {
      match token {
        "machine" => entries.push(Entry {
          machine: tokens.next().map(str::to_string),
          ..Default::default()
        }),
        "default" => entries.push(Entry {
          machine: Some(String::new()),
          ..Default::default()
        }),
        "login" => {
          if let Some(entry) = entries.last_mut() {
            entry.login = tokens.next().map(str::to_string);
          }
        }
        "password" => {
          if let Some(entry) = entries.last_mut() {
            entry.password = tokens.next().map(str::to_string);
          }
        }
        "macdef" => {
          in_macro = true;
          break;
        }
        _ => {}
      }
    }
  }

  let position = entries
    .iter()
    .position(|entry| entry.machine.as_deref() == Some(host))
    .or_else(|| entries.iter().position(|entry| entry.machine.as_deref() == Some("")))?;
  entries.swap_remove(position).into_credential()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_multi_line_entries() {
    let content = r#"
machine contoso.sharepoint.com
  login svc@contoso.com
  password secret-1

machine fabrikam.example
  login admin
  password secret-2
"#;

    assert_eq!(
      parse_netrc(content, "fabrikam.example"),
      Some(Credential::password("admin", "secret-2"))
    );
    assert_eq!(parse_netrc(content, "unknown.example"), None);
  }

  #[test]
  fn test_single_line_entry() {
    let content = "machine intranet.local login farm\\svc password p@ss w0rd";
    assert_eq!(
      parse_netrc(content, "intranet.local"),
      Some(Credential::password("farm\\svc", "p@ss"))
    );
  }

  #[test]
  fn test_specific_entry_beats_default() {
    let content = "default login anyone password any\nmachine contoso.example login me password mine\n";
    assert_eq!(
      parse_netrc(content, "contoso.example"),
      Some(Credential::password("me", "mine"))
    );
    assert_eq!(
      parse_netrc(content, "other.example"),
      Some(Credential::password("anyone", "any"))
    );
  }

  #[test]
  fn test_password_without_login_is_a_token() {
    let content = "machine contoso.example\n  password app-token\n";
    assert_eq!(parse_netrc(content, "contoso.example"), Some(Credential::token("app-token")));
  }

  #[test]
  fn test_missing_password_and_macdef() {
    let content = r#"
# comment
machine contoso.example
  login me
macdef init
  machine evil.example login x password y

machine fabrikam.example login you password yours
"#;
    assert_eq!(parse_netrc(content, "contoso.example"), None);
    assert_eq!(parse_netrc(content, "evil.example"), None);
    assert_eq!(
      parse_netrc(content, "fabrikam.example"),
      Some(Credential::password("you", "yours"))
    );
  }

  #[test]
  fn test_provider_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("netrc");
    std::fs::write(&path, "machine contoso.example login me password mine\n").unwrap();

    let provider = NetrcProvider::with_path(&path);
    assert_eq!(
      provider.get_credentials("contoso.example").unwrap(),
      Some(Credential::password("me", "mine"))
    );
    assert!(
      NetrcProvider::with_path(dir.path().join("missing"))
        .get_credentials("contoso.example")
        .unwrap()
        .is_none()
    );
  }
}
