//! File-system backed storage for provisioning artifacts.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Stores files below `root/container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemConnector {
  root: PathBuf,
  container: String,
  overwrite: bool,
}

impl FileSystemConnector {
  /// Create a connector. An empty `container` stores files directly in
  /// `root`.
  pub fn new(root: impl Into<PathBuf>, container: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      container: container.into(),
      overwrite: true,
    }
  }

  /// Refuse to replace existing files.
  pub fn without_overwrite(mut self) -> Self {
    self.overwrite = false;
    self
  }

  /// Directory files are stored in.
  pub fn base_dir(&self) -> PathBuf {
    let container = self.container.trim_matches('/');
    if container.is_empty() {
      self.root.clone()
    } else {
      self.root.join(container)
    }
  }

  /// Resolve a site-relative file path below the base directory.
  ///
  /// # Errors
  /// Returns an error when the path is empty or escapes the base directory.
  pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
    let relative = Path::new(relative.trim_start_matches('/'));
    let mut resolved = self.base_dir();
    let mut depth = 0;

    for component in relative.components() {
      match component {
        Component::Normal(part) => {
          resolved.push(part);
          depth += 1;
        }
        Component::CurDir => {}
        _ => bail!("Refusing to store file outside the connector: {}", relative.display()),
      }
    }

    if depth == 0 {
      bail!("Empty file path");
    }
    Ok(resolved)
  }

  /// Write `content` to `relative`, creating parent directories as needed.
  ///
  /// # Returns
  /// The absolute path of the written file.
  pub fn save_file(&self, relative: &str, content: &[u8]) -> Result<PathBuf> {
    let path = self.resolve(relative)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    if self.overwrite {
      fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
      match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => file
          .write_all(content)
          .with_context(|| format!("Failed to write {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
          bail!("File already exists: {}", path.display());
        }
        Err(err) => return Err(err).with_context(|| format!("Failed to create {}", path.display())),
      }
    }

    debug!("Stored {} ({} bytes)", path.display(), content.len());
    Ok(path)
  }

  /// Read a previously stored file.
  pub fn read_file(&self, relative: &str) -> Result<Vec<u8>> {
    let path = self.resolve(relative)?;
    fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_save_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let connector = FileSystemConnector::new(dir.path(), "branding");

    let path = connector.save_file("/_catalogs/masterpage/custom.master", b"<master/>").unwrap();
    assert_eq!(path, dir.path().join("branding/_catalogs/masterpage/custom.master"));
    assert_eq!(connector.read_file("_catalogs/masterpage/custom.master").unwrap(), b"<master/>");
  }

  #[test]
  fn test_rejects_escaping_paths() {
    let connector = FileSystemConnector::new("/tmp/store", "");
    assert!(connector.resolve("../etc/passwd").is_err());
    assert!(connector.resolve("").is_err());
    assert_eq!(connector.resolve("./a/b.txt").unwrap(), PathBuf::from("/tmp/store/a/b.txt"));
  }

  #[test]
  fn test_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let connector = FileSystemConnector::new(dir.path(), "").without_overwrite();

    connector.save_file("a.txt", b"one").unwrap();
    let err = connector.save_file("a.txt", b"two").unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"one");
  }
}
