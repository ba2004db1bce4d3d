//! Capability surface of a collaboration site.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{PageDocument, SiteStructure, UserInfo};
use crate::model::PermissionEntry;

/// Failure reported by a [`SiteApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
  #[error("not found: {0}")]
  NotFound(String),
  #[error("access denied: {0}")]
  AccessDenied(String),
  #[error("conflict: {0}")]
  Conflict(String),
  /// Connectivity problem or throttling that may succeed on retry.
  #[error("transient failure: {0}")]
  Transient(String),
  #[error("request timed out: {0}")]
  Timeout(String),
  #[error("request failed: {0}")]
  Request(String),
  #[error("invalid response: {0}")]
  InvalidResponse(String),
}

impl SiteError {
  /// Whether retrying the same call may succeed.
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::Transient(_))
  }
}

/// Operations the pipeline needs from a source or target site (enables testing
/// with fake implementations).
///
/// Paths are site-relative page paths such as `SitePages/news/Home.aspx`.
#[async_trait]
pub trait SiteApi: Send + Sync {
  /// Absolute URL of the site this session is bound to.
  fn site_url(&self) -> &str;

  /// Verify the session and return the signed-in user.
  async fn current_user(&self) -> Result<UserInfo, SiteError>;

  /// Fetch the structural description of a page.
  ///
  /// # Arguments
  /// * `path` - Site-relative path of the page.
  ///
  /// # Returns
  /// The page's sections, web parts, wiki HTML, and metadata.
  async fn get_page(&self, path: &str) -> Result<PageDocument, SiteError>;

  /// Check whether a page exists at `path`.
  async fn page_exists(&self, path: &str) -> Result<bool, SiteError>;

  /// Create or replace the page at `path`.
  async fn save_page(&self, path: &str, page: &PageDocument) -> Result<(), SiteError>;

  /// Unique role assignments of a page; `None` when it inherits permissions.
  async fn get_page_permissions(&self, path: &str) -> Result<Option<Vec<PermissionEntry>>, SiteError>;

  /// Break inheritance on the page and apply `entries`.
  async fn set_page_permissions(&self, path: &str, entries: &[PermissionEntry]) -> Result<(), SiteError>;

  /// Publish the current version of the page.
  async fn publish_page(&self, path: &str) -> Result<(), SiteError>;

  /// Promote the page to a news post.
  async fn promote_as_news(&self, path: &str) -> Result<(), SiteError>;

  /// Site-relative path of the site's home page.
  async fn get_home_page(&self) -> Result<String, SiteError>;

  /// Point the site's home page at `path`.
  async fn set_home_page(&self, path: &str) -> Result<(), SiteError>;

  /// Site-relative paths of every page in `library`.
  async fn list_pages(&self, library: &str) -> Result<Vec<String>, SiteError>;

  /// Lists, content types, and files of the site.
  async fn get_site_structure(&self) -> Result<SiteStructure, SiteError>;

  /// Raw bytes of a file.
  async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, SiteError>;
}
