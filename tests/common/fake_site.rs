//! Fake site API for testing
//!
//! Serves pages from memory, records every call it receives, and can be told
//! to fail or stall on specific paths. No network requests are made.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use page_transformer::model::PermissionEntry;
use page_transformer::platform::{PageDocument, SiteApi, SiteError, SiteStructure, UserInfo};

/// An in-memory site.
pub struct FakeSiteClient {
  site_url: String,
  pages: Mutex<HashMap<String, PageDocument>>,
  permissions: Mutex<HashMap<String, Vec<PermissionEntry>>>,
  failures: HashMap<String, SiteError>,
  transient_failures: Mutex<HashMap<String, u32>>,
  delays: HashMap<String, Duration>,
  libraries: HashMap<String, Vec<String>>,
  home_page: Mutex<String>,
  structure: SiteStructure,
  files: HashMap<String, Vec<u8>>,
  calls: Mutex<Vec<String>>,
  user: UserInfo,
}

impl FakeSiteClient {
  /// Create an empty site at `site_url`
  pub fn new(site_url: &str) -> Self {
    Self {
      site_url: site_url.trim_end_matches('/').to_string(),
      pages: Mutex::new(HashMap::new()),
      permissions: Mutex::new(HashMap::new()),
      failures: HashMap::new(),
      transient_failures: Mutex::new(HashMap::new()),
      delays: HashMap::new(),
      libraries: HashMap::new(),
      home_page: Mutex::new("SitePages/Home.aspx".to_string()),
      structure: SiteStructure::default(),
      files: HashMap::new(),
      calls: Mutex::new(Vec::new()),
      user: UserInfo {
        login: "i:0#.f|membership|migrator@contoso.example".to_string(),
        display_name: "Migration Account".to_string(),
        email: None,
      },
    }
  }

  /// Add a page from a JSON value
  pub fn with_page(self, path: &str, json: serde_json::Value) -> Self {
    let page: PageDocument = serde_json::from_value(json).expect("fixture is a valid page document");
    self.pages.lock().unwrap().insert(key(path), page);
    self
  }

  /// Give the page at `path` unique permissions
  pub fn with_permissions(self, path: &str, entries: Vec<PermissionEntry>) -> Self {
    self.permissions.lock().unwrap().insert(key(path), entries);
    self
  }

  /// Every call touching `path` fails with `error`
  pub fn with_failure(mut self, path: &str, error: SiteError) -> Self {
    self.failures.insert(key(path), error);
    self
  }

  /// The first `count` reads of `path` fail with a transient error
  pub fn with_transient_failures(self, path: &str, count: u32) -> Self {
    self.transient_failures.lock().unwrap().insert(key(path), count);
    self
  }

  /// Every call touching `path` sleeps for `delay` first
  pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
    self.delays.insert(key(path), delay);
    self
  }

  /// List `paths` as the contents of `library`
  pub fn with_library(mut self, library: &str, paths: &[&str]) -> Self {
    self
      .libraries
      .insert(library.to_lowercase(), paths.iter().map(|p| p.to_string()).collect());
    self
  }

  pub fn with_structure(mut self, json: serde_json::Value) -> Self {
    self.structure = serde_json::from_value(json).expect("fixture is a valid site structure");
    self
  }

  pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
    self.files.insert(key(path), content.to_vec());
    self
  }

  /// Every call received so far, as `operation path`
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  /// Number of recorded calls of `operation`
  pub fn call_count(&self, operation: &str) -> usize {
    self
      .calls()
      .iter()
      .filter(|call| call.split(' ').next() == Some(operation))
      .count()
  }

  /// The page currently stored at `path`
  pub fn page(&self, path: &str) -> Option<PageDocument> {
    self.pages.lock().unwrap().get(&key(path)).cloned()
  }

  pub fn permissions_of(&self, path: &str) -> Option<Vec<PermissionEntry>> {
    self.permissions.lock().unwrap().get(&key(path)).cloned()
  }

  pub fn home_page(&self) -> String {
    self.home_page.lock().unwrap().clone()
  }

  async fn enter(&self, operation: &str, path: &str) -> Result<(), SiteError> {
    self.calls.lock().unwrap().push(format!("{operation} {path}"));

    if let Some(delay) = self.delays.get(&key(path)) {
      tokio::time::sleep(*delay).await;
    }
    if let Some(error) = self.failures.get(&key(path)) {
      return Err(error.clone());
    }
    Ok(())
  }
}

/// Paths are compared case-insensitively, like on a real site.
fn key(path: &str) -> String {
  path.trim_matches('/').to_lowercase()
}

#[async_trait]
impl SiteApi for FakeSiteClient {
  fn site_url(&self) -> &str {
    &self.site_url
  }

  async fn current_user(&self) -> Result<UserInfo, SiteError> {
    self.calls.lock().unwrap().push("current_user".to_string());
    Ok(self.user.clone())
  }

  async fn get_page(&self, path: &str) -> Result<PageDocument, SiteError> {
    self.enter("get_page", path).await?;

    {
      let mut transient = self.transient_failures.lock().unwrap();
      if let Some(remaining) = transient.get_mut(&key(path))
        && *remaining > 0
      {
        *remaining -= 1;
        return Err(SiteError::Transient(format!("throttled: {path}")));
      }
    }

    self
      .page(path)
      .ok_or_else(|| SiteError::NotFound(path.to_string()))
  }

  async fn page_exists(&self, path: &str) -> Result<bool, SiteError> {
    self.enter("page_exists", path).await?;
    Ok(self.page(path).is_some())
  }

  async fn save_page(&self, path: &str, page: &PageDocument) -> Result<(), SiteError> {
    self.enter("save_page", path).await?;
    self.pages.lock().unwrap().insert(key(path), page.clone());
    // A saved page starts out inheriting its library's permissions.
    self.permissions.lock().unwrap().remove(&key(path));
    Ok(())
  }

  async fn get_page_permissions(&self, path: &str) -> Result<Option<Vec<PermissionEntry>>, SiteError> {
    self.enter("get_page_permissions", path).await?;
    Ok(self.permissions_of(path))
  }

  async fn set_page_permissions(&self, path: &str, entries: &[PermissionEntry]) -> Result<(), SiteError> {
    self.enter("set_page_permissions", path).await?;
    self.permissions.lock().unwrap().insert(key(path), entries.to_vec());
    Ok(())
  }

  async fn publish_page(&self, path: &str) -> Result<(), SiteError> {
    self.enter("publish_page", path).await
  }

  async fn promote_as_news(&self, path: &str) -> Result<(), SiteError> {
    self.enter("promote_as_news", path).await
  }

  async fn get_home_page(&self) -> Result<String, SiteError> {
    self.calls.lock().unwrap().push("get_home_page".to_string());
    Ok(self.home_page())
  }

  async fn set_home_page(&self, path: &str) -> Result<(), SiteError> {
    self.enter("set_home_page", path).await?;
    *self.home_page.lock().unwrap() = path.to_string();
    Ok(())
  }

  async fn list_pages(&self, library: &str) -> Result<Vec<String>, SiteError> {
    self.enter("list_pages", library).await?;
    self
      .libraries
      .get(&library.to_lowercase())
      .cloned()
      .ok_or_else(|| SiteError::NotFound(library.to_string()))
  }

  async fn get_site_structure(&self) -> Result<SiteStructure, SiteError> {
    self.calls.lock().unwrap().push("get_site_structure".to_string());
    Ok(self.structure.clone())
  }

  async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, SiteError> {
    self.enter("fetch_file", path).await?;
    self
      .files
      .get(&key(path))
      .cloned()
      .ok_or_else(|| SiteError::NotFound(path.to_string()))
  }
}
