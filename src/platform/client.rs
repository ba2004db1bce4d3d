//! HTTP client implementation for talking to a site's REST API.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, trace};
use url::Url;

use super::api::{SiteApi, SiteError};
use super::auth::Authenticator;
use super::models::{
  ExistsResponse, PageDocument, PageListResponse, PermissionsResponse, SiteStructure, UserInfo, WelcomePageResponse,
};
use crate::model::PermissionEntry;

/// REST client bound to one site.
#[derive(Clone)]
pub struct SiteClient {
  site_url: String,
  authenticator: Arc<dyn Authenticator>,
  client: reqwest::Client,
  rate_limiter: Arc<RequestRateLimiter>,
}

/// Simple fixed-window rate limiter to cap the number of requests per interval.
#[derive(Debug)]
struct RequestRateLimiter {
  max_requests: usize,
  window: Duration,
  timestamps: Mutex<VecDeque<Instant>>,
}

impl RequestRateLimiter {
  fn new(max_requests: usize, window: Duration) -> Self {
    Self {
      max_requests,
      window,
      timestamps: Mutex::new(VecDeque::with_capacity(max_requests)),
    }
  }

  /// Wait until another request fits in the current window.
  async fn acquire(&self) {
    loop {
      let mut timestamps = self.timestamps.lock().await;
      let now = Instant::now();

      while let Some(earliest) = timestamps.front()
        && now.duration_since(*earliest) >= self.window
      {
        timestamps.pop_front();
      }

      if timestamps.len() < self.max_requests {
        timestamps.push_back(now);
        return;
      }

      let wait_duration = match timestamps.front() {
        Some(earliest) => self.window.saturating_sub(now.duration_since(*earliest)),
        None => Duration::ZERO,
      };

      drop(timestamps);

      if !wait_duration.is_zero() {
        sleep(wait_duration).await;
      }
    }
  }
}

impl SiteClient {
  /// Create a client for `site_url`.
  ///
  /// # Arguments
  /// * `site_url` - Absolute URL of the site (e.g. https://contoso.sharepoint.com/sites/intranet)
  /// * `authenticator` - Session authentication variant
  /// * `timeout_secs` - Transport timeout in seconds
  /// * `rate_limit` - Maximum requests per second
  ///
  /// # Errors
  /// Returns an error if the rate limit is zero, the URL is invalid, or the
  /// underlying `reqwest::Client` cannot be built.
  pub fn new(
    site_url: impl Into<String>,
    authenticator: Arc<dyn Authenticator>,
    timeout_secs: u64,
    rate_limit: usize,
  ) -> Result<Self> {
    let site_url = site_url.into().trim_end_matches('/').to_string();

    if rate_limit == 0 {
      return Err(anyhow!("Rate limit must be at least 1 request per second"));
    }

    Url::parse(&site_url).with_context(|| format!("Invalid site URL: {site_url}"))?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .user_agent(format!(
        "page-transformer/{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("TARGET")
      ))
      .build()
      .context("Failed to create HTTP client")?;

    debug!("Created {} session for {site_url}", authenticator.label());

    Ok(Self {
      site_url,
      authenticator,
      client,
      rate_limiter: Arc::new(RequestRateLimiter::new(rate_limit, Duration::from_secs(1))),
    })
  }

  /// Build an API endpoint URL, optionally carrying a `path` query parameter.
  fn endpoint(&self, route: &str, path: Option<&str>) -> Result<Url, SiteError> {
    let mut url = Url::parse(&format!("{}/_api/{}", self.site_url, route))
      .map_err(|e| SiteError::Request(format!("invalid endpoint {route}: {e}")))?;
    if let Some(path) = path {
      url.query_pairs_mut().append_pair("path", path);
    }
    Ok(url)
  }

  /// Send a request after throttling and translate transport/status failures.
  async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, SiteError> {
    self.rate_limiter.acquire().await;

    let response = request
      .header("Authorization", self.authenticator.authorization_header())
      .header("Accept", "application/json")
      .send()
      .await
      .map_err(|e| classify_transport_error(&e, what))?;

    let status = response.status();
    trace!("{what} -> {status}");
    if status.is_success() {
      return Ok(response);
    }

    let error_text = response
      .text()
      .await
      .unwrap_or_else(|_| String::from("(no error details)"));
    Err(classify_status(status, &format!("{what}: {status} {error_text}")))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, SiteError> {
    let response = self.send(self.client.get(url), what).await?;
    response
      .json::<T>()
      .await
      .map_err(|e| SiteError::InvalidResponse(format!("{what}: {e}")))
  }

  async fn post_empty(&self, url: Url, what: &str) -> Result<(), SiteError> {
    self.send(self.client.post(url), what).await.map(|_| ())
  }
}

/// Map a transport error to a [`SiteError`].
fn classify_transport_error(error: &reqwest::Error, what: &str) -> SiteError {
  if error.is_timeout() {
    SiteError::Timeout(format!("{what}: {error}"))
  } else if error.is_connect() || error.is_request() {
    SiteError::Transient(format!("{what}: {error}"))
  } else {
    SiteError::Request(format!("{what}: {error}"))
  }
}

/// Map a non-success HTTP status to a [`SiteError`].
fn classify_status(status: StatusCode, message: &str) -> SiteError {
  match status {
    StatusCode::NOT_FOUND => SiteError::NotFound(message.to_string()),
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SiteError::AccessDenied(message.to_string()),
    StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => SiteError::Conflict(message.to_string()),
    StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => SiteError::Transient(message.to_string()),
    s if s.is_server_error() => SiteError::Transient(message.to_string()),
    _ => SiteError::Request(message.to_string()),
  }
}

#[async_trait]
impl SiteApi for SiteClient {
  fn site_url(&self) -> &str {
    &self.site_url
  }

  async fn current_user(&self) -> Result<UserInfo, SiteError> {
    let url = self.endpoint("web/currentuser", None)?;
    self.get_json(url, "current user").await
  }

  async fn get_page(&self, path: &str) -> Result<PageDocument, SiteError> {
    let url = self.endpoint("transformation/pages", Some(path))?;
    self.get_json(url, &format!("get page {path}")).await
  }

  async fn page_exists(&self, path: &str) -> Result<bool, SiteError> {
    let url = self.endpoint("transformation/pages/exists", Some(path))?;
    let response: ExistsResponse = self.get_json(url, &format!("page exists {path}")).await?;
    Ok(response.exists)
  }

  async fn save_page(&self, path: &str, page: &PageDocument) -> Result<(), SiteError> {
    let url = self.endpoint("transformation/pages", Some(path))?;
    self
      .send(self.client.put(url).json(page), &format!("save page {path}"))
      .await
      .map(|_| ())
  }

  async fn get_page_permissions(&self, path: &str) -> Result<Option<Vec<PermissionEntry>>, SiteError> {
    let url = self.endpoint("transformation/pages/permissions", Some(path))?;
    let response: PermissionsResponse = self.get_json(url, &format!("get permissions {path}")).await?;
    Ok(response.has_unique_role_assignments.then_some(response.entries))
  }

  async fn set_page_permissions(&self, path: &str, entries: &[PermissionEntry]) -> Result<(), SiteError> {
    let url = self.endpoint("transformation/pages/permissions", Some(path))?;
    let body = PermissionsResponse {
      has_unique_role_assignments: true,
      entries: entries.to_vec(),
    };
    self
      .send(self.client.put(url).json(&body), &format!("set permissions {path}"))
      .await
      .map(|_| ())
  }

  async fn publish_page(&self, path: &str) -> Result<(), SiteError> {
    let url = self.endpoint("transformation/pages/publish", Some(path))?;
    self.post_empty(url, &format!("publish {path}")).await
  }

  async fn promote_as_news(&self, path: &str) -> Result<(), SiteError> {
    let url = self.endpoint("transformation/pages/promote", Some(path))?;
    self.post_empty(url, &format!("promote {path}")).await
  }

  async fn get_home_page(&self) -> Result<String, SiteError> {
    let url = self.endpoint("web/welcomepage", None)?;
    let response: WelcomePageResponse = self.get_json(url, "get welcome page").await?;
    Ok(response.url)
  }

  async fn set_home_page(&self, path: &str) -> Result<(), SiteError> {
    let url = self.endpoint("web/welcomepage", None)?;
    let body = WelcomePageResponse { url: path.to_string() };
    self
      .send(self.client.put(url).json(&body), "set welcome page")
      .await
      .map(|_| ())
  }

  async fn list_pages(&self, library: &str) -> Result<Vec<String>, SiteError> {
    let url = self.endpoint(&format!("web/lists/{library}/pages"), None)?;
    let response: PageListResponse = self.get_json(url, &format!("list pages of {library}")).await?;
    Ok(response.results)
  }

  async fn get_site_structure(&self) -> Result<SiteStructure, SiteError> {
    let url = self.endpoint("web/template", None)?;
    self.get_json(url, "site structure").await
  }

  async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, SiteError> {
    let url = self.endpoint("web/files", Some(path))?;
    let response = self.send(self.client.get(url), &format!("fetch file {path}")).await?;
    let bytes = response
      .bytes()
      .await
      .map_err(|e| SiteError::Transient(format!("read file {path}: {e}")))?;
    Ok(bytes.to_vec())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::auth::ModernAuth;

  fn client(rate_limit: usize) -> Result<SiteClient> {
    SiteClient::new(
      "https://contoso.example/sites/intranet/",
      Arc::new(ModernAuth::new("token")),
      30,
      rate_limit,
    )
  }

  #[test]
  fn test_site_client_removes_trailing_slash() {
    let client = client(5).unwrap();
    assert_eq!(client.site_url(), "https://contoso.example/sites/intranet");
  }

  #[test]
  fn test_site_client_rejects_zero_rate_limit() {
    assert!(client(0).is_err());
  }

  #[test]
  fn test_site_client_rejects_invalid_url() {
    let result = SiteClient::new("not a url", Arc::new(ModernAuth::new("t")), 30, 5);
    assert!(result.is_err());
  }

  #[test]
  fn test_endpoint_encodes_path() {
    let client = client(5).unwrap();
    let url = client
      .endpoint("transformation/pages", Some("SitePages/My Page.aspx"))
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://contoso.example/sites/intranet/_api/transformation/pages?path=SitePages%2FMy+Page.aspx"
    );
  }

  #[test]
  fn test_classify_status() {
    assert!(matches!(
      classify_status(StatusCode::NOT_FOUND, "x"),
      SiteError::NotFound(_)
    ));
    assert!(matches!(
      classify_status(StatusCode::FORBIDDEN, "x"),
      SiteError::AccessDenied(_)
    ));
    assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE, "x").is_transient());
    assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, "x").is_transient());
    assert!(matches!(
      classify_status(StatusCode::BAD_REQUEST, "x"),
      SiteError::Request(_)
    ));
  }

  #[tokio::test]
  async fn test_rate_limiter_throttles_requests() {
    let limiter = RequestRateLimiter::new(2, Duration::from_secs(1));
    let start = Instant::now();

    limiter.acquire().await;
    limiter.acquire().await;
    limiter.acquire().await;

    assert!(
      start.elapsed() >= Duration::from_millis(900),
      "expected at least 900ms elapsed, got {:?}",
      start.elapsed()
    );
  }
}
