//! Helpers for turning user-supplied URLs into page locators.

use anyhow::{Context, Result, anyhow, bail};
use url::Url;

use crate::model::PageLocator;

/// Normalise a site URL: add `https://` when the scheme is missing and drop
/// the trailing slash.
///
/// # Errors
/// Returns an error when the value cannot be parsed as a URL with a host.
pub fn normalize_site_url(url: &str) -> Result<String> {
  let trimmed = url.trim();
  let parsed = match Url::parse(trimmed) {
    Ok(parsed) => parsed,
    Err(_) => Url::parse(&format!("https://{trimmed}")).with_context(|| format!("Invalid site URL: {trimmed}"))?,
  };

  if parsed.host_str().is_none() {
    bail!("Site URL has no host: {trimmed}");
  }

  Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Resolve a page reference against the site it lives on.
///
/// Accepts either an absolute page URL on the same site or a site-relative
/// path:
/// - https://contoso.example/sites/intranet/SitePages/Home.aspx
/// - SitePages/news/Launch.aspx
///
/// The first remaining path segment is the library, the last one is the page
/// name, and anything between is the folder.
///
/// # Arguments
/// * `site_url` - Absolute site URL the page belongs to.
/// * `page` - Page URL or site-relative path.
///
/// # Errors
/// Returns an error when the URL is malformed, belongs to another host or
/// site, or does not contain both a library and a page name.
pub fn parse_page_url(site_url: &str, page: &str) -> Result<PageLocator> {
  let site = Url::parse(site_url).context("Invalid site URL format")?;
  let page = page.trim();

  let relative = if page.contains("://") {
    let parsed = Url::parse(page).context("Invalid page URL format")?;

    let page_host = parsed.host_str().context("Page URL missing host")?;
    let site_host = site.host_str().context("Site URL missing host")?;
    if !page_host.eq_ignore_ascii_case(site_host) {
      bail!("Page host {page_host} does not match site host {site_host}");
    }

    let site_path = site.path().trim_end_matches('/').to_string();
    let page_path = parsed.path();
    if page_path.len() < site_path.len() || !page_path[..site_path.len()].eq_ignore_ascii_case(&site_path) {
      bail!("Page {page} is not part of site {site_url}");
    }
    page_path[site_path.len()..].to_string()
  } else {
    page.to_string()
  };

  let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
  if segments.len() < 2 {
    return Err(anyhow!(
      "Page reference '{page}' must contain a library and a page name"
    ));
  }

  let library = segments[0];
  let name = segments[segments.len() - 1];
  let folder = segments[1..segments.len() - 1].join("/");

  Ok(PageLocator::new(site.as_str(), library, folder, name))
}
