//! Target page naming.
//!
//! Precedence:
//! 1. an explicit target name is used verbatim (`.aspx` appended when it has
//!    no extension) and the prefix is not applied,
//! 2. otherwise, when the target takes the source name, `prefix + source name`,
//! 3. otherwise `prefix + slug(title) + ".aspx"`, or `prefix + source name`
//!    when the title yields an empty slug.
//!
//! The folder is the explicit target folder when set, else the source folder.
//! Target pages always live in the `SitePages` library.

use crate::model::{PageLocator, SITE_PAGES_LIBRARY};
use crate::options::PageOptions;

const PAGE_EXTENSION: &str = ".aspx";

/// Compute where the target page will be written.
///
/// # Arguments
/// * `source` - Locator of the source page.
/// * `title` - Source page title.
/// * `options` - Page options carrying the naming settings.
/// * `target_site_url` - Absolute URL of the target site.
pub fn target_locator(source: &PageLocator, title: &str, options: &PageOptions, target_site_url: &str) -> PageLocator {
  let folder = if options.target_page_folder.trim().is_empty() {
    source.folder.clone()
  } else {
    options.target_page_folder.trim().to_string()
  };

  PageLocator::new(target_site_url, SITE_PAGES_LIBRARY, folder, target_name(source, title, options))
}

fn target_name(source: &PageLocator, title: &str, options: &PageOptions) -> String {
  let explicit = options.target_page_name.trim();
  if !explicit.is_empty() {
    return with_extension(explicit);
  }

  let prefix = options.target_page_prefix.as_str();
  if options.target_page_takes_source_page_name {
    return format!("{prefix}{}", source.name);
  }

  let slug = slugify(title);
  if slug.is_empty() {
    format!("{prefix}{}", source.name)
  } else {
    format!("{prefix}{slug}{PAGE_EXTENSION}")
  }
}

fn with_extension(name: &str) -> String {
  let has_extension = name
    .rsplit_once('.')
    .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty());

  if has_extension {
    name.to_string()
  } else {
    format!("{name}{PAGE_EXTENSION}")
  }
}

/// Turn a title into a file-name-safe slug: alphanumerics, `-` and `_` are
/// kept, every other run of characters becomes a single `-`.
pub fn slugify(title: &str) -> String {
  let mut slug = String::with_capacity(title.len());
  let mut pending_dash = false;

  for c in title.chars() {
    if c.is_alphanumeric() || c == '-' || c == '_' {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  slug
}
