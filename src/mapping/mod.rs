//! Mapping rule set translating source constructs to target equivalents.
//!
//! A [`MappingRuleSet`] answers four questions for the engine:
//! - which modern web part replaces a classic web-part type (and how its
//!   properties are translated),
//! - which modern layout replaces a classic page layout,
//! - which target identity replaces a source user,
//! - which target URL replaces a source URL.
//!
//! The rule set is immutable once the pipeline starts and is shared by every
//! batch worker behind an `Arc`.

use std::collections::HashMap;

mod builtin;
mod loader;
mod properties;

pub use builtin::TITLE_BAR_WEB_PART;
pub use loader::{MappingSources, parse_pair_mapping, parse_web_part_mapping};
pub use properties::{PropertyRule, PropertyTransformer, RewriteContext, rewrite_html_links};

/// Target type emitted for unmapped web parts under [`UnmappedPolicy::Placeholder`].
pub const PLACEHOLDER_WEB_PART_TYPE: &str = "UnsupportedWebPart";

/// Modern layout used when a source layout has no mapping.
pub const DEFAULT_TARGET_LAYOUT: &str = "Article";

/// What happens to web parts without a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPolicy {
  /// Leave the web part out of the target page.
  Drop,
  /// Emit a placeholder web part that names the source type.
  #[default]
  Placeholder,
}

impl UnmappedPolicy {
  /// Parse the attribute value used in mapping files.
  pub fn parse(value: &str) -> Option<Self> {
    match value.trim().to_ascii_lowercase().as_str() {
      "drop" => Some(Self::Drop),
      "placeholder" => Some(Self::Placeholder),
      _ => None,
    }
  }
}

/// Target of a web-part mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPartMapping {
  pub target_type: String,
  pub transformer: PropertyTransformer,
}

impl WebPartMapping {
  pub fn new(target_type: impl Into<String>, transformer: PropertyTransformer) -> Self {
    Self {
      target_type: target_type.into(),
      transformer,
    }
  }
}

/// Prefix-based URL rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
  pub source_prefix: String,
  pub target_prefix: String,
}

impl UrlMapping {
  pub fn new(source_prefix: impl Into<String>, target_prefix: impl Into<String>) -> Self {
    Self {
      source_prefix: source_prefix.into().trim_end_matches('/').to_string(),
      target_prefix: target_prefix.into().trim_end_matches('/').to_string(),
    }
  }

  /// Rewrite `url` when it starts with the source prefix on a path boundary.
  fn apply(&self, url: &str) -> Option<String> {
    let head = url.get(..self.source_prefix.len())?;
    if !head.eq_ignore_ascii_case(&self.source_prefix) {
      return None;
    }

    let tail = &url[self.source_prefix.len()..];
    if !(tail.is_empty() || tail.starts_with(['/', '?', '#'])) {
      return None;
    }

    Some(format!("{}{}", self.target_prefix, tail))
  }
}

/// Lookup tables used by the transform engine.
#[derive(Debug, Clone, Default)]
pub struct MappingRuleSet {
  web_parts: HashMap<String, WebPartMapping>,
  layouts: HashMap<String, String>,
  users: HashMap<String, String>,
  urls: Vec<UrlMapping>,
  unmapped: UnmappedPolicy,
}

impl MappingRuleSet {
  /// A rule set without any entries.
  pub fn empty() -> Self {
    Self::default()
  }

  /// The built-in classic-to-modern table.
  pub fn builtin() -> Self {
    builtin::default_rule_set()
  }

  pub fn add_web_part_mapping(&mut self, source_type: &str, mapping: WebPartMapping) {
    self.web_parts.insert(normalize_type_name(source_type), mapping);
  }

  pub fn add_layout_mapping(&mut self, source_layout: &str, target_layout: impl Into<String>) {
    self
      .layouts
      .insert(source_layout.trim().to_ascii_lowercase(), target_layout.into());
  }

  pub fn add_user_mapping(&mut self, source_login: &str, target_login: impl Into<String>) {
    self
      .users
      .insert(source_login.trim().to_ascii_lowercase(), target_login.into());
  }

  /// Add a URL mapping. Longer source prefixes win regardless of insertion
  /// order.
  pub fn add_url_mapping(&mut self, mapping: UrlMapping) {
    self.urls.retain(|m| !m.source_prefix.eq_ignore_ascii_case(&mapping.source_prefix));
    self.urls.push(mapping);
    self.urls.sort_by(|a, b| b.source_prefix.len().cmp(&a.source_prefix.len()));
  }

  /// Map the source site onto the target site unless an explicit mapping for
  /// the source site already exists.
  pub fn add_site_url_mapping(&mut self, source_site: &str, target_site: &str) {
    let source_site = source_site.trim_end_matches('/');
    if source_site.eq_ignore_ascii_case(target_site.trim_end_matches('/')) {
      return;
    }
    if self.urls.iter().any(|m| m.source_prefix.eq_ignore_ascii_case(source_site)) {
      return;
    }
    self.add_url_mapping(UrlMapping::new(source_site, target_site));
  }

  pub fn set_unmapped_policy(&mut self, policy: UnmappedPolicy) {
    self.unmapped = policy;
  }

  pub fn unmapped_policy(&self) -> UnmappedPolicy {
    self.unmapped
  }

  /// Overlay `other` on top of this rule set; entries of `other` win.
  pub fn merge(&mut self, other: MappingRuleSet) {
    self.web_parts.extend(other.web_parts);
    self.layouts.extend(other.layouts);
    self.users.extend(other.users);
    for mapping in other.urls {
      self.add_url_mapping(mapping);
    }
    self.unmapped = other.unmapped;
  }

  /// Mapping for a source web-part type, if any.
  ///
  /// Fully qualified type names (`Namespace.Type, Assembly, Version=...`) are
  /// matched on their short type name, case-insensitively.
  pub fn resolve_web_part(&self, source_type: &str) -> Option<&WebPartMapping> {
    self.web_parts.get(&normalize_type_name(source_type))
  }

  /// Target layout for a source layout, if any.
  pub fn map_layout(&self, source_layout: &str) -> Option<&str> {
    self
      .layouts
      .get(&source_layout.trim().to_ascii_lowercase())
      .map(String::as_str)
  }

  /// Target identity for `login`, or `login` itself when mapping is disabled
  /// or no entry exists.
  pub fn map_user(&self, login: &str, enabled: bool) -> String {
    if !enabled {
      return login.to_string();
    }

    self
      .users
      .get(&login.trim().to_ascii_lowercase())
      .cloned()
      .unwrap_or_else(|| login.to_string())
  }

  /// Rewritten `url`, or `url` itself when rewriting is disabled or no
  /// mapping matches.
  pub fn rewrite_url(&self, url: &str, enabled: bool) -> String {
    if !enabled {
      return url.to_string();
    }

    self
      .urls
      .iter()
      .find_map(|mapping| mapping.apply(url))
      .unwrap_or_else(|| url.to_string())
  }

  pub fn web_part_mapping_count(&self) -> usize {
    self.web_parts.len()
  }

  pub fn layout_mapping_count(&self) -> usize {
    self.layouts.len()
  }

  pub fn user_mapping_count(&self) -> usize {
    self.users.len()
  }

  pub fn url_mapping_count(&self) -> usize {
    self.urls.len()
  }
}

/// Whether two web-part type names denote the same type.
pub fn same_web_part_type(a: &str, b: &str) -> bool {
  normalize_type_name(a) == normalize_type_name(b)
}

/// Reduce a (possibly assembly-qualified) type name to its lowercase short
/// name.
fn normalize_type_name(type_name: &str) -> String {
  let without_assembly = type_name.split(',').next().unwrap_or(type_name).trim();
  let short = without_assembly.rsplit('.').next().unwrap_or(without_assembly);
  short.to_ascii_lowercase()
}
