//! Structural page model shared by the reader, engine, and writer.
//!
//! Both the classic source page and the modern target page are described as
//! ordered sections, each holding ordered columns, each holding ordered web
//! parts. The vocabulary differs (classic web-part type names on the source
//! side, modern ones on the target side) but the shape is the same.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered property bag of a web part.
pub type PropertyBag = serde_json::Map<String, Value>;

/// Library that holds modern pages on the target site.
pub const SITE_PAGES_LIBRARY: &str = "SitePages";

/// Location of a page: the site it belongs to, the library, an optional folder
/// inside the library, and the file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageLocator {
  /// Absolute site URL without trailing slash.
  pub site_url: String,
  /// Document library name (e.g. `SitePages`, `Pages`).
  pub library: String,
  /// Folder path inside the library, empty for the library root.
  pub folder: String,
  /// Page file name including extension (e.g. `Home.aspx`).
  pub name: String,
}

impl PageLocator {
  /// Build a locator, normalising slashes on every component.
  pub fn new(
    site_url: impl Into<String>,
    library: impl Into<String>,
    folder: impl Into<String>,
    name: impl Into<String>,
  ) -> Self {
    Self {
      site_url: site_url.into().trim_end_matches('/').to_string(),
      library: library.into().trim_matches('/').to_string(),
      folder: folder.into().trim_matches('/').to_string(),
      name: name.into().trim_matches('/').to_string(),
    }
  }

  /// Path of the page relative to its site (`SitePages/sub/Home.aspx`).
  pub fn site_relative_path(&self) -> String {
    [self.library.as_str(), self.folder.as_str(), self.name.as_str()]
      .iter()
      .filter(|part| !part.is_empty())
      .copied()
      .collect::<Vec<_>>()
      .join("/")
  }

  /// Absolute URL of the page.
  pub fn url(&self) -> String {
    format!("{}/{}", self.site_url, self.site_relative_path())
  }
}

impl fmt::Display for PageLocator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.url())
  }
}

/// Kind of classic page the source was authored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
  /// Free-form wiki page whose content is HTML.
  #[default]
  Wiki,
  /// Web-part page built from zones.
  WebPart,
  /// Publishing page rendered through a page layout.
  Publishing,
  /// Blog post.
  Blog,
}

/// A user as known to a collaboration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
  /// Login name / principal (e.g. `i:0#.f|membership|jane@contoso.com`).
  pub login: String,
  /// Optional display name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
}

impl UserIdentity {
  pub fn new(login: impl Into<String>) -> Self {
    Self {
      login: login.into(),
      display_name: None,
    }
  }
}

/// A role assignment on a page with unique permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
  /// User or group login.
  pub principal: String,
  /// Role definition name (e.g. `Read`, `Contribute`).
  pub role: String,
}

/// Page-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageMetadata {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<UserIdentity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub editor: Option<UserIdentity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub modified: Option<DateTime<Utc>>,
  /// Custom list-item fields of the page.
  #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
  pub fields: PropertyBag,
  /// Unique role assignments; `None` means the page inherits permissions.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub permissions: Option<Vec<PermissionEntry>>,
}

/// One web part placed in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPartInstance {
  /// Identifier unique within the page.
  pub id: String,
  /// Type identifier in the vocabulary of the page's side.
  pub web_part_type: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub properties: PropertyBag,
  #[serde(default)]
  pub hidden: bool,
}

impl WebPartInstance {
  pub fn new(id: impl Into<String>, web_part_type: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      web_part_type: web_part_type.into(),
      title: String::new(),
      properties: PropertyBag::new(),
      hidden: false,
    }
  }

  /// Builder-style helper to set a property.
  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.properties.insert(key.into(), value.into());
    self
  }

  /// String value of a property, if it is a string.
  pub fn property_str(&self, key: &str) -> Option<&str> {
    self.properties.get(key).and_then(Value::as_str)
  }
}

/// A layout column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
  /// Width factor out of 12; `0` lets the renderer decide.
  #[serde(default)]
  pub width: u8,
  #[serde(default)]
  pub web_parts: Vec<WebPartInstance>,
}

impl Column {
  pub fn is_empty(&self) -> bool {
    self.web_parts.is_empty()
  }
}

/// A layout section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
  #[serde(default)]
  pub columns: Vec<Column>,
}

impl Section {
  pub fn is_empty(&self) -> bool {
    self.columns.is_empty()
  }

  /// Number of web parts across all columns.
  pub fn web_part_count(&self) -> usize {
    self.columns.iter().map(|c| c.web_parts.len()).sum()
  }
}

/// Raw wiki HTML as it was stored in a source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiFragment {
  pub section: usize,
  pub column: usize,
  pub html: String,
}

/// The classic page as read from the source site. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePage {
  pub locator: PageLocator,
  pub title: String,
  pub kind: PageKind,
  /// Source layout name (wiki layout or publishing page layout).
  pub layout: String,
  pub sections: Vec<Section>,
  pub wiki_fragments: Vec<WikiFragment>,
  pub metadata: PageMetadata,
  /// Whether the page is the site's welcome page.
  pub is_home_page: bool,
}

impl SourcePage {
  /// Number of web parts across all sections.
  pub fn web_part_count(&self) -> usize {
    self.sections.iter().map(Section::web_part_count).sum()
  }
}

/// A source web part that had no mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedWebPart {
  pub web_part_type: String,
  pub title: String,
  /// Index of the source section.
  pub section: usize,
  /// Index of the source column inside that section.
  pub column: usize,
  /// Whether a placeholder was emitted in place of the web part.
  pub placeholder: bool,
}

/// The modern page produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetPage {
  pub locator: PageLocator,
  pub title: String,
  /// Modern page layout (e.g. `Article`, `Home`).
  pub layout: String,
  pub sections: Vec<Section>,
  pub metadata: PageMetadata,
  /// The writer should also point the target site's home page at this page.
  pub replaces_home_page: bool,
  pub unsupported_web_parts: Vec<UnsupportedWebPart>,
}

impl TargetPage {
  /// Number of web parts across all sections.
  pub fn web_part_count(&self) -> usize {
    self.sections.iter().map(Section::web_part_count).sum()
  }
}
