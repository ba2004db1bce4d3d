//! Data transfer objects exchanged with the site REST API.

use serde::{Deserialize, Serialize};

use crate::model::{PageKind, PermissionEntry, PropertyBag, UserIdentity};

/// Structural description of a page as stored on a site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
  pub title: String,
  #[serde(default)]
  /// Classic page kind; modern pages written by the pipeline report `wiki`.
  pub kind: PageKind,
  #[serde(default)]
  /// Wiki layout, page layout, or modern layout name.
  pub layout: String,
  #[serde(default)]
  pub is_home_page: bool,
  #[serde(default)]
  pub sections: Vec<SectionDocument>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<UserIdentity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub editor: Option<UserIdentity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  /// RFC 3339 creation timestamp.
  pub created: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  /// RFC 3339 modification timestamp.
  pub modified: Option<String>,
  #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
  /// Custom list-item fields.
  pub fields: PropertyBag,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  /// Unique role assignments; absent when the page inherits.
  pub permissions: Option<Vec<PermissionEntry>>,
  #[serde(default)]
  pub comments_disabled: bool,
}

/// Section of a page document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDocument {
  #[serde(default)]
  pub columns: Vec<ColumnDocument>,
}

/// Column of a page document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDocument {
  #[serde(default)]
  pub width: u8,
  #[serde(default)]
  pub web_parts: Vec<WebPartDocument>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  /// Wiki HTML of the column (wiki pages only).
  pub wiki_html: Option<String>,
}

/// Web part of a page document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPartDocument {
  pub id: String,
  #[serde(rename = "type")]
  pub web_part_type: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub hidden: bool,
  #[serde(default)]
  pub properties: PropertyBag,
}

/// User information returned when verifying a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
  /// Login name of the signed-in principal.
  pub login: String,
  pub display_name: String,
  #[serde(default)]
  pub email: Option<String>,
}

/// Response of the page existence check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsResponse {
  pub exists: bool,
}

/// Response carrying the site's welcome page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomePageResponse {
  /// Site-relative path of the home page.
  pub url: String,
}

/// Response listing pages of a library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageListResponse {
  pub results: Vec<String>,
}

/// Response carrying page permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
  pub has_unique_role_assignments: bool,
  #[serde(default)]
  pub entries: Vec<PermissionEntry>,
}

/// Structure of a site used for provisioning template extraction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStructure {
  pub title: String,
  #[serde(default)]
  pub lists: Vec<ListInfo>,
  #[serde(default)]
  pub content_types: Vec<ContentTypeInfo>,
  #[serde(default)]
  pub files: Vec<FileInfo>,
}

/// List or library definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInfo {
  pub title: String,
  /// Base template id (e.g. `100` generic list, `101` document library).
  pub template: u32,
  /// Site-relative URL of the list root folder.
  pub url: String,
  #[serde(default)]
  pub content_type_ids: Vec<String>,
}

/// Content type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeInfo {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub group: String,
  #[serde(default)]
  pub fields: Vec<String>,
}

/// File referenced by a site (master pages, theme assets, site logo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
  /// Site-relative path of the file.
  pub path: String,
  /// Whether the file is a branding asset.
  #[serde(default)]
  pub branding: bool,
}
