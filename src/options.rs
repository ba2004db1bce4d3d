//! Configuration for a transformation run.
//!
//! Options are plain structs assembled before the pipeline starts and passed
//! by reference to every stage. [`PageOptions`] controls how the modern target
//! page is created; [`SourceOptions`] controls how the classic source page is
//! interpreted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Settings for creating the modern target page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
  /// Copy the source page's custom metadata fields.
  pub copy_page_metadata: bool,
  /// Carry the source author/editor and created/modified timestamps instead of
  /// stamping the page with the running actor and time.
  pub keep_page_creation_modification_information: bool,
  /// Promote the target page as a news post.
  pub post_as_news: bool,
  /// Publish the target page after saving it.
  pub publish_page: bool,
  /// Turn off comments on the target page.
  pub disable_page_comments: bool,
  /// Copy unique permissions of the source page and re-apply them after an
  /// overwrite.
  pub keep_page_specific_permissions: bool,
  /// Replace a pre-existing target page.
  pub overwrite: bool,
  /// When the source is the site's home page, make the target the new home
  /// page.
  pub replace_home_page_with_default_home_page: bool,
  /// Insert an author banner as the first element of the page.
  pub set_author_in_page_header: bool,
  /// Folder inside `SitePages`; empty keeps the source folder.
  pub target_page_folder: String,
  /// Explicit target file name; empty derives it from the source.
  pub target_page_name: String,
  /// Prefix put in front of derived target names.
  pub target_page_prefix: String,
  /// Derive the target name from the source file name rather than its title.
  pub target_page_takes_source_page_name: bool,
}

impl Default for PageOptions {
  fn default() -> Self {
    Self {
      copy_page_metadata: false,
      keep_page_creation_modification_information: false,
      post_as_news: false,
      publish_page: true,
      disable_page_comments: false,
      keep_page_specific_permissions: true,
      overwrite: false,
      replace_home_page_with_default_home_page: false,
      set_author_in_page_header: false,
      target_page_folder: String::new(),
      target_page_name: String::new(),
      target_page_prefix: String::new(),
      target_page_takes_source_page_name: true,
    }
  }
}

/// Settings for interpreting classic source pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
  /// Drop columns without web parts, then sections without columns.
  pub remove_empty_sections_and_columns: bool,
  /// Translate user identities through the user mapping.
  pub should_map_users: bool,
  /// Turn inline wiki images and videos into media web parts.
  pub handle_wiki_images_and_videos: bool,
  /// Turn images rendered by lists (and images inside wiki tables/lists) into
  /// image web parts.
  pub add_table_list_image_as_image_web_part: bool,
  /// Keep classic title-bar web parts.
  pub include_title_bar_web_part: bool,
  /// Drop web parts flagged hidden.
  pub skip_hidden_web_parts: bool,
  /// Leave URLs untouched.
  pub skip_url_rewrite: bool,
  /// Free-form values available to mapping rules as `{Key}` placeholders.
  pub mapping_properties: BTreeMap<String, String>,
}

impl Default for SourceOptions {
  fn default() -> Self {
    Self {
      remove_empty_sections_and_columns: true,
      should_map_users: true,
      handle_wiki_images_and_videos: true,
      add_table_list_image_as_image_web_part: true,
      include_title_bar_web_part: false,
      skip_hidden_web_parts: true,
      skip_url_rewrite: false,
      mapping_properties: BTreeMap::new(),
    }
  }
}

/// Complete option set for one transformation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationOptions {
  pub page: PageOptions,
  pub source: SourceOptions,
}

impl TransformationOptions {
  /// Reject option combinations that cannot be honoured.
  ///
  /// # Errors
  /// Returns [`TransformError::InvalidOptionCombination`] when the page is to
  /// be posted as news and also replace the home page.
  pub fn validate(&self) -> Result<(), TransformError> {
    if self.page.post_as_news && self.page.replace_home_page_with_default_home_page {
      return Err(TransformError::InvalidOptionCombination(
        "post-as-news cannot be combined with replace-home-page".to_string(),
      ));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let options = TransformationOptions::default();
    assert!(options.page.target_page_takes_source_page_name);
    assert!(!options.page.overwrite);
    assert!(options.source.skip_hidden_web_parts);
    assert!(options.source.remove_empty_sections_and_columns);
    assert!(options.validate().is_ok());
  }

  #[test]
  fn test_news_and_home_page_conflict() {
    let mut options = TransformationOptions::default();
    options.page.post_as_news = true;
    options.page.replace_home_page_with_default_home_page = true;

    let err = options.validate().unwrap_err();
    assert_eq!(err.kind(), "InvalidOptionCombination");
  }

  #[test]
  fn test_partial_json_uses_defaults() {
    let options: TransformationOptions =
      serde_json::from_str(r#"{ "page": { "target_page_prefix": "Migrated_" } }"#).unwrap();
    assert_eq!(options.page.target_page_prefix, "Migrated_");
    assert!(options.page.publish_page);
    assert!(options.source.should_map_users);
  }
}
