//! Transform Engine: converts a [`SourcePage`] into a [`TargetPage`].
//!
//! The engine is a pure, deterministic function. Everything that varies
//! between runs (the acting user, the current time, the target site) comes in
//! through [`TransformContext`].
//!
//! Steps, in order:
//! 1. walk sections, columns and web parts in source order, dropping hidden
//!    web parts (when skipping hidden) and title bars (unless included),
//! 2. map every remaining web part, or apply the unmapped policy and record it,
//! 3. drop empty columns, then empty sections (when enabled),
//! 4. derive the target metadata and optionally prepend an author banner,
//! 5. compute the target locator and layout.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, trace};

mod layout;
mod metadata;
mod naming;

pub use layout::remove_empty_sections_and_columns;
pub use metadata::target_metadata;
pub use naming::{slugify, target_locator};

use crate::mapping::{
  DEFAULT_TARGET_LAYOUT, MappingRuleSet, PLACEHOLDER_WEB_PART_TYPE, RewriteContext, TITLE_BAR_WEB_PART,
  UnmappedPolicy, same_web_part_type,
};
use crate::model::{Column, Section, SourcePage, TargetPage, UnsupportedWebPart, UserIdentity, WebPartInstance};
use crate::options::TransformationOptions;

/// Web-part type of the author banner.
pub const AUTHOR_BYLINE_WEB_PART: &str = "AuthorByline";

/// Modern layout of pages that replace a site's home page.
pub const HOME_LAYOUT: &str = "Home";

/// Run-specific inputs of a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformContext {
  /// User performing the transformation; stamped on the page unless creation
  /// information is preserved.
  pub actor: UserIdentity,
  /// Time stamped on the page unless creation information is preserved.
  pub now: DateTime<Utc>,
  /// Absolute URL of the target site.
  pub target_site_url: String,
}

/// Transform a source page into its modern equivalent.
///
/// # Arguments
/// * `source` - The classic page; never modified.
/// * `rules` - Mapping rule set shared by the whole run.
/// * `options` - Transformation options.
/// * `ctx` - Acting user, current time, and target site.
///
/// # Returns
/// The target page, including the report of web parts that had no mapping.
pub fn transform(
  source: &SourcePage,
  rules: &MappingRuleSet,
  options: &TransformationOptions,
  ctx: &TransformContext,
) -> TargetPage {
  let rewrite = RewriteContext {
    rules,
    map_users: options.source.should_map_users,
    rewrite_urls: !options.source.skip_url_rewrite,
    mapping_properties: &options.source.mapping_properties,
  };

  let mut unsupported = Vec::new();
  let mut sections = Vec::with_capacity(source.sections.len());

  for (section_idx, section) in source.sections.iter().enumerate() {
    let mut columns = Vec::with_capacity(section.columns.len());

    for (column_idx, column) in section.columns.iter().enumerate() {
      let mut web_parts = Vec::with_capacity(column.web_parts.len());

      for part in &column.web_parts {
        if options.source.skip_hidden_web_parts && part.hidden {
          trace!("Skipping hidden web part {} ({})", part.id, part.web_part_type);
          continue;
        }
        if !options.source.include_title_bar_web_part && same_web_part_type(&part.web_part_type, TITLE_BAR_WEB_PART) {
          trace!("Skipping title bar web part {}", part.id);
          continue;
        }

        match rules.resolve_web_part(&part.web_part_type) {
          Some(mapping) => web_parts.push(WebPartInstance {
            id: part.id.clone(),
            web_part_type: mapping.target_type.clone(),
            title: part.title.clone(),
            properties: mapping.transformer.apply(&part.properties, &rewrite),
            hidden: part.hidden,
          }),
          None => {
            let placeholder = rules.unmapped_policy() == UnmappedPolicy::Placeholder;
            debug!(
              "No mapping for web part type {} ({})",
              part.web_part_type,
              if placeholder { "placeholder" } else { "dropped" }
            );
            if placeholder {
              web_parts.push(placeholder_for(part));
            }
            unsupported.push(UnsupportedWebPart {
              web_part_type: part.web_part_type.clone(),
              title: part.title.clone(),
              section: section_idx,
              column: column_idx,
              placeholder,
            });
          }
        }
      }

      columns.push(Column {
        width: column.width,
        web_parts,
      });
    }

    sections.push(Section { columns });
  }

  if options.source.remove_empty_sections_and_columns {
    remove_empty_sections_and_columns(&mut sections);
  }

  let metadata = target_metadata(&source.metadata, rules, options, ctx);

  if options.page.set_author_in_page_header {
    let banner = author_banner(metadata.author.as_ref());
    sections.insert(
      0,
      Section {
        columns: vec![Column {
          width: 12,
          web_parts: vec![banner],
        }],
      },
    );
  }

  let replaces_home_page = source.is_home_page && options.page.replace_home_page_with_default_home_page;
  let layout = if replaces_home_page {
    HOME_LAYOUT.to_string()
  } else {
    rules
      .map_layout(&source.layout)
      .unwrap_or(DEFAULT_TARGET_LAYOUT)
      .to_string()
  };

  let locator = target_locator(&source.locator, &source.title, &options.page, &ctx.target_site_url);

  TargetPage {
    locator,
    title: source.title.clone(),
    layout,
    sections,
    metadata,
    replaces_home_page,
    unsupported_web_parts: unsupported,
  }
}

fn placeholder_for(part: &WebPartInstance) -> WebPartInstance {
  let mut placeholder = WebPartInstance::new(part.id.clone(), PLACEHOLDER_WEB_PART_TYPE)
    .with_property("sourceType", part.web_part_type.as_str())
    .with_property("title", part.title.as_str());
  placeholder.title = part.title.clone();
  placeholder.hidden = part.hidden;
  placeholder
}

fn author_banner(author: Option<&UserIdentity>) -> WebPartInstance {
  let login = author.map(|a| Value::String(a.login.clone())).unwrap_or(Value::Null);
  let display_name = author
    .and_then(|a| a.display_name.clone())
    .map(Value::String)
    .unwrap_or(Value::Null);

  WebPartInstance::new("author-byline", AUTHOR_BYLINE_WEB_PART)
    .with_property("author", login)
    .with_property("authorDisplayName", display_name)
}
