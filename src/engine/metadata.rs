//! Target page metadata.

use super::TransformContext;
use crate::mapping::MappingRuleSet;
use crate::model::{PageMetadata, PermissionEntry, UserIdentity};
use crate::options::TransformationOptions;

/// Derive the target metadata from the source metadata.
///
/// - custom fields are copied only when `copy_page_metadata` is set,
/// - author/editor and timestamps are carried over (identities user-mapped)
///   when `keep_page_creation_modification_information` is set, otherwise the
///   page is stamped with the running actor and time,
/// - unique permissions are carried (principals user-mapped) when
///   `keep_page_specific_permissions` is set.
pub fn target_metadata(
  source: &PageMetadata,
  rules: &MappingRuleSet,
  options: &TransformationOptions,
  ctx: &TransformContext,
) -> PageMetadata {
  let map_users = options.source.should_map_users;
  let map_identity = |identity: &UserIdentity| UserIdentity {
    login: rules.map_user(&identity.login, map_users),
    display_name: identity.display_name.clone(),
  };

  let fields = if options.page.copy_page_metadata {
    source.fields.clone()
  } else {
    Default::default()
  };

  let (author, editor, created, modified) = if options.page.keep_page_creation_modification_information {
    (
      source.author.as_ref().map(map_identity),
      source.editor.as_ref().map(map_identity),
      source.created,
      source.modified,
    )
  } else {
    (
      Some(ctx.actor.clone()),
      Some(ctx.actor.clone()),
      Some(ctx.now),
      Some(ctx.now),
    )
  };

  let permissions = if options.page.keep_page_specific_permissions {
    source.permissions.as_ref().map(|entries| {
      entries
        .iter()
        .map(|entry| PermissionEntry {
          principal: rules.map_user(&entry.principal, map_users),
          role: entry.role.clone(),
        })
        .collect()
    })
  } else {
    None
  };

  PageMetadata {
    author,
    editor,
    created,
    modified,
    fields,
    permissions,
  }
}
