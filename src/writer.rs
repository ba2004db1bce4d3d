//! Page Writer: persists a [`TargetPage`] on the target site.
//!
//! Order of operations:
//! 1. validate the option combination (nothing is written on failure),
//! 2. check the target locator and enforce the overwrite policy,
//! 3. save the page,
//! 4. re-apply unique permissions when they are preserved,
//! 5. publish and/or promote as news,
//! 6. repoint the site's home page when the engine flagged it.

use std::future::Future;

use tracing::{debug, info};

use crate::error::TransformError;
use crate::model::{PageLocator, TargetPage};
use crate::options::TransformationOptions;
use crate::platform::{ColumnDocument, PageDocument, SectionDocument, SiteApi, SiteError, WebPartDocument};
use crate::retry::{CallError, CallSettings, call_with_retry};

/// Writes modern pages through a [`SiteApi`].
pub struct PageWriter<'a> {
  api: &'a dyn SiteApi,
  calls: CallSettings,
}

impl<'a> PageWriter<'a> {
  pub fn new(api: &'a dyn SiteApi, calls: CallSettings) -> Self {
    Self { api, calls }
  }

  /// Persist `page` and return its final locator.
  ///
  /// Permissions: unique permissions carried over from the source page win.
  /// Without them, an overwritten target page gets its own previous
  /// permissions re-applied.
  ///
  /// # Errors
  /// - [`TransformError::InvalidOptionCombination`] before any call when the
  ///   options conflict,
  /// - [`TransformError::TargetAlreadyExists`] when the page exists and
  ///   overwrite is disabled; nothing is written in that case,
  /// - [`TransformError::Timeout`] / [`TransformError::TargetWriteError`] when a
  ///   call fails.
  pub async fn write(&self, page: &TargetPage, options: &TransformationOptions) -> Result<PageLocator, TransformError> {
    options.validate()?;

    let locator = &page.locator;
    let path = locator.site_relative_path();
    let keep_permissions = options.page.keep_page_specific_permissions;

    let exists = self
      .call(locator, &format!("check {path}"), || self.api.page_exists(&path))
      .await?;

    if exists && !options.page.overwrite {
      return Err(TransformError::TargetAlreadyExists(locator.to_string()));
    }

    // Overwriting may reset the target's permissions; remember them first.
    let existing_permissions = if exists && keep_permissions {
      self
        .call(locator, &format!("read permissions of {path}"), || {
          self.api.get_page_permissions(&path)
        })
        .await?
    } else {
      None
    };

    let document = to_document(page, options);
    self
      .call(locator, &format!("save {path}"), || self.api.save_page(&path, &document))
      .await?;
    debug!("Saved {locator} ({} web parts)", page.web_part_count());

    if keep_permissions {
      let entries = page.metadata.permissions.as_ref().or(existing_permissions.as_ref());
      if let Some(entries) = entries {
        self
          .call(locator, &format!("apply permissions to {path}"), || {
            self.api.set_page_permissions(&path, entries)
          })
          .await?;
        debug!("Applied {} permission entries to {locator}", entries.len());
      }
    }

    if options.page.publish_page {
      self
        .call(locator, &format!("publish {path}"), || self.api.publish_page(&path))
        .await?;
    }

    if options.page.post_as_news {
      self
        .call(locator, &format!("promote {path}"), || self.api.promote_as_news(&path))
        .await?;
    }

    if page.replaces_home_page {
      self
        .call(locator, &format!("set home page to {path}"), || self.api.set_home_page(&path))
        .await?;
      info!("{locator} is now the home page of {}", locator.site_url);
    }

    info!("Wrote {locator}");
    Ok(locator.clone())
  }

  async fn call<T, F, Fut>(&self, locator: &PageLocator, operation: &str, call: F) -> Result<T, TransformError>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SiteError>>,
  {
    call_with_retry(&self.calls, operation, call)
      .await
      .map_err(|e| target_error(locator, e))
  }
}

/// Translate a failed target call into the pipeline taxonomy.
fn target_error(locator: &PageLocator, error: CallError) -> TransformError {
  match error {
    CallError::Timeout { operation, seconds } => TransformError::Timeout { operation, seconds },
    CallError::Site(SiteError::Conflict(_)) => TransformError::TargetAlreadyExists(locator.to_string()),
    CallError::Site(other) => TransformError::write(locator.to_string(), other.to_string()),
  }
}

/// Wire representation of a target page.
pub fn to_document(page: &TargetPage, options: &TransformationOptions) -> PageDocument {
  let sections = page
    .sections
    .iter()
    .map(|section| SectionDocument {
      columns: section
        .columns
        .iter()
        .map(|column| ColumnDocument {
          width: column.width,
          web_parts: column
            .web_parts
            .iter()
            .map(|part| WebPartDocument {
              id: part.id.clone(),
              web_part_type: part.web_part_type.clone(),
              title: part.title.clone(),
              hidden: part.hidden,
              properties: part.properties.clone(),
            })
            .collect(),
          wiki_html: None,
        })
        .collect(),
    })
    .collect();

  PageDocument {
    title: page.title.clone(),
    kind: Default::default(),
    layout: page.layout.clone(),
    is_home_page: page.replaces_home_page,
    sections,
    author: page.metadata.author.clone(),
    editor: page.metadata.editor.clone(),
    created: page.metadata.created.map(|t| t.to_rfc3339()),
    modified: page.metadata.modified.map(|t| t.to_rfc3339()),
    fields: page.metadata.fields.clone(),
    // Permissions are applied through their own call after saving.
    permissions: None,
    comments_disabled: options.page.disable_page_comments,
  }
}
