//! Provisioning template extraction.
//!
//! A provisioning template captures the lists, content types, and files of a
//! site so its configuration can be replicated elsewhere. Extraction reads the
//! site structure through the same [`SiteApi`] the transformation pipeline
//! uses; [`XmlFileSystemTemplateProvider`] stores the result on disk.

mod connector;
mod xml;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

pub use connector::FileSystemConnector;
pub use xml::{XmlFileSystemTemplateProvider, from_xml, to_xml};

use crate::platform::{SiteApi, SiteStructure};
use crate::progress::{ProgressEvent, ProgressSink, Stage};

const EXTRACTION_STEPS: usize = 3;

/// Options controlling template extraction.
#[derive(Debug, Clone, Default)]
pub struct TemplateCreationOptions {
  /// Download branding files (master pages, themes, logos) next to the
  /// template.
  pub persist_branding_files: bool,
  /// Store used for persisted files; required when
  /// `persist_branding_files` is set.
  pub file_connector: Option<FileSystemConnector>,
}

/// Serializable description of a site's structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningTemplate {
  pub site_title: String,
  pub lists: Vec<ListInstance>,
  pub content_types: Vec<ContentType>,
  pub files: Vec<TemplateFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListInstance {
  pub title: String,
  pub template_type: u32,
  pub url: String,
  pub content_type_bindings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
  pub id: String,
  pub name: String,
  pub group: String,
  pub field_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
  /// Site-relative path of the file.
  pub src: String,
  pub branding: bool,
  /// Whether the file's bytes were stored through the connector.
  pub persisted: bool,
}

/// Extract a provisioning template from the site behind `api`.
///
/// # Arguments
/// * `api` - Session bound to the site to extract.
/// * `options` - Whether and where to persist branding files.
/// * `progress` - Receives one [`Stage::TemplateStep`] event per extraction step.
///
/// # Errors
/// Returns an error when the site structure cannot be read, contains a list
/// without a title or a content type without an id, or a branding file cannot
/// be downloaded or stored.
pub async fn extract_template(
  api: &dyn SiteApi,
  options: &TemplateCreationOptions,
  progress: &dyn ProgressSink,
) -> Result<ProvisioningTemplate> {
  if options.persist_branding_files && options.file_connector.is_none() {
    bail!("Persisting branding files requires a file connector");
  }

  info!("Extracting provisioning template from {}", api.site_url());
  let structure = api
    .get_site_structure()
    .await
    .with_context(|| format!("Failed to read the structure of {}", api.site_url()))?;

  let SiteStructure {
    title,
    lists,
    content_types,
    files,
  } = structure;

  progress.on_event(&ProgressEvent::new(
    Stage::TemplateStep,
    format!("Lists ({})", lists.len()),
    1,
    EXTRACTION_STEPS,
  ));
  let lists = lists
    .into_iter()
    .enumerate()
    .map(|(index, list)| {
      if list.title.trim().is_empty() {
        bail!("List #{} at '{}' has no title", index + 1, list.url);
      }
      Ok(ListInstance {
        title: list.title,
        template_type: list.template,
        url: list.url,
        content_type_bindings: list.content_type_ids,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  progress.on_event(&ProgressEvent::new(
    Stage::TemplateStep,
    format!("Content types ({})", content_types.len()),
    2,
    EXTRACTION_STEPS,
  ));
  let content_types = content_types
    .into_iter()
    .map(|content_type| {
      if content_type.id.trim().is_empty() {
        bail!("Content type '{}' has no id", content_type.name);
      }
      Ok(ContentType {
        id: content_type.id,
        name: content_type.name,
        group: content_type.group,
        field_refs: content_type.fields,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  progress.on_event(&ProgressEvent::new(
    Stage::TemplateStep,
    format!("Files ({})", files.len()),
    3,
    EXTRACTION_STEPS,
  ));
  let connector = options.file_connector.as_ref().filter(|_| options.persist_branding_files);
  let mut template_files = Vec::with_capacity(files.len());
  for file in files {
    let persisted = match connector {
      Some(connector) if file.branding => {
        let bytes = api
          .fetch_file(&file.path)
          .await
          .with_context(|| format!("Failed to download {}", file.path))?;
        let stored = connector.save_file(&file.path, &bytes)?;
        debug!("Persisted {} to {}", file.path, stored.display());
        true
      }
      _ => false,
    };
    template_files.push(TemplateFile {
      src: file.path,
      branding: file.branding,
      persisted,
    });
  }

  info!(
    "Extracted template: {} lists, {} content types, {} files",
    lists.len(),
    content_types.len(),
    template_files.len()
  );

  Ok(ProvisioningTemplate {
    site_title: title,
    lists,
    content_types,
    files: template_files,
  })
}
