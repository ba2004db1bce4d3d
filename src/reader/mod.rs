//! Page Reader: pulls a classic page from the source site and normalises it
//! into a [`SourcePage`].
//!
//! Normalisation happens here so the engine never special-cases raw wiki HTML
//! or list views that merely render an image:
//! - wiki HTML columns are split into `WikiText` / `WikiImage` / `WikiVideo`
//!   web parts with embedded web parts placed where the HTML references them,
//! - list view web parts rendering an image become `ImageWebPart`s.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

mod html;
mod wiki;

pub use wiki::{WIKI_IMAGE, WIKI_TEXT, WIKI_VIDEO, WikiBlock, WikiSplitOptions, split_wiki_html};

use crate::error::TransformError;
use crate::mapping::same_web_part_type;
use crate::model::{Column, PageLocator, PageMetadata, Section, SourcePage, WebPartInstance, WikiFragment};
use crate::options::SourceOptions;
use crate::platform::{PageDocument, SiteApi, SiteError, WebPartDocument};
use crate::retry::{CallError, CallSettings, call_with_retry};

/// Classic image web-part type produced for list views rendering an image.
pub const IMAGE_WEB_PART: &str = "ImageWebPart";

const LIST_VIEW_TYPES: &[&str] = &["XsltListViewWebPart", "ListViewWebPart"];

/// Reads classic pages through a [`SiteApi`].
pub struct PageReader<'a> {
  api: &'a dyn SiteApi,
  calls: CallSettings,
}

impl<'a> PageReader<'a> {
  pub fn new(api: &'a dyn SiteApi, calls: CallSettings) -> Self {
    Self { api, calls }
  }

  /// Fetch and normalise the page at `locator`.
  ///
  /// # Errors
  /// - [`TransformError::SourceNotFound`] / [`TransformError::SourceAccessDenied`]
  ///   when the site refuses the page,
  /// - [`TransformError::SourceParseError`] for malformed wiki HTML, layout, or
  ///   timestamps,
  /// - [`TransformError::Timeout`] / [`TransformError::Connectivity`] when the
  ///   site cannot be reached.
  pub async fn read(&self, locator: &PageLocator, options: &SourceOptions) -> Result<SourcePage, TransformError> {
    let path = locator.site_relative_path();
    debug!("Reading source page {locator}");

    let document = call_with_retry(&self.calls, &format!("read page {path}"), || self.api.get_page(&path))
      .await
      .map_err(|e| source_error(&locator.to_string(), e))?;

    let page = build_source_page(locator, document, options)?;
    debug!(
      "Read {} ({} sections, {} web parts)",
      locator,
      page.sections.len(),
      page.web_part_count()
    );
    Ok(page)
  }
}

/// Translate a failed source call about `subject` (a page or library URL)
/// into the pipeline taxonomy.
pub(crate) fn source_error(subject: &str, error: CallError) -> TransformError {
  match error {
    CallError::Timeout { operation, seconds } => TransformError::Timeout { operation, seconds },
    CallError::Site(SiteError::NotFound(_)) => TransformError::SourceNotFound(subject.to_string()),
    CallError::Site(SiteError::AccessDenied(_)) => TransformError::SourceAccessDenied(subject.to_string()),
    CallError::Site(SiteError::InvalidResponse(message)) => TransformError::parse(subject, message),
    CallError::Site(other) => TransformError::Connectivity(format!("{subject}: {other}")),
  }
}

/// Build a [`SourcePage`] from a fetched page document.
///
/// # Errors
/// Returns [`TransformError::SourceParseError`] when a column's wiki HTML is
/// malformed, a section's column widths exceed the 12-unit grid, or a
/// timestamp is not RFC 3339.
pub fn build_source_page(
  locator: &PageLocator,
  document: PageDocument,
  options: &SourceOptions,
) -> Result<SourcePage, TransformError> {
  let split_options = WikiSplitOptions {
    handle_media: options.handle_wiki_images_and_videos,
    table_list_images: options.add_table_list_image_as_image_web_part,
  };

  let mut sections = Vec::with_capacity(document.sections.len());
  let mut wiki_fragments = Vec::new();

  for (section_idx, section) in document.sections.into_iter().enumerate() {
    let total_width: u32 = section.columns.iter().map(|c| u32::from(c.width)).sum();
    if total_width > 12 {
      return Err(TransformError::parse(
        locator.to_string(),
        format!("section {section_idx} column widths add up to {total_width}, more than 12"),
      ));
    }

    let mut columns = Vec::with_capacity(section.columns.len());
    for (column_idx, column) in section.columns.into_iter().enumerate() {
      let mut embedded: Vec<WebPartInstance> = column
        .web_parts
        .into_iter()
        .map(|part| to_instance(part, options.add_table_list_image_as_image_web_part))
        .collect();

      let Some(html) = column.wiki_html else {
        columns.push(Column {
          width: column.width,
          web_parts: embedded,
        });
        continue;
      };

      let prefix = format!("wiki-{section_idx}-{column_idx}");
      let blocks = split_wiki_html(&html, &prefix, split_options).map_err(|message| {
        TransformError::parse(
          locator.to_string(),
          format!("section {section_idx} column {column_idx}: malformed wiki HTML: {message}"),
        )
      })?;

      let mut web_parts = Vec::with_capacity(blocks.len() + embedded.len());
      for block in blocks {
        match block {
          WikiBlock::Part(part) => web_parts.push(part),
          WikiBlock::EmbeddedWebPart(id) => match embedded.iter().position(|p| p.id == id) {
            Some(idx) => web_parts.push(embedded.remove(idx)),
            None => warn!("{locator}: wiki HTML references unknown web part {id}"),
          },
        }
      }
      // Embedded web parts the HTML does not reference keep their relative
      // order at the end of the column.
      web_parts.append(&mut embedded);

      wiki_fragments.push(WikiFragment {
        section: section_idx,
        column: column_idx,
        html,
      });
      columns.push(Column {
        width: column.width,
        web_parts,
      });
    }

    sections.push(Section { columns });
  }

  let metadata = PageMetadata {
    author: document.author,
    editor: document.editor,
    created: parse_timestamp(locator, "created", document.created.as_deref())?,
    modified: parse_timestamp(locator, "modified", document.modified.as_deref())?,
    fields: document.fields,
    permissions: document.permissions,
  };

  Ok(SourcePage {
    locator: locator.clone(),
    title: document.title,
    kind: document.kind,
    layout: document.layout,
    sections,
    wiki_fragments,
    metadata,
    is_home_page: document.is_home_page,
  })
}

fn to_instance(part: WebPartDocument, list_images: bool) -> WebPartInstance {
  let instance = WebPartInstance {
    id: part.id,
    web_part_type: part.web_part_type,
    title: part.title,
    properties: part.properties,
    hidden: part.hidden,
  };

  if list_images && renders_image(&instance) {
    return list_view_to_image(instance);
  }
  instance
}

/// A list view whose view renders a single image.
fn renders_image(part: &WebPartInstance) -> bool {
  LIST_VIEW_TYPES
    .iter()
    .any(|t| same_web_part_type(&part.web_part_type, t))
    && part.property_str("ImageUrl").is_some_and(|url| !url.trim().is_empty())
    && part
      .property_str("ViewType")
      .is_none_or(|view| view.eq_ignore_ascii_case("image"))
}

fn list_view_to_image(part: WebPartInstance) -> WebPartInstance {
  let mut image = WebPartInstance::new(part.id.clone(), IMAGE_WEB_PART);
  if let Some(url) = part.property_str("ImageUrl") {
    image = image.with_property("ImageUrl", url);
  }
  if !part.title.is_empty() {
    image = image.with_property("AlternativeText", part.title.as_str());
  }
  image.title = part.title;
  image.hidden = part.hidden;
  image
}

fn parse_timestamp(locator: &PageLocator, field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, TransformError> {
  value
    .map(|raw| {
      DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TransformError::parse(locator.to_string(), format!("invalid {field} timestamp '{raw}': {e}")))
    })
    .transpose()
}
