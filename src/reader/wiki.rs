//! Splitting wiki HTML into explicit blocks.
//!
//! A wiki column is free-form HTML. The reader turns it into an ordered list
//! of blocks so the engine only ever sees web parts:
//! - runs of text become `WikiText` web parts,
//! - inline images and videos become `WikiImage` / `WikiVideo` web parts when
//!   media handling is enabled,
//! - elements carrying `data-webpart-id` mark where an embedded web part of the
//!   column sits.

use roxmltree::{Document, Node};

use super::html::to_parseable;
use crate::model::WebPartInstance;

pub const WIKI_TEXT: &str = "WikiText";
pub const WIKI_IMAGE: &str = "WikiImage";
pub const WIKI_VIDEO: &str = "WikiVideo";

/// Attribute marking the position of an embedded web part.
const WEB_PART_ID_ATTR: &str = "data-webpart-id";

/// One block of a wiki column, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum WikiBlock {
  /// A web part derived from the HTML itself.
  Part(WebPartInstance),
  /// Position of the embedded web part with this id.
  EmbeddedWebPart(String),
}

/// Switches for wiki splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiSplitOptions {
  /// Emit inline images and videos as separate media web parts.
  pub handle_media: bool,
  /// Additionally emit images found inside tables and lists as image web
  /// parts (the table or list itself stays in the text).
  pub table_list_images: bool,
}

/// Split a wiki HTML fragment into blocks.
///
/// # Arguments
/// * `html` - Raw wiki HTML of one column.
/// * `id_prefix` - Prefix for ids of generated web parts.
/// * `options` - Media handling switches.
///
/// # Errors
/// Returns the parser message when the HTML is not well formed.
pub fn split_wiki_html(html: &str, id_prefix: &str, options: WikiSplitOptions) -> Result<Vec<WikiBlock>, String> {
  let xml = to_parseable(html);
  let document = Document::parse(&xml).map_err(|e| e.to_string())?;

  let mut splitter = Splitter {
    xml: &xml,
    id_prefix,
    options,
    blocks: Vec::new(),
    text: String::new(),
    counter: 0,
  };

  for child in document.root_element().children() {
    splitter.visit(child);
  }
  splitter.flush_text();

  Ok(splitter.blocks)
}

struct Splitter<'a> {
  xml: &'a str,
  id_prefix: &'a str,
  options: WikiSplitOptions,
  blocks: Vec<WikiBlock>,
  text: String,
  counter: usize,
}

impl Splitter<'_> {
  fn visit(&mut self, node: Node) {
    if node.is_text() {
      self.text.push_str(&self.xml[node.range()]);
      return;
    }
    if !node.is_element() {
      return;
    }

    if let Some(id) = node.attribute(WEB_PART_ID_ATTR) {
      self.flush_text();
      self.blocks.push(WikiBlock::EmbeddedWebPart(id.to_string()));
      return;
    }

    // Containers holding a web-part marker are unwrapped so the content
    // around the marker keeps its place.
    if node
      .descendants()
      .skip(1)
      .any(|n| n.attribute(WEB_PART_ID_ATTR).is_some())
    {
      for child in node.children() {
        self.visit(child);
      }
      return;
    }

    if self.options.handle_media
      && let Some(part) = self.media_part(node)
    {
      self.flush_text();
      self.blocks.push(WikiBlock::Part(part));
      return;
    }

    let name = node.tag_name().name().to_ascii_lowercase();
    if matches!(name.as_str(), "table" | "ul" | "ol") {
      self.text.push_str(&self.xml[node.range()]);
      if self.options.table_list_images {
        let images: Vec<WebPartInstance> = node
          .descendants()
          .filter(|n| n.has_tag_name("img"))
          .filter_map(|n| self.media_part(n))
          .collect();
        if !images.is_empty() {
          self.flush_text();
          self.blocks.extend(images.into_iter().map(WikiBlock::Part));
        }
      }
      return;
    }

    if self.options.handle_media {
      let media: Vec<Node> = node
        .descendants()
        .skip(1)
        .filter(|n| is_media_element(n))
        .collect();
      if !media.is_empty() {
        self.push_without(node, &media);
        self.flush_text();
        let parts: Vec<WebPartInstance> = media.iter().filter_map(|n| self.media_part(*n)).collect();
        self.blocks.extend(parts.into_iter().map(WikiBlock::Part));
        return;
      }
    }

    self.text.push_str(&self.xml[node.range()]);
  }

  /// Append the markup of `node` with the `cut` descendants removed.
  fn push_without(&mut self, node: Node, cut: &[Node]) {
    let range = node.range();
    let mut position = range.start;
    for child in cut {
      let child_range = child.range();
      if child_range.start < position {
        continue;
      }
      self.text.push_str(&self.xml[position..child_range.start]);
      position = child_range.end;
    }
    self.text.push_str(&self.xml[position..range.end]);
  }

  fn media_part(&mut self, node: Node) -> Option<WebPartInstance> {
    let src = node.attribute("src").filter(|s| !s.trim().is_empty())?;
    let part = match node.tag_name().name().to_ascii_lowercase().as_str() {
      "img" => {
        let mut part = WebPartInstance::new(self.next_id(), WIKI_IMAGE).with_property("ImageUrl", src);
        if let Some(alt) = node.attribute("alt") {
          part = part.with_property("AlternativeText", alt);
        }
        part
      }
      "iframe" | "video" | "embed" => WebPartInstance::new(self.next_id(), WIKI_VIDEO).with_property("VideoUrl", src),
      _ => return None,
    };
    Some(part)
  }

  fn flush_text(&mut self) {
    if self.text.trim().is_empty() {
      self.text.clear();
      return;
    }

    let html = std::mem::take(&mut self.text);
    let part = WebPartInstance::new(self.next_id(), WIKI_TEXT).with_property("Text", html.trim().to_string());
    self.blocks.push(WikiBlock::Part(part));
  }

  fn next_id(&mut self) -> String {
    self.counter += 1;
    format!("{}-{}", self.id_prefix, self.counter)
  }
}

fn is_media_element(node: &Node) -> bool {
  node.is_element()
    && matches!(
      node.tag_name().name().to_ascii_lowercase().as_str(),
      "img" | "iframe" | "video" | "embed"
    )
    && node.attribute("src").is_some_and(|s| !s.trim().is_empty())
}
