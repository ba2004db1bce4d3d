//! XML serialisation of provisioning templates.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use roxmltree::{Document, Node};

use super::connector::FileSystemConnector;
use super::{ContentType, ListInstance, ProvisioningTemplate, TemplateFile};

const TEMPLATE_VERSION: &str = "1.0";

/// Stores provisioning templates as XML documents in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlFileSystemTemplateProvider {
  connector: FileSystemConnector,
}

impl XmlFileSystemTemplateProvider {
  pub fn new(root: impl Into<PathBuf>, container: impl Into<String>) -> Self {
    Self {
      connector: FileSystemConnector::new(root, container),
    }
  }

  /// Serialise `template` and write it as `file_name`.
  ///
  /// # Returns
  /// Path of the written document.
  pub fn save_as(&self, template: &ProvisioningTemplate, file_name: &str) -> Result<PathBuf> {
    let xml = to_xml(template);
    self
      .connector
      .save_file(file_name, xml.as_bytes())
      .with_context(|| format!("Failed to save template {file_name}"))
  }

  /// Read a template written by [`save_as`](Self::save_as).
  pub fn load(&self, file_name: &str) -> Result<ProvisioningTemplate> {
    let bytes = self.connector.read_file(file_name)?;
    let text = String::from_utf8(bytes).with_context(|| format!("Template {file_name} is not UTF-8"))?;
    from_xml(&text).with_context(|| format!("Failed to parse template {file_name}"))
  }
}

/// Render a template as an XML document.
pub fn to_xml(template: &ProvisioningTemplate) -> String {
  let mut xml = String::new();
  xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
  let _ = writeln!(
    xml,
    "<ProvisioningTemplate Version=\"{TEMPLATE_VERSION}\" SiteTitle=\"{}\">",
    escape(&template.site_title)
  );

  if template.lists.is_empty() {
    xml.push_str("  <Lists/>\n");
  } else {
    xml.push_str("  <Lists>\n");
    for list in &template.lists {
      let _ = write!(
        xml,
        "    <ListInstance Title=\"{}\" TemplateType=\"{}\" Url=\"{}\"",
        escape(&list.title),
        list.template_type,
        escape(&list.url)
      );
      if list.content_type_bindings.is_empty() {
        xml.push_str("/>\n");
      } else {
        xml.push_str(">\n");
        for binding in &list.content_type_bindings {
          let _ = writeln!(xml, "      <ContentTypeBinding ContentTypeID=\"{}\"/>", escape(binding));
        }
        xml.push_str("    </ListInstance>\n");
      }
    }
    xml.push_str("  </Lists>\n");
  }

  if template.content_types.is_empty() {
    xml.push_str("  <ContentTypes/>\n");
  } else {
    xml.push_str("  <ContentTypes>\n");
    for content_type in &template.content_types {
      let _ = write!(
        xml,
        "    <ContentType ID=\"{}\" Name=\"{}\" Group=\"{}\"",
        escape(&content_type.id),
        escape(&content_type.name),
        escape(&content_type.group)
      );
      if content_type.field_refs.is_empty() {
        xml.push_str("/>\n");
      } else {
        xml.push_str(">\n");
        for field in &content_type.field_refs {
          let _ = writeln!(xml, "      <FieldRef Name=\"{}\"/>", escape(field));
        }
        xml.push_str("    </ContentType>\n");
      }
    }
    xml.push_str("  </ContentTypes>\n");
  }

  if template.files.is_empty() {
    xml.push_str("  <Files/>\n");
  } else {
    xml.push_str("  <Files>\n");
    for file in &template.files {
      let _ = writeln!(
        xml,
        "    <File Src=\"{}\" Branding=\"{}\" Persisted=\"{}\"/>",
        escape(&file.src),
        file.branding,
        file.persisted
      );
    }
    xml.push_str("  </Files>\n");
  }

  xml.push_str("</ProvisioningTemplate>\n");
  xml
}

/// Parse a document produced by [`to_xml`].
pub fn from_xml(xml: &str) -> Result<ProvisioningTemplate> {
  let document = Document::parse(xml).context("Invalid template XML")?;
  let root = document.root_element();
  if !root.has_tag_name("ProvisioningTemplate") {
    bail!("Expected <ProvisioningTemplate> root, found <{}>", root.tag_name().name());
  }

  let mut template = ProvisioningTemplate {
    site_title: root.attribute("SiteTitle").unwrap_or_default().to_string(),
    ..Default::default()
  };

  for node in children(root, "Lists").flat_map(|lists| children(lists, "ListInstance")) {
    template.lists.push(ListInstance {
      title: attr(node, "Title")?.to_string(),
      template_type: attr(node, "TemplateType")?
        .parse()
        .with_context(|| format!("Invalid TemplateType on list {}", attr(node, "Title").unwrap_or_default()))?,
      url: attr(node, "Url")?.to_string(),
      content_type_bindings: children(node, "ContentTypeBinding")
        .map(|binding| attr(binding, "ContentTypeID").map(str::to_string))
        .collect::<Result<_>>()?,
    });
  }

  for node in children(root, "ContentTypes").flat_map(|types| children(types, "ContentType")) {
    template.content_types.push(ContentType {
      id: attr(node, "ID")?.to_string(),
      name: attr(node, "Name")?.to_string(),
      group: node.attribute("Group").unwrap_or_default().to_string(),
      field_refs: children(node, "FieldRef")
        .map(|field| attr(field, "Name").map(str::to_string))
        .collect::<Result<_>>()?,
    });
  }

  for node in children(root, "Files").flat_map(|files| children(files, "File")) {
    template.files.push(TemplateFile {
      src: attr(node, "Src")?.to_string(),
      branding: node.attribute("Branding") == Some("true"),
      persisted: node.attribute("Persisted") == Some("true"),
    });
  }

  Ok(template)
}

fn children<'a, 'input: 'a>(node: Node<'a, 'input>, name: &'static str) -> impl Iterator<Item = Node<'a, 'input>> {
  node.children().filter(move |child| child.has_tag_name(name))
}

fn attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
  node
    .attribute(name)
    .with_context(|| format!("<{}> is missing attribute {name}", node.tag_name().name()))
}

fn escape(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&apos;"),
      _ => escaped.push(c),
    }
  }
  escaped
}
