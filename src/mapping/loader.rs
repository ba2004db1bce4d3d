//! Loading mapping definitions from files.
//!
//! Web-part and layout mappings come from an XML document:
//!
//! ```xml
//! <WebPartMappings unmapped="placeholder">
//!   <Mapping source="ContentEditorWebPart" target="Text">
//!     <Property action="rename" from="Content" to="text"/>
//!     <Property action="rewrite-links" name="text"/>
//!   </Mapping>
//!   <LayoutMapping source="WikiTwoColumns" target="Article"/>
//! </WebPartMappings>
//! ```
//!
//! User and URL mappings are `source,target` lines.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::{debug, info};

use super::{MappingRuleSet, PropertyRule, PropertyTransformer, UnmappedPolicy, UrlMapping, WebPartMapping};
use crate::error::TransformError;

/// Where the mapping definitions of a run come from. `None` means "use the
/// built-in table for that part".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSources {
  pub web_part_mapping_file: Option<PathBuf>,
  pub user_mapping_file: Option<PathBuf>,
  pub url_mapping_file: Option<PathBuf>,
}

impl MappingSources {
  /// Build the rule set: the built-in table with every configured file merged
  /// over it.
  ///
  /// # Errors
  /// Returns [`TransformError::MappingLoadError`] when a file cannot be read or
  /// contains a malformed entry.
  pub fn load(&self) -> Result<MappingRuleSet, TransformError> {
    let mut rules = MappingRuleSet::builtin();

    if let Some(path) = &self.web_part_mapping_file {
      let text = read_definition(path)?;
      let overlay = parse_web_part_mapping(&text, &path.display().to_string())?;
      info!(
        "Loaded {} web part and {} layout mappings from {}",
        overlay.web_part_mapping_count(),
        overlay.layout_mapping_count(),
        path.display()
      );
      rules.merge(overlay);
    }

    if let Some(path) = &self.user_mapping_file {
      let text = read_definition(path)?;
      let pairs = parse_pair_mapping(&text, &path.display().to_string())?;
      info!("Loaded {} user mappings from {}", pairs.len(), path.display());
      for (source, target) in pairs {
        rules.add_user_mapping(&source, target);
      }
    }

    if let Some(path) = &self.url_mapping_file {
      let text = read_definition(path)?;
      let pairs = parse_pair_mapping(&text, &path.display().to_string())?;
      info!("Loaded {} URL mappings from {}", pairs.len(), path.display());
      for (source, target) in pairs {
        rules.add_url_mapping(UrlMapping::new(source, target));
      }
    }

    Ok(rules)
  }
}

fn read_definition(path: &Path) -> Result<String, TransformError> {
  debug!("Reading mapping definition {}", path.display());
  fs::read_to_string(path).map_err(|e| TransformError::mapping(path.display().to_string(), e.to_string()))
}

/// Parse an XML web-part/layout mapping document.
///
/// # Arguments
/// * `xml` - Document text.
/// * `origin` - Name used in error messages (usually the file path).
///
/// # Errors
/// Returns [`TransformError::MappingLoadError`] on XML syntax errors, missing
/// attributes, unknown property actions, or an unknown `unmapped` value.
pub fn parse_web_part_mapping(xml: &str, origin: &str) -> Result<MappingRuleSet, TransformError> {
  let document = Document::parse(xml).map_err(|e| TransformError::mapping(origin, format!("XML syntax error: {e}")))?;
  let root = document.root_element();

  if !root.has_tag_name("WebPartMappings") {
    return Err(TransformError::mapping(
      origin,
      format!("expected <WebPartMappings> root element, found <{}>", root.tag_name().name()),
    ));
  }

  let mut rules = MappingRuleSet::empty();
  if let Some(value) = root.attribute("unmapped") {
    let policy = UnmappedPolicy::parse(value)
      .ok_or_else(|| TransformError::mapping(origin, format!("unknown unmapped policy '{value}'")))?;
    rules.set_unmapped_policy(policy);
  }

  for child in root.children().filter(Node::is_element) {
    match child.tag_name().name() {
      "Mapping" => {
        let source = required_attr(&child, "source", origin)?;
        let target = required_attr(&child, "target", origin)?;
        let transformer = parse_property_rules(&child, origin)?;
        rules.add_web_part_mapping(source, WebPartMapping::new(target, transformer));
      }
      "LayoutMapping" => {
        let source = required_attr(&child, "source", origin)?;
        let target = required_attr(&child, "target", origin)?;
        rules.add_layout_mapping(source, target);
      }
      other => {
        return Err(TransformError::mapping(
          origin,
          format!("unexpected element <{other}> at {}", position(&child)),
        ));
      }
    }
  }

  Ok(rules)
}

fn parse_property_rules(mapping: &Node, origin: &str) -> Result<PropertyTransformer, TransformError> {
  let mut property_rules = Vec::new();

  for node in mapping.children().filter(Node::is_element) {
    if !node.has_tag_name("Property") {
      return Err(TransformError::mapping(
        origin,
        format!("unexpected element <{}> at {}", node.tag_name().name(), position(&node)),
      ));
    }

    let action = required_attr(&node, "action", origin)?;
    let attr = |name: &str| required_attr(&node, name, origin).map(str::to_string);

    let rule = match action {
      "rename" => PropertyRule::Rename {
        from: attr("from")?,
        to: attr("to")?,
      },
      "copy" => PropertyRule::Copy {
        from: attr("from")?,
        to: attr("to")?,
      },
      "remove" => PropertyRule::Remove { name: attr("name")? },
      "set" => PropertyRule::Set {
        name: attr("name")?,
        value: node.attribute("value").unwrap_or_default().to_string(),
      },
      "rewrite-url" => PropertyRule::RewriteUrl { name: attr("name")? },
      "rewrite-links" => PropertyRule::RewriteLinks { name: attr("name")? },
      "map-user" => PropertyRule::MapUser { name: attr("name")? },
      other => {
        return Err(TransformError::mapping(
          origin,
          format!("unknown property action '{other}' at {}", position(&node)),
        ));
      }
    };
    property_rules.push(rule);
  }

  if property_rules.is_empty() {
    Ok(PropertyTransformer::PassThrough)
  } else {
    Ok(PropertyTransformer::Rules(property_rules))
  }
}

fn required_attr<'a>(node: &Node<'a, '_>, name: &str, origin: &str) -> Result<&'a str, TransformError> {
  node
    .attribute(name)
    .filter(|value| !value.trim().is_empty())
    .ok_or_else(|| {
      TransformError::mapping(
        origin,
        format!(
          "<{}> at {} is missing attribute '{name}'",
          node.tag_name().name(),
          position(node)
        ),
      )
    })
}

fn position(node: &Node) -> String {
  let pos = node.document().text_pos_at(node.range().start);
  format!("line {}", pos.row)
}

/// Parse `source,target` lines. Blank lines and lines starting with `#` are
/// ignored.
///
/// # Errors
/// Returns [`TransformError::MappingLoadError`] naming the first line that
/// does not hold exactly two non-empty fields.
pub fn parse_pair_mapping(text: &str, origin: &str) -> Result<Vec<(String, String)>, TransformError> {
  let mut pairs = Vec::new();

  for (idx, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    match fields.as_slice() {
      [source, target] if !source.is_empty() && !target.is_empty() => {
        pairs.push((source.to_string(), target.to_string()));
      }
      _ => {
        return Err(TransformError::mapping(
          origin,
          format!("line {}: expected 'source,target', found '{line}'", idx + 1),
        ));
      }
    }
  }

  Ok(pairs)
}
