//! Property transformers that translate a source web part's property bag into
//! the target vocabulary.

use std::collections::BTreeMap;

use serde_json::Value;

use super::MappingRuleSet;
use crate::model::PropertyBag;

/// One edit applied to a property bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyRule {
  /// Move `from` to `to`.
  Rename { from: String, to: String },
  /// Duplicate `from` into `to`.
  Copy { from: String, to: String },
  /// Drop `name`.
  Remove { name: String },
  /// Set `name` to `value` after expanding `{Key}` placeholders.
  Set { name: String, value: String },
  /// Rewrite the URL held by `name`.
  RewriteUrl { name: String },
  /// Rewrite every `href`/`src` inside the HTML held by `name`.
  RewriteLinks { name: String },
  /// Translate the user identity (or list of identities) held by `name`.
  MapUser { name: String },
}

/// How the property bag of a mapped web part is produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyTransformer {
  /// Keep every property unchanged.
  #[default]
  PassThrough,
  /// Apply the rules, in order, to a copy of the source properties.
  Rules(Vec<PropertyRule>),
}

/// Inputs a transformer may consult besides the property bag itself.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
  pub rules: &'a MappingRuleSet,
  /// Translate embedded identities.
  pub map_users: bool,
  /// Rewrite embedded URLs.
  pub rewrite_urls: bool,
  /// Extra placeholder values for `Set` rules.
  pub mapping_properties: &'a BTreeMap<String, String>,
}

impl PropertyTransformer {
  /// Produce the target property bag.
  pub fn apply(&self, source: &PropertyBag, ctx: &RewriteContext<'_>) -> PropertyBag {
    let mut properties = source.clone();

    let PropertyTransformer::Rules(rules) = self else {
      return properties;
    };

    for rule in rules {
      match rule {
        PropertyRule::Rename { from, to } => {
          if let Some(value) = properties.shift_remove(from) {
            properties.insert(to.clone(), value);
          }
        }
        PropertyRule::Copy { from, to } => {
          if let Some(value) = properties.get(from).cloned() {
            properties.insert(to.clone(), value);
          }
        }
        PropertyRule::Remove { name } => {
          properties.shift_remove(name);
        }
        PropertyRule::Set { name, value } => {
          let expanded = expand_placeholders(value, source, ctx.mapping_properties);
          properties.insert(name.clone(), Value::String(expanded));
        }
        PropertyRule::RewriteUrl { name } => {
          if let Some(Value::String(url)) = properties.get_mut(name) {
            *url = ctx.rules.rewrite_url(url, ctx.rewrite_urls);
          }
        }
        PropertyRule::RewriteLinks { name } => {
          if ctx.rewrite_urls
            && let Some(Value::String(html)) = properties.get_mut(name)
          {
            *html = rewrite_html_links(html, |url| ctx.rules.rewrite_url(url, true));
          }
        }
        PropertyRule::MapUser { name } => match properties.get_mut(name) {
          Some(Value::String(login)) => *login = ctx.rules.map_user(login, ctx.map_users),
          Some(Value::Array(items)) => {
            for item in items.iter_mut() {
              if let Value::String(login) = item {
                *login = ctx.rules.map_user(login, ctx.map_users);
              }
            }
          }
          _ => {}
        },
      }
    }

    properties
  }
}

/// Expand `{Key}` placeholders from the source properties first, then from the
/// mapping properties. Unknown placeholders are left as written.
fn expand_placeholders(template: &str, source: &PropertyBag, mapping_properties: &BTreeMap<String, String>) -> String {
  let mut result = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(start) = rest.find('{') {
    result.push_str(&rest[..start]);
    let after = &rest[start + 1..];

    let Some(end) = after.find('}') else {
      result.push_str(&rest[start..]);
      return result;
    };

    let key = &after[..end];
    let replacement = match source.get(key) {
      Some(Value::String(s)) => Some(s.clone()),
      Some(Value::Null) | None => mapping_properties.get(key).cloned(),
      Some(other) => Some(other.to_string()),
    };

    match replacement {
      Some(value) => result.push_str(&value),
      None => {
        result.push('{');
        result.push_str(key);
        result.push('}');
      }
    }

    rest = &after[end + 1..];
  }

  result.push_str(rest);
  result
}

/// Rewrite the values of `href` and `src` attributes in an HTML fragment.
pub fn rewrite_html_links(html: &str, rewrite: impl Fn(&str) -> String) -> String {
  let mut result = String::with_capacity(html.len());
  let mut rest = html;

  loop {
    let next = ["href=", "src="]
      .iter()
      .filter_map(|attr| find_ignore_case(rest, attr).map(|idx| (idx, attr.len())))
      .min_by_key(|(idx, _)| *idx);

    let Some((idx, attr_len)) = next else {
      result.push_str(rest);
      return result;
    };

    let value_start = idx + attr_len;
    result.push_str(&rest[..value_start]);
    let after = &rest[value_start..];

    let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
      rest = after;
      continue;
    };

    let inner = &after[1..];
    let Some(end) = inner.find(quote) else {
      result.push_str(after);
      return result;
    };

    result.push(quote);
    result.push_str(&rewrite(&inner[..end]));
    result.push(quote);
    rest = &inner[end + 1..];
  }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
  haystack
    .char_indices()
    .map(|(idx, _)| idx)
    .find(|&idx| {
      haystack
        .get(idx..idx + needle.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(needle))
    })
}
