//! Normalisation of wiki HTML before XML parsing.
//!
//! `roxmltree` only accepts well-formed XML: it knows the five predefined
//! entities and requires every element to be closed. Wiki HTML uses named
//! HTML entities and unclosed void elements (`<br>`, `<img ...>`), so both are
//! rewritten here. Anything still malformed afterwards (e.g. an unclosed
//! `<div>`) is a genuine parse error.

/// Void elements that never have a closing tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Entities XML defines itself; `roxmltree` resolves these.
const XML_ENTITIES: &[&str] = &["lt", "gt", "amp", "quot", "apos"];

/// Longest entity reference considered (`&CounterClockwiseContourIntegral;`).
const MAX_REFERENCE_LEN: usize = 34;

/// Resolve HTML named entities so the fragment parses as XML.
///
/// Named references are decoded through the full HTML entity table. Numeric
/// references and the five XML entities are kept as they are. Decoded
/// characters that are significant to XML are written back as numeric
/// references. Unknown references and bare `&` are escaped, which is how a
/// browser displays them.
///
/// # Arguments
/// * `text` - Raw wiki HTML that may contain HTML entities.
///
/// # Returns
/// A `String` in which every `&` starts a reference `roxmltree` understands.
pub fn preprocess_html_entities(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(start) = rest.find('&') {
    result.push_str(&rest[..start]);
    let candidate = &rest[start..];

    match reference_len(candidate) {
      Some(len) => {
        push_reference(&mut result, &candidate[..len]);
        rest = &candidate[len..];
      }
      None => {
        result.push_str("&amp;");
        rest = &candidate[1..];
      }
    }
  }

  result.push_str(rest);
  result
}

/// Length of the `&...;` reference at the start of `text`, if well formed.
fn reference_len(text: &str) -> Option<usize> {
  let end = text.char_indices().take(MAX_REFERENCE_LEN + 1).find(|(_, c)| *c == ';')?.0;
  let body = &text[1..end];

  let valid = match body.strip_prefix('#') {
    Some(number) => match number.strip_prefix(['x', 'X']) {
      Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
      None => !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()),
    },
    None => {
      body.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) && body.chars().all(|c| c.is_ascii_alphanumeric())
    }
  };
  valid.then_some(end + 1)
}

fn push_reference(out: &mut String, reference: &str) {
  let name = &reference[1..reference.len() - 1];
  if name.starts_with('#') || XML_ENTITIES.contains(&name) {
    out.push_str(reference);
    return;
  }

  let decoded = html_escape::decode_html_entities(reference);
  if decoded.as_ref() == reference {
    out.push_str("&amp;");
    out.push_str(&reference[1..]);
    return;
  }

  for c in decoded.chars() {
    match c {
      '<' | '&' | '"' | '\'' => out.push_str(&format!("&#{};", u32::from(c))),
      c => out.push(c),
    }
  }
}

/// Self-close void elements written in HTML style (`<br>` becomes `<br/>`).
pub fn close_void_elements(html: &str) -> String {
  let mut result = String::with_capacity(html.len() + 16);
  let mut rest = html;

  while let Some(start) = rest.find('<') {
    result.push_str(&rest[..start]);
    let tag = &rest[start..];

    let Some(end) = find_tag_end(tag) else {
      result.push_str(tag);
      return result;
    };

    let inner = &tag[1..end];
    let name: String = inner
      .chars()
      .take_while(|c| c.is_ascii_alphanumeric())
      .collect::<String>()
      .to_ascii_lowercase();

    let is_void = VOID_ELEMENTS.contains(&name.as_str());
    if is_void && !inner.trim_end().ends_with('/') {
      result.push('<');
      result.push_str(inner.trim_end());
      result.push_str("/>");
    } else if is_void || !is_void_close(inner) {
      result.push_str(&tag[..=end]);
    }
    // Stray `</br>` closers fall through and are dropped.

    rest = &tag[end + 1..];
  }

  result.push_str(rest);
  result
}

fn is_void_close(inner: &str) -> bool {
  if !inner.starts_with('/') {
    return false;
  }
  let name = inner.trim_start_matches('/').trim().to_ascii_lowercase();
  VOID_ELEMENTS.contains(&name.as_str())
}

/// Index of the `>` closing the tag that starts at `tag[0]`, skipping quoted
/// attribute values.
fn find_tag_end(tag: &str) -> Option<usize> {
  let mut quote: Option<char> = None;
  for (idx, c) in tag.char_indices().skip(1) {
    match (quote, c) {
      (Some(q), c) if c == q => quote = None,
      (Some(_), _) => {}
      (None, '"' | '\'') => quote = Some(c),
      (None, '>') => return Some(idx),
      _ => {}
    }
  }
  None
}

/// Prepare a wiki HTML fragment for XML parsing: entities are replaced, void
/// elements closed, and the fragment wrapped in a single root element.
pub fn to_parseable(html: &str) -> String {
  format!("<div>{}</div>", close_void_elements(&preprocess_html_entities(html)))
}
