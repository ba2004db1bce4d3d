//! Section and column cleanup.

use crate::model::Section;

/// Drop every column without web parts, then every section left without
/// columns. Survivors keep their relative order, and applying this twice is
/// the same as applying it once.
pub fn remove_empty_sections_and_columns(sections: &mut Vec<Section>) {
  for section in sections.iter_mut() {
    section.columns.retain(|column| !column.is_empty());
  }
  sections.retain(|section| !section.is_empty());
}
