//! Projection of per-page key/value pairs.

use super::anchor::TextIndex;
use super::types::{CanonicalField, InvalidAnchorError, RawPage};

/// Resolve every form field, page by page, keeping repeated labels as distinct entries.
pub fn extract_fields(
    index: &TextIndex<'_>,
    pages: &[RawPage],
) -> Result<Vec<CanonicalField>, InvalidAnchorError> {
    pages
        .iter()
        .flat_map(|page| &page.form_fields)
        .map(|field| -> Result<CanonicalField, InvalidAnchorError> {
            Ok(CanonicalField {
                name: index.resolve(field.field_name_anchor.as_ref())?,
                value: index.resolve(field.field_value_anchor.as_ref())?,
            })
        })
        .collect()
}
