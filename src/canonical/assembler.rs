//! Composition of the extractors into one canonical result.

use super::anchor::TextIndex;
use super::entities::extract_entities;
use super::fields::extract_fields;
use super::tables::extract_tables;
use super::types::{CanonicalResult, InvalidAnchorError, RawDocument};

/// Build the canonical projection of a raw document.
///
/// Either every anchor resolves and the full result is returned, or the first invalid anchor
/// aborts assembly and nothing partial escapes.
pub fn assemble(raw: &RawDocument) -> Result<CanonicalResult, InvalidAnchorError> {
    let index = TextIndex::new(&raw.full_text);
    let entities = extract_entities(&index, &raw.entities)?;
    let fields = extract_fields(&index, &raw.pages)?;
    let tables = extract_tables(&index, &raw.pages)?;

    tracing::debug!(
        pages = raw.pages.len(),
        text_chars = index.char_len(),
        entities = entities.len(),
        fields = fields.len(),
        tables = tables.len(),
        "Assembled canonical document"
    );

    Ok(CanonicalResult {
        text: raw.full_text.clone(),
        entities,
        fields,
        tables,
    })
}
