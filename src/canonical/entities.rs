//! Projection of document-level entities.

use super::anchor::TextIndex;
use super::types::{CanonicalEntity, InvalidAnchorError, RawEntity};

/// Project entities one-to-one, preserving order and confidence.
///
/// The mention anchor wins when present. Otherwise the provider's literal mention text is used,
/// and an entity with neither gets an empty mention.
pub fn extract_entities(
    index: &TextIndex<'_>,
    entities: &[RawEntity],
) -> Result<Vec<CanonicalEntity>, InvalidAnchorError> {
    entities
        .iter()
        .map(|entity| -> Result<CanonicalEntity, InvalidAnchorError> {
            let mention_text = match index.resolve(entity.mention_anchor.as_ref())? {
                Some(text) => text,
                None => entity.mention_text.clone().unwrap_or_default(),
            };
            Ok(CanonicalEntity {
                entity_type: entity.entity_type.clone(),
                mention_text,
                confidence: entity.confidence,
            })
        })
        .collect()
}
