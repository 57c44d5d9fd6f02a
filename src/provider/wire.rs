//! Document AI wire format and its conversion into the internal raw model.
//!
//! Only the parts of the REST `Document` resource the canonical layer reads are modeled. The
//! service encodes `int64` offsets as JSON strings, omits `startIndex` when it is zero, and
//! omits repeated fields when they are empty, so every field here is defaulted.

use crate::canonical::{
    RawCell, RawDocument, RawEntity, RawFormField, RawPage, RawRow, RawTable, TextAnchor,
    TextSpan,
};
use crate::provider::ProviderError;
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

#[derive(Deserialize)]
pub(crate) struct ProcessResponse {
    pub(crate) document: WireDocument,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireDocument {
    #[serde(default)]
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) pages: Vec<WirePage>,
    #[serde(default)]
    pub(crate) entities: Vec<WireEntity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePage {
    #[serde(default)]
    pub(crate) form_fields: Vec<WireFormField>,
    #[serde(default)]
    pub(crate) tables: Vec<WireTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireFormField {
    #[serde(default)]
    pub(crate) field_name: Option<WireLayout>,
    #[serde(default)]
    pub(crate) field_value: Option<WireLayout>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTable {
    #[serde(default)]
    pub(crate) header_rows: Vec<WireRow>,
    #[serde(default)]
    pub(crate) body_rows: Vec<WireRow>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireRow {
    #[serde(default)]
    pub(crate) cells: Vec<WireCell>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireCell {
    #[serde(default)]
    pub(crate) layout: Option<WireLayout>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireLayout {
    #[serde(default)]
    pub(crate) text_anchor: Option<WireTextAnchor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTextAnchor {
    #[serde(default)]
    pub(crate) text_segments: Vec<WireTextSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTextSegment {
    #[serde(default, deserialize_with = "deserialize_int64")]
    pub(crate) start_index: i64,
    #[serde(default, deserialize_with = "deserialize_int64")]
    pub(crate) end_index: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireEntity {
    #[serde(default, rename = "type")]
    pub(crate) entity_type: String,
    #[serde(default)]
    pub(crate) mention_text: Option<String>,
    #[serde(default)]
    pub(crate) confidence: f32,
    #[serde(default)]
    pub(crate) text_anchor: Option<WireTextAnchor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Int64 {
    Number(i64),
    Text(String),
}

fn deserialize_int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Int64::deserialize(deserializer)? {
        Int64::Number(value) => Ok(value),
        Int64::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid int64 offset '{text}'"))),
    }
}

/// Decode a saved `ProcessResponse` (or a bare `Document`) into the raw model.
///
/// A top-level `document` key marks the envelope form; its value must decode as a document.
pub fn decode_document(bytes: &[u8]) -> Result<RawDocument, ProviderError> {
    let mut saved: Value = serde_json::from_slice(bytes).map_err(malformed)?;
    let document = match saved
        .as_object_mut()
        .and_then(|object| object.remove("document"))
    {
        Some(document) => document,
        None => saved,
    };
    let document: WireDocument = serde_json::from_value(document).map_err(malformed)?;
    Ok(document.into())
}

fn malformed(error: serde_json::Error) -> ProviderError {
    ProviderError::MalformedResponse(error.to_string())
}

impl From<WireDocument> for RawDocument {
    fn from(document: WireDocument) -> Self {
        Self {
            full_text: document.text,
            pages: document.pages.into_iter().map(RawPage::from).collect(),
            entities: document.entities.into_iter().map(RawEntity::from).collect(),
        }
    }
}

impl From<WirePage> for RawPage {
    fn from(page: WirePage) -> Self {
        Self {
            form_fields: page
                .form_fields
                .into_iter()
                .map(|field| RawFormField {
                    field_name_anchor: layout_anchor(field.field_name),
                    field_value_anchor: layout_anchor(field.field_value),
                })
                .collect(),
            tables: page
                .tables
                .into_iter()
                .map(|table| RawTable {
                    header_rows: convert_rows(table.header_rows),
                    body_rows: convert_rows(table.body_rows),
                })
                .collect(),
        }
    }
}

impl From<WireEntity> for RawEntity {
    fn from(entity: WireEntity) -> Self {
        Self {
            entity_type: entity.entity_type,
            mention_anchor: entity.text_anchor.map(TextAnchor::from),
            mention_text: entity.mention_text,
            confidence: entity.confidence,
        }
    }
}

impl From<WireTextAnchor> for TextAnchor {
    fn from(anchor: WireTextAnchor) -> Self {
        Self {
            spans: anchor
                .text_segments
                .into_iter()
                .map(|segment| TextSpan::new(segment.start_index, segment.end_index))
                .collect(),
        }
    }
}

fn layout_anchor(layout: Option<WireLayout>) -> Option<TextAnchor> {
    layout
        .and_then(|layout| layout.text_anchor)
        .map(TextAnchor::from)
}

fn convert_rows(rows: Vec<WireRow>) -> Vec<RawRow> {
    rows.into_iter()
        .map(|row| RawRow {
            cells: row
                .cells
                .into_iter()
                .map(|cell| RawCell {
                    layout_anchor: layout_anchor(cell.layout),
                })
                .collect(),
        })
        .collect()
}
