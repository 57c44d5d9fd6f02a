//! Raw provider-side document model and the canonical result produced from it.
//!
//! The `Raw*` types are the internal shape the assembler consumes. They are filled by the
//! provider adapter and never leak the provider's wire format. `CanonicalResult` owns all of
//! its data and serializes with the camelCase keys callers expect.

use serde::Serialize;
use thiserror::Error;

/// A layout reference whose bounds do not fit the document text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid text anchor span [{start}, {end}) for text of length {text_len}")]
pub struct InvalidAnchorError {
    /// Start offset reported by the provider.
    pub start: i64,
    /// End offset reported by the provider.
    pub end: i64,
    /// Length of the document text in characters.
    pub text_len: usize,
}

/// Half-open offset range into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    /// Inclusive start offset.
    pub start: i64,
    /// Exclusive end offset.
    pub end: i64,
}

impl TextSpan {
    /// Build a span from its bounds.
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// Reference into the document text made of one or more spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextAnchor {
    /// Spans in the order their text is concatenated.
    pub spans: Vec<TextSpan>,
}

impl TextAnchor {
    /// Anchor covering a single span.
    pub fn single(start: i64, end: i64) -> Self {
        Self {
            spans: vec![TextSpan::new(start, end)],
        }
    }

    /// Anchor covering the given spans in order.
    pub fn from_spans(spans: impl IntoIterator<Item = (i64, i64)>) -> Self {
        Self {
            spans: spans
                .into_iter()
                .map(|(start, end)| TextSpan::new(start, end))
                .collect(),
        }
    }
}

/// Document returned by an extraction provider.
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    /// Full extracted text; every anchor offset is relative to it.
    pub full_text: String,
    /// Pages in document order.
    pub pages: Vec<RawPage>,
    /// Document-level entities in provider order.
    pub entities: Vec<RawEntity>,
}

/// Per-page structures detected by the provider.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    /// Key/value pairs in page order.
    pub form_fields: Vec<RawFormField>,
    /// Tables in page order.
    pub tables: Vec<RawTable>,
}

/// Key/value pair detected on a page.
#[derive(Debug, Clone, Default)]
pub struct RawFormField {
    /// Layout reference of the field label, if any.
    pub field_name_anchor: Option<TextAnchor>,
    /// Layout reference of the field value, if any.
    pub field_value_anchor: Option<TextAnchor>,
}

/// Table detected on a page.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header rows in order.
    pub header_rows: Vec<RawRow>,
    /// Body rows in order.
    pub body_rows: Vec<RawRow>,
}

/// Table row.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// Cells in column order. Rows of one table may differ in length.
    pub cells: Vec<RawCell>,
}

/// Table cell.
#[derive(Debug, Clone, Default)]
pub struct RawCell {
    /// Layout reference of the cell text, if any.
    pub layout_anchor: Option<TextAnchor>,
}

/// Semantic entity detected in the document.
#[derive(Debug, Clone, Default)]
pub struct RawEntity {
    /// Provider-defined entity type label.
    pub entity_type: String,
    /// Layout reference of the mention, if the provider supplied one.
    pub mention_anchor: Option<TextAnchor>,
    /// Literal mention text, if the provider supplied one.
    pub mention_text: Option<String>,
    /// Provider confidence, nominally in `[0, 1]`.
    pub confidence: f32,
}

/// Processor-agnostic projection of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResult {
    /// Verbatim copy of the document text.
    pub text: String,
    /// Entities in provider order.
    pub entities: Vec<CanonicalEntity>,
    /// Form fields, page-major then field order.
    pub fields: Vec<CanonicalField>,
    /// Tables, page-major then table order.
    pub tables: Vec<CanonicalTable>,
}

/// Entity with its mention resolved to text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEntity {
    /// Provider-defined entity type label.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Resolved mention text.
    pub mention_text: String,
    /// Provider confidence, passed through untouched.
    pub confidence: f32,
}

/// Form field with name and value resolved to text.
///
/// `None` means the provider gave no layout reference; `Some("")` means the reference resolved
/// to empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalField {
    /// Resolved field label.
    pub name: Option<String>,
    /// Resolved field value.
    pub value: Option<String>,
}

/// Table as a grid of resolved cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalTable {
    /// Header rows.
    pub headers: Vec<Vec<String>>,
    /// Body rows.
    pub body: Vec<Vec<String>>,
}
