//! Resolution of text anchors into the literal text they denote.
//!
//! Offsets count Unicode scalar values of the document text. A [`TextIndex`] records every
//! character boundary once so that a document with many anchors is sliced without rescanning.

use super::types::{InvalidAnchorError, TextAnchor, TextSpan};

/// Character-boundary index over a document's full text.
pub struct TextIndex<'a> {
    text: &'a str,
    /// Byte offset of every character start, followed by `text.len()`.
    boundaries: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    /// Index the given text.
    pub fn new(text: &'a str) -> Self {
        let boundaries = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, boundaries }
    }

    /// Indexed text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of characters in the indexed text.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Borrow the text covered by a single span.
    pub fn slice(&self, span: TextSpan) -> Result<&'a str, InvalidAnchorError> {
        let text_len = self.char_len();
        let invalid = || InvalidAnchorError {
            start: span.start,
            end: span.end,
            text_len,
        };
        let start = usize::try_from(span.start).map_err(|_| invalid())?;
        let end = usize::try_from(span.end).map_err(|_| invalid())?;
        if start > end || end > text_len {
            return Err(invalid());
        }
        Ok(&self.text[self.boundaries[start]..self.boundaries[end]])
    }

    /// Resolve an optional anchor.
    ///
    /// A missing anchor yields `None`; an anchor without spans yields an empty string. Spans are
    /// concatenated in the order given, without separators.
    pub fn resolve(
        &self,
        anchor: Option<&TextAnchor>,
    ) -> Result<Option<String>, InvalidAnchorError> {
        let Some(anchor) = anchor else {
            return Ok(None);
        };
        let mut resolved = String::new();
        for span in &anchor.spans {
            resolved.push_str(self.slice(*span)?);
        }
        Ok(Some(resolved))
    }
}

/// Resolve an anchor against `full_text` without keeping an index around.
pub fn resolve(
    full_text: &str,
    anchor: Option<&TextAnchor>,
) -> Result<Option<String>, InvalidAnchorError> {
    TextIndex::new(full_text).resolve(anchor)
}
