//! Capability selection and error definitions for the processing layer.

use crate::{canonical::InvalidAnchorError, provider::ProviderError, render::RenderError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Logical extraction mode, mapped to a concrete processor by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Plain OCR: text without structure.
    Ocr,
    /// Key/value and table extraction.
    FormParser,
    /// Abstractive summary of the document.
    Summarize,
    /// Trained extractor for custom entity types.
    CustomExtractor,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 4] = [
        Capability::Ocr,
        Capability::FormParser,
        Capability::Summarize,
        Capability::CustomExtractor,
    ];

    /// Stable identifier used in routes, configuration listings, and the CLI.
    pub const fn slug(self) -> &'static str {
        match self {
            Capability::Ocr => "ocr",
            Capability::FormParser => "form-parser",
            Capability::Summarize => "summarize",
            Capability::CustomExtractor => "custom-extractor",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Capability slug that matched no known capability.
#[derive(Debug, Error)]
#[error("unknown capability '{0}' (expected one of: ocr, form-parser, summarize, custom-extractor)")]
pub struct ParseCapabilityError(String);

impl FromStr for Capability {
    type Err = ParseCapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Capability::ALL
            .into_iter()
            .find(|capability| capability.slug() == normalized)
            .ok_or_else(|| ParseCapabilityError(s.to_string()))
    }
}

/// Errors emitted while routing a document through a processor.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// No processor identifier is configured for the requested capability.
    #[error("No processor configured for capability '{0}'")]
    UnknownCapability(Capability),
    /// Provider output referenced text outside the document.
    #[error("Provider returned an invalid layout reference: {0}")]
    InvalidAnchor(#[from] InvalidAnchorError),
    /// Provider call failed.
    #[error("Extraction provider failed: {0}")]
    Provider(#[from] ProviderError),
    /// Summary PDF could not be rendered.
    #[error("Failed to render summary: {0}")]
    Render(#[from] RenderError),
}
