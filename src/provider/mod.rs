//! Extraction provider boundary.
//!
//! Providers turn raw document bytes into a [`RawDocument`]. The Document AI adapter converts
//! the REST wire format at this boundary so nothing past it depends on provider types.

pub mod client;
pub mod types;
pub mod wire;

use crate::canonical::RawDocument;
use async_trait::async_trait;

pub use client::DocumentAiClient;
pub use types::{ProviderError, ProviderSettings, mime_type_for_file_name};
pub use wire::decode_document;

/// Interface implemented by document-analysis backends.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Run the identified processor over the document bytes.
    async fn process_document(
        &self,
        processor_id: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<RawDocument, ProviderError>;
}
