//! Processor router coordinating provider calls, canonicalization, and summary rendering.

use crate::{
    canonical::{CanonicalResult, assemble},
    config::{Config, ProcessorIds},
    metrics::{ExtractionMetrics, MetricsSnapshot},
    processing::types::{Capability, ProcessingError},
    provider::{DocumentAiClient, ExtractionProvider, ProviderError},
    render::{PdfRenderer, Renderer},
};
use async_trait::async_trait;

/// Entity type the summarizer uses for its output.
const SUMMARY_ENTITY_TYPE: &str = "summary";

/// Dispatches a capability to its configured processor and canonicalizes the result.
///
/// The router owns the provider transport, the summary renderer, and the metrics registry.
/// Construct it once near process start and share it through an `Arc`.
pub struct ProcessorRouter {
    processors: ProcessorIds,
    provider: Box<dyn ExtractionProvider>,
    renderer: Box<dyn Renderer>,
    default_mime_type: String,
    metrics: ExtractionMetrics,
}

/// Abstraction over the processing pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Run `capability` over the document and return its canonical projection.
    async fn extract(
        &self,
        capability: Capability,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<CanonicalResult, ProcessingError>;

    /// Summarize the document and render the summary as PDF.
    async fn summarize_to_pdf(
        &self,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<Vec<u8>, ProcessingError>;

    /// Capabilities with a configured processor.
    fn configured_capabilities(&self) -> Vec<Capability>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl ProcessorRouter {
    /// Build a router from its collaborators.
    pub fn new(
        processors: ProcessorIds,
        provider: Box<dyn ExtractionProvider>,
        renderer: Box<dyn Renderer>,
        default_mime_type: impl Into<String>,
    ) -> Self {
        Self {
            processors,
            provider,
            renderer,
            default_mime_type: default_mime_type.into(),
            metrics: ExtractionMetrics::new(),
        }
    }

    /// Build a router backed by Document AI and the PDF renderer.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let provider = DocumentAiClient::new(&config.provider_settings())?;
        tracing::info!(
            capabilities = ?config.processors.configured(),
            "Processor router initialized"
        );
        Ok(Self::new(
            config.processors.clone(),
            Box::new(provider),
            Box::new(PdfRenderer::default()),
            config.default_mime_type.clone(),
        ))
    }

    /// Run `capability` over `payload` using the default MIME type.
    pub async fn route(
        &self,
        capability: Capability,
        payload: &[u8],
    ) -> Result<CanonicalResult, ProcessingError> {
        self.route_with_mime(capability, payload, &self.default_mime_type)
            .await
    }

    /// Run `capability` over `payload` declared as `mime_type`.
    ///
    /// Fails before contacting the provider when the capability has no processor. Provider
    /// failures are returned as-is; retrying is left to the caller.
    pub async fn route_with_mime(
        &self,
        capability: Capability,
        payload: &[u8],
        mime_type: &str,
    ) -> Result<CanonicalResult, ProcessingError> {
        let processor_id = self
            .processors
            .get(capability)
            .ok_or(ProcessingError::UnknownCapability(capability))?;

        tracing::info!(
            capability = %capability,
            processor = processor_id,
            bytes = payload.len(),
            mime_type,
            "Processing document"
        );
        let raw = match self
            .provider
            .process_document(processor_id, payload, mime_type)
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                self.metrics.record_provider_failure();
                tracing::warn!(capability = %capability, error = %error, "Provider call failed");
                return Err(error.into());
            }
        };

        let result = assemble(&raw).inspect_err(|error| {
            self.metrics.record_invalid_document();
            tracing::error!(capability = %capability, error = %error, "Canonicalization failed");
        })?;

        self.metrics
            .record_document(result.fields.len() as u64, result.tables.len() as u64);
        tracing::info!(
            capability = %capability,
            entities = result.entities.len(),
            fields = result.fields.len(),
            tables = result.tables.len(),
            "Document canonicalized"
        );
        Ok(result)
    }

    /// Summarize `payload` and render the summary text as PDF.
    pub async fn summarize_to_pdf(
        &self,
        payload: &[u8],
        mime_type: &str,
    ) -> Result<Vec<u8>, ProcessingError> {
        let result = self
            .route_with_mime(Capability::Summarize, payload, mime_type)
            .await?;
        let text = summary_text(&result);
        let pdf = self.renderer.render_text_to_pdf(&text)?;
        tracing::info!(
            summary_chars = text.chars().count(),
            pdf_bytes = pdf.len(),
            "Summary rendered"
        );
        Ok(pdf)
    }

    /// Capabilities with a configured processor.
    pub fn configured_capabilities(&self) -> Vec<Capability> {
        self.processors.configured()
    }

    /// Return the current extraction metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Text rendered on the summary path.
///
/// Joins the mentions of `summary` entities with blank lines, falling back to the full
/// document text when the processor reported none.
pub fn summary_text(result: &CanonicalResult) -> String {
    let summaries: Vec<&str> = result
        .entities
        .iter()
        .filter(|entity| entity.entity_type.eq_ignore_ascii_case(SUMMARY_ENTITY_TYPE))
        .map(|entity| entity.mention_text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    if summaries.is_empty() {
        result.text.clone()
    } else {
        summaries.join("\n\n")
    }
}

#[async_trait]
impl DocumentApi for ProcessorRouter {
    async fn extract(
        &self,
        capability: Capability,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<CanonicalResult, ProcessingError> {
        let mime_type = mime_type.unwrap_or(self.default_mime_type.as_str());
        self.route_with_mime(capability, bytes, mime_type).await
    }

    async fn summarize_to_pdf(
        &self,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<Vec<u8>, ProcessingError> {
        let mime_type = mime_type.unwrap_or(self.default_mime_type.as_str());
        ProcessorRouter::summarize_to_pdf(self, bytes, mime_type).await
    }

    fn configured_capabilities(&self) -> Vec<Capability> {
        ProcessorRouter::configured_capabilities(self)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        ProcessorRouter::metrics_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{
        CanonicalEntity, RawDocument, RawEntity, RawFormField, RawPage, TextAnchor,
    };
    use crate::render::RenderError;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct ProviderCall {
        processor_id: String,
        bytes: Vec<u8>,
        mime_type: String,
    }

    enum StubResponse {
        Document(RawDocument),
        Status(StatusCode),
    }

    struct StubProvider {
        calls: Arc<Mutex<Vec<ProviderCall>>>,
        response: StubResponse,
    }

    #[async_trait]
    impl ExtractionProvider for StubProvider {
        async fn process_document(
            &self,
            processor_id: &str,
            bytes: &[u8],
            mime_type: &str,
        ) -> Result<RawDocument, ProviderError> {
            self.calls.lock().expect("calls lock").push(ProviderCall {
                processor_id: processor_id.to_string(),
                bytes: bytes.to_vec(),
                mime_type: mime_type.to_string(),
            });
            match &self.response {
                StubResponse::Document(raw) => Ok(raw.clone()),
                StubResponse::Status(status) => {
                    Err(ProviderError::from_status(*status, "stub failure".into()))
                }
            }
        }
    }

    struct RecordingRenderer {
        texts: Arc<Mutex<Vec<String>>>,
    }

    impl Renderer for RecordingRenderer {
        fn render_text_to_pdf(&self, text: &str) -> Result<Vec<u8>, RenderError> {
            self.texts.lock().expect("texts lock").push(text.to_string());
            Ok(b"%PDF-stub".to_vec())
        }
    }

    struct Harness {
        router: ProcessorRouter,
        calls: Arc<Mutex<Vec<ProviderCall>>>,
        rendered: Arc<Mutex<Vec<String>>>,
    }

    fn harness(processors: ProcessorIds, response: StubResponse) -> Harness {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let rendered = Arc::new(Mutex::new(Vec::new()));
        let router = ProcessorRouter::new(
            processors,
            Box::new(StubProvider {
                calls: calls.clone(),
                response,
            }),
            Box::new(RecordingRenderer {
                texts: rendered.clone(),
            }),
            "application/pdf",
        );
        Harness {
            router,
            calls,
            rendered,
        }
    }

    fn all_processors() -> ProcessorIds {
        ProcessorIds {
            ocr: Some("processors/ocr".into()),
            form_parser: Some("processors/form".into()),
            summarizer: Some("processors/summary".into()),
            custom_extractor: Some("processors/custom".into()),
        }
    }

    fn invoice() -> RawDocument {
        RawDocument {
            full_text: "Invoice #123 Total: $50".into(),
            pages: vec![RawPage {
                form_fields: vec![RawFormField {
                    field_name_anchor: Some(TextAnchor::single(13, 18)),
                    field_value_anchor: Some(TextAnchor::single(20, 23)),
                }],
                tables: Vec::new(),
            }],
            entities: vec![RawEntity {
                entity_type: "total_amount".into(),
                mention_anchor: Some(TextAnchor::single(20, 23)),
                mention_text: None,
                confidence: 0.92,
            }],
        }
    }

    #[tokio::test]
    async fn unconfigured_capability_fails_before_provider_call() {
        let harness = harness(
            ProcessorIds {
                ocr: Some("processors/ocr".into()),
                ..ProcessorIds::default()
            },
            StubResponse::Document(invoice()),
        );

        let error = harness
            .router
            .route(Capability::FormParser, b"%PDF-")
            .await
            .expect_err("unconfigured capability");

        assert!(matches!(
            error,
            ProcessingError::UnknownCapability(Capability::FormParser)
        ));
        assert!(harness.calls.lock().expect("calls lock").is_empty());
    }

    #[tokio::test]
    async fn routes_to_configured_processor_and_assembles() {
        let harness = harness(all_processors(), StubResponse::Document(invoice()));

        let result = harness
            .router
            .route_with_mime(Capability::FormParser, b"image", "image/png")
            .await
            .expect("route");

        assert_eq!(
            *harness.calls.lock().expect("calls lock"),
            vec![ProviderCall {
                processor_id: "processors/form".into(),
                bytes: b"image".to_vec(),
                mime_type: "image/png".into(),
            }]
        );
        assert_eq!(
            result.entities,
            vec![CanonicalEntity {
                entity_type: "total_amount".into(),
                mention_text: "$50".into(),
                confidence: 0.92,
            }]
        );
        assert_eq!(result.fields[0].name.as_deref(), Some("Total"));

        let snapshot = harness.router.metrics_snapshot();
        assert_eq!(snapshot.documents_processed, 1);
        assert_eq!(snapshot.fields_extracted, 1);
    }

    #[tokio::test]
    async fn route_uses_default_mime_type() {
        let harness = harness(all_processors(), StubResponse::Document(invoice()));
        harness
            .router
            .route(Capability::Ocr, b"%PDF-")
            .await
            .expect("route");
        let calls = harness.calls.lock().expect("calls lock");
        assert_eq!(calls[0].mime_type, "application/pdf");
        assert_eq!(calls[0].processor_id, "processors/ocr");
    }

    #[tokio::test]
    async fn provider_errors_are_wrapped_without_retry() {
        let harness = harness(
            all_processors(),
            StubResponse::Status(StatusCode::TOO_MANY_REQUESTS),
        );

        let error = harness
            .router
            .route(Capability::Ocr, b"%PDF-")
            .await
            .expect_err("provider failure");

        assert!(matches!(
            error,
            ProcessingError::Provider(ProviderError::QuotaExceeded { .. })
        ));
        assert_eq!(harness.calls.lock().expect("calls lock").len(), 1);
        assert_eq!(harness.router.metrics_snapshot().provider_failures, 1);
    }

    #[tokio::test]
    async fn invalid_anchor_aborts_without_partial_result() {
        let mut raw = invoice();
        raw.pages[0].form_fields.push(RawFormField {
            field_name_anchor: Some(TextAnchor::single(10, 5)),
            field_value_anchor: None,
        });
        let harness = harness(all_processors(), StubResponse::Document(raw));

        let error = harness
            .router
            .route(Capability::FormParser, b"%PDF-")
            .await
            .expect_err("invalid anchor");

        assert!(matches!(error, ProcessingError::InvalidAnchor(_)));
        let snapshot = harness.router.metrics_snapshot();
        assert_eq!(snapshot.documents_processed, 0);
        assert_eq!(snapshot.invalid_documents, 1);
    }

    #[tokio::test]
    async fn summarize_renders_summary_entities() {
        let raw = RawDocument {
            full_text: "Long body text".into(),
            pages: Vec::new(),
            entities: vec![
                RawEntity {
                    entity_type: "summary".into(),
                    mention_text: Some("First point.".into()),
                    confidence: 1.0,
                    ..RawEntity::default()
                },
                RawEntity {
                    entity_type: "summary".into(),
                    mention_text: Some("Second point.".into()),
                    confidence: 1.0,
                    ..RawEntity::default()
                },
            ],
        };
        let harness = harness(all_processors(), StubResponse::Document(raw));

        let pdf = harness
            .router
            .summarize_to_pdf(b"%PDF-", "application/pdf")
            .await
            .expect("summary pdf");

        assert_eq!(pdf, b"%PDF-stub".to_vec());
        assert_eq!(
            *harness.rendered.lock().expect("texts lock"),
            vec!["First point.\n\nSecond point.".to_string()]
        );
        assert_eq!(
            harness.calls.lock().expect("calls lock")[0].processor_id,
            "processors/summary"
        );
    }

    #[test]
    fn summary_text_falls_back_to_document_text() {
        let result = CanonicalResult {
            text: "Whole document".into(),
            entities: vec![CanonicalEntity {
                entity_type: "invoice_id".into(),
                mention_text: "123".into(),
                confidence: 0.8,
            }],
            ..CanonicalResult::default()
        };
        assert_eq!(summary_text(&result), "Whole document");
    }
}
