//! HTTP client wrapper for the Document AI `processors.process` endpoint.

use crate::canonical::RawDocument;
use crate::provider::{
    ExtractionProvider,
    types::{ProviderError, ProviderSettings},
    wire::ProcessResponse,
};
use async_trait::async_trait;
use base64::prelude::*;
use reqwest::Client;
use serde_json::json;

/// Lightweight HTTP client for Document AI processors.
pub struct DocumentAiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) access_token: Option<String>,
}

impl DocumentAiClient {
    /// Construct a client from explicit connection settings.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("docai-canon/0.1")
            .timeout(settings.timeout)
            .build()?;

        let base_url = normalize_base_url(&settings.endpoint).map_err(ProviderError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_access_token = %settings
                .access_token
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            timeout_secs = settings.timeout.as_secs(),
            "Initialized Document AI HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            access_token: settings.access_token.clone(),
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.post(url);
        if let Some(token) = &self.access_token
            && !token.is_empty()
        {
            req = req.bearer_auth(token);
        }
        req
    }
}

#[async_trait]
impl ExtractionProvider for DocumentAiClient {
    async fn process_document(
        &self,
        processor_id: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<RawDocument, ProviderError> {
        let body = json!({
            "rawDocument": {
                "content": BASE64_STANDARD.encode(bytes),
                "mimeType": mime_type,
            }
        });

        let response = self
            .request(&format!("v1/{processor_id}:process"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ProviderError::from_status(status, body);
            tracing::error!(processor = processor_id, error = %error, "Document AI request failed");
            return Err(error);
        }

        let payload: ProcessResponse = response
            .json()
            .await
            .map_err(|error| ProviderError::MalformedResponse(error.to_string()))?;
        tracing::debug!(
            processor = processor_id,
            pages = payload.document.pages.len(),
            entities = payload.document.entities.len(),
            "Document AI response decoded"
        );
        Ok(payload.document.into())
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
