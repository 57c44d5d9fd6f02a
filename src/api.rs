//! HTTP surface for document extraction.
//!
//! All routes live under `/api/document`:
//!
//! - `GET /ping` – Liveness probe.
//! - `GET /capabilities` – Capabilities with a configured processor.
//! - `GET /metrics` – Extraction counters.
//! - `POST /upload` – Multipart `file`; runs the custom extractor and returns `{ text, entities }`.
//! - `POST /{capability}` – Multipart `file`; `ocr` and `form-parser` return the full canonical
//!   result, `custom-extractor` returns `{ text, fields, entities }`, and `summarize` returns the
//!   rendered summary as `application/pdf`.
//!
//! Every capability goes through the same handler and the same processor router, so the only
//! difference between endpoints is the projection applied to the canonical result.

use crate::canonical::{CanonicalEntity, CanonicalField, CanonicalResult};
use crate::metrics::MetricsSnapshot;
use crate::processing::{Capability, DocumentApi, ProcessingError};
use crate::provider::{ProviderError, mime_type_for_file_name};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

const MISSING_FILE: &str = "File not provided.";

/// Build the HTTP router exposing the extraction API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/api/document/ping", get(ping))
        .route("/api/document/capabilities", get(list_capabilities::<S>))
        .route("/api/document/metrics", get(get_metrics::<S>))
        .route("/api/document/upload", post(upload_document::<S>))
        .route("/api/document/:capability", post(process_document::<S>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Liveness probe.
async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "API OK ✔️" }))
}

/// Response body for `GET /capabilities`.
#[derive(Serialize)]
struct CapabilitiesResponse {
    capabilities: Vec<Capability>,
}

async fn list_capabilities<S>(State(service): State<Arc<S>>) -> Json<CapabilitiesResponse>
where
    S: DocumentApi,
{
    Json(CapabilitiesResponse {
        capabilities: service.configured_capabilities(),
    })
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Shape of the JSON returned for each capability.
#[derive(Serialize)]
#[serde(untagged)]
enum ExtractionResponse {
    Full(CanonicalResult),
    FieldsAndEntities {
        text: String,
        fields: Vec<CanonicalField>,
        entities: Vec<CanonicalEntity>,
    },
    Entities {
        text: String,
        entities: Vec<CanonicalEntity>,
    },
}

impl ExtractionResponse {
    fn fields_and_entities(result: CanonicalResult) -> Self {
        Self::FieldsAndEntities {
            text: result.text,
            fields: result.fields,
            entities: result.entities,
        }
    }

    fn entities(result: CanonicalResult) -> Self {
        Self::Entities {
            text: result.text,
            entities: result.entities,
        }
    }
}

/// Run the custom extractor and return the document text with its entities.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Response, AppError>
where
    S: DocumentApi,
{
    let upload = read_upload(multipart).await?;
    let capability = Capability::CustomExtractor;
    let span = request_span(capability, &upload);
    let result = service
        .extract(capability, &upload.bytes, upload.mime_type.as_deref())
        .instrument(span)
        .await?;
    Ok(Json(ExtractionResponse::entities(result)).into_response())
}

/// Run the capability named in the path over the uploaded file.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Path(capability): Path<Capability>,
    multipart: Multipart,
) -> Result<Response, AppError>
where
    S: DocumentApi,
{
    let upload = read_upload(multipart).await?;
    let span = request_span(capability, &upload);

    let response = match capability {
        Capability::Summarize => {
            let pdf = service
                .summarize_to_pdf(&upload.bytes, upload.mime_type.as_deref())
                .instrument(span)
                .await?;
            (
                [
                    (header::CONTENT_TYPE, "application/pdf"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"summary.pdf\"",
                    ),
                ],
                pdf,
            )
                .into_response()
        }
        Capability::Ocr | Capability::FormParser => {
            let result = service
                .extract(capability, &upload.bytes, upload.mime_type.as_deref())
                .instrument(span)
                .await?;
            Json(ExtractionResponse::Full(result)).into_response()
        }
        Capability::CustomExtractor => {
            let result = service
                .extract(capability, &upload.bytes, upload.mime_type.as_deref())
                .instrument(span)
                .await?;
            Json(ExtractionResponse::fields_and_entities(result)).into_response()
        }
    };
    Ok(response)
}

/// File part pulled from a multipart request.
struct Upload {
    bytes: Bytes,
    mime_type: Option<String>,
    file_name: Option<String>,
}

/// Extract the `file` part, rejecting requests without one or with an empty one.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::from)?
    {
        let is_file = field
            .name()
            .map(|name| name.eq_ignore_ascii_case("file"))
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let mime_type = field
            .content_type()
            .filter(|mime| !mime.eq_ignore_ascii_case("application/octet-stream"))
            .map(str::to_string)
            .or_else(|| {
                file_name
                    .as_deref()
                    .and_then(mime_type_for_file_name)
                    .map(str::to_string)
            });
        let bytes = field
            .bytes()
            .await
            .map_err(AppError::from)?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest(MISSING_FILE.into()));
        }
        return Ok(Upload {
            bytes,
            mime_type,
            file_name,
        });
    }

    Err(AppError::BadRequest(MISSING_FILE.into()))
}

fn request_span(capability: Capability, upload: &Upload) -> tracing::Span {
    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        capability = %capability,
        bytes = upload.bytes.len(),
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        "Extraction request received"
    );
    tracing::info_span!("extract", %request_id, capability = %capability)
}

enum AppError {
    BadRequest(String),
    Upload(MultipartError),
    Processing(ProcessingError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(error) => error.status(),
            AppError::Processing(error) => match error {
                ProcessingError::UnknownCapability(_) => StatusCode::BAD_REQUEST,
                ProcessingError::InvalidAnchor(_) | ProcessingError::Render(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ProcessingError::Provider(provider) => match provider {
                    ProviderError::InvalidDocument { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ProviderError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                    ProviderError::Unavailable { .. } | ProviderError::Http(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    ProviderError::Unauthorized { .. }
                    | ProviderError::UnexpectedStatus { .. }
                    | ProviderError::MalformedResponse(_)
                    | ProviderError::InvalidUrl(_) => StatusCode::BAD_GATEWAY,
                },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(message) => message,
            AppError::Upload(error) => error.body_text(),
            AppError::Processing(error) => {
                if status.is_server_error() {
                    tracing::error!(status = %status, error = %error, "Extraction request failed");
                }
                error.to_string()
            }
        };
        (status, message).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::Upload(inner)
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}
