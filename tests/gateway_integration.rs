use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use docai_canon::{
    api,
    config::ProcessorIds,
    processing::ProcessorRouter,
    provider::{DocumentAiClient, ProviderSettings},
    render::PdfRenderer,
};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "gateway-boundary";
const FORM_PROCESSOR: &str = "projects/demo/locations/us/processors/form";
const SUMMARY_PROCESSOR: &str = "projects/demo/locations/us/processors/summary";

// "Invoice\nTotal: $50\nName Bob"
//  Invoice 0..7, Total: 8..14, $50 15..18, Name 19..23, Bob 24..27
const DOCUMENT_TEXT: &str = "Invoice\nTotal: $50\nName Bob";

fn segment(start: Option<&str>, end: &str) -> Value {
    match start {
        Some(start) => json!({ "startIndex": start, "endIndex": end }),
        None => json!({ "endIndex": end }),
    }
}

fn anchor(start: Option<&str>, end: &str) -> Value {
    json!({ "textSegments": [segment(start, end)] })
}

fn form_document() -> Value {
    json!({
        "document": {
            "text": DOCUMENT_TEXT,
            "pages": [{
                "pageNumber": 1,
                "formFields": [
                    {
                        "fieldName": { "textAnchor": anchor(Some("8"), "14") },
                        "fieldValue": { "textAnchor": anchor(Some("15"), "18") }
                    },
                    {
                        "fieldName": { "textAnchor": anchor(Some("19"), "23") },
                        "fieldValue": {}
                    }
                ],
                "tables": [{
                    "headerRows": [{ "cells": [{ "layout": { "textAnchor": anchor(Some("19"), "23") } }] }],
                    "bodyRows": [{ "cells": [
                        { "layout": { "textAnchor": anchor(Some("24"), "27") } },
                        { "layout": {} }
                    ] }]
                }]
            }],
            "entities": [
                { "type": "title", "confidence": 0.75, "textAnchor": anchor(None, "7") },
                { "type": "total_amount", "mentionText": "fifty", "confidence": 0.5, "textAnchor": anchor(Some("15"), "18") }
            ]
        }
    })
}

fn gateway(server: &MockServer) -> Router {
    let provider = DocumentAiClient::new(&ProviderSettings {
        endpoint: server.base_url(),
        access_token: Some("test-token".into()),
        timeout: Duration::from_secs(5),
    })
    .expect("client");
    let processors = ProcessorIds {
        form_parser: Some(FORM_PROCESSOR.into()),
        summarizer: Some(SUMMARY_PROCESSOR.into()),
        ..ProcessorIds::default()
    };
    let router = ProcessorRouter::new(
        processors,
        Box::new(provider),
        Box::new(PdfRenderer::default()),
        "application/pdf",
    );
    api::create_router(Arc::new(router), 1024 * 1024)
}

fn upload(uri: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"scan.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, body.to_vec())
}

#[tokio::test]
async fn form_parser_round_trip_produces_canonical_json() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/v1/{FORM_PROCESSOR}:process"))
                .header("authorization", "Bearer test-token")
                .body_contains("\"mimeType\":\"image/png\"");
            then.status(200).json_body(form_document());
        })
        .await;

    let (status, body) = send(
        gateway(&server),
        upload("/api/document/form-parser", "image/png", b"png-bytes"),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(
        payload,
        json!({
            "text": DOCUMENT_TEXT,
            "entities": [
                { "type": "title", "mentionText": "Invoice", "confidence": 0.75 },
                { "type": "total_amount", "mentionText": "$50", "confidence": 0.5 }
            ],
            "fields": [
                { "name": "Total:", "value": "$50" },
                { "name": "Name", "value": null }
            ],
            "tables": [
                { "headers": [["Name"]], "body": [["Bob", ""]] }
            ]
        })
    );
}

#[tokio::test]
async fn unconfigured_capability_never_reaches_provider() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(form_document());
        })
        .await;

    let (status, _) = send(
        gateway(&server),
        upload("/api/document/ocr", "application/pdf", b"%PDF-1.7"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn out_of_range_anchor_fails_the_whole_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/v1/{FORM_PROCESSOR}:process"));
            then.status(200).json_body(json!({
                "document": {
                    "text": "short",
                    "entities": [{ "type": "name", "textAnchor": anchor(Some("2"), "99") }]
                }
            }));
        })
        .await;

    let app = gateway(&server);
    let (status, body) = send(
        app.clone(),
        upload("/api/document/form-parser", "application/pdf", b"%PDF-1.7"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8_lossy(&body).contains("anchor"));

    let metrics = Request::builder()
        .uri("/api/document/metrics")
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(app, metrics).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(snapshot["invalid_documents"], 1);
    assert_eq!(snapshot["documents_processed"], 0);
}

#[tokio::test]
async fn provider_quota_errors_surface_as_too_many_requests() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(429).body("RESOURCE_EXHAUSTED");
        })
        .await;

    let (status, _) = send(
        gateway(&server),
        upload("/api/document/form-parser", "application/pdf", b"%PDF-1.7"),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn summarize_returns_rendered_pdf() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/v1/{SUMMARY_PROCESSOR}:process"));
            then.status(200).json_body(json!({
                "document": {
                    "text": "A long report about quarterly results.",
                    "entities": [{
                        "type": "summary",
                        "mentionText": "Revenue grew.",
                        "confidence": 1.0
                    }]
                }
            }));
        })
        .await;

    let response = gateway(&server)
        .oneshot(upload("/api/document/summarize", "application/pdf", b"%PDF-1.7"))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert!(body.starts_with(b"%PDF"));
}
