#![deny(missing_docs)]

//! Canonicalization of Document AI processor output behind a uniform extraction API.

/// HTTP routing and REST handlers.
pub mod api;
/// Provider-agnostic document model and the canonicalization pipeline.
pub mod canonical;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Extraction counters.
pub mod metrics;
/// Capability routing over the extraction provider.
pub mod processing;
/// Extraction provider integration.
pub mod provider;
/// Summary PDF rendering.
pub mod render;
