use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing extraction activity.
#[derive(Default)]
pub struct ExtractionMetrics {
    documents_processed: AtomicU64,
    provider_failures: AtomicU64,
    invalid_documents: AtomicU64,
    fields_extracted: AtomicU64,
    tables_extracted: AtomicU64,
}

impl ExtractionMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a canonicalized document and the structures extracted from it.
    pub fn record_document(&self, field_count: u64, table_count: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.fields_extracted
            .fetch_add(field_count, Ordering::Relaxed);
        self.tables_extracted
            .fetch_add(table_count, Ordering::Relaxed);
    }

    /// Record a failed provider call.
    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a provider response whose anchors could not be resolved.
    pub fn record_invalid_document(&self) {
        self.invalid_documents.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            invalid_documents: self.invalid_documents.load(Ordering::Relaxed),
            fields_extracted: self.fields_extracted.load(Ordering::Relaxed),
            tables_extracted: self.tables_extracted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of extraction counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents canonicalized since startup.
    pub documents_processed: u64,
    /// Provider calls that failed.
    pub provider_failures: u64,
    /// Provider responses rejected because of malformed anchors.
    pub invalid_documents: u64,
    /// Total form fields emitted.
    pub fields_extracted: u64,
    /// Total tables emitted.
    pub tables_extracted: u64,
}
