//! Processing pipeline: capability routing, canonicalization, and summary rendering.

mod service;
pub mod types;

pub use service::{DocumentApi, ProcessorRouter, summary_text};
pub use types::{Capability, ParseCapabilityError, ProcessingError};
