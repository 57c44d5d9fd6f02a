//! Canonicalization of provider document output.
//!
//! Resolves text anchors and flattens pages, fields, tables, and entities into a
//! [`CanonicalResult`] that carries no trace of the provider that produced it.

pub mod anchor;
mod assembler;
mod entities;
mod fields;
mod tables;
pub mod types;

pub use anchor::{TextIndex, resolve};
pub use assembler::assemble;
pub use entities::extract_entities;
pub use fields::extract_fields;
pub use tables::extract_tables;
pub use types::{
    CanonicalEntity, CanonicalField, CanonicalResult, CanonicalTable, InvalidAnchorError,
    RawCell, RawDocument, RawEntity, RawFormField, RawPage, RawRow, RawTable, TextAnchor,
    TextSpan,
};
