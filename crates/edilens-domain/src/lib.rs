//! edilens Domain Layer
//!
//! Core data model for interpreting energy-market EDIFACT messages
//! (UTILMD, MSCONS, INVOIC, REMADV, ORDERS, QUOTES, APERAK, CONTRL).
//!
//! ## Key Concepts
//!
//! - **Segment**: a tag plus a flat list of elements, as produced by the tokenizer
//! - **EnrichedSegment**: a segment plus resolved names and descriptions
//! - **MessageType**: the classified message family
//! - **StructuredInfo**: domain fields pulled out of a message
//! - **MessageAnalysis**: the aggregated result handed to the prompt layer
//!
//! ## Architecture
//!
//! This crate holds plain data and trait definitions only. Parsing,
//! classification and enrichment live in the other workspace crates, and the
//! external collaborators (code lookup, semantic search) are reached through
//! the traits in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod message_type;
pub mod segment;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use analysis::{
    AnalysisId, Characteristic, DateTimeEntry, EnrichmentStats, ItemDescription,
    Measurement, MessageAnalysis, MonetaryAmount, Party, Price, Reference,
    SegmentTableRow, StructuredInfo,
};
pub use message_type::MessageType;
pub use segment::{EnrichedSegment, ResolvedMeta, Segment, UNKNOWN_SEGMENT};
pub use validation::ValidationResult;
