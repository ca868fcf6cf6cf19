//! edilens Analyzer
//!
//! Explains energy-market EDIFACT messages: what kind of message it is,
//! which business process it belongs to, who the parties are and what
//! every segment means.
//!
//! # Architecture
//!
//! ```text
//! Text → Tokenizer → Classifier → Enrichment ─┬→ Field Extractor
//!                                             ├→ Segment Interpreter
//!                                             └→ Business Process
//!                                                   ↓
//!                                            MessageAnalysis
//! ```
//!
//! Enrichment consults two collaborators, a [`CodeLookup`] for market
//! participant codes and a [`SemanticSearch`] over process documentation.
//! Their failures are logged and counted, never propagated.
//!
//! # Example Usage
//!
//! ```
//! use edilens_analyzer::{Analyzer, AnalyzerConfig};
//! use edilens_lookup::{StaticCodeLookup, StaticSemanticSearch};
//!
//! # async fn example() -> Result<(), edilens_analyzer::AnalyzerError> {
//! let analyzer = Analyzer::new(
//!     StaticCodeLookup::new(),
//!     StaticSemanticSearch::new(),
//!     AnalyzerConfig::default(),
//! )?;
//!
//! let analysis = analyzer
//!     .analyze("UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'RFF+Z13+44009'UNT+4+1'")
//!     .await?;
//!
//! println!("{}: {:?}", analysis.message_type, analysis.business_process);
//! for row in analysis.segment_table() {
//!     println!("{} | {} | {}", row.segment, row.meaning, row.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`CodeLookup`]: edilens_domain::traits::CodeLookup
//! [`SemanticSearch`]: edilens_domain::traits::SemanticSearch

#![warn(missing_docs)]

mod analyzer;
mod codes;
mod config;
mod enrichment;
mod error;
mod extractor;
mod interpreter;
mod process;
mod resolver;


pub use analyzer::{to_json, Analyzer};
pub use codes::{classify_location, format_edifact_datetime, is_energy_code, LocationKind};
pub use config::{AnalyzerConfig, EnrichmentConfig};
pub use enrichment::{code_snippet, process_snippet, Enricher};
pub use error::AnalyzerError;
pub use extractor::FieldExtractor;
pub use interpreter::{SegmentInterpreter, EXCLUDED_TAGS};
pub use process::{classify_business_process, process_framework};
pub use resolver::{Annotation, AnnotationResolver, CodeResolver, DictionaryResolver, ResolverChain};
