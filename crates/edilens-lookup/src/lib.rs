//! edilens Lookup Collaborators
//!
//! Deterministic, in-memory implementations of the `CodeLookup` and
//! `SemanticSearch` traits from `edilens-domain`.
//!
//! # Providers
//!
//! - `StaticCodeLookup`: code → ranked company matches from a fixed table
//! - `StaticSemanticSearch`: documents selected by trigger terms with fixed scores
//!
//! Both count calls, can be told to fail for particular inputs, and can
//! simulate latency, which makes them suitable for tests and offline runs.
//!
//! # Examples
//!
//! ```
//! use edilens_lookup::StaticCodeLookup;
//! use edilens_domain::traits::{CodeLookup, CodeMatch};
//!
//! # tokio_test_block_on(async {
//! let lookup = StaticCodeLookup::new();
//! lookup.add_match(CodeMatch::new("9900000000001", "Stadtwerke Musterstadt"));
//!
//! let found = lookup.lookup_single_code("9900000000001").await.unwrap();
//! assert_eq!(found.unwrap().company_name, "Stadtwerke Musterstadt");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

mod code_lookup;
mod semantic_search;

use thiserror::Error;

pub use code_lookup::StaticCodeLookup;
pub use semantic_search::StaticSemanticSearch;

/// Errors returned by the lookup collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Service could not be reached
    #[error("Lookup service unavailable: {0}")]
    Unavailable(String),

    /// Query rejected by the service
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
