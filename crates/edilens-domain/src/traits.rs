//! Trait definitions for external collaborators
//!
//! These traits define the boundary between the interpretation core and the
//! services it consults. Implementations live in other crates
//! (`edilens-lookup` ships deterministic in-memory ones).
//!
//! Both services report "nothing found" as an empty result, never as an
//! error. Errors are reserved for the service being unreachable or failing.

use serde::{Deserialize, Serialize};
use std::future::Future;

/// A market participant returned by the code lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMatch {
    /// The BDEW/EIC/GLN code that matched
    pub code: String,

    /// Company name registered for the code
    pub company_name: String,

    /// Code family (BDEW, EIC, GLN, ...), when known
    pub code_type: Option<String>,

    /// Contact roles of the company (e.g. "Lieferant", "Netzbetreiber")
    pub contact_roles: Vec<String>,
}

impl CodeMatch {
    /// Create a match without code type or roles
    pub fn new(code: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            company_name: company_name.into(),
            code_type: None,
            contact_roles: Vec::new(),
        }
    }

    /// Attach contact roles
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.contact_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a code type
    pub fn with_code_type(mut self, code_type: impl Into<String>) -> Self {
        self.code_type = Some(code_type.into());
        self
    }
}

/// A hit returned by the semantic search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Text payload of the matched document chunk
    pub text: String,

    /// Similarity score (0.0-1.0)
    pub score: f32,
}

impl SearchHit {
    /// Create a hit
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Trait for resolving market participant codes
///
/// Implemented by the infrastructure layer
pub trait CodeLookup {
    /// Error type for lookup operations
    type Error: std::fmt::Display;

    /// Resolve exactly one code
    fn lookup_single_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<CodeMatch>, Self::Error>> + Send;

    /// Search for a code, best match first
    fn search_codes(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Vec<CodeMatch>, Self::Error>> + Send;
}

/// Trait for semantic search over regulatory documents
///
/// Implemented by the infrastructure layer
pub trait SemanticSearch {
    /// Error type for search operations
    type Error: std::fmt::Display;

    /// Return at most `top_k` hits scoring at least `score_threshold`, best first
    fn search_by_text(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send;
}
