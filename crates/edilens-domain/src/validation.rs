//! Validation module - structural findings for a raw message

use crate::MessageType;
use serde::{Deserialize, Serialize};

/// Outcome of the structural validation pass
///
/// Errors block (`is_valid` is false when any are present); warnings are
/// informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when `errors` is empty
    pub is_valid: bool,

    /// Blocking findings
    pub errors: Vec<String>,

    /// Informational findings
    pub warnings: Vec<String>,

    /// Classified message type, when the text could be tokenized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,

    /// Number of tokenized segments, envelope included
    pub segment_count: usize,
}

impl ValidationResult {
    /// Build a result; `is_valid` is derived from `errors`
    pub fn new(
        errors: Vec<String>,
        warnings: Vec<String>,
        message_type: Option<MessageType>,
        segment_count: usize,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            message_type,
            segment_count,
        }
    }

    /// A failed result with a single error
    pub fn failure(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new(), None, 0)
    }
}
