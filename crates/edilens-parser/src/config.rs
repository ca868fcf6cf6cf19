//! Validator configuration

use serde::{Deserialize, Serialize};

/// Which structural checks the validator runs
///
/// Missing segments, UNH and UNT are always errors; the flags below control
/// the informational checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Compare the UNT segment count with the segments actually present
    pub check_segment_count: bool,

    /// Warn about segments without any element
    pub check_empty_segments: bool,

    /// Warn when a message lacks the segments its type normally carries
    pub check_type_expectations: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            check_segment_count: true,
            check_empty_segments: true,
            check_type_expectations: true,
        }
    }
}

impl ValidatorConfig {
    /// Only the blocking envelope checks
    pub fn permissive() -> Self {
        Self {
            check_segment_count: false,
            check_empty_segments: false,
            check_type_expectations: false,
        }
    }
}
