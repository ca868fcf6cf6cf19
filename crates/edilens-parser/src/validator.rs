//! Structural message validation

use crate::{classify, tokenize_with, ValidatorConfig};
use edilens_domain::{MessageType, Segment, ValidationResult};
use edilens_registry::CodeRegistry;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// Interchange envelope tags, excluded from the UNT segment count
pub const ENVELOPE_TAGS: [&str; 3] = ["UNA", "UNB", "UNZ"];

/// Checks envelope and segment-count consistency of a raw message
pub struct MessageValidator {
    config: ValidatorConfig,
}

impl MessageValidator {
    /// Create a validator with the given configuration
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidatorConfig::default())
    }

    /// Validate raw message text
    ///
    /// Never panics and never returns an error: anything unexpected becomes a
    /// single error entry with `is_valid = false`.
    pub fn validate(&self, text: &str) -> ValidationResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_checks(text))) {
            Ok(result) => result,
            Err(cause) => {
                let reason = cause
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| cause.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown cause".to_string());
                error!("Validation aborted: {}", reason);
                ValidationResult::failure(format!("Validation failed unexpectedly: {}", reason))
            }
        }
    }

    fn run_checks(&self, text: &str) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. At least one segment
        let segments = match tokenize_with(text, CodeRegistry::builtin()) {
            Ok(segments) => segments,
            Err(e) => {
                errors.push(format!("No segments found: {}", e));
                return ValidationResult::new(errors, warnings, None, 0);
            }
        };

        let message_type = classify(&segments);

        // 2. Header and trailer
        if !segments.iter().any(|segment| segment.is("UNH")) {
            errors.push("Missing UNH segment (message header)".to_string());
        }

        let unt = segments.iter().find(|segment| segment.is("UNT"));
        if unt.is_none() {
            errors.push("Missing UNT segment (message trailer)".to_string());
        }

        // 3. UNT segment count
        if self.config.check_segment_count {
            if let Some(warning) = unt.and_then(|unt| self.check_segment_count(unt, &segments)) {
                warnings.push(warning);
            }
        }

        // 4. Segments without elements
        if self.config.check_empty_segments {
            for (index, segment) in segments.iter().enumerate() {
                if segment.elements.is_empty() {
                    warnings.push(format!(
                        "Segment {} at position {} has no elements",
                        segment.tag,
                        index + 1
                    ));
                }
            }
        }

        // 5. Type-specific expectations
        if self.config.check_type_expectations {
            warnings.extend(self.check_type_expectations(message_type, &segments));
        }

        debug!(
            "Validated {} segments: {} errors, {} warnings",
            segments.len(),
            errors.len(),
            warnings.len()
        );

        ValidationResult::new(errors, warnings, Some(message_type), segments.len())
    }

    /// Compare UNT's declared count with the non-envelope segments
    fn check_segment_count(&self, unt: &Segment, segments: &[Segment]) -> Option<String> {
        let declared: usize = unt.non_empty(0)?.parse().ok()?;
        let actual = segments
            .iter()
            .filter(|segment| !ENVELOPE_TAGS.contains(&segment.tag.as_str()))
            .count();

        (declared != actual).then(|| {
            format!(
                "UNT declares {} segments but the message contains {}",
                declared, actual
            )
        })
    }

    fn check_type_expectations(&self, message_type: MessageType, segments: &[Segment]) -> Vec<String> {
        let expected: &[(&str, &str)] = match message_type {
            MessageType::Mscons => &[("LIN", "MSCONS message without LIN segment (no line items)")],
            MessageType::Utilmd => &[("NAD", "UTILMD message without NAD segment (no parties)")],
            _ => &[],
        };

        expected
            .iter()
            .filter(|(tag, _)| !segments.iter().any(|segment| segment.is(tag)))
            .map(|(_, warning)| warning.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTILMD: &str = "UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'NAD+MS+9900000000001::293'RFF+Z13+44009'UNT+5+1'";

    #[test]
    fn test_valid_message() {
        let result = MessageValidator::default_config().validate(UTILMD);
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.message_type, Some(MessageType::Utilmd));
        assert_eq!(result.segment_count, 5);
    }

    #[test]
    fn test_missing_unt_is_error() {
        let result = MessageValidator::default_config()
            .validate("UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'NAD+MS+9900000000001::293'");
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("UNT")));
    }

    #[test]
    fn test_missing_unh_is_error() {
        let result = MessageValidator::default_config().validate("BGM+E02'UNT+2+1'");
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("UNH")));
    }

    #[test]
    fn test_count_mismatch_is_warning_only() {
        let text = UTILMD.replace("UNT+5+1", "UNT+4+1");
        let result = MessageValidator::default_config().validate(&text);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("UNT declares 4"));
    }

    #[test]
    fn test_envelope_excluded_from_count() {
        let text = format!("UNA:+.? 'UNB+UNOC:3+9900000000001:500+9900000000002:500+250904:2320+REF1'{}UNZ+1+REF1'", UTILMD);
        let result = MessageValidator::default_config().validate(&text);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.segment_count, 8);
    }

    #[test]
    fn test_non_numeric_count_is_ignored() {
        let text = UTILMD.replace("UNT+5+1", "UNT+X+1");
        let result = MessageValidator::default_config().validate(&text);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_segment_warning() {
        let text = "UNH+1+ORDERS:D:09B:UN:1.0b'UNS'UNT+3+1'";
        let result = MessageValidator::default_config().validate(text);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("UNS")));
    }

    #[test]
    fn test_type_expectations() {
        let mscons = "UNH+1+MSCONS:D:04B:UN:2.4c'BGM+7'UNT+3+1'";
        let result = MessageValidator::default_config().validate(mscons);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("LIN")));

        let utilmd = "UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'UNT+3+1'";
        let result = MessageValidator::default_config().validate(utilmd);
        assert!(result.warnings.iter().any(|w| w.contains("NAD")));
    }

    #[test]
    fn test_permissive_skips_soft_checks() {
        let text = "UNH+1+MSCONS:D:04B:UN:2.4c'BGM+7'UNS'UNT+9+1'";
        let result = MessageValidator::new(ValidatorConfig::permissive()).validate(text);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let result = MessageValidator::default_config().validate("   ");
        assert!(!result.is_valid);
        assert_eq!(result.segment_count, 0);
        assert_eq!(result.message_type, None);
    }
}
