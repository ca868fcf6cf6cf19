//! Segment module - the tokenized unit of an EDIFACT message

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description used when a tag is missing from the segment dictionary
pub const UNKNOWN_SEGMENT: &str = "Unknown Segment";

/// A single message segment
///
/// `elements` holds every sub-field after the tag in one flat list; element
/// and component separators are not distinguished, so `NAD+MS+123::293`
/// yields `["MS", "123", "", "293"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Upper-case segment tag (e.g. `NAD`)
    pub tag: String,

    /// Sub-fields after the tag, in order
    pub elements: Vec<String>,

    /// Raw segment text as it appeared in the message
    pub original: String,

    /// Static description of the tag
    pub description: String,
}

impl Segment {
    /// Create a segment with the default description
    pub fn new(tag: impl Into<String>, elements: Vec<String>, original: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_uppercase(),
            elements,
            original: original.into(),
            description: UNKNOWN_SEGMENT.to_string(),
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Element at `index`, or `None` when absent
    pub fn element(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    /// Element at `index` when present and not blank
    pub fn non_empty(&self, index: usize) -> Option<&str> {
        self.element(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Element at `index`, or an empty string
    pub fn element_or_empty(&self, index: usize) -> &str {
        self.element(index).unwrap_or("")
    }

    /// First element, which is the qualifier for most tags
    pub fn qualifier(&self) -> &str {
        self.element_or_empty(0)
    }

    /// Whether this segment has the given tag
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Whether this segment has the given tag and qualifier
    pub fn is_qualified(&self, tag: &str, qualifier: &str) -> bool {
        self.tag == tag && self.qualifier() == qualifier
    }
}

/// Named annotations attached by the enrichment pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMeta {
    /// Company behind a party code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// Contact roles of that company
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_roles: Vec<String>,

    /// Semantic description of a BGM or STS code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_description: Option<String>,

    /// Semantic description of an RFF+Z13 process id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_description: Option<String>,
}

impl ResolvedMeta {
    /// Whether nothing has been resolved
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.contact_roles.is_empty()
            && self.code_description.is_none()
            && self.process_description.is_none()
    }

    /// Merge `other` into a copy of `self`
    ///
    /// Values from `other` win when present; contact roles are unioned
    /// without duplicates, keeping first-seen order.
    pub fn merged(&self, other: &ResolvedMeta) -> ResolvedMeta {
        let mut contact_roles = self.contact_roles.clone();
        for role in &other.contact_roles {
            if !contact_roles.contains(role) {
                contact_roles.push(role.clone());
            }
        }

        ResolvedMeta {
            company_name: other.company_name.clone().or_else(|| self.company_name.clone()),
            contact_roles,
            code_description: other
                .code_description
                .clone()
                .or_else(|| self.code_description.clone()),
            process_description: other
                .process_description
                .clone()
                .or_else(|| self.process_description.clone()),
        }
    }
}

/// A segment together with everything the enrichment pass resolved for it
///
/// Enrichment never touches `segment`; it produces a new `EnrichedSegment`
/// with more entries in `resolved_codes` / `resolved_meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedSegment {
    /// The untouched source segment
    #[serde(flatten)]
    pub segment: Segment,

    /// Raw code → resolved company name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resolved_codes: BTreeMap<String, String>,

    /// Named annotations
    #[serde(default, skip_serializing_if = "ResolvedMeta::is_empty")]
    pub resolved_meta: ResolvedMeta,
}

impl EnrichedSegment {
    /// Tag of the underlying segment
    pub fn tag(&self) -> &str {
        &self.segment.tag
    }

    /// Resolved name for a raw code, if any
    pub fn resolved_name(&self, code: &str) -> Option<&str> {
        self.resolved_codes.get(code).map(String::as_str)
    }

    /// Whether any enrichment data is attached
    pub fn is_enriched(&self) -> bool {
        !self.resolved_codes.is_empty() || !self.resolved_meta.is_empty()
    }

    /// Return a new value with additional resolved data merged in
    pub fn with_resolved(
        &self,
        resolved_codes: &BTreeMap<String, String>,
        resolved_meta: &ResolvedMeta,
    ) -> EnrichedSegment {
        let mut codes = self.resolved_codes.clone();
        for (code, name) in resolved_codes {
            codes.insert(code.clone(), name.clone());
        }

        EnrichedSegment {
            segment: self.segment.clone(),
            resolved_codes: codes,
            resolved_meta: self.resolved_meta.merged(resolved_meta),
        }
    }
}

impl From<Segment> for EnrichedSegment {
    fn from(segment: Segment) -> Self {
        Self {
            segment,
            resolved_codes: BTreeMap::new(),
            resolved_meta: ResolvedMeta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nad() -> Segment {
        Segment::new(
            "nad",
            vec!["MS".into(), "9900000000001".into(), "".into(), "293".into()],
            "NAD+MS+9900000000001::293",
        )
    }

    #[test]
    fn test_tag_is_uppercased() {
        assert_eq!(nad().tag, "NAD");
        assert_eq!(nad().description, UNKNOWN_SEGMENT);
    }

    #[test]
    fn test_element_accessors() {
        let segment = nad();
        assert_eq!(segment.qualifier(), "MS");
        assert_eq!(segment.element(1), Some("9900000000001"));
        assert_eq!(segment.non_empty(2), None);
        assert_eq!(segment.element_or_empty(9), "");
        assert!(segment.is_qualified("NAD", "MS"));
    }

    #[test]
    fn test_merge_deduplicates_roles() {
        let first = ResolvedMeta {
            company_name: Some("Stadtwerke".into()),
            contact_roles: vec!["LF".into(), "MSB".into()],
            ..Default::default()
        };
        let second = ResolvedMeta {
            contact_roles: vec!["MSB".into(), "NB".into()],
            ..Default::default()
        };

        let merged = first.merged(&second);
        assert_eq!(merged.company_name.as_deref(), Some("Stadtwerke"));
        assert_eq!(merged.contact_roles, vec!["LF", "MSB", "NB"]);

        // Merging the same data again changes nothing
        assert_eq!(merged.merged(&second), merged);
    }

    #[test]
    fn test_with_resolved_keeps_source_segment() {
        let enriched = EnrichedSegment::from(nad());
        let mut codes = BTreeMap::new();
        codes.insert("9900000000001".to_string(), "Netz GmbH".to_string());

        let updated = enriched.with_resolved(&codes, &ResolvedMeta::default());
        assert_eq!(updated.segment, enriched.segment);
        assert_eq!(updated.resolved_name("9900000000001"), Some("Netz GmbH"));
        assert!(!enriched.is_enriched());
        assert!(updated.is_enriched());
    }
}
