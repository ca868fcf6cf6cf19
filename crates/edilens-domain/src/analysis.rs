//! Analysis module - extracted fields and the aggregated analysis object

use crate::{EnrichedSegment, MessageType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of one analysis call, based on UUIDv7
///
/// Used to correlate log lines of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisId(u128);

impl AnalysisId {
    /// Generate a new id
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse an id from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid analysis id: {}", e))
    }

    /// Raw value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for AnalysisId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnalysisId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AnalysisId::from_string(&raw).map_err(serde::de::Error::custom)
    }
}

/// A party from an NAD segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Party qualifier (MS, MR, DP, ...)
    pub qualifier: String,

    /// Market participant code
    pub code: String,

    /// Company name resolved during enrichment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Party {
    /// `"<name> (<code>)"` when resolved, otherwise the bare code
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) if self.code.is_empty() => name.clone(),
            Some(name) => format!("{} ({})", name, self.code),
            None => self.code.clone(),
        }
    }
}

/// A date/time entry from a DTM segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeEntry {
    /// Date qualifier (137, 163, 164, ...)
    pub qualifier: String,

    /// Raw value
    pub value: String,

    /// Format code (102, 203, 303, ...)
    pub format: String,
}

/// A reference from an RFF segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference qualifier (Z13, MG, ACW, ...)
    pub qualifier: String,

    /// Reference value
    pub value: String,
}

/// One metered value from an MSCONS line item group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Line item number from LIN
    pub position: String,

    /// Product or OBIS identifier from LIN
    pub product: String,

    /// Quantity qualifier from QTY (220, 67, ...)
    pub qualifier: String,

    /// Quantity as written in the message
    pub quantity: String,

    /// Measure unit (KWH, MWH, ...)
    pub unit: String,

    /// Timestamps that belong to this quantity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timestamps: Vec<DateTimeEntry>,
}

/// A characteristic from a UTILMD CCI segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Class type code
    pub class_type: String,

    /// Remaining non-empty sub-fields (characteristic codes)
    pub values: Vec<String>,
}

/// A monetary amount from a MOA segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    /// Amount qualifier (9, 77, 124, ...)
    pub qualifier: String,

    /// Amount as written in the message
    pub amount: String,

    /// Currency, when given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A price from a QUOTES PRI segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Price qualifier (CAL, AAA, ...)
    pub qualifier: String,

    /// Price as written in the message
    pub amount: String,

    /// Remaining non-empty sub-fields (price type, basis, unit)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// An item description from a QUOTES IMD segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescription {
    /// Description format code
    pub format: String,

    /// Joined non-empty description sub-fields
    pub description: String,
}

/// One rendered row of the meaning table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTableRow {
    /// Tag, optionally suffixed with its first sub-field (e.g. `NAD+MS`)
    pub segment: String,

    /// Human-readable meaning
    pub meaning: String,

    /// Formatted value
    pub value: String,
}

impl SegmentTableRow {
    /// Create a row
    pub fn new(
        segment: impl Into<String>,
        meaning: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            segment: segment.into(),
            meaning: meaning.into(),
            value: value.into(),
        }
    }
}

/// Domain fields extracted from a message
///
/// Type-specific collections stay empty for message types they do not apply to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredInfo {
    /// Party with qualifier MS
    pub sender: Option<Party>,

    /// Party with qualifier MR
    pub receiver: Option<Party>,

    /// Party with qualifier DP
    pub delivery_point: Option<Party>,

    /// Marktlokation id
    pub market_location: Option<String>,

    /// Messlokation id
    pub metering_location: Option<String>,

    /// Meter number from RFF+MG
    pub meter_number: Option<String>,

    /// Label of the BGM document/function code
    pub purpose: Option<String>,

    /// Raw BGM document/function code
    pub message_function: Option<String>,

    /// All DTM entries
    pub timestamps: Vec<DateTimeEntry>,

    /// MSCONS measurements
    pub measurements: Vec<Measurement>,

    /// All NAD parties
    pub parties: Vec<Party>,

    /// All RFF references
    pub references: Vec<Reference>,

    /// UTILMD characteristics
    pub characteristics: Vec<Characteristic>,

    /// INVOIC/REMADV amounts
    pub monetary_amounts: Vec<MonetaryAmount>,

    /// QUOTES prices
    pub prices: Vec<Price>,

    /// QUOTES item descriptions
    pub item_descriptions: Vec<ItemDescription>,

    /// Rendered meaning table
    pub segment_table: Vec<SegmentTableRow>,
}

/// Counters from the enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentStats {
    /// Outbound collaborator calls issued
    pub lookups_attempted: usize,

    /// Calls that returned an error
    pub lookups_failed: usize,

    /// Segments that gained at least one resolved value
    pub segments_enriched: usize,
}

impl EnrichmentStats {
    /// Add another set of counters
    pub fn absorb(&mut self, other: EnrichmentStats) {
        self.lookups_attempted += other.lookups_attempted;
        self.lookups_failed += other.lookups_failed;
        self.segments_enriched += other.segments_enriched;
    }
}

/// The aggregated result of analysing one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAnalysis {
    /// Id of this analysis call
    pub id: AnalysisId,

    /// Classified message type
    pub message_type: MessageType,

    /// Segments with enrichment data
    pub segments: Vec<EnrichedSegment>,

    /// Extracted fields, including the meaning table
    pub structured_info: StructuredInfo,

    /// Detected business process
    pub business_process: Option<String>,

    /// Enrichment counters
    pub enrichment: EnrichmentStats,

    /// Set when the analysis could not be completed and this is a fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl MessageAnalysis {
    /// A fallback analysis carrying only the reason it was produced
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            id: AnalysisId::new(),
            message_type: MessageType::Edifact,
            segments: Vec::new(),
            structured_info: StructuredInfo::default(),
            business_process: None,
            enrichment: EnrichmentStats::default(),
            degraded: Some(reason.into()),
        }
    }

    /// Whether this is a fallback analysis
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// The rendered meaning table
    pub fn segment_table(&self) -> &[SegmentTableRow] {
        &self.structured_info.segment_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_id_string_round_trip() {
        let id = AnalysisId::new();
        let parsed = AnalysisId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.value(), parsed.value());
    }

    #[test]
    fn test_analysis_ids_sort_by_creation() {
        let first = AnalysisId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = AnalysisId::new();
        assert!(second.value() > first.value());
    }

    #[test]
    fn test_party_display() {
        let mut party = Party {
            qualifier: "MS".into(),
            code: "9900000000001".into(),
            name: None,
        };
        assert_eq!(party.display(), "9900000000001");

        party.name = Some("Netz GmbH".into());
        assert_eq!(party.display(), "Netz GmbH (9900000000001)");

        party.code.clear();
        assert_eq!(party.display(), "Netz GmbH");
    }

    #[test]
    fn test_degraded_analysis() {
        let analysis = MessageAnalysis::degraded("boom");
        assert!(analysis.is_degraded());
        assert!(analysis.segment_table().is_empty());
        assert_eq!(analysis.message_type, MessageType::Edifact);
    }

    #[test]
    fn test_structured_info_uses_camel_case() {
        let info = StructuredInfo {
            market_location: Some("51238696781".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["marketLocation"], "51238696781");
        assert!(json["segmentTable"].as_array().unwrap().is_empty());
    }
}
