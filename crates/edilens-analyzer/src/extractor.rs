//! Structured field extraction
//!
//! Pulls parties, locations, references, dates and the type-specific
//! collections out of a segment list. Extraction never fails: missing or
//! malformed segments simply leave the corresponding field empty.

use crate::codes::{classify_location, party_code, LocationKind};
use edilens_domain::{
    Characteristic, DateTimeEntry, EnrichedSegment, ItemDescription, Measurement, MessageType,
    MonetaryAmount, Party, Price, Reference, Segment, StructuredInfo,
};
use edilens_registry::{CodeRegistry, CodeTable};
use tracing::debug;

/// Tags that end an MSCONS line item group
const GROUP_CLOSERS: [&str; 5] = ["LIN", "LOC", "NAD", "UNS", "UNT"];

/// Extracts [`StructuredInfo`] from segments
pub struct FieldExtractor<'a> {
    registry: &'a CodeRegistry,
}

impl<'a> FieldExtractor<'a> {
    /// Create an extractor using `registry` for labels
    pub fn new(registry: &'a CodeRegistry) -> Self {
        Self { registry }
    }

    /// Extract fields; the meaning table is left empty
    pub fn extract(&self, segments: &[EnrichedSegment], message_type: MessageType) -> StructuredInfo {
        let mut info = StructuredInfo::default();

        extract_parties(segments, &mut info);
        extract_locations(segments, &mut info);
        extract_references(segments, &mut info);
        self.extract_purpose(segments, &mut info);
        info.timestamps = segments
            .iter()
            .filter(|s| s.segment.is("DTM"))
            .map(|s| date_entry(&s.segment))
            .collect();

        match message_type {
            MessageType::Mscons => info.measurements = extract_measurements(segments),
            MessageType::Utilmd => info.characteristics = extract_characteristics(segments),
            MessageType::Invoic | MessageType::Remadv => {
                info.monetary_amounts = extract_amounts(segments)
            }
            MessageType::Quotes => {
                info.prices = extract_prices(segments);
                info.item_descriptions = extract_item_descriptions(segments);
            }
            _ => {}
        }

        debug!(
            "Extracted {} parties, {} references, {} measurements for {}",
            info.parties.len(),
            info.references.len(),
            info.measurements.len(),
            message_type
        );
        info
    }

    fn extract_purpose(&self, segments: &[EnrichedSegment], info: &mut StructuredInfo) {
        let Some(code) = segments
            .iter()
            .find(|s| s.segment.is("BGM"))
            .and_then(|s| s.segment.non_empty(0))
        else {
            return;
        };

        info.purpose = Some(
            self.registry
                .label(CodeTable::DocumentFunctions, code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Nachrichtenfunktion {}", code)),
        );
        info.message_function = Some(code.to_string());
    }
}

fn extract_parties(segments: &[EnrichedSegment], info: &mut StructuredInfo) {
    for enriched in segments.iter().filter(|s| s.segment.is("NAD")) {
        let qualifier = enriched.segment.qualifier().trim();
        if qualifier.is_empty() {
            continue;
        }
        // Address-only parties (NAD+DP in MSCONS) carry no code
        let code = party_code(&enriched.segment).unwrap_or_default();
        let name = enriched
            .resolved_meta
            .company_name
            .clone()
            .or_else(|| enriched.resolved_name(code).map(str::to_string));
        let party = Party {
            qualifier: qualifier.to_string(),
            code: code.to_string(),
            name,
        };

        let slot = match party.qualifier.as_str() {
            "MS" => Some(&mut info.sender),
            "MR" => Some(&mut info.receiver),
            "DP" => Some(&mut info.delivery_point),
            _ => None,
        };
        if let Some(slot) = slot {
            if slot.is_none() {
                *slot = Some(party.clone());
            }
        }
        info.parties.push(party);
    }
}

fn extract_locations(segments: &[EnrichedSegment], info: &mut StructuredInfo) {
    let locations: Vec<&Segment> = segments
        .iter()
        .map(|s| &s.segment)
        .filter(|s| s.is("LOC"))
        .collect();

    if let Some(id) = locations
        .iter()
        .find(|s| s.qualifier() == "172")
        .and_then(|s| s.non_empty(1))
    {
        match classify_location(id) {
            LocationKind::Metering => info.metering_location = Some(id.to_string()),
            LocationKind::Market => info.market_location = Some(id.to_string()),
        }
        return;
    }

    // Without a 172 location, fall back to the explicit MaLo/MeLo qualifiers
    for loc in locations {
        let target = match loc.qualifier() {
            "Z16" => &mut info.market_location,
            "Z17" => &mut info.metering_location,
            _ => continue,
        };
        if target.is_none() {
            *target = loc.non_empty(1).map(str::to_string);
        }
    }
}

fn extract_references(segments: &[EnrichedSegment], info: &mut StructuredInfo) {
    for rff in segments.iter().map(|s| &s.segment).filter(|s| s.is("RFF")) {
        let reference = Reference {
            qualifier: rff.qualifier().trim().to_string(),
            value: rff.element_or_empty(1).trim().to_string(),
        };
        if reference.qualifier == "MG" && info.meter_number.is_none() && !reference.value.is_empty() {
            info.meter_number = Some(reference.value.clone());
        }
        info.references.push(reference);
    }
}

fn date_entry(dtm: &Segment) -> DateTimeEntry {
    DateTimeEntry {
        qualifier: dtm.element_or_empty(0).trim().to_string(),
        value: dtm.element_or_empty(1).trim().to_string(),
        format: dtm.element_or_empty(2).trim().to_string(),
    }
}

/// Group MSCONS quantities by their LIN line item
fn extract_measurements(segments: &[EnrichedSegment]) -> Vec<Measurement> {
    let mut measurements = Vec::new();
    let mut group: Option<(String, String)> = None;
    let mut current: Option<Measurement> = None;

    for segment in segments.iter().map(|s| &s.segment) {
        if GROUP_CLOSERS.contains(&segment.tag.as_str()) {
            measurements.extend(current.take());
            group = segment.is("LIN").then(|| {
                let position = segment.element_or_empty(0).trim().to_string();
                let product = segment
                    .non_empty(2)
                    .or_else(|| segment.non_empty(1))
                    .unwrap_or("")
                    .to_string();
                (position, product)
            });
            continue;
        }

        let Some((position, product)) = group.as_mut() else {
            continue;
        };

        match segment.tag.as_str() {
            "PIA" if product.is_empty() => {
                if let Some(id) = segment.non_empty(1) {
                    *product = id.to_string();
                }
            }
            "QTY" => {
                measurements.extend(current.take());
                current = Some(Measurement {
                    position: position.clone(),
                    product: product.clone(),
                    qualifier: segment.element_or_empty(0).trim().to_string(),
                    quantity: segment.element_or_empty(1).trim().to_string(),
                    unit: segment.element_or_empty(2).trim().to_string(),
                    timestamps: Vec::new(),
                });
            }
            "DTM" => {
                if let Some(measurement) = current.as_mut() {
                    measurement.timestamps.push(date_entry(segment));
                }
            }
            _ => {}
        }
    }

    measurements.extend(current);
    measurements
}

fn extract_characteristics(segments: &[EnrichedSegment]) -> Vec<Characteristic> {
    segments
        .iter()
        .map(|s| &s.segment)
        .filter(|s| s.is("CCI"))
        .filter_map(|cci| {
            let values: Vec<String> = cci
                .elements
                .iter()
                .skip(1)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            let class_type = cci.qualifier().trim().to_string();
            (!class_type.is_empty() || !values.is_empty())
                .then_some(Characteristic { class_type, values })
        })
        .collect()
}

fn extract_amounts(segments: &[EnrichedSegment]) -> Vec<MonetaryAmount> {
    segments
        .iter()
        .map(|s| &s.segment)
        .filter(|s| s.is("MOA"))
        .map(|moa| MonetaryAmount {
            qualifier: moa.qualifier().trim().to_string(),
            amount: moa.element_or_empty(1).trim().to_string(),
            currency: moa.non_empty(2).map(str::to_string),
        })
        .collect()
}

fn extract_prices(segments: &[EnrichedSegment]) -> Vec<Price> {
    segments
        .iter()
        .map(|s| &s.segment)
        .filter(|s| s.is("PRI"))
        .map(|pri| Price {
            qualifier: pri.qualifier().trim().to_string(),
            amount: pri.element_or_empty(1).trim().to_string(),
            details: non_empty_from(pri, 2),
        })
        .collect()
}

fn extract_item_descriptions(segments: &[EnrichedSegment]) -> Vec<ItemDescription> {
    segments
        .iter()
        .map(|s| &s.segment)
        .filter(|s| s.is("IMD"))
        .map(|imd| ItemDescription {
            format: imd.qualifier().trim().to_string(),
            description: non_empty_from(imd, 1).join(" "),
        })
        .collect()
}

fn non_empty_from(segment: &Segment, start: usize) -> Vec<String> {
    segment
        .elements
        .iter()
        .skip(start)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
