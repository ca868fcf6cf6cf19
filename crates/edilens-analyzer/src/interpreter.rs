//! Segment interpretation into meaning table rows

use crate::codes::{classify_location, format_edifact_datetime, party_code};
use crate::resolver::ResolverChain;
use edilens_domain::{EnrichedSegment, Segment, SegmentTableRow};
use edilens_registry::{CodeRegistry, CodeTable};
use tracing::debug;

/// Tags that never get a row of their own
pub const EXCLUDED_TAGS: [&str; 5] = ["UNA", "UNB", "UNZ", "UNT", "UNS"];

/// Tags whose first sub-field is a qualifier shown in the segment column
const QUALIFIED_TAGS: [&str; 10] = ["NAD", "LOC", "RFF", "DTM", "QTY", "MOA", "PRI", "IDE", "CCI", "FTX"];

/// Renders segments into [`SegmentTableRow`]s
pub struct SegmentInterpreter<'a> {
    registry: &'a CodeRegistry,
    document_functions: ResolverChain<'a>,
    statuses: ResolverChain<'a>,
    process_ids: ResolverChain<'a>,
    include_process_row: bool,
}

impl<'a> SegmentInterpreter<'a> {
    /// Create an interpreter with the standard resolver chains
    pub fn new(registry: &'a CodeRegistry) -> Self {
        Self {
            registry,
            document_functions: ResolverChain::document_function(registry),
            statuses: ResolverChain::status(registry),
            process_ids: ResolverChain::process_id(registry),
            include_process_row: true,
        }
    }

    /// Whether a detected business process becomes the first row
    pub fn with_process_row(mut self, include: bool) -> Self {
        self.include_process_row = include;
        self
    }

    /// Build the meaning table
    pub fn interpret(
        &self,
        segments: &[EnrichedSegment],
        business_process: Option<&str>,
    ) -> Vec<SegmentTableRow> {
        let mut rows = Vec::with_capacity(segments.len() + 2);

        if self.include_process_row {
            if let Some(process) = business_process.filter(|p| !p.trim().is_empty()) {
                rows.push(SegmentTableRow::new("Prozess", "Geschäftsprozess", process));
            }
        }

        rows.extend(
            segments
                .iter()
                .filter(|s| !EXCLUDED_TAGS.contains(&s.tag()))
                .map(|s| self.interpret_segment(s)),
        );

        if let Some(reference) = segments
            .iter()
            .find(|s| s.segment.is("UNZ"))
            .and_then(|s| s.segment.non_empty(1))
        {
            rows.push(SegmentTableRow::new("UNZ", "Austauschreferenz", reference));
        }

        debug!("Interpreted {} segments into {} rows", segments.len(), rows.len());
        rows
    }

    /// Render one segment
    pub fn interpret_segment(&self, enriched: &EnrichedSegment) -> SegmentTableRow {
        let segment = &enriched.segment;
        let (meaning, value) = match segment.tag.as_str() {
            "UNH" => ("Nachrichtenkopf".to_string(), message_header(segment)),
            "BGM" => self.document_function(enriched),
            "STS" => self.status(enriched),
            "DTM" => (
                self.qualified_label(CodeTable::DateQualifiers, segment, "Datum"),
                format_edifact_datetime(segment.element_or_empty(1)),
            ),
            "NAD" => (
                self.qualified_label(CodeTable::PartyQualifiers, segment, "Partei"),
                party_value(enriched),
            ),
            "LOC" => (self.location_label(segment), segment.element_or_empty(1).trim().to_string()),
            "RFF" => (
                self.qualified_label(CodeTable::ReferenceQualifiers, segment, "Referenz"),
                self.reference_value(enriched),
            ),
            "QTY" => (
                self.qualified_label(CodeTable::QuantityQualifiers, segment, "Menge"),
                join_present(segment, &[1, 2], " "),
            ),
            "PRI" => (
                self.qualified_label(CodeTable::PriceQualifiers, segment, "Preis"),
                join_from(segment, 1, " "),
            ),
            "MOA" => (
                self.qualified_label(CodeTable::AmountQualifiers, segment, "Betrag"),
                join_present(segment, &[1, 2], " "),
            ),
            "LIN" => (
                format!("Position {}", segment.element_or_empty(0).trim()),
                segment
                    .non_empty(2)
                    .or_else(|| segment.non_empty(1))
                    .unwrap_or("")
                    .to_string(),
            ),
            "IMD" => ("Beschreibung".to_string(), join_from(segment, 1, " ")),
            "DOC" => ("Dokument".to_string(), self.document_value(segment)),
            "CUX" => (
                "Währung".to_string(),
                segment
                    .non_empty(1)
                    .or_else(|| segment.non_empty(0))
                    .unwrap_or("")
                    .to_string(),
            ),
            _ => (segment.description.clone(), join_from(segment, 0, " : ")),
        };

        SegmentTableRow::new(segment_column(segment), meaning, value)
    }

    fn document_function(&self, enriched: &EnrichedSegment) -> (String, String) {
        let segment = &enriched.segment;
        let code = segment.element_or_empty(0).trim();
        let mut value = labelled(code, self.document_functions.resolve(code, enriched));
        if let Some(number) = segment.non_empty(1) {
            value = format!("{}, Dokumentnummer {}", value, number);
        }
        ("Nachrichtenfunktion".to_string(), value)
    }

    fn status(&self, enriched: &EnrichedSegment) -> (String, String) {
        let segment = &enriched.segment;
        let code = segment
            .non_empty(2)
            .or_else(|| segment.non_empty(0))
            .unwrap_or("");
        ("Status".to_string(), labelled(code, self.statuses.resolve(code, enriched)))
    }

    fn reference_value(&self, enriched: &EnrichedSegment) -> String {
        let segment = &enriched.segment;
        let value = segment.element_or_empty(1).trim();
        if segment.qualifier() != "Z13" {
            return value.to_string();
        }
        match self.process_ids.resolve(value, enriched) {
            Some(label) => format!("{}: {}", value, label),
            None => value.to_string(),
        }
    }

    fn document_value(&self, segment: &Segment) -> String {
        let code = segment.element_or_empty(0).trim();
        let label = self
            .registry
            .label(CodeTable::DocumentTypes, code)
            .map(str::to_string);
        let value = labelled(code, label);
        match segment.non_empty(1) {
            Some(number) => format!("{}, Nummer {}", value, number),
            None => value,
        }
    }

    fn location_label(&self, segment: &Segment) -> String {
        if segment.qualifier() == "172" {
            return classify_location(segment.element_or_empty(1)).label().to_string();
        }
        self.qualified_label(CodeTable::LocationQualifiers, segment, "Ort")
    }

    fn qualified_label(&self, table: CodeTable, segment: &Segment, fallback: &str) -> String {
        let qualifier = segment.qualifier().trim();
        self.registry
            .label(table, qualifier)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", fallback, qualifier).trim_end().to_string())
    }
}

fn segment_column(segment: &Segment) -> String {
    match segment.non_empty(0) {
        Some(qualifier) if QUALIFIED_TAGS.contains(&segment.tag.as_str()) => {
            format!("{}+{}", segment.tag, qualifier)
        }
        _ => segment.tag.clone(),
    }
}

fn message_header(segment: &Segment) -> String {
    let identifier = join_from(segment, 1, ":");
    match segment.non_empty(0) {
        Some(reference) if !identifier.is_empty() => {
            format!("{} (Referenz {})", identifier, reference)
        }
        _ => identifier,
    }
}

fn party_value(enriched: &EnrichedSegment) -> String {
    let Some(code) = party_code(&enriched.segment) else {
        return String::new();
    };
    let name = enriched
        .resolved_meta
        .company_name
        .as_deref()
        .or_else(|| enriched.resolved_name(code));
    match name {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    }
}

fn labelled(code: &str, label: Option<String>) -> String {
    match label {
        Some(label) => format!("{} ({})", label, code),
        None => code.to_string(),
    }
}

fn join_present(segment: &Segment, indices: &[usize], separator: &str) -> String {
    indices
        .iter()
        .filter_map(|i| segment.non_empty(*i))
        .collect::<Vec<_>>()
        .join(separator)
}

fn join_from(segment: &Segment, start: usize, separator: &str) -> String {
    segment
        .elements
        .iter()
        .skip(start)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edilens_domain::ResolvedMeta;
    use edilens_parser::tokenize;
    use std::collections::BTreeMap;

    fn rows(text: &str, process: Option<&str>) -> Vec<SegmentTableRow> {
        let segments: Vec<EnrichedSegment> = tokenize(text)
            .unwrap()
            .into_iter()
            .map(EnrichedSegment::from)
            .collect();
        SegmentInterpreter::new(CodeRegistry::builtin()).interpret(&segments, process)
    }

    fn row(text: &str) -> SegmentTableRow {
        rows(text, None).remove(0)
    }

    #[test]
    fn test_envelope_excluded_and_synthetic_rows() {
        let table = rows(
            "UNA:+.? 'UNB+UNOC:3+9900000000001:500+9900000000002:500+250904:2320+REF42'\
             UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'UNT+3+1'UNZ+1+REF42'",
            Some("GPKE 44009: Kündigung der Belieferung"),
        );
        let tags: Vec<&str> = table.iter().map(|r| r.segment.as_str()).collect();
        assert_eq!(tags, vec!["Prozess", "UNH", "BGM", "UNZ"]);
        assert_eq!(table[0].value, "GPKE 44009: Kündigung der Belieferung");
        assert_eq!(table[3].meaning, "Austauschreferenz");
        assert_eq!(table[3].value, "REF42");
    }

    #[test]
    fn test_process_row_can_be_disabled() {
        let segments = vec![EnrichedSegment::from(Segment::new("BGM", vec!["E01".into()], "BGM+E01"))];
        let table = SegmentInterpreter::new(CodeRegistry::builtin())
            .with_process_row(false)
            .interpret(&segments, Some("GPKE"));
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].segment, "BGM");
    }

    #[test]
    fn test_header_and_document_function() {
        assert_eq!(row("UNH+1+UTILMD:D:16B:UN:1.1'").value, "UTILMD:D:16B:UN:1.1 (Referenz 1)");
        let bgm = row("BGM+E02+DOC-77'");
        assert_eq!(bgm.meaning, "Nachrichtenfunktion");
        assert_eq!(bgm.value, "Abmeldung (E02), Dokumentnummer DOC-77");
        assert_eq!(row("BGM+Z88'").value, "Z88");
    }

    #[test]
    fn test_status_prefers_third_element() {
        assert_eq!(row("STS+7++E15'").value, "Zustimmung (E15)");
        assert_eq!(row("STS+E14'").value, "Ablehnung, sonstiges (E14)");
    }

    #[test]
    fn test_dates() {
        let dtm = row("DTM+137:202509042320:203'");
        assert_eq!(dtm.segment, "DTM+137");
        assert_eq!(dtm.meaning, "Dokumentdatum");
        assert_eq!(dtm.value, "04.09.2025 23:20");
        assert_eq!(row("DTM+92:20250904:102'").value, "04.09.2025");
        assert_eq!(row("DTM+999:1230:ZZZ'").meaning, "Datum 999");
    }

    #[test]
    fn test_party_rows() {
        let nad = row("NAD+MS+9900000000001::293'");
        assert_eq!(nad.segment, "NAD+MS");
        assert_eq!(nad.meaning, "Absender (MSB)");
        assert_eq!(nad.value, "9900000000001");
        assert_eq!(row("NAD+Z99+123'").meaning, "Partei Z99");
    }

    #[test]
    fn test_party_row_with_resolved_name() {
        let segment = EnrichedSegment::from(Segment::new(
            "NAD",
            vec!["MR".into(), "9900000000002".into()],
            "NAD+MR+9900000000002",
        ));
        let meta = ResolvedMeta {
            company_name: Some("Netz Musterstadt GmbH".into()),
            ..Default::default()
        };
        let segment = segment.with_resolved(&BTreeMap::new(), &meta);
        let row = SegmentInterpreter::new(CodeRegistry::builtin()).interpret_segment(&segment);
        assert_eq!(row.value, "Netz Musterstadt GmbH (9900000000002)");
    }

    #[test]
    fn test_location_rows() {
        let loc = row("LOC+172+DE0001234567890123456789'");
        assert_eq!(loc.meaning, "Messlokation (MeLo)");
        assert_eq!(loc.value, "DE0001234567890123456789");
        assert_eq!(row("LOC+172+51238696781'").meaning, "Marktlokation (MaLo)");
        assert_eq!(row("LOC+Z18+E1234'").meaning, "Netzlokation");
    }

    #[test]
    fn test_process_reference_chain() {
        assert_eq!(row("RFF+Z13+44009'").value, "44009: Kündigung der Belieferung");
        assert_eq!(row("RFF+Z13+49999'").value, "49999");

        let segment = EnrichedSegment::from(Segment::new(
            "RFF",
            vec!["Z13".into(), "49999".into()],
            "RFF+Z13+49999",
        ))
        .with_resolved(
            &BTreeMap::new(),
            &ResolvedMeta {
                process_description: Some("49999 Sonderprozess".into()),
                ..Default::default()
            },
        );
        let row = SegmentInterpreter::new(CodeRegistry::builtin()).interpret_segment(&segment);
        assert_eq!(row.value, "49999: 49999 Sonderprozess");
        assert_eq!(row.meaning, "Prüfidentifikator");
    }

    #[test]
    fn test_fixed_layouts() {
        assert_eq!(row("QTY+220:4250.5:KWH'").value, "4250.5 KWH");
        assert_eq!(row("QTY+220:4250.5:KWH'").meaning, "Wahrer Wert");
        assert_eq!(row("MOA+9:1234.56:EUR'").meaning, "Betrag zu zahlen");
        assert_eq!(row("MOA+9:1234.56:EUR'").value, "1234.56 EUR");
        assert_eq!(row("PRI+CAL:12.5:CT'").value, "12.5 CT");
        assert_eq!(row("LIN+1++1-1?:1.8.1:SRW'").meaning, "Position 1");
        assert_eq!(row("LIN+1++1-1?:1.8.1:SRW'").value, "1-1:1.8.1");
        assert_eq!(row("IMD+F++:::Arbeitspreis'").value, "Arbeitspreis");
        assert_eq!(row("DOC+380+R-2025-1'").value, "Rechnung (380), Nummer R-2025-1");
        assert_eq!(row("CUX+2:EUR:4'").value, "EUR");
    }

    #[test]
    fn test_default_layout_and_missing_data() {
        let ide = row("IDE+24+VORGANG1'");
        assert_eq!(ide.segment, "IDE+24");
        assert_eq!(ide.meaning, "Identifikation (Vorgang)");
        assert_eq!(ide.value, "24 : VORGANG1");

        let empty = row("NAD'");
        assert_eq!(empty.segment, "NAD");
        assert_eq!(empty.value, "");
        assert_eq!(empty.meaning, "Partei");
    }
}
