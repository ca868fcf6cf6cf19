//! Business process detection

use crate::codes::clean_code;
use edilens_domain::{MessageType, Segment};
use edilens_registry::{CodeRegistry, CodeTable};

/// DTM+163 value fragments that mark a season boundary reading
const SEASON_MARKERS: [&str; 2] = ["2301", "2312"];

/// Number of QTY segments above which an MSCONS is a periodic reading
const PERIODIC_QTY_THRESHOLD: usize = 4;

/// Detect the business process a message belongs to
///
/// Returns `None` only for generic EDIFACT messages.
pub fn classify_business_process(
    segments: &[Segment],
    message_type: MessageType,
    registry: &CodeRegistry,
) -> Option<String> {
    let generic = || {
        registry
            .label(CodeTable::GenericProcesses, message_type.as_str())
            .map(str::to_string)
    };
    let bgm_code = first_code(segments, "BGM");
    let from_table = |table: CodeTable, code: Option<&str>| {
        code.and_then(|code| registry.label(table, code))
            .map(str::to_string)
    };

    match message_type {
        MessageType::Utilmd => utilmd_process(segments, registry)
            .or_else(|| from_table(CodeTable::UtilmdFunctionProcesses, bgm_code))
            .or_else(generic),
        MessageType::Mscons => mscons_process(segments, bgm_code, registry).or_else(generic),
        MessageType::Invoic => {
            from_table(CodeTable::InvoicDocumentProcesses, bgm_code).or_else(generic)
        }
        MessageType::Remadv => {
            from_table(CodeTable::RemadvDocumentProcesses, first_code(segments, "DOC"))
                .or_else(generic)
        }
        MessageType::Orders => {
            from_table(CodeTable::OrdersDocumentProcesses, bgm_code).or_else(generic)
        }
        MessageType::Quotes => {
            from_table(CodeTable::QuotesDocumentProcesses, bgm_code).or_else(generic)
        }
        MessageType::Aperak | MessageType::Contrl => {
            from_table(CodeTable::AcknowledgementProcesses, bgm_code).or_else(generic)
        }
        MessageType::Edifact => None,
    }
}

/// Regulatory framework of a process id
pub fn process_framework(process_id: &str) -> Option<&'static str> {
    if process_id.starts_with("44") {
        Some("GPKE")
    } else if process_id.starts_with("55") {
        Some("WiM")
    } else {
        None
    }
}

fn first_code<'s>(segments: &'s [Segment], tag: &str) -> Option<&'s str> {
    segments
        .iter()
        .find(|segment| segment.is(tag))
        .and_then(|segment| segment.non_empty(0))
}

fn utilmd_process(segments: &[Segment], registry: &CodeRegistry) -> Option<String> {
    let process_id = segments
        .iter()
        .find(|segment| segment.is_qualified("RFF", "Z13"))
        .and_then(|segment| segment.non_empty(1))
        .map(clean_code)?;
    let label = registry.label(CodeTable::ProcessIds, &process_id)?;

    Some(match process_framework(&process_id) {
        Some(framework) => format!("{} {}: {}", framework, process_id, label),
        None => format!("{}: {}", process_id, label),
    })
}

fn mscons_process(
    segments: &[Segment],
    bgm_code: Option<&str>,
    registry: &CodeRegistry,
) -> Option<String> {
    let reading = match bgm_code? {
        "E01" => {
            let season_reading = segments
                .iter()
                .filter(|segment| segment.is_qualified("DTM", "163"))
                .filter_map(|segment| segment.element(1))
                .any(|value| SEASON_MARKERS.iter().any(|marker| value.contains(marker)));
            let quantities = segments.iter().filter(|segment| segment.is("QTY")).count();

            if season_reading {
                "annual"
            } else if quantities > PERIODIC_QTY_THRESHOLD {
                "periodic"
            } else {
                "interim"
            }
        }
        "7" => "master_data",
        _ => return None,
    };
    registry
        .label(CodeTable::MsconsReadings, reading)
        .map(str::to_string)
}
