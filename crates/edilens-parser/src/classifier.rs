//! Message type classification

use edilens_domain::{MessageType, Segment};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static UNH_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*UNH\+[^+]*\+\s*([A-Z0-9]+)").expect("UNH identifier pattern is valid")
});

/// Classify a message by its UNH header, falling back to segment heuristics
///
/// Never fails: anything unrecognisable is [`MessageType::Edifact`].
pub fn classify(segments: &[Segment]) -> MessageType {
    if let Some(unh) = segments.iter().find(|segment| segment.is("UNH")) {
        if let Some(message_type) = from_unh(unh) {
            debug!("Classified as {} from UNH", message_type);
            return message_type;
        }
        debug!("UNH present but message identifier unusable: {}", unh.original);
    }

    let message_type = from_heuristics(segments);
    if message_type.is_generic() {
        debug!("No heuristic matched {} segments, using generic type", segments.len());
    } else {
        debug!("Classified as {} from segment heuristics", message_type);
    }
    message_type
}

/// Identifier from `elements[1]`, else from the raw UNH text
fn from_unh(unh: &Segment) -> Option<MessageType> {
    let from_element = unh.non_empty(1).and_then(|identifier| {
        let identifier = identifier.split(':').next().unwrap_or(identifier);
        MessageType::parse(identifier)
    });

    from_element.or_else(|| {
        UNH_IDENTIFIER
            .captures(&unh.original)
            .and_then(|captures| captures.get(1))
            .and_then(|identifier| MessageType::parse(identifier.as_str()))
    })
}

fn from_heuristics(segments: &[Segment]) -> MessageType {
    let has = |tag: &str| segments.iter().any(|segment| segment.is(tag));

    if has("PRI") && has("LIN") && has("IMD") {
        MessageType::Quotes
    } else if has("LIN") && has("QTY") && !has("PRI") {
        MessageType::Mscons
    } else if has("IDE") && !has("MOA") {
        MessageType::Utilmd
    } else if has("MOA") {
        MessageType::Invoic
    } else {
        MessageType::Edifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(tag: &str, elements: &[&str]) -> Segment {
        let original = std::iter::once(tag)
            .chain(elements.iter().copied())
            .collect::<Vec<_>>()
            .join("+");
        Segment::new(tag, elements.iter().map(|e| e.to_string()).collect(), original)
    }

    #[test]
    fn test_classify_from_unh() {
        let unh = seg("UNH", &["1", "UTILMD", "D", "16B", "UN", "1.1"]);
        assert_eq!(classify(&[unh]), MessageType::Utilmd);
    }

    #[test]
    fn test_classify_strips_component_remnant() {
        let unh = seg("UNH", &["1", " remadv:D:05A "]);
        assert_eq!(classify(&[unh]), MessageType::Remadv);
    }

    #[test]
    fn test_classify_falls_back_to_original_text() {
        let unh = Segment::new("UNH", vec!["1".into()], "UNH+1+APERAK:D:07B:UN:2.1i");
        assert_eq!(classify(&[unh]), MessageType::Aperak);
    }

    #[test]
    fn test_unknown_unh_uses_heuristics() {
        let segments = vec![
            seg("UNH", &["1", "IFTSTA", "D", "18A"]),
            seg("LIN", &["1"]),
            seg("QTY", &["220", "5", "KWH"]),
        ];
        assert_eq!(classify(&segments), MessageType::Mscons);
    }

    #[test]
    fn test_heuristic_mscons() {
        let segments = vec![seg("LIN", &["1"]), seg("QTY", &["220", "12.5"])];
        assert_eq!(classify(&segments), MessageType::Mscons);
    }

    #[test]
    fn test_heuristic_quotes() {
        let segments = vec![
            seg("LIN", &["1"]),
            seg("IMD", &["F", "", "", "", "Arbeitspreis"]),
            seg("PRI", &["CAL", "12.34"]),
            seg("QTY", &["1", "1"]),
        ];
        assert_eq!(classify(&segments), MessageType::Quotes);
    }

    #[test]
    fn test_heuristic_utilmd_and_invoic() {
        assert_eq!(classify(&[seg("IDE", &["24", "ABC"])]), MessageType::Utilmd);
        assert_eq!(
            classify(&[seg("IDE", &["24", "ABC"]), seg("MOA", &["9", "10"])]),
            MessageType::Invoic
        );
    }

    #[test]
    fn test_heuristic_generic() {
        assert_eq!(classify(&[seg("FTX", &["AAI"])]), MessageType::Edifact);
        assert_eq!(classify(&[]), MessageType::Edifact);
        assert!(classify(&[]).is_generic());
        assert!(!classify(&[seg("LIN", &["1"]), seg("QTY", &["220:1:KWH"])]).is_generic());
    }
}
