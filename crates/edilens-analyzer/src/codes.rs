//! Shared code heuristics: energy codes, location ids, party codes, dates

use edilens_domain::Segment;
use regex::Regex;
use std::sync::LazyLock;

/// BDEW (13 digits), EIC (`10Y`/`13Y`/`16Y` + 11–13 chars) and 9-prefixed GLN-style codes
static ENERGY_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{13}|(?:10|13|16)Y[A-Za-z0-9]{11,13}|9\d{11,12})$")
        .expect("energy code pattern is valid")
});

/// Kind of a LOC id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Marktlokation (MaLo)
    Market,
    /// Messlokation (MeLo)
    Metering,
}

impl LocationKind {
    /// Display label used in the meaning table
    pub fn label(&self) -> &'static str {
        match self {
            LocationKind::Market => "Marktlokation (MaLo)",
            LocationKind::Metering => "Messlokation (MeLo)",
        }
    }
}

/// Whether `value` looks like a market participant code worth resolving
pub fn is_energy_code(value: &str) -> bool {
    ENERGY_CODE.is_match(value.trim())
}

/// Classify a location id by its shape
///
/// `DE` ids of 18 to 29 characters are Messlokationen; everything else,
/// including ids of 30 characters or more, is treated as a Marktlokation.
pub fn classify_location(id: &str) -> LocationKind {
    let id = id.trim();
    let len = id.chars().count();
    if id.starts_with("DE") && (18..30).contains(&len) {
        LocationKind::Metering
    } else {
        LocationKind::Market
    }
}

/// Party code of an NAD segment
///
/// The participant id sits in `elements[1]`; `elements[2]` is only used when
/// that slot is empty, because in the flat element list it normally carries
/// the (empty) component after the id rather than the id itself. When both
/// slots are filled, `elements[1]` wins; keep this order.
pub fn party_code(nad: &Segment) -> Option<&str> {
    nad.non_empty(1).or_else(|| nad.non_empty(2))
}

/// Drop release-character remnants and whitespace from a code
pub fn clean_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '?' && !c.is_whitespace())
        .collect()
}

/// Render an EDIFACT date value
///
/// `CCYYMMDDHHMM…` becomes `DD.MM.YYYY HH:MM`, `CCYYMMDD` becomes
/// `DD.MM.YYYY`; anything else is returned cleaned but unformatted.
/// Time zone suffixes such as `?+00` are ignored.
pub fn format_edifact_datetime(raw: &str) -> String {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '?').collect();
    let digits: String = cleaned.chars().take_while(char::is_ascii_digit).collect();

    if digits.len() >= 12 {
        format!(
            "{}.{}.{} {}:{}",
            &digits[6..8],
            &digits[4..6],
            &digits[0..4],
            &digits[8..10],
            &digits[10..12]
        )
    } else if digits.len() == 8 {
        format!("{}.{}.{}", &digits[6..8], &digits[4..6], &digits[0..4])
    } else {
        cleaned
    }
}

/// Truncate to at most `max_chars` characters
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_code_patterns() {
        assert!(is_energy_code("9900000000001"));
        assert!(is_energy_code("4012345000016"));
        assert!(is_energy_code("10YDEXEONXXXXXX1"));
        assert!(is_energy_code("990000000001"));
        assert!(!is_energy_code("44009"));
        assert!(!is_energy_code("12345678901234"));
        assert!(!is_energy_code("10YDE"));
        assert!(!is_energy_code("890000000001"));
    }

    #[test]
    fn test_classify_location() {
        assert_eq!(classify_location("DE0001234567890123"), LocationKind::Metering);
        assert_eq!(classify_location("DE00012345678901234567890123456"), LocationKind::Market);
        assert_eq!(classify_location("51238696781"), LocationKind::Market);
        assert_eq!(classify_location("AT0001234567890123"), LocationKind::Market);
    }

    #[test]
    fn test_location_boundaries() {
        assert_eq!(classify_location(&format!("DE{}", "0".repeat(16))), LocationKind::Metering);
        assert_eq!(classify_location(&format!("DE{}", "0".repeat(15))), LocationKind::Market);
        assert_eq!(classify_location(&format!("DE{}", "0".repeat(27))), LocationKind::Metering);
        assert_eq!(classify_location(&format!("DE{}", "0".repeat(28))), LocationKind::Market);
    }

    #[test]
    fn test_party_code() {
        let nad = Segment::new(
            "NAD",
            vec!["MS".into(), "9900000000001".into(), "".into(), "293".into()],
            "NAD+MS+9900000000001::293",
        );
        assert_eq!(party_code(&nad), Some("9900000000001"));

        let nad = Segment::new("NAD", vec!["DP".into(), "".into(), "4012345000016".into()], "");
        assert_eq!(party_code(&nad), Some("4012345000016"));

        let nad = Segment::new(
            "NAD",
            vec!["MR".into(), "4012345000016".into(), "293".into()],
            "NAD+MR+4012345000016:293",
        );
        assert_eq!(party_code(&nad), Some("4012345000016"));

        let nad = Segment::new("NAD", vec!["DP".into()], "NAD+DP");
        assert_eq!(party_code(&nad), None);
    }

    #[test]
    fn test_format_edifact_datetime() {
        assert_eq!(format_edifact_datetime("202509042320"), "04.09.2025 23:20");
        assert_eq!(format_edifact_datetime("20250904"), "04.09.2025");
        assert_eq!(format_edifact_datetime("202509042200?+00"), "04.09.2025 22:00");
        assert_eq!(format_edifact_datetime("202509042200+00"), "04.09.2025 22:00");
        assert_eq!(format_edifact_datetime("2509"), "2509");
        assert_eq!(format_edifact_datetime(""), "");
    }

    #[test]
    fn test_clean_code_and_truncate() {
        assert_eq!(clean_code(" 44009? "), "44009");
        assert_eq!(truncate_chars("Änderung", 3), "Änd");
    }
}
