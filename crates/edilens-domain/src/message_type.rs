//! Message type module - the classified EDIFACT message family

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message family of an EDIFACT message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// Master data exchange (Stammdaten)
    Utilmd,

    /// Metered services consumption report
    Mscons,

    /// Purchase order
    Orders,

    /// Invoice
    Invoic,

    /// Remittance advice
    Remadv,

    /// Quote
    Quotes,

    /// Application error and acknowledgement
    Aperak,

    /// Syntax and service report
    Contrl,

    /// Generic fallback when nothing more specific matches
    Edifact,
}

impl MessageType {
    /// All variants, in classification order
    pub const ALL: [MessageType; 9] = [
        MessageType::Utilmd,
        MessageType::Mscons,
        MessageType::Orders,
        MessageType::Invoic,
        MessageType::Remadv,
        MessageType::Quotes,
        MessageType::Aperak,
        MessageType::Contrl,
        MessageType::Edifact,
    ];

    /// The message identifier as it appears in UNH
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Utilmd => "UTILMD",
            MessageType::Mscons => "MSCONS",
            MessageType::Orders => "ORDERS",
            MessageType::Invoic => "INVOIC",
            MessageType::Remadv => "REMADV",
            MessageType::Quotes => "QUOTES",
            MessageType::Aperak => "APERAK",
            MessageType::Contrl => "CONTRL",
            MessageType::Edifact => "EDIFACT",
        }
    }

    /// Parse a message identifier (case-insensitive, surrounding whitespace ignored)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "UTILMD" => Some(MessageType::Utilmd),
            "MSCONS" => Some(MessageType::Mscons),
            "ORDERS" => Some(MessageType::Orders),
            "INVOIC" => Some(MessageType::Invoic),
            "REMADV" => Some(MessageType::Remadv),
            "QUOTES" => Some(MessageType::Quotes),
            "APERAK" => Some(MessageType::Aperak),
            "CONTRL" => Some(MessageType::Contrl),
            "EDIFACT" => Some(MessageType::Edifact),
            _ => None,
        }
    }

    /// Whether this is the generic fallback
    pub fn is_generic(&self) -> bool {
        matches!(self, MessageType::Edifact)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown message type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_identifiers() {
        for message_type in MessageType::ALL {
            assert_eq!(MessageType::parse(message_type.as_str()), Some(message_type));
        }
    }

    #[test]
    fn test_parse_is_lenient_about_case() {
        assert_eq!(MessageType::parse(" mscons "), Some(MessageType::Mscons));
        assert_eq!(MessageType::parse("IFTSTA"), None);
        assert!("PRICAT".parse::<MessageType>().is_err());
    }

    #[test]
    fn test_serializes_as_identifier() {
        let json = serde_json::to_string(&MessageType::Remadv).unwrap();
        assert_eq!(json, "\"REMADV\"");
    }
}
