//! Error types for the Analyzer

use edilens_parser::ParseError;
use edilens_registry::RegistryError;
use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The message could not be tokenized
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Message exceeds maximum length
    #[error("Message too long: {0} chars (max: {1})")]
    MessageTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Code registry could not be loaded
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(e: serde_json::Error) -> Self {
        AnalyzerError::Json(e.to_string())
    }
}
