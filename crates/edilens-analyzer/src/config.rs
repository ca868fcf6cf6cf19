//! Configuration for the Analyzer

use serde::{Deserialize, Serialize};

/// Settings for the enrichment pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Whether collaborators are consulted at all
    pub enabled: bool,

    /// Semantic search hits requested per query
    pub top_k: usize,

    /// Minimum similarity for RFF+Z13 process descriptions
    pub process_score_threshold: f32,

    /// Minimum similarity for BGM/STS code descriptions
    pub code_score_threshold: f32,

    /// Longest process description attached (characters)
    pub process_snippet_max_chars: usize,

    /// Longest code description attached (characters)
    pub code_snippet_max_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 1,
            process_score_threshold: 0.70,
            code_score_threshold: 0.75,
            process_snippet_max_chars: 100,
            code_snippet_max_chars: 80,
        }
    }
}

/// Configuration for the Analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Maximum input message length (characters)
    pub max_message_length: usize,

    /// Put the detected business process in the first row of the meaning table
    pub include_process_row: bool,

    /// Enrichment settings
    pub enrichment: EnrichmentConfig,
}

impl AnalyzerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_message_length == 0 {
            return Err("max_message_length must be greater than 0".to_string());
        }

        let enrichment = &self.enrichment;
        if enrichment.top_k == 0 {
            return Err("enrichment.top_k must be greater than 0".to_string());
        }
        for (name, threshold) in [
            ("process_score_threshold", enrichment.process_score_threshold),
            ("code_score_threshold", enrichment.code_score_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(format!(
                    "enrichment.{} {} out of range [0.0, 1.0]",
                    name, threshold
                ));
            }
        }
        if enrichment.process_snippet_max_chars == 0 || enrichment.code_snippet_max_chars == 0 {
            return Err("snippet lengths must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for AnalyzerConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_message_length: 1_000_000,
            include_process_row: true,
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Offline preset: no collaborator calls, purely local interpretation
    pub fn offline() -> Self {
        Self {
            enrichment: EnrichmentConfig {
                enabled: false,
                ..EnrichmentConfig::default()
            },
            ..Self::default()
        }
    }

    /// Thorough preset: more search hits, lower thresholds, longer snippets
    pub fn thorough() -> Self {
        Self {
            max_message_length: 5_000_000,
            include_process_row: true,
            enrichment: EnrichmentConfig {
                enabled: true,
                top_k: 3,
                process_score_threshold: 0.65,
                code_score_threshold: 0.70,
                process_snippet_max_chars: 160,
                code_snippet_max_chars: 120,
            },
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
