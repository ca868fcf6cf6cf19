//! Core Analyzer implementation

use crate::config::AnalyzerConfig;
use crate::enrichment::{panic_message, Enricher};
use crate::error::AnalyzerError;
use crate::extractor::FieldExtractor;
use crate::interpreter::SegmentInterpreter;
use crate::process::classify_business_process;
use edilens_domain::traits::{CodeLookup, SemanticSearch};
use edilens_domain::{
    AnalysisId, EnrichedSegment, EnrichmentStats, MessageAnalysis, MessageType, Segment,
    ValidationResult,
};
use edilens_parser::{classify, tokenize_with, MessageValidator, ValidatorConfig};
use edilens_registry::CodeRegistry;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// The Analyzer turns raw message text into a [`MessageAnalysis`]
pub struct Analyzer<C, S>
where
    C: CodeLookup,
    S: SemanticSearch,
{
    code_lookup: Arc<C>,
    semantic_search: Arc<S>,
    registry: CodeRegistry,
    validator: MessageValidator,
    config: AnalyzerConfig,
}

impl<C, S> Analyzer<C, S>
where
    C: CodeLookup + Send + Sync,
    S: SemanticSearch + Send + Sync,
{
    /// Create an Analyzer using the built-in code registry
    ///
    /// Fails when `config` does not validate.
    pub fn new(code_lookup: C, semantic_search: S, config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate().map_err(AnalyzerError::Config)?;
        Ok(Self {
            code_lookup: Arc::new(code_lookup),
            semantic_search: Arc::new(semantic_search),
            registry: CodeRegistry::builtin().clone(),
            validator: MessageValidator::default_config(),
            config,
        })
    }

    /// Use a different code registry
    pub fn with_registry(mut self, registry: CodeRegistry) -> Self {
        info!("Using code registry {}", registry.version);
        self.registry = registry;
        self
    }

    /// Layer the labels from a registry TOML file over the active registry
    pub fn with_registry_file<P: AsRef<Path>>(self, path: P) -> Result<Self, AnalyzerError> {
        let overrides = CodeRegistry::from_file(path)?;
        let merged = self.registry.with_overrides(&overrides);
        Ok(self.with_registry(merged))
    }

    /// Use a different validator configuration
    pub fn with_validator_config(mut self, config: ValidatorConfig) -> Self {
        self.validator = MessageValidator::new(config);
        self
    }

    /// The active code registry
    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    /// The active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one message
    ///
    /// Only input problems are errors: an over-long message or one without
    /// segments. Collaborator failures are absorbed by enrichment, and a
    /// panic while assembling the result yields a degraded analysis.
    pub async fn analyze(&self, text: &str) -> Result<MessageAnalysis, AnalyzerError> {
        let id = AnalysisId::new();
        let span = info_span!("analyze", analysis_id = %id);
        self.run(id, text).instrument(span).await
    }

    /// Analyze one message, turning any error into a degraded analysis
    pub async fn analyze_or_fallback(&self, text: &str) -> MessageAnalysis {
        match self.analyze(text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Analysis failed, returning fallback: {}", e);
                MessageAnalysis::degraded(e.to_string())
            }
        }
    }

    /// Structural validation of raw message text
    pub fn validate(&self, text: &str) -> ValidationResult {
        self.validator.validate(text)
    }

    async fn run(&self, id: AnalysisId, text: &str) -> Result<MessageAnalysis, AnalyzerError> {
        let length = text.chars().count();
        if length > self.config.max_message_length {
            return Err(AnalyzerError::MessageTooLong(
                length,
                self.config.max_message_length,
            ));
        }

        let segments = tokenize_with(text, &self.registry)?;
        let message_type = classify(&segments);
        info!(
            "Analyzing {} message with {} segments",
            message_type,
            segments.len()
        );

        let base: Vec<EnrichedSegment> = segments.iter().cloned().map(EnrichedSegment::from).collect();
        let enricher = Enricher::new(
            self.code_lookup.as_ref(),
            self.semantic_search.as_ref(),
            &self.config.enrichment,
        );
        let (enriched, stats) = match AssertUnwindSafe(enricher.enrich(&base, message_type))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(cause) => {
                error!(
                    "Enrichment aborted, continuing without it: {}",
                    panic_message(cause.as_ref())
                );
                (base.clone(), EnrichmentStats::default())
            }
        };

        let assembled = panic::catch_unwind(AssertUnwindSafe(|| {
            self.assemble(id, message_type, &segments, enriched, stats)
        }));
        let analysis = match assembled {
            Ok(analysis) => analysis,
            Err(cause) => {
                let reason = panic_message(cause.as_ref());
                error!("Interpretation aborted, returning degraded analysis: {}", reason);
                MessageAnalysis {
                    id,
                    message_type,
                    segments: base,
                    ..MessageAnalysis::degraded(format!("interpretation failed: {}", reason))
                }
            }
        };

        info!(
            "Analysis complete: process {:?}, {} table rows",
            analysis.business_process,
            analysis.structured_info.segment_table.len()
        );
        Ok(analysis)
    }

    fn assemble(
        &self,
        id: AnalysisId,
        message_type: MessageType,
        segments: &[Segment],
        enriched: Vec<EnrichedSegment>,
        enrichment: EnrichmentStats,
    ) -> MessageAnalysis {
        let business_process = classify_business_process(segments, message_type, &self.registry);
        debug!("Business process: {:?}", business_process);

        let mut structured_info = FieldExtractor::new(&self.registry).extract(&enriched, message_type);
        structured_info.segment_table = SegmentInterpreter::new(&self.registry)
            .with_process_row(self.config.include_process_row)
            .interpret(&enriched, business_process.as_deref());

        MessageAnalysis {
            id,
            message_type,
            segments: enriched,
            structured_info,
            business_process,
            enrichment,
            degraded: None,
        }
    }
}

/// Serialize an analysis for the prompt layer
pub fn to_json(analysis: &MessageAnalysis) -> Result<String, AnalyzerError> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
