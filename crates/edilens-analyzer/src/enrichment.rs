//! Code and reference enrichment
//!
//! Fans out over the segments of one message with `join_all`; the lookups
//! for a single segment run in order. Every collaborator call is isolated:
//! a failure is logged, counted and otherwise ignored, so enrichment itself
//! never fails. A panic inside one segment's lookups leaves that segment
//! unenriched and keeps the results of the others. The pass is additive and idempotent: running it on its own
//! output adds nothing new.

use crate::codes::{clean_code, is_energy_code, party_code, truncate_chars};
use crate::config::EnrichmentConfig;
use edilens_domain::traits::{CodeLookup, SearchHit, SemanticSearch};
use edilens_domain::{EnrichedSegment, EnrichmentStats, MessageType, ResolvedMeta};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// Keywords that mark a supply start or end line in process documentation
const PROCESS_KEYWORDS: [&str; 2] = ["Lieferbeginn", "Lieferende"];

/// Keywords that mark a BGM code description
const FUNCTION_KEYWORDS: [&str; 3] = ["Anmeldung", "Abmeldung", "Änderung"];

/// Keywords that mark an STS code description
const STATUS_KEYWORDS: [&str; 3] = ["Zustimmung", "Ablehnung", "Status"];

/// Enriches segments through the code lookup and semantic search collaborators
pub struct Enricher<'a, C, S> {
    code_lookup: &'a C,
    semantic_search: &'a S,
    config: &'a EnrichmentConfig,
}

impl<'a, C, S> Enricher<'a, C, S>
where
    C: CodeLookup + Sync,
    S: SemanticSearch + Sync,
{
    /// Create an enricher
    pub fn new(code_lookup: &'a C, semantic_search: &'a S, config: &'a EnrichmentConfig) -> Self {
        Self {
            code_lookup,
            semantic_search,
            config,
        }
    }

    /// Enrich every segment of a message
    ///
    /// Output order matches input order.
    pub async fn enrich(
        &self,
        segments: &[EnrichedSegment],
        message_type: MessageType,
    ) -> (Vec<EnrichedSegment>, EnrichmentStats) {
        if !self.config.enabled {
            debug!("Enrichment disabled, passing {} segments through", segments.len());
            return (segments.to_vec(), EnrichmentStats::default());
        }

        let results = join_all(
            segments
                .iter()
                .map(|segment| self.enrich_isolated(segment, message_type)),
        )
        .await;

        let mut stats = EnrichmentStats::default();
        let enriched = results
            .into_iter()
            .map(|(segment, segment_stats)| {
                stats.absorb(segment_stats);
                segment
            })
            .collect();

        debug!(
            "Enrichment finished: {} calls, {} failed, {} segments enriched",
            stats.lookups_attempted, stats.lookups_failed, stats.segments_enriched
        );
        (enriched, stats)
    }

    async fn enrich_isolated(
        &self,
        segment: &EnrichedSegment,
        message_type: MessageType,
    ) -> (EnrichedSegment, EnrichmentStats) {
        match AssertUnwindSafe(self.enrich_segment(segment, message_type))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(cause) => {
                warn!(
                    "Enrichment of {} panicked, keeping it unenriched: {}",
                    segment.tag(),
                    panic_message(cause.as_ref())
                );
                let stats = EnrichmentStats {
                    lookups_attempted: 1,
                    lookups_failed: 1,
                    segments_enriched: 0,
                };
                (segment.clone(), stats)
            }
        }
    }

    /// Enrich a single segment
    pub async fn enrich_segment(
        &self,
        segment: &EnrichedSegment,
        message_type: MessageType,
    ) -> (EnrichedSegment, EnrichmentStats) {
        let mut stats = EnrichmentStats::default();
        let mut codes = BTreeMap::new();
        let mut meta = ResolvedMeta::default();

        self.resolve_energy_codes(segment, &mut codes, &mut stats).await;

        let source = &segment.segment;
        if source.is("NAD") {
            self.resolve_party(segment, &mut meta, &mut stats).await;
        }

        let described = segment.resolved_meta.code_description.is_some();
        if message_type == MessageType::Utilmd {
            if source.is_qualified("RFF", "Z13") {
                self.describe_process(segment, &mut meta, &mut stats).await;
            } else if source.is("BGM") && !described {
                if let Some(code) = source.non_empty(0) {
                    meta.code_description = self
                        .describe_code(code, "Nachrichtenfunktion", &FUNCTION_KEYWORDS, &mut stats)
                        .await;
                }
            } else if source.is("STS") && !described {
                let code = source.non_empty(2).or_else(|| source.non_empty(0));
                if let Some(code) = code.filter(|c| c.starts_with('E')) {
                    meta.code_description = self
                        .describe_code(code, "Antwortstatus", &STATUS_KEYWORDS, &mut stats)
                        .await;
                }
            }
        }

        let enriched = segment.with_resolved(&codes, &meta);
        if enriched != *segment {
            stats.segments_enriched = 1;
        }
        (enriched, stats)
    }

    async fn resolve_energy_codes(
        &self,
        segment: &EnrichedSegment,
        codes: &mut BTreeMap<String, String>,
        stats: &mut EnrichmentStats,
    ) {
        let mut candidates: Vec<&str> = segment
            .segment
            .elements
            .iter()
            .map(|e| e.trim())
            .filter(|e| is_energy_code(e))
            .filter(|e| segment.resolved_name(e).is_none())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        for code in candidates {
            stats.lookups_attempted += 1;
            match self.code_lookup.lookup_single_code(code).await {
                Ok(Some(found)) => {
                    codes.insert(code.to_string(), found.company_name);
                }
                Ok(None) => debug!("No participant registered for {}", code),
                Err(e) => {
                    stats.lookups_failed += 1;
                    warn!("Code lookup for {} failed: {}", code, e);
                }
            }
        }
    }

    async fn resolve_party(
        &self,
        segment: &EnrichedSegment,
        meta: &mut ResolvedMeta,
        stats: &mut EnrichmentStats,
    ) {
        let Some(code) = party_code(&segment.segment).filter(|c| is_energy_code(c)) else {
            return;
        };
        if segment.resolved_meta.company_name.is_some() {
            return;
        }

        stats.lookups_attempted += 1;
        match self.code_lookup.search_codes(code).await {
            Ok(matches) => {
                if let Some(best) = matches.into_iter().next() {
                    meta.company_name = Some(best.company_name);
                    meta.contact_roles = best.contact_roles;
                }
            }
            Err(e) => {
                stats.lookups_failed += 1;
                warn!("Party search for {} failed: {}", code, e);
            }
        }
    }

    async fn describe_process(
        &self,
        segment: &EnrichedSegment,
        meta: &mut ResolvedMeta,
        stats: &mut EnrichmentStats,
    ) {
        let Some(process_id) = segment.segment.non_empty(1).map(clean_code) else {
            return;
        };
        if process_id.is_empty() || segment.resolved_meta.process_description.is_some() {
            return;
        }

        let query = format!("Prüfidentifikator {} Prozess", process_id);
        let hits = self
            .search(&query, self.config.process_score_threshold, stats)
            .await;
        meta.process_description =
            process_snippet(&hits, &process_id, self.config.process_snippet_max_chars);
    }

    async fn describe_code(
        &self,
        code: &str,
        context: &str,
        keywords: &[&str],
        stats: &mut EnrichmentStats,
    ) -> Option<String> {
        let query = format!("{} {}", context, code);
        let hits = self
            .search(&query, self.config.code_score_threshold, stats)
            .await;
        code_snippet(&hits, code, keywords, self.config.code_snippet_max_chars)
    }

    async fn search(
        &self,
        query: &str,
        score_threshold: f32,
        stats: &mut EnrichmentStats,
    ) -> Vec<SearchHit> {
        stats.lookups_attempted += 1;
        match self
            .semantic_search
            .search_by_text(query, self.config.top_k, score_threshold)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                stats.lookups_failed += 1;
                warn!("Semantic search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

/// Pick a process description out of search hits
///
/// Prefers a line naming the id together with a supply start/end keyword,
/// then the first sentence mentioning the id or "Prozess".
pub fn process_snippet(hits: &[SearchHit], process_id: &str, max_chars: usize) -> Option<String> {
    let keyed_line = hits
        .iter()
        .flat_map(|hit| hit.text.lines())
        .map(str::trim)
        .find(|line| {
            line.contains(process_id) && PROCESS_KEYWORDS.iter().any(|k| line.contains(k))
        });
    let sentence = || {
        hits.iter()
            .flat_map(|hit| hit.text.split(['.', '\n']))
            .map(str::trim)
            .find(|s| !s.is_empty() && (s.contains(process_id) || s.contains("Prozess")))
    };

    keyed_line
        .or_else(sentence)
        .map(|text| truncate_chars(text, max_chars))
}

/// Pick a code description: the first line naming the code and a keyword
pub fn code_snippet(
    hits: &[SearchHit],
    code: &str,
    keywords: &[&str],
    max_chars: usize,
) -> Option<String> {
    hits.iter()
        .flat_map(|hit| hit.text.lines())
        .map(str::trim)
        .find(|line| line.contains(code) && keywords.iter().any(|k| line.contains(k)))
        .map(|line| truncate_chars(line, max_chars))
}

/// Text carried by a panic payload
pub(crate) fn panic_message(cause: &(dyn Any + Send)) -> String {
    cause
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| cause.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(texts: &[&str]) -> Vec<SearchHit> {
        texts.iter().map(|t| SearchHit::new(*t, 0.9)).collect()
    }

    #[test]
    fn test_process_snippet_prefers_supply_lines() {
        let found = process_snippet(
            &hits(&[
                "Der Prozess 44009 ist in der GPKE geregelt.\n44009: Kündigung zum Lieferende durch den neuen Lieferanten",
            ]),
            "44009",
            100,
        );
        assert_eq!(
            found.as_deref(),
            Some("44009: Kündigung zum Lieferende durch den neuen Lieferanten")
        );
    }

    #[test]
    fn test_process_snippet_sentence_fallback() {
        let found = process_snippet(
            &hits(&["Allgemeines. Der Prozess 44009 beschreibt die Kündigung. Mehr Text"]),
            "44009",
            100,
        );
        assert_eq!(found.as_deref(), Some("Der Prozess 44009 beschreibt die Kündigung"));
        assert_eq!(process_snippet(&hits(&["Nichts passendes"]), "44009", 100), None);
        assert_eq!(process_snippet(&[], "44009", 100), None);
    }

    #[test]
    fn test_snippets_are_truncated_by_chars() {
        let long = format!("44009 Lieferbeginn {}", "ä".repeat(200));
        let found = process_snippet(&hits(&[long.as_str()]), "44009", 100).unwrap();
        assert_eq!(found.chars().count(), 100);

        let long = format!("E02 Abmeldung {}", "ü".repeat(100));
        let found = code_snippet(
            &hits(&[long.as_str()]),
            "E02",
            &FUNCTION_KEYWORDS,
            80,
        )
        .unwrap();
        assert_eq!(found.chars().count(), 80);
    }

    #[test]
    fn test_code_snippet_requires_keyword() {
        let texts = hits(&["E02 steht im Katalog", "E02 Abmeldung vom Netz"]);
        assert_eq!(
            code_snippet(&texts, "E02", &FUNCTION_KEYWORDS, 80).as_deref(),
            Some("E02 Abmeldung vom Netz")
        );
        assert_eq!(code_snippet(&texts, "E01", &FUNCTION_KEYWORDS, 80), None);
    }

    #[test]
    fn test_panic_message() {
        let cause: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(cause.as_ref()), "boom");
        let cause: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(cause.as_ref()), "unknown cause");
    }
}
