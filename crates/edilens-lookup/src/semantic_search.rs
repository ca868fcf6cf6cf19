//! Static semantic search

use crate::LookupError;
use edilens_domain::traits::{SearchHit, SemanticSearch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
struct Document {
    trigger: String,
    text: String,
    score: f32,
}

/// Semantic search over a fixed document set
///
/// A document is a candidate for a query when the query contains its
/// trigger term (case-insensitive); its score is fixed at registration.
/// Clones share documents and the call counter.
#[derive(Debug, Clone, Default)]
pub struct StaticSemanticSearch {
    documents: Arc<Mutex<Vec<Document>>>,
    failing_triggers: Arc<Mutex<Vec<String>>>,
    call_count: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl StaticSemanticSearch {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register a document
    pub fn add_document(&self, trigger: impl Into<String>, text: impl Into<String>, score: f32) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.push(Document {
                trigger: trigger.into().to_lowercase(),
                text: text.into(),
                score,
            });
        }
    }

    /// Make every query containing `trigger` fail
    pub fn add_error(&self, trigger: impl Into<String>) {
        if let Ok(mut failing) = self.failing_triggers.lock() {
            failing.push(trigger.into().to_lowercase());
        }
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn hits_for(&self, query: &str, top_k: usize, score_threshold: f32) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .documents
            .lock()
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| query.contains(&doc.trigger))
                    .filter(|doc| doc.score >= score_threshold)
                    .map(|doc| SearchHit::new(doc.text.clone(), doc.score))
                    .collect()
            })
            .unwrap_or_default();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        hits
    }
}

impl SemanticSearch for StaticSemanticSearch {
    type Error = LookupError;

    async fn search_by_text(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<SearchHit>, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if query.trim().is_empty() {
            return Err(LookupError::InvalidQuery("empty query".to_string()));
        }

        let query = query.to_lowercase();
        let fails = self
            .failing_triggers
            .lock()
            .map(|failing| failing.iter().any(|trigger| query.contains(trigger)))
            .unwrap_or(true);
        if fails {
            return Err(LookupError::Unavailable("semantic search".to_string()));
        }

        let hits = self.hits_for(&query, top_k, score_threshold);
        debug!("Semantic search returned {} hits", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> StaticSemanticSearch {
        let search = StaticSemanticSearch::new();
        search.add_document("44009", "44009 Kündigung der Belieferung zum Lieferende", 0.82);
        search.add_document("44009", "Allgemeine GPKE Übersicht", 0.71);
        search.add_document("E02", "E02 Abmeldung", 0.60);
        search
    }

    #[tokio::test]
    async fn test_best_hit_first() {
        let hits = index().search_by_text("Prüfidentifikator 44009", 5, 0.70).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score > hits[1].score);
        assert!(hits[0].text.contains("Kündigung"));
    }

    #[tokio::test]
    async fn test_top_k_and_threshold() {
        let search = index();
        let hits = search.search_by_text("44009", 1, 0.70).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = search.search_by_text("BGM e02", 1, 0.75).await.unwrap();
        assert!(hits.is_empty(), "below threshold must be empty, not an error");
    }

    #[tokio::test]
    async fn test_failures() {
        let search = index();
        search.add_error("44009");
        assert!(search.search_by_text("44009", 1, 0.5).await.is_err());
        assert!(matches!(
            search.search_by_text("  ", 1, 0.5).await,
            Err(LookupError::InvalidQuery(_))
        ));
        assert_eq!(search.call_count(), 2);
    }
}
