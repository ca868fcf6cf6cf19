//! Static code lookup

use crate::LookupError;
use edilens_domain::traits::{CodeLookup, CodeMatch};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Code lookup backed by a fixed table
///
/// Clones share the table and the call counter.
#[derive(Debug, Clone, Default)]
pub struct StaticCodeLookup {
    matches: Arc<Mutex<HashMap<String, Vec<CodeMatch>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    call_count: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl StaticCodeLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register a match under its code; later matches rank lower
    pub fn add_match(&self, code_match: CodeMatch) {
        if let Ok(mut matches) = self.matches.lock() {
            matches
                .entry(code_match.code.clone())
                .or_default()
                .push(code_match);
        }
    }

    /// Make every call for `code` fail
    pub fn add_error(&self, code: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(code.into());
        }
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call counter
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    async fn before_call(&self, code: &str) -> Result<(), LookupError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let fails = self
            .failing
            .lock()
            .map(|failing| failing.contains(code))
            .unwrap_or(true);
        if fails {
            return Err(LookupError::Unavailable(format!("code lookup for {}", code)));
        }
        Ok(())
    }

    fn matches_for(&self, code: &str) -> Vec<CodeMatch> {
        self.matches
            .lock()
            .map(|matches| matches.get(code).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl CodeLookup for StaticCodeLookup {
    type Error = LookupError;

    async fn lookup_single_code(&self, code: &str) -> Result<Option<CodeMatch>, Self::Error> {
        self.before_call(code).await?;
        let found = self.matches_for(code).into_iter().next();
        debug!("Single code lookup for {}: {}", code, found.is_some());
        Ok(found)
    }

    async fn search_codes(&self, code: &str) -> Result<Vec<CodeMatch>, Self::Error> {
        self.before_call(code).await?;
        let found = self.matches_for(code);
        debug!("Code search for {}: {} matches", code, found.len());
        Ok(found)
    }
}
