//! Resolver chains for code values
//!
//! A chain is an ordered list of [`CodeResolver`] tiers. The first tier that
//! returns a label wins; [`ResolverChain::resolve_or_raw`] falls back to the
//! raw code when no tier knows it.

use edilens_domain::EnrichedSegment;
use edilens_registry::{CodeRegistry, CodeTable};

/// One resolution strategy
pub trait CodeResolver: Send + Sync {
    /// Label for `code` in the context of `segment`, if this tier knows one
    fn resolve(&self, code: &str, segment: &EnrichedSegment) -> Option<String>;
}

/// Static dictionary tier backed by a registry table
pub struct DictionaryResolver<'a> {
    registry: &'a CodeRegistry,
    table: CodeTable,
}

impl<'a> DictionaryResolver<'a> {
    /// Resolve against `table` of `registry`
    pub fn new(registry: &'a CodeRegistry, table: CodeTable) -> Self {
        Self { registry, table }
    }
}

impl CodeResolver for DictionaryResolver<'_> {
    fn resolve(&self, code: &str, _segment: &EnrichedSegment) -> Option<String> {
        self.registry.label(self.table, code).map(str::to_string)
    }
}

/// Which enrichment annotation an [`AnnotationResolver`] reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// `resolved_meta.code_description`
    CodeDescription,
    /// `resolved_meta.process_description`
    ProcessDescription,
}

/// Tier reading a semantic annotation attached during enrichment
pub struct AnnotationResolver {
    annotation: Annotation,
}

impl AnnotationResolver {
    /// Read `annotation` from the segment
    pub fn new(annotation: Annotation) -> Self {
        Self { annotation }
    }
}

impl CodeResolver for AnnotationResolver {
    fn resolve(&self, _code: &str, segment: &EnrichedSegment) -> Option<String> {
        let meta = &segment.resolved_meta;
        let value = match self.annotation {
            Annotation::CodeDescription => meta.code_description.as_ref(),
            Annotation::ProcessDescription => meta.process_description.as_ref(),
        };
        value
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Ordered list of resolver tiers
pub struct ResolverChain<'a> {
    tiers: Vec<Box<dyn CodeResolver + 'a>>,
}

impl<'a> ResolverChain<'a> {
    /// Empty chain
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier
    pub fn then(mut self, tier: impl CodeResolver + 'a) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// BGM document/function codes: dictionary, then code annotation
    pub fn document_function(registry: &'a CodeRegistry) -> Self {
        Self::new()
            .then(DictionaryResolver::new(registry, CodeTable::DocumentFunctions))
            .then(AnnotationResolver::new(Annotation::CodeDescription))
    }

    /// STS status codes: dictionary, then code annotation
    pub fn status(registry: &'a CodeRegistry) -> Self {
        Self::new()
            .then(DictionaryResolver::new(registry, CodeTable::Statuses))
            .then(AnnotationResolver::new(Annotation::CodeDescription))
    }

    /// RFF+Z13 process ids: dictionary, then process annotation
    pub fn process_id(registry: &'a CodeRegistry) -> Self {
        Self::new()
            .then(DictionaryResolver::new(registry, CodeTable::ProcessIds))
            .then(AnnotationResolver::new(Annotation::ProcessDescription))
    }

    /// Number of tiers
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether the chain has no tiers
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// First label any tier returns
    pub fn resolve(&self, code: &str, segment: &EnrichedSegment) -> Option<String> {
        if code.trim().is_empty() {
            return None;
        }
        self.tiers.iter().find_map(|tier| tier.resolve(code, segment))
    }

    /// Resolved label, or the raw code
    pub fn resolve_or_raw(&self, code: &str, segment: &EnrichedSegment) -> String {
        self.resolve(code, segment)
            .unwrap_or_else(|| code.trim().to_string())
    }
}

impl Default for ResolverChain<'_> {
    fn default() -> Self {
        Self::new()
    }
}
