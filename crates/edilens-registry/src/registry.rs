//! The code registry and its tables

use crate::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, error};

const BUILTIN_REGISTRY: &str = include_str!("../data/registry.toml");

static BUILTIN: LazyLock<CodeRegistry> = LazyLock::new(|| {
    CodeRegistry::from_toml(BUILTIN_REGISTRY).unwrap_or_else(|e| {
        error!("Built-in code registry is invalid, continuing without labels: {}", e);
        CodeRegistry::default()
    })
});

const UNKNOWN_SEGMENT: &str = "Unknown Segment";

type Table = BTreeMap<String, String>;

/// Selects one table of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeTable {
    /// Segment tag → description
    Segments,
    /// BGM document/function code → label
    DocumentFunctions,
    /// STS status code → label
    Statuses,
    /// NAD qualifier → party role
    PartyQualifiers,
    /// RFF qualifier → reference label
    ReferenceQualifiers,
    /// RFF+Z13 process id → process label
    ProcessIds,
    /// DTM qualifier → date label
    DateQualifiers,
    /// QTY qualifier → quantity label
    QuantityQualifiers,
    /// MOA qualifier → amount label
    AmountQualifiers,
    /// PRI qualifier → price label
    PriceQualifiers,
    /// DOC document type → label
    DocumentTypes,
    /// LOC qualifier → location label
    LocationQualifiers,
    /// UTILMD BGM code → process label
    UtilmdFunctionProcesses,
    /// INVOIC BGM code → process label
    InvoicDocumentProcesses,
    /// REMADV DOC code → process label
    RemadvDocumentProcesses,
    /// ORDERS BGM code → process label
    OrdersDocumentProcesses,
    /// QUOTES BGM code → process label
    QuotesDocumentProcesses,
    /// APERAK/CONTRL BGM code → process label
    AcknowledgementProcesses,
    /// MSCONS reading kind (annual, periodic, interim, master_data) → label
    MsconsReadings,
    /// Message type identifier → generic process label
    GenericProcesses,
}

/// Business process label sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessLabels {
    /// UTILMD BGM code → process label
    pub utilmd_functions: Table,
    /// INVOIC BGM code → process label
    pub invoic_documents: Table,
    /// REMADV DOC code → process label
    pub remadv_documents: Table,
    /// ORDERS BGM code → process label
    pub orders_documents: Table,
    /// QUOTES BGM code → process label
    pub quotes_documents: Table,
    /// APERAK/CONTRL BGM code → process label
    pub acknowledgement_documents: Table,
    /// MSCONS reading kind → label
    pub mscons: Table,
    /// Message type → generic label
    pub generic: Table,
}

/// Versioned collection of code → label tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRegistry {
    /// Version of the table set
    pub version: String,

    /// Segment tag → description
    #[serde(default)]
    pub segments: Table,

    /// BGM document/function codes
    #[serde(default)]
    pub document_functions: Table,

    /// STS status codes
    #[serde(default)]
    pub statuses: Table,

    /// NAD qualifiers
    #[serde(default)]
    pub party_qualifiers: Table,

    /// RFF qualifiers
    #[serde(default)]
    pub reference_qualifiers: Table,

    /// RFF+Z13 process ids
    #[serde(default)]
    pub process_ids: Table,

    /// DTM qualifiers
    #[serde(default)]
    pub date_qualifiers: Table,

    /// QTY qualifiers
    #[serde(default)]
    pub quantity_qualifiers: Table,

    /// MOA qualifiers
    #[serde(default)]
    pub amount_qualifiers: Table,

    /// PRI qualifiers
    #[serde(default)]
    pub price_qualifiers: Table,

    /// DOC document types
    #[serde(default)]
    pub document_types: Table,

    /// LOC qualifiers
    #[serde(default)]
    pub location_qualifiers: Table,

    /// Business process label sets
    #[serde(default)]
    pub processes: ProcessLabels,
}

impl CodeRegistry {
    /// The compiled-in registry
    pub fn builtin() -> &'static CodeRegistry {
        &BUILTIN
    }

    /// Load a registry from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, RegistryError> {
        let registry: CodeRegistry = toml::from_str(toml_str)?;
        if registry.version.trim().is_empty() {
            return Err(RegistryError::EmptyVersion);
        }
        debug!(
            "Loaded code registry {} ({} process ids)",
            registry.version,
            registry.process_ids.len()
        );
        Ok(registry)
    }

    /// Load a registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Return a copy with every entry of `overrides` layered on top
    ///
    /// The resulting version is `"<base>+<override>"`.
    pub fn with_overrides(&self, overrides: &CodeRegistry) -> CodeRegistry {
        let mut merged = self.clone();
        merged.version = format!("{}+{}", self.version, overrides.version);
        for table in CodeTable::ALL {
            let entries = overrides.table(table).clone();
            merged.table_mut(table).extend(entries);
        }
        merged
    }

    /// Label for `code` in `table`
    pub fn label(&self, table: CodeTable, code: &str) -> Option<&str> {
        self.table(table).get(code.trim()).map(String::as_str)
    }

    /// Description of a segment tag, or `"Unknown Segment"`
    pub fn segment_description(&self, tag: &str) -> &str {
        self.label(CodeTable::Segments, tag).unwrap_or(UNKNOWN_SEGMENT)
    }

    /// Borrow one table
    pub fn table(&self, table: CodeTable) -> &BTreeMap<String, String> {
        match table {
            CodeTable::Segments => &self.segments,
            CodeTable::DocumentFunctions => &self.document_functions,
            CodeTable::Statuses => &self.statuses,
            CodeTable::PartyQualifiers => &self.party_qualifiers,
            CodeTable::ReferenceQualifiers => &self.reference_qualifiers,
            CodeTable::ProcessIds => &self.process_ids,
            CodeTable::DateQualifiers => &self.date_qualifiers,
            CodeTable::QuantityQualifiers => &self.quantity_qualifiers,
            CodeTable::AmountQualifiers => &self.amount_qualifiers,
            CodeTable::PriceQualifiers => &self.price_qualifiers,
            CodeTable::DocumentTypes => &self.document_types,
            CodeTable::LocationQualifiers => &self.location_qualifiers,
            CodeTable::UtilmdFunctionProcesses => &self.processes.utilmd_functions,
            CodeTable::InvoicDocumentProcesses => &self.processes.invoic_documents,
            CodeTable::RemadvDocumentProcesses => &self.processes.remadv_documents,
            CodeTable::OrdersDocumentProcesses => &self.processes.orders_documents,
            CodeTable::QuotesDocumentProcesses => &self.processes.quotes_documents,
            CodeTable::AcknowledgementProcesses => &self.processes.acknowledgement_documents,
            CodeTable::MsconsReadings => &self.processes.mscons,
            CodeTable::GenericProcesses => &self.processes.generic,
        }
    }

    fn table_mut(&mut self, table: CodeTable) -> &mut BTreeMap<String, String> {
        match table {
            CodeTable::Segments => &mut self.segments,
            CodeTable::DocumentFunctions => &mut self.document_functions,
            CodeTable::Statuses => &mut self.statuses,
            CodeTable::PartyQualifiers => &mut self.party_qualifiers,
            CodeTable::ReferenceQualifiers => &mut self.reference_qualifiers,
            CodeTable::ProcessIds => &mut self.process_ids,
            CodeTable::DateQualifiers => &mut self.date_qualifiers,
            CodeTable::QuantityQualifiers => &mut self.quantity_qualifiers,
            CodeTable::AmountQualifiers => &mut self.amount_qualifiers,
            CodeTable::PriceQualifiers => &mut self.price_qualifiers,
            CodeTable::DocumentTypes => &mut self.document_types,
            CodeTable::LocationQualifiers => &mut self.location_qualifiers,
            CodeTable::UtilmdFunctionProcesses => &mut self.processes.utilmd_functions,
            CodeTable::InvoicDocumentProcesses => &mut self.processes.invoic_documents,
            CodeTable::RemadvDocumentProcesses => &mut self.processes.remadv_documents,
            CodeTable::OrdersDocumentProcesses => &mut self.processes.orders_documents,
            CodeTable::QuotesDocumentProcesses => &mut self.processes.quotes_documents,
            CodeTable::AcknowledgementProcesses => &mut self.processes.acknowledgement_documents,
            CodeTable::MsconsReadings => &mut self.processes.mscons,
            CodeTable::GenericProcesses => &mut self.processes.generic,
        }
    }
}

impl CodeTable {
    /// Every table
    pub const ALL: [CodeTable; 20] = [
        CodeTable::Segments,
        CodeTable::DocumentFunctions,
        CodeTable::Statuses,
        CodeTable::PartyQualifiers,
        CodeTable::ReferenceQualifiers,
        CodeTable::ProcessIds,
        CodeTable::DateQualifiers,
        CodeTable::QuantityQualifiers,
        CodeTable::AmountQualifiers,
        CodeTable::PriceQualifiers,
        CodeTable::DocumentTypes,
        CodeTable::LocationQualifiers,
        CodeTable::UtilmdFunctionProcesses,
        CodeTable::InvoicDocumentProcesses,
        CodeTable::RemadvDocumentProcesses,
        CodeTable::OrdersDocumentProcesses,
        CodeTable::QuotesDocumentProcesses,
        CodeTable::AcknowledgementProcesses,
        CodeTable::MsconsReadings,
        CodeTable::GenericProcesses,
    ];
}
