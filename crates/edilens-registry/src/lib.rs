//! edilens Code Registry
//!
//! One versioned, data-driven home for every code → label table the
//! interpreter uses: segment descriptions, BGM/STS codes, party and
//! reference qualifiers, GPKE/WiM process ids, and the business process
//! label sets.
//!
//! The built-in tables are compiled in from `data/registry.toml`. Deployments
//! can layer their own TOML on top to relabel or localize codes without
//! touching interpretation logic.
//!
//! # Examples
//!
//! ```
//! use edilens_registry::{CodeRegistry, CodeTable};
//!
//! let registry = CodeRegistry::builtin();
//! assert_eq!(registry.label(CodeTable::Segments, "NAD"), Some("Name und Adresse"));
//!
//! let overrides = CodeRegistry::from_toml(r#"
//!     version = "local-1"
//!     [segments]
//!     "NAD" = "Partei"
//! "#).unwrap();
//! let merged = registry.with_overrides(&overrides);
//! assert_eq!(merged.label(CodeTable::Segments, "NAD"), Some("Partei"));
//! ```

#![warn(missing_docs)]

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::{CodeRegistry, CodeTable, ProcessLabels};
