//! Error types for the code registry

use thiserror::Error;

/// Errors that can occur while loading a registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Failed to read a registry file
    #[error("Failed to read registry file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse registry TOML
    #[error("Failed to parse registry TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Registry document without a version
    #[error("Registry version must not be empty")]
    EmptyVersion,
}
