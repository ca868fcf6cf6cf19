//! Error types for the parser

use thiserror::Error;

/// Errors that can occur while tokenizing a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text contained no segments at all
    #[error("Message contains no segments")]
    EmptyMessage,
}
