//! edilens Parser
//!
//! Turns raw EDIFACT-style text into segments and answers the first
//! questions asked about them:
//!
//! - **Tokenizer**: splits text into [`Segment`]s (tag + flat element list)
//! - **Classifier**: derives the [`MessageType`] from UNH or from segment heuristics
//! - **Validator**: structural checks (envelope, UNT count, empty segments)
//!
//! This is a pragmatic interpreter, not a standards-compliant EDIFACT parser:
//! element and component separators are treated alike and only the checks
//! that matter for explaining a message are performed.
//!
//! # Examples
//!
//! ```
//! use edilens_parser::{classify, tokenize, MessageValidator};
//! use edilens_domain::MessageType;
//!
//! let text = "UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'UNT+3+1'";
//! let segments = tokenize(text).unwrap();
//! assert_eq!(segments.len(), 3);
//! assert_eq!(classify(&segments), MessageType::Utilmd);
//!
//! let result = MessageValidator::default_config().validate(text);
//! assert!(result.is_valid);
//! ```
//!
//! [`Segment`]: edilens_domain::Segment
//! [`MessageType`]: edilens_domain::MessageType

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;
mod tokenizer;
mod validator;

pub use classifier::classify;
pub use config::ValidatorConfig;
pub use error::ParseError;
pub use tokenizer::{
    delimiter_style, strip_release_chars, tokenize, tokenize_with, DelimiterStyle,
    RELEASE_CHAR,
};
pub use validator::{MessageValidator, ENVELOPE_TAGS};
