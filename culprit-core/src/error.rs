//! Error types for the classification engine.

use thiserror::Error;

use crate::category::FailureCategory;

/// Top-level error for the culprit core crate.
#[derive(Debug, Error)]
pub enum CulpritError {
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
}

/// Errors raised while compiling a pattern rule table.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern '{pattern}' for category '{category}': {source}")]
    InvalidPattern {
        category: FailureCategory,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid endpoint extraction pattern '{pattern}': {source}")]
    InvalidExtractor {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("category '{0}' has no rules")]
    EmptyCategory(FailureCategory),
    #[error("category '{0}' cannot carry rules")]
    UnclassifiableCategory(FailureCategory),
}

/// Errors from loading layered configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("configuration file not found: {}", .0.display())]
    MissingFile(std::path::PathBuf),
    #[error("invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// A category identifier that is not part of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown failure category '{0}'")]
pub struct UnknownCategory(pub String);

/// Convenience result alias for the core crate.
pub type Result<T, E = CulpritError> = std::result::Result<T, E>;
