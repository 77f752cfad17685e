//! Error types for the analysis pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, StatError>;

/// Errors raised while loading, normalizing, or joining the sources.
///
/// `MissingRegion` is recovered per row (the row is excluded and counted);
/// everything else aborts the run.
#[derive(Debug, Error)]
pub enum StatError {
    /// A region label had no usable region token after cleanup.
    #[error("region label {label:?} has no usable region token")]
    MissingRegion { label: String },

    /// The population source mapped more than one row onto a region key.
    #[error("population source has more than one row for region key `{key}`")]
    DuplicateKey { key: String },

    /// A required column is absent from a source table.
    #[error("column `{column}` not found in {source_name} source")]
    MissingField { column: String, source_name: String },

    /// Invalid analysis configuration (bad alias target, empty column name).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Structurally malformed source file.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
