//! Error types for expression construction and SQL rendering

use thiserror::Error;

/// Errors raised when a node is built in violation of its invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Conjunction requires at least 2 children, got {actual}")]
    TooFewChildren { actual: usize },

    #[error("Value list has {expressions} expressions but {columns} columns")]
    LengthMismatch { expressions: usize, columns: usize },

    #[error("Named function requires a non-empty name")]
    EmptyFunctionName,

    #[error("Value list requires at least one expression")]
    EmptyValueList,
}

/// Errors raised while resolving table metadata
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaLookupError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Metadata provider failed for table '{table}': {message}")]
    Provider { table: String, message: String },
}

/// Errors that can occur while rendering a node tree to SQL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unsupported node '{variant}' in {context}")]
    UnsupportedNode {
        variant: &'static str,
        context: &'static str,
    },

    #[error(transparent)]
    SchemaLookup(#[from] SchemaLookupError),
}

/// Result type for node construction
pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// Result type for rendering
pub type RenderResult<T> = Result<T, RenderError>;
