//! Error types for crudgen

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crudgen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to read template {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {name}: {message}")]
    Template { name: String, message: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised while reading a single `CREATE TABLE` statement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table name not found")]
    TableNotFound,

    #[error("{message} at line {line}, column {column}")]
    Syntax {
        line: u64,
        column: u64,
        message: String,
    },

    #[error("failed to tokenize statement: {0}")]
    Tokenize(String),
}

impl From<sqlparser::tokenizer::TokenizerError> for SchemaError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        SchemaError::Tokenize(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}

impl CodegenError {
    /// Wrap an IO failure on an output path
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::Write {
            path: path.into(),
            source,
        }
    }
}
