//! Error types for rust-tsql-resolver

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading scripts or building the catalog
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read SQL file: {path}")]
    ScriptReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQL parse error in {path} at line {line}: {message}")]
    SqlParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(
        "Cannot determine the database of {object_kind} {object_name} in {path} at {line}:{column} \
         (no three-part name and no preceding USE statement)"
    )]
    IndeterminateDatabase {
        object_kind: &'static str,
        object_name: String,
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}
