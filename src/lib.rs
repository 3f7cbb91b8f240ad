//! rust-tsql-resolver: name resolution for T-SQL static analysis
//!
//! This library parses T-SQL scripts into fragment trees, resolves table and
//! column references to the objects they denote, and merges the object
//! definitions of many scripts into one deduplicated schema catalog.

pub mod catalog;
pub mod error;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod syntax;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

pub use catalog::Catalog;
pub use error::AnalysisError;
pub use parser::Script;
pub use report::{CollectingReporter, Diagnostic, Reporter};

/// Options for analyzing a set of scripts
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Schema assumed for names written without one
    pub default_schema: String,
    /// Minimum number of scripts before parsing and extraction run in parallel
    pub parallel_threshold: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            default_schema: "dbo".to_string(),
            parallel_threshold: parser::PARALLEL_THRESHOLD,
        }
    }
}

/// Parsed scripts and the catalog built from them
#[derive(Debug)]
pub struct Analysis {
    /// Scripts in input order
    pub scripts: Vec<Script>,
    pub catalog: Catalog,
}

/// Parse every script in `paths` and build the catalog.
///
/// Duplicate definitions are sent to `reporter`; an object whose database
/// cannot be determined fails the whole analysis.
pub fn analyze_scripts(
    paths: &[PathBuf],
    options: &AnalysisOptions,
    reporter: &mut dyn Reporter,
) -> Result<Analysis> {
    info!(files = paths.len(), "Analyzing scripts");

    let scripts = parser::parse_sql_files_with_threshold(paths, options.parallel_threshold)?;
    let catalog = catalog::build_catalog_with_threshold(
        &scripts,
        &options.default_schema,
        options.parallel_threshold,
        reporter,
    )?;

    Ok(Analysis { scripts, catalog })
}
