//! T-SQL script front-end
//!
//! Reads script files, tokenizes them with sqlparser's `MsSqlDialect` and
//! builds one fragment tree per script. Statements outside the supported
//! grammar become `OtherStatement` nodes so the rest of the script is kept.

use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use rayon::prelude::*;
use sqlparser::tokenizer::Token;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::token_parser_base::TokenParser;
use crate::error::AnalysisError;
use crate::syntax::{NodeId, NodeKind, SyntaxTree, TreeBuilder};

/// Minimum number of files to benefit from parallel processing.
/// Below this threshold, sequential processing is faster due to rayon overhead.
pub const PARALLEL_THRESHOLD: usize = 8;

/// Words that may begin a statement. Skipping an unsupported statement stops
/// at the first of these found outside parentheses.
pub(super) const STATEMENT_START_WORDS: &[&str] = &[
    "ALTER", "BEGIN", "BREAK", "BULK", "CHECKPOINT", "CLOSE", "COMMIT", "CONTINUE", "CREATE",
    "DBCC", "DEALLOCATE", "DECLARE", "DELETE", "DENY", "DROP", "ELSE", "END", "EXEC",
    "EXECUTE", "FETCH", "GO", "GOTO", "GRANT", "IF", "INSERT", "MERGE", "OPEN", "PRINT",
    "RAISERROR", "RETURN", "REVERT", "REVOKE", "ROLLBACK", "SAVE", "SELECT", "SET", "THROW",
    "TRUNCATE", "UPDATE", "USE", "WAITFOR", "WHILE", "WITH",
];

/// A parsed script file
#[derive(Debug, Clone)]
pub struct Script {
    /// Source file the script was read from
    pub path: PathBuf,
    /// Fragment tree rooted at a `Script` node
    pub tree: SyntaxTree,
}

/// Parse multiple SQL files, using parallel processing for larger file sets.
///
/// Output order always matches input order.
pub fn parse_sql_files(files: &[PathBuf]) -> Result<Vec<Script>> {
    parse_sql_files_with_threshold(files, PARALLEL_THRESHOLD)
}

pub(crate) fn parse_sql_files_with_threshold(
    files: &[PathBuf],
    parallel_threshold: usize,
) -> Result<Vec<Script>> {
    if files.len() >= parallel_threshold {
        // Parse files in parallel; collect keeps the input order
        files.par_iter().map(|file| parse_sql_file(file)).collect()
    } else {
        files.iter().map(|file| parse_sql_file(file)).collect()
    }
}

/// Parse a single SQL file
pub fn parse_sql_file(path: &Path) -> Result<Script> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| AnalysisError::ScriptReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    // Strip UTF-8 BOM if present
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);
    parse_sql(path, content)
}

/// Parse script text into a fragment tree
pub fn parse_sql(path: impl Into<PathBuf>, sql: &str) -> Result<Script> {
    let path = path.into();
    let base = TokenParser::new(sql).map_err(|e| AnalysisError::SqlParseError {
        path: path.clone(),
        line: e.location.line as usize,
        message: e.message.clone(),
    })?;

    let tree = FragmentParser::new(base, &path).parse_script();
    debug!(path = %path.display(), nodes = tree.len(), "parsed script");
    Ok(Script { path, tree })
}

/// Recursively collect `*.sql` files under `root`, sorted for stable ordering
pub fn collect_sql_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| AnalysisError::InvalidInput {
            message: format!("cannot walk {}: {}", root.display(), e),
        })?;
        let is_sql = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if entry.file_type().is_file() && is_sql {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read a file as UTF-8, falling back to Windows-1252 for legacy scripts
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Common for SQL files saved by older Windows tooling
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Recursive-descent parser producing fragment nodes.
///
/// Grammar pieces live in sibling modules as further `impl` blocks:
/// statements in `statement_parser`, queries and table sources in
/// `query_parser`, expressions in `expression_parser` and definitions in
/// `ddl_parser`. Every `parse_*` method returns `None` on a mismatch; the
/// caller decides whether to rewind.
pub(super) struct FragmentParser<'p> {
    pub(super) base: TokenParser,
    pub(super) builder: TreeBuilder,
    path: &'p Path,
}

impl<'p> FragmentParser<'p> {
    pub(super) fn new(base: TokenParser, path: &'p Path) -> Self {
        Self {
            base,
            builder: TreeBuilder::new(),
            path,
        }
    }

    /// Push a node spanning tokens `start..pos`.
    pub(super) fn node(&mut self, kind: NodeKind, start: usize) -> NodeId {
        let last = self.base.pos().saturating_sub(1).max(start);
        self.node_span(kind, start, last)
    }

    /// Push a node spanning tokens `first..=last`.
    pub(super) fn node_span(&mut self, kind: NodeKind, first: usize, last: usize) -> NodeId {
        let region = self.base.region_between(first, last);
        self.builder.push(kind, region, first, last)
    }

    /// Whether the cursor sits at `GO` or at the end of input.
    pub(super) fn at_batch_end(&self) -> bool {
        self.base.is_at_end() || self.base.check_word_ci("GO")
    }

    pub(super) fn at_statement_start(&self) -> bool {
        self.base.check_any_word_ci(STATEMENT_START_WORDS)
    }

    /// Parse the whole token stream into batches of statements.
    pub(super) fn parse_script(mut self) -> SyntaxTree {
        let mut batches = Vec::new();
        while !self.base.is_at_end() {
            if self.base.eat_word_ci("GO") {
                // `GO 5` repeats a batch; the count has no meaning here
                if self.base.check_token(&Token::Number(String::new(), false)) {
                    self.base.advance();
                }
                self.base.eat_token(&Token::SemiColon);
                continue;
            }
            let start = self.base.pos();
            let statements = self.parse_statement_list(&[]);
            if statements.is_empty() {
                continue;
            }
            batches.push(self.node(NodeKind::Batch { statements }, start));
        }

        let last = self.base.len().saturating_sub(1);
        let root = self.node_span(NodeKind::Script { batches }, 0, last);
        let tokens = self.base.script_tokens();
        self.builder.finish(root, tokens)
    }

    /// Parse statements until `GO`, the end of input, or one of `terminators`.
    pub(super) fn parse_statement_list(&mut self, terminators: &[&str]) -> Vec<NodeId> {
        let mut statements = Vec::new();
        loop {
            while self.base.eat_token(&Token::SemiColon) {}
            if self.at_batch_end() || self.base.check_any_word_ci(terminators) {
                break;
            }
            statements.push(self.parse_statement_or_skip());
        }
        statements
    }

    /// Parse one statement, or skip it as `OtherStatement` when the grammar
    /// does not cover it.
    pub(super) fn parse_statement_or_skip(&mut self) -> NodeId {
        let start = self.base.pos();
        if let Some(statement) = self.parse_statement() {
            self.base.eat_token(&Token::SemiColon);
            return statement;
        }
        self.base.set_pos(start);
        self.skip_other_statement(start)
    }

    fn skip_other_statement(&mut self, start: usize) -> NodeId {
        let keyword = self
            .base
            .current_token()
            .map(|t| match &t.token {
                Token::Word(w) => w.value.to_uppercase(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        let location = self.base.location_of(start);
        warn!(
            path = %self.path.display(),
            line = location.line,
            keyword = %keyword,
            "statement not covered by the grammar, skipped"
        );

        self.base.advance();
        let mut depth = 0usize;
        let mut case_depth = 0usize;
        while !self.base.is_at_end() {
            if depth == 0 && case_depth == 0 {
                if self.base.check_token(&Token::SemiColon) || self.at_statement_start() {
                    break;
                }
            }
            if self.base.check_token(&Token::LParen) {
                depth += 1;
            } else if self.base.check_token(&Token::RParen) {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            } else if self.base.check_word_ci("CASE") {
                case_depth += 1;
            } else if case_depth > 0 && self.base.check_word_ci("END") {
                case_depth -= 1;
            }
            self.base.advance();
        }
        let statement = self.node(NodeKind::OtherStatement { keyword }, start);
        self.base.eat_token(&Token::SemiColon);
        statement
    }

    /// Skip tokens until one of `stop_words`, a `;`, a statement start or an
    /// unbalanced `)`, staying outside nested parentheses.
    pub(super) fn skip_until_words(&mut self, stop_words: &[&str]) {
        let mut depth = 0usize;
        while !self.base.is_at_end() {
            if depth == 0
                && (self.base.check_any_word_ci(stop_words)
                    || self.base.check_token(&Token::SemiColon)
                    || self.at_statement_start())
            {
                return;
            }
            if self.base.check_token(&Token::LParen) {
                depth += 1;
            } else if self.base.check_token(&Token::RParen) {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            self.base.advance();
        }
    }
}
