//! T-SQL parsing

mod ddl_parser;
mod expression_parser;
mod identifier_utils;
mod query_parser;
mod statement_parser;
mod token_parser_base;
mod tsql_parser;

pub(crate) use tsql_parser::parse_sql_files_with_threshold;
pub use tsql_parser::{
    collect_sql_files, parse_sql, parse_sql_file, parse_sql_files, Script, PARALLEL_THRESHOLD,
};
