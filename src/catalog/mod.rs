//! Cross-script schema catalog
//!
//! The catalog is a nested database → schema → object map built once per
//! analysis run and read-only afterwards. Every lookup is case-insensitive
//! and returns `None` as soon as an intermediate level is missing.

mod builder;
mod elements;
mod extractors;

pub use builder::build_catalog;
pub(crate) use builder::build_catalog_with_threshold;
pub use elements::{
    type_params, ColumnInfo, DatabaseInfo, DatabaseObject, ForeignKeyInfo, FunctionInfo,
    FunctionReturnInfo, IndexFlags, IndexInfo, ParameterInfo, ProcedureInfo, SchemaInfo,
    SynonymInfo, TableInfo, ViewInfo,
};

use std::collections::BTreeMap;

use crate::resolve::TableOrViewReference;
use crate::util::ci_key;

/// Merged, deduplicated objects of every analyzed script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    databases: BTreeMap<String, DatabaseInfo>,
}

impl Catalog {
    pub(crate) fn new(databases: BTreeMap<String, DatabaseInfo>) -> Self {
        Self { databases }
    }

    pub fn get_database(&self, database: &str) -> Option<&DatabaseInfo> {
        self.databases.get(&ci_key(database))
    }

    pub fn get_schema(&self, database: &str, schema: &str) -> Option<&SchemaInfo> {
        self.get_database(database)?.schemas.get(&ci_key(schema))
    }

    pub fn get_table(&self, database: &str, schema: &str, table: &str) -> Option<&TableInfo> {
        self.get_schema(database, schema)?.tables.get(&ci_key(table))
    }

    pub fn get_column(
        &self,
        database: &str,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Option<&ColumnInfo> {
        self.get_table(database, schema, table)?.column(column)
    }

    pub fn get_view(&self, database: &str, schema: &str, view: &str) -> Option<&ViewInfo> {
        self.get_schema(database, schema)?.views.get(&ci_key(view))
    }

    pub fn get_procedure(
        &self,
        database: &str,
        schema: &str,
        procedure: &str,
    ) -> Option<&ProcedureInfo> {
        self.get_schema(database, schema)?
            .procedures
            .get(&ci_key(procedure))
    }

    pub fn get_function(
        &self,
        database: &str,
        schema: &str,
        function: &str,
    ) -> Option<&FunctionInfo> {
        self.get_schema(database, schema)?
            .functions
            .get(&ci_key(function))
    }

    pub fn get_synonym(&self, database: &str, schema: &str, synonym: &str) -> Option<&SynonymInfo> {
        self.get_schema(database, schema)?.synonyms.get(&ci_key(synonym))
    }

    /// Table behind a resolved reference. References without a database never match.
    pub fn find_table(&self, reference: &TableOrViewReference) -> Option<&TableInfo> {
        let database = reference.database.as_deref()?;
        self.get_table(database, &reference.schema, &reference.name)
    }

    pub fn databases(&self) -> impl Iterator<Item = &DatabaseInfo> {
        self.databases.values()
    }

    /// Every table of every database, ordered by database, schema and name.
    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.databases
            .values()
            .flat_map(|d| d.schemas.values())
            .flat_map(|s| s.tables.values())
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}
