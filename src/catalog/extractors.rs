//! Per-script extraction of object definitions
//!
//! Runs independently for every script, so it can fan out across threads.
//! Cross-script work happens in the builder afterwards.

use std::path::Path;

use tracing::{debug, warn};

use super::elements::{
    ColumnInfo, DatabaseObject, ForeignKeyInfo, FunctionInfo, FunctionReturnInfo, IndexFlags,
    IndexInfo, ParameterInfo, ProcedureInfo, SynonymInfo, TableInfo, ViewInfo,
};
use crate::error::AnalysisError;
use crate::parser::Script;
use crate::resolve::DatabaseContext;
use crate::syntax::{
    FunctionReturn, Identifier, IndexType, NodeId, NodeKind, ParameterDefinition,
    SchemaObjectName, SyntaxTree,
};

/// `CREATE SCHEMA` definition
#[derive(Debug, Clone)]
pub(crate) struct SchemaDefinition {
    pub object: DatabaseObject,
    pub authorization: Option<String>,
}

/// Elements an `ALTER TABLE ... ADD` contributes to an existing table
#[derive(Debug, Clone)]
pub(crate) struct TableAddition {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    /// `DEFAULT expr FOR column` pairs
    pub defaults: Vec<(String, String)>,
}

/// Everything one script defines
#[derive(Debug, Default)]
pub(crate) struct ScriptDefinitions {
    pub schemas: Vec<SchemaDefinition>,
    /// Tables with their inline indexes and foreign keys attached
    pub tables: Vec<TableInfo>,
    pub views: Vec<ViewInfo>,
    pub procedures: Vec<ProcedureInfo>,
    pub functions: Vec<FunctionInfo>,
    pub synonyms: Vec<SynonymInfo>,
    /// CREATE INDEX statements and constraints added by ALTER TABLE
    pub indexes: Vec<IndexInfo>,
    /// Foreign keys added by ALTER TABLE
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub additions: Vec<TableAddition>,
}

/// Walks one script's definitions.
struct Extractor<'s> {
    path: &'s Path,
    tree: &'s SyntaxTree,
    databases: DatabaseContext,
    default_schema: &'s str,
    out: ScriptDefinitions,
}

/// Extract every definition from one script.
pub(crate) fn extract_script(
    script: &Script,
    default_schema: &str,
) -> Result<ScriptDefinitions, AnalysisError> {
    let mut extractor = Extractor {
        path: &script.path,
        tree: &script.tree,
        databases: DatabaseContext::build(&script.tree),
        default_schema,
        out: ScriptDefinitions::default(),
    };
    // Module bodies never define catalog objects
    let statements = script.tree.descendants(script.tree.root(), |kind| {
        matches!(
            kind,
            NodeKind::CreateProcedureStatement { .. }
                | NodeKind::CreateFunctionStatement { .. }
                | NodeKind::CreateTriggerStatement { .. }
                | NodeKind::CreateViewStatement { .. }
        )
    });
    for node in statements {
        extractor.extract(node)?;
    }
    debug!(
        path = %script.path.display(),
        tables = extractor.out.tables.len(),
        views = extractor.out.views.len(),
        procedures = extractor.out.procedures.len(),
        functions = extractor.out.functions.len(),
        "Extracted definitions"
    );
    Ok(extractor.out)
}

impl Extractor<'_> {
    fn extract(&mut self, node: NodeId) -> Result<(), AnalysisError> {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::CreateSchemaStatement {
                name,
                authorization,
            } => self.extract_schema(node, name, authorization.as_ref()),
            NodeKind::CreateTableStatement {
                name,
                columns,
                constraints,
                indexes,
            } => {
                if name.is_temp_table() {
                    return Ok(());
                }
                let table = self.extract_table(node, name, columns, constraints, indexes)?;
                self.out.tables.push(table);
            }
            NodeKind::AlterTableAddElements {
                name,
                columns,
                constraints,
            } => {
                if !name.is_temp_table() {
                    self.extract_alter_table(node, name, columns, constraints)?;
                }
            }
            NodeKind::CreateIndexStatement { on_name, .. } => {
                if !on_name.is_temp_table() {
                    let index = self.extract_index_statement(node)?;
                    self.out.indexes.push(index);
                }
            }
            NodeKind::CreateViewStatement {
                name,
                columns,
                mode,
                ..
            } if mode.defines_object() => {
                let object = self.object(node, name, "View")?;
                self.out.views.push(ViewInfo {
                    object,
                    columns: columns.iter().map(|c| c.value.clone()).collect(),
                });
            }
            NodeKind::CreateProcedureStatement {
                name,
                parameters,
                mode,
                ..
            } if mode.defines_object() => {
                let object = self.object(node, name, "Procedure")?;
                self.out.procedures.push(ProcedureInfo {
                    object,
                    parameters: parameters.iter().map(parameter_info).collect(),
                });
            }
            NodeKind::CreateFunctionStatement {
                name,
                parameters,
                returns,
                mode,
                ..
            } if mode.defines_object() => {
                let object = self.object(node, name, "Function")?;
                let returns = match returns {
                    FunctionReturn::Scalar(data_type) => {
                        FunctionReturnInfo::Scalar(data_type.clone())
                    }
                    FunctionReturn::Table { .. } => FunctionReturnInfo::InlineTable,
                    FunctionReturn::TableVariable(_) => FunctionReturnInfo::TableVariable,
                };
                self.out.functions.push(FunctionInfo {
                    object,
                    parameters: parameters.iter().map(parameter_info).collect(),
                    returns,
                });
            }
            NodeKind::CreateSynonymStatement { name, target } => {
                let object = self.object(node, name, "Synonym")?;
                self.out.synonyms.push(SynonymInfo {
                    object,
                    target: target.to_string(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// Explicit database part, else the active `USE` database.
    fn database(&self, node: NodeId, name: &SchemaObjectName) -> Option<String> {
        name.database_name()
            .map(str::to_string)
            .or_else(|| {
                self.databases
                    .database_of(self.tree, node)
                    .map(str::to_string)
            })
    }

    fn require_database(
        &self,
        node: NodeId,
        name: &SchemaObjectName,
        object_kind: &'static str,
    ) -> Result<String, AnalysisError> {
        self.database(node, name).ok_or_else(|| {
            let begin = self.tree.region(node).begin;
            AnalysisError::IndeterminateDatabase {
                object_kind,
                object_name: name.to_string(),
                path: self.path.to_path_buf(),
                line: begin.line,
                column: begin.column,
            }
        })
    }

    fn object(
        &self,
        node: NodeId,
        name: &SchemaObjectName,
        object_kind: &'static str,
    ) -> Result<DatabaseObject, AnalysisError> {
        Ok(DatabaseObject {
            database: self.require_database(node, name, object_kind)?,
            schema: name.schema_or(self.default_schema).to_string(),
            name: name.base_name().to_string(),
            node,
            region: self.tree.region(node),
            path: self.path.to_path_buf(),
        })
    }

    fn extract_schema(&mut self, node: NodeId, name: &Identifier, authorization: Option<&Identifier>) {
        let Some(database) = self.databases.database_of(self.tree, node) else {
            warn!(
                path = %self.path.display(),
                schema = %name,
                "Cannot determine the database of a schema, skipped"
            );
            return;
        };
        self.out.schemas.push(SchemaDefinition {
            object: DatabaseObject {
                database: database.to_string(),
                schema: name.value.clone(),
                name: name.value.clone(),
                node,
                region: self.tree.region(node),
                path: self.path.to_path_buf(),
            },
            authorization: authorization.map(|a| a.value.clone()),
        });
    }

    fn extract_table(
        &self,
        node: NodeId,
        name: &SchemaObjectName,
        columns: &[NodeId],
        constraints: &[NodeId],
        indexes: &[NodeId],
    ) -> Result<TableInfo, AnalysisError> {
        let object = self.object(node, name, "Table")?;
        let mut table = TableInfo::new(object);
        let mut inline_indexes = Vec::new();
        let mut foreign_keys = Vec::new();

        for column in columns {
            table.add_column(self.column_info(*column, &mut inline_indexes, &mut foreign_keys));
        }
        for constraint in constraints {
            self.constraint_info(*constraint, None, &mut inline_indexes, &mut foreign_keys);
            if let NodeKind::DefaultConstraint {
                expression,
                column: Some(column),
                ..
            } = self.tree.kind(*constraint)
            {
                if let Some(target) = table.column_mut(&column.value) {
                    target.default_value = Some(self.tree.text_of(*expression));
                }
            }
        }
        for index in indexes {
            if let Some(info) = self.index_definition(*index) {
                inline_indexes.push(info);
            }
        }

        for mut index in inline_indexes {
            self.own_index(&mut index, &table.object);
            table.indexes.push(index);
        }
        for mut fk in foreign_keys {
            fk.database = table.object.database.clone();
            fk.schema = table.object.schema.clone();
            fk.table = table.object.name.clone();
            table.foreign_keys.push(fk);
        }
        Ok(table)
    }

    fn extract_alter_table(
        &mut self,
        node: NodeId,
        name: &SchemaObjectName,
        columns: &[NodeId],
        constraints: &[NodeId],
    ) -> Result<(), AnalysisError> {
        let mut indexes = Vec::new();
        let mut foreign_keys = Vec::new();
        let mut added = Vec::new();
        for column in columns {
            added.push(self.column_info(*column, &mut indexes, &mut foreign_keys));
        }
        let mut defaults = Vec::new();
        for constraint in constraints {
            self.constraint_info(*constraint, None, &mut indexes, &mut foreign_keys);
            if let NodeKind::DefaultConstraint {
                expression,
                column: Some(column),
                ..
            } = self.tree.kind(*constraint)
            {
                defaults.push((column.value.clone(), self.tree.text_of(*expression)));
            }
        }

        // Check constraints alone define nothing
        if added.is_empty() && indexes.is_empty() && foreign_keys.is_empty() && defaults.is_empty()
        {
            return Ok(());
        }
        let database = if !added.is_empty() || !indexes.is_empty() {
            self.require_database(node, name, "Table")?
        } else if !foreign_keys.is_empty() {
            self.require_database(node, name, "ForeignKey")?
        } else {
            match self.database(node, name) {
                Some(database) => database,
                None => {
                    warn!(
                        path = %self.path.display(),
                        table = %name,
                        "Cannot determine the database of ALTER TABLE defaults, skipped"
                    );
                    return Ok(());
                }
            }
        };
        let owner = DatabaseObject {
            database,
            schema: name.schema_or(self.default_schema).to_string(),
            name: name.base_name().to_string(),
            node,
            region: self.tree.region(node),
            path: self.path.to_path_buf(),
        };

        for mut index in indexes {
            self.own_index(&mut index, &owner);
            self.out.indexes.push(index);
        }
        for mut fk in foreign_keys {
            fk.database = owner.database.clone();
            fk.schema = owner.schema.clone();
            fk.table = owner.name.clone();
            self.out.foreign_keys.push(fk);
        }
        if !added.is_empty() || !defaults.is_empty() {
            self.out.additions.push(TableAddition {
                database: owner.database.clone(),
                schema: owner.schema.clone(),
                table: owner.name.clone(),
                columns: added,
                defaults,
            });
        }
        Ok(())
    }

    fn column_info(
        &self,
        node: NodeId,
        indexes: &mut Vec<IndexInfo>,
        foreign_keys: &mut Vec<ForeignKeyInfo>,
    ) -> ColumnInfo {
        let NodeKind::ColumnDefinition {
            name,
            data_type,
            nullable,
            identity,
            constraints,
            index,
            ..
        } = self.tree.kind(node)
        else {
            return ColumnInfo::new(String::new(), None, 0);
        };
        let mut column = ColumnInfo::new(name.value.clone(), data_type.clone(), 0);
        column.is_identity = *identity;
        if let Some(nullable) = nullable {
            column.is_nullable = *nullable;
            column.explicit_nullability = true;
        }
        for constraint in constraints {
            self.constraint_info(*constraint, Some(name), indexes, foreign_keys);
            if let NodeKind::DefaultConstraint { expression, .. } = self.tree.kind(*constraint) {
                column.default_value = Some(self.tree.text_of(*expression));
            }
        }
        if let Some(index) = index.and_then(|i| self.index_definition(i)) {
            indexes.push(index);
        }
        column
    }

    /// Primary key and unique constraints become indexes; foreign keys
    /// become one entry per column. Owner fields are filled in later.
    fn constraint_info(
        &self,
        node: NodeId,
        column: Option<&Identifier>,
        indexes: &mut Vec<IndexInfo>,
        foreign_keys: &mut Vec<ForeignKeyInfo>,
    ) {
        match self.tree.kind(node) {
            NodeKind::UniqueConstraint {
                name,
                primary_key,
                clustered,
                columns,
            } => {
                let flags = IndexFlags {
                    unique: true,
                    primary_key: *primary_key,
                    // PRIMARY KEY defaults to clustered, UNIQUE to nonclustered
                    clustered: clustered.unwrap_or(*primary_key),
                    ..IndexFlags::default()
                };
                let columns = if columns.is_empty() {
                    column.into_iter().map(|c| c.value.clone()).collect()
                } else {
                    columns.iter().map(|c| c.value.clone()).collect()
                };
                indexes.push(self.unowned_index(node, name.as_ref(), flags, columns, Vec::new()));
            }
            NodeKind::ForeignKeyConstraint {
                name,
                columns,
                referenced_table,
                referenced_columns,
            } => {
                for (i, fk_column) in columns.iter().enumerate() {
                    foreign_keys.push(ForeignKeyInfo {
                        database: String::new(),
                        schema: String::new(),
                        table: String::new(),
                        column: fk_column.value.clone(),
                        constraint_name: name.as_ref().map(|n| n.value.clone()),
                        referenced_schema: referenced_table
                            .schema_or(self.default_schema)
                            .to_string(),
                        referenced_table: referenced_table.base_name().to_string(),
                        referenced_column: referenced_columns.get(i).map(|c| c.value.clone()),
                    });
                }
            }
            _ => {}
        }
    }

    /// Inline `INDEX ix (...)` of a table or column.
    fn index_definition(&self, node: NodeId) -> Option<IndexInfo> {
        let NodeKind::IndexDefinition {
            name,
            unique,
            clustered,
            columns,
            included_columns,
            filter,
        } = self.tree.kind(node)
        else {
            return None;
        };
        let flags = IndexFlags {
            unique: *unique,
            clustered: clustered.unwrap_or(false),
            filtered: filter.is_some(),
            with_included_columns: !included_columns.is_empty(),
            ..IndexFlags::default()
        };
        Some(self.unowned_index(
            node,
            Some(name),
            flags,
            columns.iter().map(|c| c.value.clone()).collect(),
            included_columns.iter().map(|c| c.value.clone()).collect(),
        ))
    }

    fn extract_index_statement(&self, node: NodeId) -> Result<IndexInfo, AnalysisError> {
        let NodeKind::CreateIndexStatement {
            name,
            on_name,
            index_type,
            unique,
            clustered,
            columns,
            included_columns,
            filter,
        } = self.tree.kind(node)
        else {
            return Err(AnalysisError::InvalidInput {
                message: format!("node {node} is not a CREATE INDEX statement"),
            });
        };
        let flags = IndexFlags {
            unique: *unique,
            clustered: clustered.unwrap_or(false),
            filtered: filter.is_some(),
            spatial: *index_type == IndexType::Spatial,
            xml: *index_type == IndexType::Xml,
            full_text: *index_type == IndexType::FullText,
            column_store: *index_type == IndexType::ColumnStore,
            with_included_columns: !included_columns.is_empty(),
            ..IndexFlags::default()
        };
        let owner = self.object(node, on_name, "Index")?;
        let mut index = self.unowned_index(
            node,
            name.as_ref(),
            flags,
            columns.iter().map(|c| c.value.clone()).collect(),
            included_columns.iter().map(|c| c.value.clone()).collect(),
        );
        self.own_index(&mut index, &owner);
        Ok(index)
    }

    fn unowned_index(
        &self,
        node: NodeId,
        name: Option<&Identifier>,
        flags: IndexFlags,
        columns: Vec<String>,
        included_columns: Vec<String>,
    ) -> IndexInfo {
        let name = name.map(|n| n.value.clone());
        IndexInfo {
            object: DatabaseObject {
                database: String::new(),
                schema: String::new(),
                name: name.clone().unwrap_or_default(),
                node,
                region: self.tree.region(node),
                path: self.path.to_path_buf(),
            },
            table: String::new(),
            name,
            flags,
            columns,
            included_columns,
        }
    }

    fn own_index(&self, index: &mut IndexInfo, owner: &DatabaseObject) {
        index.object.database = owner.database.clone();
        index.object.schema = owner.schema.clone();
        index.table = owner.name.clone();
    }
}

fn parameter_info(parameter: &ParameterDefinition) -> ParameterInfo {
    ParameterInfo {
        name: parameter.name.value.clone(),
        data_type: parameter.data_type.clone(),
        is_output: parameter.is_output,
    }
}
