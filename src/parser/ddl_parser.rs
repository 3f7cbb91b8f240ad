//! Definition grammar: tables, indexes, views, modules, synonyms and schemas
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE TABLE [db].[schema].[name] (col TYPE [NULL|NOT NULL] [IDENTITY] [constraints], ...,
//!     [CONSTRAINT name] PRIMARY KEY | UNIQUE | FOREIGN KEY | CHECK ..., INDEX ix (...))
//! CREATE [UNIQUE] [CLUSTERED|NONCLUSTERED] [COLUMNSTORE] INDEX ix ON t (...) [INCLUDE (...)] [WHERE ...]
//! CREATE SPATIAL | [PRIMARY] XML | FULLTEXT INDEX ...
//! ALTER TABLE t [WITH CHECK] ADD col TYPE | [CONSTRAINT name] ...
//! CREATE [OR ALTER] | ALTER VIEW | PROC[EDURE] | FUNCTION | TRIGGER ...
//! CREATE SYNONYM s FOR target
//! CREATE SCHEMA s [AUTHORIZATION owner]
//! ```

use sqlparser::tokenizer::Token;

use super::tsql_parser::FragmentParser;
use crate::syntax::{
    DefinitionMode, FunctionReturn, Identifier, IndexType, NodeId, NodeKind, ParameterDefinition,
    SchemaObjectName,
};

/// Elements of a CREATE TABLE body or an ALTER TABLE ... ADD list
#[derive(Default)]
struct TableElements {
    columns: Vec<NodeId>,
    constraints: Vec<NodeId>,
    indexes: Vec<NodeId>,
}

/// Leading options of CREATE ... INDEX
struct IndexOptions {
    index_type: IndexType,
    unique: bool,
    clustered: Option<bool>,
}

impl FragmentParser<'_> {
    pub(super) fn parse_create_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("CREATE")?;
        let mode = if self.base.check_word_ci("OR") && self.base.peek_word_ci(1, "ALTER") {
            self.base.advance();
            self.base.advance();
            DefinitionMode::CreateOrAlter
        } else {
            DefinitionMode::Create
        };

        if self.base.eat_word_ci("TABLE") {
            return self.parse_create_table(start);
        }
        if self.base.eat_word_ci("SYNONYM") {
            return self.parse_create_synonym(start);
        }
        if self.base.eat_word_ci("SCHEMA") {
            return self.parse_create_schema(start);
        }
        if let Some(statement) = self.parse_module_definition(start, mode) {
            return Some(statement);
        }
        self.parse_create_index(start)
    }

    pub(super) fn parse_alter_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("ALTER")?;
        if self.base.eat_word_ci("TABLE") {
            return self.parse_alter_table_add(start);
        }
        self.parse_module_definition(start, DefinitionMode::Alter)
    }

    /// VIEW, PROCEDURE, FUNCTION or TRIGGER after CREATE / ALTER.
    fn parse_module_definition(&mut self, start: usize, mode: DefinitionMode) -> Option<NodeId> {
        if self.base.eat_word_ci("VIEW") {
            self.parse_view_definition(start, mode)
        } else if self.base.eat_word_ci("PROCEDURE") || self.base.eat_word_ci("PROC") {
            self.parse_procedure_definition(start, mode)
        } else if self.base.eat_word_ci("FUNCTION") {
            self.parse_function_definition(start, mode)
        } else if self.base.eat_word_ci("TRIGGER") {
            self.parse_trigger_definition(start, mode)
        } else {
            None
        }
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn parse_create_table(&mut self, start: usize) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        self.base.expect_token(&Token::LParen)?;
        let mut elements = TableElements::default();
        loop {
            self.parse_table_element(&mut elements)?;
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
            // Trailing comma before `)`
            if self.base.check_token(&Token::RParen) {
                break;
            }
        }
        self.base.expect_token(&Token::RParen)?;
        // ON [PRIMARY], TEXTIMAGE_ON, WITH (...)
        self.skip_definition_options();
        Some(self.node(
            NodeKind::CreateTableStatement {
                name,
                columns: elements.columns,
                constraints: elements.constraints,
                indexes: elements.indexes,
            },
            start,
        ))
    }

    fn parse_table_element(&mut self, elements: &mut TableElements) -> Option<()> {
        if self.at_table_constraint() {
            elements.constraints.push(self.parse_table_constraint()?);
        } else if self.base.check_word_ci("INDEX") {
            elements.indexes.push(self.parse_inline_index(None)?);
        } else if self.base.check_word_ci("PERIOD") && self.base.peek_word_ci(1, "FOR") {
            // PERIOD FOR SYSTEM_TIME (start, end)
            self.base.advance();
            self.base.advance();
            self.base.advance();
            self.base.skip_parenthesized();
        } else {
            elements.columns.push(self.parse_column_definition()?);
        }
        Some(())
    }

    fn at_table_constraint(&self) -> bool {
        self.base.check_any_word_ci(&["CONSTRAINT", "UNIQUE", "CHECK"])
            || (self.base.check_word_ci("PRIMARY") && self.base.peek_word_ci(1, "KEY"))
            || (self.base.check_word_ci("FOREIGN") && self.base.peek_word_ci(1, "KEY"))
    }

    fn parse_alter_table_add(&mut self, start: usize) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        if self.base.check_word_ci("WITH")
            && (self.base.peek_word_ci(1, "CHECK") || self.base.peek_word_ci(1, "NOCHECK"))
        {
            self.base.advance();
            self.base.advance();
        }
        self.base.expect_word_ci("ADD")?;
        let mut elements = TableElements::default();
        loop {
            if self.at_table_constraint() || self.base.check_word_ci("DEFAULT") {
                elements.constraints.push(self.parse_table_constraint()?);
            } else {
                elements.columns.push(self.parse_column_definition()?);
            }
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(self.node(
            NodeKind::AlterTableAddElements {
                name,
                columns: elements.columns,
                constraints: elements.constraints,
            },
            start,
        ))
    }

    fn parse_column_definition(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let name = self.base.parse_identifier()?;

        let mut data_type = None;
        let mut computed = None;
        if self.base.eat_word_ci("AS") {
            computed = Some(self.parse_expression()?);
            self.base.eat_word_ci("PERSISTED");
        } else {
            data_type = Some(self.parse_data_type()?);
        }

        let mut nullable = None;
        let mut identity = false;
        let mut constraints = Vec::new();
        let mut index = None;
        loop {
            if self.base.eat_word_ci("NULL") {
                nullable = Some(true);
            } else if self.base.check_word_ci("NOT") && self.base.peek_word_ci(1, "NULL") {
                self.base.advance();
                self.base.advance();
                nullable = Some(false);
            } else if self.base.check_word_ci("NOT") && self.base.peek_word_ci(1, "FOR") {
                // NOT FOR REPLICATION
                self.base.advance();
                self.base.advance();
                self.base.advance();
            } else if self.base.eat_word_ci("IDENTITY") {
                identity = true;
                self.base.skip_parenthesized();
            } else if self.base.eat_word_ci("COLLATE") {
                self.base.parse_identifier()?;
            } else if self.base.check_word_ci("INDEX") {
                index = Some(self.parse_inline_index(Some(&name))?);
            } else if self.base.check_any_word_ci(&[
                "CONSTRAINT",
                "PRIMARY",
                "UNIQUE",
                "FOREIGN",
                "REFERENCES",
                "CHECK",
                "DEFAULT",
            ]) {
                constraints.push(self.parse_column_constraint(&name)?);
            } else if self.base.check_word_ci("MASKED") {
                // MASKED WITH (FUNCTION = '...')
                self.base.advance();
                self.base.eat_word_ci("WITH");
                self.base.skip_parenthesized();
            } else if self.base.check_word_ci("GENERATED") {
                // GENERATED ALWAYS AS ROW START | END
                for _ in 0..5 {
                    self.base.advance();
                }
            } else if self.base.check_any_word_ci(&[
                "SPARSE",
                "ROWGUIDCOL",
                "FILESTREAM",
                "PERSISTED",
                "HIDDEN",
            ]) {
                self.base.advance();
            } else {
                break;
            }
        }

        Some(self.node(
            NodeKind::ColumnDefinition {
                name,
                data_type,
                computed,
                nullable,
                identity,
                constraints,
                index,
            },
            start,
        ))
    }

    fn parse_constraint_name(&mut self) -> Option<Option<Identifier>> {
        if self.base.eat_word_ci("CONSTRAINT") {
            Some(Some(self.base.parse_identifier()?))
        } else {
            Some(None)
        }
    }

    /// Constraint attached to a single column definition.
    fn parse_column_constraint(&mut self, column: &Identifier) -> Option<NodeId> {
        let start = self.base.pos();
        let name = self.parse_constraint_name()?;

        if self.base.check_word_ci("PRIMARY") || self.base.check_word_ci("UNIQUE") {
            let primary_key = self.eat_key_kind()?;
            let clustered = self.eat_clustered();
            self.skip_index_options();
            return Some(self.node(
                NodeKind::UniqueConstraint {
                    name,
                    primary_key,
                    clustered,
                    columns: vec![column.clone()],
                },
                start,
            ));
        }
        if self.base.check_word_ci("FOREIGN") || self.base.check_word_ci("REFERENCES") {
            if self.base.eat_word_ci("FOREIGN") {
                self.base.expect_word_ci("KEY")?;
            }
            let (referenced_table, referenced_columns) = self.parse_references()?;
            return Some(self.node(
                NodeKind::ForeignKeyConstraint {
                    name,
                    columns: vec![column.clone()],
                    referenced_table,
                    referenced_columns,
                },
                start,
            ));
        }
        if self.base.eat_word_ci("CHECK") {
            return self.parse_check_body(name, start);
        }
        self.base.expect_word_ci("DEFAULT")?;
        let expression = self.parse_expression()?;
        self.skip_with_values();
        Some(self.node(
            NodeKind::DefaultConstraint {
                name,
                expression,
                column: Some(column.clone()),
            },
            start,
        ))
    }

    /// Table-level constraint, also used for ALTER TABLE ... ADD.
    fn parse_table_constraint(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let name = self.parse_constraint_name()?;

        if self.base.check_word_ci("PRIMARY") || self.base.check_word_ci("UNIQUE") {
            let primary_key = self.eat_key_kind()?;
            let clustered = self.eat_clustered();
            let columns = self.parse_index_column_list()?;
            self.skip_index_options();
            return Some(self.node(
                NodeKind::UniqueConstraint {
                    name,
                    primary_key,
                    clustered,
                    columns,
                },
                start,
            ));
        }
        if self.base.eat_word_ci("FOREIGN") {
            self.base.expect_word_ci("KEY")?;
            let columns = self.parse_identifier_list()?;
            let (referenced_table, referenced_columns) = self.parse_references()?;
            return Some(self.node(
                NodeKind::ForeignKeyConstraint {
                    name,
                    columns,
                    referenced_table,
                    referenced_columns,
                },
                start,
            ));
        }
        if self.base.eat_word_ci("CHECK") {
            return self.parse_check_body(name, start);
        }
        // DEFAULT expr FOR column
        self.base.expect_word_ci("DEFAULT")?;
        let expression = self.parse_expression()?;
        let column = if self.base.eat_word_ci("FOR") {
            Some(self.base.parse_identifier()?)
        } else {
            None
        };
        self.skip_with_values();
        Some(self.node(
            NodeKind::DefaultConstraint {
                name,
                expression,
                column,
            },
            start,
        ))
    }

    fn parse_check_body(&mut self, name: Option<Identifier>, start: usize) -> Option<NodeId> {
        if self.base.check_word_ci("NOT") && self.base.peek_word_ci(1, "FOR") {
            self.base.advance();
            self.base.advance();
            self.base.advance();
        }
        self.base.expect_token(&Token::LParen)?;
        let condition = self.parse_boolean_expression()?;
        self.base.expect_token(&Token::RParen)?;
        Some(self.node(NodeKind::CheckConstraint { name, condition }, start))
    }

    /// `PRIMARY KEY` (true) or `UNIQUE` (false)
    fn eat_key_kind(&mut self) -> Option<bool> {
        if self.base.eat_word_ci("PRIMARY") {
            self.base.expect_word_ci("KEY")?;
            Some(true)
        } else {
            self.base.expect_word_ci("UNIQUE")?;
            Some(false)
        }
    }

    fn eat_clustered(&mut self) -> Option<bool> {
        if self.base.eat_word_ci("CLUSTERED") {
            Some(true)
        } else if self.base.eat_word_ci("NONCLUSTERED") {
            Some(false)
        } else {
            None
        }
    }

    /// `REFERENCES table [(columns)] [ON DELETE ...] [ON UPDATE ...] [NOT FOR REPLICATION]`
    fn parse_references(&mut self) -> Option<(SchemaObjectName, Vec<Identifier>)> {
        self.base.expect_word_ci("REFERENCES")?;
        let table = self.parse_schema_object_name()?;
        let columns = if self.base.check_token(&Token::LParen) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        loop {
            if self.base.check_word_ci("ON")
                && (self.base.peek_word_ci(1, "DELETE") || self.base.peek_word_ci(1, "UPDATE"))
            {
                self.base.advance();
                self.base.advance();
                if self.base.eat_word_ci("NO") || self.base.eat_word_ci("SET") {
                    // NO ACTION | SET NULL | SET DEFAULT
                    self.base.advance();
                } else {
                    self.base.eat_word_ci("CASCADE");
                }
            } else if self.base.check_word_ci("NOT") && self.base.peek_word_ci(1, "FOR") {
                self.base.advance();
                self.base.advance();
                self.base.advance();
            } else {
                break;
            }
        }
        Some((table, columns))
    }

    /// `(col [ASC|DESC], ...)` keeping only the column names.
    fn parse_index_column_list(&mut self) -> Option<Vec<Identifier>> {
        self.base.expect_token(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.base.parse_identifier()?);
            // ASC | DESC, or full-text options such as TYPE COLUMN / LANGUAGE
            let mut depth = 0usize;
            while !self.base.is_at_end() {
                if depth == 0
                    && (self.base.check_token(&Token::Comma)
                        || self.base.check_token(&Token::RParen))
                {
                    break;
                }
                if self.base.check_token(&Token::LParen) {
                    depth += 1;
                } else if self.base.check_token(&Token::RParen) {
                    depth -= 1;
                }
                self.base.advance();
            }
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        self.base.expect_token(&Token::RParen)?;
        Some(columns)
    }

    /// `WITH (FILLFACTOR = 80, ...)` and `ON filegroup | scheme(col)`
    fn skip_index_options(&mut self) {
        loop {
            if self.base.check_word_ci("WITH") && self.base.peek_token(1, &Token::LParen) {
                self.base.advance();
                self.base.skip_parenthesized();
            } else if self.base.check_word_ci("ON")
                && !self.base.peek_word_ci(1, "DELETE")
                && !self.base.peek_word_ci(1, "UPDATE")
            {
                self.base.advance();
                self.base.parse_identifier();
                self.base.skip_parenthesized();
            } else {
                return;
            }
        }
    }

    /// Trailing storage and index options up to the end of the statement.
    fn skip_definition_options(&mut self) {
        while !self.at_batch_end() {
            if self.base.eat_word_ci("WITH") {
                continue;
            }
            if self.base.check_token(&Token::SemiColon)
                || self.base.check_token(&Token::RParen)
                || self.at_statement_start()
            {
                return;
            }
            if !self.base.skip_parenthesized() {
                self.base.advance();
            }
        }
    }

    /// `WITH VALUES` after a default constraint in ALTER TABLE ... ADD
    fn skip_with_values(&mut self) {
        if self.base.check_word_ci("WITH") && self.base.peek_word_ci(1, "VALUES") {
            self.base.advance();
            self.base.advance();
        }
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    /// `INDEX ix [UNIQUE] [CLUSTERED|NONCLUSTERED] [COLUMNSTORE] (cols) ...`,
    /// inside a table body or after a column definition.
    fn parse_inline_index(&mut self, column: Option<&Identifier>) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("INDEX")?;
        let name = self.base.parse_identifier()?;
        let unique = self.base.eat_word_ci("UNIQUE");
        let clustered = self.eat_clustered();
        self.base.eat_word_ci("COLUMNSTORE");
        let columns = match column {
            Some(column) if !self.base.check_token(&Token::LParen) => vec![column.clone()],
            _ if self.base.check_token(&Token::LParen) => self.parse_index_column_list()?,
            _ => Vec::new(),
        };
        let included_columns = self.parse_include_list()?;
        let filter = self.parse_index_filter()?;
        self.skip_index_options();
        Some(self.node(
            NodeKind::IndexDefinition {
                name,
                unique,
                clustered,
                columns,
                included_columns,
                filter,
            },
            start,
        ))
    }

    fn parse_create_index(&mut self, start: usize) -> Option<NodeId> {
        let options = self.parse_index_options()?;
        self.base.expect_word_ci("INDEX")?;
        let name = if options.index_type == IndexType::FullText {
            None
        } else {
            Some(self.base.parse_identifier()?)
        };
        self.base.expect_word_ci("ON")?;
        let on_name = self.parse_schema_object_name()?;
        let columns = if self.base.check_token(&Token::LParen) {
            self.parse_index_column_list()?
        } else {
            Vec::new()
        };
        let included_columns = self.parse_include_list()?;
        let filter = self.parse_index_filter()?;
        // WITH (...), ON filegroup, USING XML INDEX, KEY INDEX, ...
        self.skip_definition_options();
        Some(self.node(
            NodeKind::CreateIndexStatement {
                name,
                on_name,
                index_type: options.index_type,
                unique: options.unique,
                clustered: options.clustered,
                columns,
                included_columns,
                filter,
            },
            start,
        ))
    }

    fn parse_index_options(&mut self) -> Option<IndexOptions> {
        let mut options = IndexOptions {
            index_type: IndexType::Regular,
            unique: false,
            clustered: None,
        };
        if self.base.eat_word_ci("SPATIAL") {
            options.index_type = IndexType::Spatial;
        } else if self.base.eat_word_ci("FULLTEXT") {
            options.index_type = IndexType::FullText;
        } else if self.base.check_word_ci("XML")
            || (self.base.check_word_ci("PRIMARY") && self.base.peek_word_ci(1, "XML"))
        {
            self.base.eat_word_ci("PRIMARY");
            self.base.advance();
            options.index_type = IndexType::Xml;
        } else {
            options.unique = self.base.eat_word_ci("UNIQUE");
            options.clustered = self.eat_clustered();
            if self.base.eat_word_ci("COLUMNSTORE") {
                options.index_type = IndexType::ColumnStore;
            }
        }
        if self.base.check_word_ci("INDEX") {
            Some(options)
        } else {
            None
        }
    }

    fn parse_include_list(&mut self) -> Option<Vec<Identifier>> {
        if self.base.eat_word_ci("INCLUDE") {
            self.parse_identifier_list()
        } else {
            Some(Vec::new())
        }
    }

    fn parse_index_filter(&mut self) -> Option<Option<NodeId>> {
        if self.base.eat_word_ci("WHERE") {
            Some(Some(self.parse_boolean_expression()?))
        } else {
            Some(None)
        }
    }

    // ========================================================================
    // Views and modules
    // ========================================================================

    fn parse_view_definition(&mut self, start: usize, mode: DefinitionMode) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        let columns = if self.base.check_token(&Token::LParen) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        self.skip_module_options();
        self.base.expect_word_ci("AS")?;
        let select = self.parse_select_with_optional_ctes()?;
        if self.base.check_word_ci("WITH") && self.base.peek_word_ci(1, "CHECK") {
            // WITH CHECK OPTION
            self.base.advance();
            self.base.advance();
            self.base.eat_word_ci("OPTION");
        }
        Some(self.node(
            NodeKind::CreateViewStatement {
                name,
                columns,
                select,
                mode,
            },
            start,
        ))
    }

    fn parse_procedure_definition(
        &mut self,
        start: usize,
        mode: DefinitionMode,
    ) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        // Numbered procedures: `dbo.Proc;2`
        if self.base.check_token(&Token::SemiColon)
            && self
                .base
                .peek_token(1, &Token::Number(String::new(), false))
        {
            self.base.advance();
            self.base.advance();
        }
        let parenthesized = self.base.eat_token(&Token::LParen);
        let parameters = self.parse_parameter_list()?;
        if parenthesized {
            self.base.expect_token(&Token::RParen)?;
        }
        self.skip_module_options();
        if self.base.check_word_ci("FOR") && self.base.peek_word_ci(1, "REPLICATION") {
            self.base.advance();
            self.base.advance();
        }
        self.base.expect_word_ci("AS")?;
        let statements = self.parse_statement_list(&[]);
        Some(self.node(
            NodeKind::CreateProcedureStatement {
                name,
                parameters,
                statements,
                mode,
            },
            start,
        ))
    }

    fn parse_function_definition(
        &mut self,
        start: usize,
        mode: DefinitionMode,
    ) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        self.base.expect_token(&Token::LParen)?;
        let parameters = self.parse_parameter_list()?;
        self.base.expect_token(&Token::RParen)?;
        self.base.expect_word_ci("RETURNS")?;

        let mut statements = Vec::new();
        let returns = if self.base.eat_word_ci("TABLE") {
            // Inline table-valued function
            self.skip_module_options();
            self.base.eat_word_ci("AS");
            self.base.expect_word_ci("RETURN")?;
            let select = self.parse_select_with_optional_ctes()?;
            FunctionReturn::Table {
                select: Some(select),
            }
        } else {
            let returns = if self.base.check_variable() {
                let variable = self.base.parse_identifier()?;
                self.base.expect_word_ci("TABLE")?;
                if !self.base.skip_parenthesized() {
                    return None;
                }
                FunctionReturn::TableVariable(variable)
            } else {
                FunctionReturn::Scalar(self.parse_data_type()?)
            };
            self.skip_module_options();
            self.base.eat_word_ci("AS");
            statements = self.parse_statement_list(&[]);
            returns
        };

        Some(self.node(
            NodeKind::CreateFunctionStatement {
                name,
                parameters,
                returns,
                statements,
                mode,
            },
            start,
        ))
    }

    fn parse_trigger_definition(&mut self, start: usize, mode: DefinitionMode) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        self.base.expect_word_ci("ON")?;
        // DDL triggers name `DATABASE` or `ALL SERVER`
        self.base.eat_word_ci("ALL");
        let table = self.parse_schema_object_name()?;
        self.skip_module_options();
        // FOR | AFTER | INSTEAD OF  INSERT, UPDATE, DELETE  [NOT FOR REPLICATION]
        while !self.base.check_word_ci("AS") {
            if self.at_batch_end() {
                return None;
            }
            self.base.advance();
        }
        self.base.expect_word_ci("AS")?;
        let statements = self.parse_statement_list(&[]);
        Some(self.node(
            NodeKind::CreateTriggerStatement {
                name,
                table,
                statements,
                mode,
            },
            start,
        ))
    }

    /// `@p TYPE [VARYING] [= default] [OUT|OUTPUT] [READONLY], ...`
    fn parse_parameter_list(&mut self) -> Option<Vec<ParameterDefinition>> {
        let mut parameters = Vec::new();
        while self.base.check_variable() {
            let name = self.base.parse_identifier()?;
            self.base.eat_word_ci("AS");
            let data_type = self.parse_data_type()?;
            self.base.eat_word_ci("VARYING");
            if self.base.eat_token(&Token::Eq) {
                self.parse_expression()?;
            }
            let is_output = self.base.eat_word_ci("OUTPUT") || self.base.eat_word_ci("OUT");
            self.base.eat_word_ci("READONLY");
            parameters.push(ParameterDefinition {
                name,
                data_type,
                is_output,
            });
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(parameters)
    }

    /// `WITH SCHEMABINDING, ENCRYPTION, EXECUTE AS OWNER, ...`
    fn skip_module_options(&mut self) {
        if !self.base.check_word_ci("WITH") || self.base.peek_word_ci(1, "CHECK") {
            return;
        }
        self.base.advance();
        loop {
            if self.base.eat_word_ci("EXECUTE") || self.base.eat_word_ci("EXEC") {
                self.base.eat_word_ci("AS");
                self.base.advance();
            } else if self.base.check_word_ci("RETURNS") && self.base.peek_word_ci(1, "NULL") {
                // RETURNS NULL ON NULL INPUT
                for _ in 0..5 {
                    self.base.advance();
                }
            } else {
                self.base.advance();
                self.base.skip_parenthesized();
            }
            if !self.base.eat_token(&Token::Comma) {
                return;
            }
        }
    }

    // ========================================================================
    // Synonyms and schemas
    // ========================================================================

    fn parse_create_synonym(&mut self, start: usize) -> Option<NodeId> {
        let name = self.parse_schema_object_name()?;
        self.base.expect_word_ci("FOR")?;
        let target = self.parse_schema_object_name()?;
        Some(self.node(NodeKind::CreateSynonymStatement { name, target }, start))
    }

    fn parse_create_schema(&mut self, start: usize) -> Option<NodeId> {
        let name = self.base.parse_identifier()?;
        let authorization = if self.base.eat_word_ci("AUTHORIZATION") {
            Some(self.base.parse_identifier()?)
        } else {
            None
        };
        Some(self.node(
            NodeKind::CreateSchemaStatement {
                name,
                authorization,
            },
            start,
        ))
    }
}
