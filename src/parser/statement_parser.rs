//! Statement-level grammar: dispatch, control flow and data modification
//!
//! ## Supported Syntax
//!
//! ```sql
//! USE [Sales]
//! [WITH cte AS (...)] SELECT | INSERT | UPDATE | DELETE | MERGE ...
//! DECLARE @a INT = 1, @t TABLE (...) | DECLARE c CURSOR FOR SELECT ...
//! SET @a = expr
//! EXEC [@rc =] dbo.Proc @p = 1
//! IF pred stmt [ELSE stmt] | WHILE pred stmt
//! BEGIN ... END | BEGIN TRY ... END TRY BEGIN CATCH ... END CATCH
//! RETURN [expr]
//! ```

use sqlparser::tokenizer::Token;

use super::tsql_parser::FragmentParser;
use crate::syntax::{MergeCondition, NodeId, NodeKind};

const OUTPUT_STOP_WORDS: &[&str] = &[
    "INTO", "FROM", "WHERE", "VALUES", "SELECT", "DEFAULT", "EXEC", "EXECUTE", "OPTION",
];

impl FragmentParser<'_> {
    /// Parse the statement at the cursor, or `None` if the grammar does not
    /// cover it.
    pub(super) fn parse_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if self.base.check_token(&Token::LParen) {
            return self.parse_select_statement(Vec::new(), start);
        }
        let word = self.base.current_word()?;
        if word.quote_style.is_some() {
            return None;
        }
        let keyword = word.value.to_uppercase();
        match keyword.as_str() {
            "WITH" => self.parse_statement_with_ctes(),
            "SELECT" => self.parse_select_statement(Vec::new(), start),
            "INSERT" => self.parse_insert_statement(Vec::new(), start),
            "UPDATE" => self.parse_update_statement(Vec::new(), start),
            "DELETE" => self.parse_delete_statement(Vec::new(), start),
            "MERGE" => self.parse_merge_statement(Vec::new(), start),
            "USE" => self.parse_use_statement(),
            "CREATE" => self.parse_create_statement(),
            "ALTER" => self.parse_alter_statement(),
            "DECLARE" => self.parse_declare_statement(),
            "SET" => self.parse_set_variable_statement(),
            "EXEC" | "EXECUTE" => self.parse_execute_statement(),
            "IF" => self.parse_if_statement(),
            "WHILE" => self.parse_while_statement(),
            "BEGIN" => self.parse_begin_statement(),
            "RETURN" => self.parse_return_statement(),
            _ => None,
        }
    }

    fn parse_statement_with_ctes(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let ctes = self.parse_cte_list()?;
        if self.base.check_token(&Token::LParen) || self.base.check_word_ci("SELECT") {
            self.parse_select_statement(ctes, start)
        } else if self.base.check_word_ci("INSERT") {
            self.parse_insert_statement(ctes, start)
        } else if self.base.check_word_ci("UPDATE") {
            self.parse_update_statement(ctes, start)
        } else if self.base.check_word_ci("DELETE") {
            self.parse_delete_statement(ctes, start)
        } else if self.base.check_word_ci("MERGE") {
            self.parse_merge_statement(ctes, start)
        } else {
            None
        }
    }

    fn parse_use_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("USE")?;
        let database = self.base.parse_identifier()?;
        Some(self.node(NodeKind::UseStatement { database }, start))
    }

    // ========================================================================
    // Data modification
    // ========================================================================

    fn parse_insert_statement(&mut self, ctes: Vec<NodeId>, start: usize) -> Option<NodeId> {
        let spec_start = self.base.pos();
        self.base.expect_word_ci("INSERT")?;
        self.skip_top_clause();
        self.base.eat_word_ci("INTO");
        let target = self.parse_dml_target()?;

        let mut columns = Vec::new();
        if self.base.check_token(&Token::LParen)
            && !self.base.peek_word_ci(1, "SELECT")
            && !self.base.peek_token(1, &Token::LParen)
        {
            self.base.advance();
            loop {
                columns.push(self.parse_column_reference()?);
                if !self.base.eat_token(&Token::Comma) {
                    break;
                }
            }
            self.base.expect_token(&Token::RParen)?;
        }
        self.skip_output_clause();

        let source = if self.base.check_word_ci("VALUES") {
            Some(self.parse_values_source()?)
        } else if self.base.check_word_ci("DEFAULT") && self.base.peek_word_ci(1, "VALUES") {
            self.base.advance();
            self.base.advance();
            None
        } else if self.base.check_any_word_ci(&["EXEC", "EXECUTE"]) {
            let source_start = self.base.pos();
            let execute = self.parse_execute_statement()?;
            Some(self.node(NodeKind::ExecuteInsertSource { execute }, source_start))
        } else {
            let source_start = self.base.pos();
            let query = self.parse_query_expression()?;
            Some(self.node(NodeKind::SelectInsertSource { query }, source_start))
        };
        self.skip_option_clause();

        let specification = self.node(
            NodeKind::InsertSpecification {
                target,
                columns,
                source,
            },
            spec_start,
        );
        Some(self.node(
            NodeKind::InsertStatement {
                ctes,
                specification,
            },
            start,
        ))
    }

    fn parse_values_source(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("VALUES")?;
        let mut rows = Vec::new();
        loop {
            let row_start = self.base.pos();
            self.base.expect_token(&Token::LParen)?;
            let values = self.parse_expression_list()?;
            self.base.expect_token(&Token::RParen)?;
            rows.push(self.node(NodeKind::RowValue { values }, row_start));
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(self.node(NodeKind::ValuesInsertSource { rows }, start))
    }

    fn parse_update_statement(&mut self, ctes: Vec<NodeId>, start: usize) -> Option<NodeId> {
        let spec_start = self.base.pos();
        self.base.expect_word_ci("UPDATE")?;
        self.skip_top_clause();
        let target = self.parse_dml_target()?;
        self.base.expect_word_ci("SET")?;
        let set_clauses = self.parse_set_clause_list()?;
        self.skip_output_clause();
        let from = self.parse_optional_from_clause()?;
        let where_clause = self.parse_dml_where_clause()?;
        self.skip_option_clause();

        let specification = self.node(
            NodeKind::UpdateSpecification {
                target,
                set_clauses,
                from,
                where_clause,
            },
            spec_start,
        );
        Some(self.node(
            NodeKind::UpdateStatement {
                ctes,
                specification,
            },
            start,
        ))
    }

    fn parse_delete_statement(&mut self, ctes: Vec<NodeId>, start: usize) -> Option<NodeId> {
        let spec_start = self.base.pos();
        self.base.expect_word_ci("DELETE")?;
        self.skip_top_clause();
        self.base.eat_word_ci("FROM");
        let target = self.parse_dml_target()?;
        self.skip_output_clause();
        let from = self.parse_optional_from_clause()?;
        let where_clause = self.parse_dml_where_clause()?;
        self.skip_option_clause();

        let specification = self.node(
            NodeKind::DeleteSpecification {
                target,
                from,
                where_clause,
            },
            spec_start,
        );
        Some(self.node(
            NodeKind::DeleteStatement {
                ctes,
                specification,
            },
            start,
        ))
    }

    /// `FROM ...` when present. The outer `Option` is the parse result.
    fn parse_optional_from_clause(&mut self) -> Option<Option<NodeId>> {
        if self.base.check_word_ci("FROM") {
            Some(Some(self.parse_from_clause()?))
        } else {
            Some(None)
        }
    }

    /// `WHERE pred`, or `WHERE CURRENT OF cursor` which carries no predicate.
    fn parse_dml_where_clause(&mut self) -> Option<Option<NodeId>> {
        if !self.base.eat_word_ci("WHERE") {
            return Some(None);
        }
        if self.base.check_word_ci("CURRENT") && self.base.peek_word_ci(1, "OF") {
            self.base.advance();
            self.base.advance();
            self.base.eat_word_ci("GLOBAL");
            self.base.parse_identifier()?;
            return Some(None);
        }
        Some(Some(self.parse_boolean_expression()?))
    }

    fn parse_merge_statement(&mut self, ctes: Vec<NodeId>, start: usize) -> Option<NodeId> {
        let spec_start = self.base.pos();
        self.base.expect_word_ci("MERGE")?;
        self.skip_top_clause();
        self.base.eat_word_ci("INTO");
        let target = self.parse_dml_target()?;
        // The alias of the target lives on the specification, not the target
        let table_alias = self.parse_table_alias();
        self.base.expect_word_ci("USING")?;
        let source = self.parse_table_source()?;
        self.base.expect_word_ci("ON")?;
        let search_condition = self.parse_boolean_expression()?;

        let mut actions = Vec::new();
        while self.base.check_word_ci("WHEN") {
            actions.push(self.parse_merge_action_clause()?);
        }
        self.skip_output_clause();
        self.skip_option_clause();

        let specification = self.node(
            NodeKind::MergeSpecification {
                target,
                table_alias,
                source,
                search_condition,
                actions,
            },
            spec_start,
        );
        Some(self.node(
            NodeKind::MergeStatement {
                ctes,
                specification,
            },
            start,
        ))
    }

    fn parse_merge_action_clause(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("WHEN")?;
        let condition = if self.base.eat_word_ci("MATCHED") {
            MergeCondition::Matched
        } else {
            self.base.expect_word_ci("NOT")?;
            self.base.expect_word_ci("MATCHED")?;
            if self.base.eat_word_ci("BY") {
                if self.base.eat_word_ci("SOURCE") {
                    MergeCondition::NotMatchedBySource
                } else {
                    self.base.expect_word_ci("TARGET")?;
                    MergeCondition::NotMatched
                }
            } else {
                MergeCondition::NotMatched
            }
        };
        let search_condition = if self.base.eat_word_ci("AND") {
            Some(self.parse_boolean_expression()?)
        } else {
            None
        };
        self.base.expect_word_ci("THEN")?;

        let action_start = self.base.pos();
        let action = if self.base.eat_word_ci("UPDATE") {
            self.base.expect_word_ci("SET")?;
            let set_clauses = self.parse_set_clause_list()?;
            self.node(NodeKind::UpdateMergeAction { set_clauses }, action_start)
        } else if self.base.eat_word_ci("DELETE") {
            self.node(NodeKind::DeleteMergeAction, action_start)
        } else {
            self.base.expect_word_ci("INSERT")?;
            let mut columns = Vec::new();
            if self.base.eat_token(&Token::LParen) {
                loop {
                    columns.push(self.parse_column_reference()?);
                    if !self.base.eat_token(&Token::Comma) {
                        break;
                    }
                }
                self.base.expect_token(&Token::RParen)?;
            }
            let values = if self.base.eat_word_ci("DEFAULT") {
                self.base.expect_word_ci("VALUES")?;
                Vec::new()
            } else {
                self.base.expect_word_ci("VALUES")?;
                self.base.expect_token(&Token::LParen)?;
                let values = self.parse_expression_list()?;
                self.base.expect_token(&Token::RParen)?;
                values
            };
            self.node(NodeKind::InsertMergeAction { columns, values }, action_start)
        };

        Some(self.node(
            NodeKind::MergeActionClause {
                condition,
                search_condition,
                action,
            },
            start,
        ))
    }

    fn parse_set_clause_list(&mut self) -> Option<Vec<NodeId>> {
        let mut clauses = Vec::new();
        loop {
            clauses.push(self.parse_set_clause()?);
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(clauses)
    }

    /// `col = expr`, `@v = expr`, `@v = col = expr` or a compound `col += expr`.
    fn parse_set_clause(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut variable = None;
        let mut column = None;

        if self.base.check_variable() && self.base.peek_token(1, &Token::Eq) {
            variable = self.base.parse_identifier();
            self.base.advance();
            // `@v = col = expr` assigns both
            let save = self.base.pos();
            match self.parse_column_reference() {
                Some(col) if self.eat_assignment_operator() => column = Some(col),
                _ => self.base.set_pos(save),
            }
        } else {
            column = Some(self.parse_column_reference()?);
            if !self.eat_assignment_operator() {
                return None;
            }
        }

        let value = self.parse_expression()?;
        Some(self.node(
            NodeKind::AssignmentSetClause {
                variable,
                column,
                value,
            },
            start,
        ))
    }

    /// `=` or a compound assignment such as `+=`, as one token or two.
    pub(super) fn eat_assignment_operator(&mut self) -> bool {
        if self.base.eat_token(&Token::Eq) {
            return true;
        }
        let Some(token) = self.base.current_token() else {
            return false;
        };
        let text = token.token.to_string();
        if matches!(
            text.as_str(),
            "+=" | "-=" | "*=" | "/=" | "%=" | "&=" | "|=" | "^="
        ) {
            self.base.advance();
            return true;
        }
        let is_operator = matches!(
            token.token,
            Token::Plus
                | Token::Minus
                | Token::Mul
                | Token::Div
                | Token::Mod
                | Token::Ampersand
                | Token::Pipe
                | Token::Caret
        );
        if is_operator && self.base.peek_token(1, &Token::Eq) {
            self.base.advance();
            self.base.advance();
            return true;
        }
        false
    }

    /// `OUTPUT ... [INTO target [(cols)]]`; the output list is not modeled.
    fn skip_output_clause(&mut self) {
        if !self.base.eat_word_ci("OUTPUT") {
            return;
        }
        self.skip_until_words(OUTPUT_STOP_WORDS);
        if self.base.eat_word_ci("INTO") {
            self.skip_until_words(&["FROM", "WHERE", "VALUES", "DEFAULT", "OPTION"]);
        }
    }

    // ========================================================================
    // Procedural statements
    // ========================================================================

    fn parse_declare_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("DECLARE")?;

        if !self.base.check_variable() {
            let cursor = self.base.parse_identifier()?;
            // INSENSITIVE, SCROLL, CURSOR, LOCAL, FORWARD_ONLY, STATIC, ...
            while !self.base.check_word_ci("FOR") {
                if self.base.is_at_end() || self.base.check_token(&Token::SemiColon) {
                    return None;
                }
                self.base.advance();
            }
            self.base.expect_word_ci("FOR")?;
            let select = self.parse_select_with_optional_ctes()?;
            if self.base.check_word_ci("FOR") {
                // FOR READ ONLY | FOR UPDATE [OF cols]
                self.base.advance();
                self.skip_until_words(&[]);
            }
            return Some(self.node(NodeKind::DeclareCursorStatement { cursor, select }, start));
        }

        let mut variables = Vec::new();
        let mut values = Vec::new();
        loop {
            if !self.base.check_variable() {
                return None;
            }
            variables.push(self.base.parse_identifier()?);
            self.base.eat_word_ci("AS");
            if self.base.eat_word_ci("TABLE") {
                if !self.base.skip_parenthesized() {
                    return None;
                }
            } else {
                self.parse_data_type()?;
                if self.base.eat_token(&Token::Eq) {
                    values.push(self.parse_expression()?);
                }
            }
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(self.node(NodeKind::DeclareVariableStatement { variables, values }, start))
    }

    /// `SET @v = expr`; session options such as `SET NOCOUNT ON` are not covered.
    fn parse_set_variable_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("SET")?;
        if !self.base.check_variable() {
            return None;
        }
        let variable = self.base.parse_identifier()?;
        if !self.eat_assignment_operator() {
            return None;
        }
        let expression = self.parse_expression()?;
        Some(self.node(
            NodeKind::SetVariableStatement {
                variable,
                expression,
            },
            start,
        ))
    }

    pub(super) fn parse_execute_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if !self.base.eat_word_ci("EXEC") {
            self.base.expect_word_ci("EXECUTE")?;
        }
        if self.base.check_variable() && self.base.peek_token(1, &Token::Eq) {
            // Return status variable
            self.base.advance();
            self.base.advance();
        }
        let procedure = if self.base.check_token(&Token::LParen) {
            // Dynamic SQL string
            self.base.skip_parenthesized();
            None
        } else if self.base.check_variable() {
            self.base.advance();
            None
        } else {
            Some(self.parse_schema_object_name()?)
        };
        self.skip_until_words(&[]);
        Some(self.node(NodeKind::ExecuteStatement { procedure }, start))
    }

    fn parse_if_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("IF")?;
        let predicate = self.parse_boolean_expression()?;
        if self.at_batch_end() {
            return None;
        }
        let then_statement = self.parse_statement_or_skip();
        let else_statement = if self.base.eat_word_ci("ELSE") {
            if self.at_batch_end() {
                return None;
            }
            Some(self.parse_statement_or_skip())
        } else {
            None
        };
        Some(self.node(
            NodeKind::IfStatement {
                predicate,
                then_statement,
                else_statement,
            },
            start,
        ))
    }

    fn parse_while_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("WHILE")?;
        let predicate = self.parse_boolean_expression()?;
        if self.at_batch_end() {
            return None;
        }
        let statement = self.parse_statement_or_skip();
        Some(self.node(
            NodeKind::WhileStatement {
                predicate,
                statement,
            },
            start,
        ))
    }

    fn parse_begin_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if self.base.peek_word_ci(1, "TRY") {
            return self.parse_try_catch_statement();
        }
        let transactional = ["TRAN", "TRANSACTION", "DISTRIBUTED", "DIALOG", "CONVERSATION"];
        if transactional.iter().any(|w| self.base.peek_word_ci(1, w)) {
            return None;
        }
        self.base.expect_word_ci("BEGIN")?;
        let statements = self.parse_statement_list(&["END"]);
        self.base.expect_word_ci("END")?;
        Some(self.node(NodeKind::BeginEndBlock { statements }, start))
    }

    fn parse_try_catch_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("BEGIN")?;
        self.base.expect_word_ci("TRY")?;
        let try_statements = self.parse_statement_list(&["END"]);
        self.base.expect_word_ci("END")?;
        self.base.expect_word_ci("TRY")?;
        self.base.expect_word_ci("BEGIN")?;
        self.base.expect_word_ci("CATCH")?;
        let catch_statements = self.parse_statement_list(&["END"]);
        self.base.expect_word_ci("END")?;
        self.base.expect_word_ci("CATCH")?;
        Some(self.node(
            NodeKind::TryCatchStatement {
                try_statements,
                catch_statements,
            },
            start,
        ))
    }

    fn parse_return_statement(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("RETURN")?;
        let has_expression = !(self.at_batch_end()
            || self.at_statement_start()
            || self.base.check_token(&Token::SemiColon));
        let expression = if has_expression {
            let save = self.base.pos();
            let expression = self.parse_expression();
            if expression.is_none() {
                self.base.set_pos(save);
            }
            expression
        } else {
            None
        };
        Some(self.node(NodeKind::ReturnStatement { expression }, start))
    }
}
