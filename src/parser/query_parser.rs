//! Query grammar: SELECT, common table expressions, table sources and joins
//!
//! Joins are built left-deep: `A JOIN B ON .. JOIN C ON ..` becomes
//! `Join(Join(A, B), C)`. A parenthesized join is returned as-is, without a
//! wrapper node.

use sqlparser::tokenizer::Token;

use super::identifier_utils::is_reserved_word;
use super::tsql_parser::FragmentParser;
use crate::syntax::{
    BinaryQueryOperator, Identifier, NodeId, NodeKind, QualifiedJoinType, SchemaObjectName,
    UnqualifiedJoinType,
};

/// Old-style table hints written without `WITH`, e.g. `FROM T (NOLOCK)`
const BARE_TABLE_HINTS: &[&str] = &[
    "NOLOCK", "READUNCOMMITTED", "READCOMMITTED", "REPEATABLEREAD", "SERIALIZABLE",
    "HOLDLOCK", "UPDLOCK", "XLOCK", "ROWLOCK", "PAGLOCK", "TABLOCK", "TABLOCKX", "NOWAIT",
    "READPAST", "INDEX",
];

/// Words that follow a table source without being its alias
const NON_ALIAS_WORDS: &[&str] = &["PIVOT", "UNPIVOT", "TABLESAMPLE", "OFFSET", "FETCH"];

impl FragmentParser<'_> {
    // ========================================================================
    // Statements and query expressions
    // ========================================================================

    /// `[WITH ctes] SELECT ...` as a `SelectStatement`.
    pub(super) fn parse_select_with_optional_ctes(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let ctes = if self.base.check_word_ci("WITH") {
            self.parse_cte_list()?
        } else {
            Vec::new()
        };
        self.parse_select_statement(ctes, start)
    }

    pub(super) fn parse_select_statement(
        &mut self,
        ctes: Vec<NodeId>,
        start: usize,
    ) -> Option<NodeId> {
        let query = self.parse_query_expression()?;
        self.skip_option_clause();
        Some(self.node(NodeKind::SelectStatement { ctes, query }, start))
    }

    pub(super) fn parse_cte_list(&mut self) -> Option<Vec<NodeId>> {
        self.base.expect_word_ci("WITH")?;
        let mut ctes = Vec::new();
        loop {
            let start = self.base.pos();
            let name = self.base.parse_identifier()?;
            let columns = if self.base.check_token(&Token::LParen) {
                self.parse_identifier_list()?
            } else {
                Vec::new()
            };
            self.base.expect_word_ci("AS")?;
            self.base.expect_token(&Token::LParen)?;
            let query = self.parse_query_expression()?;
            self.base.expect_token(&Token::RParen)?;
            ctes.push(self.node(
                NodeKind::CommonTableExpression {
                    name,
                    columns,
                    query,
                },
                start,
            ));
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(ctes)
    }

    /// Query specifications joined by UNION / EXCEPT / INTERSECT.
    pub(super) fn parse_query_expression(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut query = self.parse_query_primary()?;
        loop {
            let operator = if self.base.eat_word_ci("UNION") {
                if self.base.eat_word_ci("ALL") {
                    BinaryQueryOperator::UnionAll
                } else {
                    BinaryQueryOperator::Union
                }
            } else if self.base.eat_word_ci("EXCEPT") {
                BinaryQueryOperator::Except
            } else if self.base.eat_word_ci("INTERSECT") {
                BinaryQueryOperator::Intersect
            } else {
                break;
            };
            let second = self.parse_query_primary()?;
            // A trailing ORDER BY belongs to the whole set operation
            let order_by = match self.builder.kind_mut(second) {
                NodeKind::QuerySpecification { order_by, .. } => std::mem::take(order_by),
                _ => Vec::new(),
            };
            query = self.node(
                NodeKind::BinaryQueryExpression {
                    operator,
                    first: query,
                    second,
                    order_by,
                },
                start,
            );
        }
        Some(query)
    }

    fn parse_query_primary(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if self.base.eat_token(&Token::LParen) {
            let query = self.parse_query_expression()?;
            self.base.expect_token(&Token::RParen)?;
            return Some(self.node(NodeKind::QueryParenthesis { query }, start));
        }
        self.parse_query_specification()
    }

    fn parse_query_specification(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("SELECT")?;
        if !self.base.eat_word_ci("DISTINCT") {
            self.base.eat_word_ci("ALL");
        }
        self.skip_top_clause();

        let mut select_elements = Vec::new();
        loop {
            select_elements.push(self.parse_select_element()?);
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }

        let into = if self.base.eat_word_ci("INTO") {
            Some(self.parse_schema_object_name()?)
        } else {
            None
        };
        let from = if self.base.check_word_ci("FROM") {
            Some(self.parse_from_clause()?)
        } else {
            None
        };
        let where_clause = if self.base.eat_word_ci("WHERE") {
            Some(self.parse_boolean_expression()?)
        } else {
            None
        };
        let group_by = if self.base.check_word_ci("GROUP") && self.base.peek_word_ci(1, "BY") {
            self.base.advance();
            self.base.advance();
            self.base.eat_word_ci("ALL");
            self.parse_expression_list()?
        } else {
            Vec::new()
        };
        let having = if self.base.eat_word_ci("HAVING") {
            Some(self.parse_boolean_expression()?)
        } else {
            None
        };
        let order_by = self.parse_order_by_clause()?;
        self.skip_for_clause();

        Some(self.node(
            NodeKind::QuerySpecification {
                select_elements,
                into,
                from,
                where_clause,
                group_by,
                having,
                order_by,
            },
            start,
        ))
    }

    /// `ORDER BY expr [ASC|DESC], ... [OFFSET n ROWS [FETCH NEXT n ROWS ONLY]]`
    pub(super) fn parse_order_by_clause(&mut self) -> Option<Vec<NodeId>> {
        if !(self.base.check_word_ci("ORDER") && self.base.peek_word_ci(1, "BY")) {
            return Some(Vec::new());
        }
        self.base.advance();
        self.base.advance();
        let mut items = Vec::new();
        loop {
            items.push(self.parse_expression()?);
            if !self.base.eat_word_ci("ASC") {
                self.base.eat_word_ci("DESC");
            }
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        if self.base.eat_word_ci("OFFSET") {
            self.parse_expression()?;
            if !self.base.eat_word_ci("ROWS") {
                self.base.eat_word_ci("ROW");
            }
            if self.base.eat_word_ci("FETCH") {
                if !self.base.eat_word_ci("NEXT") {
                    self.base.eat_word_ci("FIRST");
                }
                self.parse_expression()?;
                if !self.base.eat_word_ci("ROWS") {
                    self.base.eat_word_ci("ROW");
                }
                self.base.expect_word_ci("ONLY")?;
            }
        }
        Some(items)
    }

    /// `FOR XML ...`, `FOR JSON ...` or `FOR BROWSE`
    fn skip_for_clause(&mut self) {
        let is_for_clause = self.base.check_word_ci("FOR")
            && ["XML", "JSON", "BROWSE"]
                .iter()
                .any(|w| self.base.peek_word_ci(1, w));
        if is_for_clause {
            self.base.advance();
            self.skip_until_words(&["UNION", "EXCEPT", "INTERSECT", "ORDER", "OPTION"]);
        }
    }

    fn parse_select_element(&mut self) -> Option<NodeId> {
        let start = self.base.pos();

        // *, t.*, dbo.t.*
        let mut qualifier = Vec::new();
        loop {
            if self.base.eat_token(&Token::Mul) {
                return Some(self.node(NodeKind::SelectStarExpression { qualifier }, start));
            }
            let is_qualifier_part = self.base.current_word().is_some()
                && self.base.peek_token(1, &Token::Period);
            if !is_qualifier_part {
                break;
            }
            qualifier.push(self.base.parse_identifier()?);
            self.base.advance();
        }
        self.base.set_pos(start);

        // @v = expr
        if self.base.check_variable() && self.base.peek_token(1, &Token::Eq) {
            let variable = self.base.parse_identifier()?;
            self.base.advance();
            let expression = self.parse_expression()?;
            return Some(self.node(
                NodeKind::SelectSetVariable {
                    variable,
                    expression,
                },
                start,
            ));
        }

        // alias = expr
        let is_alias_assignment = matches!(self.base.current_word(), Some(w) if !is_reserved_word(w) && !w.value.starts_with('@'))
            && self.base.peek_token(1, &Token::Eq);
        if is_alias_assignment {
            let alias = self.base.parse_identifier();
            self.base.advance();
            let expression = self.parse_expression()?;
            return Some(self.node(
                NodeKind::SelectScalarExpression { expression, alias },
                start,
            ));
        }

        let expression = self.parse_expression()?;
        let alias = if self.base.eat_word_ci("AS")
            || self
                .base
                .check_token(&Token::SingleQuotedString(String::new()))
        {
            Some(self.parse_alias_name()?)
        } else {
            self.parse_bare_alias()
        };
        Some(self.node(
            NodeKind::SelectScalarExpression { expression, alias },
            start,
        ))
    }

    /// Alias after `AS`: any identifier or a string literal.
    fn parse_alias_name(&mut self) -> Option<Identifier> {
        let token = self.base.current_token()?;
        if let Token::SingleQuotedString(text) = &token.token {
            let region = self.base.region_between(self.base.pos(), self.base.pos());
            let alias = Identifier {
                value: text.clone(),
                quote_style: Some('\''),
                region,
            };
            self.base.advance();
            return Some(alias);
        }
        self.base.parse_identifier()
    }

    /// Alias written without `AS`: a word that cannot continue the clause.
    fn parse_bare_alias(&mut self) -> Option<Identifier> {
        let word = self.base.current_word()?;
        if is_reserved_word(word)
            || word.value.starts_with('@')
            || (word.quote_style.is_none()
                && NON_ALIAS_WORDS
                    .iter()
                    .any(|w| w.eq_ignore_ascii_case(&word.value)))
        {
            return None;
        }
        self.base.parse_identifier()
    }

    // ========================================================================
    // Table sources
    // ========================================================================

    pub(super) fn parse_from_clause(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("FROM")?;
        let mut table_sources = Vec::new();
        loop {
            table_sources.push(self.parse_table_source()?);
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(self.node(NodeKind::FromClause { table_sources }, start))
    }

    /// A table primary followed by any number of joins.
    pub(super) fn parse_table_source(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut source = self.parse_table_primary()?;
        loop {
            if let Some(join_type) = self.eat_qualified_join() {
                let second = self.parse_table_primary()?;
                self.base.expect_word_ci("ON")?;
                let search_condition = self.parse_boolean_expression()?;
                source = self.node(
                    NodeKind::QualifiedJoin {
                        join_type,
                        first: source,
                        second,
                        search_condition,
                    },
                    start,
                );
            } else if let Some(join_type) = self.eat_unqualified_join() {
                let second = self.parse_table_primary()?;
                source = self.node(
                    NodeKind::UnqualifiedJoin {
                        join_type,
                        first: source,
                        second,
                    },
                    start,
                );
            } else {
                return Some(source);
            }
        }
    }

    fn eat_qualified_join(&mut self) -> Option<QualifiedJoinType> {
        let start = self.base.pos();
        let join_type = if self.base.eat_word_ci("INNER") {
            QualifiedJoinType::Inner
        } else if self.base.eat_word_ci("LEFT") {
            self.base.eat_word_ci("OUTER");
            QualifiedJoinType::LeftOuter
        } else if self.base.eat_word_ci("RIGHT") {
            self.base.eat_word_ci("OUTER");
            QualifiedJoinType::RightOuter
        } else if self.base.eat_word_ci("FULL") {
            self.base.eat_word_ci("OUTER");
            QualifiedJoinType::FullOuter
        } else {
            QualifiedJoinType::Inner
        };
        // Join hints
        if !self.base.eat_word_ci("LOOP") && !self.base.eat_word_ci("HASH") {
            if !self.base.eat_word_ci("MERGE") {
                self.base.eat_word_ci("REMOTE");
            }
        }
        if self.base.eat_word_ci("JOIN") {
            Some(join_type)
        } else {
            self.base.set_pos(start);
            None
        }
    }

    fn eat_unqualified_join(&mut self) -> Option<UnqualifiedJoinType> {
        let join_type = if self.base.check_word_ci("CROSS") && self.base.peek_word_ci(1, "JOIN") {
            UnqualifiedJoinType::CrossJoin
        } else if self.base.check_word_ci("CROSS") && self.base.peek_word_ci(1, "APPLY") {
            UnqualifiedJoinType::CrossApply
        } else if self.base.check_word_ci("OUTER") && self.base.peek_word_ci(1, "APPLY") {
            UnqualifiedJoinType::OuterApply
        } else {
            return None;
        };
        self.base.advance();
        self.base.advance();
        Some(join_type)
    }

    fn parse_table_primary(&mut self) -> Option<NodeId> {
        let start = self.base.pos();

        if self.base.check_token(&Token::LParen) {
            let is_query = self.base.peek_word_ci(1, "SELECT")
                || self.base.peek_word_ci(1, "WITH")
                || self.base.peek_token(1, &Token::LParen);
            if is_query {
                if let Some(derived) = self.parse_derived_table() {
                    return Some(derived);
                }
                self.base.set_pos(start);
            }
            // Parenthesized join: the inner source stands for itself
            self.base.advance();
            let inner = self.parse_table_source()?;
            self.base.expect_token(&Token::RParen)?;
            return Some(inner);
        }

        if self.base.check_variable() {
            let variable = self.base.parse_identifier()?;
            let alias = self.parse_table_alias();
            self.skip_table_hints();
            return Some(self.node(NodeKind::VariableTableReference { variable, alias }, start));
        }

        let name = self.parse_schema_object_name()?;
        if self.base.check_token(&Token::LParen) && !self.at_bare_table_hint() {
            self.base.advance();
            let arguments = if self.base.check_token(&Token::RParen) {
                Vec::new()
            } else {
                self.parse_expression_list()?
            };
            self.base.expect_token(&Token::RParen)?;
            let alias = self.parse_table_alias();
            self.skip_column_alias_list();
            return Some(self.node(
                NodeKind::FunctionTableReference {
                    name,
                    arguments,
                    alias,
                },
                start,
            ));
        }

        self.skip_table_hints();
        let alias = self.parse_table_alias();
        self.skip_table_hints();
        Some(self.node(NodeKind::NamedTableReference { name, alias }, start))
    }

    fn parse_derived_table(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_token(&Token::LParen)?;
        let query = self.parse_query_expression()?;
        self.base.expect_token(&Token::RParen)?;
        let alias = self.parse_table_alias();
        let columns = if self.base.check_token(&Token::LParen) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        Some(self.node(
            NodeKind::QueryDerivedTable {
                query,
                alias,
                columns,
            },
            start,
        ))
    }

    /// `[AS] alias`
    pub(super) fn parse_table_alias(&mut self) -> Option<Identifier> {
        if self.base.check_word_ci("AS") {
            let save = self.base.pos();
            self.base.advance();
            let alias = self.base.parse_identifier();
            if alias.is_none() {
                self.base.set_pos(save);
            }
            return alias;
        }
        self.parse_bare_alias()
    }

    /// Target of INSERT / UPDATE / DELETE / MERGE, never aliased in place.
    pub(super) fn parse_dml_target(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if self.base.check_variable() {
            let variable = self.base.parse_identifier()?;
            return Some(self.node(
                NodeKind::VariableTableReference {
                    variable,
                    alias: None,
                },
                start,
            ));
        }
        let name = self.parse_schema_object_name()?;
        let end = self.base.pos();
        self.skip_table_hints();
        let target = self.node_span(
            NodeKind::NamedTableReference { name, alias: None },
            start,
            end.saturating_sub(1).max(start),
        );
        Some(target)
    }

    /// `server.database.schema.object`, with empty parts as in `db..object`.
    pub(super) fn parse_schema_object_name(&mut self) -> Option<SchemaObjectName> {
        if let Some(word) = self.base.current_word() {
            if is_reserved_word(word) {
                return None;
            }
        }
        let mut parts = Vec::new();
        loop {
            parts.push(Some(self.base.parse_identifier()?));
            if !self.base.check_token(&Token::Period) {
                break;
            }
            self.base.advance();
            while self.base.check_token(&Token::Period) {
                parts.push(None);
                self.base.advance();
            }
        }
        SchemaObjectName::from_parts(parts)
    }

    /// `(a, b, c)`
    pub(super) fn parse_identifier_list(&mut self) -> Option<Vec<Identifier>> {
        self.base.expect_token(&Token::LParen)?;
        let mut identifiers = Vec::new();
        loop {
            identifiers.push(self.base.parse_identifier()?);
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        self.base.expect_token(&Token::RParen)?;
        Some(identifiers)
    }

    // ========================================================================
    // Skipped clauses
    // ========================================================================

    fn at_bare_table_hint(&self) -> bool {
        BARE_TABLE_HINTS
            .iter()
            .any(|hint| self.base.peek_word_ci(1, hint))
    }

    /// `WITH (NOLOCK, INDEX(ix))` or old-style `(NOLOCK)`
    fn skip_table_hints(&mut self) {
        loop {
            if self.base.check_word_ci("WITH") && self.base.peek_token(1, &Token::LParen) {
                self.base.advance();
                self.base.skip_parenthesized();
            } else if self.base.check_token(&Token::LParen) && self.at_bare_table_hint() {
                self.base.skip_parenthesized();
            } else {
                return;
            }
        }
    }

    fn skip_column_alias_list(&mut self) {
        if self.base.check_token(&Token::LParen) {
            self.base.skip_parenthesized();
        }
    }

    /// `TOP n [PERCENT] [WITH TIES]` or `TOP (expr) ...`
    pub(super) fn skip_top_clause(&mut self) {
        if !self.base.eat_word_ci("TOP") {
            return;
        }
        if !self.base.skip_parenthesized() {
            self.base.advance();
        }
        self.base.eat_word_ci("PERCENT");
        if self.base.check_word_ci("WITH") && self.base.peek_word_ci(1, "TIES") {
            self.base.advance();
            self.base.advance();
        }
    }

    /// `OPTION (query hints)`
    pub(super) fn skip_option_clause(&mut self) {
        if self.base.check_word_ci("OPTION") && self.base.peek_token(1, &Token::LParen) {
            self.base.advance();
            self.base.skip_parenthesized();
        }
    }
}
