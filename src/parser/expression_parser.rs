//! Scalar and boolean expression grammar
//!
//! Precedence, loosest first: OR, AND, NOT, predicates (comparison, IS NULL,
//! IN, LIKE, BETWEEN, EXISTS), additive and bitwise operators,
//! multiplicative operators, unary operators, primaries.

use sqlparser::tokenizer::Token;

use super::identifier_utils::is_reserved_word;
use super::tsql_parser::FragmentParser;
use crate::syntax::{
    BinaryOperator, BooleanOperator, ColumnType, ComparisonOperator, Identifier, LiteralKind,
    NodeId, NodeKind, UnaryOperator,
};

impl FragmentParser<'_> {
    // ========================================================================
    // Boolean expressions
    // ========================================================================

    pub(super) fn parse_boolean_expression(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut left = self.parse_boolean_and()?;
        while self.base.eat_word_ci("OR") {
            let right = self.parse_boolean_and()?;
            left = self.node(
                NodeKind::BooleanBinary {
                    operator: BooleanOperator::Or,
                    first: left,
                    second: right,
                },
                start,
            );
        }
        Some(left)
    }

    fn parse_boolean_and(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut left = self.parse_boolean_not()?;
        while self.base.eat_word_ci("AND") {
            let right = self.parse_boolean_not()?;
            left = self.node(
                NodeKind::BooleanBinary {
                    operator: BooleanOperator::And,
                    first: left,
                    second: right,
                },
                start,
            );
        }
        Some(left)
    }

    fn parse_boolean_not(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if self.base.eat_word_ci("NOT") {
            let expression = self.parse_boolean_not()?;
            return Some(self.node(NodeKind::BooleanNot { expression }, start));
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> Option<NodeId> {
        let start = self.base.pos();

        if self.base.eat_word_ci("EXISTS") {
            let subquery = self.parse_parenthesized_subquery()?;
            return Some(self.node(NodeKind::ExistsPredicate { subquery }, start));
        }

        // `(a = 1 OR b = 2)` versus `(a + b) = c`
        if self.base.check_token(&Token::LParen)
            && !self.base.peek_word_ci(1, "SELECT")
            && !self.base.peek_word_ci(1, "WITH")
        {
            self.base.advance();
            let inner = self.parse_boolean_expression();
            if inner.is_some()
                && self.base.eat_token(&Token::RParen)
                && !self.at_scalar_continuation()
            {
                let expression = inner?;
                return Some(self.node(NodeKind::ParenthesisExpression { expression }, start));
            }
            self.base.set_pos(start);
        }

        let first = self.parse_expression()?;

        if let Some(operator) = self.eat_comparison_operator() {
            let second = if self.base.check_any_word_ci(&["ALL", "ANY", "SOME"])
                && self.base.peek_token(1, &Token::LParen)
            {
                self.base.advance();
                self.parse_parenthesized_subquery()?
            } else {
                self.parse_expression()?
            };
            return Some(self.node(
                NodeKind::BooleanComparison {
                    operator,
                    first,
                    second,
                },
                start,
            ));
        }

        if self.base.eat_word_ci("IS") {
            let negated = self.base.eat_word_ci("NOT");
            self.base.expect_word_ci("NULL")?;
            return Some(self.node(
                NodeKind::BooleanIsNull {
                    expression: first,
                    negated,
                },
                start,
            ));
        }

        let negated = self.base.check_word_ci("NOT")
            && ["IN", "LIKE", "BETWEEN"]
                .iter()
                .any(|w| self.base.peek_word_ci(1, w));
        if negated {
            self.base.advance();
        }

        if self.base.eat_word_ci("IN") {
            self.base.expect_token(&Token::LParen)?;
            let (values, subquery) = if self.base.check_word_ci("SELECT")
                || self.base.check_word_ci("WITH")
            {
                let query_start = self.base.pos();
                let query = self.parse_query_expression()?;
                let subquery = self.node(NodeKind::ScalarSubquery { query }, query_start);
                (Vec::new(), Some(subquery))
            } else {
                (self.parse_expression_list()?, None)
            };
            self.base.expect_token(&Token::RParen)?;
            return Some(self.node(
                NodeKind::InPredicate {
                    expression: first,
                    values,
                    subquery,
                    negated,
                },
                start,
            ));
        }

        if self.base.eat_word_ci("LIKE") {
            let second = self.parse_expression()?;
            if self.base.eat_word_ci("ESCAPE") {
                self.parse_expression()?;
            }
            return Some(self.node(
                NodeKind::LikePredicate {
                    first,
                    second,
                    negated,
                },
                start,
            ));
        }

        if self.base.eat_word_ci("BETWEEN") {
            let low = self.parse_expression()?;
            self.base.expect_word_ci("AND")?;
            let high = self.parse_expression()?;
            return Some(self.node(
                NodeKind::BetweenPredicate {
                    expression: first,
                    low,
                    high,
                    negated,
                },
                start,
            ));
        }

        if negated {
            return None;
        }
        // A bare scalar where a predicate was expected (e.g. IIF arguments)
        Some(first)
    }

    /// Whether the token after a closing `)` continues a scalar expression.
    fn at_scalar_continuation(&self) -> bool {
        let Some(token) = self.base.current_token() else {
            return false;
        };
        let continues_scalar = matches!(
            token.token,
            Token::Eq
                | Token::Neq
                | Token::Lt
                | Token::Gt
                | Token::LtEq
                | Token::GtEq
                | Token::Plus
                | Token::Minus
                | Token::Mul
                | Token::Div
                | Token::Mod
                | Token::Ampersand
                | Token::Pipe
                | Token::Caret
        );
        continues_scalar
            || self
                .base
                .check_any_word_ci(&["IS", "IN", "LIKE", "BETWEEN", "COLLATE"])
            || (self.base.check_word_ci("NOT")
                && ["IN", "LIKE", "BETWEEN"]
                    .iter()
                    .any(|w| self.base.peek_word_ci(1, w)))
    }

    fn eat_comparison_operator(&mut self) -> Option<ComparisonOperator> {
        let operator = match self.base.current_token().map(|t| &t.token) {
            Some(Token::Eq) => ComparisonOperator::Equals,
            Some(Token::Neq) => ComparisonOperator::NotEqual,
            Some(Token::Lt) => ComparisonOperator::LessThan,
            Some(Token::Gt) => ComparisonOperator::GreaterThan,
            Some(Token::LtEq) => ComparisonOperator::LessThanOrEqual,
            Some(Token::GtEq) => ComparisonOperator::GreaterThanOrEqual,
            _ => return None,
        };
        self.base.advance();
        Some(operator)
    }

    /// `( query )` as a `ScalarSubquery` node.
    fn parse_parenthesized_subquery(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_token(&Token::LParen)?;
        let query = self.parse_query_expression()?;
        self.base.expect_token(&Token::RParen)?;
        Some(self.node(NodeKind::ScalarSubquery { query }, start))
    }

    // ========================================================================
    // Scalar expressions
    // ========================================================================

    pub(super) fn parse_expression_list(&mut self) -> Option<Vec<NodeId>> {
        let mut expressions = Vec::new();
        loop {
            expressions.push(self.parse_expression()?);
            if !self.base.eat_token(&Token::Comma) {
                break;
            }
        }
        Some(expressions)
    }

    pub(super) fn parse_expression(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut left = self.parse_multiplicative()?;
        loop {
            let operator = match self.base.current_token().map(|t| &t.token) {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Subtract,
                Some(Token::Ampersand) => BinaryOperator::BitwiseAnd,
                Some(Token::Pipe) => BinaryOperator::BitwiseOr,
                Some(Token::Caret) => BinaryOperator::BitwiseXor,
                _ => break,
            };
            // `col += 1` is an assignment, not an addition
            if self.base.peek_token(1, &Token::Eq) {
                break;
            }
            self.base.advance();
            let right = self.parse_multiplicative()?;
            left = self.node(
                NodeKind::BinaryExpression {
                    operator,
                    first: left,
                    second: right,
                },
                start,
            );
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut left = self.parse_unary()?;
        loop {
            let operator = match self.base.current_token().map(|t| &t.token) {
                Some(Token::Mul) => BinaryOperator::Multiply,
                Some(Token::Div) => BinaryOperator::Divide,
                Some(Token::Mod) => BinaryOperator::Modulo,
                _ => break,
            };
            if self.base.peek_token(1, &Token::Eq) {
                break;
            }
            self.base.advance();
            let right = self.parse_unary()?;
            left = self.node(
                NodeKind::BinaryExpression {
                    operator,
                    first: left,
                    second: right,
                },
                start,
            );
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let operator = match self.base.current_token().map(|t| &t.token) {
            Some(Token::Minus) => Some(UnaryOperator::Negative),
            Some(Token::Plus) => Some(UnaryOperator::Positive),
            Some(Token::Tilde) => Some(UnaryOperator::BitwiseNot),
            _ => None,
        };
        if let Some(operator) = operator {
            self.base.advance();
            let expression = self.parse_unary()?;
            return Some(self.node(
                NodeKind::UnaryExpression {
                    operator,
                    expression,
                },
                start,
            ));
        }
        let primary = self.parse_primary()?;
        // COLLATE only changes comparison semantics
        if self.base.eat_word_ci("COLLATE") {
            self.base.parse_identifier()?;
        }
        Some(primary)
    }

    fn parse_primary(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let token = self.base.current_token()?.token.clone();
        match token {
            Token::Number(value, _) => {
                self.base.advance();
                let kind = if value.contains(['.', 'e', 'E']) {
                    LiteralKind::Numeric
                } else {
                    LiteralKind::Integer
                };
                Some(self.node(NodeKind::Literal { kind, value }, start))
            }
            Token::SingleQuotedString(value) | Token::NationalStringLiteral(value) => {
                self.base.advance();
                Some(self.node(
                    NodeKind::Literal {
                        kind: LiteralKind::String,
                        value,
                    },
                    start,
                ))
            }
            Token::HexStringLiteral(value) => {
                self.base.advance();
                Some(self.node(
                    NodeKind::Literal {
                        kind: LiteralKind::Numeric,
                        value: format!("0x{value}"),
                    },
                    start,
                ))
            }
            Token::Placeholder(value) => {
                // $action, $identity, $rowguid
                self.base.advance();
                let region = self.base.region_between(start, start);
                let parts = vec![Identifier {
                    value,
                    quote_style: None,
                    region,
                }];
                Some(self.node(
                    NodeKind::ColumnReference {
                        parts,
                        column_type: ColumnType::PseudoColumn,
                    },
                    start,
                ))
            }
            Token::LParen => {
                if self.base.peek_word_ci(1, "SELECT") || self.base.peek_word_ci(1, "WITH") {
                    self.base.advance();
                    let query = if self.base.check_word_ci("WITH") {
                        self.parse_select_with_optional_ctes()?
                    } else {
                        self.parse_query_expression()?
                    };
                    self.base.expect_token(&Token::RParen)?;
                    return Some(self.node(NodeKind::ScalarSubquery { query }, start));
                }
                self.base.advance();
                let expression = self.parse_expression()?;
                self.base.expect_token(&Token::RParen)?;
                Some(self.node(NodeKind::ParenthesisExpression { expression }, start))
            }
            Token::Word(word) => {
                if word.quote_style.is_none() {
                    let upper = word.value.to_uppercase();
                    match upper.as_str() {
                        "NULL" => {
                            self.base.advance();
                            return Some(self.literal(LiteralKind::Null, "NULL", start));
                        }
                        "DEFAULT" => {
                            self.base.advance();
                            return Some(self.literal(LiteralKind::Default, "DEFAULT", start));
                        }
                        "CASE" => return self.parse_case_expression(),
                        "CAST" | "TRY_CAST" if self.base.peek_token(1, &Token::LParen) => {
                            return self.parse_cast_call();
                        }
                        "CONVERT" | "TRY_CONVERT" if self.base.peek_token(1, &Token::LParen) => {
                            return self.parse_convert_call();
                        }
                        _ => {}
                    }
                    if word.value.starts_with('@') {
                        let name = self.base.parse_identifier()?;
                        return Some(self.node(NodeKind::VariableReference { name }, start));
                    }
                    if is_reserved_word(&word) && !self.base.peek_token(1, &Token::LParen) {
                        return None;
                    }
                }
                self.parse_column_or_function()
            }
            Token::Sharp => self.parse_column_or_function(),
            _ => None,
        }
    }

    fn literal(&mut self, kind: LiteralKind, value: &str, start: usize) -> NodeId {
        self.node(
            NodeKind::Literal {
                kind,
                value: value.to_string(),
            },
            start,
        )
    }

    /// Dotted identifiers, then either a function call or a column reference.
    fn parse_column_or_function(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        let mut parts = vec![self.base.parse_identifier()?];
        while self.base.check_token(&Token::Period) {
            self.base.advance();
            if self.base.check_token(&Token::Mul) {
                // `t.*` inside an expression such as COUNT(t.*)
                self.base.advance();
                return Some(self.node(
                    NodeKind::ColumnReference {
                        parts,
                        column_type: ColumnType::Wildcard,
                    },
                    start,
                ));
            }
            parts.push(self.base.parse_identifier()?);
        }

        if !self.base.check_token(&Token::LParen) {
            return Some(self.node(
                NodeKind::ColumnReference {
                    parts,
                    column_type: ColumnType::Regular,
                },
                start,
            ));
        }

        let name = parts.pop()?;
        let call_target = parts;
        self.base.advance();
        let mut arguments = Vec::new();
        if self.base.check_token(&Token::Mul) {
            // COUNT(*)
            let star = self.base.pos();
            self.base.advance();
            arguments.push(self.node(
                NodeKind::ColumnReference {
                    parts: Vec::new(),
                    column_type: ColumnType::Wildcard,
                },
                star,
            ));
        } else if !self.base.check_token(&Token::RParen) {
            if !self.base.eat_word_ci("DISTINCT") {
                self.base.eat_word_ci("ALL");
            }
            loop {
                // Arguments may be predicates, as in IIF(a > b, a, b)
                arguments.push(self.parse_boolean_expression()?);
                if !self.base.eat_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.base.expect_token(&Token::RParen)?;

        if self.base.check_word_ci("WITHIN") && self.base.peek_word_ci(1, "GROUP") {
            self.base.advance();
            self.base.advance();
            self.base.skip_parenthesized();
        }
        let over = if self.base.check_word_ci("OVER") && self.base.peek_token(1, &Token::LParen) {
            self.base.advance();
            self.parse_over_clause()?
        } else {
            Vec::new()
        };

        Some(self.node(
            NodeKind::FunctionCall {
                call_target,
                name,
                arguments,
                over,
            },
            start,
        ))
    }

    /// `(PARTITION BY ... ORDER BY ... ROWS ...)`; returns the partition and
    /// ordering expressions.
    fn parse_over_clause(&mut self) -> Option<Vec<NodeId>> {
        self.base.expect_token(&Token::LParen)?;
        let mut expressions = Vec::new();
        if self.base.check_word_ci("PARTITION") && self.base.peek_word_ci(1, "BY") {
            self.base.advance();
            self.base.advance();
            expressions.extend(self.parse_expression_list()?);
        }
        expressions.extend(self.parse_order_by_clause()?);
        // Window frame
        if self.base.check_any_word_ci(&["ROWS", "RANGE"]) {
            while !self.base.check_token(&Token::RParen) {
                if self.base.is_at_end() {
                    return None;
                }
                self.base.advance();
            }
        }
        self.base.expect_token(&Token::RParen)?;
        Some(expressions)
    }

    fn parse_case_expression(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.expect_word_ci("CASE")?;
        let input = if self.base.check_word_ci("WHEN") {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let mut when_clauses = Vec::new();
        while self.base.check_word_ci("WHEN") {
            let clause_start = self.base.pos();
            self.base.advance();
            let when_expression = if input.is_some() {
                self.parse_expression()?
            } else {
                self.parse_boolean_expression()?
            };
            self.base.expect_word_ci("THEN")?;
            let then_expression = self.parse_expression()?;
            when_clauses.push(self.node(
                NodeKind::WhenClause {
                    when_expression,
                    then_expression,
                },
                clause_start,
            ));
        }
        if when_clauses.is_empty() {
            return None;
        }
        let else_expression = if self.base.eat_word_ci("ELSE") {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.base.expect_word_ci("END")?;
        Some(self.node(
            NodeKind::CaseExpression {
                input,
                when_clauses,
                else_expression,
            },
            start,
        ))
    }

    /// `CAST(expr AS type)`
    fn parse_cast_call(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.advance();
        self.base.expect_token(&Token::LParen)?;
        let expression = self.parse_expression()?;
        self.base.expect_word_ci("AS")?;
        let data_type = self.parse_data_type()?;
        self.base.expect_token(&Token::RParen)?;
        Some(self.node(
            NodeKind::ConvertCall {
                data_type,
                expression,
                style: None,
            },
            start,
        ))
    }

    /// `CONVERT(type, expr [, style])`
    fn parse_convert_call(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        self.base.advance();
        self.base.expect_token(&Token::LParen)?;
        let data_type = self.parse_data_type()?;
        self.base.expect_token(&Token::Comma)?;
        let expression = self.parse_expression()?;
        let style = if self.base.eat_token(&Token::Comma) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.base.expect_token(&Token::RParen)?;
        Some(self.node(
            NodeKind::ConvertCall {
                data_type,
                expression,
                style,
            },
            start,
        ))
    }

    /// A possibly dotted column reference, as in insert column lists.
    pub(super) fn parse_column_reference(&mut self) -> Option<NodeId> {
        let start = self.base.pos();
        if self.base.check_variable() {
            return None;
        }
        let mut parts = vec![self.base.parse_identifier()?];
        while self.base.eat_token(&Token::Period) {
            parts.push(self.base.parse_identifier()?);
        }
        Some(self.node(
            NodeKind::ColumnReference {
                parts,
                column_type: ColumnType::Regular,
            },
            start,
        ))
    }

    /// Data type text such as `INT`, `DECIMAL(18, 2)` or `[dbo].[Phone]`.
    pub(super) fn parse_data_type(&mut self) -> Option<String> {
        let start = self.base.pos();
        if self.base.check_variable() {
            return None;
        }
        self.base.parse_identifier()?;
        while self.base.eat_token(&Token::Period) {
            self.base.parse_identifier()?;
        }
        // DOUBLE PRECISION, CHAR VARYING
        if self.base.check_any_word_ci(&["PRECISION", "VARYING"]) {
            self.base.advance();
        }
        if self.base.check_token(&Token::LParen) {
            self.base.skip_parenthesized();
        }
        let end = self.base.pos().saturating_sub(1);
        Some(self.base.text_between(start, end))
    }
}
