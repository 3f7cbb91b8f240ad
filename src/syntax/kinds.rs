//! Fragment kinds of the T-SQL syntax tree
//!
//! Every node kind is a variant of the closed [`NodeKind`] enum. Child slots
//! hold [`NodeId`] handles into the owning [`super::SyntaxTree`] arena, so the
//! same structural fragment at two source locations is two distinct nodes.

use std::fmt;

use super::location::CodeRegion;
use super::NodeId;
use crate::util::is_temp_table_name;

/// A single (possibly quoted) identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Identifier text without brackets or quotes
    pub value: String,
    /// Quote character (`[` or `"`) if the identifier was delimited
    pub quote_style: Option<char>,
    pub region: CodeRegion,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote_style: None,
            region: CodeRegion::default(),
        }
    }

    /// Case-insensitive comparison of identifier text.
    pub fn matches(&self, other: &str) -> bool {
        self.value.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Dotted identifier sequence such as `t.Col` or `dbo.Table.Col`
pub type MultiPartIdentifier = Vec<Identifier>;

/// Up to four-part object name: `server.database.schema.object`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObjectName {
    pub server: Option<Identifier>,
    pub database: Option<Identifier>,
    pub schema: Option<Identifier>,
    pub base: Identifier,
}

impl SchemaObjectName {
    pub fn new(base: Identifier) -> Self {
        Self {
            server: None,
            database: None,
            schema: None,
            base,
        }
    }

    /// Build from the dotted parts in source order. Empty parts (as in
    /// `db..Table`) are passed as `None`.
    pub fn from_parts(parts: Vec<Option<Identifier>>) -> Option<Self> {
        let mut parts = parts;
        let base = parts.pop()??;
        let schema = parts.pop().flatten();
        let database = parts.pop().flatten();
        let server = parts.pop().flatten();
        if !parts.is_empty() {
            return None;
        }
        Some(Self {
            server,
            database,
            schema,
            base,
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base.value
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_ref().map(|s| s.value.as_str())
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database.as_ref().map(|d| d.value.as_str())
    }

    /// Schema with the default substituted when absent.
    pub fn schema_or<'a>(&'a self, default_schema: &'a str) -> &'a str {
        self.schema_name().unwrap_or(default_schema)
    }

    /// Whether the object is a `#temp` or `##global` temp table.
    pub fn is_temp_table(&self) -> bool {
        is_temp_table_name(&self.base.value)
    }

    /// Region covering every present part.
    pub fn region(&self) -> CodeRegion {
        [&self.server, &self.database, &self.schema]
            .into_iter()
            .flatten()
            .fold(self.base.region, |acc, part| acc.union(&part.region))
    }
}

impl fmt::Display for SchemaObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut started = false;
        for part in [&self.server, &self.database, &self.schema] {
            match part {
                Some(ident) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(&ident.value)?;
                    started = true;
                    first = false;
                }
                None if started => {
                    f.write_str(".")?;
                }
                None => {}
            }
        }
        if !first || started {
            f.write_str(".")?;
        }
        f.write_str(&self.base.value)
    }
}

/// Parameter of a procedure or function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub name: Identifier,
    pub data_type: String,
    pub is_output: bool,
}

/// Whether a programmability object was created, altered, or created-or-altered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionMode {
    Create,
    Alter,
    CreateOrAlter,
}

impl DefinitionMode {
    /// Plain ALTER statements modify an existing object instead of defining one.
    pub fn defines_object(self) -> bool {
        !matches!(self, DefinitionMode::Alter)
    }
}

/// Return shape of a user-defined function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionReturn {
    Scalar(String),
    /// Inline table-valued function: `RETURNS TABLE AS RETURN (SELECT ...)`
    Table { select: Option<NodeId> },
    /// Multi-statement table-valued function: `RETURNS @t TABLE (...)`
    TableVariable(Identifier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryQueryOperator {
    Union,
    UnionAll,
    Except,
    Intersect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifiedJoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnqualifiedJoinType {
    CrossJoin,
    CrossApply,
    OuterApply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeCondition {
    Matched,
    NotMatched,
    NotMatchedBySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Regular,
    Wildcard,
    PseudoColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Numeric,
    String,
    Null,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negative,
    Positive,
    BitwiseNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Regular,
    ColumnStore,
    Spatial,
    Xml,
    FullText,
}

/// Closed set of fragment kinds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Script {
        batches: Vec<NodeId>,
    },
    Batch {
        statements: Vec<NodeId>,
    },

    // ------------------------------------------------------------------
    // Data manipulation
    // ------------------------------------------------------------------
    UseStatement {
        database: Identifier,
    },
    SelectStatement {
        ctes: Vec<NodeId>,
        query: NodeId,
    },
    InsertStatement {
        ctes: Vec<NodeId>,
        specification: NodeId,
    },
    UpdateStatement {
        ctes: Vec<NodeId>,
        specification: NodeId,
    },
    DeleteStatement {
        ctes: Vec<NodeId>,
        specification: NodeId,
    },
    MergeStatement {
        ctes: Vec<NodeId>,
        specification: NodeId,
    },
    CommonTableExpression {
        name: Identifier,
        columns: Vec<Identifier>,
        query: NodeId,
    },
    QuerySpecification {
        select_elements: Vec<NodeId>,
        into: Option<SchemaObjectName>,
        from: Option<NodeId>,
        where_clause: Option<NodeId>,
        group_by: Vec<NodeId>,
        having: Option<NodeId>,
        order_by: Vec<NodeId>,
    },
    BinaryQueryExpression {
        operator: BinaryQueryOperator,
        first: NodeId,
        second: NodeId,
        order_by: Vec<NodeId>,
    },
    QueryParenthesis {
        query: NodeId,
    },
    SelectScalarExpression {
        expression: NodeId,
        alias: Option<Identifier>,
    },
    SelectStarExpression {
        qualifier: MultiPartIdentifier,
    },
    SelectSetVariable {
        variable: Identifier,
        expression: NodeId,
    },
    FromClause {
        table_sources: Vec<NodeId>,
    },
    NamedTableReference {
        name: SchemaObjectName,
        alias: Option<Identifier>,
    },
    VariableTableReference {
        variable: Identifier,
        alias: Option<Identifier>,
    },
    FunctionTableReference {
        name: SchemaObjectName,
        arguments: Vec<NodeId>,
        alias: Option<Identifier>,
    },
    QueryDerivedTable {
        query: NodeId,
        alias: Option<Identifier>,
        columns: Vec<Identifier>,
    },
    QualifiedJoin {
        join_type: QualifiedJoinType,
        first: NodeId,
        second: NodeId,
        search_condition: NodeId,
    },
    UnqualifiedJoin {
        join_type: UnqualifiedJoinType,
        first: NodeId,
        second: NodeId,
    },
    InsertSpecification {
        target: NodeId,
        columns: Vec<NodeId>,
        source: Option<NodeId>,
    },
    ValuesInsertSource {
        rows: Vec<NodeId>,
    },
    RowValue {
        values: Vec<NodeId>,
    },
    SelectInsertSource {
        query: NodeId,
    },
    ExecuteInsertSource {
        execute: NodeId,
    },
    UpdateSpecification {
        target: NodeId,
        set_clauses: Vec<NodeId>,
        from: Option<NodeId>,
        where_clause: Option<NodeId>,
    },
    DeleteSpecification {
        target: NodeId,
        from: Option<NodeId>,
        where_clause: Option<NodeId>,
    },
    MergeSpecification {
        target: NodeId,
        /// The grammar keeps `MERGE t AS x` alias here, not on the target
        table_alias: Option<Identifier>,
        source: NodeId,
        search_condition: NodeId,
        actions: Vec<NodeId>,
    },
    MergeActionClause {
        condition: MergeCondition,
        search_condition: Option<NodeId>,
        action: NodeId,
    },
    UpdateMergeAction {
        set_clauses: Vec<NodeId>,
    },
    DeleteMergeAction,
    InsertMergeAction {
        columns: Vec<NodeId>,
        values: Vec<NodeId>,
    },
    AssignmentSetClause {
        variable: Option<Identifier>,
        column: Option<NodeId>,
        value: NodeId,
    },

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------
    ColumnReference {
        parts: MultiPartIdentifier,
        column_type: ColumnType,
    },
    VariableReference {
        name: Identifier,
    },
    Literal {
        kind: LiteralKind,
        value: String,
    },
    BinaryExpression {
        operator: BinaryOperator,
        first: NodeId,
        second: NodeId,
    },
    UnaryExpression {
        operator: UnaryOperator,
        expression: NodeId,
    },
    BooleanComparison {
        operator: ComparisonOperator,
        first: NodeId,
        second: NodeId,
    },
    BooleanBinary {
        operator: BooleanOperator,
        first: NodeId,
        second: NodeId,
    },
    BooleanNot {
        expression: NodeId,
    },
    BooleanIsNull {
        expression: NodeId,
        negated: bool,
    },
    InPredicate {
        expression: NodeId,
        values: Vec<NodeId>,
        subquery: Option<NodeId>,
        negated: bool,
    },
    LikePredicate {
        first: NodeId,
        second: NodeId,
        negated: bool,
    },
    BetweenPredicate {
        expression: NodeId,
        low: NodeId,
        high: NodeId,
        negated: bool,
    },
    ExistsPredicate {
        subquery: NodeId,
    },
    ParenthesisExpression {
        expression: NodeId,
    },
    ScalarSubquery {
        query: NodeId,
    },
    FunctionCall {
        call_target: MultiPartIdentifier,
        name: Identifier,
        arguments: Vec<NodeId>,
        over: Vec<NodeId>,
    },
    ConvertCall {
        data_type: String,
        expression: NodeId,
        style: Option<NodeId>,
    },
    CaseExpression {
        input: Option<NodeId>,
        when_clauses: Vec<NodeId>,
        else_expression: Option<NodeId>,
    },
    WhenClause {
        when_expression: NodeId,
        then_expression: NodeId,
    },

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------
    CreateTableStatement {
        name: SchemaObjectName,
        columns: Vec<NodeId>,
        constraints: Vec<NodeId>,
        indexes: Vec<NodeId>,
    },
    ColumnDefinition {
        name: Identifier,
        data_type: Option<String>,
        computed: Option<NodeId>,
        nullable: Option<bool>,
        identity: bool,
        constraints: Vec<NodeId>,
        index: Option<NodeId>,
    },
    UniqueConstraint {
        name: Option<Identifier>,
        primary_key: bool,
        clustered: Option<bool>,
        columns: Vec<Identifier>,
    },
    ForeignKeyConstraint {
        name: Option<Identifier>,
        columns: Vec<Identifier>,
        referenced_table: SchemaObjectName,
        referenced_columns: Vec<Identifier>,
    },
    CheckConstraint {
        name: Option<Identifier>,
        condition: NodeId,
    },
    DefaultConstraint {
        name: Option<Identifier>,
        expression: NodeId,
        column: Option<Identifier>,
    },
    IndexDefinition {
        name: Identifier,
        unique: bool,
        clustered: Option<bool>,
        columns: Vec<Identifier>,
        included_columns: Vec<Identifier>,
        filter: Option<NodeId>,
    },
    CreateIndexStatement {
        /// Full-text indexes carry no name of their own
        name: Option<Identifier>,
        on_name: SchemaObjectName,
        index_type: IndexType,
        unique: bool,
        clustered: Option<bool>,
        columns: Vec<Identifier>,
        included_columns: Vec<Identifier>,
        filter: Option<NodeId>,
    },
    AlterTableAddElements {
        name: SchemaObjectName,
        columns: Vec<NodeId>,
        constraints: Vec<NodeId>,
    },
    CreateViewStatement {
        name: SchemaObjectName,
        columns: Vec<Identifier>,
        select: NodeId,
        mode: DefinitionMode,
    },
    CreateProcedureStatement {
        name: SchemaObjectName,
        parameters: Vec<ParameterDefinition>,
        statements: Vec<NodeId>,
        mode: DefinitionMode,
    },
    CreateFunctionStatement {
        name: SchemaObjectName,
        parameters: Vec<ParameterDefinition>,
        returns: FunctionReturn,
        statements: Vec<NodeId>,
        mode: DefinitionMode,
    },
    CreateTriggerStatement {
        name: SchemaObjectName,
        table: SchemaObjectName,
        statements: Vec<NodeId>,
        mode: DefinitionMode,
    },
    CreateSynonymStatement {
        name: SchemaObjectName,
        target: SchemaObjectName,
    },
    CreateSchemaStatement {
        name: Identifier,
        authorization: Option<Identifier>,
    },

    // ------------------------------------------------------------------
    // Procedural statements
    // ------------------------------------------------------------------
    DeclareVariableStatement {
        variables: Vec<Identifier>,
        values: Vec<NodeId>,
    },
    DeclareCursorStatement {
        cursor: Identifier,
        select: NodeId,
    },
    SetVariableStatement {
        variable: Identifier,
        expression: NodeId,
    },
    ExecuteStatement {
        procedure: Option<SchemaObjectName>,
    },
    IfStatement {
        predicate: NodeId,
        then_statement: NodeId,
        else_statement: Option<NodeId>,
    },
    WhileStatement {
        predicate: NodeId,
        statement: NodeId,
    },
    BeginEndBlock {
        statements: Vec<NodeId>,
    },
    TryCatchStatement {
        try_statements: Vec<NodeId>,
        catch_statements: Vec<NodeId>,
    },
    ReturnStatement {
        expression: Option<NodeId>,
    },
    /// Statement outside the supported grammar; its tokens were skipped
    OtherStatement {
        keyword: String,
    },
}

impl NodeKind {
    /// Ordered child handles across every child slot.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Script { batches } => out.extend(batches),
            NodeKind::Batch { statements } => out.extend(statements),
            NodeKind::UseStatement { .. } => {}
            NodeKind::SelectStatement { ctes, query } => {
                out.extend(ctes);
                out.push(*query);
            }
            NodeKind::InsertStatement {
                ctes,
                specification,
            }
            | NodeKind::UpdateStatement {
                ctes,
                specification,
            }
            | NodeKind::DeleteStatement {
                ctes,
                specification,
            }
            | NodeKind::MergeStatement {
                ctes,
                specification,
            } => {
                out.extend(ctes);
                out.push(*specification);
            }
            NodeKind::CommonTableExpression { query, .. } => out.push(*query),
            NodeKind::QuerySpecification {
                select_elements,
                from,
                where_clause,
                group_by,
                having,
                order_by,
                ..
            } => {
                out.extend(select_elements);
                out.extend(from);
                out.extend(where_clause);
                out.extend(group_by);
                out.extend(having);
                out.extend(order_by);
            }
            NodeKind::BinaryQueryExpression {
                first,
                second,
                order_by,
                ..
            } => {
                out.push(*first);
                out.push(*second);
                out.extend(order_by);
            }
            NodeKind::QueryParenthesis { query } => out.push(*query),
            NodeKind::SelectScalarExpression { expression, .. } => out.push(*expression),
            NodeKind::SelectStarExpression { .. } => {}
            NodeKind::SelectSetVariable { expression, .. } => out.push(*expression),
            NodeKind::FromClause { table_sources } => out.extend(table_sources),
            NodeKind::NamedTableReference { .. } => {}
            NodeKind::VariableTableReference { .. } => {}
            NodeKind::FunctionTableReference { arguments, .. } => out.extend(arguments),
            NodeKind::QueryDerivedTable { query, .. } => out.push(*query),
            NodeKind::QualifiedJoin {
                first,
                second,
                search_condition,
                ..
            } => {
                out.push(*first);
                out.push(*second);
                out.push(*search_condition);
            }
            NodeKind::UnqualifiedJoin { first, second, .. } => {
                out.push(*first);
                out.push(*second);
            }
            NodeKind::InsertSpecification {
                target,
                columns,
                source,
            } => {
                out.push(*target);
                out.extend(columns);
                out.extend(source);
            }
            NodeKind::ValuesInsertSource { rows } => out.extend(rows),
            NodeKind::RowValue { values } => out.extend(values),
            NodeKind::SelectInsertSource { query } => out.push(*query),
            NodeKind::ExecuteInsertSource { execute } => out.push(*execute),
            NodeKind::UpdateSpecification {
                target,
                set_clauses,
                from,
                where_clause,
            } => {
                out.push(*target);
                out.extend(set_clauses);
                out.extend(from);
                out.extend(where_clause);
            }
            NodeKind::DeleteSpecification {
                target,
                from,
                where_clause,
            } => {
                out.push(*target);
                out.extend(from);
                out.extend(where_clause);
            }
            NodeKind::MergeSpecification {
                target,
                source,
                search_condition,
                actions,
                ..
            } => {
                out.push(*target);
                out.push(*source);
                out.push(*search_condition);
                out.extend(actions);
            }
            NodeKind::MergeActionClause {
                search_condition,
                action,
                ..
            } => {
                out.extend(search_condition);
                out.push(*action);
            }
            NodeKind::UpdateMergeAction { set_clauses } => out.extend(set_clauses),
            NodeKind::DeleteMergeAction => {}
            NodeKind::InsertMergeAction { columns, values } => {
                out.extend(columns);
                out.extend(values);
            }
            NodeKind::AssignmentSetClause { column, value, .. } => {
                out.extend(column);
                out.push(*value);
            }
            NodeKind::ColumnReference { .. }
            | NodeKind::VariableReference { .. }
            | NodeKind::Literal { .. } => {}
            NodeKind::BinaryExpression { first, second, .. }
            | NodeKind::BooleanComparison { first, second, .. }
            | NodeKind::BooleanBinary { first, second, .. }
            | NodeKind::LikePredicate { first, second, .. } => {
                out.push(*first);
                out.push(*second);
            }
            NodeKind::UnaryExpression { expression, .. }
            | NodeKind::BooleanNot { expression }
            | NodeKind::BooleanIsNull { expression, .. }
            | NodeKind::ParenthesisExpression { expression } => out.push(*expression),
            NodeKind::InPredicate {
                expression,
                values,
                subquery,
                ..
            } => {
                out.push(*expression);
                out.extend(values);
                out.extend(subquery);
            }
            NodeKind::BetweenPredicate {
                expression,
                low,
                high,
                ..
            } => {
                out.push(*expression);
                out.push(*low);
                out.push(*high);
            }
            NodeKind::ExistsPredicate { subquery } => out.push(*subquery),
            NodeKind::ScalarSubquery { query } => out.push(*query),
            NodeKind::FunctionCall {
                arguments, over, ..
            } => {
                out.extend(arguments);
                out.extend(over);
            }
            NodeKind::ConvertCall {
                expression, style, ..
            } => {
                out.push(*expression);
                out.extend(style);
            }
            NodeKind::CaseExpression {
                input,
                when_clauses,
                else_expression,
            } => {
                out.extend(input);
                out.extend(when_clauses);
                out.extend(else_expression);
            }
            NodeKind::WhenClause {
                when_expression,
                then_expression,
            } => {
                out.push(*when_expression);
                out.push(*then_expression);
            }
            NodeKind::CreateTableStatement {
                columns,
                constraints,
                indexes,
                ..
            } => {
                out.extend(columns);
                out.extend(constraints);
                out.extend(indexes);
            }
            NodeKind::ColumnDefinition {
                computed,
                constraints,
                index,
                ..
            } => {
                out.extend(computed);
                out.extend(constraints);
                out.extend(index);
            }
            NodeKind::UniqueConstraint { .. } | NodeKind::ForeignKeyConstraint { .. } => {}
            NodeKind::CheckConstraint { condition, .. } => out.push(*condition),
            NodeKind::DefaultConstraint { expression, .. } => out.push(*expression),
            NodeKind::IndexDefinition { filter, .. }
            | NodeKind::CreateIndexStatement { filter, .. } => out.extend(filter),
            NodeKind::AlterTableAddElements {
                columns,
                constraints,
                ..
            } => {
                out.extend(columns);
                out.extend(constraints);
            }
            NodeKind::CreateViewStatement { select, .. } => out.push(*select),
            NodeKind::CreateProcedureStatement { statements, .. }
            | NodeKind::CreateTriggerStatement { statements, .. } => out.extend(statements),
            NodeKind::CreateFunctionStatement {
                returns,
                statements,
                ..
            } => {
                if let FunctionReturn::Table {
                    select: Some(select),
                } = returns
                {
                    out.push(*select);
                }
                out.extend(statements);
            }
            NodeKind::CreateSynonymStatement { .. } | NodeKind::CreateSchemaStatement { .. } => {}
            NodeKind::DeclareVariableStatement { values, .. } => out.extend(values),
            NodeKind::DeclareCursorStatement { select, .. } => out.push(*select),
            NodeKind::SetVariableStatement { expression, .. } => out.push(*expression),
            NodeKind::ExecuteStatement { .. } => {}
            NodeKind::IfStatement {
                predicate,
                then_statement,
                else_statement,
            } => {
                out.push(*predicate);
                out.push(*then_statement);
                out.extend(else_statement);
            }
            NodeKind::WhileStatement {
                predicate,
                statement,
            } => {
                out.push(*predicate);
                out.push(*statement);
            }
            NodeKind::BeginEndBlock { statements } => out.extend(statements),
            NodeKind::TryCatchStatement {
                try_statements,
                catch_statements,
            } => {
                out.extend(try_statements);
                out.extend(catch_statements);
            }
            NodeKind::ReturnStatement { expression } => out.extend(expression),
            NodeKind::OtherStatement { .. } => {}
        }
        out
    }

    /// Statements that terminate an upward scope walk.
    pub fn is_topmost_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::SelectStatement { .. }
                | NodeKind::InsertStatement { .. }
                | NodeKind::UpdateStatement { .. }
                | NodeKind::DeleteStatement { .. }
                | NodeKind::MergeStatement { .. }
        )
    }

    /// CTE list of a statement that can carry `WITH ...`.
    pub fn ctes(&self) -> Option<&[NodeId]> {
        match self {
            NodeKind::SelectStatement { ctes, .. }
            | NodeKind::InsertStatement { ctes, .. }
            | NodeKind::UpdateStatement { ctes, .. }
            | NodeKind::DeleteStatement { ctes, .. }
            | NodeKind::MergeStatement { ctes, .. } => Some(ctes),
            _ => None,
        }
    }

    /// Short human-readable kind name, used in diagnostics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Script { .. } => "Script",
            NodeKind::Batch { .. } => "Batch",
            NodeKind::UseStatement { .. } => "UseStatement",
            NodeKind::SelectStatement { .. } => "SelectStatement",
            NodeKind::InsertStatement { .. } => "InsertStatement",
            NodeKind::UpdateStatement { .. } => "UpdateStatement",
            NodeKind::DeleteStatement { .. } => "DeleteStatement",
            NodeKind::MergeStatement { .. } => "MergeStatement",
            NodeKind::CommonTableExpression { .. } => "CommonTableExpression",
            NodeKind::QuerySpecification { .. } => "QuerySpecification",
            NodeKind::BinaryQueryExpression { .. } => "BinaryQueryExpression",
            NodeKind::QueryParenthesis { .. } => "QueryParenthesis",
            NodeKind::SelectScalarExpression { .. } => "SelectScalarExpression",
            NodeKind::SelectStarExpression { .. } => "SelectStarExpression",
            NodeKind::SelectSetVariable { .. } => "SelectSetVariable",
            NodeKind::FromClause { .. } => "FromClause",
            NodeKind::NamedTableReference { .. } => "NamedTableReference",
            NodeKind::VariableTableReference { .. } => "VariableTableReference",
            NodeKind::FunctionTableReference { .. } => "FunctionTableReference",
            NodeKind::QueryDerivedTable { .. } => "QueryDerivedTable",
            NodeKind::QualifiedJoin { .. } => "QualifiedJoin",
            NodeKind::UnqualifiedJoin { .. } => "UnqualifiedJoin",
            NodeKind::InsertSpecification { .. } => "InsertSpecification",
            NodeKind::ValuesInsertSource { .. } => "ValuesInsertSource",
            NodeKind::RowValue { .. } => "RowValue",
            NodeKind::SelectInsertSource { .. } => "SelectInsertSource",
            NodeKind::ExecuteInsertSource { .. } => "ExecuteInsertSource",
            NodeKind::UpdateSpecification { .. } => "UpdateSpecification",
            NodeKind::DeleteSpecification { .. } => "DeleteSpecification",
            NodeKind::MergeSpecification { .. } => "MergeSpecification",
            NodeKind::MergeActionClause { .. } => "MergeActionClause",
            NodeKind::UpdateMergeAction { .. } => "UpdateMergeAction",
            NodeKind::DeleteMergeAction => "DeleteMergeAction",
            NodeKind::InsertMergeAction { .. } => "InsertMergeAction",
            NodeKind::AssignmentSetClause { .. } => "AssignmentSetClause",
            NodeKind::ColumnReference { .. } => "ColumnReference",
            NodeKind::VariableReference { .. } => "VariableReference",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::BooleanComparison { .. } => "BooleanComparison",
            NodeKind::BooleanBinary { .. } => "BooleanBinary",
            NodeKind::BooleanNot { .. } => "BooleanNot",
            NodeKind::BooleanIsNull { .. } => "BooleanIsNull",
            NodeKind::InPredicate { .. } => "InPredicate",
            NodeKind::LikePredicate { .. } => "LikePredicate",
            NodeKind::BetweenPredicate { .. } => "BetweenPredicate",
            NodeKind::ExistsPredicate { .. } => "ExistsPredicate",
            NodeKind::ParenthesisExpression { .. } => "ParenthesisExpression",
            NodeKind::ScalarSubquery { .. } => "ScalarSubquery",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::ConvertCall { .. } => "ConvertCall",
            NodeKind::CaseExpression { .. } => "CaseExpression",
            NodeKind::WhenClause { .. } => "WhenClause",
            NodeKind::CreateTableStatement { .. } => "CreateTableStatement",
            NodeKind::ColumnDefinition { .. } => "ColumnDefinition",
            NodeKind::UniqueConstraint { .. } => "UniqueConstraint",
            NodeKind::ForeignKeyConstraint { .. } => "ForeignKeyConstraint",
            NodeKind::CheckConstraint { .. } => "CheckConstraint",
            NodeKind::DefaultConstraint { .. } => "DefaultConstraint",
            NodeKind::IndexDefinition { .. } => "IndexDefinition",
            NodeKind::CreateIndexStatement { .. } => "CreateIndexStatement",
            NodeKind::AlterTableAddElements { .. } => "AlterTableAddElements",
            NodeKind::CreateViewStatement { .. } => "CreateViewStatement",
            NodeKind::CreateProcedureStatement { .. } => "CreateProcedureStatement",
            NodeKind::CreateFunctionStatement { .. } => "CreateFunctionStatement",
            NodeKind::CreateTriggerStatement { .. } => "CreateTriggerStatement",
            NodeKind::CreateSynonymStatement { .. } => "CreateSynonymStatement",
            NodeKind::CreateSchemaStatement { .. } => "CreateSchemaStatement",
            NodeKind::DeclareVariableStatement { .. } => "DeclareVariableStatement",
            NodeKind::DeclareCursorStatement { .. } => "DeclareCursorStatement",
            NodeKind::SetVariableStatement { .. } => "SetVariableStatement",
            NodeKind::ExecuteStatement { .. } => "ExecuteStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::BeginEndBlock { .. } => "BeginEndBlock",
            NodeKind::TryCatchStatement { .. } => "TryCatchStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::OtherStatement { .. } => "OtherStatement",
        }
    }
}
